//! Route handlers: parse, validate, delegate, wrap.
//!
//! Required inputs come only from the query string or the path. A missing or
//! blank one answers 400 without touching the service; any service failure
//! answers 500 with the failure's message as `detail`.

use axum::{
    async_trait,
    body::to_bytes,
    extract::{FromRequestParts, Path, Query, State},
    http::{StatusCode, Uri, header, request::Parts},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::envelope::Envelope;
use crate::error::{ApiError, ServiceError};
use crate::AppState;

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Largest bare error body read back when re-wrapping it.
const BARE_BODY_LIMIT: usize = 16 * 1024;

type Reply = Result<Envelope, ApiError>;

/// Query-string extractor where the first occurrence of a repeated key wins
/// and later ones are dropped. Rejections render as a 400 envelope.
#[derive(Debug)]
pub struct FirstQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for FirstQuery<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri)
            .map_err(|rejection| ApiError::Validation(rejection.body_text()))?;

        let mut first = serde_json::Map::new();
        for (key, value) in pairs {
            first.entry(key).or_insert(serde_json::Value::String(value));
        }
        serde_json::from_value(serde_json::Value::Object(first))
            .map(FirstQuery)
            .map_err(|e| ApiError::Validation(e.to_string()))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AddPostQuery {
    #[serde(rename = "userSerial")]
    pub user_serial: String,
    #[serde(rename = "postContent")]
    pub post_content: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DeletePostQuery {
    #[serde(rename = "userSerial")]
    pub user_serial: String,
    #[serde(rename = "postID")]
    pub post_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RelationQuery {
    #[serde(rename = "ownUserSerial")]
    pub own_user_serial: String,
    #[serde(rename = "targetUserSerial")]
    pub target_user_serial: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LikeQuery {
    #[serde(rename = "likerUserSerial")]
    pub liker_user_serial: String,
    #[serde(rename = "postID")]
    pub post_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PageQuery {
    #[serde(rename = "pageSize")]
    pub page_size: String,
}

/// Rejects when any field is blank. The detail lists only the blank ones:
/// `"postID is mandatory"`, `"userSerial and postID are mandatory"`.
fn require(op: &'static str, fields: &[(&'static str, &str)]) -> Result<(), ApiError> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();

    let detail = match missing.as_slice() {
        [] => return Ok(()),
        [one] => format!("{one} is mandatory"),
        [init @ .., last] => format!("{} and {last} are mandatory", init.join(", ")),
    };
    tracing::debug!(op, %detail, "feed.request.rejected");
    Err(ApiError::Validation(detail))
}

fn downstream(op: &'static str) -> impl FnOnce(ServiceError) -> ApiError {
    move |err| {
        tracing::warn!(op, error = %err, "feed.request.failed");
        ApiError::Downstream(err)
    }
}

/// Best effort: anything that is not a positive integer means the default.
pub fn parse_page_size(raw: &str) -> usize {
    match raw.trim().parse::<i64>() {
        Ok(n) if n > 0 => usize::try_from(n).unwrap_or(DEFAULT_PAGE_SIZE),
        _ => DEFAULT_PAGE_SIZE,
    }
}

pub async fn add_post(
    State(state): State<AppState>,
    FirstQuery(q): FirstQuery<AddPostQuery>,
) -> Reply {
    require(
        "add_post",
        &[("userSerial", q.user_serial.as_str()), ("postContent", q.post_content.as_str())],
    )?;
    let created = state
        .service
        .add_post(&q.user_serial, &q.post_content)
        .await
        .map_err(downstream("add_post"))?;
    tracing::info!(user = %q.user_serial, post_id = %created.id, "feed.post.added");
    Ok(Envelope::created(
        "Feed has been successfully added to timeline!",
        created,
    ))
}

pub async fn get_posts(State(state): State<AppState>, Path(user_serial): Path<String>) -> Reply {
    require("get_posts", &[("userSerial", user_serial.as_str())])?;
    let posts = state
        .service
        .get_posts(&user_serial)
        .await
        .map_err(downstream("get_posts"))?;
    Ok(Envelope::ok("success", posts))
}

pub async fn get_post_detail(
    State(state): State<AppState>,
    Path(user_serial): Path<String>,
) -> Reply {
    require("get_post_detail", &[("userSerial", user_serial.as_str())])?;
    let posts = state
        .service
        .get_post_detail(&user_serial)
        .await
        .map_err(downstream("get_post_detail"))?;
    Ok(Envelope::ok("success", posts))
}

pub async fn delete_post(
    State(state): State<AppState>,
    FirstQuery(q): FirstQuery<DeletePostQuery>,
) -> Reply {
    require(
        "delete_post",
        &[("userSerial", q.user_serial.as_str()), ("postID", q.post_id.as_str())],
    )?;
    state
        .service
        .delete_post(&q.user_serial, &q.post_id)
        .await
        .map_err(downstream("delete_post"))?;
    tracing::info!(user = %q.user_serial, post_id = %q.post_id, "feed.post.deleted");
    Ok(Envelope::done(format!(
        "Post with ID {} has been successfully deleted!",
        q.post_id
    )))
}

pub async fn get_timeline(State(state): State<AppState>, Path(user_serial): Path<String>) -> Reply {
    require("get_timeline", &[("userSerial", user_serial.as_str())])?;
    let items = state
        .service
        .get_timeline(&user_serial)
        .await
        .map_err(downstream("get_timeline"))?;
    Ok(Envelope::ok("Success", items))
}

pub async fn get_timeline_detail(
    State(state): State<AppState>,
    Path(user_serial): Path<String>,
) -> Reply {
    require("get_timeline_detail", &[("userSerial", user_serial.as_str())])?;
    let items = state
        .service
        .get_timeline_detail(&user_serial)
        .await
        .map_err(downstream("get_timeline_detail"))?;
    Ok(Envelope::ok("Success", items))
}

pub async fn follow(
    State(state): State<AppState>,
    FirstQuery(q): FirstQuery<RelationQuery>,
) -> Reply {
    require(
        "follow",
        &[
            ("ownUserSerial", q.own_user_serial.as_str()),
            ("targetUserSerial", q.target_user_serial.as_str()),
        ],
    )?;
    state
        .service
        .follow(&q.own_user_serial, &q.target_user_serial)
        .await
        .map_err(downstream("follow"))?;
    tracing::info!(owner = %q.own_user_serial, target = %q.target_user_serial, "feed.follow");
    Ok(Envelope::done(format!(
        "{} has successfully followed {}!",
        q.own_user_serial, q.target_user_serial
    )))
}

pub async fn unfollow(
    State(state): State<AppState>,
    FirstQuery(q): FirstQuery<RelationQuery>,
) -> Reply {
    require(
        "unfollow",
        &[
            ("ownUserSerial", q.own_user_serial.as_str()),
            ("targetUserSerial", q.target_user_serial.as_str()),
        ],
    )?;
    state
        .service
        .unfollow(&q.own_user_serial, &q.target_user_serial)
        .await
        .map_err(downstream("unfollow"))?;
    tracing::info!(owner = %q.own_user_serial, target = %q.target_user_serial, "feed.unfollow");
    Ok(Envelope::done(format!(
        "{} has successfully unfollowed {}!",
        q.own_user_serial, q.target_user_serial
    )))
}

pub async fn get_followers(
    State(state): State<AppState>,
    Path(user_serial): Path<String>,
) -> Reply {
    require("get_followers", &[("userSerial", user_serial.as_str())])?;
    let followers = state
        .service
        .get_followers(&user_serial)
        .await
        .map_err(downstream("get_followers"))?;
    Ok(Envelope::ok("Success", followers))
}

pub async fn get_followings(
    State(state): State<AppState>,
    Path(user_serial): Path<String>,
) -> Reply {
    require("get_followings", &[("userSerial", user_serial.as_str())])?;
    let followings = state
        .service
        .get_followings(&user_serial)
        .await
        .map_err(downstream("get_followings"))?;
    Ok(Envelope::ok("Success", followings))
}

pub async fn add_like(
    State(state): State<AppState>,
    FirstQuery(q): FirstQuery<LikeQuery>,
) -> Reply {
    require(
        "add_like",
        &[("likerUserSerial", q.liker_user_serial.as_str()), ("postID", q.post_id.as_str())],
    )?;
    let reaction = state
        .service
        .add_like(&q.liker_user_serial, &q.post_id)
        .await
        .map_err(downstream("add_like"))?;
    tracing::info!(liker = %q.liker_user_serial, post_id = %q.post_id, "feed.like.added");
    Ok(Envelope::ok(
        format!(
            "{} has been successfully liked by {}!",
            q.post_id, q.liker_user_serial
        ),
        reaction,
    ))
}

pub async fn get_likes(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    FirstQuery(q): FirstQuery<PageQuery>,
) -> Reply {
    require("get_likes", &[("postID", post_id.as_str())])?;
    let page = state
        .service
        .get_likes(&post_id, parse_page_size(&q.page_size), None)
        .await
        .map_err(downstream("get_likes"))?;
    Ok(Envelope::ok("Success", page))
}

pub async fn get_likes_page(
    State(state): State<AppState>,
    Path((post_id, next_like_id)): Path<(String, String)>,
    FirstQuery(q): FirstQuery<PageQuery>,
) -> Reply {
    require("get_likes_page", &[("postID", post_id.as_str())])?;
    let page = state
        .service
        .get_likes(
            &post_id,
            parse_page_size(&q.page_size),
            Some(next_like_id.as_str()),
        )
        .await
        .map_err(downstream("get_likes_page"))?;
    Ok(Envelope::ok("Success", page))
}

pub async fn remove_like(
    State(state): State<AppState>,
    Path(reaction_id): Path<String>,
) -> Reply {
    require("remove_like", &[("reactionID", reaction_id.as_str())])?;
    state
        .service
        .remove_like(&reaction_id)
        .await
        .map_err(downstream("remove_like"))?;
    tracing::info!(reaction_id = %reaction_id, "feed.like.removed");
    Ok(Envelope::done(format!(
        "reactionID {reaction_id} has been successfully removed!"
    )))
}

pub async fn not_found(uri: Uri) -> Envelope {
    Envelope::new(
        StatusCode::NOT_FOUND,
        format!("no route for {}", uri.path()),
        None,
    )
}

/// Re-wraps error replies produced outside the handlers (method mismatch,
/// request timeout, path rejections) as envelopes. JSON replies pass through.
pub async fn envelope_bare_errors(response: Response) -> Response {
    let status = response.status();
    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"));
    if is_json || !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let (parts, body) = response.into_parts();
    let detail = match to_bytes(body, BARE_BODY_LIMIT).await {
        Ok(bytes) if !bytes.is_empty() => String::from_utf8_lossy(&bytes).into_owned(),
        _ => status.canonical_reason().unwrap_or_default().to_string(),
    };
    tracing::debug!(status = status.as_u16(), %detail, "feed.request.bare_error");

    let mut wrapped = Envelope::new(status, detail, None).into_response();
    if let Some(allow) = parts.headers.get(header::ALLOW).cloned() {
        wrapped.headers_mut().insert(header::ALLOW, allow);
    }
    wrapped
}
