//! The JSON body every route replies with.
//!
//! ```json
//! { "status": 201, "message": "Created", "detail": "...", "data": { ... } }
//! ```
//!
//! `message` is always the canonical reason phrase of `status`; `data` is
//! `null` on errors and on operations that return nothing.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use feedgate_stream::{Activity, EnrichedActivity, Follower, Reaction, ReactionPage};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Activity(Activity),
    Activities(Vec<Activity>),
    EnrichedActivities(Vec<EnrichedActivity>),
    Reaction(Reaction),
    ReactionPage(ReactionPage),
    Followers(Vec<Follower>),
}

impl From<Activity> for Payload {
    fn from(v: Activity) -> Self {
        Payload::Activity(v)
    }
}

impl From<Vec<Activity>> for Payload {
    fn from(v: Vec<Activity>) -> Self {
        Payload::Activities(v)
    }
}

impl From<Vec<EnrichedActivity>> for Payload {
    fn from(v: Vec<EnrichedActivity>) -> Self {
        Payload::EnrichedActivities(v)
    }
}

impl From<Reaction> for Payload {
    fn from(v: Reaction) -> Self {
        Payload::Reaction(v)
    }
}

impl From<ReactionPage> for Payload {
    fn from(v: ReactionPage) -> Self {
        Payload::ReactionPage(v)
    }
}

impl From<Vec<Follower>> for Payload {
    fn from(v: Vec<Follower>) -> Self {
        Payload::Followers(v)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub status: u16,
    pub message: &'static str,
    pub detail: String,
    pub data: Option<Payload>,
}

impl Envelope {
    pub fn new(status: StatusCode, detail: impl Into<String>, data: Option<Payload>) -> Self {
        Self {
            status: status.as_u16(),
            message: status.canonical_reason().unwrap_or_default(),
            detail: detail.into(),
            data,
        }
    }

    pub fn ok(detail: impl Into<String>, data: impl Into<Payload>) -> Self {
        Self::new(StatusCode::OK, detail, Some(data.into()))
    }

    /// 200 with `data: null`.
    pub fn done(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, detail, None)
    }

    pub fn created(detail: impl Into<String>, data: impl Into<Payload>) -> Self {
        Self::new(StatusCode::CREATED, detail, Some(data.into()))
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}
