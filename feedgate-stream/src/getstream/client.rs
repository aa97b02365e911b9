//! HTTP-backed [`FeedProvider`] for the GetStream Feeds REST API.
//!
//! Handles auth (api key + server JWT), endpoint shaping and response
//! unwrapping before delegating to the shared HTTP client. Each method is one
//! request with no retry.
use std::borrow::Cow;
use std::time::Duration;

use async_trait::async_trait;
use feedgate_http::{Auth, HttpClient, RequestOpts};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use serde_json::json;

use super::error::ProviderError;
use super::feed::{EnrichmentOptions, FeedRef, ReactionFilter};
use super::provider::FeedProvider;
use super::token::server_token;
use super::types::{
    Activity, AddReactionRequest, EnrichedActivity, Follower, Reaction, ReactionPage, Results,
};

const DEFAULT_HOST: &str = "api.stream-io-api.com";
const API_PATH: &str = "api/v1.0/";
/// How many existing activities a new follow copies into the follower feed.
const ACTIVITY_COPY_LIMIT: u32 = 300;

/// Everything needed to reach one provider app.
#[derive(Debug, Clone, Default)]
pub struct StreamCredentials {
    pub api_key: String,
    pub api_secret: String,
    /// e.g. `us-east`, `eu-west`, `singapore`; empty selects the default host.
    pub region: String,
    /// Full base URL override (proxies, tests). Takes precedence over `region`.
    pub base_url: Option<String>,
    pub timeout: Option<Duration>,
}

impl StreamCredentials {
    /// Resolve the API base URL.
    ///
    /// ```
    /// use feedgate_stream::StreamCredentials;
    ///
    /// let mut creds = StreamCredentials::default();
    /// assert_eq!(creds.base_url(), "https://api.stream-io-api.com/api/v1.0/");
    ///
    /// creds.region = "us-east".into();
    /// assert_eq!(creds.base_url(), "https://us-east-api.stream-io-api.com/api/v1.0/");
    ///
    /// creds.base_url = Some("http://127.0.0.1:9000".into());
    /// assert_eq!(creds.base_url(), "http://127.0.0.1:9000/api/v1.0/");
    /// ```
    pub fn base_url(&self) -> String {
        if let Some(url) = self.base_url.as_deref().filter(|u| !u.trim().is_empty()) {
            let url = url.trim().trim_end_matches('/');
            if url.ends_with(API_PATH.trim_end_matches('/')) {
                return format!("{url}/");
            }
            return format!("{url}/{API_PATH}");
        }
        let region = self
            .region
            .trim()
            .trim_end_matches(".stream-io-api.com")
            .trim_end_matches("-api");
        if region.is_empty() {
            format!("https://{DEFAULT_HOST}/{API_PATH}")
        } else {
            format!("https://{region}-{DEFAULT_HOST}/{API_PATH}")
        }
    }
}

#[derive(Clone, Debug)]
pub struct StreamClient {
    http: HttpClient,
    api_key: String,
    token: HeaderValue,
}

impl StreamClient {
    /// Build a client and mint its server token. Fails on an empty key or
    /// secret, or an unusable base URL.
    pub fn new(creds: &StreamCredentials) -> Result<Self, ProviderError> {
        if creds.api_key.trim().is_empty() {
            return Err(ProviderError::Credentials("API key is empty".into()));
        }
        let token = server_token(&creds.api_secret)?;
        let mut token = HeaderValue::from_str(&token)
            .map_err(|e| ProviderError::Credentials(format!("unusable token: {e}")))?;
        token.set_sensitive(true);

        let mut http = HttpClient::new(&creds.base_url())?;
        if let Some(timeout) = creds.timeout {
            http = http.with_timeout(timeout);
        }
        tracing::debug!(base_url = %http.base_url(), "stream.client.ready");

        Ok(Self {
            http,
            api_key: creds.api_key.trim().to_string(),
            token,
        })
    }

    fn opts<'a>(&'a self, query: Vec<(&'a str, Cow<'a, str>)>) -> RequestOpts<'a> {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("stream-auth-type"),
            HeaderValue::from_static("jwt"),
        );
        RequestOpts {
            headers: Some(headers),
            query: Some(query),
            auth: vec![
                Auth::Query {
                    name: "api_key",
                    value: Cow::Borrowed(&self.api_key),
                },
                Auth::Header {
                    name: AUTHORIZATION,
                    value: self.token.clone(),
                },
            ],
        }
    }
}

fn segment(raw: &str) -> Cow<'_, str> {
    urlencoding::encode(raw)
}

#[async_trait]
impl FeedProvider for StreamClient {
    async fn add_activity(
        &self,
        feed: &FeedRef,
        activity: Activity,
    ) -> Result<Activity, ProviderError> {
        let created: Activity = self
            .http
            .post_json(&feed.endpoint(), &activity, self.opts(vec![]))
            .await?;
        tracing::debug!(feed = %feed, activity_id = %created.id, "stream.activity.added");
        Ok(created)
    }

    async fn get_activities(&self, feed: &FeedRef) -> Result<Vec<Activity>, ProviderError> {
        let resp: Results<Activity> = self
            .http
            .get_json(&feed.endpoint(), self.opts(vec![]))
            .await?;
        Ok(resp.results)
    }

    async fn get_enriched_activities(
        &self,
        feed: &FeedRef,
        options: &EnrichmentOptions,
    ) -> Result<Vec<EnrichedActivity>, ProviderError> {
        let query = options
            .to_query()
            .into_iter()
            .map(|(k, v)| (k, Cow::Owned(v)))
            .collect();
        let path = format!("enrich/{}", feed.endpoint());
        let resp: Results<EnrichedActivity> =
            self.http.get_json(&path, self.opts(query)).await?;
        Ok(resp.results)
    }

    async fn remove_activity(
        &self,
        feed: &FeedRef,
        activity_id: &str,
    ) -> Result<(), ProviderError> {
        let path = format!("{}{}/", feed.endpoint(), segment(activity_id));
        self.http.delete(&path, self.opts(vec![])).await?;
        tracing::debug!(feed = %feed, activity_id, "stream.activity.removed");
        Ok(())
    }

    async fn follow(&self, source: &FeedRef, target: &FeedRef) -> Result<(), ProviderError> {
        let path = format!("{}follows/", source.endpoint());
        let body = json!({
            "target": target.id(),
            "activity_copy_limit": ACTIVITY_COPY_LIMIT,
        });
        self.http.post_unit(&path, &body, self.opts(vec![])).await?;
        tracing::debug!(source = %source, target = %target, "stream.follow");
        Ok(())
    }

    async fn unfollow(&self, source: &FeedRef, target: &FeedRef) -> Result<(), ProviderError> {
        let path = format!("{}follows/{}/", source.endpoint(), target.id());
        self.http.delete(&path, self.opts(vec![])).await?;
        tracing::debug!(source = %source, target = %target, "stream.unfollow");
        Ok(())
    }

    async fn followers(&self, feed: &FeedRef) -> Result<Vec<Follower>, ProviderError> {
        let path = format!("{}followers/", feed.endpoint());
        let resp: Results<Follower> = self.http.get_json(&path, self.opts(vec![])).await?;
        Ok(resp.results)
    }

    async fn followings(&self, feed: &FeedRef) -> Result<Vec<Follower>, ProviderError> {
        let path = format!("{}follows/", feed.endpoint());
        let resp: Results<Follower> = self.http.get_json(&path, self.opts(vec![])).await?;
        Ok(resp.results)
    }

    async fn add_reaction(&self, request: AddReactionRequest) -> Result<Reaction, ProviderError> {
        let reaction: Reaction = self
            .http
            .post_json("reaction/", &request, self.opts(vec![]))
            .await?;
        tracing::debug!(
            reaction_id = %reaction.id,
            kind = %reaction.kind,
            activity_id = %request.activity_id,
            "stream.reaction.added"
        );
        Ok(reaction)
    }

    async fn filter_reactions(
        &self,
        filter: &ReactionFilter,
    ) -> Result<ReactionPage, ProviderError> {
        let path = format!(
            "reaction/activity_id/{}/{}/",
            segment(&filter.activity_id),
            segment(&filter.kind)
        );
        let mut query: Vec<(&str, Cow<'_, str>)> =
            vec![("limit", Cow::Owned(filter.limit.to_string()))];
        if let Some(cursor) = filter.id_lt.as_deref() {
            query.push(("id_lt", Cow::Borrowed(cursor)));
        }
        let page: ReactionPage = self.http.get_json(&path, self.opts(query)).await?;
        Ok(page)
    }

    async fn remove_reaction(&self, reaction_id: &str) -> Result<(), ProviderError> {
        let path = format!("reaction/{}/", segment(reaction_id));
        self.http.delete(&path, self.opts(vec![])).await?;
        tracing::debug!(reaction_id, "stream.reaction.removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_suffixes_are_normalised() {
        let creds = StreamCredentials {
            region: "eu-west.stream-io-api.com".into(),
            ..Default::default()
        };
        assert_eq!(
            creds.base_url(),
            "https://eu-west-api.stream-io-api.com/api/v1.0/"
        );
    }

    #[test]
    fn base_url_override_keeps_existing_api_path() {
        let creds = StreamCredentials {
            base_url: Some("http://proxy.local/api/v1.0/".into()),
            region: "us-east".into(),
            ..Default::default()
        };
        assert_eq!(creds.base_url(), "http://proxy.local/api/v1.0/");
    }

    #[test]
    fn empty_key_is_rejected_before_any_request() {
        let creds = StreamCredentials {
            api_secret: "secret".into(),
            ..Default::default()
        };
        assert!(matches!(
            StreamClient::new(&creds),
            Err(ProviderError::Credentials(_))
        ));
    }

    #[test]
    fn path_segments_are_escaped() {
        assert_eq!(segment("a/b c"), "a%2Fb%20c");
        assert_eq!(segment("9f3c-11ee"), "9f3c-11ee");
    }
}
