#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use feedgate_api::{AppState, StreamFeedService, app};
use feedgate_stream::{
    Activity, AddReactionRequest, EnrichedActivity, EnrichmentOptions, FeedProvider, FeedRef,
    Follower, ProviderError, Reaction, ReactionFilter, ReactionPage,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

/// One provider invocation, feeds rendered as `slug:user`.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    AddActivity { feed: String, activity: Activity },
    GetActivities { feed: String },
    GetEnriched { feed: String, query: Vec<(&'static str, String)> },
    RemoveActivity { feed: String, activity_id: String },
    Follow { source: String, target: String },
    Unfollow { source: String, target: String },
    Followers { feed: String },
    Followings { feed: String },
    AddReaction(AddReactionRequest),
    FilterReactions(ReactionFilter),
    RemoveReaction { reaction_id: String },
}

/// Provider substitute that records calls and either answers with canned
/// data or fails every call with `failure`.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<Call>>>,
    failure: Option<String>,
}

impl Recorder {
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> Result<(), ProviderError> {
        self.calls.lock().unwrap().push(call);
        match &self.failure {
            Some(message) => Err(ProviderError::Api {
                status: 503,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

pub fn activity(id: &str, actor: &str) -> Activity {
    Activity {
        id: id.into(),
        actor: actor.into(),
        verb: "post".into(),
        object: "1".into(),
        ..Default::default()
    }
}

#[async_trait]
impl FeedProvider for Recorder {
    async fn add_activity(
        &self,
        feed: &FeedRef,
        activity: Activity,
    ) -> Result<Activity, ProviderError> {
        self.record(Call::AddActivity {
            feed: feed.id(),
            activity: activity.clone(),
        })?;
        Ok(Activity {
            id: "act-1".into(),
            ..activity
        })
    }

    async fn get_activities(&self, feed: &FeedRef) -> Result<Vec<Activity>, ProviderError> {
        self.record(Call::GetActivities { feed: feed.id() })?;
        Ok(vec![activity("a2", &feed.id()), activity("a1", &feed.id())])
    }

    async fn get_enriched_activities(
        &self,
        feed: &FeedRef,
        options: &EnrichmentOptions,
    ) -> Result<Vec<EnrichedActivity>, ProviderError> {
        self.record(Call::GetEnriched {
            feed: feed.id(),
            query: options.to_query(),
        })?;
        let mut enriched = EnrichedActivity {
            id: "a1".into(),
            verb: "post".into(),
            ..Default::default()
        };
        enriched.reaction_counts.insert("like".into(), 2);
        Ok(vec![enriched])
    }

    async fn remove_activity(
        &self,
        feed: &FeedRef,
        activity_id: &str,
    ) -> Result<(), ProviderError> {
        self.record(Call::RemoveActivity {
            feed: feed.id(),
            activity_id: activity_id.into(),
        })
    }

    async fn follow(&self, source: &FeedRef, target: &FeedRef) -> Result<(), ProviderError> {
        self.record(Call::Follow {
            source: source.id(),
            target: target.id(),
        })
    }

    async fn unfollow(&self, source: &FeedRef, target: &FeedRef) -> Result<(), ProviderError> {
        self.record(Call::Unfollow {
            source: source.id(),
            target: target.id(),
        })
    }

    async fn followers(&self, feed: &FeedRef) -> Result<Vec<Follower>, ProviderError> {
        self.record(Call::Followers { feed: feed.id() })?;
        Ok(vec![Follower {
            feed_id: "timeline:fan".into(),
            target_id: feed.id(),
            ..Default::default()
        }])
    }

    async fn followings(&self, feed: &FeedRef) -> Result<Vec<Follower>, ProviderError> {
        self.record(Call::Followings { feed: feed.id() })?;
        Ok(vec![Follower {
            feed_id: feed.id(),
            target_id: "user:idol".into(),
            ..Default::default()
        }])
    }

    async fn add_reaction(&self, request: AddReactionRequest) -> Result<Reaction, ProviderError> {
        self.record(Call::AddReaction(request.clone()))?;
        Ok(Reaction {
            id: "r1".into(),
            kind: request.kind,
            activity_id: request.activity_id,
            user_id: request.user_id,
            ..Default::default()
        })
    }

    async fn filter_reactions(
        &self,
        filter: &ReactionFilter,
    ) -> Result<ReactionPage, ProviderError> {
        self.record(Call::FilterReactions(filter.clone()))?;
        Ok(ReactionPage {
            results: vec![Reaction {
                id: "r9".into(),
                kind: filter.kind.clone(),
                activity_id: filter.activity_id.clone(),
                user_id: "u9".into(),
                ..Default::default()
            }],
            next: String::new(),
        })
    }

    async fn remove_reaction(&self, reaction_id: &str) -> Result<(), ProviderError> {
        self.record(Call::RemoveReaction {
            reaction_id: reaction_id.into(),
        })
    }
}

pub fn router(recorder: &Recorder) -> Router {
    app(AppState::new(StreamFeedService::new(recorder.clone())))
}

/// Send one bodiless request and decode the JSON envelope.
pub async fn send(router: Router, method: Method, uri: &str) -> (StatusCode, Value) {
    let response = router
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}
