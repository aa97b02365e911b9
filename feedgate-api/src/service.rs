//! Social-feed operations expressed in terms of the provider's feeds.
//!
//! A user owns two feeds: `user:<id>` holds their own posts and
//! `timeline:<id>` aggregates the user feeds they follow. Likes are `like`
//! reactions on a post's activity id.

use async_trait::async_trait;
use feedgate_stream::{
    Activity, AddReactionRequest, EnrichedActivity, EnrichmentOptions, FeedProvider, FeedRef,
    Follower, Reaction, ReactionFilter, ReactionPage,
};
use serde_json::{Map, Value};

use crate::error::ServiceError;

pub const POST_VERB: &str = "post";
pub const POST_OBJECT: &str = "1";
pub const POST_CONTENT_FIELD: &str = "post";
pub const LIKE_KIND: &str = "like";

#[async_trait]
pub trait FeedService: Send + Sync {
    /// Publish `content` on the user's own feed.
    async fn add_post(&self, user_id: &str, content: &str) -> Result<Activity, ServiceError>;

    async fn get_posts(&self, user_id: &str) -> Result<Vec<Activity>, ServiceError>;

    /// Posts with their like counts.
    async fn get_post_detail(&self, user_id: &str)
    -> Result<Vec<EnrichedActivity>, ServiceError>;

    /// Ownership of `post_id` is not checked; the provider only removes it if
    /// it lives on this user's feed.
    async fn delete_post(&self, user_id: &str, post_id: &str) -> Result<(), ServiceError>;

    async fn get_timeline(&self, user_id: &str) -> Result<Vec<Activity>, ServiceError>;

    /// Timeline with recent reactions and reaction counts.
    async fn get_timeline_detail(
        &self,
        user_id: &str,
    ) -> Result<Vec<EnrichedActivity>, ServiceError>;

    /// Mirror `target_id`'s posts into `owner_id`'s timeline.
    async fn follow(&self, owner_id: &str, target_id: &str) -> Result<(), ServiceError>;

    async fn unfollow(&self, owner_id: &str, target_id: &str) -> Result<(), ServiceError>;

    /// Feeds following the user's own feed.
    async fn get_followers(&self, user_id: &str) -> Result<Vec<Follower>, ServiceError>;

    /// Feeds the user's timeline follows.
    async fn get_followings(&self, user_id: &str) -> Result<Vec<Follower>, ServiceError>;

    async fn add_like(&self, liker_id: &str, post_id: &str) -> Result<Reaction, ServiceError>;

    /// One page of likes, newest first. `cursor` continues strictly before
    /// that reaction id.
    async fn get_likes(
        &self,
        post_id: &str,
        limit: usize,
        cursor: Option<&str>,
    ) -> Result<ReactionPage, ServiceError>;

    async fn remove_like(&self, reaction_id: &str) -> Result<(), ServiceError>;
}

/// [`FeedService`] over any [`FeedProvider`]; holds nothing but the provider.
#[derive(Debug, Clone)]
pub struct StreamFeedService<P> {
    provider: P,
}

impl<P: FeedProvider> StreamFeedService<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

#[async_trait]
impl<P: FeedProvider> FeedService for StreamFeedService<P> {
    async fn add_post(&self, user_id: &str, content: &str) -> Result<Activity, ServiceError> {
        let feed = FeedRef::user(user_id)?;
        let mut extra = Map::new();
        extra.insert(POST_CONTENT_FIELD.into(), Value::String(content.to_string()));
        let activity = Activity {
            actor: feed.id(),
            verb: POST_VERB.into(),
            object: POST_OBJECT.into(),
            extra,
            ..Default::default()
        };
        Ok(self.provider.add_activity(&feed, activity).await?)
    }

    async fn get_posts(&self, user_id: &str) -> Result<Vec<Activity>, ServiceError> {
        let feed = FeedRef::user(user_id)?;
        Ok(self.provider.get_activities(&feed).await?)
    }

    async fn get_post_detail(
        &self,
        user_id: &str,
    ) -> Result<Vec<EnrichedActivity>, ServiceError> {
        let feed = FeedRef::user(user_id)?;
        let opts = EnrichmentOptions::new()
            .reaction_kinds_filter(LIKE_KIND)
            .reaction_counts();
        Ok(self.provider.get_enriched_activities(&feed, &opts).await?)
    }

    async fn delete_post(&self, user_id: &str, post_id: &str) -> Result<(), ServiceError> {
        let feed = FeedRef::user(user_id)?;
        Ok(self.provider.remove_activity(&feed, post_id).await?)
    }

    async fn get_timeline(&self, user_id: &str) -> Result<Vec<Activity>, ServiceError> {
        let feed = FeedRef::timeline(user_id)?;
        Ok(self.provider.get_activities(&feed).await?)
    }

    async fn get_timeline_detail(
        &self,
        user_id: &str,
    ) -> Result<Vec<EnrichedActivity>, ServiceError> {
        let feed = FeedRef::timeline(user_id)?;
        let opts = EnrichmentOptions::new().recent_reactions().reaction_counts();
        Ok(self.provider.get_enriched_activities(&feed, &opts).await?)
    }

    async fn follow(&self, owner_id: &str, target_id: &str) -> Result<(), ServiceError> {
        let own = FeedRef::timeline(owner_id)?;
        let target = FeedRef::user(target_id)?;
        Ok(self.provider.follow(&own, &target).await?)
    }

    async fn unfollow(&self, owner_id: &str, target_id: &str) -> Result<(), ServiceError> {
        let own = FeedRef::timeline(owner_id)?;
        let target = FeedRef::user(target_id)?;
        Ok(self.provider.unfollow(&own, &target).await?)
    }

    async fn get_followers(&self, user_id: &str) -> Result<Vec<Follower>, ServiceError> {
        let feed = FeedRef::user(user_id)?;
        Ok(self.provider.followers(&feed).await?)
    }

    async fn get_followings(&self, user_id: &str) -> Result<Vec<Follower>, ServiceError> {
        let feed = FeedRef::timeline(user_id)?;
        Ok(self.provider.followings(&feed).await?)
    }

    async fn add_like(&self, liker_id: &str, post_id: &str) -> Result<Reaction, ServiceError> {
        let request = AddReactionRequest {
            kind: LIKE_KIND.into(),
            activity_id: post_id.into(),
            user_id: liker_id.into(),
            ..Default::default()
        };
        Ok(self.provider.add_reaction(request).await?)
    }

    async fn get_likes(
        &self,
        post_id: &str,
        limit: usize,
        cursor: Option<&str>,
    ) -> Result<ReactionPage, ServiceError> {
        let filter = ReactionFilter::by_activity(post_id, LIKE_KIND)
            .limit(limit)
            .id_lt(cursor.map(str::to_string));
        Ok(self.provider.filter_reactions(&filter).await?)
    }

    async fn remove_like(&self, reaction_id: &str) -> Result<(), ServiceError> {
        Ok(self.provider.remove_reaction(reaction_id).await?)
    }
}
