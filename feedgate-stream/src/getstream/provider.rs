use async_trait::async_trait;

use super::error::ProviderError;
use super::feed::{EnrichmentOptions, FeedRef, ReactionFilter};
use super::types::{Activity, AddReactionRequest, EnrichedActivity, Follower, Reaction, ReactionPage};

/// Feed-scoped operations offered by the remote activity-feed provider.
///
/// Every method is exactly one remote call. Implementations keep no state
/// beyond their client handle, so a single instance is shared across all
/// requests.
#[async_trait]
pub trait FeedProvider: Send + Sync {
    /// Append `activity` to `feed`; returns it with the provider-assigned id.
    async fn add_activity(&self, feed: &FeedRef, activity: Activity)
    -> Result<Activity, ProviderError>;

    /// Most-recent-first, exactly as the provider orders them.
    async fn get_activities(&self, feed: &FeedRef) -> Result<Vec<Activity>, ProviderError>;

    async fn get_enriched_activities(
        &self,
        feed: &FeedRef,
        options: &EnrichmentOptions,
    ) -> Result<Vec<EnrichedActivity>, ProviderError>;

    async fn remove_activity(&self, feed: &FeedRef, activity_id: &str)
    -> Result<(), ProviderError>;

    /// Mirror future activities of `target` into `source`.
    async fn follow(&self, source: &FeedRef, target: &FeedRef) -> Result<(), ProviderError>;

    /// Undo [`FeedProvider::follow`]; repeating it is not an error.
    async fn unfollow(&self, source: &FeedRef, target: &FeedRef) -> Result<(), ProviderError>;

    /// Feeds following `feed`.
    async fn followers(&self, feed: &FeedRef) -> Result<Vec<Follower>, ProviderError>;

    /// Feeds that `feed` follows.
    async fn followings(&self, feed: &FeedRef) -> Result<Vec<Follower>, ProviderError>;

    async fn add_reaction(&self, request: AddReactionRequest) -> Result<Reaction, ProviderError>;

    async fn filter_reactions(&self, filter: &ReactionFilter)
    -> Result<ReactionPage, ProviderError>;

    async fn remove_reaction(&self, reaction_id: &str) -> Result<(), ProviderError>;
}
