//! Activity-feed provider clients used by feedgate.
//!
//! Only the GetStream Feeds REST API is implemented. The [`FeedProvider`]
//! trait is the seam the service layer programs against; [`StreamClient`] is
//! its single concrete implementation.
pub mod getstream;

pub use getstream::{
    Activity, AddReactionRequest, EnrichedActivity, EnrichmentOptions, FeedProvider, FeedRef,
    FeedSlug, Follower, ProviderError, Reaction, ReactionFilter, ReactionPage, StreamClient,
    StreamCredentials,
};
