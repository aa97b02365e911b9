//! GetStream Feeds integration surface.
//!
//! `feed` holds the feed handle and read options, `types` the wire models,
//! `token` the server-side JWT, and `client` the HTTP-backed provider. Every
//! provider call is one round-trip; there is no caching or retry here.
pub mod client;
pub mod error;
pub mod feed;
pub mod provider;
pub mod token;
pub mod types;

pub use client::{StreamClient, StreamCredentials};
pub use error::ProviderError;
pub use feed::{EnrichmentOptions, FeedRef, FeedSlug, ReactionFilter};
pub use provider::FeedProvider;
pub use types::{Activity, AddReactionRequest, EnrichedActivity, Follower, Reaction, ReactionPage};
