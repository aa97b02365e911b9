//! Feed handles and read-side option sets.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use super::error::ProviderError;

fn feed_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[\w-]+$").expect("static feed id pattern"))
}

/// The two feed groups this service reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedSlug {
    /// A user's own posts.
    User,
    /// Aggregated activities of the feeds a user follows.
    Timeline,
}

impl FeedSlug {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedSlug::User => "user",
            FeedSlug::Timeline => "timeline",
        }
    }
}

impl fmt::Display for FeedSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle to one provider feed (`<slug>:<user_id>`).
///
/// ```
/// use feedgate_stream::{FeedRef, FeedSlug};
///
/// let feed = FeedRef::user("u1").unwrap();
/// assert_eq!(feed.slug(), FeedSlug::User);
/// assert_eq!(feed.id(), "user:u1");
/// assert!(FeedRef::timeline("not valid!").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeedRef {
    slug: FeedSlug,
    user_id: String,
}

impl FeedRef {
    pub fn new(slug: FeedSlug, user_id: impl Into<String>) -> Result<Self, ProviderError> {
        let user_id = user_id.into();
        if !feed_id_pattern().is_match(&user_id) {
            return Err(ProviderError::InvalidFeed {
                slug: slug.as_str().to_string(),
                user_id,
            });
        }
        Ok(Self { slug, user_id })
    }

    pub fn user(user_id: impl Into<String>) -> Result<Self, ProviderError> {
        Self::new(FeedSlug::User, user_id)
    }

    pub fn timeline(user_id: impl Into<String>) -> Result<Self, ProviderError> {
        Self::new(FeedSlug::Timeline, user_id)
    }

    pub fn slug(&self) -> FeedSlug {
        self.slug
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Provider-wide feed id, also used as an activity actor.
    pub fn id(&self) -> String {
        format!("{}:{}", self.slug, self.user_id)
    }

    /// Relative endpoint path, e.g. `feed/user/u1/`.
    pub(crate) fn endpoint(&self) -> String {
        format!("feed/{}/{}/", self.slug, self.user_id)
    }
}

impl fmt::Display for FeedRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.slug, self.user_id)
    }
}

/// Additive enrichment flags for enriched feed reads.
///
/// ```
/// use feedgate_stream::EnrichmentOptions;
///
/// let opts = EnrichmentOptions::new()
///     .reaction_kinds_filter("like")
///     .reaction_counts();
/// assert_eq!(
///     opts.to_query(),
///     vec![
///         ("withReactionCounts", "true".to_string()),
///         ("reactionKindsFilter", "like".to_string()),
///     ]
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichmentOptions {
    kinds_filter: Vec<String>,
    reaction_counts: bool,
    recent_reactions: bool,
}

impl EnrichmentOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict enriched reactions to `kind`; repeated calls accumulate.
    pub fn reaction_kinds_filter(mut self, kind: impl Into<String>) -> Self {
        let kind = kind.into();
        if !self.kinds_filter.contains(&kind) {
            self.kinds_filter.push(kind);
        }
        self
    }

    pub fn reaction_counts(mut self) -> Self {
        self.reaction_counts = true;
        self
    }

    pub fn recent_reactions(mut self) -> Self {
        self.recent_reactions = true;
        self
    }

    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut q = Vec::new();
        if self.recent_reactions {
            q.push(("withRecentReactions", "true".to_string()));
        }
        if self.reaction_counts {
            q.push(("withReactionCounts", "true".to_string()));
        }
        if !self.kinds_filter.is_empty() {
            q.push(("reactionKindsFilter", self.kinds_filter.join(",")));
        }
        q
    }
}

/// Reaction lookup scoped to one activity and kind.
///
/// `id_lt` is an exclusive upper bound: only reactions ordered before that
/// reaction id are returned, which is how callers page backwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionFilter {
    pub activity_id: String,
    pub kind: String,
    pub limit: usize,
    pub id_lt: Option<String>,
}

impl ReactionFilter {
    pub const DEFAULT_LIMIT: usize = 10;

    pub fn by_activity(activity_id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            activity_id: activity_id.into(),
            kind: kind.into(),
            limit: Self::DEFAULT_LIMIT,
            id_lt: None,
        }
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn id_lt(mut self, cursor: Option<String>) -> Self {
        self.id_lt = cursor.filter(|c| !c.is_empty());
        self
    }
}
