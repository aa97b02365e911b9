//! HTTP surface of feedgate: the `/api/v1` router, its handlers, the reply
//! envelope and the feed service they delegate to.
//!
//! ```no_run
//! # async fn run(client: feedgate_stream::StreamClient) -> std::io::Result<()> {
//! use feedgate_api::{AppState, StreamFeedService, app};
//!
//! let router = app(AppState::new(StreamFeedService::new(client)));
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, router).await
//! # }
//! ```
pub mod envelope;
pub mod error;
pub mod handlers;
pub mod service;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    middleware::map_response,
    routing::{get, post},
};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

pub use envelope::{Envelope, Payload};
pub use error::{ApiError, ServiceError};
pub use service::{FeedService, StreamFeedService};

/// Upper bound for one inbound request, provider round-trip included.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<dyn FeedService>,
}

impl AppState {
    pub fn new(service: impl FeedService + 'static) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

fn api_routes() -> Router<AppState> {
    Router::new()
        // posts
        .route("/post", post(handlers::add_post).delete(handlers::delete_post))
        .route("/post/:userSerial/summary", get(handlers::get_posts))
        .route("/post/:userSerial/detail", get(handlers::get_post_detail))
        // timeline
        .route("/timeline/:userSerial/summary", get(handlers::get_timeline))
        .route("/timeline/:userSerial/detail", get(handlers::get_timeline_detail))
        // follow graph
        .route("/user/follow", post(handlers::follow))
        .route("/user/unfollow", post(handlers::unfollow))
        .route("/user/:userSerial/followers", get(handlers::get_followers))
        .route("/user/:userSerial/following", get(handlers::get_followings))
        // likes; GET takes a post id, DELETE a reaction id
        .route("/like", post(handlers::add_like))
        .route(
            "/like/:id",
            get(handlers::get_likes).delete(handlers::remove_like),
        )
        .route("/like/:id/:nextLikeID", get(handlers::get_likes_page))
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_routes())
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(map_response(handlers::envelope_bare_errors))
        .with_state(state)
}
