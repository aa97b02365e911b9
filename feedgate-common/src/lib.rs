//! Shared utilities for the feedgate crates.
//!
//! Today this is only the [`observability`] bootstrap: every binary and
//! integration test installs its `tracing` subscriber through
//! [`observability::init_logging`] so log layout and filtering stay uniform.
//!
//! ```rust
//! use feedgate_common::observability::{LogConfig, LogFormat};
//!
//! let cfg = LogConfig {
//!     app_name: "feedgate-doc",
//!     format: LogFormat::Json,
//!     ..LogConfig::default()
//! };
//! assert_eq!(cfg.default_filter, "info");
//! ```
pub mod observability;
