//! Logging bootstrap shared by the feedgate binary and its tests.
//!
//! Env overrides: `FEEDGATE_LOG_DIR`, `FEEDGATE_LOG_FORMAT`,
//! `FEEDGATE_LOG_STDERR`, and `RUST_LOG` for the filter.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;

use anyhow::Context;
use chrono::Local;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();
static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();

const LOG_DIR_ENV: &str = "FEEDGATE_LOG_DIR";
const LOG_FORMAT_ENV: &str = "FEEDGATE_LOG_FORMAT";
const LOG_STDERR_ENV: &str = "FEEDGATE_LOG_STDERR";

/// Output encoding for structured logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "text" | "plain" | "" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

/// Configuration passed to [`init_logging`].
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Logical name of the component (used for defaults and file names).
    pub app_name: &'static str,
    /// Optional explicit directory for log output. If `None`, we consult
    /// `FEEDGATE_LOG_DIR` and finally fall back to `~/.local/share/<app_name>`.
    pub log_dir: Option<PathBuf>,
    /// Whether to duplicate events to `stderr` in addition to the file sink.
    pub emit_stderr: bool,
    /// Preferred log encoding.
    pub format: LogFormat,
    /// Default filter applied when `RUST_LOG` is unset.
    pub default_filter: &'static str,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            app_name: "feedgate",
            log_dir: None,
            emit_stderr: false,
            format: LogFormat::Text,
            default_filter: "info",
        }
    }
}

impl LogConfig {
    /// Defaults for `app_name`, overlaid with `FEEDGATE_LOG_FORMAT`
    /// (`text`/`json`) and `FEEDGATE_LOG_STDERR` (`1`/`true`/`yes`).
    ///
    /// An unparseable format falls back to text.
    pub fn from_env(app_name: &'static str) -> Self {
        let format = std::env::var(LOG_FORMAT_ENV)
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(LogFormat::Text);
        let emit_stderr = matches!(
            std::env::var(LOG_STDERR_ENV).as_deref(),
            Ok("1") | Ok("true") | Ok("yes")
        );
        Self {
            app_name,
            format,
            emit_stderr,
            ..Self::default()
        }
    }
}

/// Install the global subscriber: a daily-rolling file under the resolved log
/// directory, plus stderr when asked for.
///
/// Returns today's log file path. Only the first call installs anything;
/// later calls hand back the path resolved the first time.
pub fn init_logging(config: LogConfig) -> anyhow::Result<PathBuf> {
    if let Some(path) = LOG_PATH.get() {
        return Ok(path.clone());
    }

    let dir = resolve_log_dir(config.app_name, config.log_dir.as_deref());
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("cannot create log directory {}", dir.display()))?;

    // tracing-appender names daily files `<prefix>.<YYYY-MM-DD>`.
    let prefix = format!("{}.log", config.app_name);
    let current = dir.join(format!("{prefix}.{}", Local::now().format("%Y-%m-%d")));

    let (file, guard) = tracing_appender::non_blocking(rolling::daily(&dir, &prefix));
    let _ = LOG_GUARD.set(guard);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_filter));
    let json = config.format == LogFormat::Json;
    let stderr = config.emit_stderr;

    tracing_subscriber::registry()
        .with(filter)
        .with((!json).then(|| fmt::layer().with_writer(file.clone()).with_ansi(false)))
        .with(json.then(|| fmt::layer().json().with_writer(file)))
        .with((stderr && !json).then(|| fmt::layer().with_writer(std::io::stderr)))
        .with((stderr && json).then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .try_init()
        .context("a global tracing subscriber is already installed")?;

    let _ = LOG_PATH.set(current.clone());
    Ok(current)
}

fn resolve_log_dir(app_name: &str, explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(LOG_DIR_ENV).map(PathBuf::from))
        .map(|dir| expand_home(&dir))
        .unwrap_or_else(|| default_data_dir(app_name))
}

fn home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), home()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

/// `~/.local/share/<app>`, or `./<app>` without a home directory.
fn default_data_dir(app_name: &str) -> PathBuf {
    home()
        .map(|h| h.join(".local/share"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(app_name)
}
