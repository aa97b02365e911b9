//! Typed gateway configuration loaded from an optional file plus the process
//! environment.
//!
//! Recognised keys (file keys are the lowercase form):
//!
//! | env                   | meaning                                   |
//! |-----------------------|-------------------------------------------|
//! | `PORT`                | listen port, default 8080                 |
//! | `GOSTREAM_API_KEY`    | provider API key (required)               |
//! | `GOSTREAM_API_SECRET` | provider API secret (required)            |
//! | `GOSTREAM_API_REGION` | provider region, empty for the default    |
//! | `GOSTREAM_API_URL`    | full base URL override (proxies, tests)   |
//!
//! Environment values win over file values; empty environment values are
//! ignored. `${VAR}` placeholders inside file values are expanded.
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;
use thiserror::Error;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
pub const DEFAULT_PORT: u16 = 8080;

/// Environment variables the loader reads. Everything else in the process
/// environment is ignored.
pub const ENV_KEYS: [&str; 5] = [
    "PORT",
    "GOSTREAM_API_KEY",
    "GOSTREAM_API_SECRET",
    "GOSTREAM_API_REGION",
    "GOSTREAM_API_URL",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Source(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(#[from] serde_json::Error),

    #[error("{0} is not set")]
    Missing(&'static str),
}

#[derive(Clone, Deserialize)]
pub struct FeedgateConfig {
    #[serde(default = "default_port", deserialize_with = "port_from_any")]
    pub port: u16,
    #[serde(rename = "gostream_api_key", default)]
    pub api_key: String,
    #[serde(rename = "gostream_api_secret", default)]
    pub api_secret: String,
    #[serde(rename = "gostream_api_region", default)]
    pub region: String,
    #[serde(rename = "gostream_api_url", default)]
    pub api_url: Option<String>,
}

impl FeedgateConfig {
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }

    fn validate(mut self) -> Result<Self, ConfigError> {
        self.api_key = self.api_key.trim().to_string();
        self.api_secret = self.api_secret.trim().to_string();
        self.region = self.region.trim().to_string();
        self.api_url = self
            .api_url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());

        if self.api_key.is_empty() {
            return Err(ConfigError::Missing("GOSTREAM_API_KEY"));
        }
        if self.api_secret.is_empty() {
            return Err(ConfigError::Missing("GOSTREAM_API_SECRET"));
        }
        Ok(self)
    }
}

// The secret must never reach logs through `{:?}`.
impl fmt::Debug for FeedgateConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedgateConfig")
            .field("port", &self.port)
            .field("api_key", &self.api_key)
            .field("api_secret", &"***")
            .field("region", &self.region)
            .field("api_url", &self.api_url)
            .finish()
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

/// Environment values always arrive as strings while file values may be
/// numbers.
fn port_from_any<'de, D>(de: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u16),
        Text(String),
    }

    match Raw::deserialize(de)? {
        Raw::Num(n) => Ok(n),
        Raw::Text(s) if s.trim().is_empty() => Ok(DEFAULT_PORT),
        Raw::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid port {s:?}"))),
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

fn environment_snapshot() -> config::Map<String, String> {
    ENV_KEYS
        .iter()
        .filter_map(|key| std::env::var(key).ok().map(|v| (key.to_string(), v)))
        .collect()
}

/// Builder over the `config` crate: files and inline YAML first, then the
/// environment on top at [`FeedgateConfigLoader::load`].
pub struct FeedgateConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for FeedgateConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedgateConfigLoader {
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file; the format is inferred from the suffix.
    /// Loading fails if the file does not exist.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Like [`FeedgateConfigLoader::with_file`] but a missing file is skipped,
    /// so deployments can rely purely on the environment.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet.
    ///
    /// ```
    /// use feedgate_config::FeedgateConfigLoader;
    ///
    /// let cfg = FeedgateConfigLoader::new()
    ///     .with_yaml_str("gostream_api_key: k\ngostream_api_secret: s\nport: 3000")
    ///     .load()
    ///     .expect("valid config");
    /// assert_eq!(cfg.api_key, "k");
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self.builder.add_source(File::from_str(yaml, FileFormat::Yaml));
        self
    }

    /// Merge all sources, expand `${VAR}` placeholders and validate.
    ///
    /// Returns [`ConfigError::Missing`] when the API key or secret is absent
    /// or blank after merging.
    pub fn load(self) -> Result<FeedgateConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::default()
                    .ignore_empty(true)
                    .source(Some(environment_snapshot())),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: FeedgateConfig = serde_json::from_value(v)?;
        typed.validate()
    }
}
