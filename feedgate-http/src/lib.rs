//! Minimal JSON HTTP client with safe logging and flexible auth.
//!
//! - Request options: headers, `Auth` credentials, query params
//! - Redacts sensitive query params and never logs secret values
//! - Exactly one attempt per call; failures surface to the caller as-is
//! - Optional *raw* request/response logging via `FEEDGATE_HTTP_RAW=1`
//!
//! Example (no_run):
//! ```rust
//! # async fn demo() -> Result<(), feedgate_http::HttpError> {
//! let client = feedgate_http::HttpClient::new("https://api.example.com")?;
//! let got: serde_json::Value = client
//!     .get_json("v1/items", feedgate_http::RequestOpts::default())
//!     .await?;
//! # Ok(()) }
//! ```
//!
//! Security: logs only ever include the auth kinds (header/query), not
//! the secrets. The `authorization` header is redacted in raw logs.
//!
//! Observability: structured `tracing` events are emitted for request start,
//! response headers, body snippets (truncated), final errors, and (optionally)
//! raw request/response lines (target `http.raw`) when `FEEDGATE_HTTP_RAW=1`.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::env;
use std::time::Duration;
use thiserror::Error;

// ==============================
// Raw logging toggles
// ==============================

const RAW_ENV: &str = "FEEDGATE_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024; // cap raw body logs (64 KiB)

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

fn is_secret_param(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "api_key" | "api_secret" | "authorization" | "token" | "secret"
    )
}

/// Render a best-effort curl command for repro/debug, with secrets redacted.
fn make_curl(method: &Method, url: &Url, headers: &HeaderMap, body: Option<&[u8]>) -> String {
    let mut parts = vec!["curl".to_string(), format!("-X{}", method)];
    for (name, val) in redact_headers(headers) {
        parts.push(format!("-H '{}: {}'", name, val.replace('\'', r"'\''")));
    }
    if let Some(bytes) = body {
        if let Ok(s) = std::str::from_utf8(bytes) {
            let s = clip(s.to_string(), RAW_MAX_BODY);
            parts.push(format!("-d '{}'", s.replace('\'', r"'\''")));
        } else {
            parts.push(format!("--data-binary @- # ({} bytes)", bytes.len()));
        }
    }
    parts.push(format!("'{}'", redact_url(url)));
    parts.join(" ")
}

/// Redact sensitive headers for logging
fn redact_headers(h: &HeaderMap) -> Vec<(String, String)> {
    h.iter()
        .map(|(k, v)| {
            let key = k.as_str().to_string();
            let mut val = v.to_str().unwrap_or("").to_string();
            if key.eq_ignore_ascii_case("authorization") {
                val = "<redacted>".into();
            }
            (key, val)
        })
        .collect()
}

fn redact_url(url: &Url) -> String {
    let mut out = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if is_secret_param(&k) {
                "<redacted>".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect();
    if pairs.is_empty() {
        return out.to_string();
    }
    out.query_pairs_mut().clear().extend_pairs(pairs);
    out.to_string()
}

// ==============================
// Errors
// ==============================

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
    #[error("server returned error {status}: {message}, request_id={request_id}")]
    Api {
        status: StatusCode,
        message: String,
        request_id: String,
    },
}

// ==============================
// Auth & Request Options
// ==============================

/// One credential attached to a request. A request may carry several, e.g.
/// a key in the query plus a signed token in a header.
///
/// ```
/// use feedgate_http::Auth;
/// use std::borrow::Cow;
///
/// let key = Auth::Query { name: "api_key", value: Cow::Borrowed("k") };
/// assert_eq!(key.kind(), "query");
/// ```
#[derive(Clone, Debug)]
pub enum Auth<'a> {
    /// Custom header (e.g. a raw JWT in `Authorization`)
    Header {
        name: HeaderName,
        value: HeaderValue,
    },
    /// Query param, appended after the regular query pairs
    Query {
        name: &'a str,
        value: Cow<'a, str>,
    },
}

impl Auth<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            Auth::Header { .. } => "header",
            Auth::Query { .. } => "query",
        }
    }
}

/// Per-request options for the HTTP client.
///
/// ```
/// use feedgate_http::{Auth, RequestOpts};
/// use std::borrow::Cow;
///
/// let opts = RequestOpts {
///     auth: vec![Auth::Query {
///         name: "api_key",
///         value: Cow::Borrowed("demo"),
///     }],
///     ..Default::default()
/// };
///
/// assert_eq!(opts.auth.len(), 1);
/// assert!(opts.query.is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts<'a> {
    pub auth: Vec<Auth<'a>>,
    pub headers: Option<HeaderMap>,
    pub query: Option<Vec<(&'a str, Cow<'a, str>)>>, // e.g. [("limit", "10".into())]
}

// ==============================
// Client
// ==============================

#[derive(Clone, Debug)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    pub default_timeout: Duration,
}

impl HttpClient {
    /// Construct a client anchored to a base URL.
    ///
    /// The base should end with `/` when it carries a path prefix, otherwise
    /// relative paths replace its last segment.
    ///
    /// ```no_run
    /// use feedgate_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://api.example.com/api/v1.0/")?;
    /// assert_eq!(client.default_timeout, Duration::from_secs(15));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let base = Url::parse(base).map_err(|e| HttpError::Url(e.to_string()))?;
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            default_timeout: Duration::from_secs(15),
        })
    }

    /// Override the default timeout returned by [`HttpClient::new`].
    ///
    /// ```no_run
    /// use feedgate_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://api.example.com")?
    ///     .with_timeout(Duration::from_secs(2));
    /// assert_eq!(client.default_timeout, Duration::from_secs(2));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = dur;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// GET JSON with per-request options (headers/query/auth).
    pub async fn get_json<T>(&self, path: &str, opts: RequestOpts<'_>) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        let (bytes, req_id) = self.execute::<()>(Method::GET, path, None, opts).await?;
        decode_json(&bytes, &req_id)
    }

    /// POST JSON with per-request options (headers/query/auth).
    pub async fn post_json<B, T>(
        &self,
        path: &str,
        body: &B,
        opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let (bytes, req_id) = self.execute(Method::POST, path, Some(body), opts).await?;
        decode_json(&bytes, &req_id)
    }

    /// POST JSON and ignore the response body beyond its status.
    pub async fn post_unit<B>(
        &self,
        path: &str,
        body: &B,
        opts: RequestOpts<'_>,
    ) -> Result<(), HttpError>
    where
        B: Serialize + ?Sized,
    {
        self.execute(Method::POST, path, Some(body), opts).await?;
        Ok(())
    }

    /// DELETE; only the status matters, the body is discarded.
    pub async fn delete(&self, path: &str, opts: RequestOpts<'_>) -> Result<(), HttpError> {
        self.execute::<()>(Method::DELETE, path, None, opts).await?;
        Ok(())
    }

    // ==============================
    // Core request implementation
    // ==============================

    async fn execute<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        opts: RequestOpts<'_>,
    ) -> Result<(bytes::Bytes, String), HttpError>
    where
        B: Serialize + ?Sized,
    {
        let url = self
            .base
            .join(path)
            .map_err(|e| HttpError::Url(e.to_string()))?;

        let mut rb = self.inner.request(method.clone(), url.clone());

        let timeout = self.default_timeout;
        rb = rb.timeout(timeout);

        // Query pairs, with query-style credentials appended last.
        let mut query: Vec<(&str, Cow<'_, str>)> = opts.query.clone().unwrap_or_default();
        for auth in &opts.auth {
            if let Auth::Query { name, value } = auth {
                query.push((*name, value.clone()));
            }
        }
        if !query.is_empty() {
            let pairs: Vec<(&str, &str)> = query.iter().map(|(k, v)| (*k, v.as_ref())).collect();
            rb = rb.query(&pairs);
        }

        // Serialize ourselves so we can log the exact bytes.
        let mut request_body_bytes: Option<Vec<u8>> = None;
        if let Some(b) = body {
            let bytes = serde_json::to_vec(b).map_err(|e| HttpError::Build(e.to_string()))?;
            request_body_bytes = Some(bytes.clone());
            rb = rb
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(bytes);
        }

        let mut merged = opts.headers.clone().unwrap_or_default();
        for auth in &opts.auth {
            if let Auth::Header { name, value } = auth {
                merged.insert(name.clone(), value.clone());
            }
        }
        if !merged.is_empty() {
            rb = rb.headers(merged.clone());
        }

        // ----- Safe request logging (pre-send) -----
        let auth_kinds: Vec<&str> = opts.auth.iter().map(Auth::kind).collect();

        let redacted_q: Vec<(String, String)> = query
            .iter()
            .map(|(k, v)| {
                let shown = if is_secret_param(k) {
                    "<redacted>".to_string()
                } else {
                    v.as_ref().to_string()
                };
                ((*k).to_string(), shown)
            })
            .collect();

        let req_id = format!("r{}", uuid::Uuid::new_v4().simple());

        tracing::debug!(
            req_id=%req_id,
            method=%method,
            host_path=%format!("{}{}", url.host_str().unwrap_or("-"), url.path()),
            query=?redacted_q,
            timeout_ms=timeout.as_millis() as u64,
            auth=?auth_kinds,
            has_body=%body.is_some(),
            "http.request.start"
        );

        if raw_enabled() {
            let curl = make_curl(&method, &url, &merged, request_body_bytes.as_deref());
            tracing::debug!(target: "http.raw", %req_id, %curl, "request");
        }

        // ----- Send -----
        let t0 = std::time::Instant::now();
        let resp = rb.send().await.map_err(|err| {
            let message = err.to_string();
            tracing::warn!(req_id=%req_id, message=%message, "http.network_error.send");
            HttpError::Network(message)
        })?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = resp.bytes().await.map_err(|err| {
            let message = err.to_string();
            tracing::warn!(req_id=%req_id, message=%message, "http.network_error.body");
            HttpError::Network(message)
        })?;
        let dur_ms = t0.elapsed().as_millis() as u64;

        let req_hdr_id = headers
            .get("x-request-id")
            .or_else(|| headers.get("x-correlation-id"))
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");

        let limit = headers
            .get("x-ratelimit-limit")
            .and_then(|v| v.to_str().ok());
        let remain = headers
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok());

        tracing::debug!(
            req_id=%req_id,
            %status,
            duration_ms=dur_ms,
            body_len=bytes.len(),
            x_request_id=%req_hdr_id,
            rate_limit.limit=?limit,
            rate_limit.remaining=?remain,
            "http.response.headers"
        );

        if raw_enabled() {
            let hdrs = redact_headers(&headers);
            let mut body_snip = bytes.to_vec();
            let truncated = body_snip.len() > RAW_MAX_BODY;
            if truncated {
                body_snip.truncate(RAW_MAX_BODY);
            }
            let text = String::from_utf8_lossy(&body_snip);
            tracing::info!(
                target:"http.raw",
                %req_id,
                status=%status,
                duration_ms=dur_ms,
                headers=?hdrs,
                body=%text,
                truncated
            );
        }

        let snippet = snip_body(&bytes);
        tracing::trace!(
            req_id=%req_id,
            body_snippet=%snippet,
            "http.response.body_snippet"
        );

        if status.is_success() {
            return Ok((bytes, req_id));
        }

        let message = extract_error_message(&bytes);
        let request_id = req_hdr_id.to_string();
        tracing::warn!(
            req_id=%req_id,
            %status,
            message=%message,
            x_request_id=%request_id,
            body_snippet=%snippet,
            "http.error"
        );
        Err(HttpError::Api {
            status,
            message,
            request_id,
        })
    }
}

// ==============================
// Helpers
// ==============================

fn decode_json<T: DeserializeOwned>(bytes: &[u8], req_id: &str) -> Result<T, HttpError> {
    serde_json::from_slice::<T>(bytes).map_err(|e| {
        let snippet = snip_body(bytes);
        tracing::warn!(
            req_id=%req_id,
            serde_line=%e.line(),
            serde_col=%e.column(),
            serde_err=%e.to_string(),
            body_snippet=%snippet,
            "http.response.decode_error"
        );
        HttpError::Decode(e.to_string(), snippet)
    })
}

/// Pull a human-readable message out of an error body.
///
/// Feed-provider errors look like
/// `{"detail": "...", "exception": "NotAllowedException", "code": 17}`;
/// anything else falls back to `message`/`error` and finally a body snippet.
fn extract_error_message(body: &[u8]) -> String {
    #[derive(Deserialize)]
    struct Msg {
        #[serde(default)]
        detail: String,
        #[serde(default)]
        message: String,
        #[serde(default)]
        error: serde_json::Value,
        #[serde(default)]
        exception: String,
    }

    if let Ok(m) = serde_json::from_slice::<Msg>(body) {
        if !m.detail.is_empty() {
            return m.detail;
        }
        if !m.message.is_empty() {
            return m.message;
        }
        match m.error {
            serde_json::Value::String(s) if !s.is_empty() => return s,
            serde_json::Value::Object(obj) => {
                if let Some(s) = obj.get("message").and_then(|v| v.as_str()) {
                    return s.to_string();
                }
            }
            _ => {}
        }
        if !m.exception.is_empty() {
            return m.exception;
        }
    }
    snip_body(body)
}

fn snip_body(body: &[u8]) -> String {
    clip(String::from_utf8_lossy(body).into_owned(), 500)
}

/// Cut `s` to at most `max` bytes on a char boundary, marking the cut with `...`.
fn clip(mut s: String, max: usize) -> String {
    if s.len() > max {
        let mut cut = max;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        s.truncate(cut);
        s.push_str("...");
    }
    s
}
