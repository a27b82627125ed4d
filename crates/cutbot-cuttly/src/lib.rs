//! Cuttly adapter (link shortening).
//!
//! Implements the `cutbot-core` [`Shortener`] port over Cuttly's
//! `api.php` endpoint. One GET per request, no retries.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error, warn};

use cutbot_core::{
    errors::Error,
    shortener::{FailureKind, ShortenRequest, ShortenResult, Shortener},
    Result,
};

mod transport;

pub use transport::{CuttlyTransport, HttpReply, ReqwestTransport, TransportFailure};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Status codes embedded in Cuttly's `url.status` field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CuttlyStatus {
    AlreadyShortened,
    InvalidUrl,
    InvalidAlias,
    AliasTaken,
    InvalidApiKey,
    RateLimited,
    Shortened,
    Blocked,
    Unknown(i64),
}

impl CuttlyStatus {
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::AlreadyShortened,
            2 => Self::InvalidUrl,
            3 => Self::InvalidAlias,
            4 => Self::AliasTaken,
            5 => Self::InvalidApiKey,
            6 => Self::RateLimited,
            7 => Self::Shortened,
            8 => Self::Blocked,
            other => Self::Unknown(other),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Self::AlreadyShortened => 1,
            Self::InvalidUrl => 2,
            Self::InvalidAlias => 3,
            Self::AliasTaken => 4,
            Self::InvalidApiKey => 5,
            Self::RateLimited => 6,
            Self::Shortened => 7,
            Self::Blocked => 8,
            Self::Unknown(c) => c,
        }
    }

    /// Human-readable reason for error statuses; `None` for the two success codes.
    pub fn error_reason(self) -> Option<&'static str> {
        match self {
            Self::Shortened | Self::AlreadyShortened => None,
            Self::InvalidUrl => Some("Invalid URL"),
            Self::InvalidAlias => Some("Invalid custom alias"),
            Self::AliasTaken => Some("Custom alias already taken"),
            Self::InvalidApiKey => Some("Invalid API key"),
            Self::RateLimited => Some("Too many requests"),
            Self::Blocked => Some("URL blocked by Cuttly"),
            Self::Unknown(_) => Some("unknown error"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    url: Option<ApiUrl>,
}

#[derive(Debug, Deserialize)]
struct ApiUrl {
    #[serde(default)]
    status: Option<i64>,
    #[serde(default, rename = "shortLink")]
    short_link: Option<String>,
}

#[derive(Clone)]
pub struct CuttlyClient {
    api_key: String,
    api_url: String,
    transport: Arc<dyn CuttlyTransport>,
}

impl CuttlyClient {
    /// Client backed by `reqwest` with the given request timeout.
    pub fn new(
        api_key: impl Into<String>,
        api_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let transport = ReqwestTransport::new(timeout)?;
        Ok(Self::with_transport(api_key, api_url, Arc::new(transport)))
    }

    pub fn with_transport(
        api_key: impl Into<String>,
        api_url: impl Into<String>,
        transport: Arc<dyn CuttlyTransport>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: api_url.into(),
            transport,
        }
    }

    fn query(&self, req: &ShortenRequest) -> Vec<(&'static str, String)> {
        let mut q = vec![
            ("key", self.api_key.clone()),
            ("short", req.long_url().to_string()),
        ];
        if let Some(alias) = req.alias() {
            q.push(("name", alias.to_string()));
        }
        q
    }
}

impl std::fmt::Debug for CuttlyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CuttlyClient")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Shortener for CuttlyClient {
    async fn shorten(&self, req: &ShortenRequest) -> ShortenResult {
        let reply = match self.transport.get(&self.api_url, &self.query(req)).await {
            Ok(r) => r,
            Err(TransportFailure::Timeout) => {
                warn!(url = req.long_url(), "cuttly request timed out");
                return ShortenResult::timeout();
            }
            Err(TransportFailure::Connect(e)) => {
                warn!(error = %e, "cuttly connection failed");
                return ShortenResult::connection_error();
            }
            Err(TransportFailure::Other(e)) => {
                error!(error = %e, "cuttly request failed");
                return ShortenResult::internal(e);
            }
        };

        if reply.status != 200 {
            warn!(status = reply.status, "cuttly returned non-200");
            return ShortenResult::transport_error(reply.status);
        }

        match interpret_body(&reply.body) {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, "cuttly response could not be interpreted");
                ShortenResult::internal(e)
            }
        }
    }
}

/// Map a 200 response body onto a shortening result.
fn interpret_body(body: &str) -> Result<ShortenResult> {
    let parsed: ApiResponse = serde_json::from_str(body)?;
    let url = parsed.url.unwrap_or(ApiUrl {
        status: None,
        short_link: None,
    });

    let Some(code) = url.status else {
        return Ok(ShortenResult::failure(
            FailureKind::Upstream,
            "unknown error",
            None,
        ));
    };
    let status = CuttlyStatus::from_code(code);
    debug!(?status, "cuttly status");

    if let Some(reason) = status.error_reason() {
        return Ok(ShortenResult::failure(
            FailureKind::Upstream,
            reason,
            Some(status.code()),
        ));
    }

    let short_url = url
        .short_link
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| Error::External("success status without shortLink".to_string()))?;

    Ok(ShortenResult::success(
        short_url,
        status == CuttlyStatus::AlreadyShortened,
    ))
}
