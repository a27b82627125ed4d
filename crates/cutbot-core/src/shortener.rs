//! Shortening port: request/result types shared by the bot core and the
//! HTTP adapter that talks to the shortening service.

use async_trait::async_trait;

use crate::{
    errors::Error,
    validation::{is_valid_alias, is_valid_url},
    Result,
};

/// A validated shortening request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShortenRequest {
    long_url: String,
    alias: Option<String>,
}

impl ShortenRequest {
    pub fn new(long_url: impl Into<String>, alias: Option<String>) -> Result<Self> {
        let long_url = long_url.into();
        if !is_valid_url(&long_url) {
            return Err(Error::Validation(format!("invalid url: {long_url}")));
        }
        if let Some(a) = &alias {
            if !is_valid_alias(a) {
                return Err(Error::Validation(format!("invalid alias: {a}")));
            }
        }
        Ok(Self { long_url, alias })
    }

    pub fn long_url(&self) -> &str {
        &self.long_url
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }
}

/// Which layer a shortening failure came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    /// The service answered with a non-success status code.
    Upstream,
    Timeout,
    Connection,
    /// Non-200 HTTP response.
    Transport,
    /// Anything unexpected inside the client (bad body, missing fields).
    Internal,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShortenResult {
    Success {
        short_url: String,
        already_existed: bool,
    },
    Failure {
        reason: String,
        code: Option<i64>,
        kind: FailureKind,
    },
}

impl ShortenResult {
    pub fn success(short_url: impl Into<String>, already_existed: bool) -> Self {
        Self::Success {
            short_url: short_url.into(),
            already_existed,
        }
    }

    pub fn failure(kind: FailureKind, reason: impl Into<String>, code: Option<i64>) -> Self {
        Self::Failure {
            reason: reason.into(),
            code,
            kind,
        }
    }

    pub fn timeout() -> Self {
        Self::failure(FailureKind::Timeout, "timeout", None)
    }

    pub fn connection_error() -> Self {
        Self::failure(FailureKind::Connection, "connection error", None)
    }

    pub fn transport_error(status: u16) -> Self {
        Self::failure(
            FailureKind::Transport,
            "transport error",
            Some(i64::from(status)),
        )
    }

    pub fn internal(message: impl std::fmt::Display) -> Self {
        Self::failure(
            FailureKind::Internal,
            format!("internal error: {message}"),
            None,
        )
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn short_url(&self) -> Option<&str> {
        match self {
            Self::Success { short_url, .. } => Some(short_url),
            Self::Failure { .. } => None,
        }
    }

    /// Text shown to the user for a failure.
    ///
    /// Upstream reasons are already human-readable; transport and internal
    /// failures collapse into generic messages.
    pub fn user_message(&self) -> Option<String> {
        let Self::Failure { reason, code, kind } = self else {
            return None;
        };
        let msg = match kind {
            FailureKind::Upstream => format!("Cuttly Error: {reason}"),
            FailureKind::Timeout => "Request timeout. Please try again.".to_string(),
            FailureKind::Connection => "Connection error. Check your internet.".to_string(),
            FailureKind::Transport => match code {
                Some(c) => format!("API Error: {c}"),
                None => "API Error".to_string(),
            },
            FailureKind::Internal => "Internal error. Please try again later.".to_string(),
        };
        Some(msg)
    }
}

/// Hexagonal port for the link-shortening backend.
///
/// Implementations never fail past this boundary: every problem is reported
/// as a [`ShortenResult::Failure`].
#[async_trait]
pub trait Shortener: Send + Sync {
    async fn shorten(&self, req: &ShortenRequest) -> ShortenResult;
}
