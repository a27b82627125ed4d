/// Core error type for the link bot.
///
/// Adapter crates should map their specific errors into this type so the bot
/// core can handle failures consistently. Shortening failures are not errors:
/// they travel as [`crate::shortener::ShortenResult::Failure`] values.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;
