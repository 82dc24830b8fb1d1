//! Engine error taxonomy.

use std::time::Duration;

use vitrine_model::ThemeId;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Every way a remote interaction can go wrong, from this engine's
/// perspective. Fallback-path `Network`/`Parse` failures are absorbed into
/// empty-result settlements by the favorites synchronizer rather than
/// propagated; apply/remove failures are surfaced to the user.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    #[error("network error: {0}")]
    Network(String),

    #[error("malformed payload: {0}")]
    Parse(String),

    #[error("no transport settled within {timeout:?}")]
    TimeoutExhausted { timeout: Duration },

    #[error("unknown theme: {0}")]
    NotFound(ThemeId),

    #[error("config error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for EngineError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            EngineError::Parse(err.to_string())
        } else {
            EngineError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Parse(err.to_string())
    }
}

impl From<url::ParseError> for EngineError {
    fn from(err: url::ParseError) -> Self {
        EngineError::Config(format!("invalid URL: {err}"))
    }
}
