//! Predictor error types.

use thiserror::Error;

/// Errors from the remote forecasting oracle.
///
/// None of these reach end callers; the forecast filler logs them and
/// switches to the statistical fallback.
#[derive(Debug, Error)]
pub enum PredictorError {
    /// No predictor is configured, or it refused to answer.
    #[error("predictor unavailable: {0}")]
    Unavailable(String),

    /// HTTP transport error, including timeouts.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The predictor returned a non-success status code.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the predictor.
        status: u16,
        /// Error message or response body.
        message: String,
    },

    /// The response body was not a prediction.
    #[error("parse error: {0}")]
    Parse(String),

    /// The response parsed but carries an unusable value.
    #[error("invalid prediction: {0}")]
    InvalidPrediction(String),
}

impl PredictorError {
    /// Whether the failure was the client-side timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Http(e) if e.is_timeout())
    }
}
