//! Engine error taxonomy.

use cm_core::errors::CoreError;
use cm_db::error::DatabaseError;
use thiserror::Error;

/// Errors surfaced by engine operations.
///
/// Predictor failures never appear here; the forecast filler recovers from
/// them with the statistical fallback.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Bad or missing input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The factor table cannot price this activity.
    #[error("Unknown activity kind: {0}")]
    UnknownActivityKind(String),

    /// Too few real observations in the window to fill gaps.
    #[error("Insufficient history: {real_observations} real observations, {required} required")]
    InsufficientHistory { real_observations: u32, required: u32 },

    /// Credits can only be earned from verified reductions.
    #[error("Unverified source: credits can only be earned from verified reductions")]
    UnverifiedSource,

    #[error("Price {price} per credit is outside the allowed band {min}..={max}")]
    PriceOutOfRange { price: f64, min: f64, max: f64 },

    #[error("Insufficient balance: {available} credits available, {requested} requested")]
    InsufficientBalance { available: f64, requested: f64 },

    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl EngineError {
    /// `true` for refusals that are reported rather than failed on.
    #[must_use]
    pub const fn is_informational(&self) -> bool {
        matches!(self, Self::InsufficientHistory { .. })
    }

    pub(crate) fn organization_not_found(id: &str) -> Self {
        Self::NotFound {
            entity_type: "organization".into(),
            id: id.to_string(),
        }
    }
}

impl From<CoreError> for EngineError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound { entity_type, id } => Self::NotFound { entity_type, id },
            CoreError::Validation(msg) => Self::Validation(msg),
            CoreError::UnknownActivityKind(kind) => Self::UnknownActivityKind(kind),
            CoreError::Other(e) => Self::Database(DatabaseError::Other(e)),
        }
    }
}
