//! Cross-cutting error types for CarbonMeter.
//!
//! Errors that can originate from any crate. Store errors (`DatabaseError`)
//! and engine policy errors (`EngineError`) live in their own crates; the CLI
//! converges them through `anyhow`.

use thiserror::Error;

/// Errors that can be raised by any CarbonMeter crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// Data failed validation (missing field, out-of-range value, bad pairing).
    #[error("Validation error: {0}")]
    Validation(String),

    /// The factor table has no entry for the requested activity kind.
    #[error("Unknown activity kind: {0}")]
    UnknownActivityKind(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
