//! # Error — Typed failures at the engine boundary
//!
//! Inside the crate, `anyhow` carries errors the way it carries them
//! everywhere else here: freely, with context strings. At the engine boundary
//! the picture narrows to four kinds a caller can actually branch on, so the
//! request layer can tell "you asked for something malformed" apart from
//! "the computation blew up".

use thiserror::Error;

/// Errors surfaced by [`crate::engine::Engine`].
///
/// The first three are request-validation failures, raised before any sieving
/// starts. `Computation` covers everything that goes wrong afterwards; it
/// wraps the original cause and the calculation it came from is discarded as
/// a whole, never returned partially.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The request itself is malformed: ceiling of 0 or 1, or a keep-last
    /// count of 0.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No registered algorithm matches the requested identifier.
    #[error("unknown algorithm '{requested}' (known: {known})")]
    UnknownAlgorithm { requested: String, known: String },

    /// The ceiling lies above the selected algorithm's declared maximum.
    #[error("algorithm '{algorithm}' supports ceilings up to {limit}, got {ceiling}")]
    RangeExceeded {
        algorithm: String,
        ceiling: u64,
        limit: u64,
    },

    /// A sieving task or segment executor failed mid-calculation.
    #[error("computation failed: {cause:#}")]
    Computation { cause: anyhow::Error },
}

impl From<anyhow::Error> for EngineError {
    fn from(cause: anyhow::Error) -> Self {
        EngineError::Computation { cause }
    }
}
