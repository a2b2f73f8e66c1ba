// ─────────────────────────────────────────────────────────────────────
// Trit Kernel — Error Hierarchy
// ─────────────────────────────────────────────────────────────────────

use thiserror::Error;

/// Root error type for all Trit Kernel failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TritError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Invalid input (votes, weights, codes, resolutions).
    #[error("validation error: {0}")]
    Validation(String),

    /// Numerical error (NaN/Inf where a finite value is required).
    #[error("numerical error: {0}")]
    Numerical(String),

    /// Deferral queue is at capacity.
    #[error("deferral queue full: capacity {capacity}")]
    DeferralFull { capacity: usize },

    /// No pending deferral carries this id.
    #[error("unknown deferral id {id}")]
    UnknownDeferral { id: u64 },
}

pub type TritResult<T> = Result<T, TritError>;
