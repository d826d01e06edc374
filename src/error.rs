//! Error types for the slot cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the slot cache.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CacheError {
    /// Key not found (or already swept away by expiration)
    #[error("key not found")]
    NotFound,

    /// No free slot could be obtained even after eviction.
    ///
    /// Only reachable with a zero-capacity configuration; a configuration
    /// error rather than a normal runtime condition.
    #[error("cache capacity exhausted: {0}")]
    CapacityExhausted(String),

    /// The restored slot store failed linkage validation during recovery
    #[error("recovery precondition violated: {0}")]
    RecoveryPrecondition(String),
}

// == Result Type Alias ==
/// Convenience Result type for the slot cache.
pub type Result<T> = std::result::Result<T, CacheError>;
