//! Domain error type shared across the workspace.

/// Domain-level error taxonomy.
///
/// HTTP mapping lives in the API crate; this enum only captures the
/// kind of failure, not how it is rendered.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// An entity that should exist was not found. Callers should treat
    /// this as retryable when it follows a successful `ensure`.
    #[error("{entity} '{id}' not found")]
    NotFound {
        entity: &'static str,
        id: String,
    },

    /// A caller-supplied value failed validation.
    #[error("{0}")]
    Validation(String),

    /// The tenant has no usable credential anywhere in the chain.
    #[error("{0}")]
    Unauthorized(String),

    /// An unexpected internal failure.
    #[error("{0}")]
    Internal(String),
}
