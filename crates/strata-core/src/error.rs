//! Error types shared by the strata compilers.

/// Errors raised by the core types.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A dialect name did not match any supported backend.
    #[error("Unknown dialect: '{0}'")]
    UnknownDialect(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
