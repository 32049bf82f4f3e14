//! Error types for condition compilation and parameter binding.

/// Errors raised while compiling conditions or binding parameters.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// A condition tree or its JSON form is malformed.
    #[error("Invalid condition: {0}")]
    InvalidCondition(String),

    /// A named parameter referenced by the template is not bound.
    #[error("Missing bound parameter ':{0}'")]
    MissingParameter(String),

    /// A named parameter is bound to an empty list; no placeholders can be
    /// emitted for it.
    #[error("Parameter ':{0}' is bound to an empty list")]
    EmptyParameterList(String),
}

/// Result type for query operations.
pub type Result<T> = std::result::Result<T, QueryError>;
