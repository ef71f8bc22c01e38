/// Errors from global shift configuration.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ShiftError {
    /// A threshold must be strictly positive and finite.
    #[error("invalid shift configuration: {field} must be positive (got {value})")]
    NonPositive { field: &'static str, value: f64 },
}

/// Result alias for shift operations.
pub type ShiftResult<T> = Result<T, ShiftError>;
