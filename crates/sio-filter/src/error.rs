use sio_types::ErrorCode;

/// Failure reported by a format handler.
///
/// Expected failure modes are reported as a classified [`ErrorCode`]. Any
/// other variant is a fault: the dispatcher logs its message and converts it
/// to [`ErrorCode::ConsoleError`].
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// A classified outcome (wrong header, nothing to load, canceled, ...).
    #[error("{0}")]
    Code(ErrorCode),

    /// I/O error from the underlying file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other runtime failure, with a message for the log.
    #[error("{0}")]
    Failure(String),
}

impl HandlerError {
    /// Create a failure from any displayable message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure(message.into())
    }

    /// The classified code, if this is not a fault.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Code(code) => Some(*code),
            Self::Io(_) | Self::Failure(_) => None,
        }
    }
}

impl From<ErrorCode> for HandlerError {
    fn from(code: ErrorCode) -> Self {
        Self::Code(code)
    }
}

/// Result alias for handler operations.
pub type HandlerResult<T> = Result<T, HandlerError>;

/// Reasons a handler was refused by the registry.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The very same handler instance is already registered.
    #[error("I/O filter '{name}' is already registered")]
    AlreadyRegistered { name: String },

    /// One of the handler's filter strings is claimed by another handler.
    #[error("file filter '{filter}' of filter '{name}' is already handled by another filter ('{other}')")]
    FilterCollision {
        filter: String,
        name: String,
        other: String,
    },
}

/// Result alias for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
