use std::fmt;

use thiserror::Error;

/// Outcome of a load/save operation.
///
/// Every handler operation and every dispatcher entry point resolves to one
/// of these codes. [`ErrorCode::NoError`] is the distinguished success value.
/// The numeric values are stable and round-trip through [`ErrorCode::raw`] /
/// [`ErrorCode::from_raw`]; anything outside the known range is preserved as
/// [`ErrorCode::Unknown`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NoError,
    /// Internal misuse (missing handler, empty filename, ...).
    BadArgument,
    /// No handler matches the file.
    UnknownFile,
    /// Header mismatch.
    WrongFileType,
    Writing,
    Reading,
    NoSave,
    NoLoad,
    BadEntityType,
    /// Cooperative cancellation. Reported as a warning, never as an error.
    CanceledByUser,
    NotEnoughMemory,
    MalformedFile,
    /// Catch-all for faults converted at the dispatcher's fault boundary.
    ConsoleError,
    BrokenDependency,
    WrittenByUnknownPlugin,
    ThirdPartyLibFailure,
    ThirdPartyLibException,
    NotImplemented,
    /// A raw code this version does not know about.
    Unknown(i32),
}

/// How a non-success outcome is reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Warning,
    Error,
}

impl ErrorCode {
    /// Returns `true` for [`ErrorCode::NoError`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::NoError)
    }

    /// Stable numeric value of this code.
    pub fn raw(&self) -> i32 {
        match self {
            Self::NoError => 0,
            Self::BadArgument => 1,
            Self::UnknownFile => 2,
            Self::WrongFileType => 3,
            Self::Writing => 4,
            Self::Reading => 5,
            Self::NoSave => 6,
            Self::NoLoad => 7,
            Self::BadEntityType => 8,
            Self::CanceledByUser => 9,
            Self::NotEnoughMemory => 10,
            Self::MalformedFile => 11,
            Self::ConsoleError => 12,
            Self::BrokenDependency => 13,
            Self::WrittenByUnknownPlugin => 14,
            Self::ThirdPartyLibFailure => 15,
            Self::ThirdPartyLibException => 16,
            Self::NotImplemented => 17,
            Self::Unknown(raw) => *raw,
        }
    }

    /// Decode a numeric code. Unrecognized values map to [`ErrorCode::Unknown`].
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            0 => Self::NoError,
            1 => Self::BadArgument,
            2 => Self::UnknownFile,
            3 => Self::WrongFileType,
            4 => Self::Writing,
            5 => Self::Reading,
            6 => Self::NoSave,
            7 => Self::NoLoad,
            8 => Self::BadEntityType,
            9 => Self::CanceledByUser,
            10 => Self::NotEnoughMemory,
            11 => Self::MalformedFile,
            12 => Self::ConsoleError,
            13 => Self::BrokenDependency,
            14 => Self::WrittenByUnknownPlugin,
            15 => Self::ThirdPartyLibFailure,
            16 => Self::ThirdPartyLibException,
            17 => Self::NotImplemented,
            other => Self::Unknown(other),
        }
    }

    /// User-facing description of the failure.
    ///
    /// `None` means nothing should be displayed: success, cancellation, and
    /// unknown codes stay silent.
    pub fn description(&self) -> Option<&'static str> {
        let text = match self {
            Self::NoError | Self::CanceledByUser | Self::Unknown(_) => return None,
            Self::BadArgument => "bad argument (internal)",
            Self::UnknownFile => "unknown file",
            Self::WrongFileType => "wrong file type (check header)",
            Self::Writing => "writing error (disk full/no access right?)",
            Self::Reading => "reading error (no access right?)",
            Self::NoSave => "nothing to save",
            Self::NoLoad => "nothing to load",
            Self::BadEntityType => "incompatible entity/file types",
            Self::NotEnoughMemory => "not enough memory",
            Self::MalformedFile => "malformed file",
            Self::ConsoleError => "see console",
            Self::BrokenDependency => "dependent entities missing (see Console)",
            Self::WrittenByUnknownPlugin => {
                "the file was written by a plugin but none of the loaded plugins can deserialize it"
            }
            Self::ThirdPartyLibFailure => {
                "the third-party library in charge of saving/loading the file has failed to perform the operation"
            }
            Self::ThirdPartyLibException => {
                "the third-party library in charge of saving/loading the file has thrown an exception"
            }
            Self::NotImplemented => "this function is not implemented yet!",
        };
        Some(text)
    }

    /// Severity of a non-success code. `None` for success and unknown codes.
    pub fn severity(&self) -> Option<Severity> {
        match self {
            Self::NoError | Self::Unknown(_) => None,
            Self::CanceledByUser => Some(Severity::Warning),
            _ => Some(Severity::Error),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoError => write!(f, "no error"),
            Self::CanceledByUser => write!(f, "process canceled by user"),
            Self::Unknown(raw) => write!(f, "unknown error code {raw}"),
            other => write!(f, "{}", other.description().unwrap_or("error")),
        }
    }
}

/// Errors produced when parsing SIO value types from text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown shift handling mode: {0}")]
    UnknownShiftMode(String),
}
