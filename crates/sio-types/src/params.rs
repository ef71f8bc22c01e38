use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::vector::Vector3;

/// Policy for resolving precision-loss risk on large coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShiftHandlingMode {
    /// Ask the user for every item, even when no shift is needed.
    AlwaysAsk,
    /// Ask the user only when a coordinate is at risk.
    #[default]
    AskIfNecessary,
    /// Apply the suggested shift silently, item by item.
    AlwaysApply,
    /// Never shift.
    Never,
    /// Apply the suggested shift silently and reuse it for the rest of the batch.
    ApplyAndRemember,
}

impl ShiftHandlingMode {
    /// Kebab-case name, as accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AlwaysAsk => "always-ask",
            Self::AskIfNecessary => "ask-if-necessary",
            Self::AlwaysApply => "always-apply",
            Self::Never => "never",
            Self::ApplyAndRemember => "apply-and-remember",
        }
    }

    /// Returns `true` if this mode may consult an interactive prompt.
    pub fn is_interactive(&self) -> bool {
        matches!(self, Self::AlwaysAsk | Self::AskIfNecessary)
    }
}

impl fmt::Display for ShiftHandlingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShiftHandlingMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always-ask" => Ok(Self::AlwaysAsk),
            "ask-if-necessary" => Ok(Self::AskIfNecessary),
            "always-apply" => Ok(Self::AlwaysApply),
            "never" => Ok(Self::Never),
            "apply-and-remember" => Ok(Self::ApplyAndRemember),
            other => Err(ParseError::UnknownShiftMode(other.to_string())),
        }
    }
}

/// Caller-owned storage for a coordinate shift shared across a batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CoordinatesShift {
    pub enabled: bool,
    pub shift: Vector3,
}

/// Parameters carried through a single load call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LoadParameters {
    /// Shift storage. `None` means the caller keeps no shift across items,
    /// so "apply to all" decisions cannot be remembered.
    pub coordinates_shift: Option<CoordinatesShift>,
    /// Whether the shift should be kept when the data is saved again.
    pub preserve_shift_on_save: bool,
    pub shift_handling_mode: ShiftHandlingMode,
    /// Set by the dispatcher: `true` for the first load of a session.
    pub session_start: bool,
    /// Forwarded to handlers that can show their own options dialog.
    pub always_display_load_dialog: bool,
}

impl LoadParameters {
    /// Parameters with shift storage attached, so batch decisions persist.
    pub fn with_shift_storage(mode: ShiftHandlingMode) -> Self {
        Self {
            coordinates_shift: Some(CoordinatesShift::default()),
            shift_handling_mode: mode,
            ..Self::default()
        }
    }

    /// The active shift, if one is enabled and stored.
    pub fn active_shift(&self) -> Option<Vector3> {
        self.coordinates_shift
            .filter(|cs| cs.enabled)
            .map(|cs| cs.shift)
    }
}

/// Parameters carried through a single save call. Opaque to the dispatcher.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SaveParameters {
    pub always_display_save_dialog: bool,
}
