//! `sio.toml` support.
//!
//! ```toml
//! shift_handling_mode = "apply-and-remember"
//!
//! [shift]
//! destination_precision = "single"
//! max_abs_coordinate = 10000.0
//! shift_rounding = 100.0
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sio_shift::{ShiftConfig, ShiftError};
use sio_types::ShiftHandlingMode;

/// Name of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "sio.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Invalid(#[from] ShiftError),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SioConfig {
    pub shift: ShiftConfig,
    /// Used when `--shift-mode` is not given.
    pub shift_handling_mode: ShiftHandlingMode,
}

impl SioConfig {
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.shift.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Load `explicit` if given, else `./sio.toml` if present, else defaults.
    pub fn resolve(explicit: Option<&Path>) -> ConfigResult<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => Self::load(DEFAULT_CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }
}
