use std::path::Path;
use std::sync::Arc;

use sio_types::{Entity, ErrorCode, LoadParameters, SaveParameters};

use crate::error::HandlerResult;

/// Shared reference to a registered handler.
pub type SharedHandler = Arc<dyn FormatHandler>;

/// Load/save implementation for one family of file formats.
///
/// Handlers only produce classified outcomes (or faults). They never render
/// user-facing messages and never normalize filenames: the dispatcher does
/// both.
pub trait FormatHandler: Send + Sync {
    /// Filter strings (`"description (*.ext)"`) offered for loading
    /// (`for_load == true`) or saving. Empty when the direction is unsupported.
    fn file_filters(&self, for_load: bool) -> Vec<String>;

    /// Extension appended to save paths that have none (without the dot).
    fn default_extension(&self) -> &str;

    /// Returns `true` if files with this extension can be loaded.
    ///
    /// `upper_ext` is upper-cased by the caller and has no leading dot.
    fn can_load_extension(&self, upper_ext: &str) -> bool;

    /// Load `path` into `container` (initially empty).
    ///
    /// Leaving the container without children on success means "nothing to
    /// show" and is not an error.
    fn load_file(
        &self,
        _path: &Path,
        _container: &mut Entity,
        _params: &mut LoadParameters,
    ) -> HandlerResult<()> {
        Err(ErrorCode::NotImplemented.into())
    }

    /// Save `entity` to `path`. The path always carries an extension.
    fn save_file(
        &self,
        _entity: &Entity,
        _path: &Path,
        _params: &SaveParameters,
    ) -> HandlerResult<()> {
        Err(ErrorCode::NotImplemented.into())
    }

    /// Called once when the registry is torn down.
    fn on_unregister(&self) {}

    /// Short name used in log messages.
    fn name(&self) -> String {
        self.default_extension().to_ascii_uppercase()
    }

    /// Returns `true` if the handler offers at least one load filter.
    fn import_supported(&self) -> bool {
        !self.file_filters(true).is_empty()
    }

    /// Returns `true` if the handler offers at least one save filter.
    fn export_supported(&self) -> bool {
        !self.file_filters(false).is_empty()
    }
}

/// Extensions named by the `(*.ext ...)` part of a filter string, upper-cased.
///
/// `"ASCII cloud (*.txt *.asc)"` yields `["TXT", "ASC"]`. Wildcard-only
/// patterns such as `*.*` are skipped.
pub fn filter_extensions(filter: &str) -> Vec<String> {
    let Some(open) = filter.rfind('(') else {
        return Vec::new();
    };
    let patterns = filter[open + 1..].trim_end_matches(')');
    patterns
        .split_whitespace()
        .filter_map(|p| p.strip_prefix("*."))
        .filter(|ext| !ext.is_empty() && *ext != "*")
        .map(str::to_ascii_uppercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct LoadOnly;

    impl FormatHandler for LoadOnly {
        fn file_filters(&self, for_load: bool) -> Vec<String> {
            if for_load {
                vec!["Load only (*.lo)".into()]
            } else {
                Vec::new()
            }
        }

        fn default_extension(&self) -> &str {
            "lo"
        }

        fn can_load_extension(&self, upper_ext: &str) -> bool {
            upper_ext == "LO"
        }
    }

    #[test]
    fn default_operations_are_not_implemented() {
        let handler = LoadOnly;
        let mut container = Entity::group("root");
        let mut params = LoadParameters::default();
        let err = handler
            .load_file(Path::new("x.lo"), &mut container, &mut params)
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::NotImplemented));

        let err = handler
            .save_file(&container, Path::new("x.lo"), &SaveParameters::default())
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::NotImplemented));
    }

    #[test]
    fn capabilities_follow_filters() {
        let handler = LoadOnly;
        assert!(handler.import_supported());
        assert!(!handler.export_supported());
        assert_eq!(handler.name(), "LO");
    }

    #[test]
    fn filter_extensions_parses_patterns() {
        assert_eq!(
            filter_extensions("ASCII cloud (*.txt *.asc *.xyz)"),
            vec!["TXT", "ASC", "XYZ"]
        );
        assert_eq!(filter_extensions("All (*.*)"), Vec::<String>::new());
        assert_eq!(filter_extensions("no pattern"), Vec::<String>::new());
    }
}
