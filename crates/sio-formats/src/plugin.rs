use std::sync::Arc;

use sio_filter::{FilterPlugin, SharedHandler};
use sio_shift::GlobalShiftManager;

use crate::ascii::AsciiCloudFilter;
use crate::native::NativeFilter;

/// The handlers shipped with the workspace.
///
/// The native format comes first so it keeps priority over the permissive
/// ASCII reader.
#[derive(Clone)]
pub struct BuiltinFilters {
    shift: Arc<GlobalShiftManager>,
}

impl BuiltinFilters {
    pub fn new(shift: Arc<GlobalShiftManager>) -> Self {
        Self { shift }
    }
}

impl FilterPlugin for BuiltinFilters {
    fn name(&self) -> &str {
        "builtin"
    }

    fn filters(&self) -> Vec<SharedHandler> {
        vec![
            Arc::new(NativeFilter),
            Arc::new(AsciiCloudFilter::new(Arc::clone(&self.shift))),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sio_io::FileIoContext;
    use sio_shift::ShiftConfig;
    use sio_types::{ErrorCode, LoadParameters, SaveParameters, ShiftHandlingMode};

    fn context() -> FileIoContext {
        let io = FileIoContext::new();
        let shift = Arc::new(GlobalShiftManager::with_policy(ShiftConfig::default()));
        assert_eq!(io.register_plugin(&BuiltinFilters::new(shift)), 2);
        io
    }

    #[test]
    fn native_is_registered_first() {
        let io = context();
        let names: Vec<String> = io.handlers().iter().map(|h| h.name()).collect();
        assert_eq!(names, vec!["SIO", "ASCII"]);
    }

    #[test]
    fn registering_twice_adds_nothing() {
        let io = context();
        let shift = Arc::new(GlobalShiftManager::with_policy(ShiftConfig::default()));
        assert_eq!(io.register_plugin(&BuiltinFilters::new(shift)), 0);
        assert_eq!(io.handlers().len(), 2);
    }

    #[test]
    fn ascii_file_loads_through_the_dispatcher() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quarry.txt");
        std::fs::write(&path, "501234.5 4200111.0 10\n501235.5 4200112.0 11\n").unwrap();

        let io = context();
        io.reset_session_counter();
        let mut params = LoadParameters::with_shift_storage(ShiftHandlingMode::ApplyAndRemember);
        let root = io
            .load_from_file_with_filter(&path, &mut params, "")
            .into_entity()
            .unwrap();

        assert_eq!(root.children()[0].name(), "quarry - Cloud");
        assert_eq!(root.point_count(), 2);
        assert!(params.session_start);
        assert!(params.active_shift().is_some());
    }

    #[test]
    fn convert_ascii_to_native_and_back() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("pts.xyz");
        std::fs::write(&source, "1 2 3\n4 5 6\n").unwrap();

        let io = context();
        let mut params = LoadParameters::default();
        let root = io
            .load_from_file_with_filter(&source, &mut params, "")
            .into_entity()
            .unwrap();

        let target = dir.path().join("pts");
        let code = io.save_to_file_with_filter(
            Some(&root),
            &target,
            &SaveParameters::default(),
            "SIO entities (*.sio)",
        );
        assert_eq!(code, ErrorCode::NoError);

        let reloaded = io
            .load_from_file_with_filter(&dir.path().join("pts.sio"), &mut params, "")
            .into_entity()
            .unwrap();
        assert_eq!(reloaded.point_count(), 2);
        assert_eq!(reloaded.children()[0].name(), "pts - Cloud");
    }
}
