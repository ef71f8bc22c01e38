use std::ffi::OsString;
use std::path::{Path, PathBuf};

use sio_filter::{
    FilterPlugin, FilterRegistry, RegistryResult, SessionCounter, SharedHandler,
};
use sio_types::{Entity, ErrorCode, LoadParameters, SaveParameters};
use tracing::{debug, error, info, warn};
use unicode_normalization::is_nfd;

use crate::{boundary, report};

/// Placeholder handlers use for children they could not name.
const UNNAMED: &str = "unnamed";

/// Result of a load: the root container (if there is anything to show) and
/// the final code.
///
/// `entity` is `Some` only when `code` is [`ErrorCode::NoError`] and the
/// handler produced at least one child.
#[derive(Debug)]
pub struct LoadOutcome {
    pub entity: Option<Entity>,
    pub code: ErrorCode,
}

impl LoadOutcome {
    fn failed(code: ErrorCode) -> Self {
        Self { entity: None, code }
    }

    pub fn is_success(&self) -> bool {
        self.code.is_success()
    }

    pub fn into_entity(self) -> Option<Entity> {
        self.entity
    }
}

/// Owns the handler registry and the session counter.
///
/// The context is shareable across threads but assumes a single active
/// load/save pipeline at a time.
#[derive(Default)]
pub struct FileIoContext {
    registry: FilterRegistry,
    session: SessionCounter,
}

impl FileIoContext {
    /// Create a context with no handler registered.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &FilterRegistry {
        &self.registry
    }

    /// Register a handler at the lowest priority.
    pub fn register_handler(&self, handler: SharedHandler) -> RegistryResult<()> {
        self.registry.register(handler)
    }

    /// Register every handler of `plugin`, in order. Refused handlers are
    /// logged and skipped. Returns the number of handlers registered.
    pub fn register_plugin(&self, plugin: &dyn FilterPlugin) -> usize {
        let mut registered = 0;
        for handler in plugin.filters() {
            if self.registry.register(handler).is_ok() {
                registered += 1;
            }
        }
        debug!(plugin = plugin.name(), registered, "plugin loaded");
        registered
    }

    pub fn unregister_all(&self) {
        self.registry.unregister_all();
    }

    pub fn handler_by_filter_string(&self, filter: &str, for_load: bool) -> Option<SharedHandler> {
        self.registry.get_by_filter_string(filter, for_load)
    }

    pub fn find_best_for_extension(&self, ext: &str) -> Option<SharedHandler> {
        self.registry.find_best_for_extension(ext)
    }

    pub fn handlers(&self) -> Vec<SharedHandler> {
        self.registry.handlers()
    }

    /// Start a new load session: the next load sees `session_start == true`.
    pub fn reset_session_counter(&self) {
        self.session.reset();
    }

    pub fn increment_session_counter(&self) -> u32 {
        self.session.increment()
    }

    /// Load `path` with the handler designated by `filter`.
    ///
    /// An empty `filter` selects the best handler for the file extension.
    pub fn load_from_file_with_filter(
        &self,
        path: &Path,
        params: &mut LoadParameters,
        filter: &str,
    ) -> LoadOutcome {
        let handler = if !filter.is_empty() {
            match self.registry.get_by_filter_string(filter, true) {
                Some(handler) => handler,
                None => {
                    error!(filter, "[Load] Internal error: no I/O filter matches the file filter");
                    return LoadOutcome::failed(ErrorCode::ConsoleError);
                }
            }
        } else {
            let Some(ext) = extension(path) else {
                error!(path = %path.display(), "[Load] Can't guess file format: no file extension");
                return LoadOutcome::failed(ErrorCode::ConsoleError);
            };
            match self.registry.find_best_for_extension(&ext) {
                Some(handler) => handler,
                None => {
                    error!(
                        path = %path.display(),
                        ext = %ext,
                        "[Load] Can't guess file format: unhandled file extension"
                    );
                    return LoadOutcome::failed(ErrorCode::ConsoleError);
                }
            }
        };

        self.load_from_file(path, params, Some(&handler))
    }

    /// Load `path` with `handler`.
    ///
    /// Returns no entity on any failure, and none either when the handler
    /// succeeded without producing anything (`code` is then `NoError`).
    pub fn load_from_file(
        &self,
        path: &Path,
        params: &mut LoadParameters,
        handler: Option<&SharedHandler>,
    ) -> LoadOutcome {
        let Some(handler) = handler else {
            error!("[Load] Internal error: invalid input filter");
            return LoadOutcome::failed(ErrorCode::ConsoleError);
        };

        if !path.exists() {
            error!(path = %path.display(), "[Load] File doesn't exist");
            return LoadOutcome::failed(ErrorCode::ConsoleError);
        }
        warn_special_chars(path);

        let base = base_name(path);
        let mut container = Entity::group(String::new());
        params.session_start = self.session.increment() == 1;
        debug!(
            path = %path.display(),
            filter = %handler.name(),
            session_start = params.session_start,
            "loading file"
        );

        let code = boundary::guard("loading", &handler.name(), || {
            handler.load_file(path, &mut container, params)
        });

        if !code.is_success() {
            container.remove_all_children();
            report::display(code, "loading", &base);
            return LoadOutcome::failed(code);
        }
        info!(path = %path.display(), "[I/O] File loaded successfully");

        if container.child_count() == 0 {
            return LoadOutcome {
                entity: None,
                code: ErrorCode::NoError,
            };
        }

        container.set_name(container_name(path));
        for child in container.children_mut() {
            if child.name().starts_with(UNNAMED) {
                let renamed = child.name().replace(UNNAMED, &base);
                child.set_name(renamed);
            }
        }

        LoadOutcome {
            entity: Some(container),
            code: ErrorCode::NoError,
        }
    }

    /// Save `entity` with the handler offering `filter` for saving.
    pub fn save_to_file_with_filter(
        &self,
        entity: Option<&Entity>,
        path: &Path,
        params: &SaveParameters,
        filter: &str,
    ) -> ErrorCode {
        if filter.is_empty() {
            error!("[Save] Internal error: no filter specified");
            return ErrorCode::BadArgument;
        }

        let Some(handler) = self.registry.get_by_filter_string(filter, false) else {
            error!(filter, "[Save] Internal error: no I/O filter matches the file filter");
            return ErrorCode::UnknownFile;
        };

        self.save_to_file(entity, path, params, Some(&handler))
    }

    /// Save `entity` to `path` with `handler`.
    ///
    /// The handler's default extension is appended when `path` has none.
    pub fn save_to_file(
        &self,
        entity: Option<&Entity>,
        path: &Path,
        params: &SaveParameters,
        handler: Option<&SharedHandler>,
    ) -> ErrorCode {
        let (Some(entity), Some(handler)) = (entity, handler) else {
            return ErrorCode::BadArgument;
        };
        if path.as_os_str().is_empty() {
            return ErrorCode::BadArgument;
        }

        warn_special_chars(path);

        let requested = path.display().to_string();
        let path = with_default_extension(path, handler.default_extension());
        debug!(path = %path.display(), filter = %handler.name(), "saving file");

        let code = boundary::guard("saving", &handler.name(), || {
            handler.save_file(entity, &path, params)
        });

        if code.is_success() {
            info!(path = %path.display(), "[I/O] File saved successfully");
        } else if report::display(code, "saving", &requested).is_none() {
            debug!(path = %path.display(), %code, "save did not complete");
        }
        code
    }
}

/// Returns `true` if `path` contains characters that are not in
/// canonical decomposed form (precomposed accents such as `é`).
///
/// Some third-party readers fail to open such paths.
pub fn check_for_special_chars(path: &Path) -> bool {
    !is_nfd(&path.to_string_lossy())
}

fn warn_special_chars(path: &Path) {
    if check_for_special_chars(path) {
        warn!(
            path = %path.display(),
            "file path contains special characters; some formats may not handle it"
        );
    }
}

/// File name without directory and without any extension.
///
/// Everything from the first dot on is dropped, so `scan.part1.txt` gives
/// `scan`.
pub fn base_name(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match file_name.split_once('.') {
        Some((base, _)) => base.to_string(),
        None => file_name,
    }
}

/// Non-empty extension of `path`, without the dot.
fn extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|e| e.to_string_lossy().into_owned())
        .filter(|e| !e.is_empty())
}

/// `"<file name> (<absolute directory>)"`.
fn container_name(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let dir = absolute
        .parent()
        .map(|d| d.display().to_string())
        .unwrap_or_default();
    format!("{file_name} ({dir})")
}

fn with_default_extension(path: &Path, default_ext: &str) -> PathBuf {
    if extension(path).is_some() || default_ext.is_empty() {
        return path.to_path_buf();
    }
    let mut completed = OsString::from(path.as_os_str());
    completed.push(".");
    completed.push(default_ext);
    PathBuf::from(completed)
}
