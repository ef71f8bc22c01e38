//! User-facing rendering of load/save outcomes.

use sio_types::{ErrorCode, Severity};
use tracing::{error, warn};

/// A message ready to be shown to the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedError {
    pub severity: Severity,
    pub message: String,
}

/// Build the message for `code`, or `None` when nothing should be shown
/// (success, cancellation, unknown codes).
///
/// `action` is the verb in progress (`"loading"`, `"saving"`).
pub fn render(code: ErrorCode, action: &str, filename: &str) -> Option<RenderedError> {
    let description = code.description()?;
    let severity = code.severity()?;
    Some(RenderedError {
        severity,
        message: format!("An error occurred while {action} '{filename}': {description}"),
    })
}

/// Render `code` and emit it once through the log at its severity.
pub fn display(code: ErrorCode, action: &str, filename: &str) -> Option<RenderedError> {
    let rendered = render(code, action, filename)?;
    match rendered.severity {
        Severity::Error => error!(code = code.raw(), "{}", rendered.message),
        Severity::Warning => warn!(code = code.raw(), "{}", rendered.message),
    }
    Some(rendered)
}
