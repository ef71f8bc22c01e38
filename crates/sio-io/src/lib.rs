//! Load/save dispatcher.
//!
//! [`FileIoContext`] owns the handler registry and the session counter and is
//! the single entry point for reading and writing files. It picks a handler,
//! runs it behind a fault boundary, normalizes what comes back, and reports
//! failures through the error classifier.
//!
//! ```rust
//! use sio_io::FileIoContext;
//! use sio_types::{ErrorCode, LoadParameters};
//!
//! let io = FileIoContext::new();
//! let mut params = LoadParameters::default();
//! let outcome = io.load_from_file_with_filter("missing.xyz".as_ref(), &mut params, "");
//! assert!(outcome.entity.is_none());
//! assert_eq!(outcome.code, ErrorCode::ConsoleError);
//! ```

mod boundary;
pub mod context;
pub mod report;

pub use context::{base_name, check_for_special_chars, FileIoContext, LoadOutcome};
pub use report::RenderedError;
