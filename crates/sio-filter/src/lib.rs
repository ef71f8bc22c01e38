//! Format handlers ("filters") and their registry.
//!
//! A format handler implements load and/or save for one family of file
//! formats. It is identified by one or more *filter strings*
//! (`"description (*.ext)"`) and a canonical default extension.
//!
//! # Modules
//!
//! - [`handler`]: the [`FormatHandler`] contract consumed by the dispatcher
//! - [`registry`]: [`FilterRegistry`], an ordered, collision-free handler list
//! - [`session`]: [`SessionCounter`], marking the first load of a batch
//! - [`plugin`]: [`FilterPlugin`], a bundle of handlers registered together
//! - [`error`]: [`HandlerError`] and [`RegistryError`]
//!
//! # Priority
//!
//! Registration order is a priority list. When several handlers accept the
//! same extension, the first one registered wins, so native high-fidelity
//! formats should be registered before permissive generic ones.

pub mod error;
pub mod handler;
pub mod plugin;
pub mod registry;
pub mod session;

pub use error::{HandlerError, HandlerResult, RegistryError, RegistryResult};
pub use handler::{filter_extensions, FormatHandler, SharedHandler};
pub use plugin::FilterPlugin;
pub use registry::FilterRegistry;
pub use session::SessionCounter;
