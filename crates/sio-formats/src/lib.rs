//! Built-in format handlers.
//!
//! - [`NativeFilter`]: lossless entity trees stored as JSON (`*.sio`)
//! - [`AsciiCloudFilter`]: whitespace separated `X Y Z` point clouds
//! - [`BuiltinFilters`]: plugin registering both, native first

pub mod ascii;
pub mod native;
pub mod plugin;

pub use ascii::AsciiCloudFilter;
pub use native::{NativeDocument, NativeFilter};
pub use plugin::BuiltinFilters;
