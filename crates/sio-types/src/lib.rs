//! Foundation types for Spatial I/O (SIO).
//!
//! This crate provides the value types shared by every other SIO crate: the
//! double-precision [`Vector3`], the closed [`ErrorCode`] taxonomy returned by
//! every load/save operation, the reference spatial container [`Entity`], and
//! the per-call [`LoadParameters`] / [`SaveParameters`] bundles.
//!
//! # Key Types
//!
//! - [`Vector3`]: double-precision 3D coordinate or shift vector
//! - [`Precision`]: declared numeric width of a coordinate store
//! - [`ErrorCode`]: outcome of a handler or dispatcher operation
//! - [`Severity`]: how a non-success outcome is reported
//! - [`Entity`]: named container owning zero or more children
//! - [`LoadParameters`]: shift state and policy carried through a load
//! - [`ShiftHandlingMode`]: how precision-loss risk is resolved

pub mod entity;
pub mod error;
pub mod params;
pub mod vector;

pub use entity::{Entity, EntityKind, PointCloud};
pub use error::{ErrorCode, ParseError, Severity};
pub use params::{CoordinatesShift, LoadParameters, SaveParameters, ShiftHandlingMode};
pub use vector::{Precision, Vector3};
