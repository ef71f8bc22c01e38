//! Global shift handling for Spatial I/O.
//!
//! Source formats often carry georeferenced coordinates (hundreds of
//! thousands or millions of units) in double precision. Stored as-is in a
//! single-precision cloud they lose centimetre-level detail. The global shift
//! is an offset added to every coordinate before storage (`local = global +
//! shift`) and subtracted again on export.
//!
//! # Components
//!
//! - [`ShiftConfig`]: thresholds and the declared source/destination widths
//! - [`ShiftAdvisor`]: contract that detects risk and resolves a shift
//! - [`PolicyShiftAdvisor`]: reference advisor driven by [`ShiftHandlingMode`]
//! - [`ShiftPrompt`]: interactive collaborator consulted by the "ask" modes
//! - [`GlobalShiftManager`]: entry point used by format handlers; reuses an
//!   already active shift and writes batch-wide decisions back into
//!   [`LoadParameters`]
//!
//! [`ShiftHandlingMode`]: sio_types::ShiftHandlingMode
//! [`LoadParameters`]: sio_types::LoadParameters

pub mod advisor;
pub mod config;
pub mod error;
pub mod manager;

pub use advisor::{
    NoPrompt, PolicyShiftAdvisor, PromptAnswer, ShiftAdvisor, ShiftDecision, ShiftPrompt,
    ShiftQuestion, ShiftRequest,
};
pub use config::ShiftConfig;
pub use error::{ShiftError, ShiftResult};
pub use manager::GlobalShiftManager;
