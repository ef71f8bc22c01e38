use std::sync::Arc;

use sio_types::{CoordinatesShift, LoadParameters, Vector3};
use tracing::debug;

use crate::advisor::{PolicyShiftAdvisor, ShiftAdvisor, ShiftDecision, ShiftPrompt, ShiftRequest};
use crate::config::ShiftConfig;

/// Entry point used by format handlers when they read global coordinates.
///
/// Handlers call [`GlobalShiftManager::handle`] with the first coordinate of
/// an item. The manager decides whether a shift applies, reusing the batch
/// shift stored in [`LoadParameters`] when one is active, and records
/// batch-wide decisions so later items skip the advisor.
#[derive(Clone)]
pub struct GlobalShiftManager {
    config: ShiftConfig,
    advisor: Arc<dyn ShiftAdvisor>,
}

impl GlobalShiftManager {
    /// Create a manager delegating to a custom advisor.
    pub fn new(config: ShiftConfig, advisor: Arc<dyn ShiftAdvisor>) -> Self {
        Self { config, advisor }
    }

    /// Create a headless manager backed by [`PolicyShiftAdvisor`].
    pub fn with_policy(config: ShiftConfig) -> Self {
        let advisor = Arc::new(PolicyShiftAdvisor::new(config.clone()));
        Self::new(config, advisor)
    }

    /// Create a manager backed by [`PolicyShiftAdvisor`] with an interactive prompt.
    pub fn with_prompt(config: ShiftConfig, prompt: Box<dyn ShiftPrompt>) -> Self {
        let advisor = Arc::new(PolicyShiftAdvisor::with_prompt(config.clone(), prompt));
        Self::new(config, advisor)
    }

    pub fn config(&self) -> &ShiftConfig {
        &self.config
    }

    /// Resolve the shift for an item whose first coordinate is `point`.
    ///
    /// `input_shift` is a shift suggested by the caller (e.g. read from the
    /// file header) that should be reused if it makes `point` safe.
    pub fn handle(
        &self,
        point: Vector3,
        diagonal: f64,
        params: &mut LoadParameters,
        input_shift: Option<Vector3>,
    ) -> ShiftDecision {
        if !self.config.is_lossy() {
            return ShiftDecision::none();
        }

        if let Some(active) = params.active_shift() {
            debug!(shift = %active, "reusing active coordinate shift");
            return ShiftDecision::shifted(active, params.preserve_shift_on_save, true);
        }

        let request = ShiftRequest {
            point,
            diagonal,
            mode: params.shift_handling_mode,
            use_input_shift: input_shift.is_some(),
            candidate_shift: input_shift.unwrap_or_default(),
            preserve_shift_on_save: params.preserve_shift_on_save,
        };

        let Some(decision) = self.advisor.advise(&request) else {
            return ShiftDecision::none();
        };

        if decision.applies_to_remaining_items {
            if let Some(storage) = params.coordinates_shift.as_mut() {
                *storage = CoordinatesShift {
                    enabled: true,
                    shift: decision.shift,
                };
                params.preserve_shift_on_save = decision.preserve_on_save;
                debug!(shift = %decision.shift, "coordinate shift stored for the rest of the batch");
            }
        }

        decision
    }
}
