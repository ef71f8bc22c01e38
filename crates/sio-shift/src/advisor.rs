use sio_types::{ShiftHandlingMode, Vector3};
use tracing::{debug, warn};

use crate::config::ShiftConfig;

// ---------------------------------------------------------------------------
// Request / decision
// ---------------------------------------------------------------------------

/// Everything an advisor needs to decide on a shift for one item.
#[derive(Clone, Debug, PartialEq)]
pub struct ShiftRequest {
    /// A representative global coordinate (usually the first point read).
    pub point: Vector3,
    /// Extent of the data (bounding-box diagonal). `0.0` when unknown.
    pub diagonal: f64,
    pub mode: ShiftHandlingMode,
    /// Reuse `candidate_shift` if it makes `point` safe.
    pub use_input_shift: bool,
    pub candidate_shift: Vector3,
    /// Current preserve-on-save preference of the caller.
    pub preserve_shift_on_save: bool,
}

/// The resolved shift for one item.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShiftDecision {
    /// Whether a shift is in effect.
    pub applied: bool,
    pub shift: Vector3,
    /// Keep the shift when the data is written back out.
    pub preserve_on_save: bool,
    /// Reuse this decision for the remaining items of the batch.
    pub applies_to_remaining_items: bool,
}

impl ShiftDecision {
    /// No shift in effect.
    pub fn none() -> Self {
        Self {
            applied: false,
            shift: Vector3::zero(),
            preserve_on_save: false,
            applies_to_remaining_items: false,
        }
    }

    /// A shift that is in effect.
    pub fn shifted(shift: Vector3, preserve_on_save: bool, applies_to_remaining_items: bool) -> Self {
        Self {
            applied: true,
            shift,
            preserve_on_save,
            applies_to_remaining_items,
        }
    }
}

// ---------------------------------------------------------------------------
// ShiftAdvisor trait
// ---------------------------------------------------------------------------

/// Detects precision-loss risk and resolves a shift.
///
/// Returns `None` when no decision was made: the coordinates are safe, the
/// policy forbids shifting, or the user declined.
pub trait ShiftAdvisor: Send + Sync {
    fn advise(&self, request: &ShiftRequest) -> Option<ShiftDecision>;
}

// ---------------------------------------------------------------------------
// ShiftPrompt trait
// ---------------------------------------------------------------------------

/// What the interactive collaborator is asked.
#[derive(Clone, Debug, PartialEq)]
pub struct ShiftQuestion {
    pub point: Vector3,
    pub diagonal: f64,
    pub suggested_shift: Vector3,
    /// `false` when the "always ask" policy asks about safe coordinates.
    pub needs_shift: bool,
}

/// The user's answer to a [`ShiftQuestion`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PromptAnswer {
    pub shift: Vector3,
    pub preserve_on_save: bool,
    pub apply_to_all: bool,
}

/// Interactive collaborator (a dialog, a terminal prompt, ...).
///
/// Returning `None` means the user declined to shift.
pub trait ShiftPrompt: Send + Sync {
    fn ask(&self, question: &ShiftQuestion) -> Option<PromptAnswer>;
}

/// A prompt that declines every question. Used in headless contexts.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoPrompt;

impl ShiftPrompt for NoPrompt {
    fn ask(&self, _question: &ShiftQuestion) -> Option<PromptAnswer> {
        None
    }
}

// ---------------------------------------------------------------------------
// PolicyShiftAdvisor
// ---------------------------------------------------------------------------

/// Reference advisor: threshold-based detection plus mode-driven resolution.
pub struct PolicyShiftAdvisor {
    config: ShiftConfig,
    prompt: Box<dyn ShiftPrompt>,
}

impl PolicyShiftAdvisor {
    /// Create a headless advisor. The "ask" modes decline.
    pub fn new(config: ShiftConfig) -> Self {
        Self::with_prompt(config, Box::new(NoPrompt))
    }

    /// Create an advisor that consults `prompt` in the "ask" modes.
    pub fn with_prompt(config: ShiftConfig, prompt: Box<dyn ShiftPrompt>) -> Self {
        Self { config, prompt }
    }

    pub fn config(&self) -> &ShiftConfig {
        &self.config
    }

    /// Returns `true` if any coordinate of `point` is at risk.
    pub fn needs_shift(&self, point: Vector3) -> bool {
        point.max_abs_component() >= self.config.max_abs_coordinate
    }

    /// Returns `true` if the extent is too large to be fixed by a shift alone.
    pub fn needs_rescale(&self, diagonal: f64) -> bool {
        diagonal >= self.config.max_bounding_box_diagonal
    }

    /// Shift that brings `point` close to the origin.
    ///
    /// Safe axes get no shift; the others get the negated coordinate rounded
    /// to a multiple of `shift_rounding`.
    pub fn suggest_shift(&self, point: Vector3) -> Vector3 {
        let max_abs = self.config.max_abs_coordinate;
        let step = self.config.shift_rounding;
        point.map(|c| {
            if c.abs() < max_abs {
                0.0
            } else {
                -(c / step).round() * step
            }
        })
    }
}

impl ShiftAdvisor for PolicyShiftAdvisor {
    fn advise(&self, request: &ShiftRequest) -> Option<ShiftDecision> {
        if self.needs_rescale(request.diagonal) {
            warn!(
                diagonal = request.diagonal,
                max = self.config.max_bounding_box_diagonal,
                "data extent is too large for the destination precision"
            );
        }

        if request.use_input_shift {
            if !self.needs_shift(request.point + request.candidate_shift) {
                debug!(shift = %request.candidate_shift, "reusing input coordinate shift");
                return Some(ShiftDecision::shifted(
                    request.candidate_shift,
                    request.preserve_shift_on_save,
                    false,
                ));
            }
            debug!(
                shift = %request.candidate_shift,
                "input coordinate shift is not sufficient; falling back to policy"
            );
        }

        let needs_shift = self.needs_shift(request.point);
        let suggested = self.suggest_shift(request.point);

        match request.mode {
            ShiftHandlingMode::Never => None,
            ShiftHandlingMode::AlwaysApply if needs_shift => Some(ShiftDecision::shifted(
                suggested,
                request.preserve_shift_on_save,
                false,
            )),
            ShiftHandlingMode::ApplyAndRemember if needs_shift => {
                Some(ShiftDecision::shifted(suggested, true, true))
            }
            ShiftHandlingMode::AlwaysApply | ShiftHandlingMode::ApplyAndRemember => None,
            ShiftHandlingMode::AskIfNecessary if !needs_shift => None,
            ShiftHandlingMode::AskIfNecessary | ShiftHandlingMode::AlwaysAsk => {
                let question = ShiftQuestion {
                    point: request.point,
                    diagonal: request.diagonal,
                    suggested_shift: suggested,
                    needs_shift,
                };
                let answer = self.prompt.ask(&question)?;
                if answer.shift.is_zero() {
                    return None;
                }
                Some(ShiftDecision::shifted(
                    answer.shift,
                    answer.preserve_on_save,
                    answer.apply_to_all,
                ))
            }
        }
    }
}
