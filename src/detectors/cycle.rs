// src/detectors/cycle.rs - Two-phase hysteresis shared by every rep counter
use crate::feedback::{Feedback, FeedbackKind};
use crate::overlay::Tone;

/// Outcome of feeding one reading into a two-phase cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// Stayed in the current phase.
    Hold,
    /// Left the starting phase. No rep.
    Engaged,
    /// Returned to the starting phase. One rep.
    Completed,
}

/// `engage` and `complete` are the already-evaluated strict threshold
/// crossings. A reading sitting exactly on a threshold holds.
pub(crate) fn advance(engaged: bool, engage: bool, complete: bool) -> Step {
    match (engaged, engage, complete) {
        (false, true, _) => Step::Engaged,
        (true, _, true) => Step::Completed,
        _ => Step::Hold,
    }
}

/// Accumulates the signals of a single detector call.
#[derive(Debug, Default)]
pub(crate) struct Analysis {
    pub(crate) rep_detected: bool,
    pub(crate) feedback: Vec<Feedback>,
    phase_changed: bool,
}

impl Analysis {
    /// Steps the cycle and returns the engaged flag to store.
    pub(crate) fn cycle(&mut self, engaged: bool, engage: bool, complete: bool) -> (Step, bool) {
        let step = advance(engaged, engage, complete);
        match step {
            Step::Hold => (step, engaged),
            Step::Engaged => {
                self.phase_changed = true;
                (step, true)
            }
            Step::Completed => {
                self.phase_changed = true;
                self.rep_detected = true;
                (step, false)
            }
        }
    }

    pub(crate) fn celebrate(&mut self, text: &str) {
        self.feedback.push(Feedback::success(text));
    }

    /// For movements that do not fit the engage/complete shape.
    pub(crate) fn count_rep(&mut self) {
        self.rep_detected = true;
        self.phase_changed = true;
    }

    pub(crate) fn encourage(&mut self, text: &str) {
        self.feedback.push(Feedback::encouragement(text));
    }

    pub(crate) fn info(&mut self, text: &str) {
        self.feedback.push(Feedback::info(text));
    }

    pub(crate) fn warn(&mut self, text: &str) {
        self.feedback.push(Feedback::warning(text));
    }

    pub(crate) fn mark_phase_change(&mut self) {
        self.phase_changed = true;
    }

    pub(crate) fn phase_changed(&self) -> bool {
        self.phase_changed
    }

    pub(crate) fn tone(&self) -> Tone {
        if self.feedback.iter().any(|f| f.kind == FeedbackKind::Warning) {
            Tone::Bad
        } else if self.rep_detected || self.phase_changed {
            Tone::Good
        } else {
            Tone::Neutral
        }
    }
}
