// src/detectors/mod.rs - Per-exercise repetition and form analysis
//
// Every detector is a pure function of the current frame and the state
// returned by its previous call. Nothing is remembered between calls except
// what travels through `DetectorState`.

mod back;
pub(crate) mod cycle;
mod glutes;
mod lower_body;
mod trunk;
mod upper_body;

use serde::{Deserialize, Serialize};

use crate::feedback::Feedback;
use crate::overlay::OverlayCue;
use crate::pose::{Frame, DEFAULT_VISIBILITY_THRESHOLD};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Exercise {
    BicepCurl,
    PushUp,
    BenchPress,
    OverheadPress,
    LateralRaise,
    Squat,
    Lunge,
    CalfRaise,
    Plank,
    Crunch,
    RussianTwist,
    PullUp,
    BentOverRow,
    Deadlift,
    HipThrust,
    GluteBridge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TwistSide {
    #[default]
    Centre,
    Left,
    Right,
}

/// Where in its movement cycle the user currently is, per exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "exercise", rename_all = "snake_case")]
pub enum DetectorState {
    BicepCurl { arm_down: bool, elbow_warned: bool },
    PushUp { down: bool },
    BenchPress { bar_down: bool },
    OverheadPress { at_bottom: bool },
    LateralRaise { arms_down: bool },
    Squat { squat_down: bool },
    Lunge { in_lunge: bool },
    CalfRaise { raised: bool },
    Plank { good_form: bool },
    Crunch { crunched_up: bool },
    RussianTwist { side: TwistSide },
    PullUp { hanging: bool },
    BentOverRow { extended: bool },
    Deadlift { bent_over: bool },
    HipThrust { hips_down: bool },
    GluteBridge { on_ground: bool },
}

impl DetectorState {
    pub fn exercise(&self) -> Exercise {
        match self {
            DetectorState::BicepCurl { .. } => Exercise::BicepCurl,
            DetectorState::PushUp { .. } => Exercise::PushUp,
            DetectorState::BenchPress { .. } => Exercise::BenchPress,
            DetectorState::OverheadPress { .. } => Exercise::OverheadPress,
            DetectorState::LateralRaise { .. } => Exercise::LateralRaise,
            DetectorState::Squat { .. } => Exercise::Squat,
            DetectorState::Lunge { .. } => Exercise::Lunge,
            DetectorState::CalfRaise { .. } => Exercise::CalfRaise,
            DetectorState::Plank { .. } => Exercise::Plank,
            DetectorState::Crunch { .. } => Exercise::Crunch,
            DetectorState::RussianTwist { .. } => Exercise::RussianTwist,
            DetectorState::PullUp { .. } => Exercise::PullUp,
            DetectorState::BentOverRow { .. } => Exercise::BentOverRow,
            DetectorState::Deadlift { .. } => Exercise::Deadlift,
            DetectorState::HipThrust { .. } => Exercise::HipThrust,
            DetectorState::GluteBridge { .. } => Exercise::GluteBridge,
        }
    }
}

/// Result of one detector invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    pub rep_detected: bool,
    /// False when the visibility gate rejected the frame.
    pub tracked: bool,
    pub feedback: Vec<Feedback>,
    pub next_state: DetectorState,
    pub overlay: Vec<OverlayCue>,
}

impl Detection {
    /// Tracking is unreliable: no progress, state untouched, one warning.
    pub(crate) fn reposition(prev: &DetectorState, hint: &str) -> Self {
        tracing::debug!(exercise = ?prev.exercise(), "required joints not visible");
        Self {
            rep_detected: false,
            tracked: false,
            feedback: vec![Feedback::warning(hint)],
            next_state: *prev,
            overlay: Vec::new(),
        }
    }

    pub(crate) fn from_analysis(
        analysis: cycle::Analysis,
        next_state: DetectorState,
        overlay: Vec<OverlayCue>,
    ) -> Self {
        if analysis.phase_changed() {
            tracing::debug!(state = ?next_state, rep = analysis.rep_detected, "phase changed");
        }
        Self {
            rep_detected: analysis.rep_detected,
            tracked: true,
            feedback: analysis.feedback,
            next_state,
            overlay,
        }
    }
}

impl Exercise {
    pub const ALL: [Exercise; 16] = [
        Exercise::BicepCurl,
        Exercise::PushUp,
        Exercise::BenchPress,
        Exercise::OverheadPress,
        Exercise::LateralRaise,
        Exercise::Squat,
        Exercise::Lunge,
        Exercise::CalfRaise,
        Exercise::Plank,
        Exercise::Crunch,
        Exercise::RussianTwist,
        Exercise::PullUp,
        Exercise::BentOverRow,
        Exercise::Deadlift,
        Exercise::HipThrust,
        Exercise::GluteBridge,
    ];

    /// Starting posture: nothing engaged, no warnings outstanding.
    pub fn initial_state(self) -> DetectorState {
        match self {
            Exercise::BicepCurl => DetectorState::BicepCurl {
                arm_down: false,
                elbow_warned: false,
            },
            Exercise::PushUp => DetectorState::PushUp { down: false },
            Exercise::BenchPress => DetectorState::BenchPress { bar_down: false },
            Exercise::OverheadPress => DetectorState::OverheadPress { at_bottom: false },
            Exercise::LateralRaise => DetectorState::LateralRaise { arms_down: false },
            Exercise::Squat => DetectorState::Squat { squat_down: false },
            Exercise::Lunge => DetectorState::Lunge { in_lunge: false },
            Exercise::CalfRaise => DetectorState::CalfRaise { raised: false },
            Exercise::Plank => DetectorState::Plank { good_form: false },
            Exercise::Crunch => DetectorState::Crunch { crunched_up: false },
            Exercise::RussianTwist => DetectorState::RussianTwist {
                side: TwistSide::Centre,
            },
            Exercise::PullUp => DetectorState::PullUp { hanging: false },
            Exercise::BentOverRow => DetectorState::BentOverRow { extended: false },
            Exercise::Deadlift => DetectorState::Deadlift { bent_over: false },
            Exercise::HipThrust => DetectorState::HipThrust { hips_down: false },
            Exercise::GluteBridge => DetectorState::GluteBridge { on_ground: false },
        }
    }

    pub fn detect(self, frame: &Frame, prev: &DetectorState) -> Detection {
        self.detect_with(frame, prev, DEFAULT_VISIBILITY_THRESHOLD)
    }

    /// A state produced by a different exercise is read as this exercise's
    /// initial state.
    pub fn detect_with(self, frame: &Frame, prev: &DetectorState, min_visibility: f64) -> Detection {
        match self {
            Exercise::BicepCurl => upper_body::bicep_curl(frame, prev, min_visibility),
            Exercise::PushUp => upper_body::push_up(frame, prev, min_visibility),
            Exercise::BenchPress => upper_body::bench_press(frame, prev, min_visibility),
            Exercise::OverheadPress => upper_body::overhead_press(frame, prev, min_visibility),
            Exercise::LateralRaise => upper_body::lateral_raise(frame, prev, min_visibility),
            Exercise::Squat => lower_body::squat(frame, prev, min_visibility),
            Exercise::Lunge => lower_body::lunge(frame, prev, min_visibility),
            Exercise::CalfRaise => lower_body::calf_raise(frame, prev, min_visibility),
            Exercise::Plank => trunk::plank(frame, prev, min_visibility),
            Exercise::Crunch => trunk::crunch(frame, prev, min_visibility),
            Exercise::RussianTwist => trunk::russian_twist(frame, prev, min_visibility),
            Exercise::PullUp => back::pull_up(frame, prev, min_visibility),
            Exercise::BentOverRow => back::bent_over_row(frame, prev, min_visibility),
            Exercise::Deadlift => back::deadlift(frame, prev, min_visibility),
            Exercise::HipThrust => glutes::hip_thrust(frame, prev, min_visibility),
            Exercise::GluteBridge => glutes::glute_bridge(frame, prev, min_visibility),
        }
    }
}
