// src/session.rs - One user working through one exercise
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::CoachConfig;
use crate::detectors::{DetectorState, Exercise};
use crate::feedback::{Feedback, FeedbackAggregator};
use crate::overlay::OverlayCue;
use crate::pose::Frame;
use crate::registry::{self, Selection};

const METRICS_WINDOW: usize = 30;

/// Frame cadence and tracking quality over the most recent frames.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionMetrics {
    pub avg_fps: f64,
    /// Share of all frames that passed the visibility gate.
    pub tracking_ratio: f64,
    pub tracked_frames: u64,
    #[serde(skip)]
    frame_intervals: VecDeque<f64>,
    #[serde(skip)]
    last_frame_at: Option<DateTime<Utc>>,
}

impl SessionMetrics {
    pub fn new() -> Self {
        Self {
            frame_intervals: VecDeque::with_capacity(METRICS_WINDOW),
            ..Self::default()
        }
    }

    fn record(&mut self, now: DateTime<Utc>, tracked: bool, frames: u64) {
        if let Some(last) = self.last_frame_at {
            let elapsed = now.signed_duration_since(last).num_milliseconds();
            if elapsed > 0 {
                self.frame_intervals.push_front(elapsed as f64 / 1000.0);
                if self.frame_intervals.len() > METRICS_WINDOW {
                    self.frame_intervals.pop_back();
                }
                let avg_interval = self.frame_intervals.iter().sum::<f64>()
                    / self.frame_intervals.len() as f64;
                self.avg_fps = 1.0 / avg_interval;
            }
        }
        self.last_frame_at = Some(now);

        if tracked {
            self.tracked_frames += 1;
        }
        self.tracking_ratio = self.tracked_frames as f64 / frames.max(1) as f64;
    }
}

/// What changed as a result of one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameReport {
    pub rep_detected: bool,
    pub reps: u32,
    /// Feedback that survived debouncing for this frame.
    pub accepted: Vec<Feedback>,
    pub overlay: Vec<OverlayCue>,
}

/// A frame stamped with the session it was captured for.
#[derive(Debug, Clone)]
pub struct TaggedFrame {
    pub session: Uuid,
    pub frame: Frame,
    pub at: DateTime<Utc>,
}

/// Everything the display layer needs to render the current state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub exercise: Exercise,
    pub exercise_name: String,
    pub requested: String,
    pub recognized: bool,
    pub reps: u32,
    pub feedback: Vec<Feedback>,
    pub overlay: Vec<OverlayCue>,
    pub frames: u64,
    pub metrics: SessionMetrics,
}

pub struct Session {
    id: Uuid,
    selection: Selection,
    state: DetectorState,
    reps: u32,
    frames: u64,
    aggregator: FeedbackAggregator,
    overlay: Vec<OverlayCue>,
    metrics: SessionMetrics,
    config: CoachConfig,
}

impl Session {
    pub fn start(exercise_id: &str, config: &CoachConfig) -> Self {
        let session = Self::fresh(exercise_id, config.clone());
        info!(
            session = %session.id,
            exercise = session.exercise().id(),
            recognized = session.selection.recognized,
            "session started"
        );
        session
    }

    fn fresh(exercise_id: &str, config: CoachConfig) -> Self {
        let fallback = config.fallback().unwrap_or(registry::FALLBACK_EXERCISE);
        let selection = registry::resolve(exercise_id, fallback);

        Self {
            id: Uuid::new_v4(),
            state: selection.exercise.initial_state(),
            selection,
            reps: 0,
            frames: 0,
            aggregator: FeedbackAggregator::new(config.feedback_cooldown_ms, config.feedback_history),
            overlay: Vec::new(),
            metrics: SessionMetrics::new(),
            config,
        }
    }

    /// Runs the selected detector on one frame and folds the result into
    /// the session.
    pub fn on_frame(&mut self, frame: &Frame, now: DateTime<Utc>) -> FrameReport {
        let exercise = self.selection.exercise;
        let detection = exercise.detect_with(frame, &self.state, self.config.visibility_threshold);

        self.frames += 1;
        self.state = detection.next_state;
        if detection.rep_detected {
            self.reps += 1;
            info!(exercise = exercise.id(), reps = self.reps, "rep counted");
        }
        self.metrics.record(now, detection.tracked, self.frames);

        let accepted = self.aggregator.accept(&detection.feedback, now);
        if accepted.len() < detection.feedback.len() {
            debug!(
                dropped = detection.feedback.len() - accepted.len(),
                "feedback debounced"
            );
        }
        self.overlay = detection.overlay;

        FrameReport {
            rep_detected: detection.rep_detected,
            reps: self.reps,
            accepted,
            overlay: self.overlay.clone(),
        }
    }

    /// Applies a frame only if it was captured for this session.
    pub fn on_tagged(&mut self, tagged: TaggedFrame) -> Option<FrameReport> {
        if tagged.session != self.id {
            warn!(
                frame_session = %tagged.session,
                current = %self.id,
                "dropping frame from a previous session"
            );
            return None;
        }
        Some(self.on_frame(&tagged.frame, tagged.at))
    }

    /// Discards all progress and starts over with another exercise under a
    /// new identity.
    pub fn switch_exercise(&mut self, exercise_id: &str) -> &Selection {
        let previous = self.selection.exercise;
        let config = self.config.clone();
        *self = Self::fresh(exercise_id, config);
        info!(
            session = %self.id,
            from = previous.id(),
            to = self.exercise().id(),
            recognized = self.selection.recognized,
            "switched exercise"
        );
        &self.selection
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn exercise(&self) -> Exercise {
        self.selection.exercise
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn reps(&self) -> u32 {
        self.reps
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn state(&self) -> &DetectorState {
        &self.state
    }

    /// Debounced feedback, most recent last.
    pub fn feedback(&self) -> Vec<Feedback> {
        self.aggregator.to_vec()
    }

    pub fn overlay(&self) -> &[OverlayCue] {
        &self.overlay
    }

    pub fn metrics(&self) -> &SessionMetrics {
        &self.metrics
    }

    pub fn config(&self) -> &CoachConfig {
        &self.config
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id,
            exercise: self.selection.exercise,
            exercise_name: self.selection.exercise.name().to_string(),
            requested: self.selection.requested.clone(),
            recognized: self.selection.recognized,
            reps: self.reps,
            feedback: self.feedback(),
            overlay: self.overlay.clone(),
            frames: self.frames,
            metrics: self.metrics.clone(),
        }
    }

    pub fn end(self) -> SessionSnapshot {
        let snapshot = self.snapshot();
        info!(
            session = %self.id,
            exercise = self.exercise().id(),
            reps = self.reps,
            frames = self.frames,
            "session ended"
        );
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::{Joint, Landmark, PoseLayout};
    use chrono::{Duration, TimeZone};

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_000 + ms).unwrap()
    }

    fn plank_frame(hip_y: f64) -> Frame {
        let mut frame = Frame::empty(PoseLayout::MediaPipe, 640, 480);
        frame.set(Joint::LeftShoulder, Landmark::new(0.2, 0.5, 0.9));
        frame.set(Joint::LeftHip, Landmark::new(0.5, hip_y, 0.9));
        frame.set(Joint::LeftKnee, Landmark::new(0.7, 0.5, 0.9));
        frame.set(Joint::LeftAnkle, Landmark::new(0.9, 0.5, 0.9));
        frame
    }

    #[test]
    fn test_start_resets_everything() {
        let session = Session::start("plank", &CoachConfig::default());
        assert_eq!(session.exercise(), Exercise::Plank);
        assert_eq!(session.reps(), 0);
        assert_eq!(session.state(), &Exercise::Plank.initial_state());
        assert!(session.feedback().is_empty());
        assert!(session.selection().recognized);
    }

    #[test]
    fn test_corrections_are_debounced_across_frames() {
        let mut session = Session::start("plank", &CoachConfig::default());
        let sagging = plank_frame(0.7);

        let mut accepted = 0;
        for i in 0..30 {
            accepted += session.on_frame(&sagging, at(i * 33)).accepted.len();
        }
        assert_eq!(accepted, 1);
        assert_eq!(session.feedback(), vec![Feedback::warning("Lift your hips up")]);
        assert_eq!(session.frames(), 30);
    }

    #[test]
    fn test_metrics_track_cadence_and_gate() {
        let mut session = Session::start("plank", &CoachConfig::default());
        let empty = Frame::empty(PoseLayout::MediaPipe, 640, 480);

        let start = at(0);
        for i in 0..4 {
            session.on_frame(&plank_frame(0.5), start + Duration::milliseconds(i * 50));
        }
        session.on_frame(&empty, start + Duration::milliseconds(200));

        let metrics = session.metrics();
        assert!((metrics.avg_fps - 20.0).abs() < 1e-9);
        assert_eq!(metrics.tracked_frames, 4);
        assert!((metrics.tracking_ratio - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_switch_changes_identity() {
        let mut session = Session::start("plank", &CoachConfig::default());
        let before = session.id();
        session.on_frame(&plank_frame(0.7), at(0));

        let selection = session.switch_exercise("Squats").clone();
        assert_eq!(selection.exercise, Exercise::Squat);
        assert_ne!(session.id(), before);
        assert_eq!(session.frames(), 0);
        assert!(session.feedback().is_empty());
        assert!(session.overlay().is_empty());
    }

    #[test]
    fn test_snapshot_serializes_for_display() {
        let mut session = Session::start("plank", &CoachConfig::default());
        session.on_frame(&plank_frame(0.5), at(0));

        let json = serde_json::to_value(session.snapshot()).unwrap();
        assert_eq!(json["exercise"], "plank");
        assert_eq!(json["recognized"], true);
        assert_eq!(json["feedback"][0]["kind"], "info");
        assert_eq!(json["overlay"][0]["shape"]["type"], "line");
    }
}
