// src/lib.rs - Repetition counting and form analysis over pose landmarks
pub mod config;
pub mod detectors;
pub mod error;
pub mod feed;
pub mod feedback;
pub mod geometry;
pub mod overlay;
pub mod pose;
pub mod recording;
pub mod registry;
pub mod session;

pub use config::CoachConfig;
pub use detectors::{Detection, DetectorState, Exercise, TwistSide};
pub use error::{CoachError, Result};
pub use feed::{FeedCommand, SessionFeed};
pub use feedback::{Feedback, FeedbackAggregator, FeedbackKind};
pub use overlay::{CueShape, OverlayCue, Tone};
pub use pose::{Frame, Joint, Landmark, PoseLayout};
pub use registry::{MuscleGroup, Selection};
pub use session::{FrameReport, Session, SessionSnapshot, TaggedFrame};
