// src/error.rs
use std::path::PathBuf;

use thiserror::Error;

/// Failures at the edges of the coaching core. Per-frame analysis never
/// produces one of these; it degrades to feedback text instead.
#[derive(Debug, Error)]
pub enum CoachError {
    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("unknown exercise: {0}")]
    UnknownExercise(String),

    #[error("recording error: {0}")]
    Recording(#[from] csv::Error),

    #[error("recording frame {found} arrived after frame {previous}")]
    OutOfOrder { previous: u64, found: u64 },

    #[error("recording frame {frame}: unknown landmark {name}")]
    UnknownLandmark { frame: u64, name: String },

    #[error("recording frame {frame}: timestamp {timestamp_ms} ms is out of range")]
    BadTimestamp { frame: u64, timestamp_ms: i64 },

    #[error("failed to write {path}: {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode summary: {0}")]
    Json(#[from] serde_json::Error),

    #[error("session feed is closed")]
    FeedClosed,
}

pub type Result<T> = std::result::Result<T, CoachError>;
