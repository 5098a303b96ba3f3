// src/config.rs - Coaching settings loaded from JSON
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::detectors::Exercise;
use crate::error::{CoachError, Result};
use crate::feedback::{DEFAULT_COOLDOWN_MS, DEFAULT_HISTORY};
use crate::pose::DEFAULT_VISIBILITY_THRESHOLD;
use crate::registry;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoachConfig {
    /// Landmarks at or below this confidence count as not visible.
    pub visibility_threshold: f64,
    pub feedback_cooldown_ms: u64,
    pub feedback_history: usize,
    /// Detector used when an exercise id is not recognized.
    pub fallback_exercise: String,
    pub frame_width: u32,
    pub frame_height: u32,
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            visibility_threshold: DEFAULT_VISIBILITY_THRESHOLD,
            feedback_cooldown_ms: DEFAULT_COOLDOWN_MS,
            feedback_history: DEFAULT_HISTORY,
            fallback_exercise: registry::FALLBACK_EXERCISE.id().to_string(),
            frame_width: 640,
            frame_height: 480,
        }
    }
}

impl CoachConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| CoachError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self =
            serde_json::from_str(&content).map_err(|source| CoachError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let io_err = |source| CoachError::ConfigIo {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = serde_json::to_string_pretty(self).map_err(|source| {
            CoachError::ConfigParse {
                path: path.to_path_buf(),
                source,
            }
        })?;
        fs::write(path, content).map_err(io_err)
    }

    /// `<config dir>/form-coach/config.json` on the current platform.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "FormCoach", "form-coach")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Loads the file at `path` (or the default location), using defaults
    /// when it does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let path = match path.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(path) => path,
            None => return Ok(Self::default()),
        };
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.visibility_threshold) {
            return Err(CoachError::InvalidConfig(format!(
                "visibility_threshold must be within 0..=1, got {}",
                self.visibility_threshold
            )));
        }
        if self.feedback_history == 0 {
            return Err(CoachError::InvalidConfig(
                "feedback_history must be at least 1".to_string(),
            ));
        }
        if self.frame_width == 0 || self.frame_height == 0 {
            return Err(CoachError::InvalidConfig(
                "frame dimensions must be non-zero".to_string(),
            ));
        }
        self.fallback()?;
        Ok(())
    }

    pub fn fallback(&self) -> Result<Exercise> {
        Exercise::from_id(&self.fallback_exercise)
    }
}
