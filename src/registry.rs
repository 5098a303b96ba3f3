// src/registry.rs - Exercise identifiers, display metadata and detector lookup
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::warn;

use crate::detectors::Exercise;
use crate::error::{CoachError, Result};

pub const FALLBACK_EXERCISE: Exercise = Exercise::BicepCurl;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MuscleGroup {
    Arms,
    Chest,
    Shoulders,
    Legs,
    Core,
    Back,
    Glutes,
}

impl MuscleGroup {
    pub fn label(self) -> &'static str {
        match self {
            MuscleGroup::Arms => "Arms",
            MuscleGroup::Chest => "Chest",
            MuscleGroup::Shoulders => "Shoulders",
            MuscleGroup::Legs => "Legs",
            MuscleGroup::Core => "Core",
            MuscleGroup::Back => "Back",
            MuscleGroup::Glutes => "Glutes",
        }
    }
}

impl fmt::Display for MuscleGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

static ALIASES: Lazy<HashMap<&'static str, Exercise>> = Lazy::new(|| {
    let mut m = HashMap::new();

    for exercise in Exercise::ALL {
        m.insert(exercise.id(), exercise);
    }

    m.insert("bicep_curls", Exercise::BicepCurl);
    m.insert("biceps", Exercise::BicepCurl);
    m.insert("pushup", Exercise::PushUp);
    m.insert("pushups", Exercise::PushUp);
    m.insert("push_ups", Exercise::PushUp);
    m.insert("shoulder_press", Exercise::OverheadPress);
    m.insert("shoulder", Exercise::OverheadPress);
    m.insert("lateral_raises", Exercise::LateralRaise);
    m.insert("squats", Exercise::Squat);
    m.insert("lunges", Exercise::Lunge);
    m.insert("calf_raises", Exercise::CalfRaise);
    m.insert("planks", Exercise::Plank);
    m.insert("crunches", Exercise::Crunch);
    m.insert("russian_twists", Exercise::RussianTwist);
    m.insert("pullup", Exercise::PullUp);
    m.insert("pull_ups", Exercise::PullUp);
    m.insert("pullups", Exercise::PullUp);
    m.insert("bent_over_rows", Exercise::BentOverRow);
    m.insert("deadlifts", Exercise::Deadlift);
    m.insert("hip_thrusts", Exercise::HipThrust);
    m.insert("glute_bridges", Exercise::GluteBridge);

    m
});

/// Trims, lowercases and collapses runs of whitespace or hyphens into a
/// single underscore.
pub fn normalize_id(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    let mut pending_sep = false;

    for ch in id.trim().chars() {
        if ch.is_whitespace() || ch == '-' {
            pending_sep = true;
            continue;
        }
        if pending_sep && !out.is_empty() {
            out.push('_');
        }
        pending_sep = false;
        out.extend(ch.to_lowercase());
    }

    out
}

pub fn lookup(id: &str) -> Option<Exercise> {
    ALIASES.get(normalize_id(id).as_str()).copied()
}

/// Which detector a session runs, and whether the caller actually asked
/// for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub exercise: Exercise,
    pub requested: String,
    pub recognized: bool,
}

impl Selection {
    pub fn is_fallback(&self) -> bool {
        !self.recognized
    }
}

pub fn resolve(id: &str, fallback: Exercise) -> Selection {
    match lookup(id) {
        Some(exercise) => Selection {
            exercise,
            requested: id.to_string(),
            recognized: true,
        },
        None => {
            warn!(
                requested = id,
                fallback = fallback.id(),
                "unknown exercise, using fallback detector"
            );
            Selection {
                exercise: fallback,
                requested: id.to_string(),
                recognized: false,
            }
        }
    }
}

impl Exercise {
    pub fn id(self) -> &'static str {
        match self {
            Exercise::BicepCurl => "bicep_curl",
            Exercise::PushUp => "push_up",
            Exercise::BenchPress => "bench_press",
            Exercise::OverheadPress => "overhead_press",
            Exercise::LateralRaise => "lateral_raise",
            Exercise::Squat => "squat",
            Exercise::Lunge => "lunge",
            Exercise::CalfRaise => "calf_raise",
            Exercise::Plank => "plank",
            Exercise::Crunch => "crunch",
            Exercise::RussianTwist => "russian_twist",
            Exercise::PullUp => "pull_up",
            Exercise::BentOverRow => "bent_over_row",
            Exercise::Deadlift => "deadlift",
            Exercise::HipThrust => "hip_thrust",
            Exercise::GluteBridge => "glute_bridge",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Exercise::BicepCurl => "Bicep Curl",
            Exercise::PushUp => "Push-up",
            Exercise::BenchPress => "Bench Press",
            Exercise::OverheadPress => "Overhead Press",
            Exercise::LateralRaise => "Lateral Raise",
            Exercise::Squat => "Squat",
            Exercise::Lunge => "Lunge",
            Exercise::CalfRaise => "Calf Raise",
            Exercise::Plank => "Plank",
            Exercise::Crunch => "Crunch",
            Exercise::RussianTwist => "Russian Twist",
            Exercise::PullUp => "Pull-up",
            Exercise::BentOverRow => "Bent-over Row",
            Exercise::Deadlift => "Deadlift",
            Exercise::HipThrust => "Hip Thrust",
            Exercise::GluteBridge => "Glute Bridge",
        }
    }

    pub fn muscle_group(self) -> MuscleGroup {
        match self {
            Exercise::BicepCurl => MuscleGroup::Arms,
            Exercise::PushUp | Exercise::BenchPress => MuscleGroup::Chest,
            Exercise::OverheadPress | Exercise::LateralRaise => MuscleGroup::Shoulders,
            Exercise::Squat | Exercise::Lunge | Exercise::CalfRaise => MuscleGroup::Legs,
            Exercise::Plank | Exercise::Crunch | Exercise::RussianTwist => MuscleGroup::Core,
            Exercise::PullUp | Exercise::BentOverRow | Exercise::Deadlift => MuscleGroup::Back,
            Exercise::HipThrust | Exercise::GluteBridge => MuscleGroup::Glutes,
        }
    }

    /// Strict lookup with no fallback.
    pub fn from_id(id: &str) -> Result<Self> {
        lookup(id).ok_or_else(|| CoachError::UnknownExercise(id.to_string()))
    }
}

impl fmt::Display for Exercise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_id() {
        assert_eq!(normalize_id("  Bicep Curl "), "bicep_curl");
        assert_eq!(normalize_id("Push-Up"), "push_up");
        assert_eq!(normalize_id("bent - over\trow"), "bent_over_row");
        assert_eq!(normalize_id("-squat-"), "squat");
    }

    #[test]
    fn test_every_canonical_id_resolves_to_itself() {
        for exercise in Exercise::ALL {
            assert_eq!(lookup(exercise.id()), Some(exercise));
            assert_eq!(lookup(exercise.name()), Some(exercise), "{}", exercise.name());
        }
    }

    #[test]
    fn test_aliases() {
        assert_eq!(lookup("PUSHUPS"), Some(Exercise::PushUp));
        assert_eq!(lookup("Shoulder Press"), Some(Exercise::OverheadPress));
        assert_eq!(lookup("pull-ups"), Some(Exercise::PullUp));
        assert_eq!(lookup("jumping_jacks"), None);
    }

    #[test]
    fn test_resolve_flags_fallback() {
        let known = resolve("squat", FALLBACK_EXERCISE);
        assert!(known.recognized);
        assert_eq!(known.exercise, Exercise::Squat);

        let unknown = resolve("burpees", FALLBACK_EXERCISE);
        assert!(unknown.is_fallback());
        assert_eq!(unknown.exercise, Exercise::BicepCurl);
        assert_eq!(unknown.requested, "burpees");
    }

    #[test]
    fn test_from_id_is_strict() {
        assert_eq!(Exercise::from_id("Glute Bridge").unwrap(), Exercise::GluteBridge);
        assert!(matches!(
            Exercise::from_id("burpees"),
            Err(CoachError::UnknownExercise(id)) if id == "burpees"
        ));
    }

    #[test]
    fn test_muscle_groups_cover_catalog() {
        let core: Vec<_> = Exercise::ALL
            .into_iter()
            .filter(|e| e.muscle_group() == MuscleGroup::Core)
            .collect();
        assert_eq!(core, vec![Exercise::Plank, Exercise::Crunch, Exercise::RussianTwist]);
    }
}
