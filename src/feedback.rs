// src/feedback.rs - Feedback messages and per-session debouncing
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

pub const DEFAULT_COOLDOWN_MS: u64 = 2000;
pub const DEFAULT_HISTORY: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    Info,
    Warning,
    /// Rep completion. Never debounced.
    Success,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub kind: FeedbackKind,
    pub text: String,
    /// Set on the cue that marks reaching the working phase of a rep.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub encouragement: bool,
}

impl Feedback {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: FeedbackKind::Info,
            text: text.into(),
            encouragement: false,
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            kind: FeedbackKind::Warning,
            text: text.into(),
            encouragement: false,
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: FeedbackKind::Success,
            text: text.into(),
            encouragement: false,
        }
    }

    /// Informational cue for a phase transition. Passes the debounce like
    /// a rep celebration.
    pub fn encouragement(text: impl Into<String>) -> Self {
        Self {
            kind: FeedbackKind::Info,
            text: text.into(),
            encouragement: true,
        }
    }

    pub fn is_celebratory(&self) -> bool {
        self.kind == FeedbackKind::Success || self.encouragement
    }
}

/// Filters raw per-frame detector output down to what the user should see.
#[derive(Debug, Clone)]
pub struct FeedbackAggregator {
    cooldown: Duration,
    capacity: usize,
    log: VecDeque<Feedback>,
    last_correction: Option<DateTime<Utc>>,
}

impl Default for FeedbackAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN_MS, DEFAULT_HISTORY)
    }
}

impl FeedbackAggregator {
    pub fn new(cooldown_ms: u64, capacity: usize) -> Self {
        let cooldown_ms = i64::try_from(cooldown_ms).unwrap_or(i64::MAX);
        Self {
            cooldown: Duration::milliseconds(cooldown_ms),
            capacity: capacity.max(1),
            log: VecDeque::with_capacity(capacity.max(1)),
            last_correction: None,
        }
    }

    /// Runs one detector call's messages through the debounce rules and
    /// returns the ones that made it into the log.
    pub fn accept(&mut self, messages: &[Feedback], now: DateTime<Utc>) -> Vec<Feedback> {
        let mut accepted = Vec::new();

        for message in messages {
            if message.is_celebratory() || self.cooldown_elapsed(now) {
                if !message.is_celebratory() {
                    self.last_correction = Some(now);
                }
                accepted.push(message.clone());
            }
        }

        for message in &accepted {
            self.log.push_back(message.clone());
            if self.log.len() > self.capacity {
                self.log.pop_front();
            }
        }

        accepted
    }

    fn cooldown_elapsed(&self, now: DateTime<Utc>) -> bool {
        match self.last_correction {
            None => true,
            Some(last) => now.signed_duration_since(last) >= self.cooldown,
        }
    }

    /// Accepted messages, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &Feedback> + '_ {
        self.log.iter()
    }

    pub fn to_vec(&self) -> Vec<Feedback> {
        self.log.iter().cloned().collect()
    }

    pub fn last(&self) -> Option<&Feedback> {
        self.log.back()
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    pub fn clear(&mut self) {
        self.log.clear();
        self.last_correction = None;
    }
}
