use rand::seq::SliceRandom;
use std::time::{Duration, Instant};

pub const DISPLAY_DURATION: Duration = Duration::from_millis(4000);
pub const LOCK_COOLDOWN: Duration = Duration::from_millis(500);

/// Shown instead of a blank bubble when a request carries no usable text.
pub const FALLBACK_TEXT: &str = "something ate my words X_X";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Normal,
    /// Locks out subsequent messages for a short cooldown, so a welcome or
    /// confirmation cannot be overwritten by an incidental hover message.
    Forced,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogText {
    One(String),
    OneOf(Vec<String>),
}

impl From<&str> for DialogText {
    fn from(text: &str) -> Self {
        DialogText::One(text.to_string())
    }
}

impl From<String> for DialogText {
    fn from(text: String) -> Self {
        DialogText::One(text)
    }
}

impl From<Vec<String>> for DialogText {
    fn from(texts: Vec<String>) -> Self {
        DialogText::OneOf(texts)
    }
}

impl DialogText {
    fn resolve(self) -> String {
        let picked = match self {
            DialogText::One(text) => Some(text),
            DialogText::OneOf(texts) => texts.choose(&mut rand::thread_rng()).cloned(),
        };
        match picked {
            Some(text) if !text.trim().is_empty() => text,
            _ => FALLBACK_TEXT.to_string(),
        }
    }
}

/// Single-slot message display. Deadlines are stored and polled rather than
/// callback-scheduled, so there is never more than one live hide deadline and
/// one live unlock deadline; accepting a request supersedes both.
#[derive(Debug, Default)]
pub struct DialogScheduler {
    text: Option<String>,
    locked: bool,
    hide_at: Option<Instant>,
    unlock_at: Option<Instant>,
}

impl DialogScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the request was accepted. While locked every request
    /// is dropped, not queued.
    pub fn show(&mut self, text: impl Into<DialogText>, priority: Priority, now: Instant) -> bool {
        if self.locked {
            return false;
        }

        self.text = Some(text.into().resolve());
        self.hide_at = Some(now + DISPLAY_DURATION);
        if priority == Priority::Forced {
            self.locked = true;
            self.unlock_at = Some(now + LOCK_COOLDOWN);
        } else {
            self.unlock_at = None;
        }
        true
    }

    pub fn tick(&mut self, now: Instant) {
        if self.hide_at.is_some_and(|at| now >= at) {
            self.text = None;
            self.hide_at = None;
        }
        if self.unlock_at.is_some_and(|at| now >= at) {
            self.locked = false;
            self.unlock_at = None;
        }
    }

    pub fn dismiss(&mut self) {
        self.text = None;
        self.locked = false;
        self.hide_at = None;
        self.unlock_at = None;
    }

    pub fn visible_text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Earliest pending deadline, for repaint scheduling.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.hide_at, self.unlock_at) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (Some(a), None) => Some(a),
            (None, Some(b)) => Some(b),
            (None, None) => None,
        }
    }
}
