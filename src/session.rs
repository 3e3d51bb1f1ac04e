//! Daily ritual session timing, affirmation rotation, and the small
//! one-shot timers behind the release and shield buttons.

use crate::config::SessionConfig;

pub const RITUAL_AFFIRMATIONS: [&str; 5] = [
    "I breathe in pure light.",
    "My lungs are vibrant and clear.",
    "Water cleanses my every cell.",
    "My body is a temple of light.",
    "I am healed, whole, and radiant.",
];

pub const RELEASE_AFFIRMATION: &str =
    "I release the burden that is not mine. I breathe my healing.";

/// Frame-clock driven ritual session. Completion fires exactly once per
/// run; the caller marks the day complete and persists progress.
#[derive(Clone, Debug, Default)]
pub struct RitualSession {
    elapsed: f32,
    running: bool,
    complete: bool,
}

impl RitualSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.elapsed = 0.0;
        self.running = true;
        self.complete = false;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn resume(&mut self) {
        if !self.complete {
            self.running = true;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Advance the session; returns true on the tick that completes it.
    pub fn tick(&mut self, dt: f32, config: &SessionConfig) -> bool {
        if !self.running || self.complete {
            return false;
        }
        self.elapsed += dt;
        if self.elapsed >= config.duration_secs {
            self.complete = true;
            self.running = false;
            return true;
        }
        false
    }

    pub fn progress(&self, config: &SessionConfig) -> f32 {
        (self.elapsed / config.duration_secs).clamp(0.0, 1.0)
    }

    pub fn affirmation(&self, config: &SessionConfig) -> &'static str {
        let idx = (self.elapsed / config.affirmation_secs) as usize;
        RITUAL_AFFIRMATIONS[idx % RITUAL_AFFIRMATIONS.len()]
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }
}

/// One-shot countdown; fires exactly once when it crosses zero.
#[derive(Clone, Debug, Default)]
pub struct Cooldown {
    remaining: Option<f32>,
}

impl Cooldown {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn arm(&mut self, secs: f32) {
        self.remaining = Some(secs);
    }

    pub fn cancel(&mut self) {
        self.remaining = None;
    }

    pub fn tick(&mut self, dt: f32) -> bool {
        if let Some(left) = &mut self.remaining {
            *left -= dt;
            if *left <= 0.0 {
                self.remaining = None;
                return true;
            }
        }
        false
    }

    pub fn is_active(&self) -> bool {
        self.remaining.is_some()
    }
}
