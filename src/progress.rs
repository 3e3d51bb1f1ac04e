//! The 21-day healing progress record.
//!
//! Plain structured data, rewritten whole on every update (temp file plus
//! rename, so a crash never leaves a half-written record). A missing or
//! corrupt file falls back to a fresh journey; losing decorative progress
//! is never fatal.

use crate::effects::{DARKNESS_MAX, DARKNESS_MIN};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const RITUAL_DAYS: u32 = 21;

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct HealingProgress {
    /// Completed day indices, 1..=21, in completion order.
    pub days: Vec<u32>,
    /// Quiz-derived symptom severity in [0.2, 1.0].
    pub darkness: f32,
}

impl Default for HealingProgress {
    fn default() -> Self {
        Self {
            days: Vec::new(),
            darkness: 0.8,
        }
    }
}

impl HealingProgress {
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(progress) => progress,
                Err(e) => {
                    log::warn!("progress record unreadable, starting fresh: {e}");
                    Self::default()
                }
            },
            Err(_) => Self::default(), // first run
        }
    }

    /// Whole-object atomic rewrite.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Marks the next day in the journey complete. Returns the day index,
    /// or None once all 21 days are done.
    pub fn mark_day_complete(&mut self) -> Option<u32> {
        let next = self.days.len() as u32 + 1;
        if next <= RITUAL_DAYS && !self.days.contains(&next) {
            self.days.push(next);
            Some(next)
        } else {
            None
        }
    }

    pub fn is_day_complete(&self, day: u32) -> bool {
        self.days.contains(&day)
    }

    /// Fraction of the journey complete, in [0, 1]. Drives the lungs
    /// particle density.
    pub fn healing_level(&self) -> f32 {
        (self.days.len() as f32 / RITUAL_DAYS as f32).clamp(0.0, 1.0)
    }

    pub fn set_darkness(&mut self, value: f32) {
        self.darkness = value.clamp(DARKNESS_MIN, DARKNESS_MAX);
    }
}
