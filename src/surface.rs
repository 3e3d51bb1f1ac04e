//! Drawing surface bookkeeping shared by the ritual effects.
//!
//! Each effect owns one surface sized to its container. Spawn positions
//! are fractions of the surface extent, so callers re-seed whenever
//! `resize` reports a change. A zero-area surface marks the effect
//! inert: operations become no-ops and a warning is logged once.

#[derive(Clone, Debug, Default)]
pub struct Surface {
    width: f32,
    height: f32,
    warned_inert: bool,
}

impl Surface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt the container extent. Returns true when the extent changed,
    /// which invalidates any particle positions seeded against the old one.
    pub fn resize(&mut self, width: f32, height: f32) -> bool {
        let changed = (self.width - width).abs() > f32::EPSILON
            || (self.height - height).abs() > f32::EPSILON;
        self.width = width;
        self.height = height;
        if self.is_ready() {
            self.warned_inert = false;
        }
        changed
    }

    pub fn is_ready(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Gate for effect operations. Logs once per inert stretch, then
    /// stays silent so a missing container never spams the log.
    pub fn ensure_ready(&mut self, effect: &str) -> bool {
        if self.is_ready() {
            return true;
        }
        if !self.warned_inert {
            log::warn!("{effect}: drawing surface has no extent, effect is inert");
            self.warned_inert = true;
        }
        false
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }
}
