//! Frame-loop lifecycle shared by the three particle effects.
//!
//! egui gives us one repaint per requested frame, so each effect keeps a
//! small state machine deciding whether it still wants frames. The loop
//! runs on an effect-local clock accumulated from per-frame `dt` rather
//! than wall time, which keeps the shield's time-parameterized rings
//! deterministic under test.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AnimationState {
    Idle,
    Running,
    /// Animation over, holding the last frame until a short clear delay
    /// elapses (shield only).
    Stopping,
}

/// Drives the seed -> step -> render -> continue? cadence for one effect.
///
/// `start` is idempotent in the at-most-one-chain sense: restarting while
/// running resets the clock and bumps the seed generation exactly once,
/// never leaving two logical frame chains alive.
#[derive(Clone, Debug)]
pub struct AnimationLoop {
    state: AnimationState,
    clock: f32,
    stop_clock: f32,
    generation: u64,
}

impl Default for AnimationLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationLoop {
    pub fn new() -> Self {
        Self {
            state: AnimationState::Idle,
            clock: 0.0,
            stop_clock: 0.0,
            generation: 0,
        }
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    /// True while the effect wants more frames (running or draining its
    /// post-stop clear delay).
    pub fn is_active(&self) -> bool {
        self.state != AnimationState::Idle
    }

    /// Bumped on every (re)start; a re-seed follows each bump.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn start(&mut self) {
        self.state = AnimationState::Running;
        self.clock = 0.0;
        self.stop_clock = 0.0;
        self.generation += 1;
    }

    /// Safe to call when already stopped.
    pub fn stop(&mut self) {
        self.state = AnimationState::Idle;
    }

    /// Enter the hold-then-clear phase. Only meaningful from `Running`.
    pub fn begin_stopping(&mut self) {
        if self.state == AnimationState::Running {
            self.state = AnimationState::Stopping;
            self.stop_clock = 0.0;
        }
    }

    pub fn tick(&mut self, dt: f32) {
        match self.state {
            AnimationState::Running => self.clock += dt,
            AnimationState::Stopping => self.stop_clock += dt,
            AnimationState::Idle => {}
        }
    }

    /// Seconds since the last `start`.
    pub fn elapsed(&self) -> f32 {
        self.clock
    }

    /// Seconds spent in `Stopping`.
    pub fn stopping_for(&self) -> f32 {
        self.stop_clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle() {
        let mut l = AnimationLoop::new();
        assert_eq!(l.state(), AnimationState::Idle);
        l.start();
        assert_eq!(l.state(), AnimationState::Running);
        l.stop();
        assert_eq!(l.state(), AnimationState::Idle);
        // Stopping an idle loop is a no-op.
        l.stop();
        assert_eq!(l.state(), AnimationState::Idle);
    }

    #[test]
    fn restart_bumps_generation_exactly_once() {
        let mut l = AnimationLoop::new();
        l.start();
        assert_eq!(l.generation(), 1);
        l.tick(1.0);
        // Restart mid-run: one cancel-then-schedule, not two chains.
        l.start();
        assert_eq!(l.generation(), 2);
        assert_eq!(l.state(), AnimationState::Running);
        assert_eq!(l.elapsed(), 0.0);
    }

    #[test]
    fn clocks_only_advance_in_their_phase() {
        let mut l = AnimationLoop::new();
        l.tick(5.0);
        assert_eq!(l.elapsed(), 0.0);
        l.start();
        l.tick(0.5);
        l.tick(0.25);
        assert!((l.elapsed() - 0.75).abs() < 1e-6);
        l.begin_stopping();
        l.tick(0.3);
        assert!((l.elapsed() - 0.75).abs() < 1e-6);
        assert!((l.stopping_for() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn begin_stopping_requires_running() {
        let mut l = AnimationLoop::new();
        l.begin_stopping();
        assert_eq!(l.state(), AnimationState::Idle);
    }
}
