//! Particle effects for Ritual Studio
//! Lungs, shield, and text-dissolve fields sharing one frame-driven shape:
//! seed -> step -> render -> continue?

use crate::animation::{AnimationLoop, AnimationState};
use crate::config::{DissolveConfig, LungsConfig, ShieldConfig};
use crate::surface::Surface;
use egui::{Color32, Painter, Rect, Stroke, Vec2};
use rand::Rng;
use rayon::prelude::*;

pub const DARKNESS_MIN: f32 = 0.2;
pub const DARKNESS_MAX: f32 = 1.0;

const SMOKE_GRAY: [u8; 3] = [50, 50, 50];
const GOLD: [u8; 3] = [255, 215, 0];

/// Cull threshold for faded particles. Anything this faint renders as
/// nothing, and removing at a small positive value keeps an N-step fade
/// ending at exactly N steps despite f32 accumulation.
const MIN_VISIBLE_ALPHA: f32 = 0.005;

/// A free-moving particle (lungs and dissolve variants).
#[derive(Clone, Copy, Debug)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    /// Monotonically non-increasing once spawned; the particle is removed
    /// before the next render when it reaches zero.
    pub alpha: f32,
}

/// Shield ring. Radius is a pure function of age, never integrated
/// velocity; a ring is removed when its expansion ratio reaches 1.
#[derive(Clone, Copy, Debug)]
pub struct Ring {
    /// Offset from the shield trigger, seconds. Negative age means the
    /// ring has not appeared yet (staggered insertion).
    pub spawned_at: f32,
    pub gold: bool,
    pub line_width: f32,
}

/// Expansion ratio for a ring of the given age. Rings grow over
/// `expand_fraction` of the total duration, so the last staggered ring
/// still finishes inside it.
fn ring_progress(age: f32, config: &ShieldConfig) -> f32 {
    age / (config.expand_fraction * config.duration)
}

// ============================================================================
// Lungs
// ============================================================================

/// Dark particles pooled in two lung-shaped clusters. The field thins as
/// the 21-day calendar fills and lightens as quiz darkness drops.
pub struct LungsEffect {
    surface: Surface,
    field: Vec<Particle>,
    driver: AnimationLoop,
    healing_level: f32,
    darkness: f32,
}

impl LungsEffect {
    pub fn new() -> Self {
        Self {
            surface: Surface::new(),
            field: Vec::new(),
            driver: AnimationLoop::new(),
            healing_level: 0.0,
            darkness: 0.8,
        }
    }

    /// Clamps to [0, 1]. Takes effect through the active-count slice on
    /// subsequent frames; particles already in flight are not touched.
    pub fn set_healing_level(&mut self, level: f32) {
        self.healing_level = level.clamp(0.0, 1.0);
    }

    /// Clamps to [0.2, 1.0], boundaries inclusive. Recolors every
    /// subsequent render.
    pub fn set_darkness(&mut self, value: f32) {
        self.darkness = value.clamp(DARKNESS_MIN, DARKNESS_MAX);
    }

    pub fn healing_level(&self) -> f32 {
        self.healing_level
    }

    pub fn darkness(&self) -> f32 {
        self.darkness
    }

    pub fn is_active(&self) -> bool {
        self.driver.is_active()
    }

    /// Idempotent; restarting re-seeds once and never forks a second
    /// frame chain. Runs until `stop` — the lungs have no self-timeout.
    pub fn start(&mut self, config: &LungsConfig) {
        self.driver.start();
        if self.surface.ensure_ready("lungs") {
            self.seed(config, &mut rand::thread_rng());
        }
    }

    pub fn stop(&mut self) {
        self.driver.stop();
    }

    fn seed(&mut self, config: &LungsConfig, rng: &mut impl Rng) {
        let w = self.surface.width();
        let h = self.surface.height();
        self.field.clear();
        for _ in 0..config.base_count {
            self.field.push(spawn_lung_particle(config, w, h, rng));
        }
    }

    /// Particles past this index sit dormant; they come back if the
    /// healing level drops again (retaking the quiz).
    fn active_count(&self, config: &LungsConfig) -> usize {
        let active = (config.base_count as f32 * (1.0 - self.healing_level)).floor() as usize;
        active.min(self.field.len())
    }

    fn step(&mut self, config: &LungsConfig) {
        let w = self.surface.width();
        let h = self.surface.height();
        let active = self.active_count(config);
        self.field[..active].par_iter_mut().for_each(|p| {
            // Reflect on the projected position so particles never leave
            // the surface, then move.
            let next = p.pos + p.vel;
            if next.x < 0.0 || next.x > w {
                p.vel.x = -p.vel.x;
            }
            if next.y < 0.0 || next.y > h {
                p.vel.y = -p.vel.y;
            }
            p.pos += p.vel;
        });
    }

    pub fn frame(&mut self, dt: f32, painter: &Painter, rect: Rect, config: &LungsConfig) -> bool {
        if self.surface.resize(rect.width(), rect.height()) && self.driver.is_active() {
            // Positions are fractions of the extent; a resize invalidates them.
            if self.surface.is_ready() {
                self.seed(config, &mut rand::thread_rng());
            }
        }
        if !self.driver.is_active() || !self.surface.ensure_ready("lungs") {
            return false;
        }
        self.driver.tick(dt);
        self.step(config);
        self.render(painter, rect, config);
        true
    }

    fn render(&self, painter: &Painter, rect: Rect, config: &LungsConfig) {
        let alpha = (self.darkness * 255.0) as u8;
        let color = Color32::from_rgba_unmultiplied(SMOKE_GRAY[0], SMOKE_GRAY[1], SMOKE_GRAY[2], alpha);
        for p in &self.field[..self.active_count(config)] {
            painter.circle_filled(rect.min + p.pos, p.size, color);
        }
    }
}

impl Default for LungsEffect {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawn in two oval areas left and right of center, one per lung.
fn spawn_lung_particle(config: &LungsConfig, w: f32, h: f32, rng: &mut impl Rng) -> Particle {
    let side = if rng.gen::<f32>() > 0.5 { 1.0 } else { -1.0 };
    let x = w / 2.0 + side * (w / 5.0 + (rng.gen::<f32>() - 0.5) * config.cluster_jitter);
    let y = h / 2.0 + (rng.gen::<f32>() - 0.3) * (h / 3.0);
    Particle {
        pos: Vec2::new(x.clamp(0.0, w), y.clamp(0.0, h)),
        vel: Vec2::new(
            (rng.gen::<f32>() - 0.5) * config.max_speed,
            (rng.gen::<f32>() - 0.5) * config.max_speed,
        ),
        size: config.min_size + rng.gen::<f32>() * config.size_jitter,
        alpha: 1.0,
    }
}

// ============================================================================
// Shield
// ============================================================================

/// Concentric gold and white rings pulsing outward from center.
/// Duration-terminated; holds the final frame briefly before clearing.
pub struct ShieldEffect {
    surface: Surface,
    rings: Vec<Ring>,
    driver: AnimationLoop,
}

impl ShieldEffect {
    pub fn new() -> Self {
        Self {
            surface: Surface::new(),
            rings: Vec::new(),
            driver: AnimationLoop::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.driver.is_active()
    }

    /// Re-triggering mid-animation cancels the running pulse and starts
    /// over with a fresh ring set and timer.
    pub fn start(&mut self, config: &ShieldConfig) {
        if !self.surface.ensure_ready("shield") {
            return;
        }
        self.driver.start();
        self.seed(config, &mut rand::thread_rng());
    }

    fn seed(&mut self, config: &ShieldConfig, rng: &mut impl Rng) {
        self.rings.clear();
        for i in 0..config.ring_count {
            self.rings.push(Ring {
                spawned_at: i as f32 * config.stagger,
                gold: i % 2 == 0,
                line_width: config.min_line_width + rng.gen::<f32>() * config.line_width_jitter,
            });
        }
    }

    pub fn stop(&mut self) {
        self.driver.stop();
        self.rings.clear();
    }

    fn advance(&mut self, dt: f32, config: &ShieldConfig) {
        self.driver.tick(dt);
        match self.driver.state() {
            AnimationState::Running => {
                let elapsed = self.driver.elapsed();
                self.rings
                    .retain(|r| ring_progress(elapsed - r.spawned_at, config) < 1.0);
                if elapsed >= config.duration {
                    // Hold the last frame so the fade-out is perceived,
                    // then clear.
                    self.driver.begin_stopping();
                }
            }
            AnimationState::Stopping => {
                if self.driver.stopping_for() >= config.clear_delay {
                    self.rings.clear();
                    self.driver.stop();
                }
            }
            AnimationState::Idle => {}
        }
    }

    pub fn frame(&mut self, dt: f32, painter: &Painter, rect: Rect, config: &ShieldConfig) -> bool {
        self.surface.resize(rect.width(), rect.height());
        if !self.driver.is_active() {
            return false;
        }
        self.advance(dt, config);
        self.render(painter, rect, config);
        self.driver.is_active()
    }

    fn render(&self, painter: &Painter, rect: Rect, config: &ShieldConfig) {
        let center = rect.center();
        let max_radius = rect.width().min(rect.height()) / 2.0 * config.radius_scale;
        let elapsed = self.driver.elapsed();
        for ring in &self.rings {
            let age = elapsed - ring.spawned_at;
            if age < 0.0 {
                continue; // not inserted yet
            }
            let progress = ring_progress(age, config);
            if progress >= 1.0 {
                continue;
            }
            let alpha = ((1.0 - progress) * 255.0) as u8;
            let rgb = if ring.gold { GOLD } else { [255, 255, 255] };
            let color = Color32::from_rgba_unmultiplied(rgb[0], rgb[1], rgb[2], alpha);
            painter.circle_stroke(
                center,
                max_radius * progress,
                Stroke::new(ring.line_width, color),
            );
        }
    }
}

impl Default for ShieldEffect {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Text dissolve
// ============================================================================

/// Luminous gold motes rising as written burdens dissolve. Population-
/// terminated: the animation ends when the last particle fades out.
pub struct TextDissolveEffect {
    surface: Surface,
    field: Vec<Particle>,
    driver: AnimationLoop,
}

impl TextDissolveEffect {
    pub fn new() -> Self {
        Self {
            surface: Surface::new(),
            field: Vec::new(),
            driver: AnimationLoop::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.driver.is_active()
    }

    pub fn is_exhausted(&self) -> bool {
        self.field.is_empty()
    }

    pub fn dissolve(&mut self, config: &DissolveConfig) {
        if !self.surface.ensure_ready("dissolve") {
            return;
        }
        self.driver.start();
        self.seed(config, &mut rand::thread_rng());
    }

    fn seed(&mut self, config: &DissolveConfig, rng: &mut impl Rng) {
        let w = self.surface.width();
        let h = self.surface.height();
        self.field.clear();
        for _ in 0..config.count {
            self.field.push(Particle {
                pos: Vec2::new(rng.gen::<f32>() * w, rng.gen::<f32>() * h),
                vel: Vec2::new(0.0, -(config.min_rise + rng.gen::<f32>() * config.rise_jitter)),
                size: config.min_size + rng.gen::<f32>() * config.size_jitter,
                alpha: 1.0,
            });
        }
    }

    fn step(&mut self, config: &DissolveConfig) {
        let decay = config.decay_step;
        self.field.par_iter_mut().for_each(|p| {
            p.pos += p.vel;
            p.alpha -= decay;
        });
        self.field.retain(|p| p.alpha > MIN_VISIBLE_ALPHA);
    }

    pub fn stop(&mut self) {
        self.driver.stop();
        self.field.clear();
    }

    pub fn frame(&mut self, dt: f32, painter: &Painter, rect: Rect, config: &DissolveConfig) -> bool {
        self.surface.resize(rect.width(), rect.height());
        if !self.driver.is_active() {
            return false;
        }
        self.driver.tick(dt);
        self.step(config);
        self.render(painter, rect);
        if self.is_exhausted() {
            self.stop();
            return false;
        }
        true
    }

    fn render(&self, painter: &Painter, rect: Rect) {
        for p in &self.field {
            let alpha = (p.alpha * 255.0) as u8;
            let color = Color32::from_rgba_unmultiplied(GOLD[0], GOLD[1], GOLD[2], alpha);
            painter.circle_filled(rect.min + p.pos, p.size, color);
        }
    }
}

impl Default for TextDissolveEffect {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared draw helper for the calendar's completed-day markers.
pub fn gold_fill(alpha: f32) -> Color32 {
    Color32::from_rgba_unmultiplied(GOLD[0], GOLD[1], GOLD[2], (alpha.clamp(0.0, 1.0) * 255.0) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DissolveConfig, LungsConfig, ShieldConfig};
    use crate::progress::HealingProgress;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ready_lungs(w: f32, h: f32) -> LungsEffect {
        let mut lungs = LungsEffect::new();
        lungs.surface.resize(w, h);
        lungs
    }

    #[test]
    fn healing_level_clamps_and_thins_field() {
        let config = LungsConfig::default();
        let mut lungs = ready_lungs(320.0, 240.0);
        let mut rng = StdRng::seed_from_u64(7);
        lungs.driver.start();
        lungs.seed(&config, &mut rng);

        lungs.set_healing_level(-0.5);
        assert_eq!(lungs.healing_level(), 0.0);
        assert_eq!(lungs.active_count(&config), 200);

        lungs.set_healing_level(1.5);
        assert_eq!(lungs.healing_level(), 1.0);
        assert_eq!(lungs.active_count(&config), 0);

        lungs.set_healing_level(1.0 / 21.0);
        assert_eq!(lungs.active_count(&config), 190); // floor(200 * 20/21)
    }

    #[test]
    fn darkness_clamps_inclusive() {
        let mut lungs = LungsEffect::new();
        lungs.set_darkness(0.05);
        assert_eq!(lungs.darkness(), DARKNESS_MIN);
        lungs.set_darkness(1.7);
        assert_eq!(lungs.darkness(), DARKNESS_MAX);
        lungs.set_darkness(0.2);
        assert_eq!(lungs.darkness(), 0.2);
        lungs.set_darkness(1.0);
        assert_eq!(lungs.darkness(), 1.0);
    }

    #[test]
    fn lungs_particles_stay_in_bounds() {
        let config = LungsConfig::default();
        let (w, h) = (320.0, 240.0);
        let mut lungs = ready_lungs(w, h);
        let mut rng = StdRng::seed_from_u64(42);
        lungs.driver.start();
        lungs.seed(&config, &mut rng);
        for _ in 0..10_000 {
            lungs.step(&config);
        }
        for p in &lungs.field {
            assert!(p.pos.x >= 0.0 && p.pos.x <= w, "x out of bounds: {}", p.pos.x);
            assert!(p.pos.y >= 0.0 && p.pos.y <= h, "y out of bounds: {}", p.pos.y);
        }
    }

    #[test]
    fn lungs_restart_reseeds_once() {
        let config = LungsConfig::default();
        let mut lungs = ready_lungs(320.0, 240.0);
        lungs.start(&config);
        let gen_first = lungs.driver.generation();
        lungs.start(&config);
        // One cancellation-then-schedule per restart, field replaced not grown.
        assert_eq!(lungs.driver.generation(), gen_first + 1);
        assert_eq!(lungs.field.len(), config.base_count);
        assert!(lungs.is_active());
    }

    #[test]
    fn lungs_inert_without_surface() {
        let config = LungsConfig::default();
        let mut lungs = LungsEffect::new();
        lungs.start(&config);
        assert!(lungs.field.is_empty());
    }

    #[test]
    fn dissolve_terminates_within_decay_bound() {
        let config = DissolveConfig::default();
        let mut fx = TextDissolveEffect::new();
        fx.surface.resize(320.0, 240.0);
        fx.driver.start();
        let mut rng = StdRng::seed_from_u64(3);
        fx.seed(&config, &mut rng);
        assert_eq!(fx.field.len(), 200);

        let bound = (1.0 / config.decay_step).ceil() as usize;
        let mut steps = 0;
        while !fx.is_exhausted() {
            fx.step(&config);
            steps += 1;
            assert!(steps <= bound, "dissolve did not terminate within {bound} steps");
        }
        assert!(fx.is_exhausted());
    }

    #[test]
    fn dissolve_alpha_monotonically_decreases() {
        let config = DissolveConfig::default();
        let mut fx = TextDissolveEffect::new();
        fx.surface.resize(100.0, 100.0);
        fx.driver.start();
        let mut rng = StdRng::seed_from_u64(5);
        fx.seed(&config, &mut rng);
        let before: Vec<f32> = fx.field.iter().map(|p| p.alpha).collect();
        fx.step(&config);
        for (p, prev) in fx.field.iter().zip(before) {
            assert!(p.alpha < prev);
        }
    }

    #[test]
    fn dissolve_particles_rise() {
        let config = DissolveConfig::default();
        let mut fx = TextDissolveEffect::new();
        fx.surface.resize(100.0, 100.0);
        fx.driver.start();
        let mut rng = StdRng::seed_from_u64(11);
        fx.seed(&config, &mut rng);
        let before: Vec<f32> = fx.field.iter().map(|p| p.pos.y).collect();
        fx.step(&config);
        for (p, prev) in fx.field.iter().zip(before) {
            assert!(p.pos.y < prev);
        }
    }

    #[test]
    fn shield_rings_stagger_and_expire_by_age() {
        let config = ShieldConfig::default();
        let mut shield = ShieldEffect::new();
        shield.surface.resize(200.0, 200.0);
        shield.start(&config);
        assert_eq!(shield.rings.len(), 3);
        assert!(shield.rings[0].gold);
        assert!(!shield.rings[1].gold);
        assert!(shield.rings[2].gold);

        // At t=0.1 only the first ring has a non-negative age.
        shield.advance(0.1, &config);
        let visible = shield
            .rings
            .iter()
            .filter(|r| shield.driver.elapsed() - r.spawned_at >= 0.0)
            .count();
        assert_eq!(visible, 1);

        // The first ring finishes expanding at 0.8 * duration = 2.4 s.
        while shield.driver.elapsed() < 2.45 {
            shield.advance(0.05, &config);
        }
        assert_eq!(shield.rings.len(), 2);
    }

    #[test]
    fn shield_stops_after_duration_then_clears() {
        let config = ShieldConfig::default();
        let mut shield = ShieldEffect::new();
        shield.surface.resize(200.0, 200.0);
        shield.start(&config);

        while shield.driver.state() == AnimationState::Running {
            shield.advance(0.05, &config);
            assert!(shield.driver.elapsed() <= config.duration + 0.05 + 1e-3);
        }
        assert_eq!(shield.driver.state(), AnimationState::Stopping);

        // Post-stop delay elapses, surface is cleared.
        let mut held = 0.0;
        while shield.driver.is_active() {
            shield.advance(0.1, &config);
            held += 0.1;
            assert!(held <= config.clear_delay + 0.2);
        }
        assert!(shield.rings.is_empty());
        assert_eq!(shield.driver.state(), AnimationState::Idle);
    }

    #[test]
    fn shield_restart_resets_ring_set_and_timer() {
        let config = ShieldConfig::default();
        let mut shield = ShieldEffect::new();
        shield.surface.resize(200.0, 200.0);
        shield.start(&config);
        shield.advance(1.0, &config);
        let gen_first = shield.driver.generation();
        shield.start(&config);
        assert_eq!(shield.driver.generation(), gen_first + 1);
        assert_eq!(shield.driver.elapsed(), 0.0);
        assert_eq!(shield.rings.len(), config.ring_count);
    }

    #[test]
    fn ring_radius_is_pure_function_of_age() {
        let config = ShieldConfig::default();
        // progress = age / (0.8 * 3.0)
        assert!((ring_progress(1.2, &config) - 0.5).abs() < 1e-6);
        assert!((ring_progress(2.4, &config) - 1.0).abs() < 1e-6);
        assert!(ring_progress(0.0, &config) == 0.0);
    }

    #[test]
    fn completed_day_thins_next_seed() {
        // End-to-end: one ritual session completes, the next seed sees it.
        let config = LungsConfig::default();
        let mut progress = HealingProgress::default();
        assert_eq!(progress.days.len(), 0);

        progress.mark_day_complete();
        assert_eq!(progress.days, vec![1]);

        let mut lungs = ready_lungs(320.0, 240.0);
        lungs.set_healing_level(progress.healing_level());
        lungs.start(&config);
        assert_eq!(lungs.active_count(&config), 190); // floor(200 * 20/21)
    }
}
