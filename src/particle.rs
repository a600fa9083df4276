//! Per-particle kinematic and visual state.
//!
//! A `Particle` is a plain state record simulated in surface coordinates
//! (origin at the top-left, y growing downward, like the drawing surface it
//! is rendered to). Construction and stepping are pure functions of
//! `(state, settings, rng)`, so the physics is testable without any
//! rendering backend; the sync system in [`crate::stream`] owns the mapping
//! to world-space transforms.

use std::f32::consts::PI;

use bevy::prelude::*;

use crate::settings::StreamSettings;

/// One live particle of a stream.
///
/// `kill_age` and `fade_start` are fixed at birth; `dead` transitions
/// false→true exactly once and is never reset.
#[derive(Clone, Debug)]
pub struct Particle {
    /// Child entity carrying this particle's quad mesh, material, and
    /// `Transform`.
    pub entity: Entity,
    /// Position in surface coordinates (pixels, y down).
    pub x: f32,
    pub y: f32,
    /// Velocity per frame.
    pub vx: f32,
    pub vy: f32,
    /// Frames since birth; +1 per step.
    pub age: u32,
    /// Age past which the particle is marked dead.
    pub kill_age: f32,
    /// Age at which opacity/size decay begins.
    pub fade_start: f32,
    /// Current rendered size in pixels.
    pub size: f32,
    /// Current opacity in [0, 1] at birth; decays geometrically.
    pub opacity: f32,
    /// Current rotation angle, degrees.
    pub angle: f32,
    /// Per-frame rotation speed; sign resolved at birth in dual mode.
    pub spin: f32,
    /// Oscillator phase driving wave motion and wobble; +1 per step.
    pub phase: f32,
    pub dead: bool,
}

/// Uniform noise in `[-amount, +amount]`.
fn jitter(rng: &mut fastrand::Rng, amount: f32) -> f32 {
    rng.f32() * (2.0 * amount) - amount
}

/// Uniform value in `[min, max)`.
fn uniform(rng: &mut fastrand::Rng, min: f32, max: f32) -> f32 {
    min + rng.f32() * (max - min)
}

impl Particle {
    /// Construct a particle at a random point of the emission zone, with all
    /// birth jitter drawn from `rng`. Deterministic for a seeded rng.
    ///
    /// The caller assigns `entity` after spawning the sprite; the record
    /// starts with a placeholder so construction stays free of ECS concerns.
    pub fn spawn(
        settings: &StreamSettings,
        surface_width: f32,
        surface_height: f32,
        rng: &mut fastrand::Rng,
    ) -> Self {
        let spin = if settings.rotation_dual {
            if rng.bool() {
                settings.rotation_amount
            } else {
                -settings.rotation_amount
            }
        } else {
            settings.rotation_amount
        };

        Self {
            entity: Entity::PLACEHOLDER,
            x: uniform(
                rng,
                surface_width * settings.emit_left / 100.0,
                surface_width * settings.emit_right / 100.0,
            ),
            y: uniform(
                rng,
                surface_height * settings.emit_top / 100.0,
                surface_height * settings.emit_bottom / 100.0,
            ),
            vx: jitter(rng, settings.spread_x),
            vy: (settings.gravity / 100.0) * jitter(rng, settings.gravity_jitter).max(1.0),
            age: 0,
            kill_age: settings.life + jitter(rng, settings.life_jitter),
            fade_start: settings.fade_start + jitter(rng, settings.fade_start_jitter),
            size: settings.size + jitter(rng, settings.size_jitter),
            opacity: settings.opacity / 100.0 + jitter(rng, settings.opacity_jitter / 100.0),
            angle: settings.rotation + jitter(rng, settings.rotation_jitter),
            spin,
            phase: uniform(rng, 0.0, 360.0),
            dead: false,
        }
    }

    /// Advance the particle by one frame: integrate motion, rotate, apply
    /// age-gated decay, then evaluate death.
    ///
    /// Death is evaluated last so the frame that kills a particle still
    /// produces a drawable state; removal happens on the next compaction
    /// pass. Size and opacity are deliberately not clamped at zero (they go
    /// negative when a multiplier ≥ 1 compounds a jitter overshoot).
    pub fn step(&mut self, settings: &StreamSettings) {
        self.phase += 1.0;
        self.age += 1;

        // Constant acceleration accumulates every frame.
        self.vy += settings.gravity / 100.0;
        self.y += self.vy;
        self.x += self.vx
            + settings.wave_size * (PI * self.phase / settings.wave_freq).sin()
            + settings.wind / 10.0;

        if settings.wobble {
            self.angle +=
                settings.rotation_amount * (PI * self.phase / settings.wobble_freq).sin();
        } else {
            self.angle += self.spin;
        }

        if self.age as f32 >= self.fade_start {
            self.opacity *= settings.opacity_mult;
            self.size *= settings.size_mult;
        }

        self.dead =
            self.dead || self.y < 0.0 || self.opacity <= 0.0 || self.age as f32 > self.kill_age;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Settings with every stochastic and kinematic term zeroed, so tests
    /// can enable one behavior at a time.
    fn still_settings() -> StreamSettings {
        StreamSettings {
            texture: "test.png".into(),
            blending: String::new(),
            emit_delay_ms: 30,
            emit_left: 0.0,
            emit_right: 100.0,
            emit_top: 0.0,
            emit_bottom: 100.0,
            zone_visible: false,
            gravity: 0.0,
            gravity_jitter: 0.0,
            spread_x: 0.0,
            wind: 0.0,
            wave_size: 0.0,
            wave_freq: 80.0,
            life: 10.0,
            life_jitter: 0.0,
            fade_start: 5.0,
            fade_start_jitter: 0.0,
            size: 10.0,
            size_jitter: 0.0,
            size_mult: 1.0,
            rotation: 0.0,
            rotation_jitter: 0.0,
            wobble: false,
            rotation_amount: 0.0,
            wobble_freq: 40.0,
            rotation_dual: false,
            opacity: 100.0,
            opacity_jitter: 0.0,
            opacity_mult: 1.0,
        }
    }

    #[test]
    fn birth_position_falls_inside_emission_zone() {
        let settings = still_settings();
        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..1000 {
            let p = Particle::spawn(&settings, 200.0, 100.0, &mut rng);
            assert!((0.0..200.0).contains(&p.x), "x out of zone: {}", p.x);
            assert!((0.0..100.0).contains(&p.y), "y out of zone: {}", p.y);
        }
    }

    #[test]
    fn birth_position_respects_partial_zone() {
        let mut settings = still_settings();
        settings.emit_left = 10.0;
        settings.emit_right = 90.0;
        settings.emit_top = 80.0;
        settings.emit_bottom = 90.0;
        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..1000 {
            let p = Particle::spawn(&settings, 200.0, 100.0, &mut rng);
            assert!((20.0..180.0).contains(&p.x));
            assert!((80.0..90.0).contains(&p.y));
        }
    }

    #[test]
    fn kill_age_and_fade_start_never_change_after_birth() {
        let settings = still_settings();
        let mut rng = fastrand::Rng::with_seed(1);
        let mut p = Particle::spawn(&settings, 100.0, 100.0, &mut rng);
        let (kill_age, fade_start) = (p.kill_age, p.fade_start);
        for _ in 0..50 {
            p.step(&settings);
            assert_eq!(p.kill_age, kill_age);
            assert_eq!(p.fade_start, fade_start);
        }
    }

    #[test]
    fn age_increases_by_one_per_step() {
        let settings = still_settings();
        let mut rng = fastrand::Rng::with_seed(1);
        let mut p = Particle::spawn(&settings, 100.0, 100.0, &mut rng);
        for expected in 1..=20 {
            p.step(&settings);
            assert_eq!(p.age, expected);
        }
    }

    #[test]
    fn dead_flag_never_resets() {
        let settings = still_settings();
        let mut rng = fastrand::Rng::with_seed(1);
        let mut p = Particle::spawn(&settings, 100.0, 100.0, &mut rng);
        // Step far past kill_age; the flag must latch.
        for _ in 0..30 {
            p.step(&settings);
        }
        assert!(p.dead);
        for _ in 0..10 {
            p.step(&settings);
            assert!(p.dead);
        }
    }

    #[test]
    fn decay_scenario_halves_opacity_then_dies() {
        // life=10, fade_start=5, opacity_mult=0.5, size_mult=1, no motion.
        let mut settings = still_settings();
        settings.opacity_mult = 0.5;
        let mut rng = fastrand::Rng::with_seed(42);
        let mut p = Particle::spawn(&settings, 100.0, 100.0, &mut rng);
        p.y = 50.0; // keep clear of the top edge
        assert_eq!(p.opacity, 1.0);

        // Ages 1..=4: before fade_start, opacity untouched.
        for _ in 0..4 {
            p.step(&settings);
            assert_eq!(p.opacity, 1.0);
        }
        // Age 5 reaches the gate: decay starts on this very step.
        p.step(&settings);
        assert!((p.opacity - 0.5).abs() < 1e-6);
        p.step(&settings);
        assert!((p.opacity - 0.25).abs() < 1e-6);

        // Keep stepping to age 10 (== kill_age, still alive), then 11.
        while p.age < 10 {
            p.step(&settings);
        }
        assert!(!p.dead, "age == kill_age must not kill yet");
        p.step(&settings);
        assert_eq!(p.age, 11);
        assert!(p.dead);
    }

    #[test]
    fn decay_is_strictly_decreasing_once_started() {
        let mut settings = still_settings();
        settings.life = 100.0;
        settings.fade_start = 3.0;
        settings.opacity_mult = 0.9;
        settings.size_mult = 0.95;
        let mut rng = fastrand::Rng::with_seed(3);
        let mut p = Particle::spawn(&settings, 100.0, 100.0, &mut rng);
        p.y = 50.0;

        while p.age < 3 {
            p.step(&settings);
        }
        let (mut opacity, mut size) = (p.opacity, p.size);
        for _ in 0..20 {
            p.step(&settings);
            assert!(p.opacity < opacity);
            assert!(p.size < size);
            opacity = p.opacity;
            size = p.size;
        }
    }

    #[test]
    fn gravity_accumulates_as_constant_acceleration() {
        let mut settings = still_settings();
        settings.gravity = 10.0; // 0.1 px/frame² downward
        settings.life = 1000.0;
        settings.fade_start = 1000.0;
        let mut rng = fastrand::Rng::with_seed(5);
        let mut p = Particle::spawn(&settings, 100.0, 100.0, &mut rng);
        p.y = 0.0;
        p.vy = 0.0;

        p.step(&settings);
        assert!((p.vy - 0.1).abs() < 1e-6);
        assert!((p.y - 0.1).abs() < 1e-6);
        p.step(&settings);
        assert!((p.vy - 0.2).abs() < 1e-6);
        assert!((p.y - 0.3).abs() < 1e-6);
    }

    #[test]
    fn wind_and_wave_displace_horizontally() {
        let mut settings = still_settings();
        settings.wind = 20.0; // +2 px/frame
        settings.wave_size = 1.0;
        settings.wave_freq = 80.0;
        settings.life = 1000.0;
        settings.fade_start = 1000.0;
        let mut rng = fastrand::Rng::with_seed(9);
        let mut p = Particle::spawn(&settings, 100.0, 100.0, &mut rng);
        p.x = 0.0;
        p.vx = 0.0;
        p.phase = 0.0;

        p.step(&settings);
        let expected = 1.0 * (PI * 1.0 / 80.0).sin() + 2.0;
        assert!((p.x - expected).abs() < 1e-6);
    }

    #[test]
    fn rising_particle_dies_above_the_top_edge() {
        let mut settings = still_settings();
        settings.gravity = -4.0; // upward
        settings.life = 10_000.0;
        settings.fade_start = 10_000.0;
        let mut rng = fastrand::Rng::with_seed(11);
        let mut p = Particle::spawn(&settings, 100.0, 100.0, &mut rng);
        p.y = 5.0;
        p.vy = -1.0;

        let mut steps = 0;
        while !p.dead {
            p.step(&settings);
            steps += 1;
            assert!(steps < 100, "particle never crossed the top edge");
        }
        assert!(p.y < 0.0);
    }

    #[test]
    fn dual_rotation_picks_both_directions() {
        let mut settings = still_settings();
        settings.rotation_dual = true;
        settings.rotation_amount = 1.2;
        let mut rng = fastrand::Rng::with_seed(13);
        let mut seen_cw = false;
        let mut seen_ccw = false;
        for _ in 0..100 {
            let p = Particle::spawn(&settings, 100.0, 100.0, &mut rng);
            assert_eq!(p.spin.abs(), 1.2);
            seen_cw |= p.spin > 0.0;
            seen_ccw |= p.spin < 0.0;
        }
        assert!(seen_cw && seen_ccw);
    }

    #[test]
    fn wobble_oscillates_instead_of_spinning() {
        let mut settings = still_settings();
        settings.wobble = true;
        settings.rotation_amount = 2.0;
        settings.wobble_freq = 10.0;
        settings.life = 10_000.0;
        settings.fade_start = 10_000.0;
        let mut rng = fastrand::Rng::with_seed(17);
        let mut p = Particle::spawn(&settings, 100.0, 100.0, &mut rng);
        p.y = 50.0;
        p.angle = 0.0;
        p.phase = 0.0;

        // Over one full oscillation period the net angle change of a sine
        // drive is far smaller than a constant spin would produce.
        for _ in 0..20 {
            p.step(&settings);
        }
        assert!(p.angle.abs() < 2.0 * 20.0 * 0.5);
    }

    #[test]
    fn negative_size_and_opacity_are_not_clamped() {
        let mut settings = still_settings();
        settings.fade_start = 0.0;
        settings.life = 10_000.0;
        settings.opacity_mult = 0.5;
        settings.size_mult = 1.1;
        let mut rng = fastrand::Rng::with_seed(19);
        let mut p = Particle::spawn(&settings, 100.0, 100.0, &mut rng);
        p.y = 50.0;
        p.size = -1.0; // jitter overshoot at birth
        p.step(&settings);
        // A multiplier > 1 compounds the negative size further; no clamp.
        assert!(p.size < -1.0);
    }
}
