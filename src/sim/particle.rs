//! Particle state and the per-tick force integration
//!
//! One particle owns one character's kinematic and visual state. Force order
//! for a resident, non-denied particle each tick:
//!
//! 1. audio deformation (loud / fast-cadence neighbor coupling)
//! 2. optical motion-grid force
//! 3. pointer repulsion
//! 4. home-spring return
//! 5. friction damping
//! 6. integration
//! 7. selection marking
//!
//! Whisper mode replaces steps 1-4 with an ice-slide recipe. Clones skip the
//! force model entirely and run a decay recipe keyed by their spawning mode;
//! a denied particle is a pure no-op while an external shake tween plays.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::modes::Mode;
use super::motion::MotionField;
use super::state::ForceSample;
use crate::consts::*;

/// Stable particle identity; tween requests and spawn timers refer to these
pub type ParticleId = u32;

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Rgb::WHITE
    }
}

/// Exactly one of: a resident character, or a transient clone
///
/// Clones never regenerate home-spring force; only clones carry life and
/// drift, and the owning collection removes them once life reaches zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Lifecycle {
    Resident,
    Clone {
        life: f32,
        /// Spawning mode; selects the decay recipe
        style: Mode,
        drift: Vec2,
    },
}

/// One simulated character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub id: ParticleId,
    pub glyph: char,
    /// Resting coordinate the home spring pulls toward
    pub origin: Vec2,
    pub pos: Vec2,
    pub vel: Vec2,
    pub spring: f32,
    pub friction: f32,

    pub alpha: f32,
    /// Independent horizontal/vertical scale
    pub scale: Vec2,
    /// Degrees
    pub rotation: f32,
    pub blur: f32,
    /// Bold/thin axis, nominal range 400-800
    pub weight: f32,
    pub color: Rgb,
    pub furry: bool,
    pub spiky: bool,

    /// Physics suspended while an external shake excursion plays
    pub denial: bool,
    /// Marked by pointer proximity with the modifier held; sticky until a
    /// mode change or reset
    pub selected: bool,
    pub lifecycle: Lifecycle,
}

impl Particle {
    /// Resident particle at rest on its origin
    pub fn new(id: ParticleId, glyph: char, origin: Vec2) -> Self {
        Self {
            id,
            glyph,
            origin,
            pos: origin,
            vel: Vec2::ZERO,
            spring: BASE_SPRING,
            friction: BASE_FRICTION,
            alpha: 1.0,
            scale: Vec2::ONE,
            rotation: 0.0,
            blur: 0.0,
            weight: BASE_WEIGHT,
            color: Rgb::WHITE,
            furry: false,
            spiky: false,
            denial: false,
            selected: false,
            lifecycle: Lifecycle::Resident,
        }
    }

    /// Resident particle starting a full view-diagonal away in a random
    /// direction, so the home spring flies it in (voice-provenance spawns)
    pub fn new_flying(id: ParticleId, glyph: char, origin: Vec2, far: f32, rng: &mut Pcg32) -> Self {
        let angle = rng.random::<f32>() * std::f32::consts::TAU;
        let mut p = Self::new(id, glyph, origin);
        p.pos = origin + Vec2::from_angle(angle) * far;
        p
    }

    /// Transient clone anchored at a live particle's current position
    pub fn new_clone(
        id: ParticleId,
        glyph: char,
        pos: Vec2,
        style: Mode,
        alpha: f32,
        life: f32,
        drift: Vec2,
    ) -> Self {
        let mut p = Self::new(id, glyph, pos);
        p.alpha = alpha;
        p.lifecycle = Lifecycle::Clone { life, style, drift };
        p
    }

    pub fn is_clone(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Clone { .. })
    }

    /// Remaining life; residents report none
    pub fn life(&self) -> Option<f32> {
        match self.lifecycle {
            Lifecycle::Clone { life, .. } => Some(life),
            Lifecycle::Resident => None,
        }
    }

    /// Neutral visual transform (mode changes and resets apply this before
    /// any new recipe)
    pub fn reset_transform(&mut self) {
        self.alpha = 1.0;
        self.scale = Vec2::ONE;
        self.rotation = 0.0;
        self.blur = 0.0;
        self.weight = BASE_WEIGHT;
        self.color = Rgb::WHITE;
        self.furry = false;
        self.spiky = false;
    }

    /// Advance one tick. `left_x` is the insertion-order predecessor's
    /// horizontal position for cadence coupling.
    pub fn step(
        &mut self,
        sample: &ForceSample,
        motion: &MotionField,
        left_x: Option<f32>,
        rng: &mut Pcg32,
    ) {
        if self.denial {
            return;
        }

        if let Lifecycle::Clone { .. } = self.lifecycle {
            self.step_clone();
            return;
        }

        if sample.mode == Some(Mode::Whisper) {
            self.step_whisper(sample, rng);
            return;
        }

        // 1. Audio deformation
        if sample.voice.loud {
            // Dough: heavy, wide, sticky
            self.weight = LOUD_WEIGHT;
            self.scale.x += (LOUD_SCALE_X - self.scale.x) * SCALE_EASE;
            self.scale.y += (LOUD_SCALE_Y - self.scale.y) * SCALE_EASE;
            self.friction = LOUD_FRICTION;
        } else if sample.voice.fast {
            // Jelly: crowd against the left neighbor, bounce on the spring
            if let Some(lx) = left_x {
                let gap = (self.pos.x - lx).abs();
                if gap < NEIGHBOR_COMPRESS_DIST {
                    self.vel.x += NEIGHBOR_PUSH;
                    self.scale.x = NEIGHBOR_SQUEEZE;
                } else if gap > NEIGHBOR_EXPAND_DIST {
                    self.vel.x -= NEIGHBOR_PULL;
                }
            }
            self.spring = FAST_SPRING;
        } else {
            self.weight = BASE_WEIGHT;
            self.friction = BASE_FRICTION;
            self.spring = BASE_SPRING;
            if !self.spiky {
                self.scale.x += (1.0 - self.scale.x) * SCALE_EASE;
                self.scale.y += (1.0 - self.scale.y) * SCALE_EASE;
            }
        }

        // 2. Optical motion grid
        if let Some(burst) = motion.sample(self.pos, sample.view) {
            self.vel += burst * MOTION_INFLUENCE;
            self.rotation += burst.x * MOTION_SPIN;
        }

        // 3. Pointer repulsion
        let to_pointer = sample.pointer - self.pos;
        let dist = to_pointer.length();
        if dist < POINTER_RADIUS && dist > f32::EPSILON && !sample.select_held {
            let force = (POINTER_RADIUS - dist) / POINTER_RADIUS;
            self.vel -= to_pointer / dist * force * POINTER_FORCE;
        }

        // 4. Home spring
        self.vel += (self.origin - self.pos) * self.spring;

        // 5-6. Damping, integration
        self.vel *= self.friction;
        self.pos += self.vel;

        // 7. Selection marking
        if sample.select_held && dist < SELECT_RADIUS {
            self.selected = true;
        }
    }

    /// Ice-slide sub-mode: fragile, blurred, pushed far with jitter
    fn step_whisper(&mut self, sample: &ForceSample, rng: &mut Pcg32) {
        self.blur = WHISPER_BLUR;
        self.alpha = WHISPER_ALPHA;

        let to_pointer = sample.pointer - self.pos;
        let dist = to_pointer.length();
        if dist < WHISPER_RADIUS && dist > f32::EPSILON {
            let force = (WHISPER_RADIUS - dist) / WHISPER_RADIUS;
            let jitter = Vec2::new(
                (rng.random::<f32>() - 0.5) * WHISPER_JITTER,
                (rng.random::<f32>() - 0.5) * WHISPER_JITTER,
            );
            self.vel -= (to_pointer / dist * WHISPER_PUSH + jitter * 0.1) * force * WHISPER_FORCE;
            self.rotation += (rng.random::<f32>() - 0.5) * force * WHISPER_SPIN;
        }

        self.vel *= WHISPER_FRICTION;
        self.pos += self.vel;
    }

    /// Clone decay, keyed by the spawning mode
    fn step_clone(&mut self) {
        let Lifecycle::Clone { life, style, drift } = &mut self.lifecycle else {
            return;
        };
        *life -= CLONE_LIFE_DECAY;
        self.alpha = (*life / CLONE_FULL_LIFE).clamp(0.0, 1.0);

        match style {
            Mode::Weeping => self.pos.y += WEEPING_FALL,
            Mode::Comma => self.pos.y += COMMA_FALL,
            Mode::Ellipsis => {
                self.pos += *drift;
                self.blur += ELLIPSIS_BLUR_RATE;
                self.scale *= ELLIPSIS_SHRINK;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::ViewRect;
    use proptest::prelude::*;
    use rand::SeedableRng;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(42)
    }

    /// Pointer parked far away, no flags, no mode
    fn quiet_sample() -> ForceSample {
        ForceSample {
            pointer: Vec2::new(-10_000.0, -10_000.0),
            select_held: false,
            voice: Default::default(),
            mode: None,
            view: ViewRect::new(800.0, 600.0),
        }
    }

    fn quiet_field() -> MotionField {
        MotionField::new(7)
    }

    #[test]
    fn test_denial_suspends_everything() {
        let mut p = Particle::new(1, 'a', Vec2::new(100.0, 100.0));
        p.pos = Vec2::new(300.0, 300.0);
        p.vel = Vec2::new(5.0, -5.0);
        p.denial = true;

        let sample = ForceSample {
            pointer: p.pos, // right on top of it
            ..quiet_sample()
        };
        let field = quiet_field();
        let mut rng = rng();
        for _ in 0..50 {
            p.step(&sample, &field, None, &mut rng);
        }
        assert_eq!(p.pos, Vec2::new(300.0, 300.0));
        assert_eq!(p.vel, Vec2::new(5.0, -5.0));
    }

    #[test]
    fn test_pointer_repulsion_pushes_away() {
        let origin = Vec2::new(400.0, 300.0);
        let mut p = Particle::new(1, 'a', origin);
        let sample = ForceSample {
            pointer: origin + Vec2::new(30.0, 0.0),
            ..quiet_sample()
        };
        p.step(&sample, &quiet_field(), None, &mut rng());
        assert!(p.vel.x < 0.0, "should flee leftward, vel {:?}", p.vel);
        assert!(p.pos.x < origin.x);
    }

    #[test]
    fn test_selection_modifier_disables_repulsion_and_marks() {
        let origin = Vec2::new(400.0, 300.0);
        let mut p = Particle::new(1, 'a', origin);
        let sample = ForceSample {
            pointer: origin + Vec2::new(30.0, 0.0),
            select_held: true,
            ..quiet_sample()
        };
        p.step(&sample, &quiet_field(), None, &mut rng());
        assert_eq!(p.pos, origin, "no repulsion while modifier held");
        assert!(p.selected);

        // Outside the 50-unit marking radius: untouched
        let mut far = Particle::new(2, 'b', origin + Vec2::new(80.0, 0.0));
        far.step(&sample, &quiet_field(), None, &mut rng());
        assert!(!far.selected);
    }

    #[test]
    fn test_loud_deformation_trends() {
        let mut p = Particle::new(1, 'a', Vec2::new(100.0, 100.0));
        let sample = ForceSample {
            voice: crate::sim::voice::VoiceFlags {
                loud: true,
                ..Default::default()
            },
            ..quiet_sample()
        };
        let field = quiet_field();
        let mut rng = rng();
        for _ in 0..60 {
            p.step(&sample, &field, None, &mut rng);
        }
        assert_eq!(p.weight, LOUD_WEIGHT);
        assert_eq!(p.friction, LOUD_FRICTION);
        assert!((p.scale.x - LOUD_SCALE_X).abs() < 0.05);
        assert!((p.scale.y - LOUD_SCALE_Y).abs() < 0.05);

        // Flags dropped: everything relaxes back
        let quiet = quiet_sample();
        for _ in 0..120 {
            p.step(&quiet, &field, None, &mut rng);
        }
        assert_eq!(p.weight, BASE_WEIGHT);
        assert!((p.scale.x - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_neighbor_coupling_compress_and_expand() {
        let flags = crate::sim::voice::VoiceFlags {
            fast: true,
            ..Default::default()
        };
        let sample = ForceSample {
            voice: flags,
            ..quiet_sample()
        };
        let field = quiet_field();
        let mut rng = rng();

        // 40 apart (below 55): trailing particle gains rightward velocity
        let mut p = Particle::new(1, 'b', Vec2::new(140.0, 100.0));
        p.step(&sample, &field, Some(100.0), &mut rng);
        assert!(p.vel.x > 0.0);
        assert_eq!(p.scale.x, NEIGHBOR_SQUEEZE);
        assert_eq!(p.spring, FAST_SPRING);

        // 80 apart (above 70): pulled back toward the neighbor
        let mut q = Particle::new(2, 'c', Vec2::new(180.0, 100.0));
        q.step(&sample, &field, Some(100.0), &mut rng);
        assert!(q.vel.x < 0.0);

        // 60 apart: neither push nor pull, just the bouncier spring
        let mut r = Particle::new(3, 'd', Vec2::new(160.0, 100.0));
        r.step(&sample, &field, Some(100.0), &mut rng);
        assert_eq!(r.vel.x, 0.0);
        assert_eq!(r.spring, FAST_SPRING);
    }

    #[test]
    fn test_motion_grid_force_applied() {
        let mut field = quiet_field();
        // Particle at (400, 300) maps to cell (20, 15)
        *field.cell_mut(20, 15) = crate::sim::motion::MotionCell {
            vel: Vec2::new(4.0, 0.0),
            active: true,
        };

        let mut p = Particle::new(1, 'a', Vec2::new(400.0, 300.0));
        let sample = quiet_sample();
        p.step(&sample, &field, None, &mut rng());
        // Velocity gains the scaled burst, then friction applies
        assert!(p.vel.x > 0.0);
        assert!((p.rotation - 4.0 * MOTION_SPIN).abs() < 1e-6);
    }

    #[test]
    fn test_whisper_overrides_standard_forces() {
        let origin = Vec2::new(400.0, 300.0);
        let mut p = Particle::new(1, 'a', origin);
        p.pos = origin + Vec2::new(150.0, 0.0); // displaced, inside whisper radius
        let sample = ForceSample {
            pointer: origin,
            mode: Some(Mode::Whisper),
            ..quiet_sample()
        };
        p.step(&sample, &quiet_field(), None, &mut rng());

        assert_eq!(p.blur, WHISPER_BLUR);
        assert_eq!(p.alpha, WHISPER_ALPHA);
        // No home spring in whisper: the push moves it further out
        assert!(p.pos.x > origin.x + 150.0);
    }

    #[test]
    fn test_clone_life_strictly_decreases() {
        let mut c = Particle::new_clone(
            9,
            'x',
            Vec2::new(50.0, 50.0),
            Mode::Weeping,
            0.5,
            100.0,
            Vec2::ZERO,
        );
        let sample = quiet_sample();
        let field = quiet_field();
        let mut rng = rng();
        let mut last = c.life().unwrap();
        for _ in 0..10 {
            let y_before = c.pos.y;
            c.step(&sample, &field, None, &mut rng);
            let life = c.life().unwrap();
            assert!((last - life - CLONE_LIFE_DECAY).abs() < 1e-6);
            assert!((c.pos.y - y_before - WEEPING_FALL).abs() < 1e-6);
            last = life;
        }
    }

    #[test]
    fn test_ellipsis_clone_drifts_blurs_shrinks() {
        let drift = Vec2::new(0.8, -2.0);
        let mut c = Particle::new_clone(
            9,
            'x',
            Vec2::new(50.0, 50.0),
            Mode::Ellipsis,
            0.5,
            ELLIPSIS_LIFE,
            drift,
        );
        let sample = quiet_sample();
        let field = quiet_field();
        let mut rng = rng();
        c.step(&sample, &field, None, &mut rng);
        assert_eq!(c.pos, Vec2::new(50.0, 50.0) + drift);
        assert_eq!(c.blur, ELLIPSIS_BLUR_RATE);
        assert_eq!(c.scale, Vec2::ONE * ELLIPSIS_SHRINK);
        // Over-full life clamps to opaque
        assert_eq!(c.alpha, 1.0);
    }

    proptest! {
        /// With zero external force, any displaced particle converges back
        /// to its origin with near-zero velocity
        #[test]
        fn prop_return_to_rest(dx in -500.0f32..500.0, dy in -500.0f32..500.0) {
            let origin = Vec2::new(400.0, 300.0);
            let mut p = Particle::new(1, 'a', origin);
            p.pos = origin + Vec2::new(dx, dy);

            let sample = quiet_sample();
            let field = quiet_field();
            let mut rng = rng();
            for _ in 0..400 {
                p.step(&sample, &field, None, &mut rng);
            }
            prop_assert!((p.pos - origin).length() < 0.01);
            prop_assert!(p.vel.length() < 0.01);
        }
    }
}
