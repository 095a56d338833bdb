//! Simulation owner and tick orchestration
//!
//! One `Simulation` owns the ordered resident particles, the transient clone
//! pool, the motion field, the voice classifier, and the mode state machine.
//! The tick loop is strictly serial: all inputs are snapshotted into a
//! [`ForceSample`] at the start of the tick and treated as immutable for its
//! duration. Structural mutation (text rebuild, mode transitions, clone
//! spawn/reap) happens only at tick boundaries, with spawns collected first
//! and committed after the update pass.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::layout::{self, GlyphMetrics, Provenance};
use super::modes::{self, Mode, SpawnRule, SpawnScope};
use super::motion::{FrameError, MotionField};
use super::particle::{Particle, ParticleId, Rgb};
use super::scheduler::{
    AnimationScheduler, Easing, OnComplete, Repeat, TweenProps, TweenRequest, TweenTag,
};
use super::voice::{VoiceClassifier, VoiceFlags};
use crate::consts::*;

/// View dimensions the layout and motion grid map into
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewRect {
    pub width: f32,
    pub height: f32,
}

impl ViewRect {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// One tick's worth of external influence, snapshotted before any particle
/// moves
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceSample {
    pub pointer: Vec2,
    pub select_held: bool,
    pub voice: VoiceFlags,
    pub mode: Option<Mode>,
    pub view: ViewRect,
}

/// Host-observed input for one tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    pub pointer: Vec2,
    /// Selection modifier held: suppresses repulsion, marks nearby particles
    pub select_held: bool,
}

/// Recurring clone-spawn timer installed by a mode
#[derive(Debug, Clone)]
struct SpawnTimer {
    mode: Mode,
    rule: SpawnRule,
    elapsed: u32,
    /// Anchors; stale ids (after a text rebuild) are silently skipped
    targets: Vec<ParticleId>,
}

/// The whole simulation
pub struct Simulation {
    particles: Vec<Particle>,
    clones: Vec<Particle>,
    text: String,
    view: ViewRect,
    mode: Option<Mode>,
    spawner: Option<SpawnTimer>,
    last_provenance: Provenance,
    motion: MotionField,
    voice: VoiceClassifier,
    scheduler: Box<dyn AnimationScheduler>,
    metrics: Box<dyn GlyphMetrics>,
    rng: Pcg32,
    next_id: ParticleId,
    tick_count: u64,
}

impl Simulation {
    pub fn new(
        seed: u64,
        view: ViewRect,
        scheduler: Box<dyn AnimationScheduler>,
        metrics: Box<dyn GlyphMetrics>,
    ) -> Self {
        Self {
            particles: Vec::new(),
            clones: Vec::new(),
            text: String::new(),
            view,
            mode: None,
            spawner: None,
            last_provenance: Provenance::Keystroke,
            motion: MotionField::new(seed ^ 0x9e37_79b9),
            voice: VoiceClassifier::new(),
            scheduler,
            metrics,
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
            tick_count: 0,
        }
    }

    fn next_particle_id(&mut self) -> ParticleId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    // ---- collaborator inputs -------------------------------------------

    /// Camera frame (320x240 RGBA). A rejected buffer leaves the grid as-is.
    pub fn ingest_frame(&mut self, rgba: &[u8]) -> Result<(), FrameError> {
        self.motion.ingest_frame(rgba)
    }

    /// Raw audio frequency magnitudes
    pub fn ingest_spectrum(&mut self, magnitudes: &[u8]) {
        self.voice.ingest_spectrum(magnitudes);
    }

    /// Authoritative text update from any input source. Punctuation is
    /// stripped; if any was present and the update was typed directly, the
    /// denial reaction plays. A net change rebuilds all particles.
    pub fn handle_text(&mut self, raw: &str, provenance: Provenance, now_ms: f64) {
        let grew = raw.chars().count() > self.text.chars().count();
        if grew {
            self.voice.note_insertion(now_ms);
        } else {
            self.voice.touch(now_ms);
        }

        let (clean, had_punctuation) = layout::sanitize(raw);
        self.last_provenance = provenance;
        if clean != self.text {
            self.text = clean;
            self.rebuild_particles(provenance);
        }

        if had_punctuation && provenance == Provenance::Keystroke {
            self.trigger_denial();
        }
    }

    /// Report a completed tween whose request carried an [`OnComplete`]
    pub fn finish_tween(&mut self, target: ParticleId, action: OnComplete) {
        let Some(p) = self.particles.iter_mut().find(|p| p.id == target) else {
            return;
        };
        match action {
            OnComplete::ClearDenial => {
                p.denial = false;
                let home = TweenProps {
                    x: Some(p.origin.x),
                    y: Some(p.origin.y),
                    ..Default::default()
                };
                self.scheduler.schedule(TweenRequest::single(
                    target,
                    TweenTag::Denial,
                    home,
                    DENIAL_RETURN_SECS,
                    Easing::Linear,
                ));
            }
            OnComplete::ReturnHome { secs } => {
                let home = TweenProps {
                    x: Some(p.origin.x),
                    y: Some(p.origin.y),
                    scale_x: Some(1.0),
                    scale_y: Some(1.0),
                    rotation: Some(0.0),
                    alpha: Some(1.0),
                    color: Some(Rgb::WHITE),
                    ..Default::default()
                };
                self.scheduler.schedule(TweenRequest::single(
                    target,
                    TweenTag::Reset,
                    home,
                    secs,
                    Easing::PowerOut(2),
                ));
            }
        }
    }

    /// Write one interpolated sample from the host's tween executor back
    /// onto its target. `None` fields are left untouched; alpha and blur
    /// are clamped to their legal ranges. Retargeting `origin_y` moves the
    /// spring's rest point, so physics keeps pulling toward the new home.
    /// Unknown ids are ignored (the particle may have been reaped).
    pub fn apply_tween(&mut self, target: ParticleId, props: &TweenProps) {
        let Some(p) = self
            .particles
            .iter_mut()
            .chain(self.clones.iter_mut())
            .find(|p| p.id == target)
        else {
            return;
        };
        if let Some(x) = props.x {
            p.pos.x = x;
        }
        if let Some(y) = props.y {
            p.pos.y = y;
        }
        if let Some(origin_y) = props.origin_y {
            p.origin.y = origin_y;
        }
        if let Some(scale_x) = props.scale_x {
            p.scale.x = scale_x;
        }
        if let Some(scale_y) = props.scale_y {
            p.scale.y = scale_y;
        }
        if let Some(rotation) = props.rotation {
            p.rotation = rotation;
        }
        if let Some(alpha) = props.alpha {
            p.alpha = alpha.clamp(0.0, 1.0);
        }
        if let Some(blur) = props.blur {
            p.blur = blur.max(0.0);
        }
        if let Some(weight) = props.weight {
            p.weight = weight;
        }
        if let Some(color) = props.color {
            p.color = color;
        }
    }

    /// Particles re-enter the way the text last arrived, so transcribed
    /// words still fly in after a viewport change.
    pub fn resize(&mut self, view: ViewRect) {
        self.view = view;
        self.rebuild_particles(self.last_provenance);
    }

    // ---- mode state machine --------------------------------------------

    /// Switch to `mode`, cancelling everything the previous mode scheduled.
    /// Invoking with the active mode replays it from scratch.
    pub fn set_mode(&mut self, mode: Mode) {
        log::info!("mode -> {:?}", mode);
        self.clones.clear();
        self.spawner = None;
        self.scheduler.cancel_all();

        // the cancelled shake can no longer clear the flag itself
        for p in &mut self.particles {
            p.denial = false;
            p.reset_transform();
        }

        let targets = self.take_target_set();
        self.mode = Some(mode);

        for (idx, &id) in targets.iter().enumerate() {
            let Some(pi) = self.particles.iter().position(|p| p.id == id) else {
                continue;
            };
            let p = &mut self.particles[pi];
            p.pos = p.origin;
            p.vel = Vec2::ZERO;
            let batch = modes::apply(mode, p, idx, targets.len(), self.view, &mut self.rng);
            for req in batch {
                self.scheduler.schedule(req);
            }
        }

        if mode == Mode::Quotes {
            self.spawn_quote_echoes(&targets);
        }

        if let Some(rule) = mode.spawn_rule() {
            self.spawner = Some(SpawnTimer {
                mode,
                rule,
                elapsed: 0,
                targets,
            });
        }
    }

    /// Back to no mode: cancel everything and ease every particle home with
    /// a neutral transform
    pub fn reset(&mut self) {
        log::info!("mode reset");
        self.mode = None;
        self.clones.clear();
        self.spawner = None;
        self.scheduler.cancel_all();

        for p in &mut self.particles {
            p.denial = false;
            p.selected = false;
            p.reset_transform();
            self.scheduler.schedule(TweenRequest::single(
                p.id,
                TweenTag::Reset,
                TweenProps {
                    x: Some(p.origin.x),
                    y: Some(p.origin.y),
                    ..Default::default()
                },
                RESET_RETURN_SECS,
                Easing::PowerOut(2),
            ));
        }
    }

    /// Empty everything: text, particles, clones, mode
    pub fn clear(&mut self) {
        log::info!("cleared");
        self.text.clear();
        self.particles.clear();
        self.clones.clear();
        self.mode = None;
        self.spawner = None;
        self.scheduler.cancel_all();
    }

    /// Selected subset if any particle is marked, else all residents.
    /// Selection flags are consumed either way.
    fn take_target_set(&mut self) -> Vec<ParticleId> {
        let any_selected = self.particles.iter().any(|p| p.selected);
        let targets = self
            .particles
            .iter()
            .filter(|p| !any_selected || p.selected)
            .map(|p| p.id)
            .collect();
        for p in &mut self.particles {
            p.selected = false;
        }
        targets
    }

    /// Quotes mode: permanent mirrored echoes 20 units below each target
    fn spawn_quote_echoes(&mut self, targets: &[ParticleId]) {
        let echoes: Vec<(char, Vec2)> = targets
            .iter()
            .filter_map(|&id| self.particles.iter().find(|p| p.id == id))
            .map(|p| (p.glyph, Vec2::new(p.pos.x, p.origin.y + 20.0)))
            .collect();
        for (glyph, origin) in echoes {
            let id = self.next_particle_id();
            let mut echo = Particle::new(id, glyph, origin);
            echo.color = Rgb::new(100, 255, 255);
            self.particles.push(echo);
        }
    }

    // ---- text / layout -------------------------------------------------

    fn rebuild_particles(&mut self, provenance: Provenance) {
        // Requests for the dropped particles must not outlive them
        self.scheduler.cancel_all();
        self.clones.clear();
        self.particles.clear();

        let origins = layout::layout_origins(&self.text, self.metrics.as_ref(), self.view);
        let far = self.view.width.max(self.view.height);
        for (glyph, origin) in origins {
            let id = self.next_particle_id();
            let p = match provenance {
                Provenance::Transcribed => {
                    Particle::new_flying(id, glyph, origin, far, &mut self.rng)
                }
                Provenance::Keystroke => Particle::new(id, glyph, origin),
            };
            self.particles.push(p);
        }
        log::info!("laid out {} particles", self.particles.len());
    }

    /// Punctuation rejection: suspend physics on every resident and shake it
    /// around its origin, the completion easing it home again
    fn trigger_denial(&mut self) {
        for p in &mut self.particles {
            self.scheduler.cancel(p.id);
            p.denial = true;
            let shake = TweenProps {
                x: Some(p.origin.x + self.rng.random_range(-DENIAL_JITTER..DENIAL_JITTER)),
                y: Some(p.origin.y + self.rng.random_range(-DENIAL_JITTER..DENIAL_JITTER)),
                ..Default::default()
            };
            self.scheduler.schedule(TweenRequest {
                repeat: Repeat::Times(DENIAL_REPEATS),
                yoyo: true,
                on_complete: Some(OnComplete::ClearDenial),
                ..TweenRequest::single(
                    p.id,
                    TweenTag::Denial,
                    shake,
                    DENIAL_SHAKE_SECS,
                    Easing::Linear,
                )
            });
        }
    }

    // ---- tick loop -----------------------------------------------------

    /// Advance the whole simulation one tick
    pub fn tick(&mut self, input: &TickInput) {
        let sample = ForceSample {
            pointer: input.pointer,
            select_held: input.select_held,
            voice: self.voice.flags(),
            mode: self.mode,
            view: self.view,
        };

        // Phase 1: collect due clone spawns (committed after the update pass)
        let pending = self.collect_spawns();

        // Phase 2: advance residents in insertion order; each may read its
        // predecessor's (already updated) horizontal position
        {
            let Self {
                particles,
                clones,
                motion,
                rng,
                ..
            } = self;
            for i in 0..particles.len() {
                let (head, tail) = particles.split_at_mut(i);
                let left_x = head.last().map(|p| p.pos.x);
                tail[0].step(&sample, motion, left_x, rng);
            }

            for clone in clones.iter_mut() {
                clone.step(&sample, motion, None, rng);
            }
        }

        // Phase 3: commit boundary effects
        self.clones.retain(|c| c.life().is_none_or(|l| l > 0.0));
        self.clones.extend(pending);
        self.motion.settle();
        self.tick_count += 1;
    }

    fn collect_spawns(&mut self) -> Vec<Particle> {
        let mut pending = Vec::new();
        let Some(timer) = &mut self.spawner else {
            return pending;
        };

        timer.elapsed += 1;
        if timer.elapsed < timer.rule.interval_ticks {
            return pending;
        }
        timer.elapsed = 0;

        let rule = timer.rule;
        let mode = timer.mode;
        if self.rng.random::<f32>() >= rule.chance {
            return pending;
        }

        let live: Vec<(char, Vec2)> = timer
            .targets
            .iter()
            .filter_map(|&id| self.particles.iter().find(|p| p.id == id))
            .map(|p| (p.glyph, p.pos))
            .collect();
        if live.is_empty() {
            return pending;
        }

        let picks: Vec<(char, Vec2)> = match rule.scope {
            SpawnScope::EveryTarget => live,
            SpawnScope::OneRandomTarget => {
                vec![live[self.rng.random_range(0..live.len())]]
            }
        };

        for (glyph, pos) in picks {
            let drift = if rule.drifting {
                Vec2::new(
                    (self.rng.random::<f32>() - 0.2) * 2.0,
                    -self.rng.random::<f32>() * 3.0,
                )
            } else {
                Vec2::ZERO
            };
            let id = self.next_particle_id();
            pending.push(Particle::new_clone(
                id, glyph, pos, mode, rule.alpha, rule.life, drift,
            ));
        }
        pending
    }

    // ---- read-only snapshot --------------------------------------------

    /// Every live particle (residents first, then clones) for the render sink
    pub fn particles(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter().chain(self.clones.iter())
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn mode(&self) -> Option<Mode> {
        self.mode
    }

    pub fn view(&self) -> ViewRect {
        self.view
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    #[cfg(test)]
    pub(crate) fn residents_mut(&mut self) -> &mut Vec<Particle> {
        &mut self.particles
    }
}
