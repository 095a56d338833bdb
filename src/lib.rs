//! Empathic Type - kinetic typography particle simulation
//!
//! Renders a string of characters as independent physical particles that react
//! to pointer proximity, ambient audio loudness and typing cadence, optical
//! motion sampled from a camera feed, and a catalog of discrete animation
//! modes, then relax back toward a resting layout.
//!
//! Core modules:
//! - `sim`: the whole simulation (particle physics, motion field, voice
//!   classification, text layout, mode state machine)
//!
//! Rendering, hardware capture, speech transcription, and tween execution are
//! external collaborators reached through the traits and plain data types in
//! `sim` (`AnimationScheduler`, `GlyphMetrics`, the particle snapshot).

pub mod sim;

pub use sim::{
    AnimationScheduler, ForceSample, GlyphMetrics, Mode, MotionField, Particle, ParticleId,
    Provenance, Simulation, TickInput, TweenRequest, ViewRect, VoiceClassifier,
};

/// Simulation tuning constants
pub mod consts {
    /// Nominal tick rate; velocities and decay factors are per-tick at this rate
    pub const TICK_HZ: f32 = 60.0;

    /// Baseline velocity damping per tick
    pub const BASE_FRICTION: f32 = 0.90;
    /// Baseline home-spring stiffness
    pub const BASE_SPRING: f32 = 0.1;
    /// Baseline stroke weight (bold/thin axis, nominal range 400-800)
    pub const BASE_WEIGHT: f32 = 400.0;

    /// Pointer repulsion radius
    pub const POINTER_RADIUS: f32 = 100.0;
    /// Pointer repulsion strength
    pub const POINTER_FORCE: f32 = 5.0;
    /// Radius for marking particles selected while the modifier is held
    pub const SELECT_RADIUS: f32 = 50.0;

    /// Loud audio: target stroke weight
    pub const LOUD_WEIGHT: f32 = 800.0;
    /// Loud audio: target horizontal scale (wide)
    pub const LOUD_SCALE_X: f32 = 1.5;
    /// Loud audio: target vertical scale (squished)
    pub const LOUD_SCALE_Y: f32 = 0.8;
    /// Loud audio: stickier damping
    pub const LOUD_FRICTION: f32 = 0.8;
    /// Easing rate for scale/weight trends (per tick)
    pub const SCALE_EASE: f32 = 0.1;

    /// Fast cadence: bouncier spring
    pub const FAST_SPRING: f32 = 0.3;
    /// Neighbor gap below which the trailing particle is pushed right
    pub const NEIGHBOR_COMPRESS_DIST: f32 = 55.0;
    /// Neighbor gap above which the trailing particle is pulled back
    pub const NEIGHBOR_EXPAND_DIST: f32 = 70.0;
    /// Rightward push when compressed
    pub const NEIGHBOR_PUSH: f32 = 2.0;
    /// Leftward pull when over-expanded
    pub const NEIGHBOR_PULL: f32 = 1.0;
    /// Horizontal squeeze while compressed
    pub const NEIGHBOR_SQUEEZE: f32 = 0.8;

    /// Motion grid influence on particle velocity
    pub const MOTION_INFLUENCE: f32 = 0.8;
    /// Motion grid influence on particle rotation (degrees per vx unit)
    pub const MOTION_SPIN: f32 = 0.2;

    /// Whisper mode: repel radius
    pub const WHISPER_RADIUS: f32 = 200.0;
    /// Whisper mode: heavier damping (ice slide)
    pub const WHISPER_FRICTION: f32 = 0.92;
    /// Whisper mode: constant blur radius
    pub const WHISPER_BLUR: f32 = 3.0;
    /// Whisper mode: reduced opacity
    pub const WHISPER_ALPHA: f32 = 0.7;
    /// Whisper mode: repel strength
    pub const WHISPER_FORCE: f32 = 5.0;
    /// Whisper mode: directed push component
    pub const WHISPER_PUSH: f32 = 2.0;
    /// Whisper mode: per-tick jitter amplitude
    pub const WHISPER_JITTER: f32 = 5.0;
    /// Whisper mode: rotation jitter amplitude (degrees)
    pub const WHISPER_SPIN: f32 = 10.0;

    /// Life lost by every clone each tick
    pub const CLONE_LIFE_DECAY: f32 = 1.5;
    /// Life at which a clone is fully opaque
    pub const CLONE_FULL_LIFE: f32 = 100.0;
    /// Weeping clones: fall speed per tick
    pub const WEEPING_FALL: f32 = 4.0;
    /// Comma clones: fall speed per tick
    pub const COMMA_FALL: f32 = 2.0;
    /// Ellipsis clones: blur gained per tick
    pub const ELLIPSIS_BLUR_RATE: f32 = 0.5;
    /// Ellipsis clones: multiplicative shrink per tick
    pub const ELLIPSIS_SHRINK: f32 = 0.99;
    /// Ellipsis clones: starting life (fades in from beyond full opacity)
    pub const ELLIPSIS_LIFE: f32 = 150.0;

    /// Motion grid dimensions
    pub const GRID_COLS: usize = 40;
    pub const GRID_ROWS: usize = 30;
    /// Expected camera frame size (RGBA)
    pub const FRAME_WIDTH: usize = 320;
    pub const FRAME_HEIGHT: usize = 240;
    /// Mean per-channel difference above which a cell registers motion
    pub const MOTION_SENSITIVITY: f32 = 25.0;
    /// Burst velocity range per axis (uniform in +/- half this)
    pub const MOTION_BURST: f32 = 8.0;
    /// Multiplicative cell velocity decay per frame without motion
    pub const MOTION_DECAY: f32 = 0.9;
    /// Per-axis magnitude below which a cell goes inactive
    pub const MOTION_EPSILON: f32 = 0.1;

    /// Spectrum average above which audio counts as loud
    pub const LOUD_THRESHOLD: f32 = 30.0;
    /// Insertion gap below which typing cadence is fast (ms)
    pub const FAST_CADENCE_MS: f64 = 120.0;
    /// Insertion gap above which typing cadence is slow (ms)
    pub const SLOW_CADENCE_MS: f64 = 300.0;

    /// Characters stripped from input text before layout
    pub const PUNCTUATION: &str = ".,/#!$%^&*;:{}=-_`~()?\"'[]";

    /// Denial shake: excursion amplitude around origin
    pub const DENIAL_JITTER: f32 = 30.0;
    /// Denial shake: single excursion duration (seconds)
    pub const DENIAL_SHAKE_SECS: f32 = 0.1;
    /// Denial shake: yoyo repeats
    pub const DENIAL_REPEATS: u32 = 3;
    /// Denial: ease-home duration after the shake (seconds)
    pub const DENIAL_RETURN_SECS: f32 = 0.4;
    /// Reset: ease-home duration (seconds)
    pub const RESET_RETURN_SECS: f32 = 0.8;

    /// Clone spawn cadence per mode (ticks at `TICK_HZ`)
    pub const ELLIPSIS_SPAWN_TICKS: u32 = 7;
    pub const COMMA_SPAWN_TICKS: u32 = 9;
    pub const WEEPING_SPAWN_TICKS: u32 = 3;
}
