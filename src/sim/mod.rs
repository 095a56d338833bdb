//! The particle simulation
//!
//! Everything here is pure and platform-free:
//! - Serial fixed-tick execution, no blocking, no parallelism
//! - Seeded RNG only
//! - Inputs snapshotted at tick start, immutable for the tick
//! - Structural mutation (rebuild, mode change, clone spawn/reap) only at
//!   tick boundaries
//! - No rendering, capture, or timer dependencies; those live behind the
//!   `AnimationScheduler` and `GlyphMetrics` seams

pub mod layout;
pub mod modes;
pub mod motion;
pub mod particle;
pub mod scheduler;
pub mod state;
pub mod voice;

pub use layout::{FixedAdvance, GlyphMetrics, Provenance};
pub use modes::{Mode, SpawnRule, SpawnScope};
pub use motion::{FrameError, MotionCell, MotionField};
pub use particle::{Lifecycle, Particle, ParticleId, Rgb};
pub use scheduler::{
    AnimationScheduler, Easing, OnComplete, Repeat, TweenProps, TweenRequest, TweenStage, TweenTag,
};
pub use state::{ForceSample, Simulation, TickInput, ViewRect};
pub use voice::{VoiceClassifier, VoiceFlags};
