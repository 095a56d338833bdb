//! Declarative tween requests and the animation-scheduler seam
//!
//! The core never interpolates multi-frame transitions itself. Mode recipes,
//! the denial shake, and reset all compile down to [`TweenRequest`] values
//! handed to an [`AnimationScheduler`] implementation owned by the host. A
//! request is pure data: which particle, which fields, over how long, with
//! what easing/repeat shape. Cancellation is per-target and must be
//! deterministic; a leaked tween from a previous mode is a correctness bug.

use serde::{Deserialize, Serialize};

use super::modes::Mode;
use super::particle::{ParticleId, Rgb};

/// Easing curve requested for a tween stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Easing {
    #[default]
    Linear,
    /// Polynomial ease-out of the given power (power2, power3, ...)
    PowerOut(u8),
    SineInOut,
    BounceOut,
    /// Discrete staircase with the given step count
    Steps(u8),
}

/// Repeat shape for a tween
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Repeat {
    /// Play once, then this many extra cycles
    Times(u32),
    Infinite,
}

impl Default for Repeat {
    fn default() -> Self {
        Repeat::Times(0)
    }
}

/// Which scheduled family a tween belongs to, for exclusivity accounting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TweenTag {
    Mode(Mode),
    Denial,
    Reset,
}

/// Action the host must report back via `Simulation::finish_tween` when a
/// request with it completes (not when it is cancelled)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OnComplete {
    /// Lift the denial suspension and ease the particle home
    ClearDenial,
    /// Snap transforms neutral and ease the particle home over `secs`
    ReturnHome { secs: f32 },
}

/// Field targets for one tween stage; `None` fields are left alone
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TweenProps {
    pub x: Option<f32>,
    pub y: Option<f32>,
    /// Retargets the resting coordinate itself (hover modes move "home")
    pub origin_y: Option<f32>,
    pub scale_x: Option<f32>,
    pub scale_y: Option<f32>,
    pub rotation: Option<f32>,
    pub alpha: Option<f32>,
    pub blur: Option<f32>,
    pub weight: Option<f32>,
    pub color: Option<Rgb>,
}

/// One leg of a (possibly multi-stage) tween
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TweenStage {
    pub props: TweenProps,
    /// Seconds
    pub duration: f32,
    pub easing: Easing,
}

/// A complete interpolation request for one particle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TweenRequest {
    pub target: ParticleId,
    /// Played in order; most requests have exactly one stage
    pub stages: Vec<TweenStage>,
    /// Seconds before the first stage starts
    pub delay: f32,
    pub repeat: Repeat,
    /// Ping-pong back to the starting values each repeat cycle
    pub yoyo: bool,
    pub tag: TweenTag,
    pub on_complete: Option<OnComplete>,
}

impl TweenRequest {
    /// Single-stage request with no delay, no repeat
    pub fn single(
        target: ParticleId,
        tag: TweenTag,
        props: TweenProps,
        duration: f32,
        easing: Easing,
    ) -> Self {
        Self {
            target,
            stages: vec![TweenStage {
                props,
                duration,
                easing,
            }],
            delay: 0.0,
            repeat: Repeat::default(),
            yoyo: false,
            tag,
            on_complete: None,
        }
    }
}

/// Interpolation executor owned by the host (a tween library, a test double)
///
/// The host interpolates each stage's [`TweenProps`] over its duration and
/// writes the values back through `Simulation::apply_tween`.
///
/// `cancel` drops every outstanding request for one particle without firing
/// its completion action; `cancel_all` does the same for every particle.
pub trait AnimationScheduler {
    fn schedule(&mut self, request: TweenRequest);
    fn cancel(&mut self, target: ParticleId);
    fn cancel_all(&mut self);
}

/// Test double that records requests and honors cancellation bookkeeping
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingScheduler {
    pub active: Vec<TweenRequest>,
    pub scheduled_total: usize,
}

#[cfg(test)]
impl RecordingScheduler {
    pub fn tagged(&self, tag: TweenTag) -> usize {
        self.active.iter().filter(|r| r.tag == tag).count()
    }

    pub fn for_target(&self, target: ParticleId) -> usize {
        self.active.iter().filter(|r| r.target == target).count()
    }
}

#[cfg(test)]
impl AnimationScheduler for RecordingScheduler {
    fn schedule(&mut self, request: TweenRequest) {
        self.scheduled_total += 1;
        self.active.push(request);
    }

    fn cancel(&mut self, target: ParticleId) {
        self.active.retain(|r| r.target != target);
    }

    fn cancel_all(&mut self) {
        self.active.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_request_shape() {
        let req = TweenRequest::single(
            7,
            TweenTag::Reset,
            TweenProps {
                alpha: Some(1.0),
                ..Default::default()
            },
            0.8,
            Easing::PowerOut(2),
        );
        assert_eq!(req.stages.len(), 1);
        assert_eq!(req.repeat, Repeat::Times(0));
        assert!(!req.yoyo);
        assert_eq!(req.stages[0].props.alpha, Some(1.0));
        assert_eq!(req.stages[0].props.x, None);
    }

    #[test]
    fn test_recording_scheduler_cancel() {
        let mut sched = RecordingScheduler::default();
        for id in 0..3 {
            sched.schedule(TweenRequest::single(
                id,
                TweenTag::Denial,
                TweenProps::default(),
                0.1,
                Easing::Linear,
            ));
        }
        assert_eq!(sched.tagged(TweenTag::Denial), 3);

        sched.cancel(1);
        assert_eq!(sched.for_target(1), 0);
        assert_eq!(sched.tagged(TweenTag::Denial), 2);

        sched.cancel_all();
        assert!(sched.active.is_empty());
        assert_eq!(sched.scheduled_total, 3);
    }
}
