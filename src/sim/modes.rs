//! The mode catalog - named, mutually exclusive animation recipes
//!
//! Each mode is a procedural recipe applied to the current target set: some
//! immediate field retargeting plus declarative tween requests for the
//! external scheduler, and for three of them a recurring clone spawn rule
//! consumed by the simulation's spawn timer. Recipe execution is data-only;
//! nothing here touches the scheduler or the particle collection directly.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};

use super::particle::{Particle, Rgb};
use super::scheduler::{Easing, Repeat, TweenProps, TweenRequest, TweenStage, TweenTag};
use super::state::ViewRect;
use crate::consts::{COMMA_SPAWN_TICKS, ELLIPSIS_LIFE, ELLIPSIS_SPAWN_TICKS, WEEPING_SPAWN_TICKS};

/// Per-particle tween batch produced by one recipe application
pub type TweenBatch = SmallVec<[TweenRequest; 2]>;

/// Every animation mode. Setting one cancels whatever the previous mode was
/// still doing; re-setting the active one replays it from scratch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// Recurring clones drifting upward, blurring and shrinking away
    Ellipsis,
    /// Fly in from the right, then hover above the rest position
    Question,
    /// Radial burst outward at double scale, snapping back
    Exclamation,
    /// Drop in from above with a bounce landing
    Period,
    /// Recurring faint clones sinking slowly
    Comma,
    /// Arc from screen center over the top down to the resting spot
    Parentheses,
    /// Originals rise and tint warm; mirrored echoes appear below
    Quotes,
    /// Taffy stretch, sinking and rising forever
    Tilde,
    /// Continuous spin with an alpha flicker
    Asterisk,
    /// Heartbeat pulse
    Colon,
    /// Alternating vertical bob
    Semicolon,
    /// Wide horizontal stretch
    Dash,
    /// Alternating diagonal shear
    Slash,
    /// Stepped squeeze
    Brackets,
    /// Halves lean apart
    Braces,
    /// Violent random thrash, then collapse home
    Argument,
    /// Recurring clones raining off a random particle
    Weeping,
    /// Warm, heavy, slowly breathing
    Story,
    /// Horizontal jitter with dropout flicker
    Stutter,
    /// Continuous ice-slide physics; no tweens at all
    Whisper,
}

impl Mode {
    pub const ALL: [Mode; 20] = [
        Mode::Ellipsis,
        Mode::Question,
        Mode::Exclamation,
        Mode::Period,
        Mode::Comma,
        Mode::Parentheses,
        Mode::Quotes,
        Mode::Tilde,
        Mode::Asterisk,
        Mode::Colon,
        Mode::Semicolon,
        Mode::Dash,
        Mode::Slash,
        Mode::Brackets,
        Mode::Braces,
        Mode::Argument,
        Mode::Weeping,
        Mode::Story,
        Mode::Stutter,
        Mode::Whisper,
    ];

    /// Recurring clone spawn rule, for the three modes that shed copies
    pub fn spawn_rule(self) -> Option<SpawnRule> {
        match self {
            Mode::Ellipsis => Some(SpawnRule {
                interval_ticks: ELLIPSIS_SPAWN_TICKS,
                scope: SpawnScope::EveryTarget,
                chance: 1.0,
                alpha: 0.5,
                life: ELLIPSIS_LIFE,
                drifting: true,
            }),
            Mode::Comma => Some(SpawnRule {
                interval_ticks: COMMA_SPAWN_TICKS,
                scope: SpawnScope::EveryTarget,
                chance: 1.0,
                alpha: 0.4,
                life: 100.0,
                drifting: false,
            }),
            Mode::Weeping => Some(SpawnRule {
                interval_ticks: WEEPING_SPAWN_TICKS,
                scope: SpawnScope::OneRandomTarget,
                chance: 0.5,
                alpha: 0.5,
                life: 100.0,
                drifting: false,
            }),
            _ => None,
        }
    }
}

/// Which live targets a spawn event copies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnScope {
    EveryTarget,
    OneRandomTarget,
}

/// Recurring clone spawn parameters for one mode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnRule {
    pub interval_ticks: u32,
    pub scope: SpawnScope,
    /// Probability that a due spawn event fires at all
    pub chance: f32,
    /// Starting opacity for the clone
    pub alpha: f32,
    /// Starting life
    pub life: f32,
    /// Clones get a randomized upward drift vector (ellipsis smoke)
    pub drifting: bool,
}

/// Apply `mode`'s recipe to one target: mutate the fields the recipe sets
/// immediately and return the tween requests it schedules. `idx`/`count`
/// position the particle within the target set for stagger and symmetry.
pub(crate) fn apply(
    mode: Mode,
    p: &mut Particle,
    idx: usize,
    count: usize,
    view: ViewRect,
    rng: &mut Pcg32,
) -> TweenBatch {
    let tag = TweenTag::Mode(mode);
    let i = idx as f32;

    match mode {
        // Spawn-timer-only and continuous modes schedule nothing
        Mode::Ellipsis | Mode::Comma | Mode::Weeping | Mode::Whisper => smallvec![],

        Mode::Question => {
            p.alpha = 0.0;
            p.pos.x = view.width + 100.0;
            let fly_in = TweenRequest {
                delay: i * 0.04,
                ..TweenRequest::single(
                    p.id,
                    tag,
                    TweenProps {
                        alpha: Some(1.0),
                        x: Some(p.origin.x),
                        ..Default::default()
                    },
                    0.6,
                    Easing::PowerOut(3),
                )
            };
            let hover = TweenRequest {
                delay: 0.6 + i * 0.1,
                repeat: Repeat::Infinite,
                yoyo: true,
                ..TweenRequest::single(
                    p.id,
                    tag,
                    TweenProps {
                        origin_y: Some(p.origin.y - 50.0),
                        rotation: Some(rng.random_range(-8.0..8.0)),
                        ..Default::default()
                    },
                    2.5,
                    Easing::Linear,
                )
            };
            smallvec![fly_in, hover]
        }

        Mode::Exclamation => {
            let angle = rng.random::<f32>() * std::f32::consts::TAU;
            let burst = p.origin + Vec2::from_angle(angle) * 200.0;
            smallvec![TweenRequest {
                repeat: Repeat::Times(1),
                yoyo: true,
                ..TweenRequest::single(
                    p.id,
                    tag,
                    TweenProps {
                        x: Some(burst.x),
                        y: Some(burst.y),
                        scale_x: Some(2.0),
                        scale_y: Some(2.0),
                        ..Default::default()
                    },
                    0.2,
                    Easing::Linear,
                )
            }]
        }

        Mode::Period => {
            p.pos.y = -500.0;
            p.alpha = 0.0;
            smallvec![TweenRequest {
                delay: i * 0.05,
                ..TweenRequest::single(
                    p.id,
                    tag,
                    TweenProps {
                        y: Some(p.origin.y),
                        alpha: Some(1.0),
                        ..Default::default()
                    },
                    0.8,
                    Easing::BounceOut,
                )
            }]
        }

        Mode::Parentheses => {
            let center = Vec2::new(view.width / 2.0, view.height / 2.0);
            let dest_x = p.origin.x;
            p.pos = center;
            p.alpha = 0.0;
            p.scale = Vec2::ZERO;
            smallvec![TweenRequest {
                target: p.id,
                stages: vec![
                    // Up and over the top...
                    TweenStage {
                        props: TweenProps {
                            x: Some((center.x + dest_x) / 2.0),
                            y: Some(center.y - 300.0),
                            alpha: Some(1.0),
                            scale_x: Some(1.0),
                            scale_y: Some(1.0),
                            ..Default::default()
                        },
                        duration: 1.2,
                        easing: Easing::Linear,
                    },
                    // ...then bounce down onto the resting spot
                    TweenStage {
                        props: TweenProps {
                            x: Some(dest_x),
                            y: Some(p.origin.y),
                            ..Default::default()
                        },
                        duration: 1.8,
                        easing: Easing::BounceOut,
                    },
                ],
                delay: i * 0.05,
                repeat: Repeat::default(),
                yoyo: false,
                tag,
                on_complete: None,
            }]
        }

        Mode::Quotes => smallvec![TweenRequest::single(
            p.id,
            tag,
            TweenProps {
                y: Some(p.origin.y - 20.0),
                color: Some(Rgb::new(255, 100, 100)),
                ..Default::default()
            },
            0.5,
            Easing::Linear,
        )],

        Mode::Tilde => smallvec![TweenRequest {
            delay: i * 0.1,
            repeat: Repeat::Infinite,
            yoyo: true,
            ..TweenRequest::single(
                p.id,
                tag,
                TweenProps {
                    scale_y: Some(1.8),
                    scale_x: Some(0.7),
                    y: Some(p.origin.y + 30.0),
                    ..Default::default()
                },
                1.5,
                Easing::SineInOut,
            )
        }],

        Mode::Asterisk => {
            let spin = TweenRequest {
                repeat: Repeat::Infinite,
                ..TweenRequest::single(
                    p.id,
                    tag,
                    TweenProps {
                        rotation: Some(360.0),
                        ..Default::default()
                    },
                    1.5,
                    Easing::Linear,
                )
            };
            let flicker = TweenRequest {
                repeat: Repeat::Infinite,
                yoyo: true,
                ..TweenRequest::single(
                    p.id,
                    tag,
                    TweenProps {
                        alpha: Some(0.4),
                        ..Default::default()
                    },
                    0.3,
                    Easing::Linear,
                )
            };
            smallvec![spin, flicker]
        }

        Mode::Colon => smallvec![TweenRequest {
            repeat: Repeat::Infinite,
            yoyo: true,
            ..TweenRequest::single(
                p.id,
                tag,
                TweenProps {
                    scale_x: Some(1.2),
                    scale_y: Some(1.2),
                    ..Default::default()
                },
                0.3,
                Easing::Linear,
            )
        }],

        Mode::Semicolon => {
            let dir = if idx % 2 == 0 { -10.0 } else { 10.0 };
            smallvec![TweenRequest {
                repeat: Repeat::Infinite,
                yoyo: true,
                ..TweenRequest::single(
                    p.id,
                    tag,
                    TweenProps {
                        y: Some(p.origin.y + dir),
                        ..Default::default()
                    },
                    1.0,
                    Easing::SineInOut,
                )
            }]
        }

        Mode::Dash => smallvec![TweenRequest {
            repeat: Repeat::Infinite,
            yoyo: true,
            ..TweenRequest::single(
                p.id,
                tag,
                TweenProps {
                    scale_x: Some(3.0),
                    ..Default::default()
                },
                1.0,
                Easing::Linear,
            )
        }],

        Mode::Slash => {
            let offset = if idx % 2 == 0 { -20.0 } else { 20.0 };
            smallvec![TweenRequest::single(
                p.id,
                tag,
                TweenProps {
                    x: Some(p.origin.x + offset),
                    y: Some(p.origin.y - offset),
                    ..Default::default()
                },
                0.5,
                Easing::Linear,
            )]
        }

        Mode::Brackets => smallvec![TweenRequest::single(
            p.id,
            tag,
            TweenProps {
                scale_x: Some(0.6),
                scale_y: Some(1.2),
                ..Default::default()
            },
            0.5,
            Easing::Steps(2),
        )],

        Mode::Braces => {
            let dir = if idx < count / 2 { 20.0 } else { -20.0 };
            smallvec![TweenRequest::single(
                p.id,
                tag,
                TweenProps {
                    x: Some(p.origin.x + dir),
                    rotation: Some(dir),
                    ..Default::default()
                },
                1.0,
                Easing::Linear,
            )]
        }

        Mode::Argument => smallvec![TweenRequest {
            repeat: Repeat::Times(30),
            yoyo: true,
            on_complete: Some(super::scheduler::OnComplete::ReturnHome { secs: 0.5 }),
            ..TweenRequest::single(
                p.id,
                tag,
                TweenProps {
                    x: Some(rng.random_range(0.0..view.width)),
                    y: Some(rng.random_range(0.0..view.height)),
                    scale_x: Some(rng.random_range(0.5..4.0)),
                    scale_y: Some(rng.random_range(0.5..4.0)),
                    rotation: Some(rng.random_range(-90.0..90.0)),
                    color: Some(Rgb::new(255, 50, 50)),
                    ..Default::default()
                },
                0.1,
                Easing::Linear,
            )
        }],

        Mode::Story => {
            p.furry = true;
            p.weight = 600.0;
            smallvec![TweenRequest {
                delay: i * 0.2,
                repeat: Repeat::Infinite,
                yoyo: true,
                ..TweenRequest::single(
                    p.id,
                    tag,
                    TweenProps {
                        color: Some(Rgb::new(255, 245, 210)),
                        y: Some(p.origin.y - 20.0),
                        ..Default::default()
                    },
                    3.0,
                    Easing::SineInOut,
                )
            }]
        }

        Mode::Stutter => {
            let jitter = TweenRequest {
                repeat: Repeat::Times(20),
                yoyo: true,
                on_complete: Some(super::scheduler::OnComplete::ReturnHome { secs: 0.2 }),
                ..TweenRequest::single(
                    p.id,
                    tag,
                    TweenProps {
                        x: Some(p.origin.x + rng.random_range(-10.0..10.0)),
                        ..Default::default()
                    },
                    0.05,
                    Easing::Linear,
                )
            };
            let mut batch: TweenBatch = smallvec![jitter];
            if rng.random::<f32>() > 0.5 {
                batch.push(TweenRequest {
                    repeat: Repeat::Times(5),
                    yoyo: true,
                    ..TweenRequest::single(
                        p.id,
                        tag,
                        TweenProps {
                            alpha: Some(0.0),
                            ..Default::default()
                        },
                        0.1,
                        Easing::Linear,
                    )
                });
            }
            batch
        }
    }
}
