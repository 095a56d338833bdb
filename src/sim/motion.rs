//! Optical motion field - a coarse grid of decaying velocity vectors
//!
//! Successive low-resolution camera frames are sampled one pixel per grid
//! cell. A cell whose sample changed enough since the last frame is
//! overwritten with a fresh random-direction burst velocity; every other cell
//! decays multiplicatively toward rest. No motion history longer than one
//! frame is retained. With no camera attached the grid simply decays to
//! inactive; nothing here can fail mid-tick.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use thiserror::Error;

use super::state::ViewRect;
use crate::consts::{
    FRAME_HEIGHT, FRAME_WIDTH, GRID_COLS, GRID_ROWS, MOTION_BURST, MOTION_DECAY, MOTION_EPSILON,
    MOTION_SENSITIVITY,
};

/// Bytes expected per ingested frame (RGBA)
const FRAME_BYTES: usize = FRAME_WIDTH * FRAME_HEIGHT * 4;
/// Frame pixels covered by one grid cell per axis
const CELL_PX: usize = FRAME_WIDTH / GRID_COLS;

/// Rejected camera frame. The grid is left untouched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame buffer is {got} bytes, expected {expected} (320x240 RGBA)")]
    BadLength { got: usize, expected: usize },
}

/// One grid cell's velocity burst
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MotionCell {
    pub vel: Vec2,
    pub active: bool,
}

/// 40x30 grid of optical-flow-derived velocity vectors, queried by position
#[derive(Debug, Clone)]
pub struct MotionField {
    cells: Vec<MotionCell>,
    /// RGB sampled at each cell center of the previous frame
    prev: Option<Vec<[u8; 3]>>,
    /// A frame arrived since the last tick boundary
    fresh: bool,
    rng: Pcg32,
}

impl MotionField {
    pub fn new(seed: u64) -> Self {
        Self {
            cells: vec![MotionCell::default(); GRID_COLS * GRID_ROWS],
            prev: None,
            fresh: false,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Ingest one 320x240 RGBA frame. The first frame only primes the
    /// previous-sample buffer; differencing starts with the second.
    pub fn ingest_frame(&mut self, rgba: &[u8]) -> Result<(), FrameError> {
        if rgba.len() != FRAME_BYTES {
            return Err(FrameError::BadLength {
                got: rgba.len(),
                expected: FRAME_BYTES,
            });
        }

        let mut samples = Vec::with_capacity(GRID_COLS * GRID_ROWS);
        for gy in 0..GRID_ROWS {
            for gx in 0..GRID_COLS {
                let px = gx * CELL_PX + CELL_PX / 2;
                let py = gy * CELL_PX + CELL_PX / 2;
                let idx = (py * FRAME_WIDTH + px) * 4;
                samples.push([rgba[idx], rgba[idx + 1], rgba[idx + 2]]);
            }
        }

        if let Some(prev) = &self.prev {
            for (i, (cur, old)) in samples.iter().zip(prev.iter()).enumerate() {
                let diff = (cur[0].abs_diff(old[0]) as f32
                    + cur[1].abs_diff(old[1]) as f32
                    + cur[2].abs_diff(old[2]) as f32)
                    / 3.0;

                if diff > MOTION_SENSITIVITY {
                    let vel = Vec2::new(
                        (self.rng.random::<f32>() - 0.5) * MOTION_BURST,
                        (self.rng.random::<f32>() - 0.5) * MOTION_BURST,
                    );
                    self.cells[i] = MotionCell { vel, active: true };
                } else {
                    Self::decay(&mut self.cells[i]);
                }
            }
        }

        self.prev = Some(samples);
        self.fresh = true;
        Ok(())
    }

    /// Velocity of the active cell covering `pos`, if any. Positions outside
    /// the view clamp to the border cells rather than fail.
    pub fn sample(&self, pos: Vec2, view: ViewRect) -> Option<Vec2> {
        let gx = ((pos.x / view.width * GRID_COLS as f32) as isize)
            .clamp(0, GRID_COLS as isize - 1) as usize;
        let gy = ((pos.y / view.height * GRID_ROWS as f32) as isize)
            .clamp(0, GRID_ROWS as isize - 1) as usize;
        let cell = &self.cells[gy * GRID_COLS + gx];
        cell.active.then_some(cell.vel)
    }

    /// Tick-boundary decay: with no frame since the last tick every cell
    /// relaxes one step, so an inactive camera leaves the grid at rest.
    pub(crate) fn settle(&mut self) {
        if !self.fresh {
            for cell in &mut self.cells {
                Self::decay(cell);
            }
        }
        self.fresh = false;
    }

    fn decay(cell: &mut MotionCell) {
        cell.vel *= MOTION_DECAY;
        cell.active = cell.vel.x.abs().max(cell.vel.y.abs()) > MOTION_EPSILON;
    }

    #[cfg(test)]
    pub(crate) fn cell(&self, gx: usize, gy: usize) -> &MotionCell {
        &self.cells[gy * GRID_COLS + gx]
    }

    #[cfg(test)]
    pub(crate) fn cell_mut(&mut self, gx: usize, gy: usize) -> &mut MotionCell {
        &mut self.cells[gy * GRID_COLS + gx]
    }
}
