//! Voice classification - audio loudness and typing cadence flags
//!
//! Two independent classifications feed the particle force model: a loudness
//! flag derived from raw frequency-magnitude samples, and fast/slow cadence
//! flags derived from the gap between successive character insertions. Both
//! are recomputed when new data arrives, not per simulation tick; an absent
//! microphone simply never updates them.

use serde::{Deserialize, Serialize};

use crate::consts::{FAST_CADENCE_MS, LOUD_THRESHOLD, SLOW_CADENCE_MS};

/// Per-tick snapshot of the audio/cadence classification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceFlags {
    /// Loudness average exceeded the threshold (dough: heavy, wide, sticky)
    pub loud: bool,
    /// Characters arriving under 120 ms apart (jelly: bouncy, crowding)
    pub fast: bool,
    /// Characters arriving over 300 ms apart
    pub slow: bool,
}

/// Converts raw loudness samples and insertion timing into behavior flags
#[derive(Debug, Clone, Default)]
pub struct VoiceClassifier {
    flags: VoiceFlags,
    /// Most recent spectrum average, retained for hosts that meter it
    volume: f32,
    last_insertion_ms: Option<f64>,
}

impl VoiceClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify a raw frequency-magnitude frame. An empty frame reads as
    /// silence rather than an error.
    pub fn ingest_spectrum(&mut self, magnitudes: &[u8]) {
        let avg = if magnitudes.is_empty() {
            0.0
        } else {
            magnitudes.iter().map(|&m| m as f32).sum::<f32>() / magnitudes.len() as f32
        };
        self.volume = avg;
        self.flags.loud = avg > LOUD_THRESHOLD;
    }

    /// Record a character-insertion event at `now_ms` and reclassify cadence
    /// from the gap since the previous one. The first insertion establishes
    /// the baseline without setting either flag.
    pub fn note_insertion(&mut self, now_ms: f64) {
        if let Some(last) = self.last_insertion_ms {
            let gap = now_ms - last;
            self.flags.fast = gap < FAST_CADENCE_MS;
            self.flags.slow = gap > SLOW_CADENCE_MS;
        }
        self.last_insertion_ms = Some(now_ms);
    }

    /// Update the insertion baseline without reclassifying (deletions and
    /// replacements still move the clock).
    pub fn touch(&mut self, now_ms: f64) {
        self.last_insertion_ms = Some(now_ms);
    }

    pub fn flags(&self) -> VoiceFlags {
        self.flags
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }
}
