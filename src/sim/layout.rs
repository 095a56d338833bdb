//! Text sanitation and glyph placement
//!
//! Raw text updates arrive tagged with their provenance. A fixed punctuation
//! set is stripped before the value becomes the authoritative text; the
//! characters that survive are placed by sequential glyph advance, centered
//! horizontally at mid-height. Glyph widths come from the host through
//! [`GlyphMetrics`] since font measurement is a rendering concern.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::ViewRect;
use crate::consts::PUNCTUATION;

/// Where a text update came from; decides spawn style and whether stray
/// punctuation triggers the denial reaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provenance {
    /// Typed directly; punctuation is rejected with a shake
    Keystroke,
    /// Externally transcribed voice input; punctuation is stripped silently
    /// and new particles fly in from off-screen
    Transcribed,
}

/// Host-provided glyph advance widths
pub trait GlyphMetrics {
    fn advance(&self, glyph: char) -> f32;
}

/// Every glyph the same width; good enough headless and for tests
#[derive(Debug, Clone, Copy)]
pub struct FixedAdvance(pub f32);

impl GlyphMetrics for FixedAdvance {
    fn advance(&self, _glyph: char) -> f32 {
        self.0
    }
}

/// Strip the rejected punctuation set. Returns the clean text and whether
/// anything was stripped.
pub fn sanitize(raw: &str) -> (String, bool) {
    let clean: String = raw.chars().filter(|c| !PUNCTUATION.contains(*c)).collect();
    let had_punctuation = clean.len() != raw.len();
    (clean, had_punctuation)
}

/// Origin coordinate per glyph: sequential advance, centered horizontally,
/// vertically at mid-height
pub fn layout_origins(text: &str, metrics: &dyn GlyphMetrics, view: ViewRect) -> Vec<(char, Vec2)> {
    let total: f32 = text.chars().map(|c| metrics.advance(c)).sum();
    let mut cursor = (view.width - total) / 2.0;
    let center_y = view.height / 2.0;

    text.chars()
        .map(|glyph| {
            let origin = Vec2::new(cursor, center_y);
            cursor += metrics.advance(glyph);
            (glyph, origin)
        })
        .collect()
}
