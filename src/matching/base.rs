//! Bases and their target overhang

use super::MatchError;
use crate::font_source::{FontSnapshot, GlyphMetrics, StemMeasure};

/// Glyph name tails that never carry the vowel sign themselves.
pub const NON_POSITIONING_SUFFIXES: [&str; 3] = ["Virama", "Nukta", "RAc2"];

/// Length of the script prefix on glyph names (`dv`, `bn`, ...).
pub const SCRIPT_PREFIX_LEN: usize = 2;

/// Whether a glyph is skipped when measuring a base
pub fn is_non_positioning(glyph_name: &str) -> bool {
    glyph_name
        .char_indices()
        .nth(SCRIPT_PREFIX_LEN)
        .is_some_and(|(i, _)| NON_POSITIONING_SUFFIXES.contains(&&glyph_name[i..]))
}

/// Target overhang of a glyph sequence.
///
/// The rightmost positioning glyph contributes its stem position; every
/// positioning glyph left of it adds its full advance. Returns `None` if
/// nothing in the sequence takes part in positioning.
pub fn compute_target(glyphs: &[GlyphMetrics], measure: &StemMeasure) -> Option<f64> {
    let mut eligible = glyphs.iter().rev().filter(|g| !is_non_positioning(&g.name));
    let anchor_glyph = eligible.next()?;
    let offset: f64 = eligible.map(|g| g.width).sum();
    Some(measure.stem_position(anchor_glyph) + offset)
}

/// One consonant, or a sequence of glyphs, that a vowel sign attaches to
#[derive(Debug, Clone, PartialEq)]
pub struct Base {
    pub name_sequence: Vec<String>,
    pub glyphs: Vec<GlyphMetrics>,
    pub target: f64,
}

impl Base {
    pub fn new<S: AsRef<str>>(
        names: &[S],
        snapshot: &FontSnapshot,
        measure: &StemMeasure,
    ) -> Result<Self, MatchError> {
        let name_sequence: Vec<String> = names.iter().map(|n| n.as_ref().to_string()).collect();
        let glyphs = name_sequence
            .iter()
            .map(|name| snapshot.require(name).cloned())
            .collect::<Result<Vec<_>, _>>()?;
        let target = compute_target(&glyphs, measure)
            .ok_or_else(|| MatchError::EmptyBase(name_sequence.join(" ")))?;

        Ok(Self {
            name_sequence,
            glyphs,
            target,
        })
    }

    /// Build from a space separated sequence such as `"dvKA_SSA dvYA"`
    pub fn from_sequence_text(
        text: &str,
        snapshot: &FontSnapshot,
        measure: &StemMeasure,
    ) -> Result<Self, MatchError> {
        let names: Vec<&str> = text.split_whitespace().collect();
        Self::new(&names, snapshot, measure)
    }

    pub fn is_single_glyph(&self) -> bool {
        self.name_sequence.len() == 1
    }

    pub fn first_glyph_name(&self) -> &str {
        self.name_sequence.first().map(String::as_str).unwrap_or_default()
    }

    pub fn sequence_text(&self) -> String {
        self.name_sequence.join(" ")
    }
}
