//! Vowel sign variants and the nearest-reach matcher

use super::{Base, MatchError};
use crate::font_source::GlyphMetrics;

/// One matra-I variant glyph and the bases assigned to it
#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    pub name: String,
    /// Suffix after the first `.` of the glyph name, e.g. `"03"` for `dvmI.03`
    pub number: String,
    pub width: f64,
    /// How far the glyph reaches past its origin
    pub overhanging: f64,
    pub bases: Vec<Base>,
}

impl Variant {
    pub fn from_glyph(glyph: &GlyphMetrics) -> Result<Self, MatchError> {
        let right_margin = glyph
            .right_margin
            .ok_or_else(|| MatchError::UnmeasurableVariant(glyph.name.clone()))?;
        Ok(Self::new(&glyph.name, glyph.width, right_margin.abs()))
    }

    pub fn new(name: &str, width: f64, overhanging: f64) -> Self {
        let number = name
            .split_once('.')
            .map(|(_, suffix)| suffix.to_string())
            .unwrap_or_default();
        Self {
            name: name.to_string(),
            number,
            width,
            overhanging,
            bases: Vec::new(),
        }
    }

    pub fn is_used(&self) -> bool {
        !self.bases.is_empty()
    }

    /// Bases made of one glyph, in assignment order
    pub fn single_glyph_bases(&self) -> impl Iterator<Item = &Base> {
        self.bases.iter().filter(|b| b.is_single_glyph())
    }

    pub fn sequence_bases(&self) -> impl Iterator<Item = &Base> {
        self.bases.iter().filter(|b| !b.is_single_glyph())
    }
}

/// Where the matcher put a base
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment {
    /// Index into the sorted variant list
    Variant(usize),
    /// Too far for every variant, even with tolerance
    Unmatched,
}

/// Sort variants by ascending reach. Equal reaches keep their input order.
pub fn sort_by_overhang(variants: &mut [Variant]) {
    variants.sort_by(|a, b| a.overhanging.total_cmp(&b.overhanging));
}

/// Pick the variant for a target.
///
/// `variants` must be sorted by [`sort_by_overhang`]. Targets at or below
/// the shortest reach take the shortest variant. Targets inside the range
/// take whichever neighbour is closer, and the longer one on a tie. The
/// longest variant stretches by `tolerance` before a target counts as
/// unmatched.
pub fn match_base(target: f64, variants: &[Variant], tolerance: f64) -> Assignment {
    let (Some(shortest), Some(longest)) = (variants.first(), variants.last()) else {
        return Assignment::Unmatched;
    };
    let last = variants.len() - 1;

    if target <= shortest.overhanging {
        Assignment::Variant(0)
    } else if target < longest.overhanging {
        // the guards above keep `enough` in 1..=last
        let enough = variants
            .iter()
            .position(|v| v.overhanging >= target)
            .unwrap_or(last);
        let short = enough - 1;
        let enough_distance = (variants[enough].overhanging - target).abs();
        let short_distance = (variants[short].overhanging - target).abs();
        if short_distance < enough_distance {
            Assignment::Variant(short)
        } else {
            Assignment::Variant(enough)
        }
    } else if target <= longest.overhanging + tolerance {
        Assignment::Variant(last)
    } else {
        Assignment::Unmatched
    }
}

/// Sorted variants plus the sentinel for bases nothing reaches
#[derive(Debug, Clone, Default)]
pub struct VariantSet {
    variants: Vec<Variant>,
    pub unmatched: Vec<Base>,
}

impl VariantSet {
    pub fn new(mut variants: Vec<Variant>) -> Self {
        sort_by_overhang(&mut variants);
        Self {
            variants,
            unmatched: Vec::new(),
        }
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    pub fn assign(&mut self, base: Base, tolerance: f64) -> Assignment {
        let assignment = match_base(base.target, &self.variants, tolerance);
        match assignment {
            Assignment::Variant(i) => self.variants[i].bases.push(base),
            Assignment::Unmatched => self.unmatched.push(base),
        }
        assignment
    }

    pub fn into_parts(self) -> (Vec<Variant>, Vec<Base>) {
        (self.variants, self.unmatched)
    }
}
