//! Glyph metric snapshots and stem position measurement
//!
//! The matching engine never touches a live UFO. Everything it needs is
//! copied into a [`FontSnapshot`] once per style and read from there.

use crate::matching::MatchError;
use std::collections::{BTreeMap, HashMap};

/// Anchor names tried, in priority order, when looking for the point
/// a vowel sign rests on.
pub const ABVM_ANCHOR_CANDIDATES: [&str; 3] = ["abvm.candra", "abvm.e", "abvm"];

/// Prefix that marks an anchor as belonging to the mark side of an attachment.
pub const MARK_ANCHOR_PREFIX: &str = "_";

/// Which side of a mark attachment an anchor lookup is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorSide {
    Base,
    Mark,
}

impl AnchorSide {
    fn decorate(self, name: &str) -> String {
        match self {
            AnchorSide::Base => name.to_string(),
            AnchorSide::Mark => format!("{MARK_ANCHOR_PREFIX}{name}"),
        }
    }
}

/// Read-only metrics of one glyph
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphMetrics {
    pub name: String,
    pub width: f64,
    /// Advance minus the outline's x-max. `None` for glyphs without outlines.
    pub right_margin: Option<f64>,
    /// Named anchors in source order, as (name, x)
    pub anchors: Vec<(String, f64)>,
}

impl GlyphMetrics {
    pub fn new(name: impl Into<String>, width: f64) -> Self {
        Self {
            name: name.into(),
            width,
            right_margin: None,
            anchors: Vec::new(),
        }
    }

    pub fn with_right_margin(mut self, right_margin: f64) -> Self {
        self.right_margin = Some(right_margin);
        self
    }

    pub fn with_anchor(mut self, name: impl Into<String>, x: f64) -> Self {
        self.anchors.push((name.into(), x));
        self
    }

    /// Look up the x of the first anchor matching the abvm candidates.
    ///
    /// Candidates are tried in priority order; the first candidate present
    /// on the glyph wins regardless of where it sits in the anchor list.
    pub fn abvm_position(&self, side: AnchorSide) -> Option<f64> {
        ABVM_ANCHOR_CANDIDATES.iter().find_map(|candidate| {
            let wanted = side.decorate(candidate);
            self.anchors
                .iter()
                .find(|(name, _)| *name == wanted)
                .map(|(_, x)| *x)
        })
    }
}

/// Immutable view of the parts of a font the engine reads
#[derive(Debug, Clone, Default)]
pub struct FontSnapshot {
    glyphs: HashMap<String, GlyphMetrics>,
    /// Glyph names in font order
    pub glyph_order: Vec<String>,
    /// Glyph groups, class name to ordered members
    pub groups: BTreeMap<String, Vec<String>>,
}

impl FontSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a glyph. Order of insertion becomes the glyph order unless one
    /// is set explicitly.
    pub fn insert_glyph(&mut self, glyph: GlyphMetrics) {
        if !self.glyphs.contains_key(&glyph.name) {
            self.glyph_order.push(glyph.name.clone());
        }
        self.glyphs.insert(glyph.name.clone(), glyph);
    }

    pub fn with_glyph(mut self, glyph: GlyphMetrics) -> Self {
        self.insert_glyph(glyph);
        self
    }

    pub fn with_group(mut self, name: &str, members: &[&str]) -> Self {
        self.groups.insert(
            name.to_string(),
            members.iter().map(|m| m.to_string()).collect(),
        );
        self
    }

    pub fn glyph(&self, name: &str) -> Option<&GlyphMetrics> {
        self.glyphs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.glyphs.contains_key(name)
    }

    pub fn require(&self, name: &str) -> Result<&GlyphMetrics, MatchError> {
        self.glyph(name)
            .ok_or_else(|| MatchError::MissingGlyph(name.to_string()))
    }

    pub fn group(&self, name: &str) -> Option<&[String]> {
        self.groups.get(name).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

/// Resolves stem positions against a calibrated right margin.
///
/// The calibration constant is the distance from the origin of the medium
/// vowel sign glyph (`<script>mE`) to its mark-side abvm anchor. Glyphs with
/// no abvm anchor of their own are assumed to carry their stem that far in
/// from the advance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StemMeasure {
    abvm_right_margin: f64,
}

impl StemMeasure {
    pub fn new(abvm_right_margin: f64) -> Self {
        Self { abvm_right_margin }
    }

    /// Calibrate from the reference glyph.
    pub fn calibrate(snapshot: &FontSnapshot, reference: &str) -> Result<Self, MatchError> {
        let glyph = snapshot
            .glyph(reference)
            .ok_or_else(|| MatchError::MissingReferenceGlyph(reference.to_string()))?;
        let x = glyph
            .abvm_position(AnchorSide::Mark)
            .ok_or_else(|| MatchError::MissingCalibrationAnchor(reference.to_string()))?;
        Ok(Self::new(x.abs()))
    }

    pub fn abvm_right_margin(&self) -> f64 {
        self.abvm_right_margin
    }

    pub fn stem_position(&self, glyph: &GlyphMetrics) -> f64 {
        glyph
            .abvm_position(AnchorSide::Base)
            .unwrap_or(glyph.width - self.abvm_right_margin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candra_anchor_is_preferred() {
        let glyph = GlyphMetrics::new("dvKA", 500.0)
            .with_anchor("abvm", 300.0)
            .with_anchor("abvm.candra", 320.0);
        assert_eq!(glyph.abvm_position(AnchorSide::Base), Some(320.0));
    }

    #[test]
    fn mark_side_needs_prefix() {
        let glyph = GlyphMetrics::new("dvmE", 0.0).with_anchor("abvm", -120.0);
        assert_eq!(glyph.abvm_position(AnchorSide::Mark), None);

        let glyph = glyph.with_anchor("_abvm", -110.0);
        assert_eq!(glyph.abvm_position(AnchorSide::Mark), Some(-110.0));
    }

    #[test]
    fn stem_position_falls_back_to_width() {
        let measure = StemMeasure::new(80.0);
        let anchored = GlyphMetrics::new("dvKA", 600.0).with_anchor("abvm.e", 410.0);
        let bare = GlyphMetrics::new("dvGA", 600.0);
        assert_eq!(measure.stem_position(&anchored), 410.0);
        assert_eq!(measure.stem_position(&bare), 520.0);
    }

    #[test]
    fn calibration_requires_anchor() {
        let snapshot = FontSnapshot::new().with_glyph(GlyphMetrics::new("dvmE", 0.0));
        assert!(matches!(
            StemMeasure::calibrate(&snapshot, "dvmE"),
            Err(MatchError::MissingCalibrationAnchor(_))
        ));
        assert!(matches!(
            StemMeasure::calibrate(&snapshot, "dvmAI"),
            Err(MatchError::MissingReferenceGlyph(_))
        ));

        let snapshot =
            FontSnapshot::new().with_glyph(GlyphMetrics::new("dvmE", 0.0).with_anchor("_abvm", -95.0));
        let measure = StemMeasure::calibrate(&snapshot, "dvmE").unwrap();
        assert_eq!(measure.abvm_right_margin(), 95.0);
    }
}
