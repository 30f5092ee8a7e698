//! Matra-I variant matching
//!
//! For every base in a font, decide which pre-base vowel sign variant
//! reaches it best. The engine works on a [`FontSnapshot`] and returns a
//! [`MatchResult`]; writing feature files is left to [`crate::features`].

pub mod adjust;
pub mod base;
pub mod errors;
pub mod variant;

pub use adjust::AdjustmentRange;
pub use base::Base;
pub use errors::MatchError;
pub use variant::{match_base, Assignment, Variant, VariantSet};

use crate::font_source::{FontSnapshot, StemMeasure};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub const CLASS_NAME_MI_VARIANTS: &str = "mI_VARIANTS";
pub const CLASS_NAME_BASES_ALIVE: &str = "BASES_ALIVE";
pub const CLASS_NAME_BASES_DEAD: &str = "BASES_DEAD";
pub const CLASS_NAME_BASES_FOR_LONG_MI: &str = "BASES_FOR_LONG_mI";

/// Glyph name stems, appended to the script prefix
pub const MI_NAME_STEM: &str = "mI";
pub const CALIBRATION_GLYPH_STEM: &str = "mE";
pub const TOLERANCE_GLYPH_STEM: &str = "VA";

/// Share of the tolerance glyph's stem position a target may overshoot
/// the longest variant by.
pub const TOLERANCE_FACTOR: f64 = 0.5;

/// Which bases get measured
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Alive consonants only
    #[default]
    Single,
    /// Alive consonants plus every dead + alive pair
    Sequence,
}

/// Where a style sits on the weight axis, and the ranges to interpolate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightAdjustment {
    pub position: f64,
    pub axis_start: f64,
    pub axis_end: f64,
    pub light: AdjustmentRange,
    pub bold: AdjustmentRange,
}

/// Everything the engine needs besides the font
#[derive(Debug, Clone, PartialEq)]
pub struct MatchSettings {
    /// Script prefix of glyph names, e.g. `dv`
    pub script: String,
    pub mode: MatchMode,
    pub adjustment: Option<WeightAdjustment>,
}

impl MatchSettings {
    pub fn new(script: &str) -> Self {
        Self {
            script: script.to_string(),
            mode: MatchMode::default(),
            adjustment: None,
        }
    }

    /// The unvaried matra-I glyph, e.g. `dvmI`
    pub fn default_mi_name(&self) -> String {
        format!("{}{}", self.script, MI_NAME_STEM)
    }

    fn glyph_name(&self, stem: &str) -> String {
        format!("{}{}", self.script, stem)
    }
}

/// Outcome of one matching run
#[derive(Debug, Clone)]
pub struct MatchResult {
    /// Sorted by ascending overhang
    pub variants: Vec<Variant>,
    pub unmatched: Vec<Base>,
    pub tolerance: f64,
    pub default_mi_name: String,
    pub adjusted_range: Option<AdjustmentRange>,
}

impl MatchResult {
    pub fn unused_variants(&self) -> impl Iterator<Item = &Variant> {
        self.variants.iter().filter(|v| !v.is_used())
    }

    pub fn matched_count(&self) -> usize {
        self.variants.iter().map(|v| v.bases.len()).sum()
    }
}

/// Names of the variant glyphs.
///
/// The `mI_VARIANTS` group wins; without it, every glyph named
/// `<script>mI.<suffix>` is taken in glyph order.
pub fn variant_names(snapshot: &FontSnapshot, settings: &MatchSettings) -> Vec<String> {
    if let Some(group) = snapshot.group(CLASS_NAME_MI_VARIANTS) {
        return group.to_vec();
    }
    let prefix = format!("{}.", settings.default_mi_name());
    snapshot
        .glyph_order
        .iter()
        .filter(|name| name.starts_with(&prefix))
        .cloned()
        .collect()
}

/// Glyph sequences to measure, each as a list of glyph names
pub fn base_name_sequences(snapshot: &FontSnapshot, mode: MatchMode) -> Vec<Vec<String>> {
    let alive = snapshot.group(CLASS_NAME_BASES_ALIVE).unwrap_or_else(|| {
        warn!("Font has no '{}' group, nothing to match", CLASS_NAME_BASES_ALIVE);
        &[]
    });

    let mut sequences: Vec<Vec<String>> = alive
        .iter()
        .filter(|name| snapshot.contains(name))
        .map(|name| vec![name.clone()])
        .collect();

    if mode == MatchMode::Sequence {
        let dead = snapshot.group(CLASS_NAME_BASES_DEAD).unwrap_or_default();
        for d in dead {
            for a in alive {
                if snapshot.contains(d) && snapshot.contains(a) {
                    sequences.push(vec![d.clone(), a.clone()]);
                } else {
                    debug!("Skipping sequence '{} {}' with a missing glyph", d, a);
                }
            }
        }
    }

    sequences
}

/// Match every base of the font to a variant.
///
/// Returns `Ok(None)` when the font has no variants to match against.
pub fn run_matching(
    snapshot: &FontSnapshot,
    settings: &MatchSettings,
) -> Result<Option<MatchResult>, MatchError> {
    let names = variant_names(snapshot, settings);
    if names.is_empty() {
        info!("No matra-I variants found, skipping matching");
        return Ok(None);
    }
    let variants = names
        .iter()
        .map(|name| snapshot.require(name).and_then(Variant::from_glyph))
        .collect::<Result<Vec<_>, _>>()?;
    let mut set = VariantSet::new(variants);

    let measure = StemMeasure::calibrate(snapshot, &settings.glyph_name(CALIBRATION_GLYPH_STEM))?;
    debug!("abvm right margin: {}", measure.abvm_right_margin());

    let mut bases = base_name_sequences(snapshot, settings.mode)
        .iter()
        .map(|names| Base::new(names, snapshot, &measure))
        .collect::<Result<Vec<_>, _>>()?;

    let adjusted_range = settings.adjustment.map(|a| {
        adjust::adjust(
            &mut bases,
            a.position,
            a.axis_start,
            a.axis_end,
            a.light,
            a.bold,
        )
    });

    let tolerance_glyph_name = settings.glyph_name(TOLERANCE_GLYPH_STEM);
    let tolerance_glyph = snapshot
        .glyph(&tolerance_glyph_name)
        .ok_or(MatchError::MissingReferenceGlyph(tolerance_glyph_name))?;
    let tolerance = measure.stem_position(tolerance_glyph) * TOLERANCE_FACTOR;
    debug!("Matching tolerance: {}", tolerance);

    for base in bases {
        let label = base.sequence_text();
        let target = base.target;
        match set.assign(base, tolerance) {
            Assignment::Variant(i) => {
                debug!("'{}' ({}) -> {}", label, target, set.variants()[i].name)
            }
            Assignment::Unmatched => warn!("'{}' ({}) is beyond every variant", label, target),
        }
    }

    let (variants, unmatched) = set.into_parts();
    Ok(Some(MatchResult {
        variants,
        unmatched,
        tolerance,
        default_mi_name: settings.default_mi_name(),
        adjusted_range,
    }))
}
