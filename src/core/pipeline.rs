//! Per-style generation
//!
//! Loads a style's UFO, runs matching, renders every feature file for the
//! result, and only then writes them. A style that fails leaves its output
//! directory as it was.

use crate::core::project::{ProjectConfig, StyleConfig};
use crate::data::ufo;
use crate::features::{FeatureSet, WrittenFeatures};
use crate::matching::{self, MatchResult};
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{info, info_span};

/// What generating one style did
#[derive(Debug, Default)]
pub struct StyleReport {
    pub style: String,
    /// `None` when the font has no variants to match
    pub result: Option<MatchResult>,
    /// Empty on a dry run
    pub files: Vec<PathBuf>,
    pub mark_patched: bool,
}

impl StyleReport {
    fn record(&mut self, written: WrittenFeatures) {
        self.files.extend(written.files);
        self.mark_patched = written.mark_patched;
    }
}

fn log_summary(result: &MatchResult) {
    info!(
        "{} bases matched to {} variants ({} unused), {} unmatched (tolerance {})",
        result.matched_count(),
        result.variants.len(),
        result.unused_variants().count(),
        result.unmatched.len(),
        result.tolerance
    );
    if let Some(range) = result.adjusted_range {
        info!("Targets adjusted by [{}, {}]", range.low, range.high);
    }
    for variant in &result.variants {
        let bases: Vec<String> = variant.bases.iter().map(|b| b.sequence_text()).collect();
        info!(
            "{} (overhang {}): {}",
            variant.name,
            variant.overhanging,
            bases.join(", ")
        );
    }
}

/// Generate the features of one style
pub fn generate_style(
    project: &ProjectConfig,
    style: &StyleConfig,
    dry_run: bool,
) -> Result<StyleReport> {
    let _span = info_span!("style", name = %style.name).entered();
    let mut report = StyleReport {
        style: style.name.clone(),
        ..Default::default()
    };

    let snapshot = ufo::load_snapshot(&style.ufo)?;
    let settings = project.match_settings(style);
    let output_dir = style.output_dir();

    let mut features = FeatureSet::new(&output_dir);
    features.add_matching_classes(&snapshot, &matching::variant_names(&snapshot, &settings));

    let result = matching::run_matching(&snapshot, &settings)
        .with_context(|| format!("Matching failed for style '{}'", style.name))?;
    if let Some(result) = &result {
        log_summary(result);
        features.add_match_result(result, settings.mode, &project.feature_options())?;
    }

    if dry_run {
        for path in features.paths() {
            info!("Dry run, not writing {}", path.display());
        }
    } else {
        report.record(features.write()?);
        info!(
            "Wrote {} files to {}",
            report.files.len(),
            output_dir.display()
        );
    }

    report.result = result;
    Ok(report)
}
