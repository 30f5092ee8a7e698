//! Feature source output
//!
//! Renders a [`MatchResult`] into feature files for a style's directory and
//! patches the mark positioning file that was generated for that style.
//! Everything is rendered first and written in one step at the end.

pub mod classes;
pub mod mark_patch;
pub mod substitution;

pub use mark_patch::{MarkFileState, MarkLookupFile, MarkPatch};
pub use substitution::SubstitutionLookup;

use crate::font_source::FontSnapshot;
use crate::matching::{MatchMode, MatchResult};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CLASSES_FILE: &str = "classes.fea";
pub const MATCHES_FILE: &str = "mI_variant_matches.fea";
pub const VARIANT_CLASSES_FILE: &str = "mI_variant_classes.fea";

/// How a style's feature files are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureOptions {
    pub lookup_name: String,
    pub position_marks: bool,
    pub mark_feature_file: String,
    pub mi_anchor_name: String,
}

impl Default for FeatureOptions {
    fn default() -> Self {
        Self {
            lookup_name: substitution::DEFAULT_LOOKUP_NAME.to_string(),
            position_marks: true,
            mark_feature_file: mark_patch::DEFAULT_MARK_FEATURE_FILE.to_string(),
            mi_anchor_name: mark_patch::DEFAULT_MI_ANCHOR_NAME.to_string(),
        }
    }
}

/// Files touched for one style
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WrittenFeatures {
    pub files: Vec<PathBuf>,
    pub mark_patched: bool,
}

/// Every output of one style, rendered in memory.
///
/// All reading, parsing, and rendering happens while the set is built, so
/// a style that fails never leaves half of its files behind. Nothing
/// touches the output directory until [`FeatureSet::write`].
#[derive(Debug, Clone)]
pub struct FeatureSet {
    dir: PathBuf,
    texts: Vec<(PathBuf, String)>,
    mark_patch: Option<MarkPatch>,
}

impl FeatureSet {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            texts: Vec::new(),
            mark_patch: None,
        }
    }

    /// Add the matching input classes
    pub fn add_matching_classes(&mut self, snapshot: &FontSnapshot, variant_names: &[String]) {
        self.texts.push((
            self.dir.join(CLASSES_FILE),
            classes::matching_classes(snapshot, variant_names),
        ));
    }

    /// Add the substitution lookup and per-variant classes, and prepare the
    /// mark positioning patch if asked to.
    ///
    /// Mark positioning is left alone for sequence matching, whose bases are
    /// not single glyphs a `pos base` statement could name.
    pub fn add_match_result(
        &mut self,
        result: &MatchResult,
        mode: MatchMode,
        options: &FeatureOptions,
    ) -> Result<()> {
        let lookup = SubstitutionLookup::from_result(&options.lookup_name, result);
        self.texts.push((self.dir.join(MATCHES_FILE), lookup.render()));
        self.texts.push((
            self.dir.join(VARIANT_CLASSES_FILE),
            classes::variant_base_classes(result),
        ));

        if options.position_marks && mode == MatchMode::Single {
            let working = self.dir.join(&options.mark_feature_file);
            let lookup_name = mark_patch::mark_lookup_name(&options.mi_anchor_name);
            self.mark_patch = MarkPatch::prepare(&working, &lookup_name, result)?;
        }
        Ok(())
    }

    /// Paths that [`FeatureSet::write`] would write
    pub fn paths(&self) -> Vec<&Path> {
        let texts = self.texts.iter().map(|(path, _)| path.as_path());
        texts
            .chain(self.mark_patch.iter().map(|patch| patch.working.as_path()))
            .collect()
    }

    pub fn write(self) -> Result<WrittenFeatures> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;
        let mut written = WrittenFeatures::default();

        for (path, text) in self.texts {
            fs::write(&path, text).with_context(|| format!("Failed to write {}", path.display()))?;
            debug!("Wrote {}", path.display());
            written.files.push(path);
        }

        if let Some(patch) = self.mark_patch {
            patch.apply()?;
            written.mark_patched = true;
            written.files.push(patch.working);
        }

        Ok(written)
    }
}
