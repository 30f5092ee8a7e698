//! Project file handling
//!
//! A project is a JSON file describing one font family: the script, how
//! matching runs, and the styles (UFO sources) to generate features for.
//! Relative paths are resolved against the project file's directory.

use crate::features::mark_patch::{DEFAULT_MARK_FEATURE_FILE, DEFAULT_MI_ANCHOR_NAME};
use crate::features::substitution::DEFAULT_LOOKUP_NAME;
use crate::features::FeatureOptions;
use crate::matching::base::SCRIPT_PREFIX_LEN;
use crate::matching::{AdjustmentRange, MatchMode, MatchSettings, WeightAdjustment};
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Extremes of the family's weight axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightAxis {
    pub start: f64,
    pub end: f64,
}

/// Adjustment ranges at the light and bold ends of the weight axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentConfig {
    pub light: AdjustmentRange,
    pub bold: AdjustmentRange,
}

/// One style of the family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleConfig {
    pub name: String,
    /// UFO source of the style
    pub ufo: PathBuf,
    /// Where feature files go. Defaults to the UFO's parent directory.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub weight_location: Option<f64>,
}

impl StyleConfig {
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| {
            self.ufo
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."))
        })
    }
}

fn default_true() -> bool {
    true
}

fn default_mark_feature_file() -> String {
    DEFAULT_MARK_FEATURE_FILE.to_string()
}

fn default_mi_anchor_name() -> String {
    DEFAULT_MI_ANCHOR_NAME.to_string()
}

fn default_lookup_name() -> String {
    DEFAULT_LOOKUP_NAME.to_string()
}

/// Contents of a project file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Glyph name prefix of the script, e.g. `dv` for Devanagari
    pub script: String,
    #[serde(default)]
    pub match_mode: MatchMode,
    /// Patch the mark positioning file for matched variants
    #[serde(default = "default_true")]
    pub position_marks: bool,
    #[serde(default = "default_mark_feature_file")]
    pub mark_feature_file: String,
    #[serde(default = "default_mi_anchor_name")]
    pub mi_anchor_name: String,
    #[serde(default = "default_lookup_name")]
    pub lookup_name: String,
    /// Defaults to the lowest and highest style weight locations
    #[serde(default)]
    pub weight_axis: Option<WeightAxis>,
    #[serde(default)]
    pub adjustment: Option<AdjustmentConfig>,
    pub styles: Vec<StyleConfig>,
}

impl ProjectConfig {
    /// Load, resolve paths, and validate a project file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read project file {}", path.display()))?;
        let mut project: ProjectConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse project file {}", path.display()))?;

        if let Some(root) = path.parent() {
            project.resolve_paths(root);
        }
        project.validate()?;
        debug!(
            "Loaded project {} with {} styles",
            path.display(),
            project.styles.len()
        );
        Ok(project)
    }

    fn resolve_paths(&mut self, root: &Path) {
        for style in &mut self.styles {
            if style.ufo.is_relative() {
                style.ufo = root.join(&style.ufo);
            }
            if let Some(dir) = style.output_dir.as_mut() {
                if dir.is_relative() {
                    *dir = root.join(&*dir);
                }
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.script.chars().count() != SCRIPT_PREFIX_LEN {
            bail!(
                "Script prefix '{}' must be {} characters, like 'dv'",
                self.script,
                SCRIPT_PREFIX_LEN
            );
        }
        if self.styles.is_empty() {
            bail!("Project has no styles");
        }

        let mut seen = HashSet::new();
        for style in &self.styles {
            if !seen.insert(style.name.as_str()) {
                bail!("Style '{}' is listed more than once", style.name);
            }
            if self.adjustment.is_some() && style.weight_location.is_none() {
                bail!(
                    "Style '{}' needs a weight_location because the project adjusts matching",
                    style.name
                );
            }
        }

        if self.adjustment.is_some() && self.weight_axis().is_none() {
            bail!("Matching adjustment needs a weight axis");
        }
        Ok(())
    }

    /// The explicit axis, or the span of the styles' weight locations
    pub fn weight_axis(&self) -> Option<WeightAxis> {
        if let Some(axis) = self.weight_axis {
            return Some(axis);
        }
        let locations: Vec<f64> = self
            .styles
            .iter()
            .filter_map(|s| s.weight_location)
            .collect();
        let start = locations.iter().copied().reduce(f64::min)?;
        let end = locations.iter().copied().reduce(f64::max)?;
        Some(WeightAxis { start, end })
    }

    pub fn style(&self, name: &str) -> Result<&StyleConfig> {
        self.styles.iter().find(|s| s.name == name).ok_or_else(|| {
            let known: Vec<&str> = self.styles.iter().map(|s| s.name.as_str()).collect();
            anyhow!(
                "Unknown style '{}'\nStyles in this project: {}",
                name,
                known.join(", ")
            )
        })
    }

    pub fn match_settings(&self, style: &StyleConfig) -> MatchSettings {
        let adjustment = match (self.adjustment, self.weight_axis(), style.weight_location) {
            (Some(ranges), Some(axis), Some(position)) => Some(WeightAdjustment {
                position,
                axis_start: axis.start,
                axis_end: axis.end,
                light: ranges.light,
                bold: ranges.bold,
            }),
            _ => None,
        };
        MatchSettings {
            script: self.script.clone(),
            mode: self.match_mode,
            adjustment,
        }
    }

    pub fn feature_options(&self) -> FeatureOptions {
        FeatureOptions {
            lookup_name: self.lookup_name.clone(),
            position_marks: self.position_marks,
            mark_feature_file: self.mark_feature_file.clone(),
            mi_anchor_name: self.mi_anchor_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROJECT: &str = r#"{
        "script": "dv",
        "match_mode": "single",
        "adjustment": { "light": [0, 10], "bold": [20, 40] },
        "styles": [
            { "name": "Light", "ufo": "masters/Light.ufo", "weight_location": 300 },
            { "name": "Bold", "ufo": "masters/Bold.ufo", "output_dir": "build/Bold", "weight_location": 700 },
            { "name": "Regular", "ufo": "/abs/Regular.ufo", "weight_location": 400 }
        ]
    }"#;

    fn load_in(dir: &Path, text: &str) -> Result<ProjectConfig> {
        let path = dir.join("project.json");
        fs::write(&path, text)?;
        ProjectConfig::load(&path)
    }

    fn load(text: &str) -> Result<ProjectConfig> {
        let dir = tempfile::tempdir()?;
        load_in(dir.path(), text)
    }

    #[test]
    fn defaults_and_paths() {
        let dir = tempfile::tempdir().unwrap();
        let project = load_in(dir.path(), PROJECT).unwrap();
        assert!(project.position_marks);
        assert_eq!(project.mark_feature_file, "abvm.fea");
        assert_eq!(project.mi_anchor_name, "abvm.i");
        assert_eq!(project.lookup_name, "mI_variant_matches");
        assert_eq!(project.styles[0].ufo, dir.path().join("masters/Light.ufo"));
        assert_eq!(project.styles[0].output_dir(), dir.path().join("masters"));
        assert_eq!(project.styles[1].output_dir(), dir.path().join("build/Bold"));
        assert_eq!(project.styles[2].ufo, PathBuf::from("/abs/Regular.ufo"));
    }

    #[test]
    fn axis_from_styles() {
        let project = load(PROJECT).unwrap();
        assert_eq!(
            project.weight_axis(),
            Some(WeightAxis {
                start: 300.0,
                end: 700.0
            })
        );
        let regular = project.style("Regular").unwrap();
        let settings = project.match_settings(regular);
        let adjustment = settings.adjustment.unwrap();
        assert_eq!(adjustment.position, 400.0);
        assert_eq!(adjustment.bold, AdjustmentRange::new(20.0, 40.0));
    }

    #[test]
    fn rejects_bad_projects() {
        assert!(load(&PROJECT.replace("\"dv\"", "\"deva\"")).is_err());
        assert!(load(r#"{ "script": "dv", "styles": [] }"#).is_err());
        assert!(load(&PROJECT.replace("\"Bold\"", "\"Light\"")).is_err());
        assert!(load(&PROJECT.replace(", \"weight_location\": 400", "")).is_err());
    }

    #[test]
    fn unknown_style_lists_known_ones() {
        let project = load(PROJECT).unwrap();
        let message = project.style("Black").unwrap_err().to_string();
        assert!(message.contains("Light, Bold, Regular"));
    }

    #[test]
    fn no_adjustment_without_ranges() {
        let project = load(r#"{ "script": "dv", "styles": [ { "name": "R", "ufo": "R.ufo" } ] }"#)
            .unwrap();
        assert_eq!(project.match_settings(&project.styles[0]).adjustment, None);
        assert_eq!(project.match_mode, MatchMode::Single);
    }
}
