//! Re-targeting the mark positioning lookup for matched variants
//!
//! The mark feature writer emits one `pos base <mI>.NN <anchor X Y> ...`
//! statement per variant glyph. Once variants are matched, each of those
//! has to position marks on the bases the variant was matched to instead,
//! with the anchor moved into the base's coordinate system.
//!
//! The untouched file is kept next to the working copy as
//! `backup--<name>`. Patching always reads the backup, so running the
//! generator again gives the same output instead of shifting anchors twice.

use crate::matching::{MatchError, MatchResult, Variant};
use anyhow::{Context, Result};
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const BACKUP_PREFIX: &str = "backup--";
pub const DEFAULT_MARK_FEATURE_FILE: &str = "abvm.fea";
pub const DEFAULT_MI_ANCHOR_NAME: &str = "abvm.i";

/// Name of the mark-to-base lookup for an anchor, e.g. `MARK_BASE_abvm.i`
pub fn mark_lookup_name(anchor_name: &str) -> String {
    format!("MARK_BASE_{anchor_name}")
}

#[derive(Debug, Clone, PartialEq)]
struct Retarget {
    glyphs: Vec<String>,
    offset: i64,
    used: bool,
}

/// One `pos base <mI>.NN <anchor X` statement inside the lookup
#[derive(Debug, Clone, PartialEq)]
pub struct PositionStatement {
    original: String,
    prefix: String,
    suffix: String,
    /// Variant number, the glyph name suffix
    pub number: String,
    /// Anchor x as written
    pub offset: i64,
    retarget: Option<Retarget>,
}

impl PositionStatement {
    fn render(&self) -> String {
        let Some(retarget) = &self.retarget else {
            return self.original.clone();
        };
        format!(
            "{}{}pos base [{}] <anchor {}{}",
            self.prefix,
            if retarget.used { "" } else { "# " },
            retarget.glyphs.join(" "),
            retarget.offset,
            self.suffix
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
enum MarkLine {
    Verbatim(String),
    Position(PositionStatement),
}

/// A mark feature file split into untouched lines and the variant
/// positioning statements of one lookup
#[derive(Debug, Clone, PartialEq)]
pub struct MarkLookupFile {
    lines: Vec<MarkLine>,
}

impl MarkLookupFile {
    pub fn parse(text: &str, lookup_name: &str, default_mi_name: &str) -> Result<Self, MatchError> {
        let begin = format!("lookup {lookup_name} {{");
        let end = format!("}} {lookup_name};");
        let statement = Regex::new(&format!(
            r"pos base {}\.(\d\d) <anchor (-?\d+)",
            regex::escape(default_mi_name)
        ))?;

        let mut lines = Vec::new();
        let mut inside = false;
        for line in text.split_inclusive('\n') {
            let bare = line.trim_end_matches(['\r', '\n']);
            if !inside {
                inside = bare == begin;
                lines.push(MarkLine::Verbatim(line.to_string()));
            } else if bare == end {
                inside = false;
                lines.push(MarkLine::Verbatim(line.to_string()));
            } else {
                lines.push(parse_statement(&statement, line).map_or_else(
                    || MarkLine::Verbatim(line.to_string()),
                    MarkLine::Position,
                ));
            }
        }

        if inside {
            return Err(MatchError::UnterminatedLookup(lookup_name.to_string()));
        }
        Ok(Self { lines })
    }

    pub fn statements(&self) -> impl Iterator<Item = &PositionStatement> {
        self.lines.iter().filter_map(|line| match line {
            MarkLine::Position(statement) => Some(statement),
            MarkLine::Verbatim(_) => None,
        })
    }

    /// Point each variant's statement at its bases and subtract
    /// `correction` from the anchor x. Statements of unused variants are
    /// commented out.
    pub fn retarget(&mut self, variants: &[Variant], correction: f64) {
        let by_number: HashMap<&str, &Variant> =
            variants.iter().map(|v| (v.number.as_str(), v)).collect();

        for line in &mut self.lines {
            let MarkLine::Position(statement) = line else {
                continue;
            };
            let Some(variant) = by_number.get(statement.number.as_str()) else {
                warn!(
                    "Mark positioning names variant '{}' which is not in the variant list",
                    statement.number
                );
                continue;
            };
            statement.retarget = Some(Retarget {
                glyphs: variant
                    .bases
                    .iter()
                    .map(|b| b.first_glyph_name().to_string())
                    .collect(),
                offset: (statement.offset as f64 - correction).round() as i64,
                used: variant.is_used(),
            });
        }
    }

    pub fn render(&self) -> String {
        self.lines
            .iter()
            .map(|line| match line {
                MarkLine::Verbatim(text) => text.clone(),
                MarkLine::Position(statement) => statement.render(),
            })
            .collect()
    }
}

fn parse_statement(pattern: &Regex, line: &str) -> Option<PositionStatement> {
    let caps = pattern.captures(line)?;
    let whole = caps.get(0)?;
    Some(PositionStatement {
        original: line.to_string(),
        prefix: line[..whole.start()].to_string(),
        suffix: line[whole.end()..].to_string(),
        number: caps[1].to_string(),
        offset: caps[2].parse().ok()?,
        retarget: None,
    })
}

/// Whether a mark file has been patched before, judged by its backup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkFileState {
    Unpatched,
    Patched,
}

impl MarkFileState {
    pub fn detect(working: &Path) -> Self {
        if backup_path(working).exists() {
            MarkFileState::Patched
        } else {
            MarkFileState::Unpatched
        }
    }
}

pub fn backup_path(working: &Path) -> PathBuf {
    let name = working
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    working.with_file_name(format!("{BACKUP_PREFIX}{name}"))
}

/// A patched mark file, rendered but not yet written
#[derive(Debug, Clone, PartialEq)]
pub struct MarkPatch {
    pub working: PathBuf,
    state: MarkFileState,
    text: String,
    statements: usize,
}

impl MarkPatch {
    /// Read, parse, and retarget the mark file at `working` without
    /// touching the disk.
    ///
    /// Returns `None` when there is no mark file to patch.
    pub fn prepare(working: &Path, lookup_name: &str, result: &MatchResult) -> Result<Option<Self>> {
        let state = MarkFileState::detect(working);
        let source = match state {
            MarkFileState::Patched => {
                let backup = backup_path(working);
                debug!("Restoring mark positioning from {}", backup.display());
                backup
            }
            MarkFileState::Unpatched if !working.exists() => {
                warn!(
                    "No mark feature file at {}, skipping mark positioning",
                    working.display()
                );
                return Ok(None);
            }
            MarkFileState::Unpatched => working.to_path_buf(),
        };

        let original = fs::read_to_string(&source)
            .with_context(|| format!("Failed to read {}", source.display()))?;
        let mut file = MarkLookupFile::parse(&original, lookup_name, &result.default_mi_name)?;
        let correction = result.variants.first().map_or(0.0, |v| v.width);
        file.retarget(&result.variants, correction);

        Ok(Some(Self {
            working: working.to_path_buf(),
            state,
            text: file.render(),
            statements: file.statements().count(),
        }))
    }

    /// Back up the untouched file on first application, then write the
    /// patched text.
    pub fn apply(&self) -> Result<()> {
        if self.state == MarkFileState::Unpatched {
            let backup = backup_path(&self.working);
            fs::copy(&self.working, &backup)
                .with_context(|| format!("Failed to back up {}", self.working.display()))?;
        }
        fs::write(&self.working, &self.text)
            .with_context(|| format!("Failed to write {}", self.working.display()))?;
        info!(
            "Patched {} statements in {}",
            self.statements,
            self.working.display()
        );
        Ok(())
    }
}

/// Patch the mark file at `working` for a matching result.
///
/// Returns `false` when there is no mark file to patch.
pub fn patch_mark_feature(working: &Path, lookup_name: &str, result: &MatchResult) -> Result<bool> {
    let Some(patch) = MarkPatch::prepare(working, lookup_name, result)? else {
        return Ok(false);
    };
    patch.apply()?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::Base;
    use pretty_assertions::assert_eq;

    const MARK_FEA: &str = "\
lookup MARK_BASE_abvm {
  pos base dvKA <anchor 400 700> mark @MC_abvm;
} MARK_BASE_abvm;

lookup MARK_BASE_abvm.i {
  pos base dvmI.01 <anchor -120 720> mark @MC_abvm.i;
  pos base dvmI.02 <anchor -260 720> mark @MC_abvm.i;
  pos base dvmI.07 <anchor -300 720> mark @MC_abvm.i;
} MARK_BASE_abvm.i;
";

    fn result() -> MatchResult {
        let mut first = Variant::new("dvmI.01", 300.0, 150.0);
        for name in ["dvKA", "dvGA"] {
            first.bases.push(Base {
                name_sequence: vec![name.to_string()],
                glyphs: Vec::new(),
                target: 100.0,
            });
        }
        MatchResult {
            variants: vec![first, Variant::new("dvmI.02", 420.0, 250.0)],
            unmatched: Vec::new(),
            tolerance: 10.0,
            default_mi_name: "dvmI".to_string(),
            adjusted_range: None,
        }
    }

    #[test]
    fn parses_only_the_named_lookup() {
        let file = MarkLookupFile::parse(MARK_FEA, "MARK_BASE_abvm.i", "dvmI").unwrap();
        let numbers: Vec<_> = file.statements().map(|s| s.number.as_str()).collect();
        assert_eq!(numbers, ["01", "02", "07"]);
        assert_eq!(file.statements().next().unwrap().offset, -120);
        assert_eq!(file.render(), MARK_FEA);
    }

    #[test]
    fn retargets_and_comments_unused() {
        let mut file = MarkLookupFile::parse(MARK_FEA, "MARK_BASE_abvm.i", "dvmI").unwrap();
        file.retarget(&result().variants, 300.0);
        let expected = MARK_FEA
            .replace(
                "  pos base dvmI.01 <anchor -120 720>",
                "  pos base [dvKA dvGA] <anchor -420 720>",
            )
            .replace(
                "  pos base dvmI.02 <anchor -260 720>",
                "  # pos base [] <anchor -560 720>",
            );
        assert_eq!(file.render(), expected);
    }

    #[test]
    fn unterminated_lookup_is_an_error() {
        let text = "lookup MARK_BASE_abvm.i {\n  pos base dvmI.01 <anchor 1 2> mark @M;\n";
        assert!(matches!(
            MarkLookupFile::parse(text, "MARK_BASE_abvm.i", "dvmI"),
            Err(MatchError::UnterminatedLookup(_))
        ));
    }

    #[test]
    fn backup_sits_beside_working_file() {
        assert_eq!(
            backup_path(Path::new("/fonts/Regular/abvm.fea")),
            PathBuf::from("/fonts/Regular/backup--abvm.fea")
        );
    }

    #[test]
    fn repeated_patching_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let working = dir.path().join(DEFAULT_MARK_FEATURE_FILE);
        fs::write(&working, MARK_FEA).unwrap();
        let lookup = mark_lookup_name(DEFAULT_MI_ANCHOR_NAME);

        assert_eq!(MarkFileState::detect(&working), MarkFileState::Unpatched);
        assert!(patch_mark_feature(&working, &lookup, &result()).unwrap());
        let once = fs::read_to_string(&working).unwrap();
        assert_eq!(MarkFileState::detect(&working), MarkFileState::Patched);

        assert!(patch_mark_feature(&working, &lookup, &result()).unwrap());
        let twice = fs::read_to_string(&working).unwrap();

        assert_eq!(once, twice);
        assert_ne!(once, MARK_FEA);
        assert_eq!(fs::read_to_string(backup_path(&working)).unwrap(), MARK_FEA);
    }

    #[test]
    fn missing_mark_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let working = dir.path().join(DEFAULT_MARK_FEATURE_FILE);
        assert!(!patch_mark_feature(&working, "MARK_BASE_abvm.i", &result()).unwrap());
        assert!(!backup_path(&working).exists());
    }

    #[test]
    fn broken_file_is_left_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let working = dir.path().join(DEFAULT_MARK_FEATURE_FILE);
        let broken = MARK_FEA.replace("} MARK_BASE_abvm.i;\n", "");
        fs::write(&working, &broken).unwrap();

        let lookup = mark_lookup_name(DEFAULT_MI_ANCHOR_NAME);
        assert!(MarkPatch::prepare(&working, &lookup, &result()).is_err());
        assert!(patch_mark_feature(&working, &lookup, &result()).is_err());
        assert!(!backup_path(&working).exists());
        assert_eq!(fs::read_to_string(&working).unwrap(), broken);
    }
}
