//! Glyph class definitions
//!
//! Non-empty classes list one glyph per line so that regenerated files
//! diff cleanly. Empty classes still get a commented placeholder with the
//! same name.

use crate::font_source::FontSnapshot;
use crate::matching::{
    MatchResult, CLASS_NAME_BASES_ALIVE, CLASS_NAME_BASES_DEAD, CLASS_NAME_BASES_FOR_LONG_MI,
    CLASS_NAME_MI_VARIANTS,
};

/// Prefix of the per-variant base classes
pub const VARIANT_BASES_CLASS_PREFIX: &str = "BASES_FOR_";
pub const UNMATCHED_BASES_CLASS_NAME: &str = "BASES_NOT_MATCHED";

/// Names found in `order` come first, in that order; the rest follow in
/// their original order.
pub fn sort_names<S: AsRef<str>>(names: &[String], order: &[S]) -> Vec<String> {
    let in_order = |name: &str| order.iter().any(|o| o.as_ref() == name);
    let mut sorted: Vec<String> = order
        .iter()
        .map(|o| o.as_ref())
        .filter(|o| names.iter().any(|n| n == o))
        .map(str::to_string)
        .collect();
    sorted.extend(names.iter().filter(|n| !in_order(n)).cloned());
    sorted
}

/// Lines of one class definition, ending with a blank separator line
pub fn compose_glyph_class_def_lines<S: AsRef<str>>(class_name: &str, glyph_names: &[S]) -> Vec<String> {
    if glyph_names.is_empty() {
        return vec![format!("# @{class_name} = [];"), String::new()];
    }
    let mut lines = Vec::with_capacity(glyph_names.len() + 3);
    lines.push(format!("@{class_name} = ["));
    lines.extend(glyph_names.iter().map(|name| format!("  {}", name.as_ref())));
    lines.push("];".to_string());
    lines.push(String::new());
    lines
}

/// Join lines with a newline after every one of them
pub fn render_lines(lines: &[String]) -> String {
    lines.iter().fold(String::new(), |mut text, line| {
        text.push_str(line);
        text.push('\n');
        text
    })
}

/// The input classes of matching: variants, alive and dead bases, and
/// bases taking the long vowel sign, each in glyph order.
pub fn matching_classes(snapshot: &FontSnapshot, variant_names: &[String]) -> String {
    let members = |class_name: &str| -> Vec<String> {
        let names = if class_name == CLASS_NAME_MI_VARIANTS {
            variant_names.to_vec()
        } else {
            snapshot.group(class_name).map(<[String]>::to_vec).unwrap_or_default()
        };
        sort_names(&names, &snapshot.glyph_order)
    };

    let lines: Vec<String> = [
        CLASS_NAME_MI_VARIANTS,
        CLASS_NAME_BASES_ALIVE,
        CLASS_NAME_BASES_DEAD,
        CLASS_NAME_BASES_FOR_LONG_MI,
    ]
    .into_iter()
    .flat_map(|class_name| compose_glyph_class_def_lines(class_name, &members(class_name)))
    .collect();
    render_lines(&lines)
}

/// One class per variant listing the glyphs it was matched to, plus one
/// for bases nothing reaches. Only the first glyph of a base is listed.
pub fn variant_base_classes(result: &MatchResult) -> String {
    let mut lines = Vec::new();
    for variant in &result.variants {
        let names = unique_first_glyphs(variant.bases.iter().map(|b| b.first_glyph_name()));
        lines.extend(compose_glyph_class_def_lines(
            &format!("{VARIANT_BASES_CLASS_PREFIX}{}", variant.name),
            &names,
        ));
    }
    let unmatched = unique_first_glyphs(result.unmatched.iter().map(|b| b.first_glyph_name()));
    lines.extend(compose_glyph_class_def_lines(
        UNMATCHED_BASES_CLASS_NAME,
        &unmatched,
    ));
    render_lines(&lines)
}

fn unique_first_glyphs<'a>(names: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut unique: Vec<&str> = Vec::new();
    for name in names {
        if !unique.contains(&name) {
            unique.push(name);
        }
    }
    unique
}
