//! Substitution lookup for the matched variants

use crate::matching::{MatchResult, Variant};
use tracing::warn;

/// Lookup name used when the project does not set one
pub const DEFAULT_LOOKUP_NAME: &str = "mI_variant_matches";

/// Rules that swap the default vowel sign for one variant.
///
/// Single glyph bases share one rule with a bracketed alternation; each
/// sequence base gets a rule of its own. Unused variants produce nothing.
pub fn variant_rules(default_mi_name: &str, variant: &Variant) -> Vec<String> {
    if !variant.is_used() {
        warn!("'{}' has no bases and is not used", variant.name);
        return Vec::new();
    }

    let mut rules = Vec::new();
    let singles: Vec<&str> = variant
        .single_glyph_bases()
        .map(|base| base.first_glyph_name())
        .collect();
    if !singles.is_empty() {
        rules.push(format!(
            "sub {}' [{}] by {};",
            default_mi_name,
            singles.join(" "),
            variant.name
        ));
    }
    rules.extend(variant.sequence_bases().map(|base| {
        format!(
            "sub {}' {} by {};",
            default_mi_name,
            base.sequence_text(),
            variant.name
        )
    }));
    rules
}

/// A named lookup of substitution rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionLookup {
    pub name: String,
    pub rules: Vec<String>,
}

impl SubstitutionLookup {
    pub fn from_result(name: &str, result: &MatchResult) -> Self {
        Self {
            name: name.to_string(),
            rules: result
                .variants
                .iter()
                .flat_map(|variant| variant_rules(&result.default_mi_name, variant))
                .collect(),
        }
    }

    pub fn render(&self) -> String {
        let mut text = format!("lookup {} {{\n", self.name);
        for rule in &self.rules {
            text.push_str("  ");
            text.push_str(rule);
            text.push('\n');
        }
        text.push_str(&format!("}} {};\n", self.name));
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::Base;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    fn base(names: &[&str]) -> Base {
        Base {
            name_sequence: names.iter().map(|n| n.to_string()).collect(),
            glyphs: Vec::new(),
            target: 0.0,
        }
    }

    fn result() -> MatchResult {
        let mut short = Variant::new("dvmI.01", 300.0, 150.0);
        short.bases.push(base(&["dvKA"]));
        short.bases.push(base(&["dvK", "dvSSA"]));
        short.bases.push(base(&["dvGA"]));
        let unused = Variant::new("dvmI.02", 380.0, 250.0);
        let mut long = Variant::new("dvmI.03", 460.0, 350.0);
        long.bases.push(base(&["dvJHA"]));
        MatchResult {
            variants: vec![short, unused, long],
            unmatched: Vec::new(),
            tolerance: 20.0,
            default_mi_name: "dvmI".to_string(),
            adjusted_range: None,
        }
    }

    #[test]
    fn singles_coalesce_sequences_do_not() {
        let result = result();
        assert_eq!(
            variant_rules("dvmI", &result.variants[0]),
            vec![
                "sub dvmI' [dvKA dvGA] by dvmI.01;",
                "sub dvmI' dvK dvSSA by dvmI.01;",
            ]
        );
        assert!(variant_rules("dvmI", &result.variants[1]).is_empty());
    }

    #[test]
    fn lookup_text() {
        let lookup = SubstitutionLookup::from_result(DEFAULT_LOOKUP_NAME, &result());
        assert_eq!(
            lookup.render(),
            "lookup mI_variant_matches {\n\
             \x20 sub dvmI' [dvKA dvGA] by dvmI.01;\n\
             \x20 sub dvmI' dvK dvSSA by dvmI.01;\n\
             \x20 sub dvmI' [dvJHA] by dvmI.03;\n\
             } mI_variant_matches;\n"
        );
    }

    #[test]
    fn empty_lookup_still_wraps() {
        let mut result = result();
        result.variants.iter_mut().for_each(|v| v.bases.clear());
        let lookup = SubstitutionLookup::from_result("matches", &result);
        assert_eq!(lookup.render(), "lookup matches {\n} matches;\n");
    }

    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn unused_variant_warns_once() {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let sink = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || LogBuffer(sink.clone()))
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            SubstitutionLookup::from_result(DEFAULT_LOOKUP_NAME, &result());
        });

        let logs = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert_eq!(logs.lines().count(), 1);
        assert!(logs.contains("WARN"));
        assert!(logs.contains("dvmI.02"));
    }
}
