//! Errors raised while matching vowel sign variants

use thiserror::Error;

/// Problems that stop matching for a style.
///
/// All of these come from the font or project being set up wrong; none of
/// them are worth retrying.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Reference glyph '{0}' is missing from the font")]
    MissingReferenceGlyph(String),

    #[error("Reference glyph '{0}' has no mark-side abvm anchor to calibrate against")]
    MissingCalibrationAnchor(String),

    #[error("Glyph '{0}' is missing from the font")]
    MissingGlyph(String),

    #[error("Base '{0}' has no glyph that takes part in positioning")]
    EmptyBase(String),

    #[error("Variant glyph '{0}' has no outline to measure its overhang")]
    UnmeasurableVariant(String),

    #[error("Lookup '{0}' is opened but never closed in the mark feature file")]
    UnterminatedLookup(String),

    #[error("Invalid statement pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}
