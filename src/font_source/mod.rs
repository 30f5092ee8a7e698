//! Font source data structures
//!
//! Snapshots of glyph metrics taken from UFO sources. These are the only
//! view of a font the matching engine gets.

pub mod metrics;

pub use metrics::{AnchorSide, FontSnapshot, GlyphMetrics, StemMeasure};
