//! UFO file I/O operations

use crate::font_source::FontSnapshot;
use anyhow::{Context, Result};
use norad::Font;
use std::path::Path;
use tracing::debug;

/// Load a UFO font file from disk
pub fn load_ufo_from_path(path: impl AsRef<Path>) -> Result<Font> {
    let path = path.as_ref();
    let font = Font::load(path).with_context(|| format!("Failed to load UFO {}", path.display()))?;
    Ok(font)
}

/// Load a UFO and take a metric snapshot of it
pub fn load_snapshot(path: impl AsRef<Path>) -> Result<FontSnapshot> {
    let path = path.as_ref();
    let font = load_ufo_from_path(path)?;
    let snapshot = FontSnapshot::from_norad_font(&font);
    debug!(
        "Snapshot of {}: {} glyphs, {} groups",
        path.display(),
        snapshot.len(),
        snapshot.groups.len()
    );
    Ok(snapshot)
}
