//! Reading font sources from disk
//!
//! UFO loading goes through norad; everything downstream works on
//! [`crate::font_source::FontSnapshot`].

pub mod conversions;
pub mod ufo;

pub use ufo::{load_snapshot, load_ufo_from_path};
