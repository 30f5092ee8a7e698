//! matra-variants
pub mod core;
pub mod data;
pub mod features;
pub mod font_source;
pub mod logging;
pub mod matching;
