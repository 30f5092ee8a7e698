//! Core application functionality
//!
//! This module contains the application layer around the matching engine:
//! - CLI parsing and user settings
//! - Project files
//! - The per-style pipeline and the runner driving it

pub mod cli;
pub mod config_file;
pub mod pipeline;
pub mod platform;
pub mod project;
pub mod runner;

// Re-export commonly used items
pub use cli::CliArgs;
pub use config_file::ConfigFile;
pub use pipeline::{generate_style, StyleReport};
pub use project::{ProjectConfig, StyleConfig};
pub use runner::run_app;
