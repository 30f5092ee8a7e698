//! Application runner logic
//!
//! Turns parsed CLI arguments into a run: settings, logging, the project,
//! and generation of each selected style.

use crate::core::cli::CliArgs;
use crate::core::config_file::ConfigFile;
use crate::core::pipeline::{self, StyleReport};
use crate::core::project::{ProjectConfig, StyleConfig};
use crate::logging;
use anyhow::{anyhow, bail, Result};
use tracing::{error, info};

/// Styles named on the command line, or every style of the project
pub fn select_styles<'a>(
    project: &'a ProjectConfig,
    names: &[String],
) -> Result<Vec<&'a StyleConfig>> {
    if names.is_empty() {
        return Ok(project.styles.iter().collect());
    }
    names.iter().map(|name| project.style(name)).collect()
}

/// Generate every selected style, carrying on past failures.
///
/// Fails after the last style when any of them failed.
pub fn generate_styles(
    project: &ProjectConfig,
    styles: &[&StyleConfig],
    dry_run: bool,
) -> Result<Vec<StyleReport>> {
    let mut reports = Vec::with_capacity(styles.len());
    let mut failed = Vec::new();

    for style in styles {
        match pipeline::generate_style(project, style, dry_run) {
            Ok(report) => reports.push(report),
            Err(e) => {
                error!("Style '{}' failed: {:#}", style.name, e);
                failed.push(style.name.as_str());
            }
        }
    }

    if !failed.is_empty() {
        bail!(
            "{} of {} styles failed: {}",
            failed.len(),
            styles.len(),
            failed.join(", ")
        );
    }
    Ok(reports)
}

/// Run the application with the given CLI arguments.
/// Handles special CLI flags and delegates to the style pipeline.
pub fn run_app(cli_args: CliArgs) -> Result<()> {
    // Handle --new-config flag specially
    if cli_args.new_config {
        return ConfigFile::initialize_config_directory();
    }

    cli_args.validate().map_err(|e| anyhow!(e))?;

    let settings = ConfigFile::load().unwrap_or_default();
    let _log_guard = logging::init(
        &settings.log_filter(cli_args.log_level.as_deref()),
        settings.log_to_file(cli_args.log_file),
    )?;

    let project_path = cli_args
        .project
        .as_deref()
        .ok_or_else(|| anyhow!("No project file given"))?;
    let project = ProjectConfig::load(project_path)?;
    let styles = select_styles(&project, &cli_args.styles)?;

    let reports = generate_styles(&project, &styles, cli_args.dry_run)?;
    info!(
        "Done: {} styles, {} files written",
        reports.len(),
        reports.iter().map(|r| r.files.len()).sum::<usize>()
    );
    Ok(())
}
