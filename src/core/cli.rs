//! Command line interface for matra-variants
//!
//! Handles parsing command line arguments and validating them before any
//! font is loaded.

use clap::Parser;
use std::path::PathBuf;

/// matra-variants CLI arguments
///
/// Examples:
///   matra-variants family.json                     # All styles of a project
///   matra-variants family.json --style Bold        # One style
///   matra-variants family.json -s Light -s Bold    # Several styles
///   matra-variants family.json --dry-run           # Match without writing files
///   matra-variants family.json --log-level debug   # Verbose output
///   matra-variants --new-config                    # Create ~/.config/matra-variants
#[derive(Parser, Debug, Clone, Default)]
#[clap(
    name = "matra-variants",
    version,
    about = "Matches pre-base vowel sign variants to Indic bases",
    long_about = "matra-variants measures the bases and mI variants of a UFO font, assigns each base the variant whose overhang fits its stem, and writes the OpenType feature source for the assignment."
)]
pub struct CliArgs {
    /// Path to a project file
    ///
    /// The project is a JSON file naming the script prefix, the matching
    /// mode, and the UFO of every style.
    #[clap(
        required_unless_present = "new_config",
        help = "Project file (JSON)",
        long_help = "Path to a JSON project file describing the script, matching options, and the styles of the family. Relative paths inside it are resolved against the project file's directory."
    )]
    pub project: Option<PathBuf>,

    /// Styles to generate, all of them when empty
    #[clap(
        long = "style",
        short = 's',
        help = "Only generate this style (repeatable)",
        long_help = "Only generate features for the named style. Can be given more than once. Without it, every style in the project is generated."
    )]
    pub styles: Vec<String>,

    /// Log filter, e.g. `info` or `matra_variants=debug`
    #[clap(
        long = "log-level",
        short = 'l',
        help = "Log filter (e.g. info, debug)",
        long_help = "Log filter in tracing-subscriber EnvFilter syntax. RUST_LOG takes precedence; otherwise this overrides the default_log_filter setting in settings.json."
    )]
    pub log_level: Option<String>,

    /// Also write logs to the dated log file
    #[clap(
        long = "log-file",
        help = "Also write logs to ~/.config/matra-variants/logs",
        long_help = "Also write logs to a dated file in ~/.config/matra-variants/logs. The log_to_file setting in settings.json turns this on permanently."
    )]
    pub log_file: bool,

    /// Match and report without writing files
    #[clap(
        long = "dry-run",
        short = 'n',
        help = "Match and log the assignment without writing files"
    )]
    pub dry_run: bool,

    /// Initialize the user configuration directory
    #[clap(
        long = "new-config",
        help = "Initialize user config directory with settings",
        long_help = "Initialize the ~/.config/matra-variants directory with a settings.json file and a logs directory."
    )]
    pub new_config: bool,
}

impl CliArgs {
    /// Validate the CLI arguments after parsing
    pub fn validate(&self) -> Result<(), String> {
        let Some(path) = &self.project else {
            return Ok(());
        };

        if !path.exists() {
            return Err(format!(
                "Project file does not exist: {}\nMake sure the path is correct and the file exists.",
                path.display()
            ));
        }
        if !path.is_file() {
            return Err(format!(
                "Project path is not a file: {}\nPass the project's JSON file, not a directory.",
                path.display()
            ));
        }

        if let Some(duplicate) = self
            .styles
            .iter()
            .enumerate()
            .find(|(i, style)| self.styles[..*i].contains(style))
            .map(|(_, style)| style)
        {
            return Err(format!("Style '{duplicate}' was given more than once"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_styles_and_flags() {
        let args = CliArgs::try_parse_from([
            "matra-variants",
            "family.json",
            "-s",
            "Light",
            "--style",
            "Bold",
            "--dry-run",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(args.project, Some(PathBuf::from("family.json")));
        assert_eq!(args.styles, ["Light", "Bold"]);
        assert!(args.dry_run);
        assert!(!args.log_file);
        assert_eq!(args.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn project_required_unless_new_config() {
        assert!(CliArgs::try_parse_from(["matra-variants"]).is_err());
        let args = CliArgs::try_parse_from(["matra-variants", "--new-config"]).unwrap();
        assert!(args.new_config);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn validate_checks_project_and_styles() {
        let dir = tempfile::tempdir().unwrap();
        let missing = CliArgs {
            project: Some(dir.path().join("missing.json")),
            ..Default::default()
        };
        assert!(missing.validate().is_err());

        let not_a_file = CliArgs {
            project: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        assert!(not_a_file.validate().is_err());

        let project = dir.path().join("family.json");
        std::fs::write(&project, "{}").unwrap();
        let repeated = CliArgs {
            project: Some(project.clone()),
            styles: vec!["Bold".into(), "Light".into(), "Bold".into()],
            ..Default::default()
        };
        assert!(repeated.validate().unwrap_err().contains("'Bold'"));

        let ok = CliArgs {
            project: Some(project),
            styles: vec!["Bold".into()],
            ..Default::default()
        };
        assert!(ok.validate().is_ok());
    }
}
