//! Command-line argument definitions for the Foundry CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, configuration file
//! selection, logging verbosity and per-run layout overrides.

use clap::Parser;

use foundry::config::{LayoutConfig, Orientation, SpacingPreset};

/// Command-line arguments for the Foundry layout tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input canvas (JSON)
    #[arg(help = "Path to the input file")]
    pub input: String,

    /// Path to the laid-out canvas (JSON)
    #[arg(short, long, default_value = "out.json")]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Flow direction (horizontal, vertical), overrides the config file
    #[arg(long)]
    pub orientation: Option<Orientation>,

    /// Container spacing (tight, standard, spacious), overrides the config file
    #[arg(long)]
    pub spacing: Option<SpacingPreset>,

    /// Use the row layout instead of the hierarchical one
    #[arg(long)]
    pub no_organize: bool,
}

impl Args {
    /// Applies the command-line overrides on top of a loaded layout config.
    pub fn apply_overrides(&self, layout: &mut LayoutConfig) {
        if let Some(orientation) = self.orientation {
            layout.set_orientation(orientation);
        }
        if let Some(spacing) = self.spacing {
            layout.set_spacing(spacing);
        }
        if self.no_organize {
            layout.set_organize(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["foundry", "plant.json"]);
        assert_eq!(args.input, "plant.json");
        assert_eq!(args.output, "out.json");
        assert_eq!(args.log_level, "info");
        assert!(args.config.is_none());

        let mut layout = LayoutConfig::default();
        args.apply_overrides(&mut layout);
        assert_eq!(layout, LayoutConfig::default());
    }

    #[test]
    fn test_overrides() {
        let args = Args::parse_from([
            "foundry",
            "plant.json",
            "--orientation",
            "vertical",
            "--spacing",
            "spacious",
            "--no-organize",
        ]);

        let mut layout = LayoutConfig::default();
        args.apply_overrides(&mut layout);
        assert_eq!(layout.orientation(), Orientation::Vertical);
        assert_eq!(layout.spacing(), SpacingPreset::Spacious);
        assert!(!layout.organize());
    }

    #[test]
    fn test_rejects_unknown_orientation() {
        let result = Args::try_parse_from(["foundry", "plant.json", "--orientation", "diagonal"]);
        assert!(result.is_err());
    }
}
