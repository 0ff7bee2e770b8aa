//! Configuration types for Foundry layout.
//!
//! This module provides the configuration structures that steer a layout
//! run. All types implement [`serde::Deserialize`] so they can be loaded from
//! external sources, and every field has a default.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration root.
//! - [`LayoutConfig`] - Flow [`Orientation`], container [`SpacingPreset`] and
//!   the organize toggle.
//!
//! # Example
//!
//! ```
//! # use foundry::config::{AppConfig, Orientation, SpacingPreset};
//! let config = AppConfig::default();
//! assert_eq!(config.layout().orientation(), Orientation::Horizontal);
//! assert_eq!(config.layout().spacing(), SpacingPreset::Standard);
//! assert!(config.layout().organize());
//! ```

use std::{fmt, str::FromStr};

use serde::Deserialize;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the specified layout configuration.
    pub fn new(layout: LayoutConfig) -> Self {
        Self { layout }
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the layout configuration for in-place overrides.
    pub fn layout_mut(&mut self) -> &mut LayoutConfig {
        &mut self.layout
    }
}

/// Options consumed by the layout engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Flow direction, applied identically at every nesting level.
    orientation: Orientation,

    /// Spacing between containers. Node spacing is fixed.
    spacing: SpacingPreset,

    /// When false the simple row engine runs instead of the hierarchical one.
    organize: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            orientation: Orientation::default(),
            spacing: SpacingPreset::default(),
            organize: true,
        }
    }
}

impl LayoutConfig {
    /// Creates a new [`LayoutConfig`].
    pub fn new(orientation: Orientation, spacing: SpacingPreset, organize: bool) -> Self {
        Self {
            orientation,
            spacing,
            organize,
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn spacing(&self) -> SpacingPreset {
        self.spacing
    }

    pub fn organize(&self) -> bool {
        self.organize
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }

    pub fn set_spacing(&mut self, spacing: SpacingPreset) {
        self.spacing = spacing;
    }

    pub fn set_organize(&mut self, organize: bool) {
        self.organize = organize;
    }
}

/// Direction in which connections flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Left to right.
    #[default]
    Horizontal,
    /// Top to bottom.
    Vertical,
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "horizontal" => Ok(Orientation::Horizontal),
            "vertical" => Ok(Orientation::Vertical),
            _ => Err(format!(
                "Unknown orientation `{s}` (expected `horizontal` or `vertical`)"
            )),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Horizontal => write!(f, "horizontal"),
            Orientation::Vertical => write!(f, "vertical"),
        }
    }
}

/// Named scale for the spacing between containers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpacingPreset {
    Tight,
    #[default]
    Standard,
    Spacious,
}

impl SpacingPreset {
    /// Horizontal and vertical gap between sibling factories and machines, in pixels.
    pub fn container_gaps(self) -> (f32, f32) {
        match self {
            SpacingPreset::Tight => (60.0, 110.0),
            SpacingPreset::Standard => (150.0, 190.0),
            SpacingPreset::Spacious => (190.0, 250.0),
        }
    }
}

impl FromStr for SpacingPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tight" => Ok(SpacingPreset::Tight),
            "standard" => Ok(SpacingPreset::Standard),
            "spacious" => Ok(SpacingPreset::Spacious),
            _ => Err(format!(
                "Unknown spacing preset `{s}` (expected `tight`, `standard` or `spacious`)"
            )),
        }
    }
}

impl fmt::Display for SpacingPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpacingPreset::Tight => write!(f, "tight"),
            SpacingPreset::Standard => write!(f, "standard"),
            SpacingPreset::Spacious => write!(f, "spacious"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_layout_section_keeps_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{ "layout": { "orientation": "vertical" } }"#).unwrap();

        assert_eq!(config.layout().orientation(), Orientation::Vertical);
        assert_eq!(config.layout().spacing(), SpacingPreset::Standard);
        assert!(config.layout().organize());
    }

    #[test]
    fn test_empty_config_is_default() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(*config.layout(), LayoutConfig::default());
    }

    #[test]
    fn test_unknown_preset_is_rejected() {
        let result: Result<AppConfig, _> =
            serde_json::from_str(r#"{ "layout": { "spacing": "roomy" } }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_str() {
        assert_eq!("Vertical".parse(), Ok(Orientation::Vertical));
        assert_eq!("tight".parse(), Ok(SpacingPreset::Tight));
        assert!("diagonal".parse::<Orientation>().is_err());
        assert!("cramped".parse::<SpacingPreset>().is_err());
    }

    #[test]
    fn test_container_gaps_grow_with_preset() {
        let tight = SpacingPreset::Tight.container_gaps();
        let standard = SpacingPreset::Standard.container_gaps();
        let spacious = SpacingPreset::Spacious.container_gaps();

        assert!(tight.0 < standard.0 && standard.0 < spacious.0);
        assert!(tight.1 < standard.1 && standard.1 < spacious.1);
    }
}
