//! Layout engine factory module
//!
//! This module selects and configures the engine that lays out a canvas.
//! Two engines exist:
//!
//! - [`EngineKind::Organize`]: the hierarchical pipeline (ranking, composition,
//!   overlap resolution, port selection and connector avoidance).
//! - [`EngineKind::Simple`]: a non-topological row layout used when
//!   organizing is switched off.
//!
//! Engines are created through [`EngineBuilder`].

mod organize;
mod simple;

use foundry_core::{canvas::Canvas, connection::Connection};

use super::axis::Spacing;
use crate::{
    config::{Orientation, SpacingPreset},
    error::FoundryError,
};

/// Gap between nodes in a machine. Not affected by the spacing preset.
const NODE_SPACING: (f32, f32) = (60.0, 110.0);
/// Extra gap between networks on top of the container gap.
const NETWORK_EXTRA: (f32, f32) = (40.0, 60.0);

/// Which engine lays out the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineKind {
    Organize,
    Simple,
}

/// Interface shared by layout engines.
pub trait LayoutEngine {
    /// Lays out `canvas` in place.
    ///
    /// `connections` are the canvas' resolved connections, free of dangling
    /// references. On return every node has a position and ports, every
    /// container has bounds and the canvas carries one route per connection.
    ///
    /// # Errors
    ///
    /// Returns `FoundryError::Layout` if the engine cannot produce a layout.
    fn calculate(
        &self,
        canvas: &mut Canvas,
        connections: &[Connection],
    ) -> Result<(), FoundryError>;
}

/// Builder for creating and configuring layout engines.
#[derive(Debug, Clone)]
pub struct EngineBuilder {
    orientation: Orientation,
    node_spacing: Spacing,
    container_spacing: Spacing,
    network_spacing: Spacing,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new().with_spacing_preset(SpacingPreset::default())
    }
}

impl EngineBuilder {
    /// Create a builder with fixed node spacing and zero container spacing.
    pub fn new() -> Self {
        Self {
            orientation: Orientation::default(),
            node_spacing: Spacing::new(NODE_SPACING.0, NODE_SPACING.1),
            container_spacing: Spacing::new(0.0, 0.0),
            network_spacing: Spacing::new(0.0, 0.0),
        }
    }

    /// Set the flow direction used at every nesting level
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Set the gaps between nodes inside a machine
    pub fn with_node_spacing(mut self, spacing: Spacing) -> Self {
        self.node_spacing = spacing;
        self
    }

    /// Set container and network gaps from a named preset
    pub fn with_spacing_preset(mut self, preset: SpacingPreset) -> Self {
        let (horizontal, vertical) = preset.container_gaps();
        self.container_spacing = Spacing::new(horizontal, vertical);
        self.network_spacing = self
            .container_spacing
            .widen(NETWORK_EXTRA.0, NETWORK_EXTRA.1);
        self
    }

    /// Build an engine of the requested kind with the configured options
    pub fn build(&self, kind: EngineKind) -> Box<dyn LayoutEngine> {
        match kind {
            EngineKind::Organize => Box::new(organize::Engine::new(
                self.orientation,
                self.node_spacing,
                self.container_spacing,
                self.network_spacing,
            )),
            EngineKind::Simple => Box::new(simple::Engine::new(self.orientation)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_sets_network_gap() {
        let builder = EngineBuilder::new().with_spacing_preset(SpacingPreset::Tight);

        assert_eq!(builder.container_spacing, Spacing::new(60.0, 110.0));
        assert_eq!(builder.network_spacing, Spacing::new(100.0, 170.0));
        assert_eq!(builder.node_spacing, Spacing::new(60.0, 110.0));
    }

    #[test]
    fn test_default_uses_standard_preset() {
        let builder = EngineBuilder::default();
        assert_eq!(builder.container_spacing, Spacing::new(150.0, 190.0));
        assert_eq!(builder.network_spacing, Spacing::new(190.0, 250.0));
    }

    #[test]
    fn test_engines_handle_empty_canvas() {
        let builder = EngineBuilder::default();
        for kind in [EngineKind::Organize, EngineKind::Simple] {
            let mut canvas = Canvas::new();
            builder.build(kind).calculate(&mut canvas, &[]).unwrap();
            assert!(canvas.routes().is_empty());
        }
    }
}
