//! Hierarchical layout engine.
//!
//! Runs the full pipeline: scope projection, bottom-up composition, routing,
//! connector avoidance, container refit and a final routing.

use log::{debug, info};

use foundry_core::{canvas::Canvas, connection::Connection};

use crate::{
    config::Orientation,
    error::FoundryError,
    layout::{
        avoidance::{self, SiblingGaps},
        axis::Spacing,
        compositor::{self, Compositor},
        engines::LayoutEngine,
        ports::{self, PortRule},
        scope::ScopeEdges,
    },
};

/// Hierarchical engine implementing the [`LayoutEngine`] trait
#[derive(Debug, Clone)]
pub struct Engine {
    orientation: Orientation,
    node_spacing: Spacing,
    container_spacing: Spacing,
    network_spacing: Spacing,
}

impl Engine {
    pub fn new(
        orientation: Orientation,
        node_spacing: Spacing,
        container_spacing: Spacing,
        network_spacing: Spacing,
    ) -> Self {
        Self {
            orientation,
            node_spacing,
            container_spacing,
            network_spacing,
        }
    }
}

impl LayoutEngine for Engine {
    fn calculate(
        &self,
        canvas: &mut Canvas,
        connections: &[Connection],
    ) -> Result<(), FoundryError> {
        let scopes = ScopeEdges::project(canvas, connections);

        Compositor::new(
            &scopes,
            self.orientation,
            self.node_spacing,
            self.container_spacing,
            self.network_spacing,
        )
        .compose(canvas);
        debug!("Composition finished");

        ports::route_connections(canvas, connections, self.orientation, PortRule::Adaptive);

        let gaps = SiblingGaps::new(self.container_spacing, self.network_spacing);
        let report =
            avoidance::avoid_collisions(canvas, connections, &scopes, self.orientation, gaps);
        if report.unresolved > 0 {
            info!(unresolved = report.unresolved; "Some connectors still cross nodes");
        }

        compositor::refit_bounds(canvas);
        ports::route_connections(canvas, connections, self.orientation, PortRule::Adaptive);

        Ok(())
    }
}
