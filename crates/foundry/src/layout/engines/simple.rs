//! Row layout used when organizing is switched off.
//!
//! When no node has been placed yet, nodes are laid out in declaration
//! order: one row per machine, rows stacked across the flow, with a little
//! extra room between factories. Canvases that already carry positions keep
//! them. Either way containers are refit and connections get flow-direction
//! ports.

use log::debug;

use foundry_core::{
    canvas::Canvas,
    connection::Connection,
    geometry::Point,
};

use crate::{
    config::Orientation,
    error::FoundryError,
    layout::{
        axis::Flow,
        compositor,
        engines::LayoutEngine,
        ports::{self, PortRule},
    },
};

/// Top-left of the first row.
const ORIGIN: Point = Point::new(80.0, 130.0);
/// Gap between nodes in a row.
const NODE_GAP: f32 = 80.0;
/// Gap after the tallest node of a row.
const ROW_GAP: f32 = 80.0;
/// Smallest distance between the starts of two rows.
const MIN_ROW_ADVANCE: f32 = 200.0;
/// Extra distance before each factory after the first.
const FACTORY_GAP: f32 = 60.0;

/// Row engine implementing the [`LayoutEngine`] trait
#[derive(Debug, Clone)]
pub struct Engine {
    orientation: Orientation,
}

impl Engine {
    pub fn new(orientation: Orientation) -> Self {
        Self { orientation }
    }

    fn place_rows(&self, canvas: &mut Canvas) {
        let origin = self.orientation.flow_point(ORIGIN);
        let mut row = origin.secondary;
        let mut first_factory = true;

        for network in canvas.networks_mut() {
            for factory in network.factories_mut() {
                if !first_factory {
                    row += FACTORY_GAP;
                }
                first_factory = false;

                for machine in factory.machines_mut() {
                    let mut cursor = origin.primary;
                    let mut deepest = 0.0_f32;
                    for node in machine.nodes_mut() {
                        let extent = self.orientation.flow_extent(node.size());
                        node.set_position(self.orientation.canvas_point(Flow::new(cursor, row)));
                        cursor += extent.primary + NODE_GAP;
                        deepest = deepest.max(extent.secondary);
                    }
                    row += MIN_ROW_ADVANCE.max(deepest + ROW_GAP);
                }
            }
        }
    }
}

impl LayoutEngine for Engine {
    fn calculate(
        &self,
        canvas: &mut Canvas,
        connections: &[Connection],
    ) -> Result<(), FoundryError> {
        if canvas.nodes().all(|node| node.position().is_zero()) {
            debug!("No explicit positions, placing nodes in rows");
            self.place_rows(canvas);
        } else {
            debug!("Keeping explicit node positions");
        }

        compositor::refit_bounds(canvas);
        ports::route_connections(canvas, connections, self.orientation, PortRule::Fixed);

        Ok(())
    }
}
