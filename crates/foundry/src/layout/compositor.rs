//! Recursive composition of the containment tree.
//!
//! Each sibling set is ranked, arranged in a local frame by [`arrange`], and
//! then moved into place by translating whole subtrees. Composition runs
//! bottom-up: nodes in machines, machines in factories, factories in
//! networks, networks on the canvas. A container's bounds are the padded
//! enclosure of its children, which centers it over them.

use log::{debug, trace};

use foundry_core::{
    canvas::{Canvas, Factory, Machine, Network},
    geometry::{Bounds, Insets, Point, Size},
};

use super::{
    axis::{Flow, Spacing},
    overlap::{self, GRID_COLUMNS},
    ranking::{Ranking, assign_ranks},
    scope::{Scope, ScopeEdges},
};
use crate::config::Orientation;

pub const MACHINE_PADDING: f32 = 55.0;
pub const FACTORY_PADDING: f32 = 75.0;
pub const NETWORK_PADDING: f32 = 100.0;

/// Orientation and sibling gaps for one nesting level.
#[derive(Debug, Clone, Copy)]
pub struct LevelMetrics {
    pub orientation: Orientation,
    pub spacing: Spacing,
}

/// Positions one sibling set in a local frame.
///
/// Ranks become columns along the primary axis. Inside a column, each item
/// targets the mean secondary center of its already placed predecessors, the
/// column is swept free of overlaps, then shifted rigidly so its mean center
/// matches the mean target. Disconnected items are tiled after the last column.
/// Returns top-left positions whose minimum corner is the origin.
pub fn arrange(
    sizes: &[Size],
    edges: &[(usize, usize)],
    ranking: &Ranking,
    metrics: LevelMetrics,
) -> Vec<Point> {
    let orientation = metrics.orientation;
    let gaps = orientation.flow_gaps(metrics.spacing);
    let extents: Vec<Flow> = sizes
        .iter()
        .map(|&size| orientation.flow_extent(size))
        .collect();

    let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); sizes.len()];
    for &(source, target) in edges {
        if source != target
            && source < sizes.len()
            && target < sizes.len()
            && !predecessors[target].contains(&source)
        {
            predecessors[target].push(source);
        }
    }

    let mut starts = vec![Flow::default(); sizes.len()];
    let mut centers: Vec<Option<f32>> = vec![None; sizes.len()];
    let mut cursor = 0.0_f32;
    let mut ranked_min_secondary: Option<f32> = None;

    let columns = ranking.columns();
    for column in &columns {
        let width = column
            .iter()
            .map(|&index| extents[index].primary)
            .fold(0.0_f32, f32::max);

        let mut targets: Vec<(usize, f32)> = column
            .iter()
            .map(|&index| (index, target_center(&predecessors[index], &centers)))
            .collect();
        targets.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));

        let entries: Vec<(f32, f32)> = targets
            .iter()
            .map(|&(index, target)| {
                let extent = extents[index].secondary;
                (target - extent / 2.0, extent)
            })
            .collect();
        let resolved = overlap::sweep(&entries, gaps.secondary);

        let count = targets.len() as f32;
        let mean_target = targets.iter().map(|(_, target)| target).sum::<f32>() / count;
        let mean_actual = targets
            .iter()
            .zip(&resolved)
            .map(|(&(index, _), start)| start + extents[index].secondary / 2.0)
            .sum::<f32>()
            / count;
        let shift = mean_target - mean_actual;

        for (&(index, _), start) in targets.iter().zip(&resolved) {
            let secondary = start + shift;
            let primary = cursor + (width - extents[index].primary) / 2.0;
            starts[index] = Flow::new(primary, secondary);
            centers[index] = Some(secondary + extents[index].secondary / 2.0);
            ranked_min_secondary =
                Some(ranked_min_secondary.map_or(secondary, |min| min.min(secondary)));
        }

        cursor += width + gaps.primary;
    }

    let disconnected = ranking.disconnected();
    if !disconnected.is_empty() {
        let origin = match ranked_min_secondary {
            Some(secondary) => Flow::new(cursor, secondary),
            None => Flow::default(),
        };
        let cell_extents: Vec<Flow> = disconnected.iter().map(|&index| extents[index]).collect();
        let cells = overlap::grid(&cell_extents, GRID_COLUMNS, gaps, origin);
        for (&index, cell) in disconnected.iter().zip(cells) {
            starts[index] = cell;
        }
    }

    let min_primary = starts
        .iter()
        .map(|s| s.primary)
        .fold(f32::INFINITY, f32::min);
    let min_secondary = starts
        .iter()
        .map(|s| s.secondary)
        .fold(f32::INFINITY, f32::min);

    starts
        .into_iter()
        .map(|start| {
            orientation.canvas_point(Flow::new(
                start.primary - min_primary,
                start.secondary - min_secondary,
            ))
        })
        .collect()
}

/// Mean secondary center of the placed predecessors, or 0 when there are none.
fn target_center(predecessors: &[usize], centers: &[Option<f32>]) -> f32 {
    let placed: Vec<f32> = predecessors
        .iter()
        .filter_map(|&index| centers[index])
        .collect();
    if placed.is_empty() {
        0.0
    } else {
        placed.iter().sum::<f32>() / placed.len() as f32
    }
}

/// Padded enclosure of `children`, or a padding-only box at the origin when empty.
pub fn padded_enclosure(children: impl IntoIterator<Item = Bounds>, padding: f32) -> Bounds {
    Bounds::enclosing(children)
        .unwrap_or_else(|| Bounds::new_from_center(Point::default(), Size::default()))
        .add_padding(Insets::uniform(padding))
}

/// Composes the whole canvas, bottom-up.
pub struct Compositor<'a> {
    scopes: &'a ScopeEdges,
    orientation: Orientation,
    node_spacing: Spacing,
    container_spacing: Spacing,
    network_spacing: Spacing,
}

impl<'a> Compositor<'a> {
    pub fn new(
        scopes: &'a ScopeEdges,
        orientation: Orientation,
        node_spacing: Spacing,
        container_spacing: Spacing,
        network_spacing: Spacing,
    ) -> Self {
        Self {
            scopes,
            orientation,
            node_spacing,
            container_spacing,
            network_spacing,
        }
    }

    /// Positions every node and sets every container's bounds.
    pub fn compose(&self, canvas: &mut Canvas) {
        for (n, network) in canvas.networks_mut().iter_mut().enumerate() {
            for (f, factory) in network.factories_mut().iter_mut().enumerate() {
                for (m, machine) in factory.machines_mut().iter_mut().enumerate() {
                    self.compose_machine(machine, Scope::Machine(n, f, m));
                }
                self.compose_factory(factory, Scope::Factory(n, f));
            }
            self.compose_network(network, Scope::Network(n));
        }
        self.compose_canvas(canvas);
    }

    /// Ranks and arranges one sibling set.
    fn place(&self, sizes: &[Size], scope: Scope, spacing: Spacing) -> Vec<Point> {
        let edges = self.scopes.edges(scope);
        let ranking = assign_ranks(sizes.len(), &edges);
        debug!(
            scope:?,
            siblings = sizes.len(),
            edges = edges.len(),
            ranks = ranking.rank_count();
            "Arranging sibling set"
        );
        arrange(
            sizes,
            &edges,
            &ranking,
            LevelMetrics {
                orientation: self.orientation,
                spacing,
            },
        )
    }

    fn compose_machine(&self, machine: &mut Machine, scope: Scope) {
        let sizes: Vec<Size> = machine.nodes().iter().map(|node| node.size()).collect();
        let positions = self.place(&sizes, scope, self.node_spacing);

        for (node, position) in machine.nodes_mut().iter_mut().zip(positions) {
            trace!(node = node.id().to_string(), position:?; "Placed node");
            node.set_position(position);
        }

        let bounds = padded_enclosure(
            machine.nodes().iter().map(|node| node.bounds()),
            MACHINE_PADDING,
        );
        machine.set_bounds(bounds);
    }

    fn compose_factory(&self, factory: &mut Factory, scope: Scope) {
        let current: Vec<Bounds> = factory
            .machines()
            .iter()
            .map(|machine| machine.bounds().unwrap_or_default())
            .collect();
        let sizes: Vec<Size> = current.iter().map(|bounds| bounds.to_size()).collect();
        let positions = self.place(&sizes, scope, self.container_spacing);

        for ((machine, bounds), position) in factory
            .machines_mut()
            .iter_mut()
            .zip(&current)
            .zip(positions)
        {
            machine.translate(position.sub_point(bounds.min_point()));
        }

        let bounds = padded_enclosure(
            factory.machines().iter().filter_map(Machine::bounds),
            FACTORY_PADDING,
        );
        factory.set_bounds(bounds);
    }

    fn compose_network(&self, network: &mut Network, scope: Scope) {
        let current: Vec<Bounds> = network
            .factories()
            .iter()
            .map(|factory| factory.bounds().unwrap_or_default())
            .collect();
        let sizes: Vec<Size> = current.iter().map(|bounds| bounds.to_size()).collect();
        let positions = self.place(&sizes, scope, self.container_spacing);

        for ((factory, bounds), position) in network
            .factories_mut()
            .iter_mut()
            .zip(&current)
            .zip(positions)
        {
            factory.translate(position.sub_point(bounds.min_point()));
        }

        let bounds = padded_enclosure(
            network.factories().iter().filter_map(Factory::bounds),
            NETWORK_PADDING,
        );
        network.set_bounds(bounds);
    }

    fn compose_canvas(&self, canvas: &mut Canvas) {
        let current: Vec<Bounds> = canvas
            .networks()
            .iter()
            .map(|network| network.bounds().unwrap_or_default())
            .collect();
        let sizes: Vec<Size> = current.iter().map(|bounds| bounds.to_size()).collect();
        let positions = self.place(&sizes, Scope::Canvas, self.network_spacing);

        for ((network, bounds), position) in canvas
            .networks_mut()
            .iter_mut()
            .zip(&current)
            .zip(positions)
        {
            network.translate(position.sub_point(bounds.min_point()));
        }

        let bounds = Bounds::enclosing(canvas.networks().iter().filter_map(Network::bounds))
            .unwrap_or_default();
        canvas.set_bounds(bounds);
    }
}

/// Recomputes container bounds bottom-up from current node positions.
///
/// Empty containers keep the bounds they already have, or get a padding-only
/// box at the origin.
pub fn refit_bounds(canvas: &mut Canvas) {
    for network in canvas.networks_mut() {
        for factory in network.factories_mut() {
            for machine in factory.machines_mut() {
                let nodes = machine.nodes().iter().map(|node| node.bounds());
                if let Some(bounds) = refit(nodes, machine.bounds(), MACHINE_PADDING) {
                    machine.set_bounds(bounds);
                }
            }
            let machines = factory.machines().iter().filter_map(Machine::bounds);
            if let Some(bounds) = refit(machines, factory.bounds(), FACTORY_PADDING) {
                factory.set_bounds(bounds);
            }
        }
        let factories = network.factories().iter().filter_map(Factory::bounds);
        if let Some(bounds) = refit(factories, network.bounds(), NETWORK_PADDING) {
            network.set_bounds(bounds);
        }
    }

    let bounds = Bounds::enclosing(canvas.networks().iter().filter_map(Network::bounds))
        .unwrap_or_default();
    canvas.set_bounds(bounds);
}

/// New bounds for a container, or `None` to keep what it has.
fn refit(
    children: impl IntoIterator<Item = Bounds>,
    existing: Option<Bounds>,
    padding: f32,
) -> Option<Bounds> {
    let mut children = children.into_iter().peekable();
    if children.peek().is_none() && existing.is_some() {
        return None;
    }
    Some(padded_enclosure(children, padding))
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;
    use foundry_core::{
        canvas::{Node, NodeKind},
        connection::Connection,
        identifier::Id,
    };

    use super::*;

    const NODE: Size = Size::new(250.0, 120.0);

    fn horizontal(spacing: Spacing) -> LevelMetrics {
        LevelMetrics {
            orientation: Orientation::Horizontal,
            spacing,
        }
    }

    fn node_spacing() -> Spacing {
        Spacing::new(60.0, 110.0)
    }

    fn arranged(count: usize, edges: &[(usize, usize)], metrics: LevelMetrics) -> Vec<Bounds> {
        let sizes = vec![NODE; count];
        let ranking = assign_ranks(count, edges);
        arrange(&sizes, edges, &ranking, metrics)
            .into_iter()
            .map(|position| Bounds::new_from_top_left(position, NODE))
            .collect()
    }

    #[test]
    fn test_linear_chain_runs_along_flow() {
        let boxes = arranged(3, &[(0, 1), (1, 2)], horizontal(node_spacing()));

        assert_eq!(boxes[0].min_point(), Point::new(0.0, 0.0));
        assert_eq!(boxes[1].min_point(), Point::new(310.0, 0.0));
        assert_eq!(boxes[2].min_point(), Point::new(620.0, 0.0));
    }

    #[test]
    fn test_vertical_chain_runs_down() {
        let metrics = LevelMetrics {
            orientation: Orientation::Vertical,
            spacing: node_spacing(),
        };
        let boxes = arranged(2, &[(0, 1)], metrics);

        assert_eq!(boxes[0].min_point(), Point::new(0.0, 0.0));
        assert_eq!(boxes[1].min_point(), Point::new(0.0, 230.0));
    }

    #[test]
    fn test_fan_out_fan_in_centers() {
        let edges = [(0, 1), (0, 2), (0, 3), (1, 4), (2, 4), (3, 4)];
        let boxes = arranged(5, &edges, horizontal(node_spacing()));

        // Parallel column stacked with the node gap.
        assert_eq!(boxes[2].min_y() - boxes[1].max_y(), 110.0);
        assert_eq!(boxes[3].min_y() - boxes[2].max_y(), 110.0);

        // Source and sink centered on the column.
        let column_center = (boxes[1].center().y() + boxes[3].center().y()) / 2.0;
        assert!(approx_eq!(f32, boxes[0].center().y(), column_center, epsilon = 0.01));
        assert!(approx_eq!(f32, boxes[4].center().y(), column_center, epsilon = 0.01));
    }

    #[test]
    fn test_disconnected_goes_to_grid_after_ranks() {
        // Five connected nodes and one loner.
        let edges = [(0, 1), (1, 2), (2, 3), (3, 4)];
        let boxes = arranged(6, &edges, horizontal(node_spacing()));

        let last_ranked = boxes[4];
        assert_eq!(boxes[5].min_x(), last_ranked.max_x() + 60.0);
        for ranked in &boxes[..5] {
            assert!(!ranked.intersects(&boxes[5]));
        }
    }

    #[test]
    fn test_all_disconnected_tiles_from_origin() {
        let boxes = arranged(5, &[], horizontal(node_spacing()));

        assert_eq!(boxes[0].min_point(), Point::new(0.0, 0.0));
        assert_eq!(boxes[3].min_point(), Point::new(930.0, 0.0));
        assert_eq!(boxes[4].min_point(), Point::new(0.0, 230.0));
    }

    #[test]
    fn test_empty_set() {
        let ranking = assign_ranks(0, &[]);
        assert!(arrange(&[], &[], &ranking, horizontal(node_spacing())).is_empty());
    }

    fn two_machine_canvas() -> Canvas {
        let a = Id::new("cmp_a");
        let b = Id::new("cmp_b");
        let c = Id::new("cmp_c");
        Canvas::new().with_network(
            Network::new("cmp_net").with_factory(
                Factory::new("cmp_fab")
                    .with_machine(
                        Machine::new("cmp_m1")
                            .with_node(Node::new("cmp_a", NodeKind::Input).with_outputs([b]))
                            .with_node(Node::new("cmp_b", NodeKind::Process).with_outputs([c])),
                    )
                    .with_machine(
                        Machine::new("cmp_m2").with_node(Node::new("cmp_c", NodeKind::Output)),
                    )
                    .with_machine(Machine::new("cmp_empty")),
            ),
        )
    }

    fn composed(canvas: &mut Canvas) {
        let connections: Vec<Connection> = canvas.resolve_connections();
        let scopes = ScopeEdges::project(canvas, &connections);
        Compositor::new(
            &scopes,
            Orientation::Horizontal,
            node_spacing(),
            Spacing::new(150.0, 190.0),
            Spacing::new(190.0, 250.0),
        )
        .compose(canvas);
    }

    #[test]
    fn test_compose_contains_and_separates() {
        let mut canvas = two_machine_canvas();
        composed(&mut canvas);

        let factory = &canvas.networks()[0].factories()[0];
        let factory_bounds = factory.bounds().unwrap();
        let machines: Vec<Bounds> = factory
            .machines()
            .iter()
            .map(|m| m.bounds().unwrap())
            .collect();

        for (machine, bounds) in factory.machines().iter().zip(&machines) {
            let padded = bounds.add_padding(Insets::uniform(FACTORY_PADDING));
            assert!(factory_bounds.contains(&padded));
            for node in machine.nodes() {
                let padded = node.bounds().add_padding(Insets::uniform(MACHINE_PADDING));
                assert!(bounds.contains(&padded));
            }
        }
        for i in 0..machines.len() {
            for j in (i + 1)..machines.len() {
                assert!(machines[i].clearance(&machines[j]) >= 150.0 - 0.01);
            }
        }

        // Empty machine is a padding-only box.
        assert_eq!(machines[2].width(), 2.0 * MACHINE_PADDING);
        assert_eq!(canvas.bounds().unwrap().min_point(), Point::new(0.0, 0.0));
    }

    #[test]
    fn test_machine_ranked_after_its_upstream() {
        let mut canvas = two_machine_canvas();
        composed(&mut canvas);

        let factory = &canvas.networks()[0].factories()[0];
        let upstream = factory.machines()[0].bounds().unwrap();
        let downstream = factory.machines()[1].bounds().unwrap();
        assert!(downstream.min_x() >= upstream.max_x() + 150.0 - 0.01);
    }

    fn first_machine_bounds(canvas: &Canvas) -> Bounds {
        let machines = canvas.networks()[0].factories()[0].machines();
        machines[0].bounds().unwrap()
    }

    #[test]
    fn test_refit_follows_moved_nodes() {
        let mut canvas = two_machine_canvas();
        composed(&mut canvas);

        let before = first_machine_bounds(&canvas);
        let factory = &mut canvas.networks_mut()[0].factories_mut()[0];
        for node in factory.machines_mut()[0].nodes_mut() {
            node.translate(Point::new(0.0, 40.0));
        }
        refit_bounds(&mut canvas);

        let after = first_machine_bounds(&canvas);
        assert_eq!(after, before.translate(Point::new(0.0, 40.0)));
        assert!(canvas.bounds().unwrap().contains(&after));
    }
}
