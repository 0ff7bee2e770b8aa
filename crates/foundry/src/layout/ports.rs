//! Port side selection and connector geometry.
//!
//! Sides are chosen from final node boxes only, so routing always runs after
//! composition (and again after avoidance moved anything).

use indexmap::IndexMap;
use log::debug;

use foundry_core::{
    canvas::Canvas,
    connection::{Connection, CubicCurve, Port, PortKind, Route, Side},
    geometry::{Bounds, Point},
    identifier::Id,
};

use crate::config::Orientation;

/// Cross-axis displacement, in multiples of the source extent, that still
/// counts as flowing straight ahead.
const FLOW_BAND: f32 = 1.5;
/// Control point distance as a share of the anchor distance.
const CONTROL_RATIO: f32 = 0.4;
/// Shortest control point distance.
const MIN_CONTROL_OFFSET: f32 = 40.0;

/// How exit and entry sides are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortRule {
    /// From the relative position of the two nodes.
    Adaptive,
    /// Always the flow direction: right to left, or bottom to top when vertical.
    Fixed,
}

/// Chooses the exit side on `source` and the entry side on `target`.
pub fn select_sides(
    source: Bounds,
    target: Bounds,
    orientation: Orientation,
    rule: PortRule,
) -> (Side, Side) {
    let d = target.center().sub_point(source.center());

    match (rule, orientation) {
        (PortRule::Fixed, Orientation::Horizontal) => (Side::Right, Side::Left),
        (PortRule::Fixed, Orientation::Vertical) => (Side::Bottom, Side::Top),
        (PortRule::Adaptive, Orientation::Horizontal) => {
            if d.y().abs() < FLOW_BAND * source.height() {
                if d.x() < 0.0 {
                    (Side::Left, Side::Right)
                } else {
                    (Side::Right, Side::Left)
                }
            } else if d.y() > 0.0 {
                (Side::Bottom, Side::Top)
            } else {
                (Side::Top, Side::Bottom)
            }
        }
        (PortRule::Adaptive, Orientation::Vertical) => {
            if d.x().abs() < FLOW_BAND * source.width() {
                if d.y() < 0.0 {
                    (Side::Top, Side::Bottom)
                } else {
                    (Side::Bottom, Side::Top)
                }
            } else if d.x() > 0.0 {
                (Side::Right, Side::Left)
            } else {
                (Side::Left, Side::Right)
            }
        }
    }
}

/// Midpoint of one side of `bounds`.
pub fn anchor(bounds: Bounds, side: Side) -> Point {
    let center = bounds.center();
    match side {
        Side::Top => center.with_y(bounds.min_y()),
        Side::Right => center.with_x(bounds.max_x()),
        Side::Bottom => center.with_y(bounds.max_y()),
        Side::Left => center.with_x(bounds.min_x()),
    }
}

/// Control point for an anchor on `side`, pushed out along the side normal.
fn control_point(anchor: Point, other: Point, side: Side) -> Point {
    let distance = if side.is_horizontal() {
        (other.x() - anchor.x()).abs()
    } else {
        (other.y() - anchor.y()).abs()
    };
    let offset = (CONTROL_RATIO * distance).max(MIN_CONTROL_OFFSET);
    anchor.add_point(side.outward_normal().scale(offset))
}

/// Routes one connection between two node boxes.
pub fn route_between(
    connection: Connection,
    source: Bounds,
    target: Bounds,
    orientation: Orientation,
    rule: PortRule,
) -> Route {
    let (exit_side, entry_side) = select_sides(source, target, orientation, rule);
    let start = anchor(source, exit_side);
    let end = anchor(target, entry_side);

    let curve = CubicCurve::new(
        start,
        control_point(start, end, exit_side),
        control_point(end, start, entry_side),
        end,
    );

    Route::new(
        connection,
        Port::new(exit_side, start, PortKind::Exit, connection.target()),
        Port::new(entry_side, end, PortKind::Entry, connection.source()),
        curve,
    )
}

/// Current box of every node, keyed by id.
pub fn node_boxes(canvas: &Canvas) -> IndexMap<Id, Bounds> {
    canvas
        .nodes()
        .map(|node| (node.id(), node.bounds()))
        .collect()
}

/// Routes every connection, rebuilding node ports and the canvas routes.
pub fn route_connections(
    canvas: &mut Canvas,
    connections: &[Connection],
    orientation: Orientation,
    rule: PortRule,
) {
    let boxes = node_boxes(canvas);
    let routes: Vec<Route> = connections
        .iter()
        .filter_map(|&connection| {
            let source = boxes.get(&connection.source())?;
            let target = boxes.get(&connection.target())?;
            Some(route_between(connection, *source, *target, orientation, rule))
        })
        .collect();

    let mut ports: IndexMap<Id, Vec<Port>> = IndexMap::new();
    for route in &routes {
        let connection = route.connection();
        ports
            .entry(connection.source())
            .or_default()
            .push(route.exit());
        ports
            .entry(connection.target())
            .or_default()
            .push(route.entry());
    }
    for node in canvas.nodes_mut() {
        node.set_ports(ports.swap_remove(&node.id()).unwrap_or_default());
    }

    debug!(routes = routes.len(), rule:?; "Routed connections");
    canvas.set_routes(routes);
}
