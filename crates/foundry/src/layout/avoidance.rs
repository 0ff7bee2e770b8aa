//! Post-layout connector avoidance.
//!
//! Connector curves may cross nodes they do not connect. This pass flattens
//! each curve, tests it against every other node box grown by a clearance
//! margin, and nudges the offending node's whole machine across the flow.
//! A nudge is taken only if the machine, its factory and its network keep
//! their distance from their siblings; otherwise the opposite direction is
//! tried before the collision is left alone.
//!
//! It is a bounded fixed-point search: at most [`MAX_PASSES`] passes, and no
//! machine drifts further than [`MAX_DISPLACEMENT`] from where the compositor
//! put it. Residual collisions are accepted.

use indexmap::IndexMap;
use log::{debug, trace};

use foundry_core::{
    canvas::{Canvas, Machine},
    connection::Connection,
    geometry::{Bounds, Insets, Point},
    identifier::Id,
};

use super::{
    axis::Spacing,
    compositor::{self, FACTORY_PADDING, NETWORK_PADDING},
    ports::{self, PortRule},
    scope::ScopeEdges,
};
use crate::config::Orientation;

/// Clearance kept between a connector and a node it does not touch.
pub const CLEARANCE: f32 = 20.0;
/// Upper bound on passes over all connections.
pub const MAX_PASSES: usize = 6;
/// Largest accumulated nudge of one machine.
pub const MAX_DISPLACEMENT: f32 = 400.0;
/// Polyline segments per flattened curve.
const CURVE_SEGMENTS: usize = 32;
/// Extra distance so a nudged box does not end up touching the curve.
const NUDGE_MARGIN: f32 = 1.0;
/// Rounding slack when comparing sibling clearances.
const GAP_TOLERANCE: f32 = 0.01;

type MachineKey = (usize, usize, usize);

/// Smallest distance kept between sibling containers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SiblingGaps {
    /// Between machines of one factory and between factories of one network.
    pub container: f32,
    /// Between networks.
    pub network: f32,
}

impl SiblingGaps {
    pub fn new(container_spacing: Spacing, network_spacing: Spacing) -> Self {
        Self {
            container: container_spacing.narrowest(),
            network: network_spacing.narrowest(),
        }
    }
}

/// Summary of one avoidance run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AvoidanceReport {
    /// Passes executed.
    pub passes: usize,
    /// Machine nudges applied.
    pub nudges: usize,
    /// Node/connector collisions left when the pass finished.
    pub unresolved: usize,
}

/// Nudges machines until no connector crosses a foreign node, or the budget runs out.
///
/// Container bounds are refit before the first pass and after every nudge.
pub fn avoid_collisions(
    canvas: &mut Canvas,
    connections: &[Connection],
    scopes: &ScopeEdges,
    orientation: Orientation,
    gaps: SiblingGaps,
) -> AvoidanceReport {
    let mut report = AvoidanceReport::default();
    let mut offsets: IndexMap<MachineKey, f32> = IndexMap::new();

    compositor::refit_bounds(canvas);
    let mut boxes = ports::node_boxes(canvas);

    for pass in 1..=MAX_PASSES {
        report.passes = pass;
        let mut nudged = 0;

        for &connection in connections {
            let Some(mut points) = flatten_route(&boxes, connection, orientation) else {
                continue;
            };
            let source_machine = machine_of(scopes, connection.source());
            let target_machine = machine_of(scopes, connection.target());

            for index in 0..boxes.len() {
                let Some((&id, &bounds)) = boxes.get_index(index) else {
                    continue;
                };
                if connection.touches(id) {
                    continue;
                }
                let Some(machine) = machine_of(scopes, id) else {
                    continue;
                };
                let zone = bounds.add_padding(Insets::uniform(CLEARANCE));
                if !hits(&points, zone) {
                    continue;
                }
                if source_machine == Some(machine) && target_machine == Some(machine) {
                    trace!(node = id.to_string(); "Nudge would move both endpoints, skipping");
                    continue;
                }
                let Some(candidates) = clearing_deltas(&points, zone, orientation) else {
                    continue;
                };
                let offset = offsets.get(&machine).copied().unwrap_or_default();
                let accepted = candidates.into_iter().find(|&delta| {
                    (offset + delta).abs() <= MAX_DISPLACEMENT
                        && keeps_siblings_clear(
                            canvas,
                            machine,
                            orientation.secondary_offset(delta),
                            gaps,
                        )
                });
                let Some(delta) = accepted else {
                    trace!(node = id.to_string(), offset; "Nudge blocked");
                    continue;
                };

                nudge_machine(canvas, machine, orientation.secondary_offset(delta));
                compositor::refit_bounds(canvas);
                boxes = ports::node_boxes(canvas);
                offsets.insert(machine, offset + delta);
                nudged += 1;
                trace!(node = id.to_string(), delta; "Nudged machine");

                match flatten_route(&boxes, connection, orientation) {
                    Some(updated) => points = updated,
                    None => break,
                }
            }
        }

        report.nudges += nudged;
        if nudged == 0 {
            break;
        }
    }

    report.unresolved = count_collisions(canvas, connections, orientation);
    debug!(
        passes = report.passes,
        nudges = report.nudges,
        unresolved = report.unresolved;
        "Connector avoidance finished"
    );
    report
}

fn machine_of(scopes: &ScopeEdges, id: Id) -> Option<MachineKey> {
    scopes.lineage(id).map(|lineage| lineage.machine_key())
}

/// Flattened curve of a connection, from the adaptive port rule.
fn flatten_route(
    boxes: &IndexMap<Id, Bounds>,
    connection: Connection,
    orientation: Orientation,
) -> Option<Vec<Point>> {
    let source = boxes.get(&connection.source())?;
    let target = boxes.get(&connection.target())?;
    let route = ports::route_between(
        connection,
        *source,
        *target,
        orientation,
        PortRule::Adaptive,
    );
    Some(route.curve().flatten(CURVE_SEGMENTS))
}

/// Returns true when any polyline segment enters `zone`.
fn hits(points: &[Point], zone: Bounds) -> bool {
    points
        .windows(2)
        .any(|segment| zone.clip_segment(segment[0], segment[1]).is_some())
}

/// Secondary-axis moves that take `zone` clear of the polyline, shorter first.
///
/// Only the stretch of the polyline inside the zone's primary range matters,
/// since the nudge never changes that range.
fn clearing_deltas(points: &[Point], zone: Bounds, orientation: Orientation) -> Option<[f32; 2]> {
    let (lo, hi) = orientation.primary_range(zone);
    let (zone_min, zone_max) = orientation.secondary_range(zone);

    let mut span: Option<(f32, f32)> = None;
    let mut include = |value: f32| {
        span = Some(span.map_or((value, value), |(min, max)| {
            (min.min(value), max.max(value))
        }));
    };

    for segment in points.windows(2) {
        let a = orientation.flow_point(segment[0]);
        let b = orientation.flow_point(segment[1]);
        let dp = b.primary - a.primary;
        if dp == 0.0 {
            if a.primary >= lo && a.primary <= hi {
                include(a.secondary);
                include(b.secondary);
            }
            continue;
        }
        let t_lo = (lo - a.primary) / dp;
        let t_hi = (hi - a.primary) / dp;
        let t0 = t_lo.min(t_hi).max(0.0);
        let t1 = t_lo.max(t_hi).min(1.0);
        if t0 > t1 {
            continue;
        }
        let ds = b.secondary - a.secondary;
        include(a.secondary + ds * t0);
        include(a.secondary + ds * t1);
    }

    let (curve_min, curve_max) = span?;
    let down = curve_max - zone_min + NUDGE_MARGIN;
    let up = curve_min - zone_max - NUDGE_MARGIN;
    Some(if down <= -up { [down, up] } else { [up, down] })
}

/// Checks that moving a machine by `offset` keeps every sibling at the level
/// gap, at the machine, factory and network levels.
///
/// A pair that already sits closer than the gap may stay that close, but the
/// move must not bring it any closer.
fn keeps_siblings_clear(
    canvas: &Canvas,
    (n, f, m): MachineKey,
    offset: Point,
    gaps: SiblingGaps,
) -> bool {
    let Some(network) = canvas.networks().get(n) else {
        return false;
    };
    let Some(factory) = network.factories().get(f) else {
        return false;
    };
    let Some(machine) = factory.machines().get(m).and_then(Machine::bounds) else {
        return false;
    };
    let (Some(factory_before), Some(network_before)) = (factory.bounds(), network.bounds()) else {
        return false;
    };

    let moved = machine.translate(offset);
    let machines: Vec<Bounds> = factory
        .machines()
        .iter()
        .enumerate()
        .filter(|&(index, _)| index != m)
        .filter_map(|(_, other)| other.bounds())
        .collect();
    if !stays_clear(machine, moved, &machines, gaps.container) {
        return false;
    }

    let factory_after = compositor::padded_enclosure(
        machines.iter().copied().chain([moved]),
        FACTORY_PADDING,
    );
    let factories: Vec<Bounds> = network
        .factories()
        .iter()
        .enumerate()
        .filter(|&(index, _)| index != f)
        .filter_map(|(_, other)| other.bounds())
        .collect();
    if !stays_clear(factory_before, factory_after, &factories, gaps.container) {
        return false;
    }

    let network_after = compositor::padded_enclosure(
        factories.iter().copied().chain([factory_after]),
        NETWORK_PADDING,
    );
    let networks: Vec<Bounds> = canvas
        .networks()
        .iter()
        .enumerate()
        .filter(|&(index, _)| index != n)
        .filter_map(|(_, other)| other.bounds())
        .collect();
    stays_clear(network_before, network_after, &networks, gaps.network)
}

fn stays_clear(before: Bounds, after: Bounds, siblings: &[Bounds], gap: f32) -> bool {
    siblings.iter().all(|sibling| {
        let clearance = after.clearance(sibling);
        clearance >= gap - GAP_TOLERANCE || clearance >= before.clearance(sibling)
    })
}

fn nudge_machine(canvas: &mut Canvas, (n, f, m): MachineKey, offset: Point) {
    let machine = canvas
        .networks_mut()
        .get_mut(n)
        .and_then(|network| network.factories_mut().get_mut(f))
        .and_then(|factory| factory.machines_mut().get_mut(m));
    if let Some(machine) = machine {
        machine.translate(offset);
    }
}

/// Number of (connection, foreign node) pairs that still collide.
pub fn count_collisions(
    canvas: &Canvas,
    connections: &[Connection],
    orientation: Orientation,
) -> usize {
    let boxes = ports::node_boxes(canvas);
    connections
        .iter()
        .filter_map(|&connection| {
            flatten_route(&boxes, connection, orientation).map(|points| (connection, points))
        })
        .map(|(connection, points)| {
            boxes
                .iter()
                .filter(|&(id, bounds)| {
                    !connection.touches(*id)
                        && hits(&points, bounds.add_padding(Insets::uniform(CLEARANCE)))
                })
                .count()
        })
        .sum()
}
