//! Connections between nodes and the routing geometry derived for them.
//!
//! A [`Connection`] is the directed `(source, target)` pair declared through
//! node inputs and outputs. Once layout has placed every node, each connection
//! gets a [`Route`]: an exit [`Port`] on the source, an entry [`Port`] on the
//! target and a [`CubicCurve`] joining the two anchors.

use serde::{Deserialize, Serialize};

use crate::{geometry::Point, identifier::Id};

/// A directed connection between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    source: Id,
    target: Id,
}

impl Connection {
    pub fn new(source: Id, target: Id) -> Self {
        Self { source, target }
    }

    /// Returns the id of the node the connection leaves.
    pub fn source(self) -> Id {
        self.source
    }

    /// Returns the id of the node the connection enters.
    pub fn target(self) -> Id {
        self.target
    }

    /// Returns true when the connection starts and ends on the same node.
    pub fn is_self_loop(self) -> bool {
        self.source == self.target
    }

    /// Returns true when `id` is either endpoint.
    pub fn touches(self, id: Id) -> bool {
        self.source == id || self.target == id
    }
}

/// A side of a node box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    /// Unit vector pointing away from the box through this side.
    pub fn outward_normal(self) -> Point {
        match self {
            Side::Top => Point::new(0.0, -1.0),
            Side::Right => Point::new(1.0, 0.0),
            Side::Bottom => Point::new(0.0, 1.0),
            Side::Left => Point::new(-1.0, 0.0),
        }
    }

    /// Returns true for the left and right sides.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Side::Left | Side::Right)
    }
}

/// Whether a port is where a connection leaves or enters a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortKind {
    Exit,
    Entry,
}

/// An attachment point of a connection on a node side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Port {
    side: Side,
    anchor: Point,
    kind: PortKind,
    peer: Id,
}

impl Port {
    /// Creates a port. `peer` is the node at the other end of the connection.
    pub fn new(side: Side, anchor: Point, kind: PortKind, peer: Id) -> Self {
        Self {
            side,
            anchor,
            kind,
            peer,
        }
    }

    pub fn side(self) -> Side {
        self.side
    }

    pub fn anchor(self) -> Point {
        self.anchor
    }

    pub fn kind(self) -> PortKind {
        self.kind
    }

    pub fn peer(self) -> Id {
        self.peer
    }
}

/// A cubic Bézier curve from `start` to `end`.
///
/// # Examples
///
/// ```
/// # use foundry_core::{connection::CubicCurve, geometry::Point};
/// let curve = CubicCurve::new(
///     Point::new(0.0, 0.0),
///     Point::new(40.0, 0.0),
///     Point::new(60.0, 100.0),
///     Point::new(100.0, 100.0),
/// );
/// assert_eq!(curve.point_at(0.0), curve.start());
/// assert_eq!(curve.point_at(0.5), Point::new(50.0, 50.0));
/// assert_eq!(curve.flatten(8).len(), 9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CubicCurve {
    start: Point,
    control1: Point,
    control2: Point,
    end: Point,
}

impl CubicCurve {
    pub fn new(start: Point, control1: Point, control2: Point, end: Point) -> Self {
        Self {
            start,
            control1,
            control2,
            end,
        }
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn control1(&self) -> Point {
        self.control1
    }

    pub fn control2(&self) -> Point {
        self.control2
    }

    pub fn end(&self) -> Point {
        self.end
    }

    /// Evaluates the curve at parameter `t` in `[0, 1]`.
    pub fn point_at(&self, t: f32) -> Point {
        let u = 1.0 - t;
        let w0 = u * u * u;
        let w1 = 3.0 * u * u * t;
        let w2 = 3.0 * u * t * t;
        let w3 = t * t * t;
        let x = w0 * self.start.x() + w1 * self.control1.x();
        let y = w0 * self.start.y() + w1 * self.control1.y();
        Point::new(
            x + w2 * self.control2.x() + w3 * self.end.x(),
            y + w2 * self.control2.y() + w3 * self.end.y(),
        )
    }

    /// Samples the curve into a polyline of `segments` pieces.
    ///
    /// The result holds `segments + 1` points and always starts and ends on
    /// the curve endpoints.
    pub fn flatten(&self, segments: usize) -> Vec<Point> {
        let segments = segments.max(1);
        (0..=segments)
            .map(|i| self.point_at(i as f32 / segments as f32))
            .collect()
    }
}

/// The routed geometry of one connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    #[serde(flatten)]
    connection: Connection,
    exit: Port,
    entry: Port,
    curve: CubicCurve,
}

impl Route {
    pub fn new(connection: Connection, exit: Port, entry: Port, curve: CubicCurve) -> Self {
        Self {
            connection,
            exit,
            entry,
            curve,
        }
    }

    pub fn connection(&self) -> Connection {
        self.connection
    }

    /// Port on the source node.
    pub fn exit(&self) -> Port {
        self.exit
    }

    /// Port on the target node.
    pub fn entry(&self) -> Port {
        self.entry
    }

    pub fn curve(&self) -> &CubicCurve {
        &self.curve
    }
}
