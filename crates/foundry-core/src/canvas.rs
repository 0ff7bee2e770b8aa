//! The canvas entity tree.
//!
//! A diagram is a strict containment hierarchy:
//!
//! ```text
//! Canvas
//!  └─ Network      (not drawn, spacing only)
//!      └─ Factory
//!          └─ Machine
//!              └─ Node
//! ```
//!
//! The tree is built by a collaborator (or deserialized), mutated in place by
//! layout and then handed read-only to a renderer. Layout writes node
//! positions and ports, container bounds and the canvas routes. Everything else
//! is input.

use indexmap::IndexSet;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    connection::{Connection, Port, Route},
    geometry::{Bounds, Point, Size},
    identifier::Id,
};

/// Width of a node when no size hint is given.
pub const DEFAULT_NODE_WIDTH: f32 = 250.0;
/// Height of a node when no size hint is given.
pub const DEFAULT_NODE_HEIGHT: f32 = 120.0;

fn default_node_size() -> Size {
    Size::new(DEFAULT_NODE_WIDTH, DEFAULT_NODE_HEIGHT)
}

/// The role of a node. Renderers pick shapes and colors from it; layout ignores it.
///
/// Unknown kinds deserialize to [`NodeKind::Default`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum NodeKind {
    Static,
    Input,
    Ai,
    Source,
    Output,
    Decision,
    Process,
    #[default]
    Default,
}

impl From<String> for NodeKind {
    fn from(kind: String) -> Self {
        match kind.to_ascii_lowercase().as_str() {
            "static" => NodeKind::Static,
            "input" => NodeKind::Input,
            "ai" => NodeKind::Ai,
            "source" => NodeKind::Source,
            "output" => NodeKind::Output,
            "decision" => NodeKind::Decision,
            "process" => NodeKind::Process,
            _ => NodeKind::Default,
        }
    }
}

/// Border and fill colors of a drawn container, carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    border: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fill: Option<String>,
}

impl ContainerStyle {
    pub fn new(border: Option<String>, fill: Option<String>) -> Self {
        Self { border, fill }
    }

    pub fn border(&self) -> Option<&str> {
        self.border.as_deref()
    }

    pub fn fill(&self) -> Option<&str> {
        self.fill.as_deref()
    }
}

/// A leaf of the tree: one box on the canvas.
///
/// # Examples
///
/// ```
/// # use foundry_core::{canvas::{Node, NodeKind}, geometry::Size, identifier::Id};
/// let node = Node::new("mill", NodeKind::Process)
///     .with_size(Size::new(200.0, 100.0))
///     .with_inputs([Id::new("silo")]);
///
/// assert_eq!(node.label(), "mill");
/// assert_eq!(node.bounds().width(), 200.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    id: Id,
    #[serde(default, rename = "type")]
    kind: NodeKind,
    #[serde(default)]
    content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    #[serde(default = "default_node_size")]
    size: Size,
    #[serde(default)]
    position: Point,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    inputs: Vec<Id>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    outputs: Vec<Id>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    ports: Vec<Port>,
}

impl Node {
    /// Creates a node with the default size at the origin.
    pub fn new(id: &str, kind: NodeKind) -> Self {
        Self {
            id: Id::new(id),
            kind,
            content: String::new(),
            label: None,
            size: default_node_size(),
            position: Point::default(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            ports: Vec::new(),
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    pub fn with_position(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    /// Declares connections `input → self`.
    pub fn with_inputs(mut self, inputs: impl IntoIterator<Item = Id>) -> Self {
        self.inputs.extend(inputs);
        self
    }

    /// Declares connections `self → output`.
    pub fn with_outputs(mut self, outputs: impl IntoIterator<Item = Id>) -> Self {
        self.outputs.extend(outputs);
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the label, or the id when no label is set.
    pub fn label(&self) -> String {
        label_or_id(self.label.as_deref(), self.id)
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Top-left corner of the node box.
    pub fn position(&self) -> Point {
        self.position
    }

    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    /// Moves the node by `offset`.
    pub fn translate(&mut self, offset: Point) {
        self.position = self.position.add_point(offset);
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new_from_top_left(self.position, self.size)
    }

    pub fn inputs(&self) -> &[Id] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Id] {
        &self.outputs
    }

    /// Connection anchors from the latest routing.
    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    pub fn set_ports(&mut self, ports: Vec<Port>) {
        self.ports = ports;
    }
}

fn label_or_id(label: Option<&str>, id: Id) -> String {
    label.map_or_else(|| id.to_string(), str::to_owned)
}

/// The innermost container, grouping nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    id: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    style: Option<ContainerStyle>,
    #[serde(default)]
    nodes: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bounds: Option<Bounds>,
}

impl Machine {
    pub fn new(id: &str) -> Self {
        Self {
            id: Id::new(id),
            label: None,
            style: None,
            nodes: Vec::new(),
            bounds: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_style(mut self, style: ContainerStyle) -> Self {
        self.style = Some(style);
        self
    }

    pub fn with_node(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    /// Returns the label, or the id when no label is set.
    pub fn label(&self) -> String {
        label_or_id(self.label.as_deref(), self.id)
    }

    pub fn style(&self) -> Option<&ContainerStyle> {
        self.style.as_ref()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    /// Bounds computed by layout, `None` before layout runs.
    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = Some(bounds);
    }

    /// Moves every node and the machine bounds by `offset`.
    pub fn translate(&mut self, offset: Point) {
        for node in &mut self.nodes {
            node.translate(offset);
        }
        self.bounds = self.bounds.map(|bounds| bounds.translate(offset));
    }
}

/// A drawn container grouping machines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Factory {
    id: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    style: Option<ContainerStyle>,
    #[serde(default)]
    machines: Vec<Machine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bounds: Option<Bounds>,
}

impl Factory {
    pub fn new(id: &str) -> Self {
        Self {
            id: Id::new(id),
            label: None,
            style: None,
            machines: Vec::new(),
            bounds: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_style(mut self, style: ContainerStyle) -> Self {
        self.style = Some(style);
        self
    }

    pub fn with_machine(mut self, machine: Machine) -> Self {
        self.machines.push(machine);
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    /// Returns the label, or the id when no label is set.
    pub fn label(&self) -> String {
        label_or_id(self.label.as_deref(), self.id)
    }

    pub fn style(&self) -> Option<&ContainerStyle> {
        self.style.as_ref()
    }

    pub fn machines(&self) -> &[Machine] {
        &self.machines
    }

    pub fn machines_mut(&mut self) -> &mut [Machine] {
        &mut self.machines
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = Some(bounds);
    }

    /// Moves the whole subtree by `offset`.
    pub fn translate(&mut self, offset: Point) {
        self.machines
            .iter_mut()
            .for_each(|machine| machine.translate(offset));
        self.bounds = self.bounds.map(|bounds| bounds.translate(offset));
    }
}

/// A top-level grouping of factories. Networks are not drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    id: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    #[serde(default)]
    factories: Vec<Factory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bounds: Option<Bounds>,
}

impl Network {
    pub fn new(id: &str) -> Self {
        Self {
            id: Id::new(id),
            label: None,
            factories: Vec::new(),
            bounds: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_factory(mut self, factory: Factory) -> Self {
        self.factories.push(factory);
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    /// Returns the label, or the id when no label is set.
    pub fn label(&self) -> String {
        label_or_id(self.label.as_deref(), self.id)
    }

    pub fn factories(&self) -> &[Factory] {
        &self.factories
    }

    pub fn factories_mut(&mut self) -> &mut [Factory] {
        &mut self.factories
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = Some(bounds);
    }

    /// Moves the whole subtree by `offset`.
    pub fn translate(&mut self, offset: Point) {
        self.factories
            .iter_mut()
            .for_each(|factory| factory.translate(offset));
        self.bounds = self.bounds.map(|bounds| bounds.translate(offset));
    }
}

/// Root of the entity tree.
///
/// # Examples
///
/// ```
/// # use foundry_core::canvas::{Canvas, Factory, Machine, Network, Node, NodeKind};
/// # use foundry_core::identifier::Id;
/// let canvas = Canvas::new()
///     .with_title("Bakery")
///     .with_network(Network::new("plant").with_factory(
///         Factory::new("bakery").with_machine(
///             Machine::new("line")
///                 .with_node(Node::new("dough", NodeKind::Input).with_outputs([Id::new("oven")]))
///                 .with_node(
///                     Node::new("oven", NodeKind::Process).with_inputs([Id::new("dough")]),
///                 ),
///         ),
///     ));
///
/// // Declared on both ends, resolved once.
/// assert_eq!(canvas.resolve_connections().len(), 1);
/// assert_eq!(canvas.nodes().count(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(default)]
    networks: Vec<Network>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bounds: Option<Bounds>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    routes: Vec<Route>,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_network(mut self, network: Network) -> Self {
        self.networks.push(network);
        self
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn networks(&self) -> &[Network] {
        &self.networks
    }

    pub fn networks_mut(&mut self) -> &mut [Network] {
        &mut self.networks
    }

    /// Bounding box of the laid-out diagram.
    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = Some(bounds);
    }

    /// One route per resolved connection, in resolution order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn set_routes(&mut self, routes: Vec<Route>) {
        self.routes = routes;
    }

    /// Iterates over every node in tree order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.networks
            .iter()
            .flat_map(|network| network.factories.iter())
            .flat_map(|factory| factory.machines.iter())
            .flat_map(|machine| machine.nodes.iter())
    }

    /// Iterates mutably over every node in tree order.
    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.networks
            .iter_mut()
            .flat_map(|network| network.factories.iter_mut())
            .flat_map(|factory| factory.machines.iter_mut())
            .flat_map(|machine| machine.nodes.iter_mut())
    }

    /// Finds a node anywhere in the tree.
    pub fn get_node(&self, id: Id) -> Option<&Node> {
        self.nodes().find(|node| node.id == id)
    }

    /// Bounding box over every node with finite coordinates.
    ///
    /// Returns `None` when the canvas has no such node.
    pub fn node_bounds(&self) -> Option<Bounds> {
        Bounds::enclosing(
            self.nodes()
                .filter(|node| node.position.is_finite() && node.size.is_valid_hint())
                .map(Node::bounds),
        )
    }

    /// Resolves node inputs and outputs into the directed connection list.
    ///
    /// Each node contributes `input → node` for its inputs, then
    /// `node → output` for its outputs. Pairs declared more than once (typically
    /// on both endpoints) appear once, at their first declaration. References
    /// to unknown node ids are dropped.
    pub fn resolve_connections(&self) -> Vec<Connection> {
        let known: IndexSet<Id> = self.nodes().map(Node::id).collect();
        let mut connections = IndexSet::new();

        for node in self.nodes() {
            let declared = node
                .inputs
                .iter()
                .map(|&input| Connection::new(input, node.id))
                .chain(
                    node.outputs
                        .iter()
                        .map(|&output| Connection::new(node.id, output)),
                );
            for connection in declared {
                if known.contains(&connection.source()) && known.contains(&connection.target()) {
                    connections.insert(connection);
                } else {
                    debug!(
                        source = connection.source().to_string(),
                        target = connection.target().to_string();
                        "Dropping connection to unknown node"
                    );
                }
            }
        }

        connections.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(name: &str) -> Id {
        Id::new(name)
    }

    fn sample() -> Canvas {
        Canvas::new().with_network(
            Network::new("net").with_factory(
                Factory::new("fab")
                    .with_machine(
                        Machine::new("m1")
                            .with_node(Node::new("a", NodeKind::Input).with_outputs([id("b")]))
                            .with_node(
                                Node::new("b", NodeKind::Process)
                                    .with_inputs([id("a"), id("ghost")])
                                    .with_outputs([id("c")]),
                            ),
                    )
                    .with_machine(
                        Machine::new("m2").with_node(
                            Node::new("c", NodeKind::Output)
                                .with_inputs([id("b")])
                                .with_position(Point::new(500.0, 40.0)),
                        ),
                    ),
            ),
        )
    }

    #[test]
    fn test_resolve_connections_dedupes_and_drops_dangling() {
        let connections = sample().resolve_connections();

        assert_eq!(
            connections,
            vec![
                Connection::new(id("a"), id("b")),
                Connection::new(id("b"), id("c")),
            ]
        );
    }

    #[test]
    fn test_resolve_connections_keeps_self_loop() {
        let canvas = Canvas::new().with_network(Network::new("n").with_factory(
            Factory::new("f").with_machine(Machine::new("m").with_node(
                Node::new("solo", NodeKind::Static).with_outputs([id("solo")]),
            )),
        ));

        let connections = canvas.resolve_connections();
        assert_eq!(connections.len(), 1);
        assert!(connections[0].is_self_loop());
    }

    #[test]
    fn test_get_node_and_nodes_order() {
        let canvas = sample();
        let order: Vec<String> = canvas.nodes().map(|n| n.id().to_string()).collect();

        assert_eq!(order, ["a", "b", "c"]);
        assert_eq!(
            canvas.get_node(id("c")).map(Node::kind),
            Some(NodeKind::Output)
        );
        assert!(canvas.get_node(id("nope")).is_none());
    }

    #[test]
    fn test_node_bounds() {
        let canvas = sample();
        let bounds = canvas.node_bounds().unwrap();

        assert_eq!(bounds.min_point(), Point::new(0.0, 0.0));
        assert_eq!(bounds.max_x(), 750.0);
        assert_eq!(bounds.max_y(), 160.0);
        assert!(Canvas::new().node_bounds().is_none());
    }

    #[test]
    fn test_node_bounds_ignores_non_finite() {
        let canvas = Canvas::new().with_network(Network::new("n").with_factory(
            Factory::new("f").with_machine(
                Machine::new("m").with_node(
                    Node::new("lost", NodeKind::Default).with_position(Point::new(f32::NAN, 0.0)),
                ),
            ),
        ));
        assert!(canvas.node_bounds().is_none());
    }

    #[test]
    fn test_label_falls_back_to_id() {
        let node = Node::new("press", NodeKind::Process);
        assert_eq!(node.label(), "press");
        assert_eq!(
            node.with_label("Hydraulic press").label(),
            "Hydraulic press"
        );
        assert_eq!(Machine::new("m9").label(), "m9");
    }

    #[test]
    fn test_translate_moves_subtree() {
        let mut factory = sample().networks()[0].factories()[0].clone();
        factory.set_bounds(Bounds::new_from_top_left(Point::default(), Size::new(10.0, 10.0)));
        factory.translate(Point::new(5.0, -5.0));

        assert_eq!(
            factory.machines()[0].nodes()[0].position(),
            Point::new(5.0, -5.0)
        );
        assert_eq!(
            factory.machines()[1].nodes()[0].position(),
            Point::new(505.0, 35.0)
        );
        assert_eq!(
            factory.bounds().map(|b| b.min_point()),
            Some(Point::new(5.0, -5.0))
        );
    }

    #[test]
    fn test_deserialize_defaults_and_unknown_kind() {
        let json = r#"{
            "networks": [{
                "id": "n",
                "factories": [{
                    "id": "f",
                    "machines": [{
                        "id": "m",
                        "nodes": [
                            { "id": "x", "type": "ai", "content": "classify" },
                            { "id": "y", "type": "teleporter", "inputs": ["x"] }
                        ]
                    }]
                }]
            }]
        }"#;
        let canvas: Canvas = serde_json::from_str(json).unwrap();
        let nodes: Vec<&Node> = canvas.nodes().collect();

        assert_eq!(nodes[0].kind(), NodeKind::Ai);
        assert_eq!(nodes[0].content(), "classify");
        assert_eq!(nodes[1].kind(), NodeKind::Default);
        assert_eq!(
            nodes[1].size(),
            Size::new(DEFAULT_NODE_WIDTH, DEFAULT_NODE_HEIGHT)
        );
        assert!(nodes[1].position().is_zero());
        assert_eq!(canvas.resolve_connections().len(), 1);
    }

    #[test]
    fn test_node_kind_serializes_lowercase() {
        let json = serde_json::to_value(Node::new("k", NodeKind::Decision)).unwrap();
        assert_eq!(json["type"], "decision");
    }
}
