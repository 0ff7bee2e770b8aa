//! Projection of node connections onto containment scopes.
//!
//! A connection between two nodes is an edge between their ancestors at the
//! lowest level where those ancestors are distinct siblings. One pre-pass maps
//! every node to its lineage and buckets each connection under that scope, so
//! ranking never walks the tree.

use indexmap::{IndexMap, IndexSet};
use log::debug;

use foundry_core::{canvas::Canvas, connection::Connection, identifier::Id};

/// A sibling set, addressed by the index path of its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Networks on the canvas.
    Canvas,
    /// Factories in a network.
    Network(usize),
    /// Machines in a factory.
    Factory(usize, usize),
    /// Nodes in a machine.
    Machine(usize, usize, usize),
}

/// Index path of a node in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Lineage {
    pub network: usize,
    pub factory: usize,
    pub machine: usize,
    pub node: usize,
}

impl Lineage {
    /// Key of the machine holding the node.
    pub fn machine_key(self) -> (usize, usize, usize) {
        (self.network, self.factory, self.machine)
    }

    /// Lowest common scope of two nodes and the edge it induces there.
    ///
    /// Returns `None` for a node paired with itself.
    fn common_scope(self, other: Lineage) -> Option<(Scope, (usize, usize))> {
        if self.network != other.network {
            Some((Scope::Canvas, (self.network, other.network)))
        } else if self.factory != other.factory {
            Some((Scope::Network(self.network), (self.factory, other.factory)))
        } else if self.machine != other.machine {
            Some((
                Scope::Factory(self.network, self.factory),
                (self.machine, other.machine),
            ))
        } else if self.node != other.node {
            Some((
                Scope::Machine(self.network, self.factory, self.machine),
                (self.node, other.node),
            ))
        } else {
            None
        }
    }
}

/// Connections projected onto every scope of a canvas.
#[derive(Debug, Default)]
pub struct ScopeEdges {
    lineages: IndexMap<Id, Lineage>,
    buckets: IndexMap<Scope, IndexSet<(usize, usize)>>,
}

impl ScopeEdges {
    /// Maps every node to its lineage and buckets `connections` by scope.
    ///
    /// Connections with an unknown endpoint and self connections contribute
    /// no edge.
    pub fn project(canvas: &Canvas, connections: &[Connection]) -> Self {
        let mut lineages = IndexMap::new();
        for (network, net) in canvas.networks().iter().enumerate() {
            for (factory, fab) in net.factories().iter().enumerate() {
                for (machine, mach) in fab.machines().iter().enumerate() {
                    for (node, item) in mach.nodes().iter().enumerate() {
                        lineages.insert(
                            item.id(),
                            Lineage {
                                network,
                                factory,
                                machine,
                                node,
                            },
                        );
                    }
                }
            }
        }

        let mut buckets: IndexMap<Scope, IndexSet<(usize, usize)>> = IndexMap::new();
        for connection in connections.iter().filter(|c| !c.is_self_loop()) {
            let (Some(&source), Some(&target)) = (
                lineages.get(&connection.source()),
                lineages.get(&connection.target()),
            ) else {
                continue;
            };
            if let Some((scope, edge)) = source.common_scope(target) {
                buckets.entry(scope).or_default().insert(edge);
            }
        }

        debug!(
            nodes = lineages.len(),
            scopes = buckets.len();
            "Projected connections onto scopes"
        );
        Self { lineages, buckets }
    }

    /// Edges between the siblings of `scope`, deduplicated, in first-seen order.
    pub fn edges(&self, scope: Scope) -> Vec<(usize, usize)> {
        self.buckets
            .get(&scope)
            .map(|edges| edges.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn lineage(&self, id: Id) -> Option<Lineage> {
        self.lineages.get(&id).copied()
    }
}

#[cfg(test)]
mod tests {
    use foundry_core::canvas::{Factory, Machine, Network, Node, NodeKind};

    use super::*;

    fn id(name: &str) -> Id {
        Id::new(name)
    }

    fn canvas() -> Canvas {
        Canvas::new()
            .with_network(
                Network::new("n0").with_factory(
                    Factory::new("f0")
                        .with_machine(
                            Machine::new("m0")
                                .with_node(Node::new("s_a", NodeKind::Input))
                                .with_node(Node::new("s_b", NodeKind::Process)),
                        )
                        .with_machine(single("m1", Node::new("s_c", NodeKind::Output))),
                ),
            )
            .with_network(
                Network::new("n1")
                    .with_factory(
                        Factory::new("f1")
                            .with_machine(single("m2", Node::new("s_d", NodeKind::Static))),
                    )
                    .with_factory(
                        Factory::new("f2")
                            .with_machine(single("m3", Node::new("s_e", NodeKind::Static))),
                    ),
            )
    }

    fn single(id: &str, node: Node) -> Machine {
        Machine::new(id).with_node(node)
    }

    #[test]
    fn test_project_buckets_by_lowest_common_scope() {
        let connections = [
            Connection::new(id("s_a"), id("s_b")),
            Connection::new(id("s_b"), id("s_c")),
            Connection::new(id("s_c"), id("s_d")),
            Connection::new(id("s_d"), id("s_e")),
        ];
        let scopes = ScopeEdges::project(&canvas(), &connections);

        assert_eq!(scopes.edges(Scope::Machine(0, 0, 0)), vec![(0, 1)]);
        assert_eq!(scopes.edges(Scope::Factory(0, 0)), vec![(0, 1)]);
        assert_eq!(scopes.edges(Scope::Canvas), vec![(0, 1)]);
        assert_eq!(scopes.edges(Scope::Network(1)), vec![(0, 1)]);
        assert!(scopes.edges(Scope::Network(0)).is_empty());
    }

    #[test]
    fn test_project_dedupes_upward_edges() {
        let connections = [
            Connection::new(id("s_a"), id("s_c")),
            Connection::new(id("s_b"), id("s_c")),
        ];
        let scopes = ScopeEdges::project(&canvas(), &connections);

        assert_eq!(scopes.edges(Scope::Factory(0, 0)), vec![(0, 1)]);
    }

    #[test]
    fn test_project_skips_self_and_unknown() {
        let connections = [
            Connection::new(id("s_a"), id("s_a")),
            Connection::new(id("s_a"), id("nowhere")),
        ];
        let scopes = ScopeEdges::project(&canvas(), &connections);

        assert!(scopes.edges(Scope::Machine(0, 0, 0)).is_empty());
        assert_eq!(
            scopes.lineage(id("s_e")),
            Some(Lineage {
                network: 1,
                factory: 1,
                machine: 0,
                node: 0
            })
        );
    }
}
