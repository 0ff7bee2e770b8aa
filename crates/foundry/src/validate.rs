//! Structural checks run before any layout.
//!
//! Layout tolerates cycles, dangling references and empty containers, but it
//! relies on node ids being unique and on every node carrying a usable size
//! hint. Violations are caller bugs and are reported instead of recovered.

use indexmap::IndexSet;
use log::debug;
use thiserror::Error;

use foundry_core::{canvas::Canvas, identifier::Id};

/// A structural problem in the input canvas.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("node id `{id}` is declared more than once")]
    DuplicateNodeId { id: String },

    #[error("machine `{machine}` contains a node with a blank id")]
    BlankNodeId { machine: String },

    #[error("node `{id}` has an invalid size hint {width}x{height}")]
    InvalidSize { id: String, width: f32, height: f32 },
}

/// Checks the invariants layout relies on.
///
/// # Errors
///
/// Returns the first [`ValidationError`] found in tree order.
pub fn validate(canvas: &Canvas) -> Result<(), ValidationError> {
    let mut seen: IndexSet<Id> = IndexSet::new();

    for network in canvas.networks() {
        for factory in network.factories() {
            for machine in factory.machines() {
                for node in machine.nodes() {
                    if node.id().is_blank() {
                        return Err(ValidationError::BlankNodeId {
                            machine: machine.id().to_string(),
                        });
                    }
                    if !seen.insert(node.id()) {
                        return Err(ValidationError::DuplicateNodeId {
                            id: node.id().to_string(),
                        });
                    }
                    let size = node.size();
                    if !size.is_valid_hint() {
                        return Err(ValidationError::InvalidSize {
                            id: node.id().to_string(),
                            width: size.width(),
                            height: size.height(),
                        });
                    }
                }
            }
        }
    }

    debug!(nodes = seen.len(); "Canvas validated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use foundry_core::{
        canvas::{Factory, Machine, Network, Node, NodeKind},
        geometry::Size,
    };

    use super::*;

    fn canvas_with(machines: Vec<Machine>) -> Canvas {
        let factory = machines
            .into_iter()
            .fold(Factory::new("f"), |factory, machine| {
                factory.with_machine(machine)
            });
        Canvas::new().with_network(Network::new("n").with_factory(factory))
    }

    #[test]
    fn test_valid_canvas() {
        let canvas = canvas_with(vec![
            Machine::new("m1").with_node(Node::new("a", NodeKind::Input)),
            Machine::new("m2").with_node(Node::new("b", NodeKind::Output)),
        ]);
        assert_eq!(validate(&canvas), Ok(()));
    }

    #[test]
    fn test_empty_canvas_is_valid() {
        assert_eq!(validate(&Canvas::new()), Ok(()));
    }

    #[test]
    fn test_duplicate_across_machines() {
        let canvas = canvas_with(vec![
            Machine::new("m1").with_node(Node::new("dup", NodeKind::Input)),
            Machine::new("m2").with_node(Node::new("dup", NodeKind::Output)),
        ]);
        assert_eq!(
            validate(&canvas),
            Err(ValidationError::DuplicateNodeId {
                id: "dup".to_string()
            })
        );
    }

    #[test]
    fn test_blank_id() {
        let canvas =
            canvas_with(vec![Machine::new("m1").with_node(Node::new(" ", NodeKind::Static))]);
        assert_eq!(
            validate(&canvas),
            Err(ValidationError::BlankNodeId {
                machine: "m1".to_string()
            })
        );
    }

    #[test]
    fn test_invalid_sizes() {
        for size in [
            Size::new(0.0, 10.0),
            Size::new(10.0, -1.0),
            Size::new(f32::INFINITY, 10.0),
            Size::new(10.0, f32::NAN),
        ] {
            let canvas = canvas_with(vec![
                Machine::new("m1").with_node(Node::new("bad", NodeKind::Process).with_size(size)),
            ]);
            assert!(matches!(
                validate(&canvas),
                Err(ValidationError::InvalidSize { .. })
            ));
        }
    }
}
