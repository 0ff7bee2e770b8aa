//! Foundry - hierarchical auto-layout for node-and-connection diagrams.
//!
//! Foundry takes a canvas of nested containers (networks, factories,
//! machines) holding nodes wired together by connections, and computes where
//! everything goes: flow-ranked node positions, container bounds that enclose
//! their children, port sides and cubic connector curves.

pub mod config;
pub mod layout;
pub mod validate;

mod error;

pub use foundry_core::{canvas, connection, geometry, identifier};

pub use error::FoundryError;

use log::{debug, info, trace};

use config::AppConfig;
use foundry_core::canvas::Canvas;
use layout::{EngineBuilder, EngineKind};

/// Builder for laying out Foundry canvases.
///
/// # Examples
///
/// ```rust
/// use foundry::{LayoutBuilder, config::AppConfig};
/// use foundry::canvas::{Canvas, Factory, Machine, Network, Node, NodeKind};
/// use foundry::identifier::Id;
///
/// let canvas = Canvas::new().with_network(
///     Network::new("plant").with_factory(
///         Factory::new("bakery").with_machine(
///             Machine::new("line")
///                 .with_node(Node::new("dough", NodeKind::Input).with_outputs([Id::new("oven")]))
///                 .with_node(Node::new("oven", NodeKind::Process)),
///         ),
///     ),
/// );
///
/// let builder = LayoutBuilder::new(AppConfig::default());
/// let laid_out = builder.layout(canvas).expect("Failed to lay out");
///
/// let dough = laid_out.get_node(Id::new("dough")).unwrap();
/// let oven = laid_out.get_node(Id::new("oven")).unwrap();
/// assert!(oven.position().x() > dough.position().x());
/// assert_eq!(laid_out.routes().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct LayoutBuilder {
    config: AppConfig,
}

impl LayoutBuilder {
    /// Create a new layout builder with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration including the layout settings
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Lay out a canvas.
    ///
    /// Validates the canvas, resolves its connections and runs the engine
    /// selected by the configuration. The returned canvas carries node
    /// positions and ports, container bounds and one route per connection.
    ///
    /// # Errors
    ///
    /// Returns `FoundryError::Validation` for duplicate or blank node ids and
    /// unusable size hints, and `FoundryError::Layout` if the result contains
    /// non-finite coordinates.
    pub fn layout(&self, mut canvas: Canvas) -> Result<Canvas, FoundryError> {
        info!("Validating canvas");
        validate::validate(&canvas)?;

        let connections = canvas.resolve_connections();
        let layout_config = self.config.layout();
        let kind = if layout_config.organize() {
            EngineKind::Organize
        } else {
            EngineKind::Simple
        };

        info!(
            engine:? = kind,
            orientation = layout_config.orientation().to_string(),
            spacing = layout_config.spacing().to_string(),
            connections = connections.len();
            "Laying out canvas"
        );

        let engine = EngineBuilder::new()
            .with_orientation(layout_config.orientation())
            .with_spacing_preset(layout_config.spacing())
            .build(kind);
        engine.calculate(&mut canvas, &connections)?;

        ensure_finite(&canvas)?;

        debug!(node_bounds:? = canvas.node_bounds(); "Layout finished");
        trace!(canvas:?; "Laid-out canvas");

        Ok(canvas)
    }
}

/// Rejects layouts with non-finite node coordinates.
fn ensure_finite(canvas: &Canvas) -> Result<(), FoundryError> {
    match canvas.nodes().find(|node| !node.position().is_finite()) {
        Some(node) => Err(FoundryError::Layout(format!(
            "node `{}` ended at a non-finite position",
            node.id()
        ))),
        None => Ok(()),
    }
}
