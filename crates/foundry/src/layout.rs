//! Layout engine for positioning canvas entities.
//!
//! This module turns a validated [`Canvas`](foundry_core::canvas::Canvas)
//! into a laid-out one: node positions, container bounds, node ports and
//! connection routes.
//!
//! # Pipeline
//!
//! ```text
//! Canvas + connections
//!     ↓ scope        project connections onto sibling sets
//!     ↓ ranking      Kahn ranks per sibling set
//!     ↓ compositor   arrange siblings, translate subtrees (uses overlap)
//!     ↓ ports        exit/entry sides and cubic connector curves
//!     ↓ avoidance    nudge machines off foreign connectors
//!     ↓ compositor   refit container bounds
//!     ↓ ports        final routing
//! Laid-out canvas
//! ```
//!
//! # Re-exports
//!
//! - [`EngineBuilder`] - Builder for creating and configuring layout engines

pub mod avoidance;
pub mod axis;
pub mod compositor;
mod engines;
pub mod overlap;
pub mod ports;
pub mod ranking;
pub mod scope;

pub use engines::{EngineBuilder, EngineKind, LayoutEngine};
