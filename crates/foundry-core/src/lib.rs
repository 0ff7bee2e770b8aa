//! Foundry Core Types
//!
//! This crate provides the foundational types shared by the Foundry layout
//! engine and its consumers. It includes:
//!
//! - **Identifiers**: Efficient string-interned identifiers ([`identifier::Id`])
//! - **Geometry**: Basic geometric types ([`geometry`] module)
//! - **Canvas**: The hierarchical entity tree ([`canvas`] module)
//! - **Connection**: Connections and their routed geometry ([`connection`] module)

pub mod canvas;
pub mod connection;
pub mod geometry;
pub mod identifier;
