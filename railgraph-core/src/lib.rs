//! Segmentation and simplification of railway track graphs.
//!
//! A graph is a set of located [`Node`]s connected by weighted
//! [`Successor`] edges, kept in a [`GraphStore`]. The [`segment`] module
//! decomposes it into linear segments between endpoints and junctions,
//! [`simplify`] thins out the points of every segment and [`pipeline`]
//! writes the simplified segments back into a destination graph.

pub mod combine;
pub mod error;
pub mod geometry;
pub mod model;
pub mod pipeline;
pub mod prelude;
pub mod segment;
pub mod simplify;
pub mod stations;
pub mod store;

pub use error::Error;
pub use model::{Node, NodeKind, Successor, TrackPoint};
pub use store::{GraphStore, MemoryStore};

/// Identifier of a graph node
pub type NodeId = i64;
