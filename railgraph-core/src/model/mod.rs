//! Data model of a railway graph
//!
//! Contains the located nodes with their weighted successor edges and the
//! `(x, y, id)` triplets the simplification algorithms operate on.

mod node;
mod track_point;

pub use node::{Node, NodeKind, Successor};
pub use track_point::TrackPoint;
