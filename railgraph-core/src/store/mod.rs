//! Storage of railway graphs
//!
//! [`GraphStore`] is the interface every algorithm in this crate reads and
//! writes graphs through. Nodes are loaded as owned values, mutated and
//! saved back explicitly. [`MemoryStore`] is the bundled backend.

mod memory;
mod ops;
mod query;

use geo::Point;

use crate::{Error, Node, NodeId};

pub use memory::MemoryStore;
pub use ops::{
    copy, create_graph, create_graph_from, dedup, merge_nodes, recompute_distances,
    remove_lonely_nodes,
};
pub use query::{
    component_count, endpoints, inconsistent_edges, junctions, locs_for, nodes_with_degree,
    nodes_with_degree_ne, to_ungraph,
};

/// A collection of nodes keyed by id with a 2D spatial index.
///
/// Multi-node queries return nodes ordered by ascending id. A store is not
/// meant to be shared between concurrent writers: operations such as
/// [`merge_nodes`] perform several lookups and updates without any
/// transactional guard.
pub trait GraphStore {
    fn find_node(&self, id: NodeId) -> Result<Option<Node>, Error>;

    fn find_nodes_where(&self, predicate: &dyn Fn(&Node) -> bool) -> Result<Vec<Node>, Error>;

    /// Inserts a new node, failing with [`Error::DuplicateNode`] if the id
    /// is taken.
    fn insert_node(&mut self, node: Node) -> Result<(), Error>;

    /// Inserts or replaces the node with the same id.
    fn save_node(&mut self, node: Node) -> Result<(), Error>;

    /// Removes a node and returns it if it existed.
    fn delete_node(&mut self, id: NodeId) -> Result<Option<Node>, Error>;

    fn count(&self) -> Result<usize, Error>;

    fn clear(&mut self) -> Result<(), Error>;

    /// The node closest to `point`, `None` for an empty store.
    fn nearest_node(&self, point: Point<f64>) -> Result<Option<Node>, Error>;

    /// All nodes within `radius` (coordinate units) of `point`.
    fn nodes_within(&self, point: Point<f64>, radius: f64) -> Result<Vec<Node>, Error>;

    /// Like [`GraphStore::find_node`], but a missing node is an
    /// [`Error::MissingNode`].
    fn node(&self, id: NodeId) -> Result<Node, Error> {
        self.find_node(id)?.ok_or(Error::MissingNode(id))
    }

    fn contains(&self, id: NodeId) -> Result<bool, Error> {
        Ok(self.find_node(id)?.is_some())
    }

    fn all_nodes(&self) -> Result<Vec<Node>, Error> {
        self.find_nodes_where(&|_| true)
    }

    fn node_ids(&self) -> Result<Vec<NodeId>, Error> {
        Ok(self.all_nodes()?.into_iter().map(|n| n.id).collect())
    }
}
