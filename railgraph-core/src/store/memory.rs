//! In-memory graph store with an R-tree over node locations

use std::fmt;
use std::io::{Read, Write};

use geo::Point;
use hashbrown::HashMap;
use rstar::{RTree, primitives::GeomWithData};

use super::GraphStore;
use crate::{Error, Node, NodeId};

type IndexedNode = GeomWithData<[f64; 2], NodeId>;

fn indexed(node: &Node) -> IndexedNode {
    GeomWithData::new([node.loc.x(), node.loc.y()], node.id)
}

/// Graph store keeping all nodes in a hash map.
///
/// The spatial index is updated on every insert, save and delete, so
/// [`GraphStore::nearest_node`] and [`GraphStore::nodes_within`] always
/// reflect the current node locations.
pub struct MemoryStore {
    nodes: HashMap<NodeId, Node>,
    index: RTree<IndexedNode>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            index: RTree::new(),
        }
    }

    /// Builds a store from existing nodes; later duplicates replace earlier
    /// ones.
    pub fn from_nodes(nodes: impl IntoIterator<Item = Node>) -> Self {
        let nodes: HashMap<NodeId, Node> = nodes.into_iter().map(|n| (n.id, n)).collect();
        let index = RTree::bulk_load(nodes.values().map(indexed).collect());
        Self { nodes, index }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// All nodes ordered by id
    pub fn sorted_nodes(&self) -> Vec<&Node> {
        let mut nodes: Vec<&Node> = self.nodes.values().collect();
        nodes.sort_unstable_by_key(|n| n.id);
        nodes
    }

    /// Writes all nodes as a JSON array in the persisted node shape.
    pub fn to_json_writer<W: Write>(&self, writer: W) -> Result<(), Error> {
        serde_json::to_writer(writer, &self.sorted_nodes())?;
        Ok(())
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, Error> {
        let nodes: Vec<Node> = serde_json::from_reader(reader)?;
        Ok(Self::from_nodes(nodes))
    }

    pub fn to_json_string(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(&self.sorted_nodes())?)
    }

    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        let nodes: Vec<Node> = serde_json::from_str(json)?;
        Ok(Self::from_nodes(nodes))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore")
            .field("nodes", &self.nodes.len())
            .finish()
    }
}

impl GraphStore for MemoryStore {
    fn find_node(&self, id: NodeId) -> Result<Option<Node>, Error> {
        Ok(self.nodes.get(&id).cloned())
    }

    fn find_nodes_where(&self, predicate: &dyn Fn(&Node) -> bool) -> Result<Vec<Node>, Error> {
        let mut found: Vec<Node> = self
            .nodes
            .values()
            .filter(|n| predicate(n))
            .cloned()
            .collect();
        found.sort_unstable_by_key(|n| n.id);
        Ok(found)
    }

    fn insert_node(&mut self, node: Node) -> Result<(), Error> {
        if self.nodes.contains_key(&node.id) {
            return Err(Error::DuplicateNode(node.id));
        }
        self.index.insert(indexed(&node));
        self.nodes.insert(node.id, node);
        Ok(())
    }

    fn save_node(&mut self, node: Node) -> Result<(), Error> {
        match self.nodes.get(&node.id) {
            Some(old) if old.loc == node.loc => {}
            Some(old) => {
                self.index.remove(&indexed(old));
                self.index.insert(indexed(&node));
            }
            None => self.index.insert(indexed(&node)),
        }
        self.nodes.insert(node.id, node);
        Ok(())
    }

    fn delete_node(&mut self, id: NodeId) -> Result<Option<Node>, Error> {
        let removed = self.nodes.remove(&id);
        if let Some(node) = &removed {
            self.index.remove(&indexed(node));
        }
        Ok(removed)
    }

    fn count(&self) -> Result<usize, Error> {
        Ok(self.nodes.len())
    }

    fn clear(&mut self) -> Result<(), Error> {
        self.nodes.clear();
        self.index = RTree::new();
        Ok(())
    }

    fn nearest_node(&self, point: Point<f64>) -> Result<Option<Node>, Error> {
        Ok(self
            .index
            .nearest_neighbor(&[point.x(), point.y()])
            .and_then(|entry| self.nodes.get(&entry.data))
            .cloned())
    }

    fn nodes_within(&self, point: Point<f64>, radius: f64) -> Result<Vec<Node>, Error> {
        let mut found: Vec<Node> = self
            .index
            .locate_within_distance([point.x(), point.y()], radius * radius)
            .filter_map(|entry| self.nodes.get(&entry.data))
            .cloned()
            .collect();
        found.sort_unstable_by_key(|n| n.id);
        Ok(found)
    }
}
