//! Lookup of graph nodes for externally identified stations

use geo::Point;
use hashbrown::HashMap;
use log::debug;

use crate::store::GraphStore;
use crate::{Error, NodeId};

/// Memo of station id to the id of the node closest to the station.
///
/// Resolving a station runs a nearest-neighbor query against the store
/// once; later lookups of the same station are answered from the cache.
/// The cache is owned by the caller and has to be invalidated when the
/// nodes it points to are merged or moved.
#[derive(Debug, Default, Clone)]
pub struct NearestNodeCache {
    nodes: HashMap<i64, NodeId>,
}

impl NearestNodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Node id for `station_id` located at `loc`.
    ///
    /// Returns `None` if the store is empty.
    pub fn node_for<S>(
        &mut self,
        station_id: i64,
        loc: Point<f64>,
        store: &S,
    ) -> Result<Option<NodeId>, Error>
    where
        S: GraphStore + ?Sized,
    {
        if let Some(&node_id) = self.nodes.get(&station_id) {
            return Ok(Some(node_id));
        }

        let Some(node) = store.nearest_node(loc)? else {
            return Ok(None);
        };
        debug!("Station {station_id} resolved to node {}", node.id);
        self.nodes.insert(station_id, node.id);
        Ok(Some(node.id))
    }

    /// Forgets a single station.
    pub fn invalidate(&mut self, station_id: i64) -> Option<NodeId> {
        self.nodes.remove(&station_id)
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
