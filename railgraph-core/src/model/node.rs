//! Railway graph nodes and their successor edges

use geo::Point;
use serde::{Deserialize, Serialize};

use super::TrackPoint;
use crate::NodeId;

/// Edge towards a neighboring node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Successor {
    /// Id of the neighbor
    pub id: NodeId,
    /// Length of the edge, as computed by the distance function in use
    pub distance: f64,
}

impl Successor {
    pub fn new(id: NodeId, distance: f64) -> Self {
        Self { id, distance }
    }
}

/// Classification of a node by its number of neighbors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// No neighbors at all
    Lonely,
    /// Exactly one neighbor
    Endpoint,
    /// Exactly two neighbors, the node lies inside a segment
    Interior,
    /// Three or more neighbors (a switch or crossing)
    Junction,
}

/// A located node of the railway graph.
///
/// Edges are undirected in intent: if `a` lists `b` as a successor, `b`
/// is expected to list `a`. Every mutating graph operation keeps both
/// directions in sync. A node never lists itself and never lists the same
/// neighbor twice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    /// Location as `[x, y]` (longitude, latitude for geographic data)
    #[serde(with = "loc_format")]
    pub loc: Point<f64>,
    pub successors: Vec<Successor>,
}

impl Node {
    pub fn new(id: NodeId, loc: Point<f64>) -> Self {
        Self {
            id,
            loc,
            successors: Vec::new(),
        }
    }

    pub fn with_successors(mut self, successors: impl IntoIterator<Item = Successor>) -> Self {
        self.extend_successors(successors);
        self
    }

    pub fn degree(&self) -> usize {
        self.successors.len()
    }

    pub fn kind(&self) -> NodeKind {
        match self.degree() {
            0 => NodeKind::Lonely,
            1 => NodeKind::Endpoint,
            2 => NodeKind::Interior,
            _ => NodeKind::Junction,
        }
    }

    pub fn is_junction(&self) -> bool {
        self.kind() == NodeKind::Junction
    }

    /// Ids of all neighbors in successor order
    pub fn neighbors(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.successors.iter().map(|s| s.id)
    }

    pub fn has_neighbor(&self, id: NodeId) -> bool {
        self.successors.iter().any(|s| s.id == id)
    }

    /// Unions `other`'s successors into this node's, skipping ids that
    /// are already present.
    pub fn extend_neighbors(&mut self, other: &Node) {
        self.extend_successors(other.successors.iter().copied());
    }

    /// Adds every successor whose id is neither this node nor already a
    /// neighbor. Returns the number of successors added.
    pub fn extend_successors(&mut self, successors: impl IntoIterator<Item = Successor>) -> usize {
        let before = self.successors.len();
        for successor in successors {
            if successor.id != self.id && !self.has_neighbor(successor.id) {
                self.successors.push(successor);
            }
        }
        self.successors.len() - before
    }

    /// Drops every successor pointing to one of `ids`.
    pub fn remove_neighbors(&mut self, ids: &[NodeId]) {
        self.successors.retain(|s| !ids.contains(&s.id));
    }

    pub fn triplet(&self) -> TrackPoint {
        TrackPoint::new(self.loc.x(), self.loc.y(), self.id)
    }
}

/// (De)serializes a location as a plain `[x, y]` array
mod loc_format {
    use geo::Point;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub(super) fn serialize<S>(loc: &Point<f64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        [loc.x(), loc.y()].serialize(serializer)
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Point<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let [x, y] = <[f64; 2]>::deserialize(deserializer)?;
        Ok(Point::new(x, y))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn node(id: NodeId, neighbors: &[NodeId]) -> Node {
        Node::new(id, Point::new(0.0, 0.0))
            .with_successors(neighbors.iter().map(|&n| Successor::new(n, 1.0)))
    }

    #[test]
    fn kinds_follow_degree() {
        assert_eq!(node(0, &[]).kind(), NodeKind::Lonely);
        assert_eq!(node(0, &[1]).kind(), NodeKind::Endpoint);
        assert_eq!(node(0, &[1, 2]).kind(), NodeKind::Interior);
        assert_eq!(node(0, &[1, 2, 3]).kind(), NodeKind::Junction);
    }

    #[test]
    fn extend_skips_known_ids_and_self() {
        let mut a = node(1, &[2, 3]);
        let b = node(4, &[1, 3, 5]);
        a.extend_neighbors(&b);
        assert_eq!(a.neighbors().collect::<Vec<_>>(), vec![2, 3, 5]);
    }

    #[test]
    fn remove_neighbors_filters_ids() {
        let mut a = node(1, &[2, 3, 4]);
        a.remove_neighbors(&[2, 4, 9]);
        assert_eq!(a.neighbors().collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn persisted_shape() {
        let n = Node::new(7, Point::new(8.5, 49.25)).with_successors([Successor::new(3, 12.5)]);
        let value = serde_json::to_value(&n).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 7,
                "loc": [8.5, 49.25],
                "successors": [{ "id": 3, "distance": 12.5 }]
            })
        );

        let back: Node = serde_json::from_value(value).unwrap();
        assert_eq!(back, n);
    }
}
