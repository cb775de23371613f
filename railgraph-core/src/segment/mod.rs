//! Decomposition of a graph into linear segments
//!
//! A segment is a simple path whose two ends are endpoints or junctions and
//! whose interior nodes have exactly two neighbors. Segmenters are lazy
//! iterators over a borrowed [`GraphStore`](crate::GraphStore); they only
//! keep node ids for their own bookkeeping.

mod endpoints;
mod stations;
mod walk;

use geo::LineString;
use serde::{Deserialize, Serialize};

use crate::{Error, Node, NodeId, TrackPoint};

pub use endpoints::EsSegmenter;
pub use stations::StationSplitter;

/// An ordered path of nodes produced by a [`Segmenter`]
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub nodes: Vec<Node>,
}

impl Segment {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn ids(&self) -> Vec<NodeId> {
        self.nodes.iter().map(|n| n.id).collect()
    }

    /// The `(x, y, id)` points the simplification algorithms consume
    pub fn triplets(&self) -> Vec<TrackPoint> {
        self.nodes.iter().map(Node::triplet).collect()
    }

    pub fn line_string(&self) -> LineString<f64> {
        self.nodes.iter().map(|n| n.loc.0).collect()
    }

    /// Ids of junctions the segment passes through (not its two ends).
    ///
    /// A walk passes a junction whose other branches all lead back into
    /// the path, and continuous segments pass junctions on purpose.
    pub fn interior_junctions(&self) -> impl Iterator<Item = NodeId> + '_ {
        let inner = match self.nodes.as_slice() {
            [_, inner @ .., _] => inner,
            _ => &[],
        };
        inner.iter().filter(|n| n.is_junction()).map(|n| n.id)
    }
}

/// A lazy, finite, non-restartable sequence of segments.
///
/// Storage errors are yielded as `Err` and end the sequence.
pub trait Segmenter: Iterator<Item = Result<Segment, Error>> {
    /// Advisory forecast of the number of segments, for progress reporting
    /// only.
    fn estimated_num_segments(&self) -> usize;
}

impl<T: Segmenter + ?Sized> Segmenter for Box<T> {
    fn estimated_num_segments(&self) -> usize {
        (**self).estimated_num_segments()
    }
}

/// Which segmenter a pipeline run uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmenterKind {
    /// Segments stop at every endpoint and junction
    #[default]
    Endpoints,
    /// Segments continue through junctions along the straightest branch
    Continuous,
}

#[cfg(test)]
mod tests {
    use geo::{Point, coord};

    use super::*;
    use crate::Successor;

    fn node(id: NodeId, x: f64, neighbors: &[NodeId]) -> Node {
        Node::new(id, Point::new(x, 1.0))
            .with_successors(neighbors.iter().map(|&n| Successor::new(n, 1.0)))
    }

    #[test]
    fn segment_views() {
        let segment = Segment::new(vec![
            node(4, 0.0, &[7]),
            node(7, 1.0, &[4, 2, 9, 10]),
            node(2, 2.0, &[7, 3]),
            node(3, 3.0, &[2]),
        ]);

        assert_eq!(segment.ids(), vec![4, 7, 2, 3]);
        assert_eq!(segment.triplets()[1], TrackPoint::new(1.0, 1.0, 7));
        assert_eq!(segment.line_string().0[3], coord! { x: 3.0, y: 1.0 });
        assert_eq!(segment.interior_junctions().collect::<Vec<_>>(), vec![7]);
    }

    #[test]
    fn ends_are_not_interior() {
        let segment = Segment::new(vec![node(1, 0.0, &[2, 5, 6]), node(2, 1.0, &[1, 7, 8])]);
        assert_eq!(segment.interior_junctions().count(), 0);
    }
}
