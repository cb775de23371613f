use std::collections::VecDeque;
use std::mem;

use hashbrown::HashSet;

use super::{Segment, Segmenter};
use crate::{Error, NodeId};

/// Re-splits the segments of another segmenter at station nodes.
///
/// A station inside a segment ends one piece and starts the next, so the
/// station is kept as a shared end point. Pieces shorter than two nodes
/// are dropped.
pub struct StationSplitter<G> {
    inner: G,
    stations: HashSet<NodeId>,
    pending: VecDeque<Segment>,
}

impl<G: Segmenter> StationSplitter<G> {
    pub fn new(inner: G, stations: impl IntoIterator<Item = NodeId>) -> Self {
        Self {
            inner,
            stations: stations.into_iter().collect(),
            pending: VecDeque::new(),
        }
    }

    fn split(&self, segment: Segment) -> Vec<Segment> {
        let mut pieces = Vec::new();
        let mut piece = Vec::with_capacity(segment.len());

        for node in segment.nodes {
            if self.stations.contains(&node.id) {
                piece.push(node.clone());
                pieces.push(Segment::new(mem::replace(&mut piece, vec![node])));
            } else {
                piece.push(node);
            }
        }
        pieces.push(Segment::new(piece));

        pieces.retain(|piece| piece.len() >= 2);
        pieces
    }
}

impl<G: Segmenter> Iterator for StationSplitter<G> {
    type Item = Result<Segment, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(piece) = self.pending.pop_front() {
                return Some(Ok(piece));
            }

            match self.inner.next()? {
                Ok(segment) => {
                    let pieces = self.split(segment);
                    self.pending.extend(pieces);
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

impl<G: Segmenter> Segmenter for StationSplitter<G> {
    fn estimated_num_segments(&self) -> usize {
        self.inner.estimated_num_segments() + self.stations.len()
    }
}

#[cfg(test)]
mod tests {
    use geo::Point;

    use super::*;
    use crate::Node;

    /// Yields prepared segments
    struct Fixed(std::vec::IntoIter<Segment>);

    impl Iterator for Fixed {
        type Item = Result<Segment, Error>;

        fn next(&mut self) -> Option<Self::Item> {
            self.0.next().map(Ok)
        }
    }

    impl Segmenter for Fixed {
        fn estimated_num_segments(&self) -> usize {
            self.0.len()
        }
    }

    fn segment(ids: &[NodeId]) -> Segment {
        Segment::new(
            ids.iter()
                .map(|&id| Node::new(id, Point::new(id as f64, 0.0)))
                .collect(),
        )
    }

    fn split(segments: &[&[NodeId]], stations: &[NodeId]) -> Vec<Vec<NodeId>> {
        let inner = Fixed(segments.iter().map(|ids| segment(ids)).collect::<Vec<_>>().into_iter());
        StationSplitter::new(inner, stations.iter().copied())
            .map(|s| s.unwrap().ids())
            .collect()
    }

    #[test]
    fn splits_at_stations() {
        assert_eq!(
            split(&[&[1, 2, 3, 4, 5], &[6, 7]], &[3]),
            vec![vec![1, 2, 3], vec![3, 4, 5], vec![6, 7]]
        );
    }

    #[test]
    fn stations_at_the_ends_leave_no_stubs() {
        assert_eq!(
            split(&[&[1, 2, 3], &[3, 4]], &[1, 3]),
            vec![vec![1, 2, 3], vec![3, 4]]
        );
    }

    #[test]
    fn adjacent_stations() {
        assert_eq!(
            split(&[&[1, 2, 3, 4]], &[2, 3]),
            vec![vec![1, 2], vec![2, 3], vec![3, 4]]
        );
    }

    #[test]
    fn without_stations_segments_pass_through() {
        assert_eq!(split(&[&[1, 2], &[2, 3, 4]], &[]), vec![vec![1, 2], vec![2, 3, 4]]);
    }
}
