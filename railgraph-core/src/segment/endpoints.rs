use hashbrown::HashSet;
use itertools::Itertools;
use log::{debug, warn};

use super::walk::walk;
use super::{Segment, Segmenter};
use crate::geometry::angle_at_vertex;
use crate::store::{GraphStore, nodes_with_degree_ne};
use crate::{Error, Node, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Endpoints,
    Continuous,
}

/// Segments a graph starting from its endpoints and junctions (the "ES"
/// nodes, every node whose degree isn't 2).
///
/// For every ES node in id order and each of its neighbors, the track is
/// walked until the next ES node. Every leg is yielded once: the edges of
/// emitted segments are remembered, and an already visited neighbor is
/// only walked to if it is a junction that hasn't been processed as a
/// root yet, which keeps short junction-to-junction legs.
pub struct EsSegmenter<'a, S: GraphStore + ?Sized> {
    store: &'a S,
    mode: Mode,
    roots: Vec<Node>,
    root_pos: usize,
    neighbor_pos: usize,
    visited: HashSet<NodeId>,
    processed: HashSet<NodeId>,
    covered: HashSet<(NodeId, NodeId)>,
    done: bool,
}

impl<'a, S: GraphStore + ?Sized> EsSegmenter<'a, S> {
    /// Segments ending at every endpoint and junction.
    pub fn new(store: &'a S) -> Result<Self, Error> {
        Self::with_mode(store, Mode::Endpoints)
    }

    /// Segments that continue through a junction along the branch closest
    /// to straight ahead, as long as an unvisited branch is left.
    pub fn continuous(store: &'a S) -> Result<Self, Error> {
        Self::with_mode(store, Mode::Continuous)
    }

    fn with_mode(store: &'a S, mode: Mode) -> Result<Self, Error> {
        let roots = nodes_with_degree_ne(store, 2)?;
        debug!("Segmenting from {} endpoints and junctions", roots.len());

        Ok(Self {
            store,
            mode,
            roots,
            root_pos: 0,
            neighbor_pos: 0,
            visited: HashSet::new(),
            processed: HashSet::new(),
            covered: HashSet::new(),
            done: false,
        })
    }

    fn next_leg(&mut self) -> Result<Option<Segment>, Error> {
        loop {
            let Some(root) = self.roots.get(self.root_pos) else {
                return Ok(None);
            };
            let root_id = root.id;

            let Some(neighbor_id) = root.successors.get(self.neighbor_pos).map(|s| s.id) else {
                self.processed.insert(root_id);
                self.root_pos += 1;
                self.neighbor_pos = 0;
                continue;
            };
            self.neighbor_pos += 1;

            if self.covered.contains(&edge(root_id, neighbor_id)) {
                continue;
            }

            let Some(neighbor) = self.store.find_node(neighbor_id)? else {
                warn!("{root_id}'s neighbor {neighbor_id} does not exist, skipping it");
                continue;
            };

            if self.visited.contains(&neighbor_id)
                && (self.processed.contains(&neighbor_id) || neighbor.degree() < 3)
            {
                continue;
            }

            let prefix = vec![self.roots[self.root_pos].clone()];
            let mut path = walk(self.store, neighbor, prefix)?;
            if self.mode == Mode::Continuous {
                path = self.continue_through_junctions(path)?;
            }

            self.record(&path);
            return Ok(Some(Segment::new(path)));
        }
    }

    /// Extends a path ending at a junction by the unvisited branch with the
    /// widest angle (closest to 180°), repeatedly. The first branch wins on
    /// ties.
    fn continue_through_junctions(&self, mut path: Vec<Node>) -> Result<Vec<Node>, Error> {
        loop {
            let [.., prev, last] = path.as_slice() else {
                return Ok(path);
            };
            if !last.is_junction() {
                return Ok(path);
            }

            let in_path: HashSet<NodeId> = path.iter().map(|n| n.id).collect();
            let mut straightest: Option<(f64, Node)> = None;

            for id in last.neighbors() {
                if self.visited.contains(&id) || in_path.contains(&id) {
                    continue;
                }
                let Some(candidate) = self.store.find_node(id)? else {
                    warn!("{}'s neighbor {id} does not exist, skipping it", last.id);
                    continue;
                };
                let Some(angle) = angle_at_vertex(prev.loc.0, last.loc.0, candidate.loc.0) else {
                    continue;
                };
                if straightest.as_ref().is_none_or(|(best, _)| angle > *best) {
                    straightest = Some((angle, candidate));
                }
            }

            let Some((angle, next)) = straightest else {
                return Ok(path);
            };
            debug!("Continuing through junction {} towards {} ({angle}°)", last.id, next.id);
            path = walk(self.store, next, path)?;
        }
    }

    fn record(&mut self, path: &[Node]) {
        self.visited.extend(path.iter().map(|n| n.id));
        self.covered
            .extend(path.iter().tuple_windows().map(|(a, b)| edge(a.id, b.id)));
    }
}

/// Undirected edge key
fn edge(a: NodeId, b: NodeId) -> (NodeId, NodeId) {
    (a.min(b), a.max(b))
}

impl<S: GraphStore + ?Sized> Iterator for EsSegmenter<'_, S> {
    type Item = Result<Segment, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.next_leg() {
            Ok(Some(segment)) => Some(Ok(segment)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<S: GraphStore + ?Sized> Segmenter for EsSegmenter<'_, S> {
    fn estimated_num_segments(&self) -> usize {
        (self.roots.len() as f64 * 1.3) as usize
    }
}
