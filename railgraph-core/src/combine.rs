//! Combination of (nearly) parallel tracks
//!
//! Double tracks leave a switch as two branches enclosing a small angle.
//! [`anglecombine`] folds such branch pairs into a single track, one node
//! pair at a time, until no junction has two branches closer than the
//! tolerance.

use std::collections::VecDeque;

use hashbrown::HashSet;
use itertools::Itertools;
use log::{debug, info, trace, warn};

use crate::geometry::{DistanceFn, angle_between, midpoint};
use crate::store::{GraphStore, junctions, merge_nodes};
use crate::{Error, Node, NodeId};

/// Merges pairs of neighbors that leave a node at an angle smaller than
/// `epsilon` degrees.
///
/// All junctions are queued. For the first pair of neighbors of a queued
/// node whose vectors enclose a defined, non-zero angle below `epsilon`,
/// the first neighbor is moved to the midpoint of both and the second is
/// merged into it. The node is then retried first and the moved neighbor
/// is queued last. Neighbors listed in `keep_ids` are never moved or
/// merged.
///
/// Returns the number of merges.
///
/// # Errors
///
/// [`Error::InvalidArgument`] unless `0 < epsilon <= 180`, or any storage
/// error.
pub fn anglecombine<S, F>(
    store: &mut S,
    epsilon: f64,
    keep_ids: &[NodeId],
    distance: &F,
) -> Result<usize, Error>
where
    S: GraphStore + ?Sized,
    F: DistanceFn + ?Sized,
{
    if !(epsilon > 0.0 && epsilon <= 180.0) {
        return Err(Error::InvalidArgument(format!(
            "Angle epsilon must be in (0, 180], got {epsilon}"
        )));
    }

    let keep: HashSet<NodeId> = keep_ids.iter().copied().collect();
    let mut queue: VecDeque<NodeId> = junctions(store)?.iter().map(|n| n.id).collect();
    info!("Combining parallel tracks at {} junctions", queue.len());

    let mut merges = 0;
    while let Some(id) = queue.pop_front() {
        let Some(node) = store.find_node(id)? else {
            continue;
        };
        trace!("{} nodes left to check", queue.len());

        let Some((mut target, merged)) = find_parallel_pair(store, &node, epsilon, &keep)? else {
            continue;
        };

        debug!("Merging {} into {} next to {}", merged.id, target.id, node.id);
        target.loc = midpoint(target.loc.0, merged.loc.0).into();
        let target_id = target.id;
        store.save_node(target)?;
        merge_nodes(store, target_id, &[merged.id], distance)?;
        merges += 1;

        queue.push_front(node.id);
        queue.push_back(target_id);
    }

    info!("Combined {merges} pairs of parallel tracks");
    Ok(merges)
}

fn find_parallel_pair<S>(
    store: &S,
    node: &Node,
    epsilon: f64,
    keep: &HashSet<NodeId>,
) -> Result<Option<(Node, Node)>, Error>
where
    S: GraphStore + ?Sized,
{
    let mut neighbors = Vec::with_capacity(node.degree());
    for id in node.neighbors() {
        match store.find_node(id)? {
            Some(neighbor) => neighbors.push(neighbor),
            None => warn!("{}'s neighbor {id} does not exist, skipping it", node.id),
        }
    }

    let pair = neighbors
        .iter()
        .tuple_combinations()
        .filter(|(a, b)| !keep.contains(&a.id) && !keep.contains(&b.id))
        .find(|(a, b)| {
            matches!(
                angle_between(a.loc.0 - node.loc.0, b.loc.0 - node.loc.0),
                Some(angle) if angle > 0.0 && angle < epsilon
            )
        });

    Ok(pair.map(|(a, b)| (a.clone(), b.clone())))
}
