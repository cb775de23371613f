//! Mutating operations on a railway graph
//!
//! All of them keep both directions of an edge consistent. References to
//! nodes that don't exist are logged and skipped: railway source data is
//! known to contain such dangling edges.

use geo::Point;
use hashbrown::{HashMap, HashSet};
use itertools::Itertools;
use log::{debug, error, info, warn};

use super::{GraphStore, query::locs_for};
use crate::geometry::DistanceFn;
use crate::{Error, Node, NodeId, Successor, TrackPoint};

/// Writes the polyline `points` into `store` as a chain of nodes.
///
/// Every point is linked to its predecessor and successor in the sequence,
/// with edge lengths computed by `distance`. Node ids are kept. If a node
/// already exists its successors are extended instead of overwritten, which
/// is how chains sharing a point turn that point into a junction.
///
/// Returns the number of already existing nodes that were modified.
///
/// # Errors
///
/// [`Error::InvalidInput`] if fewer than two points are given.
pub fn create_graph<S, F>(store: &mut S, points: &[TrackPoint], distance: &F) -> Result<usize, Error>
where
    S: GraphStore + ?Sized,
    F: DistanceFn + ?Sized,
{
    if points.len() < 2 {
        return Err(Error::InvalidInput(format!(
            "At least two points are required, got {}",
            points.len()
        )));
    }

    let mut modified = 0;

    for (i, point) in points.iter().enumerate() {
        let mut neighbors = Vec::with_capacity(2);

        // node has a predecessor
        if let Some(prev) = i.checked_sub(1).map(|j| &points[j]) {
            neighbors.push(Successor::new(
                prev.id,
                distance.distance(point.point(), prev.point()),
            ));
        }

        // node has a successor
        if let Some(next) = points.get(i + 1) {
            neighbors.push(Successor::new(
                next.id,
                distance.distance(point.point(), next.point()),
            ));
        }

        match store.find_node(point.id)? {
            Some(mut existing) => {
                existing.extend_successors(neighbors);
                store.save_node(existing)?;
                modified += 1;
            }
            None => {
                store.insert_node(Node::new(point.id, point.point()).with_successors(neighbors))?;
            }
        }
    }

    Ok(modified)
}

/// Reads the nodes `node_ids` (in that order) from `source` and writes
/// them as a chain into `dest`, see [`create_graph`].
pub fn create_graph_from<S, D, F>(
    node_ids: &[NodeId],
    source: &S,
    dest: &mut D,
    distance: &F,
) -> Result<usize, Error>
where
    S: GraphStore + ?Sized,
    D: GraphStore + ?Sized,
    F: DistanceFn + ?Sized,
{
    let points = locs_for(source, node_ids)?;
    create_graph(dest, &points, distance)
}

/// Merges the nodes `merge_ids` into the node `survivor_id`.
///
/// The merged nodes are deleted. Their external neighbors (and those of
/// the survivor) lose every edge into the merged set and get exactly one
/// edge to the survivor, with its length recomputed from the survivor's
/// location. The survivor ends up with exactly one edge to each external
/// neighbor.
///
/// Returns the number of nodes removed. Merge ids and neighbors that don't
/// exist are logged and skipped.
///
/// # Errors
///
/// [`Error::MissingNode`] if the survivor doesn't exist, or any storage
/// error.
pub fn merge_nodes<S, F>(
    store: &mut S,
    survivor_id: NodeId,
    merge_ids: &[NodeId],
    distance: &F,
) -> Result<usize, Error>
where
    S: GraphStore + ?Sized,
    F: DistanceFn + ?Sized,
{
    let mut survivor = store.node(survivor_id)?;

    let merge_set: HashSet<NodeId> = merge_ids
        .iter()
        .copied()
        .filter(|&id| id != survivor_id)
        .collect();

    // External neighbors in order of first appearance
    let mut external: Vec<NodeId> = Vec::new();
    let mut seen: HashSet<NodeId> = HashSet::new();
    let mut collect_external = |ids: &mut dyn Iterator<Item = NodeId>| {
        for id in ids {
            if id != survivor_id && !merge_set.contains(&id) && seen.insert(id) {
                external.push(id);
            }
        }
    };

    collect_external(&mut survivor.neighbors());

    let mut removed = 0;
    for &merge_id in merge_ids.iter().unique().filter(|&&id| id != survivor_id) {
        match store.delete_node(merge_id)? {
            Some(merged) => {
                collect_external(&mut merged.neighbors());
                removed += 1;
            }
            None => warn!("Cannot merge {merge_id} into {survivor_id}: there is no such node"),
        }
    }

    let mut successors = Vec::with_capacity(external.len());
    for neighbor_id in external {
        let Some(mut neighbor) = store.find_node(neighbor_id)? else {
            error!("{survivor_id}'s neighbor {neighbor_id} does not exist.");
            continue;
        };

        let edge_length = distance.distance(survivor.loc, neighbor.loc);
        neighbor
            .successors
            .retain(|s| s.id != survivor_id && !merge_set.contains(&s.id));
        neighbor
            .successors
            .push(Successor::new(survivor_id, edge_length));
        store.save_node(neighbor)?;

        successors.push(Successor::new(neighbor_id, edge_length));
    }

    survivor.successors = successors;
    store.save_node(survivor)?;

    Ok(removed)
}

/// Merges all nodes sharing the exact same location.
///
/// Within every group of duplicates the node with the lowest id survives.
/// Returns the number of nodes removed.
pub fn dedup<S, F>(store: &mut S, distance: &F) -> Result<usize, Error>
where
    S: GraphStore + ?Sized,
    F: DistanceFn + ?Sized,
{
    // nodes come ordered by id, so every group is sorted as well
    let mut groups: Vec<Vec<NodeId>> = store
        .all_nodes()?
        .iter()
        .map(|node| (location_key(node.loc), node.id))
        .into_group_map()
        .into_values()
        .filter(|ids| ids.len() > 1)
        .collect();
    groups.sort_unstable();

    let mut removed = 0;
    for ids in groups {
        if let Some((&survivor, duplicates)) = ids.split_first() {
            debug!("Merging duplicates {duplicates:?} into {survivor}");
            removed += merge_nodes(store, survivor, duplicates, distance)?;
        }
    }

    info!("Removed {removed} duplicate nodes");
    Ok(removed)
}

/// Bit pattern of a location, with negative zero folded into zero
fn location_key(loc: Point<f64>) -> (u64, u64) {
    ((loc.x() + 0.0).to_bits(), (loc.y() + 0.0).to_bits())
}

/// Deletes every node without neighbors and returns how many there were.
pub fn remove_lonely_nodes<S>(store: &mut S) -> Result<usize, Error>
where
    S: GraphStore + ?Sized,
{
    let lonely = store.find_nodes_where(&|node| node.successors.is_empty())?;
    for node in &lonely {
        store.delete_node(node.id)?;
    }

    debug!("Removed {} lonely nodes", lonely.len());
    Ok(lonely.len())
}

/// Replaces the contents of `dest` with a copy of every node in `source`.
///
/// Everything stored in `dest` before is erased.
pub fn copy<S, D>(source: &S, dest: &mut D) -> Result<usize, Error>
where
    S: GraphStore + ?Sized,
    D: GraphStore + ?Sized,
{
    dest.clear()?;

    let nodes = source.all_nodes()?;
    let copied = nodes.len();
    for node in nodes {
        dest.insert_node(node)?;
    }

    debug!("Copied {copied} nodes");
    Ok(copied)
}

/// Recomputes the length of every edge with `distance`.
///
/// Edges to missing nodes keep their length. Returns the number of edges
/// updated.
pub fn recompute_distances<S, F>(store: &mut S, distance: &F) -> Result<usize, Error>
where
    S: GraphStore + ?Sized,
    F: DistanceFn + ?Sized,
{
    let nodes = store.all_nodes()?;
    let locations: HashMap<NodeId, Point<f64>> = nodes.iter().map(|n| (n.id, n.loc)).collect();

    let mut updated = 0;
    for mut node in nodes {
        for successor in &mut node.successors {
            match locations.get(&successor.id) {
                Some(&loc) => {
                    successor.distance = distance.distance(node.loc, loc);
                    updated += 1;
                }
                None => warn!("{}'s neighbor {} does not exist.", node.id, successor.id),
            }
        }
        store.save_node(node)?;
    }

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::geometry::Distance;
    use crate::store::MemoryStore;

    fn chain(points: &[(f64, f64, NodeId)]) -> Vec<TrackPoint> {
        points.iter().copied().map(TrackPoint::from).collect()
    }

    fn neighbors(store: &MemoryStore, id: NodeId) -> Vec<NodeId> {
        store.node(id).unwrap().neighbors().collect()
    }

    /// Two chains sharing the point with id 2
    fn junction_graph() -> MemoryStore {
        let mut store = MemoryStore::new();
        let line = chain(&[(1.0, 1.0, 0), (2.0, 1.0, 1), (3.0, 1.0, 2), (4.0, 1.0, 3)]);
        let cross = chain(&[(3.0, 0.0, 4), (3.0, 1.0, 2), (3.0, 5.0, 5)]);
        create_graph(&mut store, &line, &Distance::Euclidean).unwrap();
        create_graph(&mut store, &cross, &Distance::Euclidean).unwrap();
        store
    }

    #[test]
    fn create_graph_builds_a_chain() {
        let mut store = MemoryStore::new();
        let points = chain(&[(0.0, 0.0, 10), (3.0, 4.0, 11), (3.0, 5.0, 12)]);
        let modified = create_graph(&mut store, &points, &Distance::Euclidean).unwrap();

        assert_eq!(modified, 0);
        assert_eq!(store.count().unwrap(), 3);
        assert_eq!(neighbors(&store, 10), vec![11]);
        assert_eq!(neighbors(&store, 11), vec![10, 12]);
        assert_eq!(neighbors(&store, 12), vec![11]);

        let middle = store.node(11).unwrap();
        assert_relative_eq!(middle.successors[0].distance, 5.0);
        assert_relative_eq!(middle.successors[1].distance, 1.0);
        assert_eq!(middle.loc, Point::new(3.0, 4.0));
    }

    #[test]
    fn shared_points_become_junctions() {
        let store = junction_graph();
        assert_eq!(store.count().unwrap(), 6);
        assert_eq!(neighbors(&store, 2), vec![1, 3, 4, 5]);
        assert!(store.node(2).unwrap().is_junction());
    }

    #[test]
    fn create_graph_extends_without_duplicates() {
        let mut store = MemoryStore::new();
        let points = chain(&[(0.0, 0.0, 1), (1.0, 0.0, 2)]);
        create_graph(&mut store, &points, &Distance::Euclidean).unwrap();
        let modified = create_graph(&mut store, &points, &Distance::Euclidean).unwrap();

        assert_eq!(modified, 2);
        assert_eq!(neighbors(&store, 1), vec![2]);
        assert_eq!(neighbors(&store, 2), vec![1]);
    }

    #[test]
    fn create_graph_needs_two_points() {
        let mut store = MemoryStore::new();
        let result = create_graph(&mut store, &chain(&[(0.0, 0.0, 1)]), &Distance::Euclidean);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn create_graph_from_keeps_given_order() {
        let source = junction_graph();
        let mut dest = MemoryStore::new();
        create_graph_from(&[0, 2, 5], &source, &mut dest, &Distance::Euclidean).unwrap();

        assert_eq!(dest.count().unwrap(), 3);
        assert_eq!(neighbors(&dest, 2), vec![0, 5]);

        let result = create_graph_from(&[0, 42], &source, &mut dest, &Distance::Euclidean);
        assert!(matches!(result, Err(Error::MissingNode(42))));
    }

    #[test]
    fn merge_repoints_external_neighbors() {
        let mut store = MemoryStore::new();
        let d = Distance::Euclidean;
        create_graph(&mut store, &chain(&[(2.0, 0.0, 4), (1.0, 0.0, 2), (1.0, 1.0, 6)]), &d).unwrap();
        create_graph(&mut store, &chain(&[(0.0, 2.0, 5), (0.0, 1.0, 3), (1.0, 1.0, 6)]), &d).unwrap();
        create_graph(&mut store, &chain(&[(0.0, 0.0, 1), (1.0, 0.0, 2)]), &d).unwrap();
        create_graph(&mut store, &chain(&[(0.0, 0.0, 1), (0.5, -0.5, 7), (1.0, 0.0, 2)]), &d).unwrap();
        create_graph(&mut store, &chain(&[(0.0, 0.0, 1), (0.0, 1.0, 3)]), &d).unwrap();
        assert_eq!(store.count().unwrap(), 7);

        let removed = merge_nodes(&mut store, 1, &[2, 3], &d).unwrap();

        assert_eq!(removed, 2);
        assert_eq!(store.count().unwrap(), 5);
        assert_eq!(neighbors(&store, 1), vec![7, 4, 6, 5]);

        for id in [4, 5, 6, 7] {
            let node = store.node(id).unwrap();
            let to_survivor: Vec<&Successor> =
                node.successors.iter().filter(|s| s.id == 1).collect();
            assert_eq!(to_survivor.len(), 1, "node {id}");
            assert!(!node.has_neighbor(2) && !node.has_neighbor(3));
        }

        assert_relative_eq!(store.node(7).unwrap().successors[0].distance, 0.5f64.sqrt());
        assert_relative_eq!(store.node(4).unwrap().successors[0].distance, 2.0);
    }

    #[test]
    fn merge_skips_dangling_references() {
        let mut store = MemoryStore::new();
        create_graph(
            &mut store,
            &chain(&[(0.0, 0.0, 1), (1.0, 0.0, 2), (2.0, 0.0, 3)]),
            &Distance::Euclidean,
        )
        .unwrap();

        // node 2 points to a node that was never stored
        let mut broken = store.node(2).unwrap();
        broken.successors.push(Successor::new(99, 1.0));
        store.save_node(broken).unwrap();

        let removed = merge_nodes(&mut store, 1, &[2, 98], &Distance::Euclidean).unwrap();
        assert_eq!(removed, 1);
        assert_eq!(neighbors(&store, 1), vec![3]);
        assert_eq!(neighbors(&store, 3), vec![1]);
    }

    #[test]
    fn merge_into_missing_survivor_fails() {
        let mut store = junction_graph();
        let result = merge_nodes(&mut store, 42, &[1], &Distance::Euclidean);
        assert!(matches!(result, Err(Error::MissingNode(42))));
        assert_eq!(store.count().unwrap(), 6);
    }

    #[test]
    fn dedup_restores_node_count() {
        let mut store = junction_graph();
        let before = store.count().unwrap();

        // a second node on top of node 3, hanging off node 5
        create_graph(
            &mut store,
            &chain(&[(3.0, 5.0, 5), (4.0, 1.0, 30)]),
            &Distance::Euclidean,
        )
        .unwrap();
        assert_eq!(store.count().unwrap(), before + 1);

        let removed = dedup(&mut store, &Distance::Euclidean).unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.count().unwrap(), before);

        // the lowest id survives and inherits the edge
        assert!(store.find_node(30).unwrap().is_none());
        assert_eq!(neighbors(&store, 3), vec![2, 5]);
        assert_eq!(neighbors(&store, 5), vec![2, 3]);
    }

    #[test]
    fn lonely_nodes_are_removed() {
        let mut store = junction_graph();
        store.insert_node(Node::new(100, Point::new(9.0, 9.0))).unwrap();
        store.insert_node(Node::new(101, Point::new(8.0, 9.0))).unwrap();

        assert_eq!(remove_lonely_nodes(&mut store).unwrap(), 2);
        assert_eq!(store.count().unwrap(), 6);
        assert_eq!(remove_lonely_nodes(&mut store).unwrap(), 0);
    }

    #[test]
    fn copy_replaces_destination() {
        let source = junction_graph();
        let mut dest = MemoryStore::new();
        dest.insert_node(Node::new(77, Point::new(0.0, 0.0))).unwrap();

        assert_eq!(copy(&source, &mut dest).unwrap(), 6);
        assert_eq!(dest.all_nodes().unwrap(), source.all_nodes().unwrap());
    }

    #[test]
    fn distances_can_be_recomputed() {
        let mut store = junction_graph();
        let updated = recompute_distances(&mut store, &|_: Point<f64>, _: Point<f64>| 7.0).unwrap();

        assert_eq!(updated, 10);
        assert!(
            store
                .all_nodes()
                .unwrap()
                .iter()
                .flat_map(|n| n.successors.iter())
                .all(|s| s.distance == 7.0)
        );
    }
}
