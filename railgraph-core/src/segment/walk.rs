use hashbrown::HashSet;
use log::warn;

use crate::store::GraphStore;
use crate::{Error, Node, NodeId};

/// Follows the track from `start`, appending to `path`.
///
/// Stops when `start` (or a later node) is already part of the path, or
/// after appending the first node that doesn't have exactly one neighbor
/// outside the path. A neighbor missing from the store ends the path.
pub(crate) fn walk<S>(store: &S, start: Node, mut path: Vec<Node>) -> Result<Vec<Node>, Error>
where
    S: GraphStore + ?Sized,
{
    let mut in_path: HashSet<NodeId> = path.iter().map(|n| n.id).collect();
    let mut current = start;

    loop {
        if in_path.contains(&current.id) {
            return Ok(path);
        }

        let next_id = {
            let mut outside = current.neighbors().filter(|id| !in_path.contains(id));
            match (outside.next(), outside.next()) {
                (Some(id), None) => Some(id),
                _ => None,
            }
        };

        in_path.insert(current.id);
        let current_id = current.id;
        path.push(current);

        let Some(next_id) = next_id else {
            return Ok(path);
        };

        match store.find_node(next_id)? {
            Some(next) => current = next,
            None => {
                warn!("{current_id}'s neighbor {next_id} does not exist, ending segment there");
                return Ok(path);
            }
        }
    }
}
