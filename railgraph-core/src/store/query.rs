//! Read-only queries over a railway graph

use hashbrown::{HashMap, HashSet};
use petgraph::algo::connected_components;
use petgraph::graph::{NodeIndex, UnGraph};

use super::GraphStore;
use crate::{Error, Node, NodeId, TrackPoint};

/// All nodes with exactly `degree` neighbors, ordered by id.
pub fn nodes_with_degree<S>(store: &S, degree: usize) -> Result<Vec<Node>, Error>
where
    S: GraphStore + ?Sized,
{
    store.find_nodes_where(&|node| node.degree() == degree)
}

/// All nodes whose number of neighbors differs from `degree`.
pub fn nodes_with_degree_ne<S>(store: &S, degree: usize) -> Result<Vec<Node>, Error>
where
    S: GraphStore + ?Sized,
{
    store.find_nodes_where(&|node| node.degree() != degree)
}

pub fn endpoints<S>(store: &S) -> Result<Vec<Node>, Error>
where
    S: GraphStore + ?Sized,
{
    nodes_with_degree(store, 1)
}

pub fn junctions<S>(store: &S) -> Result<Vec<Node>, Error>
where
    S: GraphStore + ?Sized,
{
    store.find_nodes_where(&|node| node.is_junction())
}

/// Edges `(from, to)` whose target node doesn't exist.
pub fn inconsistent_edges<S>(store: &S) -> Result<Vec<(NodeId, NodeId)>, Error>
where
    S: GraphStore + ?Sized,
{
    let nodes = store.all_nodes()?;
    let ids: HashSet<NodeId> = nodes.iter().map(|n| n.id).collect();

    Ok(nodes
        .iter()
        .flat_map(|node| {
            node.neighbors()
                .filter(|id| !ids.contains(id))
                .map(move |id| (node.id, id))
        })
        .collect())
}

/// Locations of `ids`, in the given order.
///
/// # Errors
///
/// [`Error::MissingNode`] for the first id that doesn't exist.
pub fn locs_for<S>(store: &S, ids: &[NodeId]) -> Result<Vec<TrackPoint>, Error>
where
    S: GraphStore + ?Sized,
{
    ids.iter()
        .map(|&id| store.node(id).map(|node| node.triplet()))
        .collect()
}

/// Converts the store into an undirected petgraph graph.
///
/// Node weights are node ids, edge weights edge lengths. Each neighboring
/// pair becomes a single edge; edges to missing nodes are left out.
pub fn to_ungraph<S>(store: &S) -> Result<UnGraph<NodeId, f64>, Error>
where
    S: GraphStore + ?Sized,
{
    let nodes = store.all_nodes()?;
    let mut graph = UnGraph::with_capacity(nodes.len(), nodes.len());

    let indices: HashMap<NodeId, NodeIndex> = nodes
        .iter()
        .map(|node| (node.id, graph.add_node(node.id)))
        .collect();

    let mut added: HashSet<(NodeId, NodeId)> = HashSet::new();
    for node in &nodes {
        for successor in &node.successors {
            let Some(&to) = indices.get(&successor.id) else {
                continue;
            };
            let key = (node.id.min(successor.id), node.id.max(successor.id));
            if added.insert(key) {
                graph.add_edge(indices[&node.id], to, successor.distance);
            }
        }
    }

    Ok(graph)
}

/// Number of connected components of the graph
pub fn component_count<S>(store: &S) -> Result<usize, Error>
where
    S: GraphStore + ?Sized,
{
    Ok(connected_components(&to_ungraph(store)?))
}
