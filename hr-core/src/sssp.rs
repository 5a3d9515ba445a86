//! Dijkstra's algorithm over a [`Graph`].
//!
//! Three flavours share one loop:
//! * [`SearchDirection::Unconstrained`] follows every outgoing edge.
//! * [`SearchDirection::Upward`] follows outgoing edges `u -> v` only when `v` is at least as
//!   important as `u`.
//! * [`SearchDirection::Downward`] walks incoming edges `v -> u` backwards, again only towards
//!   nodes at least as important as `u`.
//!
//! Once every node has been contracted and its shortcuts folded back in, any shortest path can be
//! rewritten as an upward part followed by a downward part, which is what makes the last two
//! flavours sufficient for a bidirectional query.
//!
//! The graph is only borrowed. Distances, predecessors and heap slots live in tables owned by the
//! search and indexed by node handle.

use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use petgraph::stable_graph::NodeIndex;
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use tracing::instrument;

use crate::errors::{
    Error,
    Result,
};
use crate::graph::{
    Graph,
    NodeId,
    Weight,
};
use crate::heap::{
    BinHeap,
    HeapKey,
};

/// Distance of a node the search never reached.
pub const UNREACHED: Weight = OrderedFloat(f64::INFINITY);

/// Which edges a search may follow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SearchDirection {
    /// Every outgoing edge.
    #[default]
    Unconstrained,
    /// Outgoing edges towards nodes of equal or higher importance.
    Upward,
    /// Incoming edges, reversed, towards nodes of equal or higher importance.
    Downward,
}

/// Frontier entry: a node and its tentative distance.
#[derive(Clone, Copy, Debug)]
struct Frontier {
    /// Handle of the node.
    node: NodeIndex,
    /// Tentative distance when the entry was last written.
    distance: Weight,
}

impl HeapKey for Frontier {
    fn heap_key(&self) -> usize {
        self.node.index()
    }
}

/// Final label of one node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Label {
    /// Shortest distance from the source, [`UNREACHED`] if there is no path.
    pub distance: Weight,
    /// Previous node on the shortest path. For a downward search this is the next node towards
    /// the target instead.
    pub predecessor: Option<NodeId>,
}

/// Outcome of one search: a label per node, in graph order.
#[derive(Clone, Debug, PartialEq)]
pub struct ShortestPaths {
    /// Where the search started.
    source: NodeId,
    /// Which edges were followed.
    direction: SearchDirection,
    /// Label per node id.
    labels: IndexMap<NodeId, Label>,
}

impl ShortestPaths {
    /// Where the search started.
    #[must_use]
    pub const fn source(&self) -> NodeId {
        self.source
    }

    /// Which edges were followed.
    #[must_use]
    pub const fn direction(&self) -> SearchDirection {
        self.direction
    }

    /// Label of `id`, `None` if `id` was not in the graph.
    #[must_use]
    pub fn label(&self, id: NodeId) -> Option<&Label> {
        self.labels.get(&id)
    }

    /// Distance to `id`, `None` if unreached or unknown.
    #[must_use]
    pub fn distance(&self, id: NodeId) -> Option<Weight> {
        self.label(id).map(|label| label.distance).filter(|&distance| distance != UNREACHED)
    }

    /// Whether a path to `id` was found.
    #[must_use]
    pub fn is_reached(&self, id: NodeId) -> bool {
        self.distance(id).is_some()
    }

    /// Predecessor of `id` on its shortest path.
    #[must_use]
    pub fn predecessor(&self, id: NodeId) -> Option<NodeId> {
        self.label(id).and_then(|label| label.predecessor)
    }

    /// Every distance in graph order, [`UNREACHED`] included.
    #[must_use]
    pub fn distances(&self) -> Vec<Weight> {
        self.labels.values().map(|label| label.distance).collect()
    }

    /// `(id, label)` pairs in graph order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Label)> + '_ {
        self.labels.iter().map(|(&id, label)| (id, label))
    }

    /// Node sequence from the source to `id` (for a downward search, from `id` to the source),
    /// `None` when `id` was not reached.
    #[must_use]
    pub fn path_to(&self, id: NodeId) -> Option<Vec<NodeId>> {
        self.distance(id)?;
        let mut path = vec![id];
        let mut current = id;
        while let Some(previous) = self.predecessor(current) {
            path.push(previous);
            current = previous;
        }
        if self.direction != SearchDirection::Downward {
            path.reverse();
        }
        Some(path)
    }
}

/// Importance of every node, indexed by handle. Only directional searches need it.
fn importance_table(graph: &Graph) -> Result<Vec<Weight>> {
    let mut table = vec![OrderedFloat(0.0); graph.handle_bound()];
    for (id, handle) in graph.handles() {
        table[handle.index()] = graph.inner()[handle].importance().ok_or(Error::MissingImportance(id))?;
    }
    Ok(table)
}

/// `(neighbour, weight)` pairs a search in `direction` may relax from `u`.
fn relaxable(
    graph: &Graph,
    importance: &[Weight],
    direction: SearchDirection,
    u: NodeIndex,
) -> Vec<(NodeIndex, Weight)> {
    let inner = graph.inner();
    let upward = |v: NodeIndex| importance[v.index()] >= importance[u.index()];
    match direction {
        SearchDirection::Unconstrained => inner
            .edges_directed(u, Direction::Outgoing)
            .map(|edge| (edge.target(), *edge.weight()))
            .collect(),
        SearchDirection::Upward => inner
            .edges_directed(u, Direction::Outgoing)
            .filter(|edge| upward(edge.target()))
            .map(|edge| (edge.target(), *edge.weight()))
            .collect(),
        SearchDirection::Downward => inner
            .edges_directed(u, Direction::Incoming)
            .filter(|edge| upward(edge.source()))
            .map(|edge| (edge.source(), *edge.weight()))
            .collect(),
    }
}

/// Run Dijkstra from `source`, following the edges `direction` allows.
///
/// Every node starts in the frontier: the source at distance zero and everything else at
/// [`UNREACHED`]. The graph is never modified.
///
/// # Errors
///
/// [`Error::NodeNotFound`] if `source` is absent, [`Error::MissingImportance`] if a directional
/// search meets an unranked node.
#[instrument(skip(graph), fields(nodes = graph.node_count(), edges = graph.edge_count()))]
pub fn search(graph: &Graph, source: NodeId, direction: SearchDirection) -> Result<ShortestPaths> {
    let start = graph.handle(source)?;
    let importance = match direction {
        SearchDirection::Unconstrained => Vec::new(),
        SearchDirection::Upward | SearchDirection::Downward => importance_table(graph)?,
    };

    let bound = graph.handle_bound();
    let mut distance = vec![UNREACHED; bound];
    let mut predecessor: Vec<Option<NodeIndex>> = vec![None; bound];
    distance[start.index()] = OrderedFloat(0.0);

    let seeds = graph.handles().map(|(_, node)| Frontier { node, distance: distance[node.index()] }).collect();
    let mut queue = BinHeap::tracked(seeds, |a: &Frontier, b: &Frontier| a.distance <= b.distance);

    while !queue.is_empty() {
        let Frontier { node: u, distance: du } = queue.remove_minimum()?;
        if du == UNREACHED {
            // everything still queued is unreachable too
            break;
        }

        for (v, weight) in relaxable(graph, &importance, direction, u) {
            let candidate = du + weight;
            if candidate >= distance[v.index()] {
                continue;
            }
            let Some(slot) = queue.position_of(v.index()) else { continue };

            distance[v.index()] = candidate;
            predecessor[v.index()] = Some(u);
            queue.decrease_key(slot, Frontier { node: v, distance: candidate })?;
        }
    }

    let inner = graph.inner();
    let labels = graph
        .handles()
        .map(|(id, handle)| {
            let label = Label {
                distance: distance[handle.index()],
                predecessor: predecessor[handle.index()].map(|p| inner[p].id()),
            };
            (id, label)
        })
        .collect();

    Ok(ShortestPaths { source, direction, labels })
}

/// Unconstrained Dijkstra from `source`.
///
/// # Errors
///
/// [`Error::NodeNotFound`] if `source` is absent.
pub fn dijkstra(graph: &Graph, source: NodeId) -> Result<ShortestPaths> {
    search(graph, source, SearchDirection::Unconstrained)
}

/// Forward half of a hierarchy query: only climbs towards more important nodes.
///
/// # Errors
///
/// See [`search`].
pub fn dijkstra_upward(graph: &Graph, source: NodeId) -> Result<ShortestPaths> {
    search(graph, source, SearchDirection::Upward)
}

/// Backward half of a hierarchy query: distances *to* `target`, again only via more important
/// nodes. Predecessors point one hop closer to `target`.
///
/// # Errors
///
/// See [`search`].
pub fn dijkstra_downward(graph: &Graph, target: NodeId) -> Result<ShortestPaths> {
    search(graph, target, SearchDirection::Downward)
}

#[cfg(test)]
mod tests;
