//! Point-to-point queries over a decorated graph.
//!
//! An upward search from the source and a downward search from the target each settle only the
//! part of the graph above their start node. Every node both searches reached is a candidate
//! meeting point; the one with the smallest combined distance lies on a shortest path.

use ordered_float::OrderedFloat;
use serde::Serialize;
use tracing::{
    debug,
    instrument,
};

use crate::errors::Result;
use crate::graph::{
    Graph,
    NodeId,
    Weight,
};
use crate::sssp::{
    dijkstra,
    dijkstra_downward,
    dijkstra_upward,
    ShortestPaths,
    UNREACHED,
};

/// Best meeting point of a bidirectional query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Meeting {
    /// Node minimising forward plus backward distance, `None` when the searches never met.
    pub node: Option<NodeId>,
    /// Forward plus backward distance through `node`, [`UNREACHED`] when they never met.
    pub distance: Weight,
}

/// Answer to a point-to-point query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Route {
    /// Start of the route.
    pub source: NodeId,
    /// End of the route.
    pub target: NodeId,
    /// Where the two searches met.
    pub meeting: Option<NodeId>,
    /// Length of the route, [`UNREACHED`] if there is none.
    pub distance: Weight,
    /// Nodes from `source` to `target`, empty if there is no route. Consecutive nodes may be
    /// joined by a shortcut rather than an original edge.
    pub path: Vec<NodeId>,
}

impl Route {
    /// Whether `target` can be reached from `source` at all. Check before trusting `path`.
    #[must_use]
    pub fn is_reachable(&self) -> bool {
        self.distance != UNREACHED
    }

    /// A route with no path.
    fn unreachable(source: NodeId, target: NodeId) -> Self {
        Self { source, target, meeting: None, distance: UNREACHED, path: Vec::new() }
    }
}

/// Scan every node settled by both searches for the smallest combined distance. Ties go to the
/// node that comes first in graph order.
fn best_meeting(forward: &ShortestPaths, backward: &ShortestPaths) -> Meeting {
    forward
        .iter()
        .filter_map(|(id, label)| {
            let down = backward.distance(id)?;
            (label.distance != UNREACHED).then(|| (id, label.distance + down))
        })
        .fold(Meeting { node: None, distance: UNREACHED }, |best, (id, distance)| {
            if distance < best.distance {
                Meeting { node: Some(id), distance }
            } else {
                best
            }
        })
}

/// Both halves of a bidirectional query.
fn search_both(graph: &Graph, source: NodeId, target: NodeId) -> Result<(ShortestPaths, ShortestPaths)> {
    Ok((dijkstra_upward(graph, source)?, dijkstra_downward(graph, target)?))
}

/// Meeting node and shortest distance from `source` to `target` over a decorated graph.
///
/// # Errors
///
/// [`crate::Error::NodeNotFound`] if either endpoint is absent, [`crate::Error::MissingImportance`]
/// if the graph was never ranked.
#[instrument(skip(graph))]
pub fn get_intersection(graph: &Graph, source: NodeId, target: NodeId) -> Result<Meeting> {
    let (forward, backward) = search_both(graph, source, target)?;
    Ok(best_meeting(&forward, &backward))
}

/// Shortest route from `source` to `target` over a decorated graph.
///
/// Unreachable targets are not an error: the route comes back with an infinite distance and an
/// empty path.
///
/// # Errors
///
/// See [`get_intersection`].
#[instrument(skip(graph))]
pub fn routing(graph: &Graph, source: NodeId, target: NodeId) -> Result<Route> {
    let (forward, backward) = search_both(graph, source, target)?;
    let meeting = best_meeting(&forward, &backward);
    let Some(middle) = meeting.node else {
        debug!("searches never met");
        return Ok(Route::unreachable(source, target));
    };

    // both labels are finite at the meeting node, so both walks exist
    let mut path = forward.path_to(middle).unwrap_or_default();
    path.extend(backward.path_to(middle).unwrap_or_default().into_iter().skip(1));
    debug!(middle, hops = path.len().saturating_sub(1), "route found");

    Ok(Route { source, target, meeting: Some(middle), distance: meeting.distance, path })
}

/// Shortest route by plain Dijkstra over any graph, ranked or not. Used to check hierarchy
/// answers.
///
/// # Errors
///
/// [`crate::Error::NodeNotFound`] if either endpoint is absent.
pub fn shortest_path(graph: &Graph, source: NodeId, target: NodeId) -> Result<Route> {
    graph.node(target)?;
    let paths = dijkstra(graph, source)?;
    let Some(path) = paths.path_to(target) else {
        return Ok(Route::unreachable(source, target));
    };
    let distance = paths.distance(target).unwrap_or(UNREACHED);
    Ok(Route { source, target, meeting: None, distance, path })
}

/// Total weight of `path` in `graph`, `None` if the path is empty or uses an edge `graph` lacks.
#[must_use]
pub fn path_weight(graph: &Graph, path: &[NodeId]) -> Option<Weight> {
    if path.is_empty() {
        return None;
    }
    path.windows(2).try_fold(OrderedFloat(0.0), |total, hop| Some(total + graph.edge_weight(hop[0], hop[1])?))
}

#[cfg(test)]
mod tests;
