use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::instrument;

use crate::errors::{
    Error,
    Result,
};
use crate::graph::{
    Graph,
    NodeId,
};

/// Produces an importance for every node of a graph. Lower importance is contracted first.
pub trait ImportanceHeuristic {
    /// Importance of each node, in any order. Every node of `graph` must appear.
    ///
    /// # Errors
    ///
    /// Implementation specific; see the individual heuristics.
    fn importance(&mut self, graph: &Graph) -> Result<Vec<(NodeId, f64)>>;
}

/// Importance is the number of edges touching the node, both directions counted.
#[derive(Clone, Copy, Debug, Default)]
pub struct Degree;

impl ImportanceHeuristic for Degree {
    #[allow(clippy::cast_precision_loss)]
    fn importance(&mut self, graph: &Graph) -> Result<Vec<(NodeId, f64)>> {
        graph
            .node_ids()
            .map(|id| {
                let degree = graph.successors(id)?.count() + graph.predecessors(id)?.count();
                Ok((id, degree as f64))
            })
            .collect()
    }
}

/// Importance is the number of shortcuts removing the node would add, minus the edges it would
/// take with it.
#[derive(Clone, Copy, Debug, Default)]
pub struct EdgeDifference;

impl ImportanceHeuristic for EdgeDifference {
    #[allow(clippy::cast_precision_loss)]
    fn importance(&mut self, graph: &Graph) -> Result<Vec<(NodeId, f64)>> {
        graph
            .node_ids()
            .map(|id| {
                let removed = graph.successors(id)?.count() + graph.predecessors(id)?.count();
                let added = graph.shortcuts_needed(id)?;
                Ok((id, added as f64 - removed as f64))
            })
            .collect()
    }
}

/// A seeded random permutation of the nodes.
#[derive(Clone, Copy, Debug)]
pub struct Random {
    seed: u64,
}

impl Random {
    /// Same seed, same permutation.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl ImportanceHeuristic for Random {
    #[allow(clippy::cast_precision_loss)]
    fn importance(&mut self, graph: &Graph) -> Result<Vec<(NodeId, f64)>> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut ids: Vec<_> = graph.node_ids().collect();
        ids.shuffle(&mut rng);
        Ok(ids.into_iter().enumerate().map(|(position, id)| (id, position as f64)).collect())
    }
}

/// A caller supplied contraction order: the n-th id gets importance n.
#[derive(Clone, Debug, Default)]
pub struct ExplicitOrder {
    order: Vec<NodeId>,
}

impl FromIterator<NodeId> for ExplicitOrder {
    fn from_iter<I: IntoIterator<Item = NodeId>>(iter: I) -> Self {
        Self { order: iter.into_iter().collect() }
    }
}

impl ImportanceHeuristic for ExplicitOrder {
    /// # Errors
    ///
    /// [`Error::NodeNotFound`] for an id the graph lacks, [`Error::DuplicateNode`] for an id
    /// listed twice, [`Error::MissingImportance`] for a node left out.
    #[allow(clippy::cast_precision_loss)]
    fn importance(&mut self, graph: &Graph) -> Result<Vec<(NodeId, f64)>> {
        let mut positions = IndexMap::with_capacity(self.order.len());
        for &id in &self.order {
            graph.node(id)?;
            if positions.insert(id, positions.len() as f64).is_some() {
                return Err(Error::DuplicateNode(id));
            }
        }
        if let Some(missing) = graph.node_ids().find(|id| !positions.contains_key(id)) {
            return Err(Error::MissingImportance(missing));
        }
        Ok(positions.into_iter().collect())
    }
}

/// Run `heuristic` and store its result on every node of `graph`.
///
/// Nothing is written unless the heuristic covers every node with a valid value.
///
/// # Errors
///
/// Whatever the heuristic reports, [`Error::MissingImportance`] for a node it skipped and
/// [`Error::InvalidImportance`] for a NaN.
#[instrument(skip_all, fields(nodes = graph.node_count()))]
pub fn assign_importance(graph: &mut Graph, heuristic: &mut impl ImportanceHeuristic) -> Result<()> {
    let values: IndexMap<NodeId, f64> = heuristic.importance(graph)?.into_iter().collect();
    for id in graph.node_ids() {
        match values.get(&id) {
            None => return Err(Error::MissingImportance(id)),
            Some(value) if value.is_nan() => return Err(Error::InvalidImportance { id, value: *value }),
            Some(_) => {},
        }
    }

    let ids: Vec<_> = graph.node_ids().collect();
    for id in ids {
        graph.set_importance(id, values[&id])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rstest::*;

    use super::*;

    #[fixture]
    fn star() -> Graph {
        // 0 is the hub: 1 -> 0 -> 2 and 3 -> 0 -> 2
        let mut graph = Graph::new();
        graph.add_nodes(0..4).unwrap();
        graph.add_edges([(1, 0, 1.0), (3, 0, 1.0), (0, 2, 1.0)]).unwrap();
        graph
    }

    #[rstest]
    fn test_degree(star: Graph) {
        let values = Degree.importance(&star).unwrap();

        assert_eq!(values, vec![(0, 3.0), (1, 1.0), (2, 1.0), (3, 1.0)]);
    }

    #[rstest]
    fn test_edge_difference(star: Graph) {
        let values = EdgeDifference.importance(&star).unwrap();

        // the hub needs shortcuts 1 -> 2 and 3 -> 2 and takes three edges with it
        assert_eq!(values[0], (0, -1.0));
        assert_eq!(values[1], (1, -1.0));
    }

    #[rstest]
    fn test_random_is_a_seeded_permutation(star: Graph) {
        let first = Random::new(11).importance(&star).unwrap();
        let second = Random::new(11).importance(&star).unwrap();

        let mut ids: Vec<_> = first.iter().map(|&(id, _)| id).collect();
        ids.sort_unstable();
        assert_eq!(first, second);
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }

    #[rstest]
    fn test_explicit_order(star: Graph) {
        let mut order: ExplicitOrder = [2, 0, 3, 1].into_iter().collect();

        assert_eq!(order.importance(&star).unwrap(), vec![(2, 0.0), (0, 1.0), (3, 2.0), (1, 3.0)]);
    }

    #[rstest]
    #[case::unknown(vec![0, 1, 2, 3, 9], Error::NodeNotFound(9))]
    #[case::repeated(vec![0, 1, 1, 2, 3], Error::DuplicateNode(1))]
    #[case::incomplete(vec![0, 1, 3], Error::MissingImportance(2))]
    fn test_explicit_order_rejects(star: Graph, #[case] ids: Vec<NodeId>, #[case] expected: Error) {
        let mut order: ExplicitOrder = ids.into_iter().collect();

        assert_eq!(order.importance(&star), Err(expected));
    }

    #[rstest]
    fn test_assign_importance(mut star: Graph) {
        assign_importance(&mut star, &mut Degree).unwrap();

        assert_eq!(star.importance(0).unwrap().map(|value| value.into_inner()), Some(3.0));
        assert_eq!(star.importance(3).unwrap().map(|value| value.into_inner()), Some(1.0));
    }

    #[rstest]
    fn test_assign_importance_is_all_or_nothing(mut star: Graph) {
        let mut order: ExplicitOrder = [0, 1].into_iter().collect();

        assert!(assign_importance(&mut star, &mut order).is_err());
        assert_eq!(star.importance(0), Ok(None));
    }
}
