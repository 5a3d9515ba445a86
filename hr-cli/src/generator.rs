//! Random graph generation for hrctl sessions.

use anyhow::{
    Context,
    Result,
};
use hr_core::Graph;
use rand::distributions::{
    Distribution,
    Uniform,
};
use rand::Rng;
use rand_distr::Poisson;
use tracing::{
    debug,
    instrument,
};

/// Shape of a generated graph.
#[derive(Clone, Copy, Debug)]
pub struct GraphSpec {
    /// Number of nodes, ids `0..nodes`.
    pub nodes: usize,
    /// Mean out-degree; each node draws its own out-degree from a Poisson distribution.
    pub degree: f64,
    /// Weights are whole numbers drawn uniformly from `1..=max_weight`.
    pub max_weight: u32,
}

/// Build a random digraph without self loops.
///
/// Targets are drawn uniformly from the other nodes. Drawing the same target twice keeps the last
/// weight, so a node may end up with fewer edges than it drew.
#[instrument(skip(rng))]
pub fn random_graph(spec: &GraphSpec, rng: &mut impl Rng) -> Result<Graph> {
    let mut graph = Graph::new();
    graph.add_nodes(0..spec.nodes)?;
    if spec.nodes < 2 || spec.degree <= 0.0 {
        return Ok(graph);
    }

    let out_degree = Poisson::new(spec.degree).context("building out-degree distribution")?;
    let others = Uniform::new(0, spec.nodes - 1);
    let weights = Uniform::new_inclusive(1, spec.max_weight.max(1));

    for source in 0..spec.nodes {
        let drawn: f64 = out_degree.sample(rng);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // Poisson samples are whole and >= 0
        let count = (drawn as usize).min(spec.nodes - 1);
        for _ in 0..count {
            // skip over the source so it is never its own target
            let other = others.sample(rng);
            let target = if other >= source { other + 1 } else { other };
            graph.add_edge(source, target, f64::from(weights.sample(rng)))?;
        }
    }

    debug!(edges = graph.edge_count(), "generated graph");
    Ok(graph)
}
