//! Implementation of a query session.
//!
//! A session runs four phases:
//! 1. Generation - build a random weighted digraph from the configured shape
//! 2. Ranking - give every node an importance with the configured heuristic
//! 3. Contraction - contract the graph and fold every shortcut back into a decorated graph
//! 4. Querying - answer random source/target queries on the decorated graph, optionally checking
//!    each answer against plain Dijkstra on the original graph
//!
//! Each phase is implemented as a separate function, coordinated by the `run` function.

use anyhow::{
    Context,
    Result,
};
use clap::ValueEnum;
use hr_core::contraction_hierarchies::{
    Degree,
    EdgeDifference,
    Random,
};
use hr_core::{
    assign_importance,
    contract,
    path_weight,
    routing,
    shortest_path,
    ContractionVariant,
    Graph,
    Route,
    Weight,
};
use rand::rngs::StdRng;
use rand::{
    Rng,
    SeedableRng,
};
use serde::Serialize;
use tracing::{
    info,
    instrument,
    warn,
};

use crate::generator::{
    random_graph,
    GraphSpec,
};

/// Which heuristic ranks the nodes before contraction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum HeuristicKind {
    /// In plus out degree.
    Degree,
    /// Shortcuts added minus edges removed.
    EdgeDifference,
    /// A seeded random permutation.
    Random,
}

/// Everything a session needs, already validated.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Shape of the generated graph.
    pub graph: GraphSpec,
    /// Ranking heuristic.
    pub heuristic: HeuristicKind,
    /// Contraction builder.
    pub variant: ContractionVariant,
    /// Number of random queries.
    pub queries: usize,
    /// Whether to check answers against Dijkstra.
    pub verify: bool,
    /// Seed shared by every random choice of the session.
    pub seed: u64,
}

/// One answered query.
#[derive(Clone, Debug, Serialize)]
pub struct QueryOutcome {
    /// Answer from the decorated graph.
    pub route: Route,
    /// Dijkstra's distance on the original graph, when verifying.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<Weight>,
    /// Whether `route` agrees with `expected`, when verifying.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matches: Option<bool>,
}

/// What a session did.
#[derive(Clone, Debug, Serialize)]
pub struct SessionReport {
    /// Seed the session ran with, to reproduce it.
    pub seed: u64,
    /// Heuristic used for ranking.
    pub heuristic: HeuristicKind,
    /// Nodes in the generated graph.
    pub nodes: usize,
    /// Edges in the generated graph.
    pub edges: usize,
    /// Edges in the decorated graph.
    pub decorated_edges: usize,
    /// Shortcuts added or tightened while decorating.
    pub shortcuts: usize,
    /// Every query in the order it was asked.
    pub queries: Vec<QueryOutcome>,
    /// Queries with a route.
    pub reachable: usize,
    /// Whether answers were verified.
    pub verified: bool,
    /// Verified queries whose answer was wrong.
    pub mismatches: usize,
}

/// End-to-end run of a query session.
#[instrument(skip(config), fields(seed = config.seed, nodes = config.graph.nodes))]
pub fn run(config: &SessionConfig) -> Result<SessionReport> {
    let mut rng = StdRng::seed_from_u64(config.seed);

    let mut graph = random_graph(&config.graph, &mut rng)?;
    rank_graph(&mut graph, config.heuristic, config.seed)?;
    let (decorated, shortcuts) = decorate_graph(&graph, config.variant)?;
    let queries = answer_queries(&graph, &decorated, config.queries, config.verify, &mut rng)?;

    let reachable = queries.iter().filter(|outcome| outcome.route.is_reachable()).count();
    let mismatches = queries.iter().filter(|outcome| outcome.matches == Some(false)).count();
    info!(reachable, mismatches, "Session complete");

    Ok(SessionReport {
        seed: config.seed,
        heuristic: config.heuristic,
        nodes: graph.node_count(),
        edges: graph.edge_count(),
        decorated_edges: decorated.edge_count(),
        shortcuts,
        queries,
        reachable,
        verified: config.verify,
        mismatches,
    })
}

/// Phase 2 – store an importance on every node.
#[instrument(skip(graph), fields(nodes = graph.node_count()))]
pub(crate) fn rank_graph(graph: &mut Graph, heuristic: HeuristicKind, seed: u64) -> Result<()> {
    match heuristic {
        HeuristicKind::Degree => assign_importance(graph, &mut Degree),
        HeuristicKind::EdgeDifference => assign_importance(graph, &mut EdgeDifference),
        HeuristicKind::Random => assign_importance(graph, &mut Random::new(seed)),
    }
    .context("ranking nodes")
}

/// Phase 3 – contract and fold the shortcuts into a copy of `graph`.
#[instrument(skip(graph), fields(nodes = graph.node_count(), edges = graph.edge_count()))]
pub(crate) fn decorate_graph(graph: &Graph, variant: ContractionVariant) -> Result<(Graph, usize)> {
    let hierarchy = contract(graph, variant).context("contracting graph")?;
    info!(steps = hierarchy.steps(), core = hierarchy.core().node_count(), "Contraction finished");
    hierarchy.decorate(graph).context("decorating graph")
}

/// Phase 4 – answer `count` random queries.
#[instrument(skip(graph, decorated, rng))]
pub(crate) fn answer_queries(
    graph: &Graph,
    decorated: &Graph,
    count: usize,
    verify: bool,
    rng: &mut impl Rng,
) -> Result<Vec<QueryOutcome>> {
    let ids: Vec<_> = graph.node_ids().collect();
    let mut outcomes = Vec::with_capacity(count);

    for _ in 0..count {
        let source = ids[rng.gen_range(0..ids.len())];
        let target = ids[rng.gen_range(0..ids.len())];
        let route = routing(decorated, source, target).with_context(|| format!("routing {source} -> {target}"))?;

        let (expected, matches) = if verify {
            let baseline = shortest_path(graph, source, target)?;
            let consistent = !route.is_reachable() || path_weight(decorated, &route.path) == Some(route.distance);
            let matches = consistent && baseline.distance == route.distance;
            if !matches {
                warn!(source, target, got = %route.distance, expected = %baseline.distance, "Hierarchy answer disagrees with dijkstra");
            }
            (Some(baseline.distance), Some(matches))
        } else {
            (None, None)
        };

        outcomes.push(QueryOutcome { route, expected, matches });
    }

    Ok(outcomes)
}

#[cfg(test)]
mod tests;
