use assertables::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rstest::*;

use super::*;

fn config(heuristic: HeuristicKind, variant: ContractionVariant) -> SessionConfig {
    SessionConfig {
        graph: GraphSpec { nodes: 40, degree: 2.5, max_weight: 9 },
        heuristic,
        variant,
        queries: 25,
        verify: true,
        seed: 2024,
    }
}

#[rstest]
#[case(HeuristicKind::Degree, ContractionVariant::List)]
#[case(HeuristicKind::EdgeDifference, ContractionVariant::MemoryEfficient)]
#[case(HeuristicKind::Random, ContractionVariant::List)]
#[case(HeuristicKind::Random, ContractionVariant::MemoryEfficient)]
fn test_session_answers_match_dijkstra(#[case] heuristic: HeuristicKind, #[case] variant: ContractionVariant) {
    let report = run(&config(heuristic, variant)).unwrap();

    assert_eq!(report.nodes, 40);
    assert_eq!(report.queries.len(), 25);
    assert_eq!(report.mismatches, 0);
    assert_ge!(report.decorated_edges, report.edges);
    assert_le!(report.reachable, 25);
    assert!(report.queries.iter().all(|outcome| outcome.matches == Some(true)));
}

#[rstest]
fn test_session_is_reproducible() {
    let first = run(&config(HeuristicKind::EdgeDifference, ContractionVariant::List)).unwrap();
    let second = run(&config(HeuristicKind::EdgeDifference, ContractionVariant::List)).unwrap();

    assert_eq!(serde_json::to_value(&first).unwrap(), serde_json::to_value(&second).unwrap());
}

#[rstest]
fn test_unverified_session_skips_baseline() {
    let mut config = config(HeuristicKind::Degree, ContractionVariant::List);
    config.verify = false;

    let report = run(&config).unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert!(!report.verified);
    assert!(report.queries.iter().all(|outcome| outcome.expected.is_none()));
    assert!(json["queries"][0].get("matches").is_none());
    assert_eq!(json["heuristic"], "degree");
}

#[rstest]
fn test_answer_queries_flags_wrong_decoration() {
    // a triangle in both directions, queried over a "decorated" graph that lost every edge
    let mut graph = Graph::new();
    graph.add_nodes(0..3).unwrap();
    graph.add_edges([(0, 1, 1.0), (1, 0, 1.0), (1, 2, 1.0), (2, 1, 1.0), (0, 2, 1.0), (2, 0, 1.0)]).unwrap();
    rank_graph(&mut graph, HeuristicKind::Degree, 0).unwrap();
    let mut stripped = Graph::new();
    stripped.add_nodes(0..3).unwrap();
    rank_graph(&mut stripped, HeuristicKind::Degree, 0).unwrap();

    let outcomes = answer_queries(&graph, &stripped, 20, true, &mut StdRng::seed_from_u64(5)).unwrap();

    for outcome in &outcomes {
        let same = outcome.route.source == outcome.route.target;
        assert_eq!(outcome.matches, Some(same));
    }
    assert!(outcomes.iter().any(|outcome| outcome.matches == Some(false)));
}

#[rstest]
fn test_rank_graph_sets_every_importance() {
    let mut graph = random_graph(&GraphSpec { nodes: 12, degree: 2.0, max_weight: 4 }, &mut StdRng::seed_from_u64(8)).unwrap();

    rank_graph(&mut graph, HeuristicKind::Random, 8).unwrap();

    assert!(graph.nodes().all(|node| node.importance().is_some()));
}
