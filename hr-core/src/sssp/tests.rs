use assertables::*;
use rand::rngs::StdRng;
use rand::{
    Rng,
    SeedableRng,
};
use rstest::*;

use super::*;

fn path_graph(len: usize) -> Graph {
    let mut graph = Graph::new();
    graph.add_nodes(0..len).unwrap();
    for i in 1..len {
        graph.add_edge(i - 1, i, 1.0).unwrap();
    }
    graph
}

/// Seeded random digraph with integer weights, so sums compare exactly.
fn random_graph(seed: u64, nodes: usize, edges: usize) -> Graph {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut graph = Graph::new();
    graph.add_nodes(0..nodes).unwrap();
    for _ in 0..edges {
        let (from, to) = (rng.gen_range(0..nodes), rng.gen_range(0..nodes));
        graph.add_edge(from, to, f64::from(rng.gen_range(0..20_u32))).unwrap();
    }
    graph
}

/// All-pairs distances by Floyd–Warshall, indexed by node id.
fn floyd_warshall(graph: &Graph) -> Vec<Vec<Weight>> {
    let n = graph.node_count();
    let mut dist = vec![vec![UNREACHED; n]; n];
    for (i, row) in dist.iter_mut().enumerate() {
        row[i] = OrderedFloat(0.0);
    }
    for (from, to, weight) in graph.edges() {
        dist[from][to] = dist[from][to].min(weight);
    }
    for k in 0..n {
        for i in 0..n {
            for j in 0..n {
                let through = dist[i][k] + dist[k][j];
                if through < dist[i][j] {
                    dist[i][j] = through;
                }
            }
        }
    }
    dist
}

#[rstest]
fn test_dijkstra_on_path_graph() {
    let graph = path_graph(5);

    let paths = dijkstra(&graph, 0).unwrap();

    assert_eq!(paths.distances(), [0.0, 1.0, 2.0, 3.0, 4.0].map(OrderedFloat).to_vec());
    assert_eq!(paths.predecessor(4), Some(3));
    assert_eq!(paths.predecessor(1), Some(0));
    assert_eq!(paths.predecessor(0), None);
    assert_eq!(paths.path_to(4), Some(vec![0, 1, 2, 3, 4]));
}

#[rstest]
fn test_unreached_nodes_keep_sentinel() {
    let mut graph = path_graph(3);
    graph.add_node(9).unwrap();
    graph.add_edge(9, 0, 1.0).unwrap();

    let paths = dijkstra(&graph, 1).unwrap();

    assert_eq!(paths.distance(0), None);
    assert_eq!(paths.label(9).map(|label| label.distance), Some(UNREACHED));
    assert!(!paths.is_reached(9));
    assert_eq!(paths.path_to(0), None);
    assert_eq!(paths.distance(2), Some(OrderedFloat(1.0)));
}

#[rstest]
fn test_dijkstra_prefers_cheaper_detour() {
    let mut graph = Graph::new();
    graph.add_nodes(0..3).unwrap();
    graph.add_edges([(0, 2, 10.0), (0, 1, 3.0), (1, 2, 4.0)]).unwrap();

    let paths = dijkstra(&graph, 0).unwrap();

    assert_eq!(paths.distance(2), Some(OrderedFloat(7.0)));
    assert_eq!(paths.path_to(2), Some(vec![0, 1, 2]));
}

#[rstest]
fn test_zero_weight_edges() {
    let mut graph = Graph::new();
    graph.add_nodes(0..3).unwrap();
    graph.add_edges([(0, 1, 0.0), (1, 2, 0.0), (2, 0, 0.0)]).unwrap();

    let paths = dijkstra(&graph, 0).unwrap();

    assert_eq!(paths.distances(), vec![OrderedFloat(0.0); 3]);
}

#[rstest]
fn test_missing_source() {
    let graph = path_graph(2);

    assert_eq!(dijkstra(&graph, 5), Err(Error::NodeNotFound(5)));
}

#[rstest]
fn test_directional_search_requires_importance() {
    let graph = path_graph(2);

    assert_eq!(dijkstra_upward(&graph, 0), Err(Error::MissingImportance(0)));
}

#[rstest]
fn test_search_does_not_touch_graph() {
    let graph = path_graph(4);
    let before = format!("{graph:?}");

    dijkstra(&graph, 0).unwrap();

    assert_eq!(format!("{graph:?}"), before);
}

#[rstest]
fn test_upward_search_only_climbs() {
    // 0 -> 1 -> 2 with importances 0, 5, 1: the upward search from 0 reaches 1 but not 2
    let mut graph = path_graph(3);
    for (id, importance) in [(0, 0.0), (1, 5.0), (2, 1.0)] {
        graph.set_importance(id, importance).unwrap();
    }

    let up = dijkstra_upward(&graph, 0).unwrap();
    assert_eq!(up.distance(1), Some(OrderedFloat(1.0)));
    assert_eq!(up.distance(2), None);

    // backwards from 2 we may step to 1 (more important) but not on to 0
    let down = dijkstra_downward(&graph, 2).unwrap();
    assert_eq!(down.distance(1), Some(OrderedFloat(1.0)));
    assert_eq!(down.distance(0), None);
    assert_eq!(down.path_to(1), Some(vec![1, 2]));
    assert_eq!(down.direction(), SearchDirection::Downward);
}

#[rstest]
fn test_equal_importance_is_followed() {
    let mut graph = path_graph(3);
    for id in 0..3 {
        graph.set_importance(id, 1.0).unwrap();
    }

    let up = dijkstra_upward(&graph, 0).unwrap();

    assert_eq!(up.distance(2), Some(OrderedFloat(2.0)));
}

#[rstest]
#[case(1, 12, 40)]
#[case(2, 20, 30)]
#[case(3, 25, 120)]
#[case(4, 8, 64)]
fn test_dijkstra_matches_floyd_warshall(#[case] seed: u64, #[case] nodes: usize, #[case] edges: usize) {
    let graph = random_graph(seed, nodes, edges);
    let expected = floyd_warshall(&graph);

    for source in 0..nodes {
        let paths = dijkstra(&graph, source).unwrap();
        assert_eq!(paths.distances(), expected[source]);

        for target in 0..nodes {
            let Some(path) = paths.path_to(target) else { continue };
            let walked: f64 = path
                .windows(2)
                .map(|hop| graph.edge_weight(hop[0], hop[1]).unwrap().into_inner())
                .sum();
            assert_eq!(OrderedFloat(walked), expected[source][target]);
            assert_le!(path.len(), nodes);
        }
    }
}

#[rstest]
#[case(5)]
#[case(6)]
#[case(7)]
fn test_remove_node_keeps_neighbour_distances(#[case] seed: u64) {
    let original = random_graph(seed, 10, 35);
    let before = floyd_warshall(&original);

    for removed in 0..10 {
        let mut contracted = original.clone();
        contracted.remove_node(removed).unwrap();

        let neighbours: Vec<_> = original
            .predecessors(removed)
            .unwrap()
            .chain(original.successors(removed).unwrap())
            .map(|(id, _)| id)
            .filter(|&id| id != removed)
            .collect();
        for &from in &neighbours {
            let paths = dijkstra(&contracted, from).unwrap();
            for &to in &neighbours {
                let expected = before[from][to];
                assert_eq!(paths.label(to).unwrap().distance, expected, "{from} -> {to} via {removed}");
            }
        }
    }
}
