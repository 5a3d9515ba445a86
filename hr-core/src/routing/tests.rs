use assertables::*;
use rand::rngs::StdRng;
use rand::{
    Rng,
    SeedableRng,
};
use rstest::*;

use super::*;
use crate::contraction_hierarchies::{
    assign_importance,
    decorated_graph,
    ContractionVariant,
    Degree,
    EdgeDifference,
    ExplicitOrder,
    Random,
};
use crate::errors::Error;

fn decorated(mut graph: Graph) -> Graph {
    assign_importance(&mut graph, &mut Degree).unwrap();
    decorated_graph(&graph, ContractionVariant::List).unwrap()
}

#[fixture]
fn cycle() -> Graph {
    let mut graph = Graph::new();
    graph.add_nodes(0..4).unwrap();
    graph.add_edges([(0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0), (3, 0, 1.0)]).unwrap();
    decorated(graph)
}

#[rstest]
fn test_routing_on_cycle(cycle: Graph) {
    let route = routing(&cycle, 0, 2).unwrap();

    assert!(route.is_reachable());
    assert_eq!(route.distance, OrderedFloat(2.0));
    assert_eq!(route.path.first(), Some(&0));
    assert_eq!(route.path.last(), Some(&2));
    assert_eq!(path_weight(&cycle, &route.path), Some(OrderedFloat(2.0)));
}

#[rstest]
fn test_intersection_on_cycle(cycle: Graph) {
    let meeting = get_intersection(&cycle, 3, 1).unwrap();

    assert_eq!(meeting.distance, OrderedFloat(2.0));
    assert!(meeting.node.is_some());
}

#[rstest]
fn test_route_to_self(cycle: Graph) {
    let route = routing(&cycle, 1, 1).unwrap();

    assert_eq!(route.meeting, Some(1));
    assert_eq!(route.distance, OrderedFloat(0.0));
    assert_eq!(route.path, vec![1]);
}

#[rstest]
fn test_unreachable_is_not_an_error() {
    let mut graph = Graph::new();
    graph.add_nodes(0..4).unwrap();
    graph.add_edges([(0, 1, 1.0), (2, 3, 1.0)]).unwrap();
    let graph = decorated(graph);

    let route = routing(&graph, 0, 3).unwrap();

    assert!(!route.is_reachable());
    assert_eq!(route.meeting, None);
    assert!(route.path.is_empty());
    assert_eq!(get_intersection(&graph, 1, 0).unwrap(), Meeting { node: None, distance: UNREACHED });
}

#[rstest]
fn test_routing_needs_known_endpoints(cycle: Graph) {
    assert_eq!(routing(&cycle, 0, 9), Err(Error::NodeNotFound(9)));
    assert_eq!(shortest_path(&cycle, 9, 0), Err(Error::NodeNotFound(9)));
}

#[rstest]
fn test_routing_needs_importance() {
    let mut graph = Graph::new();
    graph.add_nodes(0..2).unwrap();

    assert_eq!(routing(&graph, 0, 1), Err(Error::MissingImportance(0)));
}

#[rstest]
fn test_route_climbs_through_shortcut() {
    // 0 -> 1 -> 2 where 1 is contracted first: the query only sees the shortcut 0 -> 2
    let mut graph = Graph::new();
    graph.add_nodes(0..3).unwrap();
    graph.add_edges([(0, 1, 2.0), (1, 2, 5.0)]).unwrap();
    let mut order: ExplicitOrder = [1, 0, 2].into_iter().collect();
    assign_importance(&mut graph, &mut order).unwrap();
    let decorated = decorated_graph(&graph, ContractionVariant::MemoryEfficient).unwrap();

    let route = routing(&decorated, 0, 2).unwrap();

    assert_eq!(route.distance, OrderedFloat(7.0));
    assert_eq!(route.path, vec![0, 2]);
    assert_eq!(path_weight(&graph, &route.path), None);
    assert_eq!(path_weight(&decorated, &route.path), Some(OrderedFloat(7.0)));
}

#[rstest]
fn test_path_weight_edge_cases(cycle: Graph) {
    assert_eq!(path_weight(&cycle, &[]), None);
    assert_eq!(path_weight(&cycle, &[3]), Some(OrderedFloat(0.0)));
    assert_eq!(path_weight(&cycle, &[0, 2]), None);
}

#[rstest]
fn test_route_serializes() {
    let route = Route { source: 0, target: 2, meeting: Some(1), distance: OrderedFloat(2.0), path: vec![0, 1, 2] };

    let json = serde_json::to_value(&route).unwrap();

    assert_eq!(json["distance"], 2.0);
    assert_eq!(json["path"], serde_json::json!([0, 1, 2]));
}

#[rstest]
#[case(11, ContractionVariant::List)]
#[case(12, ContractionVariant::MemoryEfficient)]
#[case(13, ContractionVariant::List)]
#[case(14, ContractionVariant::MemoryEfficient)]
fn test_routing_agrees_with_dijkstra(#[case] seed: u64, #[case] variant: ContractionVariant) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut graph = Graph::new();
    graph.add_nodes(0..16).unwrap();
    for _ in 0..48 {
        let (from, to) = (rng.gen_range(0..16), rng.gen_range(0..16));
        graph.add_edge(from, to, f64::from(rng.gen_range(1..30_u32))).unwrap();
    }
    if seed % 2 == 0 {
        assign_importance(&mut graph, &mut EdgeDifference).unwrap();
    } else {
        assign_importance(&mut graph, &mut Random::new(seed)).unwrap();
    }
    let decorated = decorated_graph(&graph, variant).unwrap();

    for source in 0..16 {
        for target in 0..16 {
            let expected = shortest_path(&graph, source, target).unwrap();
            let route = routing(&decorated, source, target).unwrap();

            assert_eq!(route.distance, expected.distance, "{source} -> {target}");
            if route.is_reachable() {
                assert_eq!(path_weight(&decorated, &route.path), Some(route.distance));
                assert_le!(route.path.len(), 16);
            }
        }
    }
}
