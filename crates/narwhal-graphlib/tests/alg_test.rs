use narwhal_graphlib::alg::{AstarOptions, astar, components, dijkstra, zero_heuristic};
use narwhal_graphlib::{Graph, GraphOptions, Point};

fn weighted_square() -> Graph {
    // a --1-- b
    // |       |
    // 5       1
    // |       |
    // d --1-- c
    let mut g = Graph::default();
    g.set_edge("a", "b", 1.0);
    g.set_edge("b", "c", 1.0);
    g.set_edge("c", "d", 1.0);
    g.set_edge("d", "a", 5.0);
    g
}

#[test]
fn astar_accumulates_edge_weights() {
    let g = weighted_square();
    let path = astar(&g, "a", "d", &AstarOptions::default()).unwrap();
    assert_eq!(path.path_length, 3.0);
    assert_eq!(path.nodes, vec!["a", "b", "c", "d"]);
}

#[test]
fn astar_to_self_is_an_empty_path() {
    let g = weighted_square();
    let path = astar(&g, "b", "b", &AstarOptions::default()).unwrap();
    assert_eq!(path.path_length, 0.0);
    assert_eq!(path.nodes, vec!["b"]);
}

#[test]
fn astar_reports_unreachable_and_unknown_nodes() {
    let mut g = weighted_square();
    g.set_node("lonely", Point::new(10.0, 10.0));

    assert!(astar(&g, "a", "lonely", &AstarOptions::default()).is_none());
    assert!(astar(&g, "a", "missing", &AstarOptions::default()).is_none());
}

#[test]
fn astar_respects_direction_unless_undirected() {
    let mut g = Graph::new(GraphOptions {
        directed: true,
        ..Default::default()
    });
    g.set_edge("a", "b", 2.0);

    let forward_only = AstarOptions {
        undirected: false,
        ..Default::default()
    };
    assert!(astar(&g, "b", "a", &forward_only).is_none());
    assert_eq!(
        astar(&g, "b", "a", &AstarOptions::default()).map(|p| p.path_length),
        Some(2.0)
    );
}

#[test]
fn astar_accepts_custom_path_length() {
    let g = weighted_square();
    let hops = |_: &narwhal_graphlib::Edge, prev: f64| prev + 1.0;
    let opts = AstarOptions {
        undirected: true,
        path_length: &hops,
        heuristic: &zero_heuristic,
    };
    assert_eq!(astar(&g, "a", "d", &opts).map(|p| p.path_length), Some(1.0));
}

#[test]
fn dijkstra_matches_pairwise_astar() {
    let mut g = weighted_square();
    g.set_node("lonely", Point::default());

    for source in g.node_ids() {
        let batch = dijkstra(&g, &source, true);
        for (ix, target) in g.node_ids().iter().enumerate() {
            let pair = astar(&g, &source, target, &AstarOptions::default()).map(|p| p.path_length);
            assert_eq!(batch[ix], pair, "{source} -> {target}");
        }
    }
}

#[test]
fn components_split_disconnected_nodes() {
    let mut g = weighted_square();
    g.set_node("lonely", Point::default());
    g.set_edge("x", "y", 1.0);

    let comps = components(&g);
    assert_eq!(comps.len(), 3);
    assert_eq!(comps[0].len(), 4);
    assert_eq!(comps[1], vec!["lonely"]);
    assert_eq!(comps[2], vec!["x", "y"]);
}
