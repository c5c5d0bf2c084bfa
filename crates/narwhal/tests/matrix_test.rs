use narwhal::matrix::{self, DistanceMatrix, WeightMatrix};
use narwhal::narwhal_graphlib::{Graph, GraphOptions, Point};
use narwhal::{Error, Variant};

fn square_with_tail() -> Graph {
    let mut g = Graph::default();
    for id in ["a", "b", "c", "d", "e"] {
        g.set_node(id, Point::default());
    }
    g.set_edge("a", "b", 1.0);
    g.set_edge("b", "c", 2.0);
    g.set_edge("c", "d", 1.0);
    g.set_edge("d", "a", 2.0);
    g.set_edge("d", "e", 3.0);
    g
}

#[test]
fn matrices_are_symmetric_with_an_empty_diagonal() {
    let g = square_with_tail();
    for variant in [Variant::Classic, Variant::Maxent] {
        let (d, w) = matrix::build(variant, &g, &g).unwrap();
        assert!(d.is_symmetric(), "{variant:?} D");
        assert!(w.is_symmetric(), "{variant:?} W");
        for i in 0..d.len() {
            assert_eq!(d.get(i, i), 0.0);
            assert_eq!(w.get(i, i), 0.0);
        }
    }
}

#[test]
fn classic_targets_are_shortest_paths_with_unit_weights() {
    let g = square_with_tail();
    let (d, w) = matrix::build(Variant::Classic, &g, &g).unwrap();
    // a-c: a-b-c = 3, a-d-c = 3
    assert_eq!(d.get(0, 2), 3.0);
    // b-e: b-a-d-e = 6, b-c-d-e = 6
    assert_eq!(d.get(1, 4), 6.0);
    assert_eq!(w.get(1, 4), 1.0);
}

#[test]
fn dense_storage_matches_the_accessors() {
    let g = square_with_tail();
    let (d, w) = matrix::build(Variant::Classic, &g, &g).unwrap();
    let dm = d.as_matrix();
    let wm = w.as_matrix();
    assert_eq!((dm.nrows(), dm.ncols()), (5, 5));
    assert_eq!(dm, &dm.transpose());
    assert_eq!(dm[(1, 4)], d.get(1, 4));
    assert_eq!(wm[(0, 2)], 1.0);
    assert_eq!(wm[(2, 2)], 0.0);
    assert_eq!(wm, &wm.transpose());
}

#[test]
fn maxent_targets_are_direct_edges_only() {
    let g = square_with_tail();
    let (d, w) = matrix::build(Variant::Maxent, &g, &g).unwrap();
    assert_eq!(d.target(0, 1), Some(1.0));
    assert_eq!(d.target(3, 4), Some(3.0));
    assert_eq!(d.target(0, 2), None);
    assert_eq!(w.get(3, 4), 1.0 / 9.0);
    assert_eq!(w.get(0, 2), 0.0);
}

#[test]
fn directed_edges_count_as_undirected() {
    let mut g = Graph::new(GraphOptions {
        directed: true,
        ..Default::default()
    });
    g.set_node("a", Point::default());
    g.set_node("b", Point::default());
    g.set_node("c", Point::default());
    g.set_edge("a", "b", 1.0);
    g.set_edge("c", "b", 1.0);
    let d = DistanceMatrix::shortest_paths(&g, &g);
    assert_eq!(d.get(0, 2), 2.0);
    assert_eq!(d.get(2, 0), 2.0);
}

#[test]
fn parallel_edges_are_last_seen_wins_in_maxent() {
    let mut g = Graph::new(GraphOptions {
        multigraph: true,
        ..Default::default()
    });
    g.set_node("a", Point::default());
    g.set_node("b", Point::default());
    g.set_edge_named("a", "b", Some("first"), 2.0);
    g.set_edge_named("a", "b", Some("second"), 4.0);
    let d = DistanceMatrix::edge_lengths(&g);
    assert_eq!(d.get(0, 1), 4.0);
    assert_eq!(WeightMatrix::inverse_square(&d).get(0, 1), 1.0 / 16.0);
}

#[test]
fn self_loops_are_ignored() {
    let mut g = Graph::default();
    g.set_node("a", Point::default());
    g.set_node("b", Point::default());
    g.set_edge("a", "a", 3.0);
    g.set_edge("a", "b", 1.0);
    for variant in [Variant::Classic, Variant::Maxent] {
        let (d, _) = matrix::build(variant, &g, &g).unwrap();
        assert_eq!(d.get(0, 0), 0.0);
        assert_eq!(d.get(0, 1), 1.0);
    }
}

#[test]
fn disconnected_pairs_stay_unconstrained() {
    let mut g = Graph::default();
    g.set_node("a", Point::default());
    g.set_node("b", Point::default());
    g.set_node("lonely", Point::default());
    g.set_edge("a", "b", 1.0);
    let (d, w) = matrix::build(Variant::Classic, &g, &g).unwrap();
    assert_eq!(d.target(0, 2), None);
    assert_eq!(d.get(0, 2), 0.0);
    // The classic weight matrix does not know about the sentinel.
    assert_eq!(w.get(0, 2), 1.0);
}

#[test]
fn invalid_weights_are_rejected() {
    for weight in [-1.0, f64::NAN, f64::INFINITY] {
        let mut g = Graph::default();
        g.set_node("a", Point::default());
        g.set_node("b", Point::default());
        g.set_edge("a", "b", weight);
        let err = matrix::build(Variant::Maxent, &g, &g).unwrap_err();
        assert!(
            matches!(err, Error::InvalidEdgeWeight { ref from, ref to, .. } if from == "a" && to == "b"),
            "{err}"
        );
    }
}
