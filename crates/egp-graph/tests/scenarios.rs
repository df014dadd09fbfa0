//! End-to-end connection-graph scenarios: build each
//! canonical graph shape from its external JSON form, classify it, round
//! trip it through the codec, stabilise it, and freeze it.
use egp_graph::{CGraph, GraphKind, Row};
use egp_test_utils::{
    for_loop_json, if_then_else_json, if_then_json, primitive_json, sample_registry,
    standard_json, while_loop_json,
};
use rand::SeedableRng;

/// S1: a primitive graph parses, classifies as `Primitive`, is already
/// stable, and round trips through JSON unchanged.
#[test]
fn primitive_graph_round_trips_and_classifies() {
    let reg = sample_registry();
    let json = primitive_json();
    let g = CGraph::from_json(&json, &reg).unwrap();

    assert_eq!(g.kind().unwrap(), GraphKind::Primitive);
    assert!(g.is_stable());
    g.verify().unwrap();

    let round_tripped = g.to_json(&reg).unwrap();
    let g2 = CGraph::from_json(&round_tripped, &reg).unwrap();
    assert_eq!(g2.to_json(&reg).unwrap(), round_tripped);
}

/// S2: `if_then`/`if_then_else` classify distinctly and both require `P`.
#[test]
fn if_then_and_if_then_else_classify_distinctly() {
    let reg = sample_registry();

    let if_then = CGraph::from_json(&if_then_json(), &reg).unwrap();
    assert_eq!(if_then.kind().unwrap(), GraphKind::IfThen);
    assert!(if_then.get((Row::P, egp_graph::Class::Dst)).is_some());

    let if_then_else = CGraph::from_json(&if_then_else_json(), &reg).unwrap();
    assert_eq!(if_then_else.kind().unwrap(), GraphKind::IfThenElse);
}

/// S2 continued: loop shapes classify correctly too.
#[test]
fn loop_graphs_classify_correctly() {
    let reg = sample_registry();
    let for_loop = CGraph::from_json(&for_loop_json(), &reg).unwrap();
    assert_eq!(for_loop.kind().unwrap(), GraphKind::ForLoop);

    let while_loop = CGraph::from_json(&while_loop_json(), &reg).unwrap();
    assert_eq!(while_loop.kind().unwrap(), GraphKind::WhileLoop);
}

/// S3: starting from an under-connected standard graph, `stabilize` wires
/// every destination endpoint and the result freezes cleanly.
#[test]
fn stabilize_connects_every_destination_and_then_freezes() {
    let reg = sample_registry();
    let mut g = CGraph::from_json(&standard_json(), &reg).unwrap();

    // Add an unconnected B destination endpoint on top of the stable seed.
    g.get_mut((Row::B, egp_graph::Class::Dst)).unwrap().append(1).unwrap();
    assert!(!g.is_stable());

    let mut rng = rand::rngs::StdRng::seed_from_u64(42);
    g.stabilize(false, &mut rng, &reg).unwrap();

    assert!(g.is_stable());
    let frozen = g.freeze().unwrap();
    assert_eq!(frozen.to_interfaces().len(), g.keys().count());
}

/// S4: the JSON codec rejects a destination endpoint whose recorded
/// sources disagree on type.
#[test]
fn conflicting_source_types_are_rejected_at_parse_time() {
    let reg = sample_registry();
    let json = serde_json::json!({
        "A": [["I", 0, "int"], ["I", 0, "bool"]],
        "O": [["A", 0, "int"]],
        "U": []
    });
    let err = CGraph::from_json(&json, &reg).unwrap_err();
    assert!(matches!(
        err,
        egp_graph::GraphError::Core(egp_error::CoreError::TypeInconsistency(_))
    ));
}
