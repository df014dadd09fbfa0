//! End-to-end `GeneticCode` scenario: freeze a canonical
//! connection graph, wrap it in a `GeneticCode`, and confirm the content
//! signature is stable across rebuilds and independent of incidental
//! changes in construction order.
use egp_gc::{GcType, GeneticCode, GeneticCodeFields, GraphType, Properties};
use egp_graph::CGraph;
use egp_test_utils::{primitive_json, sample_registry};
use uuid::Uuid;

fn codon_fields(cgraph: egp_graph::FrozenCGraph) -> GeneticCodeFields {
    GeneticCodeFields {
        cgraph,
        ancestor_a: None,
        ancestor_b: None,
        gca: None,
        gcb: None,
        pgc: None,
        creator: Uuid::nil(),
        created: egp_common::egp_epoch(),
        updated: egp_common::egp_epoch(),
        code_depth: 1,
        generation: 1,
        num_codes: 1,
        num_codons: 1,
        inline: Some("a + b".into()),
        code: None,
        imports: vec![],
        reference_count: 0,
        lost_descendants: 0,
        internal_reference_count: 0,
        internal_lost_descendants: 0,
        properties: Properties {
            gc_type: Some(GcType::Codon),
            graph_type: GraphType::Primitive,
            constant: false,
            deterministic: true,
            side_effects: false,
            static_creation: false,
        },
    }
}

/// S6: two `GeneticCode`s built from the same canonical primitive graph,
/// constructed independently, sign identically.
#[test]
fn identical_primitive_codons_sign_identically() {
    let reg = sample_registry();
    let frozen_a = CGraph::from_json(&primitive_json(), &reg).unwrap().freeze().unwrap();
    let frozen_b = CGraph::from_json(&primitive_json(), &reg).unwrap().freeze().unwrap();

    let gc_a = GeneticCode::new(codon_fields(frozen_a), &reg).unwrap();
    let gc_b = GeneticCode::new(codon_fields(frozen_b), &reg).unwrap();

    assert_eq!(gc_a, gc_b);
    assert_eq!(gc_a.signature(), gc_b.signature());
}

/// A change anywhere in the canonical signature tuple, here the inline
/// source, must move the signature.
#[test]
fn changing_inline_code_changes_the_signature() {
    let reg = sample_registry();
    let frozen = CGraph::from_json(&primitive_json(), &reg).unwrap().freeze().unwrap();

    let mut fields = codon_fields(frozen.clone());
    let gc_a = GeneticCode::new(fields.clone(), &reg).unwrap();

    fields.inline = Some("a - b".into());
    let gc_b = GeneticCode::new(fields, &reg).unwrap();

    assert_ne!(gc_a.signature(), gc_b.signature());
}

/// S6 continued: the view-object `to_json()` form carries the same
/// signature (hex-encoded) and field values the code was built from.
#[test]
fn to_json_view_matches_fields_and_signature() {
    let reg = sample_registry();
    let frozen = CGraph::from_json(&primitive_json(), &reg).unwrap().freeze().unwrap();
    let gc = GeneticCode::new(codon_fields(frozen), &reg).unwrap();

    let view = gc.to_json(&reg).unwrap();
    let expected_sig: String = gc.signature().iter().map(|b| format!("{b:02x}")).collect();
    assert_eq!(view["signature"], expected_sig);
    assert_eq!(view["code_depth"], 1);
    assert_eq!(view["generation"], 1);
    assert_eq!(view["inline"], "a + b");
    assert!(view["gca"].is_null());
    assert_eq!(view["created"], gc.fields().created.to_rfc3339());
    assert!(view["cgraph"]["A"].is_array());
}

/// A `GeneticCode` wrapping a non-primitive graph cannot claim to be a
/// CODON.
#[test]
fn non_primitive_graph_rejects_codon_properties() {
    let reg = sample_registry();
    let frozen = CGraph::from_json(&egp_test_utils::standard_json(), &reg)
        .unwrap()
        .freeze()
        .unwrap();

    let mut fields = codon_fields(frozen);
    fields.properties.graph_type = GraphType::Standard;

    assert!(GeneticCode::new(fields, &reg).is_err());
}
