//! Canonical sample connection graphs, one per `GraphKind`, in the external
//! JSON format consumed by `egp_graph::json_cgraph_to_interfaces`. All reference the `int`/`bool` types from
//! [`crate::registry::sample_registry`].

/// `A` only: one primitive operator wired straight from `I` to `O`.
pub fn primitive_json() -> serde_json::Value {
    serde_json::json!({
        "A": [["I", 0, "int"]],
        "O": [["A", 0, "int"]],
        "U": []
    })
}

/// `A` then `B`: a two-stage pipeline.
pub fn standard_json() -> serde_json::Value {
    serde_json::json!({
        "A": [["I", 0, "int"]],
        "B": [["A", 0, "int"]],
        "O": [["B", 0, "int"]],
        "U": []
    })
}

/// `F` (predicate) + `A` (then-branch) + `P` (pass-through inputs), no `B`.
pub fn if_then_json() -> serde_json::Value {
    serde_json::json!({
        "F": [["I", 0, "bool"]],
        "A": [["I", 1, "int"]],
        "O": [["A", 0, "int"]],
        "P": [["I", 1, "int"]],
        "U": []
    })
}

/// `F` + `A` (then) + `B` (else) + `P`.
pub fn if_then_else_json() -> serde_json::Value {
    serde_json::json!({
        "F": [["I", 0, "bool"]],
        "A": [["I", 1, "int"]],
        "B": [["I", 1, "int"]],
        "O": [["A", 0, "int"]],
        "P": [["I", 1, "int"]],
        "U": []
    })
}

/// `L` (loop body input) + `S` (loop state) + `T` (terminal) + `A` + `P`.
pub fn for_loop_json() -> serde_json::Value {
    serde_json::json!({
        "L": [["I", 0, "int"]],
        "S": [["I", 1, "int"]],
        "A": [["L", 0, "int"]],
        "T": [["A", 0, "int"]],
        "O": [["A", 0, "int"]],
        "P": [["I", 1, "int"]],
        "U": []
    })
}

/// `W` (condition input) + `S` + `X` (exit) + `A` + `P`.
pub fn while_loop_json() -> serde_json::Value {
    serde_json::json!({
        "W": [["I", 0, "bool"]],
        "S": [["I", 1, "int"]],
        "A": [["S", 0, "int"]],
        "X": [["A", 0, "int"]],
        "O": [["A", 0, "int"]],
        "P": [["I", 1, "int"]],
        "U": []
    })
}

/// No rows beyond the mandatory `O`; an empty graph body.
pub fn empty_json() -> serde_json::Value {
    serde_json::json!({
        "O": [],
        "U": []
    })
}
