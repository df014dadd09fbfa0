//! Graph-kind classification and per-kind connectivity tables.
use std::collections::{HashMap, HashSet};

use egp_error::CoreError;
use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};
use crate::row::Row;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GraphKind {
    Empty,
    Primitive,
    Standard,
    IfThen,
    IfThenElse,
    ForLoop,
    WhileLoop,
    Unknown,
}

/// Classifies a graph from the set of rows with at least one endpoint
/// present. `O` must always be present; the per-kind
/// "require" rows are checked unless `skip_shape_checks` is set (the
/// source's debug-vs-production distinction).
pub fn classify(rows: &HashSet<Row>, skip_shape_checks: bool) -> Result<GraphKind> {
    if !rows.contains(&Row::O) {
        return Err(GraphError::Core(CoreError::GraphShape(
            "row O must always be present".into(),
        )));
    }

    let require = |needed: &[Row]| -> Result<()> {
        if skip_shape_checks {
            return Ok(());
        }
        for r in needed {
            if !rows.contains(r) {
                return Err(GraphError::Core(CoreError::GraphShape(format!(
                    "row {r} is required for this graph kind"
                ))));
            }
        }
        Ok(())
    };

    if rows.contains(&Row::F) {
        require(&[Row::A, Row::P])?;
        return Ok(if rows.contains(&Row::B) {
            GraphKind::IfThenElse
        } else {
            GraphKind::IfThen
        });
    }
    if rows.contains(&Row::L) {
        require(&[Row::A, Row::P])?;
        return Ok(GraphKind::ForLoop);
    }
    if rows.contains(&Row::W) {
        require(&[Row::A, Row::P])?;
        return Ok(GraphKind::WhileLoop);
    }
    if rows.contains(&Row::B) {
        require(&[Row::A])?;
        return Ok(GraphKind::Standard);
    }
    if rows.contains(&Row::A) {
        return Ok(GraphKind::Primitive);
    }
    Ok(GraphKind::Empty)
}

/// `valid_dst_rows[kind]`: which destination rows each source row may feed.
pub fn valid_dst_rows(kind: GraphKind) -> HashMap<Row, HashSet<Row>> {
    use Row::*;
    let map = |pairs: &[(Row, &[Row])]| -> HashMap<Row, HashSet<Row>> {
        pairs
            .iter()
            .map(|(src, dsts)| (*src, dsts.iter().copied().collect()))
            .collect()
    };
    match kind {
        GraphKind::IfThen => map(&[(I, &[A, F, O, P]), (A, &[O])]),
        GraphKind::IfThenElse => map(&[(I, &[A, F, B, P, O]), (A, &[O]), (B, &[P])]),
        GraphKind::Empty => map(&[(I, &[])]),
        GraphKind::ForLoop => map(&[(I, &[A, L, S, O, P]), (L, &[A]), (S, &[A]), (A, &[T, O])]),
        GraphKind::WhileLoop => map(&[(I, &[A, S, W, O, P]), (S, &[A]), (W, &[A]), (A, &[T, X, O])]),
        GraphKind::Standard => map(&[(I, &[A, B]), (A, &[B, O]), (B, &[O])]),
        GraphKind::Primitive => map(&[(I, &[A]), (A, &[O])]),
        GraphKind::Unknown => {
            let mut merged: HashMap<Row, HashSet<Row>> = HashMap::new();
            for other in [
                GraphKind::IfThen,
                GraphKind::IfThenElse,
                GraphKind::ForLoop,
                GraphKind::WhileLoop,
                GraphKind::Standard,
                GraphKind::Primitive,
            ] {
                for (src, dsts) in valid_dst_rows(other) {
                    merged.entry(src).or_default().extend(dsts);
                }
            }
            merged
        }
    }
}

/// `valid_src_rows[kind]`: the transpose of [`valid_dst_rows`], augmented
/// with a synthetic `U -> union(all srcs)` entry for the JSON
/// representation.
pub fn valid_src_rows(kind: GraphKind) -> HashMap<Row, HashSet<Row>> {
    let mut inverse: HashMap<Row, HashSet<Row>> = HashMap::new();
    for (src, dsts) in valid_dst_rows(kind) {
        for dst in dsts {
            inverse.entry(dst).or_default().insert(src);
        }
    }
    let all_srcs: HashSet<Row> = inverse.values().flatten().copied().collect();
    if matches!(kind, GraphKind::Empty) {
        inverse.insert(Row::U, [Row::I].into_iter().collect());
    } else {
        inverse.insert(Row::U, all_srcs);
    }
    inverse
}
