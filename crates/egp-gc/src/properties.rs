//! The `properties` bitfield carried by every [`crate::gc::GeneticCode`].
use serde::{Deserialize, Serialize};

/// Narrows "is this GC a leaf codon" rather than a composite assembled from
/// sub-GCs. Modelled as an `Option` on [`Properties::gc_type`] rather than
/// adding a `Composite` variant, since only `CODON` is named here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GcType {
    Codon,
}

/// Mirrors the eight [`egp_graph::GraphKind`] variants; kept as
/// a direct alias rather than a parallel enum so the two can never drift.
pub type GraphType = egp_graph::GraphKind;

/// Flags and small enums packed alongside a GGC. The source
/// stores these in a single integer bitfield; this type keeps the same
/// semantics as plain fields, which is both clearer and just as compact once
/// the containing struct is serialised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Properties {
    pub gc_type: Option<GcType>,
    pub graph_type: GraphType,
    pub constant: bool,
    pub deterministic: bool,
    pub side_effects: bool,
    pub static_creation: bool,
}

impl Properties {
    pub fn is_codon(&self) -> bool {
        matches!(self.gc_type, Some(GcType::Codon))
    }
}
