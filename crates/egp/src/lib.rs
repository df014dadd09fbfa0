//! Single-dependency facade over the erasmus-gp core: the global type
//! system, the connection graph model, and the signed content store.
//!
//! Downstream crates that only need the public surface (not the internal
//! layering) can depend on this crate alone instead of the six `egp-*`
//! crates individually.

pub use egp_common as common;
pub use egp_error as error;
pub use egp_gc as gc;
pub use egp_graph as graph;
pub use egp_sign as sign;
pub use egp_types as types;

pub use egp_error::{Error, Result};
pub use egp_gc::{GcType, GeneticCode, GeneticCodeFields, GraphType, Properties, Signature};
pub use egp_graph::{
    CGraph, Class, Endpoint, EndpointRef, FrozenCGraph, GraphKind, Interface, InterfaceKey, Row,
};
pub use egp_sign::{DedupStats, Freezable, ObjectDeduplicator, SignatureAlgorithm, SignatureService};
pub use egp_types::{
    ingest_bundle, load_bundle, ArcStr, BitfieldUid, BundleEntry, BundleImport, ImportDef,
    TypeDef, TypeRegistry, TypesBundle,
};
