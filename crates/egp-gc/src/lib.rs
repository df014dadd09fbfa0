//! `GeneticCode` aggregation layer: wraps a frozen connection graph with
//! provenance, code metadata, and a content signature.

pub mod error;
pub mod gc;
pub mod properties;

pub use error::{GcError, Result};
pub use gc::{GeneticCode, GeneticCodeFields, Signature};
pub use properties::{GcType, GraphType, Properties};
