//! `GeneticCode` (GGC): the content-addressed aggregate at the top of the
//! core.
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use egp_error::CoreError;
use egp_graph::FrozenCGraph;
use egp_sign::SignatureService;
use egp_types::{ImportDef, TypeRegistry};
use uuid::Uuid;

use crate::error::{GcError, Result};
use crate::properties::{GcType, GraphType, Properties};

/// A 32-byte SHA-256 content signature, used both as a GGC's own identity
/// and as the "pointer" type used to reference parent/ancestor GCs by value.
pub type Signature = [u8; 32];

/// Fields describing a `GeneticCode` prior to signature computation, in the
/// canonical tuple order the content signature is computed over. Kept as a
/// builder struct so [`GeneticCode::new`] can compute the signature from
/// exactly these fields, with no risk of drift between construction and
/// signing.
#[derive(Debug, Clone)]
pub struct GeneticCodeFields {
    pub cgraph: FrozenCGraph,
    pub ancestor_a: Option<Signature>,
    pub ancestor_b: Option<Signature>,
    pub gca: Option<Signature>,
    pub gcb: Option<Signature>,
    pub pgc: Option<Signature>,
    pub creator: Uuid,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub code_depth: u32,
    pub generation: u32,
    pub num_codes: u32,
    pub num_codons: u32,
    pub inline: Option<String>,
    pub code: Option<String>,
    pub imports: Vec<ImportDef>,
    pub reference_count: i64,
    pub lost_descendants: i64,
    pub internal_reference_count: i64,
    pub internal_lost_descendants: i64,
    pub properties: Properties,
}

/// Content-addressed aggregate of a frozen connection graph plus provenance
/// and code metadata. Equality, hashing, and identity all defer
/// to [`GeneticCode::signature`].
#[derive(Debug, Clone)]
pub struct GeneticCode {
    fields: GeneticCodeFields,
    signature: Signature,
}

impl GeneticCode {
    /// Builds a `GeneticCode` and computes its content signature over the
    /// canonical tuple `(ancestora, ancestorb, gca, gcb, cgraph.to_json(),
    /// pgc, imports, inline, code, created_epoch_seconds, creator_uuid_bytes)`.
    pub fn new(mut fields: GeneticCodeFields, registry: &TypeRegistry) -> Result<Self> {
        if fields.created < egp_common::egp_epoch() {
            return Err(GcError::Core(CoreError::OutOfBounds {
                attr: "created",
                value: fields.created.timestamp(),
                min: egp_common::egp_epoch().timestamp(),
                max: i64::MAX,
            }));
        }
        fields.cgraph = egp_graph::intern_frozen_graph(fields.cgraph).map_err(GcError::Graph)?;
        let graph_json = fields
            .cgraph
            .to_json(registry)
            .map_err(GcError::Graph)?;
        let signature = canonical_signature(&fields, &graph_json)?;
        let gc = GeneticCode { fields, signature };
        gc.verify()?;
        Ok(gc)
    }

    pub fn signature(&self) -> Signature {
        self.signature
    }

    pub fn fields(&self) -> &GeneticCodeFields {
        &self.fields
    }

    pub fn cgraph(&self) -> &FrozenCGraph {
        &self.fields.cgraph
    }

    pub fn properties(&self) -> Properties {
        self.fields.properties
    }

    /// Structural invariants a `GeneticCode` must satisfy:
    pub fn verify(&self) -> Result<()> {
        let f = &self.fields;

        if f.code_depth == 1 && f.gca.is_some() {
            return Err(GcError::Core(CoreError::InvariantViolation(
                "code_depth == 1 implies gca is null".into(),
            )));
        }
        if f.code_depth > 1 && f.gca.is_none() {
            return Err(GcError::Core(CoreError::InvariantViolation(
                "code_depth > 1 implies gca is not null".into(),
            )));
        }
        if f.generation == 1 && f.gca.is_some() {
            return Err(GcError::Core(CoreError::InvariantViolation(
                "generation == 1 implies gca is null".into(),
            )));
        }
        if f.lost_descendants > f.reference_count {
            return Err(GcError::Core(CoreError::InvariantViolation(
                "lost_descendants must not exceed reference_count".into(),
            )));
        }
        if f.internal_lost_descendants > f.lost_descendants {
            return Err(GcError::Core(CoreError::InvariantViolation(
                "internal lost_descendants must not exceed lost_descendants".into(),
            )));
        }
        if f.internal_reference_count > f.reference_count {
            return Err(GcError::Core(CoreError::InvariantViolation(
                "internal reference_count must not exceed reference_count".into(),
            )));
        }
        if f.num_codes < f.code_depth {
            return Err(GcError::Core(CoreError::InvariantViolation(
                "num_codes must be at least code_depth".into(),
            )));
        }

        let kind = self.fields.cgraph_kind()?;
        if kind != f.properties.graph_type {
            return Err(GcError::Core(CoreError::TypeInconsistency(format!(
                "cgraph kind {:?} does not match properties.graph_type {:?}",
                kind, f.properties.graph_type
            ))));
        }
        if matches!(f.properties.gc_type, Some(GcType::Codon)) && kind != GraphType::Primitive {
            return Err(GcError::Core(CoreError::InvariantViolation(
                "a CODON gc_type requires a PRIMITIVE connection graph".into(),
            )));
        }

        Ok(())
    }

    /// View-object serialisation: every field by name, signatures
    /// hex-encoded, timestamps ISO-8601, and the connection graph in its own
    /// canonical JSON form.
    pub fn to_json(&self, registry: &TypeRegistry) -> Result<serde_json::Value> {
        let f = &self.fields;
        let graph_json = f.cgraph.to_json(registry).map_err(GcError::Graph)?;
        let imports_json = serde_json::to_value(&f.imports).map_err(|e| {
            GcError::Core(CoreError::InvariantViolation(format!(
                "imports did not serialise: {e}"
            )))
        })?;
        let properties_json = serde_json::to_value(f.properties).map_err(|e| {
            GcError::Core(CoreError::InvariantViolation(format!(
                "properties did not serialise: {e}"
            )))
        })?;
        Ok(serde_json::json!({
            "signature": hex_sig(&self.signature),
            "ancestora": f.ancestor_a.as_ref().map(hex_sig),
            "ancestorb": f.ancestor_b.as_ref().map(hex_sig),
            "gca": f.gca.as_ref().map(hex_sig),
            "gcb": f.gcb.as_ref().map(hex_sig),
            "pgc": f.pgc.as_ref().map(hex_sig),
            "creator_uuid": f.creator.to_string(),
            "created": f.created.to_rfc3339(),
            "updated": f.updated.to_rfc3339(),
            "code_depth": f.code_depth,
            "generation": f.generation,
            "num_codes": f.num_codes,
            "num_codons": f.num_codons,
            "inline": f.inline,
            "code": f.code,
            "imports": imports_json,
            "reference_count": f.reference_count,
            "lost_descendants": f.lost_descendants,
            "_reference_count": f.internal_reference_count,
            "_lost_descendants": f.internal_lost_descendants,
            "properties": properties_json,
            "cgraph": graph_json,
        }))
    }
}

fn hex_sig(sig: &Signature) -> String {
    sig.iter().map(|b| format!("{b:02x}")).collect()
}

impl GeneticCodeFields {
    fn cgraph_kind(&self) -> Result<GraphType> {
        let interfaces = self.cgraph.to_interfaces();
        let rows: std::collections::HashSet<_> = interfaces.keys().map(|(row, _)| *row).collect();
        egp_graph::classify(&rows, false).map_err(GcError::Graph)
    }
}

impl PartialEq for GeneticCode {
    fn eq(&self, other: &Self) -> bool {
        self.signature == other.signature
    }
}

impl Eq for GeneticCode {}

impl Hash for GeneticCode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.signature.hash(state);
    }
}

fn opt_sig_bytes(sig: &Option<Signature>) -> Vec<u8> {
    match sig {
        Some(s) => s.to_vec(),
        None => Vec::new(),
    }
}

fn canonical_signature(fields: &GeneticCodeFields, graph_json: &serde_json::Value) -> Result<Signature> {
    let ancestor_a = opt_sig_bytes(&fields.ancestor_a);
    let ancestor_b = opt_sig_bytes(&fields.ancestor_b);
    let gca = opt_sig_bytes(&fields.gca);
    let gcb = opt_sig_bytes(&fields.gcb);
    let pgc = opt_sig_bytes(&fields.pgc);
    let graph_bytes = serde_json::to_vec(graph_json).map_err(|e| {
        GcError::Core(CoreError::InvariantViolation(format!(
            "cgraph.to_json() did not serialise: {e}"
        )))
    })?;
    let imports_bytes = serde_json::to_vec(&fields.imports).map_err(|e| {
        GcError::Core(CoreError::InvariantViolation(format!(
            "imports did not serialise: {e}"
        )))
    })?;
    let inline_bytes = fields.inline.as_deref().unwrap_or("").as_bytes().to_vec();
    let code_bytes = fields.code.as_deref().unwrap_or("").as_bytes().to_vec();
    let created_secs = fields.created.timestamp().to_le_bytes().to_vec();
    let creator_bytes = fields.creator.as_bytes().to_vec();

    Ok(SignatureService::sha256_signature(&[
        &ancestor_a,
        &ancestor_b,
        &gca,
        &gcb,
        &graph_bytes,
        &pgc,
        &imports_bytes,
        &inline_bytes,
        &code_bytes,
        &created_secs,
        &creator_bytes,
    ]))
}
