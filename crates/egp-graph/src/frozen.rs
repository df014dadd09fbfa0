//! Immutable, column-oriented connection graph.
use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use egp_error::CoreError;
use egp_sign::{Freezable, ObjectDeduplicator};
use egp_types::TypeRegistry;

use crate::endpoint_ref::EndpointRef;
use crate::error::{GraphError, Result};
use crate::interface::Interface;
use crate::row::{Class, InterfaceKey};

type TypeTuple = Arc<Vec<i32>>;
type RefTuple = Arc<Vec<Vec<EndpointRef>>>;

/// Process-wide canonicalisation of interfaces' type columns.
fn type_tuple_dedup() -> &'static ObjectDeduplicator<TypeTuple> {
    static CELL: OnceLock<ObjectDeduplicator<TypeTuple>> = OnceLock::new();
    CELL.get_or_init(|| ObjectDeduplicator::new("frozen_graph_types", 4096))
}

/// Process-wide canonicalisation of interfaces' ref columns.
fn ref_tuple_dedup() -> &'static ObjectDeduplicator<RefTuple> {
    static CELL: OnceLock<ObjectDeduplicator<RefTuple>> = OnceLock::new();
    CELL.get_or_init(|| ObjectDeduplicator::new("frozen_graph_refs", 4096))
}

/// Process-wide canonicalisation of whole frozen graphs (spec §3.4's "frozen
/// graphs" dedup instance, distinct from the per-column type/ref dedups
/// above), so structurally-equal `FrozenCGraph`s collapse to one instance.
fn frozen_graph_dedup() -> &'static ObjectDeduplicator<FrozenCGraph> {
    static CELL: OnceLock<ObjectDeduplicator<FrozenCGraph>> = OnceLock::new();
    CELL.get_or_init(|| ObjectDeduplicator::new("frozen_graph", 4096))
}

/// Interns `graph` through the process-wide frozen-graph deduplicator,
/// returning the canonical stored instance for its structural content.
/// Callers that wrap a `FrozenCGraph` in a larger immutable aggregate (e.g.
/// `GeneticCode`) should intern through this rather than storing the raw
/// value, per spec §4.6 step 1.
pub fn intern_frozen_graph(graph: FrozenCGraph) -> Result<FrozenCGraph> {
    frozen_graph_dedup()
        .get_frozen(graph)
        .map_err(|e| GraphError::Core(match e {
            egp_sign::SignError::Core(c) => c,
            other => CoreError::InvariantViolation(other.to_string()),
        }))
}

/// One frozen interface: a parallel type-tuple and ref-tuple, column-major
/// rather than the mutable `Interface`'s row of `Endpoint`s.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FrozenInterface {
    row: crate::row::Row,
    cls: Class,
    types: TypeTuple,
    refs: RefTuple,
}

impl FrozenInterface {
    fn from_interface(iface: &Interface) -> Self {
        let types: Vec<i32> = iface.iter().map(|e| e.typ).collect();
        let refs: Vec<Vec<EndpointRef>> = iface.iter().map(|e| e.refs.clone()).collect();
        FrozenInterface {
            row: iface.row,
            cls: iface.cls,
            types: type_tuple_dedup().get(Arc::new(types)),
            refs: ref_tuple_dedup().get(Arc::new(refs)),
        }
    }

    fn to_interface(&self) -> Interface {
        let mut out = Interface::new(self.row, self.cls);
        for (typ, refs) in self.types.iter().zip(self.refs.iter()) {
            let idx = out.append(*typ).expect("frozen interfaces stay within bounds");
            let ep = out.get_mut(idx).expect("just appended");
            for r in refs {
                ep.connect(*r);
            }
        }
        out
    }
}

/// Immutable connection graph, canonicalised through the process-wide
/// deduplicators so that structurally-equal graphs across a population
/// share storage.
#[derive(Debug, Clone)]
pub struct FrozenCGraph {
    interfaces: Arc<BTreeMap<InterfaceKey, FrozenInterface>>,
    hash: u64,
}

impl FrozenCGraph {
    pub(crate) fn from_interfaces(interfaces: &BTreeMap<InterfaceKey, Interface>) -> Self {
        let frozen: BTreeMap<InterfaceKey, FrozenInterface> = interfaces
            .iter()
            .map(|(key, iface)| (*key, FrozenInterface::from_interface(iface)))
            .collect();
        let hash = Self::compute_hash(&frozen);
        FrozenCGraph {
            interfaces: Arc::new(frozen),
            hash,
        }
    }

    fn compute_hash(interfaces: &BTreeMap<InterfaceKey, FrozenInterface>) -> u64 {
        let mut hasher = DefaultHasher::new();
        for (key, iface) in interfaces {
            key.hash(&mut hasher);
            iface.hash(&mut hasher);
        }
        hasher.finish()
    }

    /// Expands back into owned, mutable `Endpoint` rows.
    pub fn to_interfaces(&self) -> BTreeMap<InterfaceKey, Interface> {
        self.interfaces
            .iter()
            .map(|(key, iface)| (*key, iface.to_interface()))
            .collect()
    }

    pub fn contains(&self, key: InterfaceKey) -> bool {
        self.interfaces.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.interfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
    }

    pub fn precomputed_hash(&self) -> u64 {
        self.hash
    }

    pub fn set(&self, _key: InterfaceKey, _interface: Interface) -> Result<()> {
        Err(GraphError::Core(CoreError::FrozenGraph { op: "set" }))
    }

    pub fn del(&self, _key: InterfaceKey) -> Result<()> {
        Err(GraphError::Core(CoreError::FrozenGraph { op: "del" }))
    }

    pub fn to_json(&self, registry: &TypeRegistry) -> Result<serde_json::Value> {
        crate::json_codec::interfaces_to_json(&self.to_interfaces(), registry)
    }
}

impl Freezable for FrozenCGraph {
    fn is_frozen(&self) -> bool {
        true
    }
}

impl PartialEq for FrozenCGraph {
    /// Hash-then-structural comparison: the cheap `u64`
    /// guards a full deep comparison that only triggers on (rare) collision.
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.interfaces == other.interfaces
    }
}

impl Eq for FrozenCGraph {}

impl Hash for FrozenCGraph {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cgraph::CGraph;
    use crate::row::Row;
    use egp_types::TypeDef;

    fn registry_with_int() -> TypeRegistry {
        let reg = TypeRegistry::default();
        reg.insert(TypeDef::new("int", 1, 0, false, None, vec![], vec![]).unwrap())
            .unwrap();
        reg
    }

    fn stable_graph(reg: &TypeRegistry) -> CGraph {
        let json = serde_json::json!({
            "A": [["I", 0, "int"]],
            "O": [["A", 0, "int"]],
            "U": []
        });
        CGraph::from_json(&json, reg).unwrap()
    }

    #[test]
    fn freeze_then_round_trip_preserves_shape() {
        let reg = registry_with_int();
        let g = stable_graph(&reg);
        let frozen = g.freeze().unwrap();
        let back = CGraph::from_frozen(&frozen);
        assert_eq!(g.to_json(&reg).unwrap(), back.to_json(&reg).unwrap());
    }

    #[test]
    fn structurally_equal_graphs_compare_equal() {
        let reg = registry_with_int();
        let a = stable_graph(&reg).freeze().unwrap();
        let b = stable_graph(&reg).freeze().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.precomputed_hash(), b.precomputed_hash());
    }

    #[test]
    fn intern_collapses_structurally_equal_graphs() {
        let reg = registry_with_int();
        let a = stable_graph(&reg).freeze().unwrap();
        let b = stable_graph(&reg).freeze().unwrap();
        let a = intern_frozen_graph(a).unwrap();
        let b = intern_frozen_graph(b).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn mutators_are_rejected() {
        let reg = registry_with_int();
        let frozen = stable_graph(&reg).freeze().unwrap();
        assert!(frozen.set((Row::A, Class::Dst), Interface::new(Row::A, Class::Dst)).is_err());
        assert!(frozen.del((Row::A, Class::Dst)).is_err());
    }
}
