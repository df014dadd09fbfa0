//! Mutable connection graph.
use std::collections::{BTreeMap, HashSet};

use egp_common::should_check_consistency;
use egp_error::CoreError;
use egp_types::TypeRegistry;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;

use crate::endpoint_ref::EndpointRef;
use crate::error::{GraphError, Result};
use crate::frozen::FrozenCGraph;
use crate::interface::Interface;
use crate::json_codec::{interfaces_to_json, json_cgraph_to_interfaces};
use crate::kind::{classify, valid_src_rows, GraphKind};
use crate::row::{Class, InterfaceKey, Row};

/// A single unconnected destination endpoint, located for [`CGraph::connect_all`].
#[derive(Debug, Clone, Copy)]
struct OpenDst {
    row: Row,
    idx: u8,
}

/// Owns every present interface, keyed by `(row, class)`. `Is` (source) and
/// `Od` (destination) are always present, possibly empty.
#[derive(Debug, Clone)]
pub struct CGraph {
    interfaces: BTreeMap<InterfaceKey, Interface>,
}

impl CGraph {
    /// Builds a graph with only the mandatory `Is`/`Od` interfaces, both empty.
    pub fn empty() -> Self {
        let mut interfaces = BTreeMap::new();
        interfaces.insert((Row::I, Class::Src), Interface::new(Row::I, Class::Src));
        interfaces.insert((Row::O, Class::Dst), Interface::new(Row::O, Class::Dst));
        CGraph { interfaces }
    }

    /// Constructs from an already-resolved interface map (e.g. the JSON
    /// codec's output), ensuring `Is`/`Od` are present.
    pub fn from_interfaces(mut interfaces: BTreeMap<InterfaceKey, Interface>) -> Self {
        interfaces
            .entry((Row::I, Class::Src))
            .or_insert_with(|| Interface::new(Row::I, Class::Src));
        interfaces
            .entry((Row::O, Class::Dst))
            .or_insert_with(|| Interface::new(Row::O, Class::Dst));
        CGraph { interfaces }
    }

    /// Parses the external JSON connection-graph format into a fresh,
    /// mutable graph.
    pub fn from_json(json: &serde_json::Value, registry: &TypeRegistry) -> Result<Self> {
        let interfaces = json_cgraph_to_interfaces(json, registry)?;
        Ok(CGraph::from_interfaces(interfaces))
    }

    /// Copies every endpoint out of a [`FrozenCGraph`] into fresh, mutable
    /// storage.
    pub fn from_frozen(frozen: &FrozenCGraph) -> Self {
        CGraph::from_interfaces(frozen.to_interfaces())
    }

    pub fn get(&self, key: InterfaceKey) -> Option<&Interface> {
        self.interfaces.get(&key)
    }

    pub fn get_mut(&mut self, key: InterfaceKey) -> Option<&mut Interface> {
        self.interfaces.get_mut(&key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &InterfaceKey> {
        self.interfaces.keys()
    }

    /// Replaces (or inserts) the interface at `key`.
    pub fn set(&mut self, key: InterfaceKey, interface: Interface) -> Result<()> {
        if interface.row != key.0 || interface.cls != key.1 {
            return Err(GraphError::Core(CoreError::GraphShape(format!(
                "interface row/class {}{} does not match key {}{}",
                interface.row, interface.cls, key.0, key.1
            ))));
        }
        self.interfaces.insert(key, interface);
        Ok(())
    }

    /// Removes the interface at `key`. `Is` and `Od` may never be removed,
    /// only replaced with an empty interface via [`Self::set`].
    pub fn del(&mut self, key: InterfaceKey) -> Result<()> {
        if key == (Row::I, Class::Src) || key == (Row::O, Class::Dst) {
            return Err(GraphError::Core(CoreError::InvariantViolation(format!(
                "{}{} is always present and cannot be deleted",
                key.0, key.1
            ))));
        }
        self.interfaces.remove(&key);
        Ok(())
    }

    /// Establishes `src -> dst`, replacing any prior destination connection.
    pub fn connect(&mut self, src_row: Row, src_idx: u8, dst_row: Row, dst_idx: u8) -> Result<()> {
        let src_typ = {
            let src_iface = self
                .interfaces
                .get(&(src_row, Class::Src))
                .ok_or_else(|| {
                    GraphError::Core(CoreError::NotFound {
                        what: "Interface",
                        id: format!("{src_row}s"),
                    })
                })?;
            src_iface
                .get(src_idx)
                .ok_or_else(|| {
                    GraphError::Core(CoreError::IndexOutOfRange {
                        row: src_row.to_string(),
                        idx: src_idx as u16,
                        len: src_iface.len() as u8,
                    })
                })?
                .typ
        };
        {
            let dst_iface = self
                .interfaces
                .get(&(dst_row, Class::Dst))
                .ok_or_else(|| {
                    GraphError::Core(CoreError::NotFound {
                        what: "Interface",
                        id: format!("{dst_row}d"),
                    })
                })?;
            dst_iface.get(dst_idx).ok_or_else(|| {
                GraphError::Core(CoreError::IndexOutOfRange {
                    row: dst_row.to_string(),
                    idx: dst_idx as u16,
                    len: dst_iface.len() as u8,
                })
            })?;
        }
        let src_ref = EndpointRef::new(src_row, src_idx);
        let dst_ref = EndpointRef::new(dst_row, dst_idx);

        self.interfaces
            .get_mut(&(dst_row, Class::Dst))
            .expect("checked above")
            .get_mut(dst_idx)
            .expect("checked above")
            .connect(src_ref);
        self.interfaces
            .get_mut(&(src_row, Class::Src))
            .expect("checked above")
            .get_mut(src_idx)
            .expect("checked above")
            .connect(dst_ref);
        let _ = src_typ;
        Ok(())
    }

    fn present_rows(&self) -> HashSet<Row> {
        self.interfaces.keys().map(|(row, _)| *row).collect()
    }

    pub fn kind(&self) -> Result<GraphKind> {
        classify(&self.present_rows(), false)
    }

    fn unconnected_dst_endpoints(&self) -> Vec<OpenDst> {
        let mut out = Vec::new();
        for ((row, cls), iface) in &self.interfaces {
            if *cls != Class::Dst {
                continue;
            }
            for ep in iface.iter() {
                if !ep.is_connected() {
                    out.push(OpenDst { row: *row, idx: ep.idx });
                }
            }
        }
        out
    }

    /// Randomised stabilisation: wires every reachable
    /// unconnected destination endpoint to a type-compatible source,
    /// optionally synthesising new `Is` endpoints when `if_locked == false`.
    pub fn connect_all(&mut self, if_locked: bool, rng: &mut impl Rng, registry: &TypeRegistry) -> Result<()> {
        let kind = self.kind()?;
        let src_rows_by_dst = valid_src_rows(kind);

        let mut pending = self.unconnected_dst_endpoints();
        pending.shuffle(rng);

        for dep in pending {
            let dst_typ = {
                let iface = self.interfaces.get(&(dep.row, Class::Dst)).expect("present");
                let Some(ep) = iface.get(dep.idx) else {
                    continue;
                };
                if ep.is_connected() {
                    continue;
                }
                ep.typ
            };
            let dst_td = registry.get(dst_typ).map_err(|_| {
                GraphError::Core(CoreError::NotFound {
                    what: "TypeDef",
                    id: dst_typ.to_string(),
                })
            })?;
            let ancestors = registry.ancestors(&dst_td).map_err(|_| {
                GraphError::Core(CoreError::NotFound {
                    what: "TypeDef",
                    id: dst_typ.to_string(),
                })
            })?;

            let Some(valid_srcs) = src_rows_by_dst.get(&dep.row) else {
                continue;
            };

            #[derive(Clone, Copy)]
            enum Candidate {
                Existing { row: Row, idx: u8 },
                NewOnIs,
            }

            let mut candidates: Vec<Candidate> = Vec::new();
            for src_row in valid_srcs {
                let Some(src_iface) = self.interfaces.get(&(*src_row, Class::Src)) else {
                    continue;
                };
                for ep in src_iface.iter() {
                    if ancestors.contains(&ep.typ) {
                        candidates.push(Candidate::Existing {
                            row: *src_row,
                            idx: ep.idx,
                        });
                    }
                }
            }
            if !if_locked && valid_srcs.contains(&Row::I) {
                candidates.push(Candidate::NewOnIs);
            }

            let Some(chosen) = candidates.choose(rng).copied() else {
                continue;
            };

            let (src_row, src_idx) = match chosen {
                Candidate::Existing { row, idx } => (row, idx),
                Candidate::NewOnIs => {
                    let is_iface = self
                        .interfaces
                        .entry((Row::I, Class::Src))
                        .or_insert_with(|| Interface::new(Row::I, Class::Src));
                    let idx = is_iface.append(dst_typ)?;
                    (Row::I, idx)
                }
            };

            self.connect(src_row, src_idx, dep.row, dep.idx)?;
        }
        Ok(())
    }

    /// `connect_all` plus, under `EGP_VERIFY`, a call to [`Self::verify`].
    pub fn stabilize(&mut self, if_locked: bool, rng: &mut impl Rng, registry: &TypeRegistry) -> Result<()> {
        self.connect_all(if_locked, rng, registry)?;
        if egp_common::should_verify() {
            self.verify()?;
        }
        Ok(())
    }

    pub fn is_stable(&self) -> bool {
        self.interfaces
            .iter()
            .filter(|((_, cls), _)| *cls == Class::Dst)
            .all(|(_, iface)| iface.is_stable())
    }

    /// Cheap structural validation.
    pub fn verify(&self) -> Result<()> {
        for iface in self.interfaces.values() {
            iface.verify()?;
        }

        let rows = self.present_rows();
        let kind = classify(&rows, false)?;
        let src_map = valid_src_rows(kind);

        for row in &rows {
            if row.is_single_only() {
                if let Some(iface) = self.interfaces.get(&(*row, Class::Dst)) {
                    if iface.len() > 1 {
                        return Err(GraphError::Core(CoreError::GraphShape(format!(
                            "row {row} permits at most one endpoint, found {}",
                            iface.len()
                        ))));
                    }
                }
            }
        }

        for ((row, cls), iface) in &self.interfaces {
            if *cls != Class::Dst {
                continue;
            }
            let allowed = src_map.get(row).cloned().unwrap_or_default();
            for ep in iface.iter() {
                let Some(src) = ep.refs.first() else {
                    continue;
                };
                if !allowed.contains(&src.row) {
                    return Err(GraphError::Core(CoreError::GraphShape(format!(
                        "{row}d endpoint {} sources from disallowed row {}",
                        ep.idx, src.row
                    ))));
                }
                let Some(src_iface) = self.interfaces.get(&(src.row, Class::Src)) else {
                    return Err(GraphError::Core(CoreError::NotFound {
                        what: "Interface",
                        id: format!("{}s", src.row),
                    }));
                };
                let Some(src_ep) = src_iface.get(src.idx) else {
                    return Err(GraphError::Core(CoreError::IndexOutOfRange {
                        row: src.row.to_string(),
                        idx: src.idx as u16,
                        len: src_iface.len() as u8,
                    }));
                };
                if src_ep.typ != ep.typ {
                    return Err(GraphError::Core(CoreError::TypeInconsistency(format!(
                        "{row}d{} expects type {} but source {}s{} has type {}",
                        ep.idx, ep.typ, src.row, src.idx, src_ep.typ
                    ))));
                }
            }
        }

        Ok(())
    }

    /// Expensive bidirectional-reference and hash-integrity check, only run when [`egp_common::should_check_consistency`] is
    /// set.
    pub fn consistency(&self) -> Result<()> {
        if !should_check_consistency() {
            return Ok(());
        }
        for ((row, cls), iface) in &self.interfaces {
            for ep in iface.iter() {
                for r in &ep.refs {
                    let Some(other_iface) = self.interfaces.get(&(r.row, cls.opposite())) else {
                        return Err(GraphError::Core(CoreError::InvariantViolation(format!(
                            "{row}{cls}{} refs missing interface {}{}",
                            ep.idx,
                            r.row,
                            cls.opposite()
                        ))));
                    };
                    let Some(other_ep) = other_iface.get(r.idx) else {
                        return Err(GraphError::Core(CoreError::InvariantViolation(format!(
                            "{row}{cls}{} refs missing endpoint {}{}{}",
                            ep.idx,
                            r.row,
                            cls.opposite(),
                            r.idx
                        ))));
                    };
                    let back = EndpointRef::new(*row, ep.idx);
                    if !other_ep.refs.contains(&back) {
                        return Err(GraphError::Core(CoreError::InvariantViolation(format!(
                            "{row}{cls}{} -> {}{}{} is not reciprocated",
                            ep.idx,
                            r.row,
                            cls.opposite(),
                            r.idx
                        ))));
                    }
                }
            }
        }
        Ok(())
    }

    pub fn to_json(&self, registry: &TypeRegistry) -> Result<serde_json::Value> {
        interfaces_to_json(&self.interfaces, registry)
    }

    /// Canonicalises this graph's endpoints through the frozen-graph
    /// deduplicator and returns an immutable [`FrozenCGraph`].
    /// Fails with [`CoreError::FrozenGraph`] (via `verify`-before-freeze) if
    /// the graph is not stable.
    pub fn freeze(&self) -> Result<FrozenCGraph> {
        if !self.is_stable() {
            return Err(GraphError::Core(CoreError::GraphShape(
                "cannot freeze an unstable graph: every destination endpoint must be connected"
                    .into(),
            )));
        }
        self.verify()?;
        Ok(FrozenCGraph::from_interfaces(&self.interfaces))
    }
}

impl Class {
    fn opposite(self) -> Class {
        match self {
            Class::Src => Class::Dst,
            Class::Dst => Class::Src,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egp_types::TypeDef;
    use rand::SeedableRng;

    fn registry_with_int() -> TypeRegistry {
        let reg = TypeRegistry::default();
        reg.insert(TypeDef::new("int", 1, 0, false, None, vec![], vec![]).unwrap())
            .unwrap();
        reg
    }

    fn primitive_json() -> serde_json::Value {
        serde_json::json!({
            "A": [["I", 0, "int"]],
            "O": [["A", 0, "int"]],
            "U": []
        })
    }

    #[test]
    fn connect_replaces_prior_destination_ref() {
        let reg = registry_with_int();
        let mut g = CGraph::from_json(&primitive_json(), &reg).unwrap();
        g.get_mut((Row::A, Class::Src))
            .unwrap()
            .append(1)
            .unwrap();
        g.connect(Row::A, 1, Row::O, 0).unwrap();
        let o = g.get((Row::O, Class::Dst)).unwrap().get(0).unwrap();
        assert_eq!(o.refs, vec![EndpointRef::new(Row::A, 1)]);
    }

    #[test]
    fn is_stable_reflects_every_destination_connected() {
        let reg = registry_with_int();
        let g = CGraph::from_json(&primitive_json(), &reg).unwrap();
        assert!(g.is_stable());

        let mut g2 = g.clone();
        g2.get_mut((Row::O, Class::Dst)).unwrap().append(1).unwrap();
        assert!(!g2.is_stable());
    }

    #[test]
    fn verify_passes_for_well_formed_primitive_graph() {
        let reg = registry_with_int();
        let g = CGraph::from_json(&primitive_json(), &reg).unwrap();
        assert!(g.verify().is_ok());
    }

    #[test]
    fn del_rejects_mandatory_interfaces() {
        let reg = registry_with_int();
        let mut g = CGraph::from_json(&primitive_json(), &reg).unwrap();
        assert!(g.del((Row::I, Class::Src)).is_err());
        assert!(g.del((Row::O, Class::Dst)).is_err());
    }

    #[test]
    fn freeze_rejects_unstable_graph() {
        let reg = registry_with_int();
        let mut g = CGraph::from_json(&primitive_json(), &reg).unwrap();
        g.get_mut((Row::O, Class::Dst)).unwrap().append(1).unwrap();
        assert!(g.freeze().is_err());
    }

    #[test]
    fn connect_all_wires_unconnected_destination_to_new_is_endpoint() {
        let reg = registry_with_int();
        let mut g = CGraph::empty();
        g.set((Row::A, Class::Dst), Interface::new(Row::A, Class::Dst))
            .unwrap();
        g.get_mut((Row::A, Class::Dst)).unwrap().append(1).unwrap();
        g.get_mut((Row::O, Class::Dst)).unwrap().append(1).unwrap();

        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        g.connect_all(false, &mut rng, &reg).unwrap();
        assert!(g.get((Row::I, Class::Src)).unwrap().len() >= 1);
    }
}
