//! In-order, homogeneous collection of [`Endpoint`]s sharing a row and class.
use egp_error::CoreError;
use egp_types::TypeRegistry;
use serde::{Deserialize, Serialize};

use crate::endpoint::Endpoint;
use crate::error::{GraphError, Result};
use crate::row::{Class, Row};

const MAX_LEN: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interface {
    pub row: Row,
    pub cls: Class,
    endpoints: Vec<Endpoint>,
}

impl Interface {
    pub fn new(row: Row, cls: Class) -> Self {
        Interface {
            row,
            cls,
            endpoints: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn get(&self, idx: u8) -> Option<&Endpoint> {
        self.endpoints.get(idx as usize)
    }

    pub fn get_mut(&mut self, idx: u8) -> Option<&mut Endpoint> {
        self.endpoints.get_mut(idx as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Endpoint> {
        self.endpoints.iter_mut()
    }

    /// Appends a new, unconnected endpoint of type `typ`, returning its
    /// index. Fails once the interface already holds 255 endpoints.
    pub fn append(&mut self, typ: i32) -> Result<u8> {
        if self.endpoints.len() >= MAX_LEN - 1 {
            return Err(GraphError::Core(CoreError::OutOfBounds {
                attr: "interface_len",
                value: self.endpoints.len() as i64 + 1,
                min: 0,
                max: 255,
            }));
        }
        let idx = self.endpoints.len() as u8;
        self.endpoints
            .push(Endpoint::new(self.row, idx, self.cls, typ));
        Ok(idx)
    }

    /// Bulk [`Self::append`] over `types`, returning the assigned indices in
    /// order.
    pub fn extend(&mut self, types: impl IntoIterator<Item = i32>) -> Result<Vec<u8>> {
        types.into_iter().map(|t| self.append(t)).collect()
    }

    /// Overwrites the endpoint at `idx`, forcing its `(row, idx, cls)` to
    /// match this interface's position.
    pub fn set(&mut self, idx: u8, mut endpoint: Endpoint) -> Result<()> {
        if idx as usize >= self.endpoints.len() {
            return Err(GraphError::Core(CoreError::IndexOutOfRange {
                row: self.row.to_string(),
                idx: idx as u16,
                len: self.endpoints.len() as u8,
            }));
        }
        endpoint.row = self.row;
        endpoint.cls = self.cls;
        endpoint.idx = idx;
        self.endpoints[idx as usize] = endpoint;
        Ok(())
    }

    /// Removes the endpoint at `idx`, renumbering every subsequent
    /// endpoint's `idx` to keep `idx == position`.
    /// Does not repair dangling refs elsewhere; a graph may become
    /// unstable, which mutable `CGraph`s permit.
    pub fn delete(&mut self, idx: u8) -> Result<Endpoint> {
        if idx as usize >= self.endpoints.len() {
            return Err(GraphError::Core(CoreError::IndexOutOfRange {
                row: self.row.to_string(),
                idx: idx as u16,
                len: self.endpoints.len() as u8,
            }));
        }
        let removed = self.endpoints.remove(idx as usize);
        for (i, ep) in self.endpoints.iter_mut().enumerate().skip(idx as usize) {
            ep.idx = i as u8;
        }
        Ok(removed)
    }

    /// Concatenates `self` then `other`: endpoints are copied, indices
    /// renumbered `0..N-1`, and refs cleared (not copied). Fails if the two
    /// interfaces differ in row or class.
    pub fn concat(&self, other: &Interface) -> Result<Interface> {
        if self.row != other.row || self.cls != other.cls {
            return Err(GraphError::Core(CoreError::GraphShape(format!(
                "cannot concatenate interfaces of different row/class: {}{} vs {}{}",
                self.row, self.cls, other.row, other.cls
            ))));
        }
        let mut result = Interface::new(self.row, self.cls);
        for ep in self.endpoints.iter().chain(other.endpoints.iter()) {
            result.append(ep.typ)?;
        }
        Ok(result)
    }

    /// Returns `(sorted unique type UIDs, per-endpoint position into that
    /// sorted list)`. Each position fits one byte since interfaces are
    /// bounded to 255 endpoints.
    pub fn types_and_indices(&self) -> (Vec<i32>, Vec<u8>) {
        let mut uniq: Vec<i32> = self.endpoints.iter().map(|e| e.typ).collect();
        uniq.sort_unstable();
        uniq.dedup();
        let indices = self
            .endpoints
            .iter()
            .map(|e| uniq.binary_search(&e.typ).unwrap() as u8)
            .collect();
        (uniq, indices)
    }

    /// Cheap structural check: length bound, and every endpoint's `(row,
    /// idx, cls)` matches its position.
    pub fn verify(&self) -> Result<()> {
        if self.endpoints.len() > 255 {
            return Err(GraphError::Core(CoreError::OutOfBounds {
                attr: "interface_len",
                value: self.endpoints.len() as i64,
                min: 0,
                max: 255,
            }));
        }
        for (i, ep) in self.endpoints.iter().enumerate() {
            if ep.row != self.row || ep.cls != self.cls || ep.idx as usize != i {
                return Err(GraphError::Core(CoreError::InvariantViolation(format!(
                    "endpoint at position {i} has mismatched (row, idx, cls): {:?}",
                    ep
                ))));
            }
        }
        Ok(())
    }

    pub fn is_stable(&self) -> bool {
        match self.cls {
            Class::Dst => self.endpoints.iter().all(Endpoint::is_connected),
            Class::Src => true,
        }
    }

    /// Serialises this interface. When `json_c_graph` is
    /// `true` and this is a destination interface, emits the canonical
    /// `[[src_row, src_idx, type_name], ...]` triples; source interfaces
    /// are not emitted directly in that mode (they surface implicitly via
    /// destination refs, with leftovers collected into row `U` by the
    /// caller). In full form, emits every endpoint's own fields.
    pub fn to_json(&self, registry: &TypeRegistry, json_c_graph: bool) -> Result<serde_json::Value> {
        if json_c_graph && self.cls == Class::Dst {
            let mut triples = Vec::with_capacity(self.endpoints.len());
            for ep in &self.endpoints {
                let src = ep.refs.first().ok_or_else(|| {
                    GraphError::Core(CoreError::InvariantViolation(format!(
                        "destination endpoint {}{:03}d has no source ref",
                        self.row, ep.idx
                    )))
                })?;
                let type_name = registry
                    .get(ep.typ)
                    .map_err(|_| {
                        GraphError::Core(CoreError::NotFound {
                            what: "TypeDef",
                            id: ep.typ.to_string(),
                        })
                    })?
                    .name
                    .to_string();
                triples.push(serde_json::json!([src.row.to_string(), src.idx, type_name]));
            }
            return Ok(serde_json::Value::Array(triples));
        }

        let mut out = Vec::with_capacity(self.endpoints.len());
        for ep in &self.endpoints {
            let type_name = registry
                .get(ep.typ)
                .map_err(|_| {
                    GraphError::Core(CoreError::NotFound {
                        what: "TypeDef",
                        id: ep.typ.to_string(),
                    })
                })?
                .name
                .to_string();
            out.push(serde_json::json!({
                "row": self.row.to_string(),
                "idx": ep.idx,
                "cls": self.cls.to_string(),
                "type": type_name,
                "refs": ep.refs.iter().map(|r| serde_json::json!([r.row.to_string(), r.idx])).collect::<Vec<_>>(),
            }));
        }
        Ok(serde_json::Value::Array(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_assigns_sequential_indices() {
        let mut iface = Interface::new(Row::A, Class::Src);
        assert_eq!(iface.append(1).unwrap(), 0);
        assert_eq!(iface.append(2).unwrap(), 1);
        assert_eq!(iface.len(), 2);
    }

    #[test]
    fn append_256th_endpoint_is_rejected() {
        let mut iface = Interface::new(Row::A, Class::Src);
        for _ in 0..255 {
            iface.append(1).unwrap();
        }
        assert_eq!(iface.len(), 255);
        assert!(iface.append(1).is_err());
    }

    #[test]
    fn concat_clears_refs_and_renumbers() {
        let mut a = Interface::new(Row::A, Class::Src);
        a.append(1).unwrap();
        a.get_mut(0)
            .unwrap()
            .connect(crate::endpoint_ref::EndpointRef::new(Row::O, 0));
        let mut b = Interface::new(Row::A, Class::Src);
        b.append(2).unwrap();

        let c = a.concat(&b).unwrap();
        assert_eq!(c.len(), 2);
        assert!(c.iter().all(|e| e.refs.is_empty()));
        assert_eq!(c.get(0).unwrap().typ, 1);
        assert_eq!(c.get(1).unwrap().typ, 2);
    }

    #[test]
    fn concat_is_associative() {
        let mk = |t: i32| {
            let mut i = Interface::new(Row::A, Class::Src);
            i.append(t).unwrap();
            i
        };
        let (a, b, c) = (mk(1), mk(2), mk(3));
        let left = a.concat(&b).unwrap().concat(&c).unwrap();
        let right = a.concat(&b.concat(&c).unwrap()).unwrap();
        assert_eq!(left, right);
    }

    #[test]
    fn concat_rejects_mismatched_row_or_class() {
        let a = Interface::new(Row::A, Class::Src);
        let b = Interface::new(Row::B, Class::Src);
        assert!(a.concat(&b).is_err());
    }

    #[test]
    fn types_and_indices_maps_to_sorted_unique_positions() {
        let mut iface = Interface::new(Row::A, Class::Src);
        iface.append(30).unwrap();
        iface.append(10).unwrap();
        iface.append(30).unwrap();
        let (types, indices) = iface.types_and_indices();
        assert_eq!(types, vec![10, 30]);
        assert_eq!(indices, vec![1, 0, 1]);
    }

    #[test]
    fn delete_renumbers_remaining_endpoints() {
        let mut iface = Interface::new(Row::A, Class::Src);
        iface.append(1).unwrap();
        iface.append(2).unwrap();
        iface.append(3).unwrap();
        iface.delete(0).unwrap();
        assert_eq!(iface.len(), 2);
        assert_eq!(iface.get(0).unwrap().idx, 0);
        assert_eq!(iface.get(1).unwrap().idx, 1);
    }
}
