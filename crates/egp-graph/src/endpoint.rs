//! Typed leaf node in a graph.
use serde::{Deserialize, Serialize};

use crate::endpoint_ref::EndpointRef;
use crate::row::{Class, Row};

/// `(row, idx, cls, typ, refs)`. A `Dst` endpoint carries at most one
/// outgoing ref (its connection to a source); a `Src` endpoint carries
/// zero, one, or many.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub row: Row,
    pub idx: u8,
    pub cls: Class,
    /// UID of the connected [`egp_types::TypeDef`].
    pub typ: i32,
    pub refs: Vec<EndpointRef>,
}

impl Endpoint {
    pub fn new(row: Row, idx: u8, cls: Class, typ: i32) -> Self {
        Endpoint {
            row,
            idx,
            cls,
            typ,
            refs: Vec::new(),
        }
    }

    pub fn is_connected(&self) -> bool {
        !self.refs.is_empty()
    }

    /// Records `target` as connected to this endpoint. `Dst` endpoints
    /// replace any prior connection; `Src` endpoints accumulate distinct refs.
    pub fn connect(&mut self, target: EndpointRef) {
        match self.cls {
            Class::Dst => {
                self.refs.clear();
                self.refs.push(target);
            }
            Class::Src => {
                if !self.refs.contains(&target) {
                    self.refs.push(target);
                }
            }
        }
    }

    /// Drops a specific ref (used when rewiring a `Src` endpoint's fan-out
    /// or when a stale connection is discovered during `consistency`).
    pub fn disconnect(&mut self, target: EndpointRef) {
        self.refs.retain(|r| *r != target);
    }

    pub fn self_ref(&self) -> EndpointRef {
        EndpointRef::new(self.row, self.idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dst_endpoint_connect_replaces_prior_ref() {
        let mut ep = Endpoint::new(Row::O, 0, Class::Dst, 1);
        ep.connect(EndpointRef::new(Row::A, 0));
        ep.connect(EndpointRef::new(Row::A, 1));
        assert_eq!(ep.refs, vec![EndpointRef::new(Row::A, 1)]);
    }

    #[test]
    fn src_endpoint_connect_accumulates_distinct_refs() {
        let mut ep = Endpoint::new(Row::I, 0, Class::Src, 1);
        ep.connect(EndpointRef::new(Row::A, 0));
        ep.connect(EndpointRef::new(Row::A, 1));
        ep.connect(EndpointRef::new(Row::A, 0));
        assert_eq!(ep.refs.len(), 2);
    }
}
