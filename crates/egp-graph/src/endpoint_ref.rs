//! Non-owning `(row, idx)` locators into an [`Interface`](crate::interface::Interface).
use egp_error::CoreError;
use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};
use crate::row::Row;

/// An immutable `(row, idx)` tuple referencing a position in some interface,
/// without owning it. Cross-row consistency of a pair of refs is a derived
/// property checked by [`crate::cgraph::CGraph::consistency`], not enforced
/// by ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EndpointRef {
    pub row: Row,
    pub idx: u8,
}

impl EndpointRef {
    pub fn new(row: Row, idx: u8) -> Self {
        EndpointRef { row, idx }
    }
}

/// An [`EndpointRef`] whose row is guaranteed (by construction) to be a
/// valid source row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SrcEndpointRef(EndpointRef);

impl SrcEndpointRef {
    pub fn new(row: Row, idx: u8) -> Result<Self> {
        if !row.is_valid_source() {
            return Err(GraphError::Core(CoreError::GraphShape(format!(
                "row '{row}' is not a valid source row"
            ))));
        }
        Ok(SrcEndpointRef(EndpointRef::new(row, idx)))
    }

    pub fn as_ref(self) -> EndpointRef {
        self.0
    }
}

/// An [`EndpointRef`] whose row is guaranteed (by construction) to be a
/// valid destination row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DstEndpointRef(EndpointRef);

impl DstEndpointRef {
    pub fn new(row: Row, idx: u8) -> Result<Self> {
        if !row.is_valid_dest() {
            return Err(GraphError::Core(CoreError::GraphShape(format!(
                "row '{row}' is not a valid destination row"
            ))));
        }
        Ok(DstEndpointRef(EndpointRef::new(row, idx)))
    }

    pub fn as_ref(self) -> EndpointRef {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn src_endpoint_ref_rejects_dest_only_row() {
        assert!(SrcEndpointRef::new(Row::F, 0).is_err());
        assert!(SrcEndpointRef::new(Row::I, 0).is_ok());
    }

    #[test]
    fn dst_endpoint_ref_rejects_source_only_row() {
        assert!(DstEndpointRef::new(Row::I, 0).is_err());
        assert!(DstEndpointRef::new(Row::F, 0).is_ok());
    }
}
