//! Connection graph model: rows, endpoints, interfaces, graph-kind
//! classification, mutable/frozen graphs, and the external JSON codec.

pub mod cgraph;
pub mod endpoint;
pub mod endpoint_ref;
pub mod error;
pub mod frozen;
pub mod interface;
pub mod json_codec;
pub mod kind;
pub mod row;

pub use cgraph::CGraph;
pub use endpoint::Endpoint;
pub use endpoint_ref::{DstEndpointRef, EndpointRef, SrcEndpointRef};
pub use error::{GraphError, Result};
pub use frozen::{intern_frozen_graph, FrozenCGraph};
pub use interface::Interface;
pub use json_codec::{interfaces_to_json, json_cgraph_to_interfaces};
pub use kind::{classify, valid_dst_rows, valid_src_rows, GraphKind};
pub use row::{interface_key_to_string, Class, InterfaceKey, Row, DEST_ROWS, SINGLE_ONLY_ROWS, SOURCE_ROWS};
