//! Shared fixtures for the erasmus-gp workspace's test suites: disposable
//! signing keys, a seeded `TypeRegistry`, and one canonical JSON connection
//! graph per `GraphKind`.

pub mod cgraphs;
pub mod keys;
pub mod registry;

pub use cgraphs::{
    empty_json, for_loop_json, if_then_else_json, if_then_json, primitive_json, standard_json,
    while_loop_json,
};
pub use keys::{generate_ed25519_keypair, Ed25519KeyPairPem};
pub use registry::sample_registry;
