//! A small, disposable [`TypeRegistry`] pre-seeded with a tiny type
//! hierarchy, for tests that need real `TypeDef` lookups without loading a
//! signed types bundle.
use egp_types::{TypeDef, TypeRegistry};

/// Builds a registry with `object` (depth 0, abstract), `int` and `bool`
/// (depth 1, concrete, both children of `object`).
pub fn sample_registry() -> TypeRegistry {
    let reg = TypeRegistry::default();
    reg.insert(TypeDef::new("object", 0, 0, true, None, vec![], vec![]).unwrap())
        .unwrap();
    reg.insert(TypeDef::new("int", 1, 1, false, None, vec![], vec![0]).unwrap())
        .unwrap();
    reg.insert(TypeDef::new("bool", 2, 1, false, None, vec![], vec![0]).unwrap())
        .unwrap();
    reg
}
