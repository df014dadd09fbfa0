//! Immutable type definitions.
use std::hash::{Hash, Hasher};

use crate::arc_str::ArcStr;
use crate::import_def::ImportDef;
use egp_error::{CoreError, Result};

const NAME_LEN: (usize, usize) = (1, 64);
const DEFAULT_LEN: (usize, usize) = (1, 64);

/// A named type in the global hierarchy. Frozen at construction: every
/// field is set once by [`TypeDef::new`] and never mutated afterwards.
/// Equality and hashing are by `uid` alone: two `TypeDef`s with the same
/// UID are the same type regardless of any other field.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TypeDef {
    pub name: ArcStr,
    pub uid: i32,
    pub depth: u32,
    pub is_abstract: bool,
    pub default: Option<ArcStr>,
    pub imports: Vec<ImportDef>,
    pub parents: Vec<i32>,
    pub children: Vec<i32>,
}

impl TypeDef {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<ArcStr>,
        uid: i32,
        depth: u32,
        is_abstract: bool,
        default: Option<ArcStr>,
        mut imports: Vec<ImportDef>,
        parents: Vec<i32>,
    ) -> egp_common::ValidationResult<Self> {
        let name = name.into();
        egp_common::is_short_printable_string("name", &name, NAME_LEN.0, NAME_LEN.1)?;
        if let Some(d) = &default {
            egp_common::is_short_printable_string("default", d, DEFAULT_LEN.0, DEFAULT_LEN.1)?;
        }
        crate::import_def::dedup_imports(&mut imports);
        Ok(TypeDef {
            name,
            uid,
            depth,
            is_abstract,
            default,
            imports,
            parents,
            children: Vec::new(),
        })
    }

    /// `object`, the depth-0 root of the hierarchy, has no parents.
    pub fn is_root(&self) -> bool {
        self.depth == 0 && self.parents.is_empty()
    }

    /// Checks the UID range invariant,
    /// trivially true for any `i32` but kept explicit so callers building a
    /// `TypeDef` from externally-supplied wider integers can validate before
    /// truncation.
    pub fn verify_uid_range(candidate: i64) -> Result<i32> {
        if candidate < i32::MIN as i64 || candidate > i32::MAX as i64 {
            return Err(CoreError::OutOfBounds {
                attr: "uid",
                value: candidate,
                min: i32::MIN as i64,
                max: i32::MAX as i64,
            }
            .into());
        }
        Ok(candidate as i32)
    }
}

impl PartialEq for TypeDef {
    fn eq(&self, other: &Self) -> bool {
        self.uid == other.uid
    }
}

impl Eq for TypeDef {}

impl Hash for TypeDef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.uid.hash(state)
    }
}

/// Ordered by `uid`, matching the registry's `inheritance_chart` and the
/// "sorted by minimum depth" rendering, which needs a stable tiebreak.
impl PartialOrd for TypeDef {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeDef {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.uid.cmp(&other.uid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_name() {
        assert!(TypeDef::new("", 1, 0, false, None, vec![], vec![]).is_err());
    }

    #[test]
    fn rejects_overlong_name() {
        let long = "x".repeat(65);
        assert!(TypeDef::new(long, 1, 0, false, None, vec![], vec![]).is_err());
    }

    #[test]
    fn equality_is_by_uid_only() {
        let a = TypeDef::new("int", 1, 0, false, None, vec![], vec![]).unwrap();
        let b = TypeDef::new("different_name", 1, 5, true, None, vec![], vec![1, 2]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn imports_are_deduplicated_on_construction() {
        let imports = vec![
            ImportDef::new("std", "Foo", None).unwrap(),
            ImportDef::new("std", "Foo", None).unwrap(),
        ];
        let td = TypeDef::new("t", 1, 0, false, None, imports, vec![]).unwrap();
        assert_eq!(td.imports.len(), 1);
    }
}
