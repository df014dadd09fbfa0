//! A single import statement attached to a [`TypeDef`](crate::type_def::TypeDef).
use crate::arc_str::ArcStr;
use egp_common::ValidationResult;

/// Module path, symbol name, and optional alias of one import. Ordered by
/// `(module, symbol, alias)` so a `Vec<ImportDef>` can be deduplicated with
/// `sort` + `dedup` the way `TypeDef::imports` is built.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct ImportDef {
    pub module: ArcStr,
    pub symbol: ArcStr,
    pub alias: Option<ArcStr>,
}

impl ImportDef {
    pub fn new(
        module: impl Into<ArcStr>,
        symbol: impl Into<ArcStr>,
        alias: Option<ArcStr>,
    ) -> ValidationResult<Self> {
        let module = module.into();
        let symbol = symbol.into();
        egp_common::is_printable_string("module", &module)?;
        egp_common::is_printable_string("symbol", &symbol)?;
        if let Some(a) = &alias {
            egp_common::is_printable_string("alias", a)?;
        }
        Ok(ImportDef {
            module,
            symbol,
            alias,
        })
    }
}

/// Sorts and removes duplicate imports in place, matching the "deduplicated"
/// clause of `TypeDef::imports`.
pub fn dedup_imports(imports: &mut Vec<ImportDef>) {
    imports.sort();
    imports.dedup();
}
