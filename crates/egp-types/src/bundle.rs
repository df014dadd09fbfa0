//! Loading a persisted, signed types bundle into a [`TypeRegistry`].
use std::collections::BTreeMap;
use std::path::Path;

use egp_sign::SignatureService;

use crate::arc_str::ArcStr;
use crate::import_def::ImportDef;
use crate::registry::TypeRegistry;
use crate::type_def::TypeDef;
use crate::uid::BitfieldUid;

/// One entry of a persisted types bundle: the same fields as [`TypeDef`],
/// but with `parents` given by name (resolved to UIDs at load time) instead
/// of by UID, since a bundle is meant to be hand-editable.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct BundleEntry {
    pub uid: i32,
    pub depth: u32,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub imports: Vec<BundleImport>,
    #[serde(default)]
    pub parents: Vec<String>,
    /// Marks a template (parametric) type: on load, `fx=1..7` effect-index
    /// variants are synthesised as child types if not already present.
    #[serde(default)]
    pub template: bool,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct BundleImport {
    pub module: String,
    pub symbol: String,
    #[serde(default)]
    pub alias: Option<String>,
}

/// A full bundle: type name → entry.
pub type TypesBundle = BTreeMap<String, BundleEntry>;

/// The bounded `(x, y)` grid over which output wildcard meta-types
/// (`egp_wc_<x>_<y>`) are synthesised. The source material does
/// not pin an exact enumeration bound here; a small representative grid is
/// synthesised instead of the full 6-bit/4-bit address space, documented as
/// an explicit open-question resolution rather than an oversight.
const WILDCARD_GRID: u8 = 4;

/// Loads `path` as a signed-JSON types bundle, skipping the reload if its
/// SHA-256 is already recorded in `registry`'s ingested-sources table.
///
/// Returns the number of newly inserted `TypeDef`s (bundle entries plus any
/// synthesised template/wildcard variants), or `0` if the bundle was
/// already ingested.
pub fn load_bundle(
    path: &Path,
    public_key_pem: &str,
    registry: &TypeRegistry,
    signer: &SignatureService,
) -> egp_error::Result<usize> {
    let file_hash = signer.sha256_file(path)?;
    if registry.source_already_ingested(&file_hash) {
        return Ok(0);
    }

    let bundle: TypesBundle = signer.read_signed_json(path, public_key_pem)?;

    let mut inserted = ingest_bundle(&bundle, registry)?;
    inserted += synthesize_wildcard_types(registry);
    registry.mark_source_ingested(file_hash);
    Ok(inserted)
}

/// Parses and inserts `bundle` into `registry` without touching the
/// ingested-sources table, split out from [`load_bundle`] so callers that
/// already have bundle bytes in hand (tests, alternate transports) can
/// reuse the resolution logic.
pub fn ingest_bundle(bundle: &TypesBundle, registry: &TypeRegistry) -> egp_error::Result<usize> {
    let name_to_uid: BTreeMap<&str, i32> = bundle
        .iter()
        .map(|(name, entry)| (name.as_str(), entry.uid))
        .collect();

    let mut by_depth: Vec<(&String, &BundleEntry)> = bundle.iter().collect();
    by_depth.sort_by_key(|(_, entry)| entry.depth);

    let mut inserted = 0usize;
    for (name, entry) in by_depth {
        if registry.contains(entry.uid) {
            continue;
        }
        let parents = resolve_parents(&entry.parents, &name_to_uid, registry)?;
        let imports = entry
            .imports
            .iter()
            .map(|i| {
                ImportDef::new(
                    i.module.as_str(),
                    i.symbol.as_str(),
                    i.alias.as_deref().map(ArcStr::from),
                )
            })
            .collect::<egp_common::ValidationResult<Vec<_>>>()?;

        let td = TypeDef::new(
            name.as_str(),
            entry.uid,
            entry.depth,
            entry.is_abstract,
            entry.default.as_deref().map(ArcStr::from),
            imports,
            parents,
        )?;
        registry.insert(td)?;
        inserted += 1;

        if entry.template {
            inserted += synthesize_template_variants(name, entry, registry)?;
        }
    }
    Ok(inserted)
}

fn resolve_parents(
    names: &[String],
    name_to_uid: &BTreeMap<&str, i32>,
    registry: &TypeRegistry,
) -> egp_error::Result<Vec<i32>> {
    names
        .iter()
        .map(|name| {
            if let Some(uid) = name_to_uid.get(name.as_str()) {
                return Ok(*uid);
            }
            Ok(registry.get(name.as_str())?.uid)
        })
        .collect()
}

/// Synthesises `fx=1..7` effect-index children of a template type, named `<type>_fx<n>`, skipping any UID already present.
fn synthesize_template_variants(
    base_name: &str,
    entry: &BundleEntry,
    registry: &TypeRegistry,
) -> egp_error::Result<usize> {
    let base = BitfieldUid::decode(entry.uid);
    let mut inserted = 0usize;
    for fx in 1u8..=7 {
        let variant = BitfieldUid {
            tt: base.tt.max(1),
            io: Some(false),
            fx: Some(fx),
            x: None,
            y: None,
            xuid: Some(0),
        };
        let uid = variant.encode();
        if registry.contains(uid) {
            continue;
        }
        let td = TypeDef::new(
            format!("{base_name}_fx{fx}"),
            uid,
            entry.depth + 1,
            false,
            None,
            vec![],
            vec![entry.uid],
        )?;
        registry.insert(td)?;
        inserted += 1;
    }
    Ok(inserted)
}

/// Synthesises `egp_wc_<x>_<y>` output wildcard meta-types over a bounded
/// grid, skipping any already present by name.
fn synthesize_wildcard_types(registry: &TypeRegistry) -> usize {
    let mut inserted = 0usize;
    for x in 0..WILDCARD_GRID {
        for y in 0..WILDCARD_GRID {
            let name = format!("egp_wc_{x}_{y}");
            if registry.contains(name.as_str()) {
                continue;
            }
            let uid = BitfieldUid {
                tt: 1,
                io: Some(true),
                fx: None,
                x: Some(x),
                y: Some(y),
                xuid: None,
            }
            .encode();
            if registry.contains(uid) {
                continue;
            }
            let Ok(td) = TypeDef::new(name, uid, 1, true, None, vec![], vec![]) else {
                continue;
            };
            if registry.insert(td).is_ok() {
                inserted += 1;
            }
        }
    }
    inserted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(uid: i32, depth: u32, parents: &[&str]) -> BundleEntry {
        BundleEntry {
            uid,
            depth,
            is_abstract: depth == 0,
            default: None,
            imports: vec![],
            parents: parents.iter().map(|s| s.to_string()).collect(),
            template: false,
        }
    }

    #[test]
    fn ingest_resolves_parent_names_regardless_of_declaration_order() {
        let mut bundle = TypesBundle::new();
        bundle.insert("dog".to_string(), entry(2, 2, &["animal"]));
        bundle.insert("object".to_string(), entry(0, 0, &[]));
        bundle.insert("animal".to_string(), entry(1, 1, &["object"]));

        let registry = TypeRegistry::default();
        let inserted = ingest_bundle(&bundle, &registry).unwrap();
        assert_eq!(inserted, 3);

        let dog = registry.get("dog").unwrap();
        assert_eq!(dog.parents, vec![1]);
        let anc = registry.ancestors(&dog).unwrap();
        assert!(anc.contains(&0) && anc.contains(&1) && anc.contains(&2));
    }

    #[test]
    fn template_entry_synthesises_seven_fx_variants() {
        let mut bundle = TypesBundle::new();
        let mut object = entry(0, 0, &[]);
        object.template = true;
        bundle.insert("object".to_string(), object);

        let registry = TypeRegistry::default();
        let inserted = ingest_bundle(&bundle, &registry).unwrap();
        assert_eq!(inserted, 1 + 7);
        assert!(registry.contains("object_fx3"));
    }

    #[test]
    fn wildcard_synthesis_is_idempotent() {
        let registry = TypeRegistry::default();
        let first = synthesize_wildcard_types(&registry);
        let second = synthesize_wildcard_types(&registry);
        assert_eq!(first, (WILDCARD_GRID as usize).pow(2));
        assert_eq!(second, 0);
    }
}
