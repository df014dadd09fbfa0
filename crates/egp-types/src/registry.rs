//! Global, hierarchical type registry.
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use egp_error::{CoreError, FatalError, Result};
use lru::LruCache;

use crate::arc_str::ArcStr;
use crate::type_def::TypeDef;

/// Lookup key accepted by [`TypeRegistry::get`] / [`TypeRegistry::contains`].
pub enum TypeKey<'a> {
    Name(&'a str),
    Uid(i32),
}

impl<'a> From<&'a str> for TypeKey<'a> {
    fn from(s: &'a str) -> Self {
        TypeKey::Name(s)
    }
}

impl From<i32> for TypeKey<'static> {
    fn from(uid: i32) -> Self {
        TypeKey::Uid(uid)
    }
}

/// Tunables for a [`TypeRegistry`] instance, taking the place of hardcoded
/// constants in the source.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Capacity of the `ancestors`/`descendants` LRU caches, each keyed by UID.
    pub closure_cache_capacity: usize,
    /// Permits dropping the backing table via [`TypeRegistry::clear`].
    /// Mirrors the source's `dev_profile` gate; off by default so production
    /// callers cannot accidentally wipe the registry.
    pub dev_profile: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        RegistryConfig {
            closure_cache_capacity: 1024,
            dev_profile: false,
        }
    }
}

/// Process-wide, lazily-initialised registry of [`TypeDef`]s.
///
/// Reads (`get`, `ancestors`, `descendants`, `contains`) are lock-free or
/// near-lock-free via [`DashMap`]; writes (`insert`, `next_xuid`) must be
/// externally serialised by the caller — this type does not itself
/// arbitrate concurrent writers.
pub struct TypeRegistry {
    by_uid: DashMap<i32, Arc<TypeDef>>,
    by_name: DashMap<ArcStr, i32>,
    /// File hashes of already-ingested signed bundles, so re-ingestion of an
    /// unchanged bundle is a no-op.
    ingested_sources: DashMap<String, ()>,
    ancestors_cache: Mutex<LruCache<i32, Arc<HashSet<i32>>>>,
    descendants_cache: Mutex<LruCache<i32, Arc<HashSet<i32>>>>,
    /// Highest-allocated XUID offset per template arity, for `next_xuid`.
    xuid_counters: DashMap<u8, u32>,
    config: RegistryConfig,
}

impl TypeRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        let cap = std::num::NonZeroUsize::new(config.closure_cache_capacity.max(1)).unwrap();
        TypeRegistry {
            by_uid: DashMap::new(),
            by_name: DashMap::new(),
            ingested_sources: DashMap::new(),
            ancestors_cache: Mutex::new(LruCache::new(cap)),
            descendants_cache: Mutex::new(LruCache::new(cap)),
            xuid_counters: DashMap::new(),
            config,
        }
    }

    /// Whether `key` (by name or UID) already resolves to a known `TypeDef`.
    pub fn contains<'a>(&self, key: impl Into<TypeKey<'a>>) -> bool {
        match key.into() {
            TypeKey::Uid(uid) => self.by_uid.contains_key(&uid),
            TypeKey::Name(name) => self.by_name.contains_key(name),
        }
    }

    /// Resolves `key` to its `TypeDef`, or `NotFound` (treated as fatal to
    /// the caller).
    pub fn get<'a>(&self, key: impl Into<TypeKey<'a>>) -> Result<Arc<TypeDef>> {
        match key.into() {
            TypeKey::Uid(uid) => self
                .by_uid
                .get(&uid)
                .map(|r| r.clone())
                .ok_or_else(|| CoreError::NotFound {
                    what: "TypeDef",
                    id: uid.to_string(),
                }
                .into()),
            TypeKey::Name(name) => {
                let uid = *self
                    .by_name
                    .get(name)
                    .ok_or_else(|| CoreError::NotFound {
                        what: "TypeDef",
                        id: name.to_string(),
                    })?;
                self.get(uid)
            }
        }
    }

    /// Inserts a `TypeDef` already resolved against its parents (string
    /// parent references having been turned into UIDs by the caller) and
    /// updates the reverse `children` index on each parent.
    pub fn insert(&self, mut td: TypeDef) -> Result<()> {
        if self.by_uid.contains_key(&td.uid) {
            return Err(CoreError::InvariantViolation(format!(
                "duplicate TypeDef uid {}",
                td.uid
            ))
            .into());
        }
        let mut touched_parent = false;
        for &parent_uid in &td.parents.clone() {
            if let Some(mut parent) = self.by_uid.get_mut(&parent_uid) {
                let parent_mut = Arc::make_mut(&mut parent);
                parent_mut.children.push(td.uid);
                touched_parent = true;
            }
        }
        td.children.clear();
        self.by_name.insert(td.name.clone(), td.uid);
        self.by_uid.insert(td.uid, Arc::new(td));
        if touched_parent {
            // A parent's children list just grew, so any cached descendants
            // closure reachable through it is stale.
            self.descendants_cache
                .lock()
                .map_err(|e| FatalError::RegistryPoisoned(e.to_string()))?
                .clear();
        }
        Ok(())
    }

    /// Ancestors of `td`, including `td` itself.
    /// LRU-cached by UID; on miss, computed with an explicit work-stack.
    pub fn ancestors(&self, td: &TypeDef) -> Result<Arc<HashSet<i32>>> {
        self.closure(td.uid, &self.ancestors_cache, |t| t.parents.clone())
    }

    /// Descendants of `td`, including `td` itself.
    pub fn descendants(&self, td: &TypeDef) -> Result<Arc<HashSet<i32>>> {
        self.closure(td.uid, &self.descendants_cache, |t| t.children.clone())
    }

    fn closure(
        &self,
        root_uid: i32,
        cache: &Mutex<LruCache<i32, Arc<HashSet<i32>>>>,
        edges: impl Fn(&TypeDef) -> Vec<i32>,
    ) -> Result<Arc<HashSet<i32>>> {
        if let Some(hit) = cache
            .lock()
            .map_err(|e| FatalError::RegistryPoisoned(e.to_string()))?
            .get(&root_uid)
        {
            return Ok(hit.clone());
        }
        let mut seen = HashSet::new();
        let mut stack = vec![root_uid];
        while let Some(uid) = stack.pop() {
            if !seen.insert(uid) {
                continue;
            }
            let td = self.get(uid)?;
            for next in edges(&td) {
                if !seen.contains(&next) {
                    stack.push(next);
                }
            }
        }
        let result = Arc::new(seen);
        cache
            .lock()
            .map_err(|e| FatalError::RegistryPoisoned(e.to_string()))?
            .put(root_uid, result.clone());
        Ok(result)
    }

    /// Returns a fresh XUID offset within template arity `tt`'s half-space,
    /// `(max_existing & 0xFFFF) + 1`, failing with `UidExhausted` at
    /// saturation.
    pub fn next_xuid(&self, tt: u8) -> Result<u16> {
        let mut counter = self.xuid_counters.entry(tt).or_insert(0);
        let next = (*counter & 0xFFFF) + 1;
        if next > 0xFFFF {
            return Err(FatalError::UidExhausted { tt, io: 0, fx: 0 }.into());
        }
        *counter = next;
        Ok(next as u16)
    }

    /// Records a bundle's SHA-256 digest as ingested, returning `true` if it
    /// was not already known.
    pub fn mark_source_ingested(&self, hash_hex: impl Into<String>) -> bool {
        self.ingested_sources.insert(hash_hex.into(), ()).is_none()
    }

    pub fn source_already_ingested(&self, hash_hex: &str) -> bool {
        self.ingested_sources.contains_key(hash_hex)
    }

    /// Permitted only under [`RegistryConfig::dev_profile`]; wipes every
    /// table and cache.
    pub fn clear(&self) -> Result<()> {
        if !self.config.dev_profile {
            return Err(CoreError::InvariantViolation(
                "TypeRegistry::clear requires dev_profile".into(),
            )
            .into());
        }
        self.by_uid.clear();
        self.by_name.clear();
        self.ingested_sources.clear();
        self.xuid_counters.clear();
        self.ancestors_cache
            .lock()
            .map_err(|e| FatalError::RegistryPoisoned(e.to_string()))?
            .clear();
        self.descendants_cache
            .lock()
            .map_err(|e| FatalError::RegistryPoisoned(e.to_string()))?
            .clear();
        Ok(())
    }

    /// A `flowchart TD` Mermaid diagram of `parent --> child` edges, sorted
    /// by the minimum depth of the two endpoints. When
    /// `concrete` is true, abstract types are omitted from both ends.
    pub fn inheritance_chart(&self, concrete: bool) -> String {
        let mut edges: Vec<(u32, String, String)> = Vec::new();
        for entry in self.by_uid.iter() {
            let child = entry.value();
            if concrete && child.is_abstract {
                continue;
            }
            for &parent_uid in &child.parents {
                let Some(parent) = self.by_uid.get(&parent_uid) else {
                    continue;
                };
                if concrete && parent.is_abstract {
                    continue;
                }
                let min_depth = parent.depth.min(child.depth);
                edges.push((min_depth, parent.name.to_string(), child.name.to_string()));
            }
        }
        edges.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)).then_with(|| a.2.cmp(&b.2)));

        let mut out = String::from("flowchart TD\n");
        for (_, parent, child) in edges {
            out.push_str(&format!("    {parent} --> {child}\n"));
        }
        out
    }

    pub fn len(&self) -> usize {
        self.by_uid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_uid.is_empty()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        TypeRegistry::new(RegistryConfig::default())
    }
}
