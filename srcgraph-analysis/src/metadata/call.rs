//! Call endpoints and the three-identifier scheme.
//!
//! Every call endpoint yields three identifier shapes:
//! - **BaseID** — `pkg.name`, or `pkg.recv.name` for methods, with one
//!   leading `*` stripped after concatenation.
//! - **GenericID** — BaseID plus `[k=v,…]` pairs sorted lexicographically.
//! - **InstanceID** — GenericID plus `@position`.
//!
//! Identifiers are computed lazily and cached per endpoint; clones start
//! with cold caches so propagated edges mint fresh identifiers.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use srcgraph_core::types::StringPool;

use super::entities::Scope;

/// Strip the generic and position suffixes off an identifier, leaving the
/// base form.
pub fn strip_id(id: &str) -> &str {
    let end = id.len();
    let end = end.min(id.find('[').unwrap_or(end));
    let end = end.min(id.find('@').unwrap_or(end));
    &id[..end]
}

/// One endpoint of a call-graph edge.
#[derive(Debug, Serialize, Deserialize)]
pub struct Call {
    pub pkg: i32,
    pub name: i32,
    pub recv_type: i32,
    pub position: i32,
    pub scope: Scope,
    pub signature_str: i32,
    /// Weak back-reference to the owning edge; rebuilt on load.
    #[serde(skip)]
    pub edge: Option<u32>,
    #[serde(skip)]
    ids: IdCache,
}

#[derive(Debug, Default)]
struct IdCache {
    base: OnceLock<String>,
    generic: OnceLock<String>,
    instance: OnceLock<String>,
}

impl Call {
    pub fn new(pkg: i32, name: i32, recv_type: i32, position: i32, scope: Scope) -> Self {
        Self {
            pkg,
            name,
            recv_type,
            position,
            scope,
            signature_str: srcgraph_core::types::EMPTY_ID,
            edge: None,
            ids: IdCache::default(),
        }
    }

    /// BaseID: `pkg.name` or `pkg.recv.name`, one `*` stripped. Cached.
    pub fn base_id(&self, pool: &StringPool) -> &str {
        self.ids
            .base
            .get_or_init(|| base_id_of(pool, self.pkg, self.name, self.recv_type))
    }

    /// GenericID: BaseID plus the sorted `[k=v,…]` suffix. Cached.
    pub fn generic_id(&self, generics: &BTreeMap<i32, i32>, pool: &StringPool) -> &str {
        self.ids
            .generic
            .get_or_init(|| generic_id_of(self.base_id(pool), generics, pool))
    }

    /// InstanceID: GenericID plus `@position`. Cached.
    pub fn instance_id(&self, generics: &BTreeMap<i32, i32>, pool: &StringPool) -> &str {
        self.ids.instance.get_or_init(|| {
            let generic = self.generic_id(generics, pool);
            let pos = pool.lookup(self.position);
            if pos.is_empty() {
                generic.to_string()
            } else {
                format!("{generic}@{pos}")
            }
        })
    }
}

// Data-only clone: identifier caches are never carried over, so a cloned
// endpoint re-derives its identifiers from possibly-updated generics.
impl Clone for Call {
    fn clone(&self) -> Self {
        Self {
            pkg: self.pkg,
            name: self.name,
            recv_type: self.recv_type,
            position: self.position,
            scope: self.scope,
            signature_str: self.signature_str,
            edge: self.edge,
            ids: IdCache::default(),
        }
    }
}

impl PartialEq for Call {
    fn eq(&self, other: &Self) -> bool {
        self.pkg == other.pkg
            && self.name == other.name
            && self.recv_type == other.recv_type
            && self.position == other.position
            && self.scope == other.scope
            && self.signature_str == other.signature_str
    }
}

fn base_id_of(pool: &StringPool, pkg: i32, name: i32, recv_type: i32) -> String {
    let pkg = pool.lookup(pkg);
    let name = pool.lookup(name);
    let recv = pool.lookup(recv_type);
    let id = if recv.is_empty() {
        if pkg.is_empty() {
            name.to_string()
        } else {
            format!("{pkg}.{name}")
        }
    } else if pkg.is_empty() {
        format!("{recv}.{name}")
    } else {
        format!("{pkg}.{recv}.{name}")
    };
    id.replacen('*', "", 1)
}

fn generic_id_of(base: &str, generics: &BTreeMap<i32, i32>, pool: &StringPool) -> String {
    if generics.is_empty() {
        return base.to_string();
    }
    let mut pairs: Vec<(&str, &str)> = generics
        .iter()
        .map(|(k, v)| (pool.lookup(*k), pool.lookup(*v)))
        .collect();
    pairs.sort();
    let joined = pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(",");
    format!("{base}[{joined}]")
}
