//! The root metadata container.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use srcgraph_core::types::collections::FxHashMap;
use srcgraph_core::types::StringPool;

use super::edge::CallGraphEdge;
use super::entities::{Function, Method, Package, Type};

/// Derived, rebuildable index maps over the call graph, keyed by BaseID.
#[derive(Debug, Default)]
pub struct GraphIndexes {
    /// caller BaseID → indexes of edges with that caller.
    pub callers: FxHashMap<String, Vec<u32>>,
    /// callee BaseID → indexes of edges with that callee.
    pub callees: FxHashMap<String, Vec<u32>>,
    /// stripped argument id → indexes of edges carrying it.
    pub args: FxHashMap<String, Vec<u32>>,
    /// parent-function BaseID → edges whose caller is a function literal
    /// inside it.
    pub parent_functions: FxHashMap<String, Vec<u32>>,
}

impl GraphIndexes {
    pub fn clear(&mut self) {
        self.callers.clear();
        self.callees.clear();
        self.args.clear();
        self.parent_functions.clear();
    }
}

/// Result of a variable-origin trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceOrigin {
    pub var: String,
    pub pkg: String,
    pub typ: Option<String>,
    pub caller: String,
}

/// Memoization caches. Writes are gated: nothing is cached until the
/// pipeline reports all packages registered, so partially-built state is
/// never memoized.
#[derive(Debug, Default)]
pub struct Caches {
    enabled: AtomicBool,
    pub(crate) origin: RwLock<FxHashMap<String, TraceOrigin>>,
    pub(crate) method_lookup: RwLock<FxHashMap<String, Option<(String, usize)>>>,
    pub(crate) iface: RwLock<FxHashMap<String, bool>>,
    pub(crate) depth: RwLock<FxHashMap<String, Option<u32>>>,
}

impl Caches {
    /// Allow cache writes from now on.
    pub fn enable(&self) {
        self.enabled.store(true, Ordering::Release);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }
}

/// The Program Metadata Graph root: the string pool, the packages, and
/// the call graph, plus derived indexes and gated caches.
#[derive(Debug, Default)]
pub struct Metadata {
    pub pool: StringPool,
    pub packages: BTreeMap<String, Package>,
    pub call_graph: Vec<CallGraphEdge>,
    pub indexes: GraphIndexes,
    pub caches: Caches,
}

impl PartialEq for Metadata {
    fn eq(&self, other: &Self) -> bool {
        self.pool == other.pool
            && self.packages == other.packages
            && self.call_graph == other.call_graph
    }
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a string into the owned pool.
    pub fn intern(&self, s: &str) -> i32 {
        self.pool.intern(s)
    }

    /// Resolve an interned id.
    pub fn lookup(&self, id: i32) -> &str {
        self.pool.lookup(id)
    }

    /// The package registered under `pkg_path`.
    pub fn package(&self, pkg_path: &str) -> Option<&Package> {
        self.packages.get(pkg_path)
    }

    /// Find a named type in a package.
    pub fn find_type(&self, pkg_path: &str, name: &str) -> Option<&Type> {
        self.packages.get(pkg_path)?.types.get(name)
    }

    /// Find a top-level function by package path and name.
    pub fn find_function(&self, pkg_path: &str, name: &str) -> Option<&Function> {
        let pkg = self.packages.get(pkg_path)?;
        let name_id = self.pool.get(name)?;
        pkg.files
            .values()
            .flat_map(|f| f.functions.iter())
            .find(|f| f.name == name_id)
    }

    /// Find a method by name alone within a package's types, consulting
    /// the gated lookup cache.
    pub fn find_method(&self, pkg_path: &str, name: &str) -> Option<&Method> {
        let key = format!("{pkg_path}.{name}");
        if self.caches.is_enabled() {
            let cached = self
                .caches
                .method_lookup
                .read()
                .ok()
                .and_then(|cache| cache.get(&key).cloned());
            if let Some(loc) = cached {
                let (type_name, idx) = loc?;
                return self
                    .packages
                    .get(pkg_path)?
                    .types
                    .get(&type_name)?
                    .methods
                    .get(idx);
            }
        }

        let pkg = self.packages.get(pkg_path)?;
        let name_id = self.pool.get(name)?;
        let mut found: Option<(String, usize)> = None;
        'outer: for (type_name, typ) in &pkg.types {
            for (idx, method) in typ.methods.iter().enumerate() {
                if method.name == name_id {
                    found = Some((type_name.clone(), idx));
                    break 'outer;
                }
            }
        }

        if self.caches.is_enabled() {
            if let Ok(mut cache) = self.caches.method_lookup.write() {
                cache.insert(key, found.clone());
            }
        }

        let (type_name, idx) = found?;
        self.packages
            .get(pkg_path)?
            .types
            .get(&type_name)?
            .methods
            .get(idx)
    }

    /// Whether the named type lists `iface_full` (a `pkg.Name` id) among
    /// the interfaces it implements. Memoized once caches unlock.
    pub fn implements_interface(
        &self,
        pkg_path: &str,
        type_name: &str,
        iface_full: &str,
    ) -> bool {
        let key = format!("{pkg_path}.{type_name}:{iface_full}");
        if self.caches.is_enabled() {
            let cached = self
                .caches
                .iface
                .read()
                .ok()
                .and_then(|cache| cache.get(&key).copied());
            if let Some(hit) = cached {
                return hit;
            }
        }

        let result = self
            .find_type(pkg_path, type_name)
            .zip(self.pool.get(iface_full))
            .is_some_and(|(typ, id)| typ.implements.contains(&id));

        if self.caches.is_enabled() {
            if let Ok(mut cache) = self.caches.iface.write() {
                cache.insert(key, result);
            }
        }
        result
    }

    /// Edges whose caller has the given BaseID.
    pub fn edges_by_caller(&self, base_id: &str) -> impl Iterator<Item = &CallGraphEdge> {
        self.indexes
            .callers
            .get(base_id)
            .into_iter()
            .flatten()
            .map(move |&i| &self.call_graph[i as usize])
    }

    /// Edges whose callee has the given BaseID.
    pub fn edges_by_callee(&self, base_id: &str) -> impl Iterator<Item = &CallGraphEdge> {
        self.indexes
            .callees
            .get(base_id)
            .into_iter()
            .flatten()
            .map(move |&i| &self.call_graph[i as usize])
    }
}
