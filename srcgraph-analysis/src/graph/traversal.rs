//! Root discovery, reachability, depth, and caller-children traversal.

use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};

use srcgraph_core::constants::{ENTRY_FUNCTION, MAX_SELF_CALLING_DEPTH};
use srcgraph_core::types::collections::{FxHashMap, FxHashSet};

use crate::metadata::{CallGraphEdge, Metadata};

/// Edges whose caller is a root: its BaseID appears in neither `callees`
/// nor `args` — or it is the entry function, which is always a root.
pub fn roots(meta: &Metadata) -> Vec<u32> {
    let mut out = Vec::new();
    for (i, edge) in meta.call_graph.iter().enumerate() {
        let caller_base = edge.caller_base_id(&meta.pool);
        let is_entry = meta.lookup(edge.caller.name) == ENTRY_FUNCTION;
        let unreferenced = !meta.indexes.callees.contains_key(caller_base)
            && !meta.indexes.args.contains_key(caller_base);
        if is_entry || unreferenced {
            out.push(i as u32);
        }
    }
    out
}

/// A petgraph projection of the call graph over BaseIDs, for path and
/// reachability queries.
pub struct GraphView {
    graph: DiGraph<String, u32>,
    nodes: FxHashMap<String, NodeIndex>,
}

impl GraphView {
    /// Project the current call graph. Rebuild after appending edges.
    pub fn build(meta: &Metadata) -> Self {
        let mut graph = DiGraph::new();
        let mut nodes: FxHashMap<String, NodeIndex> = FxHashMap::default();
        let mut node_of = |graph: &mut DiGraph<String, u32>, id: &str| {
            if let Some(&idx) = nodes.get(id) {
                return idx;
            }
            let idx = graph.add_node(id.to_string());
            nodes.insert(id.to_string(), idx);
            idx
        };
        for (i, edge) in meta.call_graph.iter().enumerate() {
            let caller = edge.caller_base_id(&meta.pool).to_string();
            let callee = edge.callee_base_id(&meta.pool).to_string();
            let a = node_of(&mut graph, &caller);
            let b = node_of(&mut graph, &callee);
            graph.add_edge(a, b, i as u32);
        }
        Self { graph, nodes }
    }

    /// Whether `to` is transitively callable from `from`.
    pub fn reachable(&self, from: &str, to: &str) -> bool {
        let (Some(&a), Some(&b)) = (self.nodes.get(from), self.nodes.get(to)) else {
            return false;
        };
        has_path_connecting(&self.graph, a, b, None)
    }

    /// A call path from `from` to `to` as BaseIDs, if one exists.
    pub fn path(&self, from: &str, to: &str) -> Option<Vec<String>> {
        let (Some(&start), Some(&goal)) = (self.nodes.get(from), self.nodes.get(to)) else {
            return None;
        };
        let mut visited: FxHashSet<NodeIndex> = FxHashSet::default();
        let mut trail: Vec<NodeIndex> = Vec::new();
        if self.dfs(start, goal, &mut visited, &mut trail) {
            return Some(trail.iter().map(|&n| self.graph[n].clone()).collect());
        }
        None
    }

    fn dfs(
        &self,
        current: NodeIndex,
        goal: NodeIndex,
        visited: &mut FxHashSet<NodeIndex>,
        trail: &mut Vec<NodeIndex>,
    ) -> bool {
        if !visited.insert(current) {
            return false;
        }
        trail.push(current);
        if current == goal {
            return true;
        }
        for next in self.graph.neighbors(current) {
            if self.dfs(next, goal, visited, trail) {
                return true;
            }
        }
        trail.pop();
        false
    }
}

/// Whether `to` is transitively callable from `from`.
pub fn reachable(meta: &Metadata, from: &str, to: &str) -> bool {
    GraphView::build(meta).reachable(from, to)
}

/// A call path from `from` to `to`, if one exists.
pub fn path(meta: &Metadata, from: &str, to: &str) -> Option<Vec<String>> {
    GraphView::build(meta).path(from, to)
}

/// Distance from a function to the nearest root, following callee links
/// upward. Memoized.
pub fn call_depth(meta: &Metadata, base_id: &str) -> Option<u32> {
    if meta.caches.is_enabled() {
        let cached = meta
            .caches
            .depth
            .read()
            .ok()
            .and_then(|cache| cache.get(base_id).copied());
        if let Some(depth) = cached {
            return depth;
        }
    }

    let root_callers: FxHashSet<String> = roots(meta)
        .into_iter()
        .map(|i| {
            meta.call_graph[i as usize]
                .caller_base_id(&meta.pool)
                .to_string()
        })
        .collect();
    let mut visited = FxHashSet::default();
    let depth = depth_to_root(meta, base_id, &root_callers, &mut visited);

    if meta.caches.is_enabled() {
        if let Ok(mut cache) = meta.caches.depth.write() {
            cache.insert(base_id.to_string(), depth);
        }
    }
    depth
}

fn depth_to_root(
    meta: &Metadata,
    base_id: &str,
    root_callers: &FxHashSet<String>,
    visited: &mut FxHashSet<String>,
) -> Option<u32> {
    if root_callers.contains(base_id) {
        return Some(0);
    }
    if !visited.insert(base_id.to_string()) {
        return None;
    }
    let mut best: Option<u32> = None;
    for &idx in meta.indexes.callees.get(base_id).into_iter().flatten() {
        let caller = meta.call_graph[idx as usize].caller_base_id(&meta.pool);
        if let Some(up) = depth_to_root(meta, caller, root_callers, visited) {
            let candidate = up + 1;
            best = Some(best.map_or(candidate, |b| b.min(candidate)));
        }
    }
    visited.remove(base_id);
    best
}

/// Visit every transitive callee of `edge.callee`, cycle-safe. The
/// visited set is unset on the way out so DAG-shaped revisits through
/// other branches still happen; immediate self-recursion is capped.
pub fn traverse_caller_children<F>(meta: &Metadata, edge: &CallGraphEdge, visit: &mut F)
where
    F: FnMut(&CallGraphEdge),
{
    let mut visited: FxHashSet<u32> = FxHashSet::default();
    children_of(meta, edge, visit, &mut visited, 0);
}

fn children_of<F>(
    meta: &Metadata,
    edge: &CallGraphEdge,
    visit: &mut F,
    visited: &mut FxHashSet<u32>,
    self_depth: usize,
) where
    F: FnMut(&CallGraphEdge),
{
    let callee_base = edge.callee_base_id(&meta.pool).to_string();
    let child_idxs: Vec<u32> = meta
        .indexes
        .callers
        .get(&callee_base)
        .cloned()
        .unwrap_or_default();
    for idx in child_idxs {
        if visited.contains(&idx) {
            continue;
        }
        let child = &meta.call_graph[idx as usize];
        let self_call = child.caller_base_id(&meta.pool) == child.callee_base_id(&meta.pool);
        if self_call && self_depth >= MAX_SELF_CALLING_DEPTH {
            continue;
        }
        visit(child);
        visited.insert(idx);
        let next_depth = if self_call { self_depth + 1 } else { 0 };
        children_of(meta, child, visit, visited, next_depth);
        visited.remove(&idx);
    }
}
