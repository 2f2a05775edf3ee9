//! Generic propagation across caller→child chains.
//!
//! A child edge that lacks a type parameter its parent already knows gets
//! cloned with the unioned map. Existing edges are never mutated; clones
//! are appended and the indexes rebuilt.

use srcgraph_core::types::collections::FxHashSet;
use tracing::debug;

use crate::metadata::{CallGraphEdge, Metadata};

use super::index::build_indexes;
use super::traversal::roots;

/// Run the propagation pass, returning how many edges were cloned.
pub fn propagate_generics(meta: &mut Metadata) -> usize {
    let mut clones: Vec<CallGraphEdge> = Vec::new();
    let mut visited: FxHashSet<u32> = FxHashSet::default();
    let mut stack: Vec<u32> = roots(meta);

    while let Some(idx) = stack.pop() {
        if !visited.insert(idx) {
            continue;
        }
        let parent = &meta.call_graph[idx as usize];
        let parent_map = parent.type_param_map.clone();
        let callee_base = parent.callee_base_id(&meta.pool).to_string();
        let child_idxs: Vec<u32> = meta
            .indexes
            .callers
            .get(&callee_base)
            .cloned()
            .unwrap_or_default();

        for child_idx in child_idxs {
            let child = &meta.call_graph[child_idx as usize];
            if !parent_map.is_empty() && !child.type_param_map.is_empty() {
                let missing = parent_map
                    .keys()
                    .any(|k| !child.type_param_map.contains_key(k));
                if missing {
                    // Union with the child winning conflicts; the clone's
                    // identifier caches start cold.
                    let mut clone = child.clone();
                    let mut unioned = parent_map.clone();
                    unioned.extend(child.type_param_map.iter().map(|(k, v)| (*k, *v)));
                    clone.type_param_map = unioned;
                    clones.push(clone);
                }
            }
            stack.push(child_idx);
        }
    }

    let count = clones.len();
    if count > 0 {
        debug!(clones = count, "generic propagation appended edges");
        meta.call_graph.extend(clones);
    }
    build_indexes(meta);
    count
}
