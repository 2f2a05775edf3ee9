//! Derived index construction over the call graph.

use crate::metadata::{strip_id, Metadata};
use srcgraph_core::types::EMPTY_ID;

/// Rebuild the `callers`/`callees`/`args`/`parent_functions` maps and the
/// edge back-references. Safe to call repeatedly; later passes that
/// append edges re-run it.
pub fn build_indexes(meta: &mut Metadata) {
    let mut rows = Vec::with_capacity(meta.call_graph.len());
    for edge in &meta.call_graph {
        let caller = edge.caller_base_id(&meta.pool).to_string();
        let callee = edge.callee_base_id(&meta.pool).to_string();
        let args: Vec<String> = edge
            .args
            .iter()
            .map(|a| a.id_string(&meta.pool))
            .filter(|s| !s.is_empty())
            .map(|s| strip_id(&s).to_string())
            .collect();
        let parent = if edge.parent_function != EMPTY_ID {
            Some(meta.lookup(edge.parent_function).to_string())
        } else {
            None
        };
        rows.push((caller, callee, args, parent));
    }

    meta.indexes.clear();
    for (i, (caller, callee, args, parent)) in rows.into_iter().enumerate() {
        let idx = i as u32;
        meta.indexes.callers.entry(caller).or_default().push(idx);
        meta.indexes.callees.entry(callee).or_default().push(idx);
        for arg in args {
            meta.indexes.args.entry(arg).or_default().push(idx);
        }
        if let Some(parent) = parent {
            meta.indexes
                .parent_functions
                .entry(parent)
                .or_default()
                .push(idx);
        }
    }

    for (i, edge) in meta.call_graph.iter_mut().enumerate() {
        let idx = i as u32;
        edge.caller.edge = Some(idx);
        edge.callee.edge = Some(idx);
        for arg in &mut edge.args {
            arg.edge = Some(idx);
        }
    }
}
