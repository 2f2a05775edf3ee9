//! Inter-procedural variable-origin tracing.
//!
//! Walks backwards from a variable to the deepest variable it derives
//! from: first up the call graph through parameter→argument bindings,
//! then through the latest local assignment. Cycles return the input
//! unchanged; results are memoized once the graph is fully built.

use srcgraph_core::types::collections::FxHashSet;

use crate::metadata::{ArgKind, Assignment, CallArgument, Metadata, TraceOrigin};

/// Trace the origin of `var` as seen inside `func` of `pkg`.
pub fn trace_variable_origin(meta: &Metadata, var: &str, func: &str, pkg: &str) -> TraceOrigin {
    let mut visited = FxHashSet::default();
    trace_inner(meta, var, func, pkg, &mut visited)
}

fn trace_inner(
    meta: &Metadata,
    var: &str,
    func: &str,
    pkg: &str,
    visited: &mut FxHashSet<String>,
) -> TraceOrigin {
    let key = format!("{pkg}.{func}:{var}");
    if !visited.insert(key.clone()) {
        // Cycle: hand the input back untouched.
        return TraceOrigin {
            var: var.to_string(),
            pkg: pkg.to_string(),
            typ: None,
            caller: func.to_string(),
        };
    }

    if meta.caches.is_enabled() {
        let cached = meta
            .caches
            .origin
            .read()
            .ok()
            .and_then(|cache| cache.get(&key).cloned());
        if let Some(origin) = cached {
            return origin;
        }
    }

    let origin = trace_uncached(meta, var, func, pkg, visited);

    if meta.caches.is_enabled() {
        if let Ok(mut cache) = meta.caches.origin.write() {
            cache.insert(key, origin.clone());
        }
    }
    origin
}

fn trace_uncached(
    meta: &Metadata,
    var: &str,
    func: &str,
    pkg: &str,
    visited: &mut FxHashSet<String>,
) -> TraceOrigin {
    // Parameter-ward: the variable may be a parameter bound at some call
    // site of this function.
    for edge in &meta.call_graph {
        if meta.lookup(edge.callee.name) != func || meta.lookup(edge.callee.pkg) != pkg {
            continue;
        }
        for (param_id, arg) in &edge.param_arg_map {
            if meta.lookup(*param_id) != var {
                continue;
            }
            let caller_func = meta.lookup(edge.caller.name).to_string();
            let caller_pkg = meta.lookup(edge.caller.pkg).to_string();
            let next_var = arg
                .ident_name(&meta.pool)
                .map(String::from)
                .unwrap_or_else(|| arg.canonical_string(&meta.pool));
            return trace_inner(meta, &next_var, &caller_func, &caller_pkg, visited);
        }
        for (tp_id, concrete_id) in &edge.type_param_map {
            if meta.lookup(*tp_id) == var {
                return TraceOrigin {
                    var: var.to_string(),
                    pkg: pkg.to_string(),
                    typ: Some(meta.lookup(*concrete_id).to_string()),
                    caller: func.to_string(),
                };
            }
        }
    }

    // Assignment-ward: the latest assignment inside this function.
    if let Some(assignment) = latest_assignment(meta, var, func, pkg) {
        let value = &assignment.value;
        if value.kind == ArgKind::Ident {
            let alias = meta.lookup(value.name).to_string();
            if !alias.is_empty() && alias != var {
                return trace_inner(meta, &alias, func, pkg, visited);
            }
        } else if assignment.callee_func != srcgraph_core::types::EMPTY_ID {
            let callee_func = meta.lookup(assignment.callee_func).to_string();
            let callee_pkg = meta.lookup(assignment.callee_pkg).to_string();
            let index = assignment.return_index.unwrap_or(0) as usize;
            if let Some(ret) = return_var_of(meta, &callee_pkg, &callee_func, index) {
                if let Some(ident) = unwrap_to_ident(&ret) {
                    let next = meta.lookup(ident.name).to_string();
                    if !next.is_empty() {
                        return trace_inner(meta, &next, &callee_func, &callee_pkg, visited);
                    }
                }
            }
        }
        return TraceOrigin {
            var: var.to_string(),
            pkg: pkg.to_string(),
            typ: Some(value.canonical_string(&meta.pool)),
            caller: func.to_string(),
        };
    }

    TraceOrigin {
        var: var.to_string(),
        pkg: pkg.to_string(),
        typ: None,
        caller: func.to_string(),
    }
}

fn latest_assignment<'m>(
    meta: &'m Metadata,
    var: &str,
    func: &str,
    pkg: &str,
) -> Option<&'m Assignment> {
    let map = if let Some(f) = meta.find_function(pkg, func) {
        &f.assignment_map
    } else {
        &meta.find_method(pkg, func)?.assignment_map
    };
    let var_id = meta.pool.get(var)?;
    map.get(&var_id).and_then(|entries| entries.last())
}

fn return_var_of(
    meta: &Metadata,
    pkg: &str,
    func: &str,
    index: usize,
) -> Option<CallArgument> {
    let vars = if let Some(f) = meta.find_function(pkg, func) {
        &f.return_vars
    } else {
        &meta.find_method(pkg, func)?.return_vars
    };
    vars.get(index).cloned()
}

/// Unwrap selector/unary/star/paren/composite layers down to an `ident`.
fn unwrap_to_ident(node: &CallArgument) -> Option<&CallArgument> {
    let mut current = node;
    loop {
        match current.kind {
            ArgKind::Ident => return Some(current),
            ArgKind::Selector
            | ArgKind::Unary
            | ArgKind::Star
            | ArgKind::Paren
            | ArgKind::CompositeLit => {
                current = current.x.as_deref()?;
            }
            _ => return None,
        }
    }
}
