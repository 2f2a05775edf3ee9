//! Return-type resolution.
//!
//! A post-pass over every function and method signature, then over every
//! `call`-kind argument in the graph. Named types resolve through the
//! package's type map (alias chains followed, composites formatted with
//! their resolved component); anything unknown stays as written.

use srcgraph_core::constants::is_primitive;
use srcgraph_core::types::EMPTY_ID;
use tracing::debug;

use crate::metadata::{ArgKind, CallArgument, Metadata, TypeKind};

const MAX_RESOLVE_DEPTH: usize = 8;

/// Fill `resolved_type` on every signature and every call-kind argument.
pub fn resolve_return_types(meta: &mut Metadata) {
    // Signatures first, collected immutably then applied.
    let mut fn_updates: Vec<(String, String, usize, String)> = Vec::new();
    let mut method_updates: Vec<(String, String, usize, String)> = Vec::new();
    for (pkg_path, pkg) in &meta.packages {
        for (file_path, file) in &pkg.files {
            for (i, function) in file.functions.iter().enumerate() {
                let resolved = resolve_signature(meta, pkg_path, &function.signature);
                if !resolved.is_empty() {
                    fn_updates.push((pkg_path.clone(), file_path.clone(), i, resolved));
                }
            }
        }
        for (type_name, typ) in &pkg.types {
            for (i, method) in typ.methods.iter().enumerate() {
                let resolved = resolve_signature(meta, pkg_path, &method.signature);
                if !resolved.is_empty() {
                    method_updates.push((pkg_path.clone(), type_name.clone(), i, resolved));
                }
            }
        }
    }
    for (pkg_path, file_path, i, resolved) in fn_updates {
        let id = meta.intern(&resolved);
        if let Some(function) = meta
            .packages
            .get_mut(&pkg_path)
            .and_then(|p| p.files.get_mut(&file_path))
            .and_then(|f| f.functions.get_mut(i))
        {
            function.signature.resolved_type = id;
        }
    }
    for (pkg_path, type_name, i, resolved) in method_updates {
        let id = meta.intern(&resolved);
        if let Some(method) = meta
            .packages
            .get_mut(&pkg_path)
            .and_then(|p| p.types.get_mut(&type_name))
            .and_then(|t| t.methods.get_mut(i))
        {
            method.signature.resolved_type = id;
        }
    }

    // Then every call-kind argument copies its target's resolved type.
    let mut arg_updates: Vec<(usize, usize, i32)> = Vec::new();
    for (ei, edge) in meta.call_graph.iter().enumerate() {
        for (ai, arg) in edge.args.iter().enumerate() {
            if arg.kind != ArgKind::Call {
                continue;
            }
            let pkg = meta.lookup(arg.pkg).to_string();
            let name = meta.lookup(arg.name).to_string();
            if name.is_empty() {
                continue;
            }
            let resolved = target_resolved_type(meta, &pkg, &name);
            if resolved != EMPTY_ID {
                arg_updates.push((ei, ai, resolved));
            }
        }
    }
    let count = arg_updates.len();
    for (ei, ai, resolved) in arg_updates {
        let arg = &mut meta.call_graph[ei].args[ai];
        arg.resolved_type = resolved;
        if let Some(fun) = arg.fun.as_deref_mut() {
            fun.resolved_type = resolved;
        }
    }
    debug!(call_args = count, "return types resolved");
}

/// The resolved type of a function or method found by `(pkg, name)`;
/// methods are matched by name alone within the package's types.
fn target_resolved_type(meta: &Metadata, pkg: &str, name: &str) -> i32 {
    if let Some(f) = meta.find_function(pkg, name) {
        return f.signature.resolved_type;
    }
    meta.find_method(pkg, name)
        .map(|m| m.signature.resolved_type)
        .unwrap_or(EMPTY_ID)
}

/// Resolve a signature's first result.
fn resolve_signature(meta: &Metadata, pkg: &str, signature: &CallArgument) -> String {
    let Some(results) = signature.fun.as_deref() else {
        return String::new();
    };
    let Some(first) = results.args.first() else {
        return String::new();
    };
    resolve_result_node(meta, pkg, first)
}

fn resolve_result_node(meta: &Metadata, pkg: &str, node: &CallArgument) -> String {
    match node.kind {
        ArgKind::Field => resolve_type_str(meta, pkg, meta.lookup(node.typ), 0),
        ArgKind::Ident => resolve_type_str(meta, pkg, meta.lookup(node.name), 0),
        ArgKind::Star => node
            .x
            .as_deref()
            .map(|x| format!("*{}", resolve_result_node(meta, pkg, x)))
            .unwrap_or_default(),
        ArgKind::Selector => node.canonical_string(&meta.pool),
        _ => resolve_type_str(meta, pkg, &node.canonical_string(&meta.pool), 0),
    }
}

/// Resolve a type string: follow alias chains through the package types,
/// formatting pointer/slice/array/map/channel shells around the resolved
/// component.
fn resolve_type_str(meta: &Metadata, pkg: &str, s: &str, depth: usize) -> String {
    if s.is_empty() || depth > MAX_RESOLVE_DEPTH || is_primitive(s) {
        return s.to_string();
    }
    if let Some(rest) = s.strip_prefix('*') {
        return format!("*{}", resolve_type_str(meta, pkg, rest, depth + 1));
    }
    if let Some(rest) = s.strip_prefix("[]") {
        return format!("[]{}", resolve_type_str(meta, pkg, rest, depth + 1));
    }
    if let Some(rest) = s.strip_prefix("chan ") {
        return format!("chan {}", resolve_type_str(meta, pkg, rest, depth + 1));
    }
    if let Some(rest) = s.strip_prefix("map[") {
        if let Some(close) = rest.find(']') {
            let key = &rest[..close];
            let value = &rest[close + 1..];
            return format!(
                "map[{}]{}",
                key,
                resolve_type_str(meta, pkg, value, depth + 1)
            );
        }
        return s.to_string();
    }
    if let Some(open) = s.strip_prefix('[') {
        // Fixed-size array: `[N]T`.
        if let Some(close) = open.find(']') {
            let len = &open[..close];
            let elt = &open[close + 1..];
            return format!("[{}]{}", len, resolve_type_str(meta, pkg, elt, depth + 1));
        }
    }

    match meta.find_type(pkg, s) {
        Some(typ) if typ.kind == TypeKind::Alias => {
            let target = meta.lookup(typ.target).to_string();
            resolve_type_str(meta, pkg, &target, depth + 1)
        }
        Some(_) => s.to_string(),
        None => {
            // A result named after a function chains through that
            // function's own resolved return.
            if let Some(f) = meta.find_function(pkg, s) {
                let resolved = meta.lookup(f.signature.resolved_type);
                if !resolved.is_empty() {
                    return resolved.to_string();
                }
            }
            s.to_string()
        }
    }
}
