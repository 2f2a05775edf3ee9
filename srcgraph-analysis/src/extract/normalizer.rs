//! Expression normalization into the uniform `CallArgument` tree.
//!
//! Every syntactic expression maps to exactly one kind. Anything the
//! normalizer cannot classify degrades to a `raw` node — extraction never
//! aborts on a strange expression.

use std::collections::BTreeMap;

use srcgraph_core::constants;
use srcgraph_core::types::EMPTY_ID;

use crate::ast::{Expr, ExprKind, FieldDecl, NodeId};
use crate::metadata::{ArgKind, CallArgument, Metadata};
use crate::typing::ObjectKind;

use super::FileCtx;

/// Identity of a call's target, as far as it can be resolved.
#[derive(Debug, Clone, Default)]
pub(crate) struct CalleeIdent {
    pub pkg: String,
    pub name: String,
    /// Receiver type with pointer form preserved (`*Router`).
    pub recv_type: String,
    /// Receiver variable name when the base is a plain variable.
    pub recv_var: String,
}

/// Strip `pkg.`-prefixes from a checker type string.
pub(crate) fn strip_pkg_prefix(type_str: &str, pkg: &str) -> String {
    if pkg.is_empty() {
        return type_str.to_string();
    }
    type_str.replace(&format!("{pkg}."), "")
}

/// Split a checker type string into (defining package, local type name),
/// keeping a leading `*` on the name.
pub(crate) fn split_pkg_type(type_str: &str, default_pkg: &str) -> (String, String) {
    let (star, rest) = match type_str.strip_prefix('*') {
        Some(rest) => ("*", rest),
        None => ("", type_str),
    };
    // Drop instantiation brackets: `Repo[T]` names the type `Repo`.
    let rest = rest.split('[').next().unwrap_or(rest);
    match rest.rsplit_once('.') {
        Some((pkg, name)) => (pkg.to_string(), format!("{star}{name}")),
        None => (default_pkg.to_string(), format!("{star}{rest}")),
    }
}

/// Normalize one expression into a `CallArgument` node.
pub(crate) fn normalize_expr(meta: &Metadata, ctx: &FileCtx, expr: &Expr) -> CallArgument {
    let pos = ctx.pos_id(meta, expr.pos);
    let mut node = match &expr.kind {
        ExprKind::Ident { name } => normalize_ident(meta, ctx, expr, name),
        ExprKind::BasicLit { value, .. } => {
            let mut node = CallArgument::new(ArgKind::Literal);
            node.value = meta.intern(value);
            node
        }
        ExprKind::Selector { x, sel } => {
            let mut node = CallArgument::new(ArgKind::Selector);
            node.x = Some(Box::new(normalize_expr(meta, ctx, x)));
            let sel_node = normalize_expr(meta, ctx, sel);
            node.name = sel_node.name;
            node.pkg = sel_node.pkg;
            node.sel = Some(Box::new(sel_node));
            node
        }
        ExprKind::Call { fun, args, .. } => normalize_call(meta, ctx, expr, fun, args),
        ExprKind::Unary { op, x } => {
            let mut node = CallArgument::new(ArgKind::Unary);
            node.value = meta.intern(op);
            node.x = Some(Box::new(normalize_expr(meta, ctx, x)));
            node
        }
        ExprKind::Binary { op, x, y } => {
            let mut node = CallArgument::new(ArgKind::Binary);
            node.value = meta.intern(op);
            node.x = Some(Box::new(normalize_expr(meta, ctx, x)));
            node.fun = Some(Box::new(normalize_expr(meta, ctx, y)));
            node
        }
        ExprKind::Star { x } => {
            let mut node = CallArgument::new(ArgKind::Star);
            node.x = Some(Box::new(normalize_expr(meta, ctx, x)));
            node
        }
        ExprKind::Paren { x } => {
            let mut node = CallArgument::new(ArgKind::Paren);
            node.x = Some(Box::new(normalize_expr(meta, ctx, x)));
            node
        }
        ExprKind::Ellipsis { elt } => {
            let mut node = CallArgument::new(ArgKind::Ellipsis);
            node.x = elt
                .as_ref()
                .map(|e| Box::new(normalize_expr(meta, ctx, e)));
            node
        }
        ExprKind::CompositeLit { typ, elts } => {
            let mut node = CallArgument::new(ArgKind::CompositeLit);
            node.x = typ
                .as_ref()
                .map(|t| Box::new(normalize_expr(meta, ctx, t)));
            node.args = elts.iter().map(|e| normalize_expr(meta, ctx, e)).collect();
            if let Some(t) = ctx.type_of(expr.id) {
                node.typ = meta.intern(&strip_pkg_prefix(t, ctx.pkg_path));
            }
            node
        }
        ExprKind::Index { x, index } => {
            let mut node = CallArgument::new(ArgKind::Index);
            node.x = Some(Box::new(normalize_expr(meta, ctx, x)));
            node.fun = Some(Box::new(normalize_expr(meta, ctx, index)));
            node
        }
        ExprKind::IndexList { x, indices } => {
            let mut node = CallArgument::new(ArgKind::IndexList);
            node.x = Some(Box::new(normalize_expr(meta, ctx, x)));
            node.args = indices
                .iter()
                .map(|e| normalize_expr(meta, ctx, e))
                .collect();
            node
        }
        ExprKind::Slice { x, low, high, max } => {
            let mut node = CallArgument::new(ArgKind::Slice);
            node.x = Some(Box::new(normalize_expr(meta, ctx, x)));
            node.args = [low, high, max]
                .into_iter()
                .flatten()
                .map(|e| normalize_expr(meta, ctx, e))
                .collect();
            node
        }
        ExprKind::KeyValue { key, value } => {
            let mut node = CallArgument::new(ArgKind::KeyValue);
            node.x = Some(Box::new(normalize_expr(meta, ctx, key)));
            node.fun = Some(Box::new(normalize_expr(meta, ctx, value)));
            node
        }
        ExprKind::TypeAssert { x, typ } => {
            let mut node = CallArgument::new(ArgKind::TypeAssert);
            node.x = Some(Box::new(normalize_expr(meta, ctx, x)));
            node.fun = typ
                .as_ref()
                .map(|t| Box::new(normalize_expr(meta, ctx, t)));
            node
        }
        ExprKind::ArrayType { len, elt } => {
            let mut node = CallArgument::new(ArgKind::ArrayType);
            node.x = Some(Box::new(normalize_expr(meta, ctx, elt)));
            if let Some(len) = len {
                let len_node = normalize_expr(meta, ctx, len);
                node.value = meta.intern(&len_node.canonical_string(&meta.pool));
            }
            node
        }
        ExprKind::ChanType { dir, value } => {
            let mut node = CallArgument::new(ArgKind::ChanType);
            node.value = meta.intern(dir.as_str());
            node.x = Some(Box::new(normalize_expr(meta, ctx, value)));
            node
        }
        ExprKind::MapType { key, value } => {
            let mut node = CallArgument::new(ArgKind::MapType);
            node.x = Some(Box::new(normalize_expr(meta, ctx, key)));
            node.fun = Some(Box::new(normalize_expr(meta, ctx, value)));
            node
        }
        ExprKind::StructType { fields } => {
            let mut node = CallArgument::new(ArgKind::StructType);
            node.args = struct_fields_to_args(meta, ctx, fields);
            node
        }
        ExprKind::InterfaceType { methods } => {
            let mut node = CallArgument::new(ArgKind::InterfaceType);
            node.args = interface_methods_to_args(meta, ctx, methods);
            node
        }
        ExprKind::FuncType {
            params, results, ..
        } => func_type_node(meta, ctx, params, results),
        ExprKind::FuncLit { typ, body: _ } => {
            let mut node = CallArgument::new(ArgKind::FuncLit);
            node.fun = Some(Box::new(normalize_expr(meta, ctx, typ)));
            node
        }
        ExprKind::Bad => CallArgument::raw(&meta.pool, ""),
    };
    if node.position == EMPTY_ID {
        node.position = pos;
    }
    node
}

fn normalize_ident(meta: &Metadata, ctx: &FileCtx, expr: &Expr, name: &str) -> CallArgument {
    let mut node = CallArgument::new(ArgKind::Ident);
    node.name = meta.intern(name);
    match ctx.object_of(expr.id) {
        Some(obj) if obj.kind == ObjectKind::PkgName => {
            // Imported package object: pkg is the imported path, type empty.
            let path = obj
                .pkg
                .clone()
                .or_else(|| ctx.aliases.get(name).cloned())
                .unwrap_or_default();
            node.pkg = meta.intern(&path);
        }
        Some(obj) => {
            if let Some(pkg) = &obj.pkg {
                node.pkg = meta.intern(pkg);
            }
            if let Some(type_str) = &obj.type_string {
                let stripped = strip_pkg_prefix(type_str, obj.pkg.as_deref().unwrap_or(""));
                node.typ = meta.intern(&stripped);
            }
        }
        None => {
            if let Some(t) = ctx.type_of(expr.id) {
                node.typ = meta.intern(&strip_pkg_prefix(t, ctx.pkg_path));
            }
        }
    }
    if ctx.type_params.iter().any(|p| p == name) {
        node.is_generic_type = true;
        node.generic_type_name = node.name;
    }
    node
}

fn normalize_call(
    meta: &Metadata,
    ctx: &FileCtx,
    expr: &Expr,
    fun: &Expr,
    args: &[Expr],
) -> CallArgument {
    let kind = if is_type_conversion(ctx, fun) {
        ArgKind::TypeConversion
    } else {
        ArgKind::Call
    };
    let mut node = CallArgument::new(kind);
    node.fun = Some(Box::new(normalize_expr(meta, ctx, fun)));
    node.args = args.iter().map(|a| normalize_expr(meta, ctx, a)).collect();
    if let Some(t) = ctx.type_of(expr.id) {
        node.typ = meta.intern(&strip_pkg_prefix(t, ctx.pkg_path));
    }
    if kind == ArgKind::Call {
        if let Some(callee) = resolve_callee(ctx, fun) {
            node.pkg = meta.intern(&callee.pkg);
            node.name = meta.intern(&callee.name);
            node.param_arg_map = bind_params(meta, &callee.pkg, &callee.name, &node.args);
            node.type_param_map =
                extract_type_params(meta, ctx, fun, &node.args, &callee.pkg, &callee.name);
        }
    }
    node
}

/// `T(x)` where `T` is a type name or a type expression is a conversion,
/// not a call.
pub(crate) fn is_type_conversion(ctx: &FileCtx, fun: &Expr) -> bool {
    if fun.is_type_expr() {
        return true;
    }
    match &fun.kind {
        ExprKind::Ident { .. } => {
            matches!(ctx.object_of(fun.id), Some(obj) if obj.kind == ObjectKind::TypeName)
        }
        ExprKind::Selector { sel, .. } => {
            matches!(ctx.object_of(sel.id), Some(obj) if obj.kind == ObjectKind::TypeName)
        }
        ExprKind::Paren { x } | ExprKind::Star { x } => is_type_conversion(ctx, x),
        ExprKind::Index { x, .. } | ExprKind::IndexList { x, .. } => is_type_conversion(ctx, x),
        _ => false,
    }
}

/// Derive the callee identity for a call's function expression.
pub(crate) fn resolve_callee(ctx: &FileCtx, fun: &Expr) -> Option<CalleeIdent> {
    match &fun.kind {
        ExprKind::Ident { name } => {
            let pkg = ctx
                .object_of(fun.id)
                .and_then(|o| o.pkg.clone())
                .unwrap_or_else(|| ctx.pkg_path.to_string());
            Some(CalleeIdent {
                pkg,
                name: name.clone(),
                ..CalleeIdent::default()
            })
        }
        ExprKind::Selector { x, sel } => {
            let name = sel.ident_name()?.to_string();
            let mut callee = CalleeIdent {
                name,
                pkg: ctx.pkg_path.to_string(),
                ..CalleeIdent::default()
            };
            match &x.kind {
                ExprKind::Ident { name: base } => match ctx.object_of(x.id) {
                    Some(obj) if obj.kind == ObjectKind::PkgName => {
                        callee.pkg = obj
                            .pkg
                            .clone()
                            .or_else(|| ctx.aliases.get(base).cloned())
                            .unwrap_or_else(|| ctx.pkg_path.to_string());
                    }
                    Some(obj) if obj.kind == ObjectKind::TypeName => {
                        // Method expression `T.M`.
                        callee.pkg = obj
                            .pkg
                            .clone()
                            .unwrap_or_else(|| ctx.pkg_path.to_string());
                        callee.recv_type = base.clone();
                    }
                    Some(obj) => {
                        let type_str = obj
                            .type_string
                            .as_deref()
                            .or_else(|| ctx.type_of(x.id))
                            .unwrap_or("");
                        let (pkg, recv) = split_pkg_type(type_str, ctx.pkg_path);
                        callee.pkg = pkg;
                        callee.recv_type = recv;
                        callee.recv_var = base.clone();
                    }
                    None => {
                        if let Some(type_str) = ctx.type_of(x.id) {
                            let (pkg, recv) = split_pkg_type(type_str, ctx.pkg_path);
                            callee.pkg = pkg;
                            callee.recv_type = recv;
                        }
                        callee.recv_var = base.clone();
                    }
                },
                _ => {
                    if let Some(type_str) = ctx.type_of(x.id) {
                        let (pkg, recv) = split_pkg_type(type_str, ctx.pkg_path);
                        callee.pkg = pkg;
                        callee.recv_type = recv;
                    }
                }
            }
            Some(callee)
        }
        // Generic instantiation wraps the underlying callee.
        ExprKind::Index { x, .. } | ExprKind::IndexList { x, .. } => resolve_callee(ctx, x),
        ExprKind::Paren { x } | ExprKind::Star { x } => resolve_callee(ctx, x),
        _ => None,
    }
}

/// The typing key of the callee's defining identifier, used for generic
/// instance lookups.
fn callee_key_ident(fun: &Expr) -> Option<NodeId> {
    match &fun.kind {
        ExprKind::Ident { .. } => Some(fun.id),
        ExprKind::Selector { sel, .. } => Some(sel.id),
        ExprKind::Index { x, .. }
        | ExprKind::IndexList { x, .. }
        | ExprKind::Paren { x }
        | ExprKind::Star { x } => callee_key_ident(x),
        _ => None,
    }
}

/// The declared signature of the callee, if it was harvested.
pub(crate) fn callee_signature<'m>(
    meta: &'m Metadata,
    pkg: &str,
    name: &str,
) -> Option<&'m CallArgument> {
    if let Some(f) = meta.find_function(pkg, name) {
        return Some(&f.signature);
    }
    meta.find_method(pkg, name).map(|m| &m.signature)
}

fn callee_type_params(meta: &Metadata, pkg: &str, name: &str) -> Vec<i32> {
    if let Some(f) = meta.find_function(pkg, name) {
        return f.type_params.to_vec();
    }
    meta.find_method(pkg, name)
        .map(|m| m.type_params.to_vec())
        .unwrap_or_default()
}

/// Map declared parameter names to the arguments bound at a call site.
pub(crate) fn bind_params(
    meta: &Metadata,
    pkg: &str,
    name: &str,
    args: &[CallArgument],
) -> BTreeMap<i32, CallArgument> {
    let mut map = BTreeMap::new();
    let Some(sig) = callee_signature(meta, pkg, name) else {
        return map;
    };
    for (param, arg) in sig.args.iter().zip(args.iter()) {
        if param.name != EMPTY_ID {
            map.insert(param.name, arg.clone());
        }
    }
    map
}

/// Extract the concrete type arguments of a call, in precedence order:
/// explicit type arguments, the checker's instance record, then
/// argument-driven seeding from a generic function passed as a value.
pub(crate) fn extract_type_params(
    meta: &Metadata,
    ctx: &FileCtx,
    fun: &Expr,
    args: &[CallArgument],
    pkg: &str,
    name: &str,
) -> BTreeMap<i32, i32> {
    let mut map = BTreeMap::new();
    let tparams = callee_type_params(meta, pkg, name);
    if tparams.is_empty() {
        return map;
    }

    let explicit: Vec<&Expr> = match &fun.kind {
        ExprKind::Index { index, .. } => vec![index.as_ref()],
        ExprKind::IndexList { indices, .. } => indices.iter().collect(),
        _ => Vec::new(),
    };
    if !explicit.is_empty() {
        for (tp, idx_expr) in tparams.iter().zip(explicit) {
            let concrete = ctx
                .type_of(idx_expr.id)
                .map(|t| strip_pkg_prefix(t, ctx.pkg_path))
                .unwrap_or_else(|| {
                    normalize_expr(meta, ctx, idx_expr).canonical_string(&meta.pool)
                });
            map.insert(*tp, meta.intern(&concrete));
        }
        return map;
    }

    if let Some(key) = callee_key_ident(fun) {
        if let Some(instance) = ctx.typing.and_then(|t| t.instance_of(key)) {
            for (tp, concrete) in tparams.iter().zip(instance.iter()) {
                map.insert(*tp, meta.intern(&strip_pkg_prefix(concrete, ctx.pkg_path)));
            }
            if !map.is_empty() {
                return map;
            }
        }
    }

    // A generic function passed as the first argument seeds the callee's
    // first type parameter with its own first parameter type.
    if let Some(first) = args.first() {
        if first.kind == ArgKind::Ident {
            let fn_name = meta.lookup(first.name).to_string();
            let fn_pkg = {
                let p = meta.lookup(first.pkg);
                if p.is_empty() {
                    ctx.pkg_path.to_string()
                } else {
                    p.to_string()
                }
            };
            if let Some(passed) = meta.find_function(&fn_pkg, &fn_name) {
                if !passed.type_params.is_empty() {
                    if let Some(param) = passed.signature.args.first() {
                        let ty = meta.lookup(param.typ);
                        if !ty.is_empty() {
                            let ty = ty.to_string();
                            map.insert(tparams[0], meta.intern(&ty));
                        }
                    }
                }
            }
        }
    }
    map
}

/// Build a `func_type` node from parameter and result fields.
pub(crate) fn func_type_node(
    meta: &Metadata,
    ctx: &FileCtx,
    params: &[FieldDecl],
    results: &[FieldDecl],
) -> CallArgument {
    let mut node = CallArgument::new(ArgKind::FuncType);
    node.args = param_fields_to_args(meta, ctx, params);
    if !results.is_empty() {
        let mut res = CallArgument::new(ArgKind::FuncResults);
        res.args = param_fields_to_args(meta, ctx, results);
        node.fun = Some(Box::new(res));
    }
    node
}

/// One `field` node per declared name; unnamed fields produce a single
/// anonymous node.
pub(crate) fn param_fields_to_args(
    meta: &Metadata,
    ctx: &FileCtx,
    fields: &[FieldDecl],
) -> Vec<CallArgument> {
    let mut out = Vec::new();
    for field in fields {
        let typ = field
            .typ
            .as_ref()
            .map(|t| normalize_expr(meta, ctx, t).canonical_string(&meta.pool))
            .unwrap_or_default();
        let typ_id = meta.intern(&typ);
        if field.names.is_empty() {
            let mut node = CallArgument::new(ArgKind::Field);
            node.typ = typ_id;
            out.push(node);
        } else {
            for name in &field.names {
                let mut node = CallArgument::new(ArgKind::Field);
                node.name = meta.intern(name.ident_name().unwrap_or(""));
                node.typ = typ_id;
                out.push(node);
            }
        }
    }
    out
}

fn struct_fields_to_args(meta: &Metadata, ctx: &FileCtx, fields: &[FieldDecl]) -> Vec<CallArgument> {
    let mut out = Vec::new();
    for field in fields {
        if field.names.is_empty() {
            let mut node = CallArgument::new(ArgKind::Embed);
            node.x = field
                .typ
                .as_ref()
                .map(|t| Box::new(normalize_expr(meta, ctx, t)));
            out.push(node);
        } else {
            let typ = field
                .typ
                .as_ref()
                .map(|t| normalize_expr(meta, ctx, t).canonical_string(&meta.pool))
                .unwrap_or_default();
            for name in &field.names {
                let mut node = CallArgument::new(ArgKind::Field);
                node.name = meta.intern(name.ident_name().unwrap_or(""));
                node.typ = meta.intern(&typ);
                if let Some(tag) = &field.tag {
                    node.value = meta.intern(tag);
                }
                out.push(node);
            }
        }
    }
    out
}

fn interface_methods_to_args(
    meta: &Metadata,
    ctx: &FileCtx,
    methods: &[FieldDecl],
) -> Vec<CallArgument> {
    let mut out = Vec::new();
    for method in methods {
        if method.names.is_empty() {
            let mut node = CallArgument::new(ArgKind::Embed);
            node.x = method
                .typ
                .as_ref()
                .map(|t| Box::new(normalize_expr(meta, ctx, t)));
            out.push(node);
            continue;
        }
        let typ = method
            .typ
            .as_ref()
            .map(|t| normalize_expr(meta, ctx, t).canonical_string(&meta.pool))
            .unwrap_or_default();
        for name in &method.names {
            let mut node = CallArgument::new(ArgKind::Field);
            node.name = meta.intern(name.ident_name().unwrap_or(""));
            node.typ = meta.intern(&typ);
            out.push(node);
        }
    }
    out
}

/// Syntactic receiver type string, pointer form preserved and generic
/// brackets dropped (`*Repo[T]` → `*Repo`).
pub(crate) fn receiver_type_string(typ: &Expr) -> String {
    match &typ.kind {
        ExprKind::Ident { name } => name.clone(),
        ExprKind::Star { x } => format!("*{}", receiver_type_string(x)),
        ExprKind::Index { x, .. } | ExprKind::IndexList { x, .. } => receiver_type_string(x),
        ExprKind::Paren { x } => receiver_type_string(x),
        _ => String::new(),
    }
}

/// Whether a syntactic type is one of the built-in primitives.
pub(crate) fn is_primitive_expr(typ: &Expr) -> bool {
    typ.ident_name().is_some_and(constants::is_primitive)
}
