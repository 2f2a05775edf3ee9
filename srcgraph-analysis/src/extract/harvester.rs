//! Two-pass package harvesting.
//!
//! Pass 1 collects methods so receiver lookups work across files of the
//! same package; pass 2 collects everything else file by file. Mock-named
//! declarations are skipped in both passes.

use std::collections::BTreeMap;

use srcgraph_core::types::collections::{FxHashMap, SmallVec2};
use srcgraph_core::types::EMPTY_ID;
use tracing::debug;

use crate::ast::{
    walk_block, walk_expr, Block, Decl, DeclTok, Expr, ExprKind, FieldDecl, FuncDecl, GenDecl,
    SourceFile, Spec, Stmt, StmtKind, TypeSpec, Visitor,
};
use crate::metadata::{
    CallArgument, Field, File, Function, Metadata, Method, Scope, StructInstance, Type, TypeKind,
    Variable, VarTok,
};
use crate::typing::{ObjectKind, PackageSet};

use super::assignments::collect_assignments_counted;
use super::normalizer::{
    func_type_node, is_primitive_expr, normalize_expr, receiver_type_string,
};
use super::stats::ExtractionStats;
use super::{is_mock_name, FileCtx};

/// An interface→concrete candidate observed at a struct-literal site,
/// applied once the interface resolver runs.
#[derive(Debug, Clone)]
pub(crate) struct PendingResolution {
    pub pkg: String,
    pub owning_type: String,
    pub interface_field: String,
    pub concrete: String,
    pub position: i32,
}

pub(crate) fn harvest_package(
    meta: &mut Metadata,
    input: &PackageSet,
    pkg_path: &str,
    files: &BTreeMap<String, SourceFile>,
    pending: &mut Vec<PendingResolution>,
    stats: &mut ExtractionStats,
) {
    // Pass 1 — methods, keyed by receiver base type name.
    let mut staged_methods: FxHashMap<String, Vec<Method>> = FxHashMap::default();
    for (file_path, file) in files {
        for decl in &file.decls {
            let Decl::Func(func) = decl else { continue };
            let Some(recv) = &func.recv else { continue };
            let recv_type = recv
                .typ
                .as_ref()
                .map(receiver_type_string)
                .unwrap_or_default();
            let base = recv_type.trim_start_matches('*').to_string();
            let name = func.name_str().to_string();
            if base.is_empty() || is_mock_name(&base) || is_mock_name(&name) {
                stats.skipped_mocks += 1;
                continue;
            }
            let mut ctx = FileCtx::new(input, pkg_path, file_path, file);
            ctx.type_params = type_param_names(&func.type_params);
            let method = build_method(meta, &ctx, func, &recv_type, stats);
            staged_methods.entry(base).or_default().push(method);
            stats.methods += 1;
        }
    }

    // Pass 2 — files.
    let mut harvested_files: BTreeMap<String, File> = BTreeMap::new();
    for (file_path, file) in files {
        let ctx = FileCtx::new(input, pkg_path, file_path, file);
        let mut entity = File::default();

        for import in &file.imports {
            // A missing local alias defaults to the package path itself.
            let alias = import
                .alias
                .clone()
                .unwrap_or_else(|| import.path.clone());
            entity
                .imports
                .insert(meta.intern(&alias), meta.intern(&import.path));
        }

        for decl in &file.decls {
            match decl {
                Decl::Gen(gen) => match gen.tok {
                    DeclTok::Const | DeclTok::Var => {
                        harvest_values(meta, &ctx, gen, &mut entity, stats);
                    }
                    DeclTok::Type => {
                        for spec in &gen.specs {
                            let Spec::Type(ts) = spec else { continue };
                            let name = ts.name.ident_name().unwrap_or("").to_string();
                            if name.is_empty() || is_mock_name(&name) {
                                stats.skipped_mocks += 1;
                                continue;
                            }
                            let typ = harvest_type(meta, &ctx, ts, &gen.doc);
                            entity.types.insert(name, typ);
                            stats.types += 1;
                        }
                    }
                    DeclTok::Import => {}
                },
                Decl::Func(func) if func.recv.is_none() => {
                    let name = func.name_str().to_string();
                    if name.is_empty() || is_mock_name(&name) {
                        stats.skipped_mocks += 1;
                        continue;
                    }
                    let mut fctx = FileCtx::new(input, pkg_path, file_path, file);
                    fctx.type_params = type_param_names(&func.type_params);
                    entity
                        .functions
                        .push(build_function(meta, &fctx, func, stats));
                    stats.functions += 1;
                }
                Decl::Func(_) => {}
            }
        }

        harvest_instances(meta, &ctx, file, &mut entity, pending, stats);
        stats.files += 1;
        harvested_files.insert(file_path.clone(), entity);
    }

    // Merge into the package: canonical types plus per-file snapshots.
    let pkg = meta.packages.entry(pkg_path.to_string()).or_default();
    for (path, file_entity) in harvested_files {
        for (name, typ) in &file_entity.types {
            pkg.types.insert(name.clone(), typ.clone());
        }
        pkg.files.insert(path, file_entity);
    }

    // Attach pass-1 methods to their receiver types; receivers with no
    // declaration in the input still get a package-level entry.
    for (base, methods) in staged_methods {
        if let Some(typ) = pkg.types.get_mut(&base) {
            typ.methods.extend(methods.iter().cloned());
        } else {
            let mut typ = Type::new(
                meta.pool.intern(&base),
                meta.pool.intern(pkg_path),
                TypeKind::Other,
                Scope::of(&base),
            );
            typ.methods = methods.clone();
            pkg.types.insert(base.clone(), typ);
        }
        for file_entity in pkg.files.values_mut() {
            if let Some(typ) = file_entity.types.get_mut(&base) {
                typ.methods.extend(methods.iter().cloned());
            }
        }
    }
    debug!(pkg = pkg_path, types = pkg.types.len(), "package harvested");
}

pub(crate) fn type_param_names(fields: &[FieldDecl]) -> Vec<String> {
    let mut names = Vec::new();
    for field in fields {
        for name in &field.names {
            if let Some(n) = name.ident_name() {
                names.push(n.to_string());
            }
        }
    }
    names
}

fn intern_type_params(meta: &Metadata, fields: &[FieldDecl]) -> SmallVec2<i32> {
    type_param_names(fields)
        .iter()
        .map(|n| meta.intern(n))
        .collect()
}

fn build_method(
    meta: &Metadata,
    ctx: &FileCtx,
    func: &FuncDecl,
    recv_type: &str,
    stats: &mut ExtractionStats,
) -> Method {
    let name = func.name_str();
    let signature = func_type_node(meta, ctx, &func.params, &func.results);
    let signature_str = meta.intern(&signature.canonical_string(&meta.pool));
    let (assignment_map, count) = func
        .body
        .as_ref()
        .map(|b| collect_assignments_counted(meta, ctx, name, b))
        .unwrap_or_default();
    stats.assignments_processed += count;
    Method {
        name: meta.intern(name),
        receiver: meta.intern(recv_type),
        signature,
        signature_str,
        position: ctx.pos_id(meta, func.pos),
        scope: Scope::of(name),
        comments: meta.intern(&func.doc),
        tags: Vec::new(),
        type_params: intern_type_params(meta, &func.type_params),
        return_vars: collect_return_vars(meta, ctx, func.body.as_ref()),
        assignment_map,
        filename: meta.intern(ctx.file_path),
    }
}

fn build_function(
    meta: &Metadata,
    ctx: &FileCtx,
    func: &FuncDecl,
    stats: &mut ExtractionStats,
) -> Function {
    let name = func.name_str();
    let signature = func_type_node(meta, ctx, &func.params, &func.results);
    let signature_str = meta.intern(&signature.canonical_string(&meta.pool));
    let (assignment_map, count) = func
        .body
        .as_ref()
        .map(|b| collect_assignments_counted(meta, ctx, name, b))
        .unwrap_or_default();
    stats.assignments_processed += count;
    Function {
        name: meta.intern(name),
        pkg: meta.intern(ctx.pkg_path),
        signature,
        signature_str,
        position: ctx.pos_id(meta, func.pos),
        scope: Scope::of(name),
        comments: meta.intern(&func.doc),
        tags: Vec::new(),
        type_params: intern_type_params(meta, &func.type_params),
        return_vars: collect_return_vars(meta, ctx, func.body.as_ref()),
        assignment_map,
    }
}

/// The first return statement's results, excluding function literals.
fn collect_return_vars(
    meta: &Metadata,
    ctx: &FileCtx,
    body: Option<&Block>,
) -> Vec<CallArgument> {
    struct ReturnFinder {
        found: Option<Vec<Expr>>,
    }
    impl Visitor for ReturnFinder {
        fn visit_stmt(&mut self, stmt: &Stmt) -> bool {
            if self.found.is_some() {
                return false;
            }
            if let StmtKind::Return { results } = &stmt.kind {
                self.found = Some(results.clone());
                return false;
            }
            true
        }
        fn visit_expr(&mut self, expr: &Expr) -> bool {
            !matches!(expr.kind, ExprKind::FuncLit { .. })
        }
    }
    let Some(body) = body else {
        return Vec::new();
    };
    let mut finder = ReturnFinder { found: None };
    walk_block(&mut finder, body);
    finder
        .found
        .map(|results| results.iter().map(|e| normalize_expr(meta, ctx, e)).collect())
        .unwrap_or_default()
}

fn harvest_values(
    meta: &Metadata,
    ctx: &FileCtx,
    gen: &GenDecl,
    entity: &mut File,
    stats: &mut ExtractionStats,
) {
    let tok = match gen.tok {
        DeclTok::Const => VarTok::Const,
        _ => VarTok::Var,
    };
    for (group_index, spec) in gen.specs.iter().enumerate() {
        let Spec::Value(vs) = spec else { continue };
        for (i, name_expr) in vs.names.iter().enumerate() {
            let name = name_expr.ident_name().unwrap_or("");
            if name.is_empty() || name == "_" || is_mock_name(name) {
                continue;
            }
            let typ = vs
                .typ
                .as_ref()
                .map(|t| normalize_expr(meta, ctx, t).canonical_string(&meta.pool))
                .or_else(|| ctx.type_of(name_expr.id).map(String::from))
                .unwrap_or_default();
            let value = vs
                .values
                .get(i)
                .map(|v| normalize_expr(meta, ctx, v).canonical_string(&meta.pool))
                .unwrap_or_default();
            let mut variable = Variable {
                name: meta.intern(name),
                pkg: meta.intern(ctx.pkg_path),
                tok,
                typ: meta.intern(&typ),
                resolved_type: EMPTY_ID,
                value: meta.intern(&value),
                computed_value: EMPTY_ID,
                position: ctx.pos_id(meta, if vs.pos.is_zero() { name_expr.pos } else { vs.pos }),
                comments: meta.intern(&vs.doc),
                group_index: if tok == VarTok::Const {
                    group_index as i32
                } else {
                    -1
                },
            };
            if let Some(cv) = ctx.typing.and_then(|t| t.constant_of(name_expr.id)) {
                variable.computed_value = meta.intern(&cv.value);
                variable.resolved_type = meta.intern(&cv.underlying);
            }
            entity.variables.push(variable);
            stats.variables += 1;
        }
    }
}

fn harvest_type(meta: &Metadata, ctx: &FileCtx, ts: &TypeSpec, doc: &str) -> Type {
    let name = ts.name.ident_name().unwrap_or("");
    let name_id = meta.intern(name);
    let pkg_id = meta.intern(ctx.pkg_path);
    let scope = Scope::of(name);

    if ts.assign {
        let mut typ = Type::new(name_id, pkg_id, TypeKind::Alias, scope);
        typ.target =
            meta.intern(&normalize_expr(meta, ctx, &ts.typ).canonical_string(&meta.pool));
        typ.comments = meta.intern(doc);
        return typ;
    }

    let mut typ = match &ts.typ.kind {
        ExprKind::StructType { fields } => {
            let mut typ = Type::new(name_id, pkg_id, TypeKind::Struct, scope);
            harvest_struct_fields(meta, ctx, fields, &mut typ);
            typ
        }
        ExprKind::InterfaceType { methods } => {
            let mut typ = Type::new(name_id, pkg_id, TypeKind::Interface, scope);
            harvest_interface_methods(meta, ctx, methods, &mut typ);
            typ
        }
        _ => {
            let mut typ = Type::new(name_id, pkg_id, TypeKind::Other, scope);
            typ.target =
                meta.intern(&normalize_expr(meta, ctx, &ts.typ).canonical_string(&meta.pool));
            typ
        }
    };
    typ.comments = meta.intern(doc);
    typ
}

fn harvest_struct_fields(meta: &Metadata, ctx: &FileCtx, fields: &[FieldDecl], typ: &mut Type) {
    for field in fields {
        let tag = field
            .tag
            .as_ref()
            .map(|t| meta.intern(t))
            .unwrap_or(EMPTY_ID);
        if field.names.is_empty() {
            // Embedded field: named after its type's base segment.
            let Some(ftyp) = &field.typ else { continue };
            let canonical = normalize_expr(meta, ctx, ftyp).canonical_string(&meta.pool);
            let base = canonical
                .trim_start_matches('*')
                .rsplit('.')
                .next()
                .unwrap_or(&canonical)
                .to_string();
            typ.embeds.push(meta.intern(&base));
            typ.fields.push(Field {
                name: meta.intern(&base),
                typ: meta.intern(&canonical),
                tag,
                scope: Scope::of(&base),
                comments: meta.intern(&field.doc),
                nested_type: None,
            });
            continue;
        }
        for name_expr in &field.names {
            let name = name_expr.ident_name().unwrap_or("");
            let type_name = field
                .typ
                .as_ref()
                .map(|t| field_type_name(meta, ctx, t))
                .unwrap_or_default();
            let nested_type = match field.typ.as_ref().map(|t| &t.kind) {
                Some(ExprKind::StructType { fields: nested }) => {
                    let mut anon = Type::new(
                        meta.intern(name),
                        meta.intern(ctx.pkg_path),
                        TypeKind::Struct,
                        Scope::of(name),
                    );
                    harvest_struct_fields(meta, ctx, nested, &mut anon);
                    Some(Box::new(anon))
                }
                _ => None,
            };
            typ.fields.push(Field {
                name: meta.intern(name),
                typ: meta.intern(&type_name),
                tag,
                scope: Scope::of(name),
                comments: meta.intern(&field.doc),
                nested_type,
            });
        }
    }
}

/// A field's type name: the syntactic form, except that non-primitive
/// types defined in external packages collapse to the checker's
/// underlying string. Internal types stay as written so later stages can
/// resolve them.
fn field_type_name(meta: &Metadata, ctx: &FileCtx, typ: &Expr) -> String {
    let syntactic = normalize_expr(meta, ctx, typ).canonical_string(&meta.pool);
    if is_primitive_expr(typ) {
        return syntactic;
    }
    if let Some(ident) = typ.leftmost_ident() {
        if let Some(obj) = ctx.object_of(ident.id) {
            if obj.kind == ObjectKind::TypeName {
                if let (Some(pkg), Some(underlying)) = (&obj.pkg, &obj.type_string) {
                    let external =
                        !ctx.module_path.is_empty() && !pkg.starts_with(ctx.module_path);
                    if external {
                        return underlying.clone();
                    }
                }
            }
        }
    }
    syntactic
}

fn harvest_interface_methods(
    meta: &Metadata,
    ctx: &FileCtx,
    methods: &[FieldDecl],
    typ: &mut Type,
) {
    for method in methods {
        if method.names.is_empty() {
            if let Some(embedded) = &method.typ {
                let canonical = normalize_expr(meta, ctx, embedded).canonical_string(&meta.pool);
                typ.embeds.push(meta.intern(&canonical));
            }
            continue;
        }
        let Some(Expr {
            kind: ExprKind::FuncType { params, results, .. },
            ..
        }) = method.typ.as_ref()
        else {
            continue;
        };
        for name_expr in &method.names {
            let name = name_expr.ident_name().unwrap_or("");
            let signature = func_type_node(meta, ctx, params.as_slice(), results.as_slice());
            let signature_str = meta.intern(&signature.canonical_string(&meta.pool));
            typ.methods.push(Method {
                name: meta.intern(name),
                receiver: EMPTY_ID,
                signature,
                signature_str,
                position: ctx.pos_id(meta, method.pos),
                scope: Scope::of(name),
                comments: meta.intern(&method.doc),
                tags: Vec::new(),
                type_params: SmallVec2::new(),
                return_vars: Vec::new(),
                assignment_map: BTreeMap::new(),
                filename: meta.intern(ctx.file_path),
            });
        }
    }
}

/// Walk every expression in the file recording struct-literal instances
/// and interface-resolution candidates.
fn harvest_instances(
    meta: &Metadata,
    ctx: &FileCtx,
    file: &SourceFile,
    entity: &mut File,
    pending: &mut Vec<PendingResolution>,
    stats: &mut ExtractionStats,
) {
    struct InstanceCollector<'a, 'm> {
        meta: &'m Metadata,
        ctx: &'a FileCtx<'a>,
        instances: Vec<StructInstance>,
        pending: Vec<PendingResolution>,
    }

    impl Visitor for InstanceCollector<'_, '_> {
        fn visit_expr(&mut self, expr: &Expr) -> bool {
            let ExprKind::CompositeLit {
                typ: Some(typ),
                elts,
            } = &expr.kind
            else {
                return true;
            };
            let Some(type_name) = literal_type_name(typ) else {
                return true;
            };
            let meta = self.meta;
            let ctx = self.ctx;
            let pkg = literal_type_pkg(ctx, typ).unwrap_or_else(|| ctx.pkg_path.to_string());

            let mut fields = BTreeMap::new();
            for elt in elts {
                let ExprKind::KeyValue { key, value } = &elt.kind else {
                    continue;
                };
                let Some(key_name) = key.ident_name() else {
                    continue;
                };
                let value_str =
                    normalize_expr(meta, ctx, value).canonical_string(&meta.pool);
                fields.insert(meta.intern(key_name), meta.intern(&value_str));

                // `key: &C{…}` / `key: C{…}` with a bare local type name is
                // an interface-resolution candidate.
                if let Some(concrete) = embedded_concrete_type(value) {
                    self.pending.push(PendingResolution {
                        pkg: pkg.clone(),
                        owning_type: type_name.clone(),
                        interface_field: key_name.to_string(),
                        concrete,
                        position: ctx.pos_id(meta, value.pos),
                    });
                }
            }
            self.instances.push(StructInstance {
                typ: meta.intern(&type_name),
                pkg: meta.intern(&pkg),
                position: ctx.pos_id(meta, expr.pos),
                fields,
            });
            true
        }
    }

    let mut collector = InstanceCollector {
        meta,
        ctx,
        instances: Vec::new(),
        pending: Vec::new(),
    };
    for decl in &file.decls {
        match decl {
            Decl::Func(func) => {
                if let Some(body) = &func.body {
                    walk_block(&mut collector, body);
                }
            }
            Decl::Gen(gen) => {
                for spec in &gen.specs {
                    if let Spec::Value(vs) = spec {
                        for value in &vs.values {
                            walk_expr(&mut collector, value);
                        }
                    }
                }
            }
        }
    }
    stats.struct_instances += collector.instances.len();
    entity.struct_instances.extend(collector.instances);
    pending.extend(collector.pending);
}

/// The named type of a struct literal, if it has one.
fn literal_type_name(typ: &Expr) -> Option<String> {
    match &typ.kind {
        ExprKind::Ident { name } => Some(name.clone()),
        ExprKind::Selector { sel, .. } => sel.ident_name().map(String::from),
        ExprKind::Index { x, .. } | ExprKind::IndexList { x, .. } => literal_type_name(x),
        _ => None,
    }
}

fn literal_type_pkg(ctx: &FileCtx, typ: &Expr) -> Option<String> {
    if let ExprKind::Selector { x, .. } = &typ.kind {
        if let ExprKind::Ident { name } = &x.kind {
            if let Some(obj) = ctx.object_of(x.id) {
                if obj.kind == ObjectKind::PkgName {
                    return obj.pkg.clone().or_else(|| ctx.aliases.get(name).cloned());
                }
            }
            return ctx.aliases.get(name).cloned();
        }
    }
    None
}

/// `&C{…}` or `C{…}` where `C` is a bare local type name.
fn embedded_concrete_type(value: &Expr) -> Option<String> {
    match &value.kind {
        ExprKind::Unary { op, x } if op == "&" => match &x.kind {
            ExprKind::CompositeLit {
                typ: Some(typ), ..
            } => typ.ident_name().map(|n| format!("*{n}")),
            _ => None,
        },
        ExprKind::CompositeLit {
            typ: Some(typ), ..
        } => typ.ident_name().map(String::from),
        _ => None,
    }
}
