//! Call-graph construction.
//!
//! Walks every function body in declaration order. Receiver-chain inner
//! calls and call arguments are processed before the edge for the outer
//! call is appended, so nested edges precede their consumers. Function
//! literals become distinct callers linked to the enclosing declared
//! function.

use srcgraph_core::constants::ENTRY_FUNCTION;
use srcgraph_core::types::collections::FxHashMap;
use srcgraph_core::types::EMPTY_ID;

use crate::ast::{
    AssignOp, Block, Decl, Expr, ExprKind, Pos, Spec, Stmt, StmtKind,
};
use crate::metadata::{
    ArgKind, Assignment, Call, CallArgument, CallGraphEdge, Metadata, Scope,
};
use crate::typing::PackageSet;

use super::assignments::append_unique;
use super::harvester::type_param_names;
use super::normalizer::{
    bind_params, extract_type_params, is_type_conversion, normalize_expr, receiver_type_string,
    resolve_callee,
};
use super::stats::ExtractionStats;
use super::{is_mock_name, FileCtx};

/// The function whose body is currently being walked.
struct Frame<'a> {
    pkg: &'a str,
    name: String,
    recv_type: String,
    position: Pos,
    signature_str: i32,
    /// BaseID of the enclosing declared function, set for literals.
    parent_base: Option<String>,
    /// BaseID of the declared function owning this (possibly literal)
    /// frame, inherited by nested literals.
    declared_base: String,
}

struct Builder {
    edges: Vec<CallGraphEdge>,
    /// callee InstanceID → edge index, deduplicating repeated processing.
    instance_index: FxHashMap<String, u32>,
    /// Entry-function call assignments, appended to `main` after the walk.
    entry_assignments: Vec<(String, Assignment)>,
}

pub(crate) fn build_call_graph(
    meta: &mut Metadata,
    input: &PackageSet,
    stats: &mut ExtractionStats,
) {
    let mut builder = Builder {
        edges: Vec::new(),
        instance_index: FxHashMap::default(),
        entry_assignments: Vec::new(),
    };

    for (pkg_path, files) in &input.packages {
        for (file_path, file) in files {
            for decl in &file.decls {
                let Decl::Func(func) = decl else { continue };
                let Some(body) = &func.body else { continue };
                let name = func.name_str().to_string();
                let recv_type = func
                    .recv
                    .as_ref()
                    .and_then(|r| r.typ.as_ref())
                    .map(receiver_type_string)
                    .unwrap_or_default();
                if is_mock_name(&name) || is_mock_name(recv_type.trim_start_matches('*')) {
                    continue;
                }
                let mut ctx = FileCtx::new(input, pkg_path, file_path, file);
                ctx.type_params = type_param_names(&func.type_params);

                let signature_str = if recv_type.is_empty() {
                    meta.find_function(pkg_path, &name)
                        .map(|f| f.signature_str)
                        .unwrap_or(EMPTY_ID)
                } else {
                    meta.find_method(pkg_path, &name)
                        .map(|m| m.signature_str)
                        .unwrap_or(EMPTY_ID)
                };
                let declared_base = Call::new(
                    meta.intern(pkg_path),
                    meta.intern(&name),
                    meta.intern(&recv_type),
                    EMPTY_ID,
                    Scope::of(&name),
                )
                .base_id(&meta.pool)
                .to_string();
                let frame = Frame {
                    pkg: pkg_path,
                    name,
                    recv_type,
                    position: func.pos,
                    signature_str,
                    parent_base: None,
                    declared_base,
                };
                builder.process_block(meta, &ctx, &frame, body);
            }
        }
    }

    let mut edges = builder.edges;
    for (i, edge) in edges.iter_mut().enumerate() {
        let idx = i as u32;
        edge.caller.edge = Some(idx);
        edge.callee.edge = Some(idx);
        for arg in &mut edge.args {
            arg.edge = Some(idx);
        }
    }
    stats.edges_built = edges.len();
    meta.call_graph = edges;

    // Entry-function call results double as local assignments.
    for (pkg_path, assignment) in builder.entry_assignments {
        let Some(pkg) = meta.packages.get_mut(&pkg_path) else {
            continue;
        };
        let main_id = assignment.func;
        for file in pkg.files.values_mut() {
            if let Some(f) = file.functions.iter_mut().find(|f| f.name == main_id) {
                append_unique(&mut f.assignment_map, assignment);
                break;
            }
        }
    }
}

impl Builder {
    fn process_block(&mut self, meta: &Metadata, ctx: &FileCtx, frame: &Frame, block: &Block) {
        for stmt in &block.stmts {
            self.process_stmt(meta, ctx, frame, stmt);
        }
    }

    fn process_stmt(&mut self, meta: &Metadata, ctx: &FileCtx, frame: &Frame, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Expr { x } => self.process_expr(meta, ctx, frame, x, None),
            StmtKind::Assign { lhs, rhs, .. } => {
                if lhs.len() == rhs.len() {
                    for (l, r) in lhs.iter().zip(rhs.iter()) {
                        self.process_expr(meta, ctx, frame, r, l.ident_name());
                    }
                } else if rhs.len() == 1 {
                    let recv = lhs.first().and_then(|l| l.ident_name());
                    self.process_expr(meta, ctx, frame, &rhs[0], recv);
                }
                for l in lhs {
                    if !matches!(l.kind, ExprKind::Ident { .. }) {
                        self.process_expr(meta, ctx, frame, l, None);
                    }
                }
            }
            StmtKind::Decl { decl } => {
                for spec in &decl.specs {
                    if let Spec::Value(vs) = spec {
                        for (i, name) in vs.names.iter().enumerate() {
                            if let Some(value) = vs.values.get(i) {
                                self.process_expr(meta, ctx, frame, value, name.ident_name());
                            }
                        }
                    }
                }
            }
            StmtKind::Return { results } => {
                for r in results {
                    self.process_expr(meta, ctx, frame, r, None);
                }
            }
            StmtKind::Block { block } => self.process_block(meta, ctx, frame, block),
            StmtKind::If {
                init,
                cond,
                then,
                els,
            } => {
                if let Some(init) = init {
                    self.process_stmt(meta, ctx, frame, init);
                }
                self.process_expr(meta, ctx, frame, cond, None);
                self.process_block(meta, ctx, frame, then);
                if let Some(els) = els {
                    self.process_stmt(meta, ctx, frame, els);
                }
            }
            StmtKind::For {
                init,
                cond,
                post,
                body,
            } => {
                if let Some(init) = init {
                    self.process_stmt(meta, ctx, frame, init);
                }
                if let Some(cond) = cond {
                    self.process_expr(meta, ctx, frame, cond, None);
                }
                if let Some(post) = post {
                    self.process_stmt(meta, ctx, frame, post);
                }
                self.process_block(meta, ctx, frame, body);
            }
            StmtKind::Range {
                key, op, x, body, ..
            } => {
                let recv = if *op == AssignOp::Define {
                    key.as_ref().and_then(|k| k.ident_name())
                } else {
                    None
                };
                self.process_expr(meta, ctx, frame, x, recv);
                self.process_block(meta, ctx, frame, body);
            }
            StmtKind::Switch { init, tag, cases } => {
                if let Some(init) = init {
                    self.process_stmt(meta, ctx, frame, init);
                }
                if let Some(tag) = tag {
                    self.process_expr(meta, ctx, frame, tag, None);
                }
                for case in cases {
                    for e in &case.exprs {
                        self.process_expr(meta, ctx, frame, e, None);
                    }
                    for s in &case.body {
                        self.process_stmt(meta, ctx, frame, s);
                    }
                }
            }
            StmtKind::TypeSwitch {
                init,
                assign,
                cases,
            } => {
                if let Some(init) = init {
                    self.process_stmt(meta, ctx, frame, init);
                }
                self.process_stmt(meta, ctx, frame, assign);
                for case in cases {
                    for s in &case.body {
                        self.process_stmt(meta, ctx, frame, s);
                    }
                }
            }
            StmtKind::Go { call } | StmtKind::Defer { call } => {
                self.process_expr(meta, ctx, frame, call, None);
            }
            StmtKind::IncDec { x, .. } => self.process_expr(meta, ctx, frame, x, None),
            StmtKind::Send { chan, value } => {
                self.process_expr(meta, ctx, frame, chan, None);
                self.process_expr(meta, ctx, frame, value, None);
            }
            StmtKind::Labeled { stmt, .. } => self.process_stmt(meta, ctx, frame, stmt),
            StmtKind::Branch { .. } | StmtKind::Empty => {}
        }
    }

    fn process_expr(
        &mut self,
        meta: &Metadata,
        ctx: &FileCtx,
        frame: &Frame,
        expr: &Expr,
        recv_var: Option<&str>,
    ) {
        match &expr.kind {
            ExprKind::Call { fun, args, .. } => {
                self.process_call(meta, ctx, frame, expr, fun, args, recv_var);
            }
            ExprKind::FuncLit { body, .. } => {
                // The innermost literal is the caller; the declared function
                // stays the parent across nesting.
                let lit_frame = Frame {
                    pkg: frame.pkg,
                    name: format!("funclit:{}:{}", expr.pos.line, expr.pos.col),
                    recv_type: String::new(),
                    position: expr.pos,
                    signature_str: EMPTY_ID,
                    parent_base: Some(frame.declared_base.clone()),
                    declared_base: frame.declared_base.clone(),
                };
                self.process_block(meta, ctx, &lit_frame, body);
            }
            _ => self.descend(meta, ctx, frame, expr),
        }
    }

    /// Recurse into an expression's children in evaluation order.
    fn descend(&mut self, meta: &Metadata, ctx: &FileCtx, frame: &Frame, expr: &Expr) {
        let mut go = |b: &mut Self, e: &Expr| b.process_expr(meta, ctx, frame, e, None);
        match &expr.kind {
            ExprKind::Selector { x, .. } => go(self, x),
            ExprKind::Unary { x, .. }
            | ExprKind::Star { x }
            | ExprKind::Paren { x }
            | ExprKind::TypeAssert { x, .. } => go(self, x),
            ExprKind::Binary { x, y, .. } => {
                go(self, x);
                go(self, y);
            }
            ExprKind::Ellipsis { elt } => {
                if let Some(e) = elt {
                    go(self, e);
                }
            }
            ExprKind::CompositeLit { elts, .. } => {
                for e in elts {
                    go(self, e);
                }
            }
            ExprKind::Index { x, index } => {
                go(self, x);
                go(self, index);
            }
            ExprKind::IndexList { x, indices } => {
                go(self, x);
                for i in indices {
                    go(self, i);
                }
            }
            ExprKind::Slice { x, low, high, max } => {
                go(self, x);
                for part in [low, high, max].into_iter().flatten() {
                    go(self, part);
                }
            }
            ExprKind::KeyValue { key, value } => {
                go(self, key);
                go(self, value);
            }
            _ => {}
        }
    }

    /// Process the receiver sub-expression of a selector callee, returning
    /// the inner call's edge when the receiver is itself a call.
    fn process_receiver(
        &mut self,
        meta: &Metadata,
        ctx: &FileCtx,
        frame: &Frame,
        x: &Expr,
    ) -> Option<u32> {
        match &x.kind {
            ExprKind::Call { fun, args, .. } => {
                self.process_call(meta, ctx, frame, x, fun, args, None)
            }
            ExprKind::Paren { x } => self.process_receiver(meta, ctx, frame, x),
            _ => {
                self.process_expr(meta, ctx, frame, x, None);
                None
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn process_call(
        &mut self,
        meta: &Metadata,
        ctx: &FileCtx,
        frame: &Frame,
        expr: &Expr,
        fun: &Expr,
        args: &[Expr],
        recv_var: Option<&str>,
    ) -> Option<u32> {
        // Conversions are not calls; their operands may still contain some.
        if is_type_conversion(ctx, fun) {
            for a in args {
                self.process_expr(meta, ctx, frame, a, None);
            }
            return None;
        }

        let chain_parent = match &fun.kind {
            ExprKind::Selector { x, .. } => self.process_receiver(meta, ctx, frame, x),
            _ => None,
        };
        for a in args {
            self.process_expr(meta, ctx, frame, a, None);
        }

        let Some(callee_ident) = resolve_callee(ctx, fun) else {
            // An immediately-invoked literal still contributes its body.
            self.process_expr(meta, ctx, frame, fun, None);
            return None;
        };
        if is_mock_name(&callee_ident.name)
            || is_mock_name(callee_ident.recv_type.trim_start_matches('*'))
            || is_mock_name(&frame.name)
        {
            return None;
        }

        let norm_args: Vec<CallArgument> =
            args.iter().map(|a| normalize_expr(meta, ctx, a)).collect();
        let param_arg_map = bind_params(meta, &callee_ident.pkg, &callee_ident.name, &norm_args);
        let type_param_map = extract_type_params(
            meta,
            ctx,
            fun,
            &norm_args,
            &callee_ident.pkg,
            &callee_ident.name,
        );

        let mut caller = Call::new(
            meta.intern(frame.pkg),
            meta.intern(&frame.name),
            meta.intern(&frame.recv_type),
            ctx.pos_id(meta, frame.position),
            Scope::of(&frame.name),
        );
        caller.signature_str = frame.signature_str;

        let mut callee = Call::new(
            meta.intern(&callee_ident.pkg),
            meta.intern(&callee_ident.name),
            meta.intern(&callee_ident.recv_type),
            ctx.pos_id(meta, expr.pos),
            Scope::of(&callee_ident.name),
        );
        callee.signature_str = callee_signature_str(meta, &callee_ident.pkg, &callee_ident.name);

        let mut edge = CallGraphEdge::new(caller, callee, ctx.pos_id(meta, expr.pos));
        edge.args = norm_args;
        edge.param_arg_map = param_arg_map;
        edge.type_param_map = type_param_map;
        edge.callee_var_name = if callee_ident.recv_var.is_empty() {
            EMPTY_ID
        } else {
            meta.intern(&callee_ident.recv_var)
        };
        if let Some(recv) = recv_var {
            if recv != "_" {
                edge.callee_recv_var_name = meta.intern(recv);
            }
        }
        if let Some(parent_idx) = chain_parent {
            let parent = &self.edges[parent_idx as usize];
            edge.chain_parent = Some(parent_idx);
            edge.chain_depth = parent.chain_depth + 1;
            edge.chain_root = if parent.callee_var_name != EMPTY_ID {
                parent.callee_var_name
            } else {
                fun_receiver_root(meta, fun)
            };
        } else {
            edge.chain_root = edge.callee_var_name;
        }
        if let Some(parent_base) = &frame.parent_base {
            edge.parent_function = meta.intern(parent_base);
        }
        if let Some(f) = meta.find_function(&callee_ident.pkg, &callee_ident.name) {
            edge.assignment_map = f.assignment_map.clone();
        } else if let Some(m) = meta.find_method(&callee_ident.pkg, &callee_ident.name) {
            edge.assignment_map = m.assignment_map.clone();
        }

        let instance = edge.callee_instance_id(&meta.pool).to_string();
        if let Some(&existing) = self.instance_index.get(&instance) {
            return Some(existing);
        }

        if frame.name == ENTRY_FUNCTION {
            if let Some(recv) = recv_var {
                if recv != "_" {
                    let value = normalize_expr(meta, ctx, expr);
                    let mut lhs = CallArgument::new(ArgKind::Ident);
                    lhs.name = meta.intern(recv);
                    let assignment = Assignment {
                        variable_name: meta.intern(recv),
                        pkg: meta.intern(frame.pkg),
                        concrete_type: EMPTY_ID,
                        position: ctx.pos_id(meta, expr.pos),
                        scope: Scope::of(recv),
                        value,
                        lhs,
                        func: meta.intern(&frame.name),
                        callee_func: edge.callee.name,
                        callee_pkg: edge.callee.pkg,
                        return_index: Some(0),
                    };
                    self.entry_assignments
                        .push((frame.pkg.to_string(), assignment));
                }
            }
        }

        let idx = self.edges.len() as u32;
        self.instance_index.insert(instance, idx);
        self.edges.push(edge);
        Some(idx)
    }
}

fn callee_signature_str(meta: &Metadata, pkg: &str, name: &str) -> i32 {
    if let Some(f) = meta.find_function(pkg, name) {
        return f.signature_str;
    }
    meta.find_method(pkg, name)
        .map(|m| m.signature_str)
        .unwrap_or(EMPTY_ID)
}

/// The leftmost identifier of a receiver chain, interned; the fallback
/// chain root when the inner edge has no receiver variable.
fn fun_receiver_root(meta: &Metadata, fun: &Expr) -> i32 {
    fun.leftmost_ident()
        .and_then(|e| e.ident_name())
        .map(|n| meta.intern(n))
        .unwrap_or(EMPTY_ID)
}
