//! Assignment harvesting over function bodies.
//!
//! Every assigning node is collected: `=`/`:=` statements, in-body `var`
//! declarations with values, and range defines. Identifier, selector, and
//! index left-hand sides are recorded; the blank identifier is ignored.

use std::collections::BTreeMap;

use srcgraph_core::types::EMPTY_ID;

use crate::ast::{walk_block, AssignOp, Block, Expr, ExprKind, Spec, Stmt, StmtKind, Visitor};
use crate::metadata::{ArgKind, Assignment, Metadata, Scope};

use super::normalizer::normalize_expr;
use super::FileCtx;

/// Collect the assignment map of one function body: var-name id → the
/// assignments to it, in source order.
pub(crate) fn collect_assignments(
    meta: &Metadata,
    ctx: &FileCtx,
    func_name: &str,
    body: &Block,
) -> BTreeMap<i32, Vec<Assignment>> {
    collect_assignments_counted(meta, ctx, func_name, body).0
}

/// Collection variant reporting how many assignments were recorded.
pub(crate) fn collect_assignments_counted(
    meta: &Metadata,
    ctx: &FileCtx,
    func_name: &str,
    body: &Block,
) -> (BTreeMap<i32, Vec<Assignment>>, usize) {
    let mut collector = AssignCollector {
        meta,
        ctx,
        func: func_name,
        map: BTreeMap::new(),
        count: 0,
    };
    walk_block(&mut collector, body);
    (collector.map, collector.count)
}

struct AssignCollector<'a, 'm> {
    meta: &'m Metadata,
    ctx: &'a FileCtx<'a>,
    func: &'a str,
    map: BTreeMap<i32, Vec<Assignment>>,
    count: usize,
}

impl Visitor for AssignCollector<'_, '_> {
    fn visit_stmt(&mut self, stmt: &Stmt) -> bool {
        match &stmt.kind {
            StmtKind::Assign { lhs, rhs, .. } => {
                self.record_assign(stmt, lhs, rhs);
            }
            StmtKind::Decl { decl } => {
                for spec in &decl.specs {
                    if let Spec::Value(value) = spec {
                        for (i, name) in value.names.iter().enumerate() {
                            if let Some(rhs) = value.values.get(i) {
                                self.record_pair(stmt, name, rhs);
                            }
                        }
                    }
                }
            }
            StmtKind::Range { key, value, op, x, .. } => {
                if *op == AssignOp::Define {
                    for target in [key, value].into_iter().flatten() {
                        self.record_pair(stmt, target, x);
                    }
                }
            }
            _ => {}
        }
        true
    }
}

impl AssignCollector<'_, '_> {
    fn record_assign(&mut self, stmt: &Stmt, lhs: &[Expr], rhs: &[Expr]) {
        if lhs.len() == rhs.len() {
            for (l, r) in lhs.iter().zip(rhs.iter()) {
                self.record_pair(stmt, l, r);
            }
        } else if rhs.len() == 1 {
            // Multi-value form: every target takes the single call RHS.
            for l in lhs {
                self.record_pair(stmt, l, &rhs[0]);
            }
        }
    }

    fn record_pair(&mut self, stmt: &Stmt, lhs: &Expr, rhs: &Expr) {
        let meta = self.meta;
        let ctx = self.ctx;

        let (name_str, concrete_type) = match &lhs.kind {
            ExprKind::Ident { name } => {
                if name == "_" {
                    return;
                }
                let concrete = ctx
                    .type_of(lhs.id)
                    .map(|t| meta.intern(t))
                    .unwrap_or(EMPTY_ID);
                (name.clone(), concrete)
            }
            ExprKind::Selector { sel, .. } => {
                let node = normalize_expr(meta, ctx, lhs);
                let concrete = ctx
                    .type_of(sel.id)
                    .map(|t| meta.intern(t))
                    .unwrap_or(EMPTY_ID);
                (node.canonical_string(&meta.pool), concrete)
            }
            ExprKind::Index { .. } => {
                let node = normalize_expr(meta, ctx, lhs);
                let concrete = ctx
                    .type_of(lhs.id)
                    .map(|t| meta.intern(t))
                    .unwrap_or(EMPTY_ID);
                (node.canonical_string(&meta.pool), concrete)
            }
            _ => return,
        };

        let value = normalize_expr(meta, ctx, rhs);
        let lhs_node = normalize_expr(meta, ctx, lhs);
        let pos = if lhs.pos.is_zero() { stmt.pos } else { lhs.pos };

        let mut assignment = Assignment {
            variable_name: meta.intern(&name_str),
            pkg: meta.intern(ctx.pkg_path),
            concrete_type,
            position: ctx.pos_id(meta, pos),
            scope: Scope::of(&name_str),
            value,
            lhs: lhs_node,
            func: meta.intern(self.func),
            callee_func: EMPTY_ID,
            callee_pkg: EMPTY_ID,
            return_index: None,
        };
        if assignment.value.kind == ArgKind::Call {
            assignment.callee_func = assignment.value.name;
            assignment.callee_pkg = assignment.value.pkg;
            assignment.return_index = Some(0);
        }

        self.map
            .entry(assignment.variable_name)
            .or_default()
            .push(assignment);
        self.count += 1;
    }
}

/// Append an assignment to a map if no entry with the same name and
/// position exists yet.
pub(crate) fn append_unique(
    map: &mut BTreeMap<i32, Vec<Assignment>>,
    assignment: Assignment,
) {
    let entries = map.entry(assignment.variable_name).or_default();
    if !entries.iter().any(|a| a.position == assignment.position) {
        entries.push(assignment);
    }
}
