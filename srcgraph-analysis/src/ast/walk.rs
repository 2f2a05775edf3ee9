//! Pre-order syntax-tree traversal.
//!
//! Mirrors the shape of a classic `Inspect` walk: the visitor sees every
//! statement and expression, and can prune a subtree by returning `false`.
//! Function-literal bodies ARE walked — callers that need to treat them
//! specially prune in `visit_expr`.

use super::expr::{Expr, ExprKind, FieldDecl};
use super::stmt::{Block, CaseClause, Stmt, StmtKind};

/// Statement/expression visitor. Return `false` to skip a node's children.
pub trait Visitor {
    fn visit_stmt(&mut self, _stmt: &Stmt) -> bool {
        true
    }

    fn visit_expr(&mut self, _expr: &Expr) -> bool {
        true
    }
}

/// Walk a block's statements in order.
pub fn walk_block<V: Visitor>(v: &mut V, block: &Block) {
    for stmt in &block.stmts {
        walk_stmt(v, stmt);
    }
}

fn walk_cases<V: Visitor>(v: &mut V, cases: &[CaseClause]) {
    for case in cases {
        for expr in &case.exprs {
            walk_expr(v, expr);
        }
        for stmt in &case.body {
            walk_stmt(v, stmt);
        }
    }
}

fn walk_fields<V: Visitor>(v: &mut V, fields: &[FieldDecl]) {
    for field in fields {
        for name in &field.names {
            walk_expr(v, name);
        }
        if let Some(typ) = &field.typ {
            walk_expr(v, typ);
        }
    }
}

/// Walk one statement and its children.
pub fn walk_stmt<V: Visitor>(v: &mut V, stmt: &Stmt) {
    if !v.visit_stmt(stmt) {
        return;
    }
    match &stmt.kind {
        StmtKind::Expr { x } => walk_expr(v, x),
        StmtKind::Assign { lhs, rhs, .. } => {
            for e in lhs {
                walk_expr(v, e);
            }
            for e in rhs {
                walk_expr(v, e);
            }
        }
        StmtKind::Decl { decl } => {
            for spec in &decl.specs {
                if let super::decl::Spec::Value(value) = spec {
                    for e in &value.values {
                        walk_expr(v, e);
                    }
                }
            }
        }
        StmtKind::Return { results } => {
            for e in results {
                walk_expr(v, e);
            }
        }
        StmtKind::Block { block } => walk_block(v, block),
        StmtKind::If {
            init,
            cond,
            then,
            els,
        } => {
            if let Some(init) = init {
                walk_stmt(v, init);
            }
            walk_expr(v, cond);
            walk_block(v, then);
            if let Some(els) = els {
                walk_stmt(v, els);
            }
        }
        StmtKind::For {
            init,
            cond,
            post,
            body,
        } => {
            if let Some(init) = init {
                walk_stmt(v, init);
            }
            if let Some(cond) = cond {
                walk_expr(v, cond);
            }
            if let Some(post) = post {
                walk_stmt(v, post);
            }
            walk_block(v, body);
        }
        StmtKind::Range {
            key, value, x, body, ..
        } => {
            if let Some(key) = key {
                walk_expr(v, key);
            }
            if let Some(value) = value {
                walk_expr(v, value);
            }
            walk_expr(v, x);
            walk_block(v, body);
        }
        StmtKind::Switch { init, tag, cases } => {
            if let Some(init) = init {
                walk_stmt(v, init);
            }
            if let Some(tag) = tag {
                walk_expr(v, tag);
            }
            walk_cases(v, cases);
        }
        StmtKind::TypeSwitch {
            init,
            assign,
            cases,
        } => {
            if let Some(init) = init {
                walk_stmt(v, init);
            }
            walk_stmt(v, assign);
            walk_cases(v, cases);
        }
        StmtKind::Go { call } | StmtKind::Defer { call } => walk_expr(v, call),
        StmtKind::IncDec { x, .. } => walk_expr(v, x),
        StmtKind::Send { chan, value } => {
            walk_expr(v, chan);
            walk_expr(v, value);
        }
        StmtKind::Labeled { stmt, .. } => walk_stmt(v, stmt),
        StmtKind::Branch { .. } | StmtKind::Empty => {}
    }
}

/// Walk one expression and its children.
pub fn walk_expr<V: Visitor>(v: &mut V, expr: &Expr) {
    if !v.visit_expr(expr) {
        return;
    }
    match &expr.kind {
        ExprKind::Ident { .. } | ExprKind::BasicLit { .. } | ExprKind::Bad => {}
        ExprKind::Selector { x, sel } => {
            walk_expr(v, x);
            walk_expr(v, sel);
        }
        ExprKind::Call { fun, args, .. } => {
            walk_expr(v, fun);
            for arg in args {
                walk_expr(v, arg);
            }
        }
        ExprKind::Unary { x, .. }
        | ExprKind::Star { x }
        | ExprKind::Paren { x } => walk_expr(v, x),
        ExprKind::Binary { x, y, .. } => {
            walk_expr(v, x);
            walk_expr(v, y);
        }
        ExprKind::Ellipsis { elt } => {
            if let Some(elt) = elt {
                walk_expr(v, elt);
            }
        }
        ExprKind::CompositeLit { typ, elts } => {
            if let Some(typ) = typ {
                walk_expr(v, typ);
            }
            for elt in elts {
                walk_expr(v, elt);
            }
        }
        ExprKind::Index { x, index } => {
            walk_expr(v, x);
            walk_expr(v, index);
        }
        ExprKind::IndexList { x, indices } => {
            walk_expr(v, x);
            for index in indices {
                walk_expr(v, index);
            }
        }
        ExprKind::Slice { x, low, high, max } => {
            walk_expr(v, x);
            for part in [low, high, max].into_iter().flatten() {
                walk_expr(v, part);
            }
        }
        ExprKind::KeyValue { key, value } => {
            walk_expr(v, key);
            walk_expr(v, value);
        }
        ExprKind::TypeAssert { x, typ } => {
            walk_expr(v, x);
            if let Some(typ) = typ {
                walk_expr(v, typ);
            }
        }
        ExprKind::ArrayType { len, elt } => {
            if let Some(len) = len {
                walk_expr(v, len);
            }
            walk_expr(v, elt);
        }
        ExprKind::ChanType { value, .. } => walk_expr(v, value),
        ExprKind::MapType { key, value } => {
            walk_expr(v, key);
            walk_expr(v, value);
        }
        ExprKind::StructType { fields } => walk_fields(v, fields),
        ExprKind::InterfaceType { methods } => walk_fields(v, methods),
        ExprKind::FuncType {
            type_params,
            params,
            results,
        } => {
            walk_fields(v, type_params);
            walk_fields(v, params);
            walk_fields(v, results);
        }
        ExprKind::FuncLit { typ, body } => {
            walk_expr(v, typ);
            walk_block(v, body);
        }
    }
}
