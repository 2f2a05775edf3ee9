//! Pre-parsed syntax-tree model consumed by the extraction pipeline.
//!
//! This is the input boundary: an external parser produces these trees and
//! an external type checker produces the [`crate::typing::TypingInfo`]
//! keyed by the `NodeId`s carried on expression nodes. The extractor never
//! parses or type-checks on its own.

pub mod decl;
pub mod expr;
pub mod stmt;
pub mod walk;

pub use decl::{Decl, FuncDecl, GenDecl, ImportSpec, Spec, TypeSpec, ValueSpec};
pub use expr::{ChanDir, Expr, ExprKind, FieldDecl, LitKind, Pos};
pub use stmt::{AssignOp, Block, CaseClause, DeclTok, Stmt, StmtKind};
pub use walk::{walk_block, walk_expr, walk_stmt, Visitor};

/// Key tying an expression node to its type-checker records.
///
/// `0` means "no typing information was recorded for this node".
pub type NodeId = u32;

/// A single source file: package clause, imports, declarations.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    /// Path of the file, used in position strings.
    pub path: String,
    /// Declared package name.
    pub pkg_name: String,
    /// Import specs in declaration order.
    pub imports: Vec<ImportSpec>,
    /// Top-level declarations in source order.
    pub decls: Vec<Decl>,
}
