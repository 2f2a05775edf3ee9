//! Top-level and in-body declarations.

use super::expr::{Expr, FieldDecl, Pos};
use super::stmt::{Block, DeclTok};

/// A top-level declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    Func(FuncDecl),
    Gen(GenDecl),
}

/// A function or method declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncDecl {
    /// Function name as an `Ident` expression (carries the typing key).
    pub name: Expr,
    /// Receiver field for methods; `None` for plain functions.
    pub recv: Option<FieldDecl>,
    pub type_params: Vec<FieldDecl>,
    pub params: Vec<FieldDecl>,
    pub results: Vec<FieldDecl>,
    /// Absent for bodyless declarations.
    pub body: Option<Block>,
    pub doc: String,
    pub pos: Pos,
}

impl FuncDecl {
    pub fn new(name: Expr) -> Self {
        Self {
            name,
            recv: None,
            type_params: Vec::new(),
            params: Vec::new(),
            results: Vec::new(),
            body: None,
            doc: String::new(),
            pos: Pos::default(),
        }
    }

    /// The declared name.
    pub fn name_str(&self) -> &str {
        self.name.ident_name().unwrap_or("")
    }
}

/// A grouped `var`/`const`/`type`/`import` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct GenDecl {
    pub tok: DeclTok,
    pub specs: Vec<Spec>,
    pub doc: String,
    pub pos: Pos,
}

/// One spec inside a [`GenDecl`].
#[derive(Debug, Clone, PartialEq)]
pub enum Spec {
    Value(ValueSpec),
    Type(TypeSpec),
    Import(ImportSpec),
}

/// `name... [type] [= values...]` inside a `var` or `const` group.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueSpec {
    pub names: Vec<Expr>,
    pub typ: Option<Expr>,
    pub values: Vec<Expr>,
    pub doc: String,
    pub pos: Pos,
}

/// `type Name[TypeParams] = Target` or `type Name[TypeParams] Underlying`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSpec {
    pub name: Expr,
    /// `true` for `type A = B` alias form.
    pub assign: bool,
    pub type_params: Vec<FieldDecl>,
    pub typ: Expr,
    pub doc: String,
    pub pos: Pos,
}

/// `import [alias] "path"`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportSpec {
    /// Local alias; `None` means the package's own name applies.
    pub alias: Option<String>,
    pub path: String,
    pub pos: Pos,
}
