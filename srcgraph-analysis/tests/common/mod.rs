//! Shared builders for extraction tests.
#![allow(dead_code)]

use srcgraph_analysis::ast::{
    Block, Decl, Expr, ExprKind, FieldDecl, FuncDecl, SourceFile, Stmt,
};
use srcgraph_analysis::extract;
use srcgraph_analysis::metadata::Metadata;
use srcgraph_analysis::typing::{PackageSet, TypingInfo};

/// A source file with the given declarations and no imports.
pub fn source_file(path: &str, pkg_name: &str, decls: Vec<Decl>) -> SourceFile {
    SourceFile {
        path: path.to_string(),
        pkg_name: pkg_name.to_string(),
        imports: Vec::new(),
        decls,
    }
}

/// A plain function declaration with a body and no parameters.
pub fn plain_func(name: &str, body: Vec<Stmt>) -> FuncDecl {
    let mut func = FuncDecl::new(Expr::ident(name));
    func.body = Some(Block::new(body));
    func
}

/// A function with named parameters (`(name, type)` pairs).
pub fn func_with_params(name: &str, params: &[(&str, &str)], body: Vec<Stmt>) -> FuncDecl {
    let mut func = plain_func(name, body);
    func.params = params
        .iter()
        .map(|(n, t)| FieldDecl::new(vec![Expr::ident(*n)], Some(Expr::ident(*t))))
        .collect();
    func
}

/// Attach a single result type to a function.
pub fn with_result(mut func: FuncDecl, result: Expr) -> FuncDecl {
    func.results = vec![FieldDecl::new(Vec::new(), Some(result))];
    func
}

/// Attach type parameters (`[T any]`-style) to a function.
pub fn with_type_params(mut func: FuncDecl, names: &[&str]) -> FuncDecl {
    func.type_params = names
        .iter()
        .map(|n| FieldDecl::new(vec![Expr::ident(*n)], Some(Expr::ident("any"))))
        .collect();
    func
}

/// A call expression with an explicit position, so instance ids stay
/// distinct across sites.
pub fn call_at(fun: Expr, args: Vec<Expr>, line: u32, col: u32) -> Expr {
    Expr::call(fun, args).at(line, col)
}

/// A `*T` expression.
pub fn star(x: Expr) -> Expr {
    Expr::new(ExprKind::Star { x: Box::new(x) })
}

/// A `&x` expression.
pub fn addr_of(x: Expr) -> Expr {
    Expr::new(ExprKind::Unary {
        op: "&".to_string(),
        x: Box::new(x),
    })
}

/// A `T{key: value, ...}` composite literal.
pub fn composite(typ: Expr, elts: Vec<Expr>) -> Expr {
    Expr::new(ExprKind::CompositeLit {
        typ: Some(Box::new(typ)),
        elts,
    })
}

/// A `key: value` pair inside a composite literal.
pub fn key_value(key: Expr, value: Expr) -> Expr {
    Expr::new(ExprKind::KeyValue {
        key: Box::new(key),
        value: Box::new(value),
    })
}

/// An input with one package and one file.
pub fn single_file_input(pkg: &str, file: SourceFile) -> PackageSet {
    let mut input = PackageSet::new("example.com/app");
    input.add_file(pkg, file);
    input
}

/// An input with one package, one file, and that file's typing records.
pub fn typed_input(pkg: &str, file: SourceFile, typing: TypingInfo) -> PackageSet {
    let path = file.path.clone();
    let mut input = single_file_input(pkg, file);
    input.add_typing(path, typing);
    input
}

/// Run the full pipeline over a one-file package.
pub fn extract_single(pkg: &str, file: SourceFile) -> Metadata {
    extract::extract(&single_file_input(pkg, file)).expect("extraction succeeds")
}

/// Run the full pipeline over an arbitrary input.
pub fn extract_input(input: &PackageSet) -> Metadata {
    extract::extract(input).expect("extraction succeeds")
}

/// Callee names of every edge, in append order.
pub fn callee_names(meta: &Metadata) -> Vec<String> {
    meta.call_graph
        .iter()
        .map(|e| meta.lookup(e.callee.name).to_string())
        .collect()
}
