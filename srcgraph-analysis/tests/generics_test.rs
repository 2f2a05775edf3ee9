//! Generic type-parameter extraction and propagation.

mod common;

use common::*;
use srcgraph_analysis::ast::{Decl, Expr, ExprKind, Stmt};
use srcgraph_analysis::graph::{build_indexes, propagate_generics};
use srcgraph_analysis::metadata::{Call, CallGraphEdge, Metadata, Scope};
use srcgraph_analysis::trace::trace_variable_origin;
use srcgraph_analysis::typing::TypingInfo;

fn index_call(fun: Expr, index: Expr, args: Vec<Expr>, line: u32, col: u32) -> Expr {
    call_at(
        Expr::new(ExprKind::Index {
            x: Box::new(fun),
            index: Box::new(index),
        }),
        args,
        line,
        col,
    )
}

/// `func Process[T comparable](items []T) T` called as
/// `Process[string]([]string{"hello", "world"})`.
fn generic_file() -> srcgraph_analysis::ast::SourceFile {
    let process = with_type_params(
        func_with_params("Process", &[("items", "T")], Vec::new()),
        &["T"],
    );
    let slice_lit = Expr::new(ExprKind::CompositeLit {
        typ: Some(Box::new(Expr::new(ExprKind::ArrayType {
            len: None,
            elt: Box::new(Expr::ident("string")),
        }))),
        elts: vec![Expr::str_lit("\"hello\""), Expr::str_lit("\"world\"")],
    });
    let body = vec![Stmt::expr(index_call(
        Expr::ident("Process"),
        Expr::ident("string"),
        vec![slice_lit],
        3,
        2,
    ))];
    source_file(
        "main.go",
        "main",
        vec![Decl::Func(process), Decl::Func(plain_func("main", body))],
    )
}

#[test]
fn explicit_type_arguments_fill_the_type_param_map() {
    let meta = extract_single("main", generic_file());
    let edge = meta
        .call_graph
        .iter()
        .find(|e| meta.lookup(e.callee.name) == "Process")
        .expect("Process edge");

    let t_id = meta.pool.get("T").expect("T interned");
    let concrete = edge.type_param_map.get(&t_id).expect("T bound");
    assert_eq!(meta.lookup(*concrete), "string");
}

#[test]
fn generic_id_carries_the_sorted_pairs() {
    let meta = extract_single("main", generic_file());
    let edge = meta
        .call_graph
        .iter()
        .find(|e| meta.lookup(e.callee.name) == "Process")
        .expect("Process edge");
    assert!(edge.callee_generic_id(&meta.pool).ends_with("[T=string]"));
}

#[test]
fn instance_records_resolve_implicit_instantiation() {
    // Process(items) with the checker's instance record supplying [int].
    let process = with_type_params(
        func_with_params("Process", &[("items", "T")], Vec::new()),
        &["T"],
    );
    let mut fun = Expr::ident("Process");
    fun.id = 7;
    let body = vec![Stmt::expr(call_at(fun, vec![Expr::ident("items")], 3, 2))];
    let file = source_file(
        "main.go",
        "main",
        vec![Decl::Func(process), Decl::Func(plain_func("main", body))],
    );
    let typing = TypingInfo::new().with_instance(7, vec!["int".to_string()]);
    let meta = extract_input(&typed_input("main", file, typing));

    let edge = meta
        .call_graph
        .iter()
        .find(|e| meta.lookup(e.callee.name) == "Process")
        .expect("Process edge");
    let t_id = meta.pool.get("T").expect("T interned");
    assert_eq!(meta.lookup(*edge.type_param_map.get(&t_id).unwrap()), "int");
}

#[test]
fn a_generic_function_argument_seeds_the_first_type_param() {
    // func Pick[K any](name string) {}; func Apply[T any](f any) {}
    // func main() { Apply(Pick) }
    let pick = with_type_params(
        func_with_params("Pick", &[("name", "string")], Vec::new()),
        &["K"],
    );
    let apply = with_type_params(
        func_with_params("Apply", &[("f", "any")], Vec::new()),
        &["T"],
    );
    let body = vec![Stmt::expr(call_at(
        Expr::ident("Apply"),
        vec![Expr::ident("Pick")],
        4,
        2,
    ))];
    let file = source_file(
        "main.go",
        "main",
        vec![
            Decl::Func(pick),
            Decl::Func(apply),
            Decl::Func(plain_func("main", body)),
        ],
    );
    let meta = extract_single("main", file);

    let edge = meta
        .call_graph
        .iter()
        .find(|e| meta.lookup(e.callee.name) == "Apply")
        .expect("Apply edge");
    let t_id = meta.pool.get("T").expect("T interned");
    assert_eq!(
        meta.lookup(*edge.type_param_map.get(&t_id).unwrap()),
        "string"
    );
}

#[test]
fn tracing_a_type_parameter_returns_its_concrete_type() {
    let meta = extract_single("main", generic_file());
    let origin = trace_variable_origin(&meta, "T", "Process", "main");
    assert_eq!(origin.typ.as_deref(), Some("string"));
}

#[test]
fn propagation_clones_child_edges_with_the_unioned_map() {
    let mut meta = Metadata::new();
    let pkg = meta.intern("app");
    let t = meta.intern("T");
    let u = meta.intern("U");
    let int_ty = meta.intern("int");
    let string_ty = meta.intern("string");

    let call = |meta: &Metadata, name: &str| {
        Call::new(pkg, meta.intern(name), -1, -1, Scope::of(name))
    };
    // main → Outer carries T=int; Outer → Inner carries only U=string.
    let mut parent = CallGraphEdge::new(call(&meta, "main"), call(&meta, "Outer"), -1);
    parent.type_param_map.insert(t, int_ty);
    let mut child = CallGraphEdge::new(call(&meta, "Outer"), call(&meta, "Inner"), -1);
    child.type_param_map.insert(u, string_ty);
    meta.call_graph.push(parent);
    meta.call_graph.push(child);
    build_indexes(&mut meta);

    let cloned = propagate_generics(&mut meta);
    assert_eq!(cloned, 1);
    assert_eq!(meta.call_graph.len(), 3);

    let clone = &meta.call_graph[2];
    assert_eq!(meta.lookup(*clone.type_param_map.get(&t).unwrap()), "int");
    assert_eq!(
        meta.lookup(*clone.type_param_map.get(&u).unwrap()),
        "string"
    );
    // The clone's identifiers reflect the unioned generics.
    assert!(clone
        .callee_generic_id(&meta.pool)
        .ends_with("[T=int,U=string]"));
    // The original child edge is untouched.
    assert_eq!(meta.call_graph[1].type_param_map.len(), 1);
}
