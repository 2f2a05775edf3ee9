//! Variable-origin tracing over extracted graphs.

mod common;

use common::*;
use srcgraph_analysis::ast::{
    Decl, DeclTok, Expr, GenDecl, Pos, Spec, Stmt, StmtKind, ValueSpec,
};
use srcgraph_analysis::trace::trace_variable_origin;

#[test]
fn aliased_assignment_chain_traces_to_the_first_variable() {
    // func main() { a := 5; b := a; c := b }
    let body = vec![
        Stmt::define(vec![Expr::ident("a").at(2, 2)], vec![Expr::int_lit("5")]).at(2, 2),
        Stmt::define(vec![Expr::ident("b").at(3, 2)], vec![Expr::ident("a")]).at(3, 2),
        Stmt::define(vec![Expr::ident("c").at(4, 2)], vec![Expr::ident("b")]).at(4, 2),
    ];
    let file = source_file("main.go", "main", vec![Decl::Func(plain_func("main", body))]);
    let meta = extract_single("main", file);

    let origin = trace_variable_origin(&meta, "c", "main", "main");
    assert_eq!(origin.var, "a");
    assert_eq!(origin.pkg, "main");
    assert_eq!(origin.caller, "main");
}

#[test]
fn shadowed_variable_resolves_to_the_inner_assignment() {
    // var x int; func main() { x = 1; { var x int; x = 2; y := x; _ = y } }
    let inner = vec![
        Stmt::new(StmtKind::Decl {
            decl: GenDecl {
                tok: DeclTok::Var,
                specs: vec![Spec::Value(ValueSpec {
                    names: vec![Expr::ident("x").at(4, 8)],
                    typ: Some(Expr::ident("int")),
                    values: Vec::new(),
                    doc: String::new(),
                    pos: Pos::new(4, 4),
                })],
                doc: String::new(),
                pos: Pos::new(4, 4),
            },
        }),
        Stmt::assign(vec![Expr::ident("x").at(5, 4)], vec![Expr::int_lit("2")]).at(5, 4),
        Stmt::define(vec![Expr::ident("y").at(6, 4)], vec![Expr::ident("x")]).at(6, 4),
        Stmt::assign(vec![Expr::ident("_").at(7, 4)], vec![Expr::ident("y")]).at(7, 4),
    ];
    let body = vec![
        Stmt::assign(vec![Expr::ident("x").at(3, 2)], vec![Expr::int_lit("1")]).at(3, 2),
        Stmt::new(StmtKind::Block {
            block: srcgraph_analysis::ast::Block::new(inner),
        }),
    ];
    let var_decl = Decl::Gen(GenDecl {
        tok: DeclTok::Var,
        specs: vec![Spec::Value(ValueSpec {
            names: vec![Expr::ident("x").at(1, 5)],
            typ: Some(Expr::ident("int")),
            values: Vec::new(),
            doc: String::new(),
            pos: Pos::new(1, 1),
        })],
        doc: String::new(),
        pos: Pos::new(1, 1),
    });
    let file = source_file(
        "main.go",
        "main",
        vec![var_decl, Decl::Func(plain_func("main", body))],
    );
    let meta = extract_single("main", file);

    let origin = trace_variable_origin(&meta, "y", "main", "main");
    assert_eq!(origin.var, "x");
    // The latest assignment to x inside main is the inner `x = 2`.
    assert_eq!(origin.typ.as_deref(), Some("2"));
}

#[test]
fn cyclic_aliases_terminate() {
    // func main() { a := b; b := a }
    let body = vec![
        Stmt::define(vec![Expr::ident("a").at(2, 2)], vec![Expr::ident("b")]).at(2, 2),
        Stmt::define(vec![Expr::ident("b").at(3, 2)], vec![Expr::ident("a")]).at(3, 2),
    ];
    let file = source_file("main.go", "main", vec![Decl::Func(plain_func("main", body))]);
    let meta = extract_single("main", file);

    let origin = trace_variable_origin(&meta, "a", "main", "main");
    assert!(origin.var == "a" || origin.var == "b");
}

#[test]
fn parameters_trace_through_their_call_site_arguments() {
    // func main() { c := "host"; connect(c) }
    // func connect(addr string) { ... }
    let main_body = vec![
        Stmt::define(
            vec![Expr::ident("c").at(2, 2)],
            vec![Expr::str_lit("\"host\"")],
        )
        .at(2, 2),
        Stmt::expr(call_at(Expr::ident("connect"), vec![Expr::ident("c")], 3, 2)),
    ];
    let connect = func_with_params("connect", &[("addr", "string")], Vec::new());
    let file = source_file(
        "main.go",
        "main",
        vec![
            Decl::Func(plain_func("main", main_body)),
            Decl::Func(connect),
        ],
    );
    let meta = extract_single("main", file);

    let origin = trace_variable_origin(&meta, "addr", "connect", "main");
    assert_eq!(origin.var, "c");
    assert_eq!(origin.pkg, "main");
    assert_eq!(origin.caller, "main");
}

#[test]
fn assignment_from_call_follows_the_callee_return_variable() {
    // func make_name() string { n := "x"; return n }
    // func main() { v := make_name(); _ = v }
    let make_name = with_result(
        plain_func(
            "make_name",
            vec![
                Stmt::define(
                    vec![Expr::ident("n").at(2, 2)],
                    vec![Expr::str_lit("\"x\"")],
                )
                .at(2, 2),
                Stmt::ret(vec![Expr::ident("n")]).at(3, 2),
            ],
        ),
        Expr::ident("string"),
    );
    let main_body = vec![Stmt::define(
        vec![Expr::ident("v").at(7, 2)],
        vec![call_at(Expr::ident("make_name"), Vec::new(), 7, 7)],
    )
    .at(7, 2)];
    let file = source_file(
        "main.go",
        "main",
        vec![
            Decl::Func(make_name),
            Decl::Func(plain_func("main", main_body)),
        ],
    );
    let meta = extract_single("main", file);

    let origin = trace_variable_origin(&meta, "v", "main", "main");
    assert_eq!(origin.var, "n");
    assert_eq!(origin.caller, "make_name");
}

#[test]
fn unknown_variables_come_back_unchanged() {
    let file = source_file(
        "main.go",
        "main",
        vec![Decl::Func(plain_func("main", Vec::new()))],
    );
    let meta = extract_single("main", file);

    let origin = trace_variable_origin(&meta, "ghost", "main", "main");
    assert_eq!(origin.var, "ghost");
    assert_eq!(origin.pkg, "main");
    assert_eq!(origin.typ, None);
}
