//! Call-graph construction: ordering, chains, literals, conversions.

mod common;

use common::*;
use srcgraph_analysis::ast::{Decl, Expr, Stmt};
use srcgraph_analysis::metadata::ArgKind;
use srcgraph_analysis::typing::{ObjectInfo, ObjectKind, TypingInfo};

/// `r := NewRouter(); r.Use(mw); r.Mount("/api", h.Routes())`
fn router_file() -> srcgraph_analysis::ast::SourceFile {
    let body = vec![
        Stmt::define(
            vec![Expr::ident("r").at(2, 2)],
            vec![call_at(Expr::ident("NewRouter"), Vec::new(), 2, 7)],
        )
        .at(2, 2),
        Stmt::expr(call_at(
            Expr::selector(Expr::ident("r").at(3, 2), Expr::ident("Use")),
            vec![Expr::ident("mw")],
            3,
            2,
        )),
        Stmt::expr(call_at(
            Expr::selector(Expr::ident("r").at(4, 2), Expr::ident("Mount")),
            vec![
                Expr::str_lit("\"/api\""),
                call_at(
                    Expr::selector(Expr::ident("h").at(4, 18), Expr::ident("Routes")),
                    Vec::new(),
                    4,
                    18,
                ),
            ],
            4,
            2,
        )),
    ];
    source_file(
        "main.go",
        "main",
        vec![
            Decl::Func(plain_func("main", body)),
            Decl::Func(plain_func("NewRouter", Vec::new())),
        ],
    )
}

#[test]
fn nested_call_edges_precede_their_consumers() {
    let meta = extract_single("main", router_file());
    assert_eq!(
        callee_names(&meta),
        vec!["NewRouter", "Use", "Routes", "Mount"]
    );
}

#[test]
fn plain_receiver_chain_depth_is_zero() {
    let meta = extract_single("main", router_file());
    let mount = &meta.call_graph[3];
    assert_eq!(meta.lookup(mount.callee.name), "Mount");
    assert_eq!(mount.chain_depth, 0);
    assert_eq!(mount.chain_parent, None);
    assert_eq!(meta.lookup(mount.callee_var_name), "r");
}

#[test]
fn call_arguments_keep_their_callee_identity() {
    let meta = extract_single("main", router_file());
    let mount = &meta.call_graph[3];
    let arg = &mount.args[1];
    assert_eq!(arg.kind, ArgKind::Call);
    let fun = arg.fun.as_deref().expect("call argument has a fun child");
    assert_eq!(meta.lookup(fun.name), "Routes");
}

#[test]
fn assignment_receiving_a_call_links_the_variable() {
    let meta = extract_single("main", router_file());
    let new_router = &meta.call_graph[0];
    assert_eq!(meta.lookup(new_router.callee.name), "NewRouter");
    assert_eq!(meta.lookup(new_router.callee_recv_var_name), "r");
}

#[test]
fn chained_receiver_calls_thread_parent_root_and_depth() {
    // r := NewRouter(); r.Group().With(mw)
    let body = vec![
        Stmt::define(
            vec![Expr::ident("r").at(2, 2)],
            vec![call_at(Expr::ident("NewRouter"), Vec::new(), 2, 7)],
        )
        .at(2, 2),
        Stmt::expr(call_at(
            Expr::selector(
                call_at(
                    Expr::selector(Expr::ident("r").at(3, 2), Expr::ident("Group")),
                    Vec::new(),
                    3,
                    2,
                ),
                Expr::ident("With"),
            ),
            vec![Expr::ident("mw")],
            3,
            12,
        )),
    ];
    let file = source_file(
        "main.go",
        "main",
        vec![
            Decl::Func(plain_func("main", body)),
            Decl::Func(plain_func("NewRouter", Vec::new())),
        ],
    );
    let meta = extract_single("main", file);

    assert_eq!(callee_names(&meta), vec!["NewRouter", "Group", "With"]);
    let group_idx = 1u32;
    let with = &meta.call_graph[2];
    assert_eq!(with.chain_parent, Some(group_idx));
    assert_eq!(with.chain_depth, 1);
    assert_eq!(meta.lookup(with.chain_root), "r");
}

#[test]
fn function_literals_are_distinct_callers_with_a_parent() {
    // func main() { h := func() { helper() }; _ = h }
    let lit = Expr::new(srcgraph_analysis::ast::ExprKind::FuncLit {
        typ: Box::new(Expr::new(srcgraph_analysis::ast::ExprKind::FuncType {
            type_params: Vec::new(),
            params: Vec::new(),
            results: Vec::new(),
        })),
        body: srcgraph_analysis::ast::Block::new(vec![Stmt::expr(call_at(
            Expr::ident("helper"),
            Vec::new(),
            3,
            4,
        ))]),
    })
    .at(2, 7);
    let body = vec![Stmt::define(vec![Expr::ident("h").at(2, 2)], vec![lit]).at(2, 2)];
    let file = source_file(
        "main.go",
        "main",
        vec![
            Decl::Func(plain_func("main", body)),
            Decl::Func(plain_func("helper", Vec::new())),
        ],
    );
    let meta = extract_single("main", file);

    assert_eq!(meta.call_graph.len(), 1);
    let edge = &meta.call_graph[0];
    assert_eq!(meta.lookup(edge.callee.name), "helper");
    assert!(meta.lookup(edge.caller.name).starts_with("funclit:"));
    assert_eq!(meta.lookup(edge.parent_function), "main.main");
    assert!(meta.indexes.parent_functions.contains_key("main.main"));
}

#[test]
fn type_conversions_are_not_calls() {
    // x := ID(5) where ID is a type name.
    let mut id_expr = Expr::ident("ID");
    id_expr.id = 1;
    let body = vec![Stmt::define(
        vec![Expr::ident("x").at(2, 2)],
        vec![call_at(id_expr, vec![Expr::int_lit("5")], 2, 7)],
    )
    .at(2, 2)];
    let file = source_file("main.go", "main", vec![Decl::Func(plain_func("main", body))]);
    let typing =
        TypingInfo::new().with_object(1, ObjectInfo::new(ObjectKind::TypeName).with_pkg("main"));
    let meta = extract_input(&typed_input("main", file, typing));

    assert!(meta.call_graph.is_empty());
}

#[test]
fn mock_named_endpoints_are_skipped() {
    let body = vec![
        Stmt::expr(call_at(Expr::ident("MockServer"), Vec::new(), 2, 2)),
        Stmt::expr(call_at(Expr::ident("helper"), Vec::new(), 3, 2)),
    ];
    let file = source_file(
        "main.go",
        "main",
        vec![
            Decl::Func(plain_func("main", body)),
            Decl::Func(plain_func("helper", Vec::new())),
        ],
    );
    let meta = extract_single("main", file);

    assert_eq!(callee_names(&meta), vec!["helper"]);
}

#[test]
fn entry_function_call_results_land_in_its_assignment_map() {
    let meta = extract_single("main", router_file());
    let main_fn = meta.find_function("main", "main").expect("main exists");
    let r_id = meta.pool.get("r").expect("r interned");
    let entries = main_fn.assignment_map.get(&r_id).expect("r assignments");
    assert!(!entries.is_empty());
    let from_call = &entries[0];
    assert_eq!(meta.lookup(from_call.callee_func), "NewRouter");
    assert_eq!(from_call.return_index, Some(0));
}
