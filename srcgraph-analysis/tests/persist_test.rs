//! Split-document persistence round-trips.

mod common;

use common::*;
use srcgraph_analysis::ast::{Decl, Expr, Stmt};
use srcgraph_analysis::persist::{document_paths, load_split, write_split};

fn sample_metadata() -> srcgraph_analysis::metadata::Metadata {
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
    ];
    let file = source_file(
        "main.go",
        "main",
        vec![
            Decl::Func(plain_func("main", body)),
            Decl::Func(plain_func("NewRouter", Vec::new())),
        ],
    );
    extract_single("main", file)
}

#[test]
fn write_then_load_round_trips_structurally() {
    let meta = sample_metadata();
    let dir = tempfile::tempdir().expect("tempdir");

    write_split(&meta, dir.path(), "meta").expect("write");
    let loaded = load_split(dir.path(), "meta").expect("load");

    assert_eq!(loaded, meta);
}

#[test]
fn the_three_documents_exist_on_disk() {
    let meta = sample_metadata();
    let dir = tempfile::tempdir().expect("tempdir");
    write_split(&meta, dir.path(), "app").expect("write");

    for path in document_paths(dir.path(), "app") {
        assert!(path.exists(), "{} missing", path.display());
    }
}

#[test]
fn loaded_graphs_rebuild_their_indexes() {
    let meta = sample_metadata();
    let dir = tempfile::tempdir().expect("tempdir");
    write_split(&meta, dir.path(), "meta").expect("write");
    let loaded = load_split(dir.path(), "meta").expect("load");

    assert_eq!(loaded.indexes.callers.len(), meta.indexes.callers.len());
    assert_eq!(loaded.indexes.callees.len(), meta.indexes.callees.len());
    for (i, edge) in loaded.call_graph.iter().enumerate() {
        let caller = edge.caller_base_id(&loaded.pool);
        assert!(loaded.indexes.callers[caller].contains(&(i as u32)));
    }
}

#[test]
fn loading_a_missing_document_fails_with_the_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = load_split(dir.path(), "absent").expect_err("must fail");
    assert!(err.to_string().contains("absent-string-pool.json"));
}

#[test]
fn identifiers_survive_the_round_trip() {
    let meta = sample_metadata();
    let dir = tempfile::tempdir().expect("tempdir");
    write_split(&meta, dir.path(), "meta").expect("write");
    let loaded = load_split(dir.path(), "meta").expect("load");

    for (a, b) in meta.call_graph.iter().zip(loaded.call_graph.iter()) {
        assert_eq!(a.callee_instance_id(&meta.pool), b.callee_instance_id(&loaded.pool));
    }
}
