//! Interface implementation detection and explicit literal resolutions.

mod common;

use common::*;
use srcgraph_analysis::ast::{
    Decl, DeclTok, Expr, ExprKind, FieldDecl, GenDecl, Pos, Spec, Stmt, TypeSpec,
};
use srcgraph_analysis::metadata::{Metadata, TypeKind};

fn type_decl(name: &str, typ: Expr) -> Decl {
    Decl::Gen(GenDecl {
        tok: DeclTok::Type,
        specs: vec![Spec::Type(TypeSpec {
            name: Expr::ident(name),
            assign: false,
            type_params: Vec::new(),
            typ,
            doc: String::new(),
            pos: Pos::default(),
        })],
        doc: String::new(),
        pos: Pos::default(),
    })
}

fn method(recv: &str, name: &str, params: &[(&str, &str)], result: Option<&str>) -> Decl {
    let mut func = func_with_params(name, params, Vec::new());
    func.recv = Some(FieldDecl::new(
        vec![Expr::ident("u")],
        Some(star(Expr::ident(recv))),
    ));
    if let Some(result) = result {
        func = with_result(func, Expr::ident(result));
    }
    Decl::Func(func)
}

fn interface_type(methods: Vec<(&str, Vec<&str>, Option<&str>)>) -> Expr {
    let fields = methods
        .into_iter()
        .map(|(name, params, result)| {
            let params = params
                .into_iter()
                .map(|p| FieldDecl::new(Vec::new(), Some(Expr::ident(p))))
                .collect();
            let results = result
                .map(|r| vec![FieldDecl::new(Vec::new(), Some(Expr::ident(r)))])
                .unwrap_or_default();
            FieldDecl::new(
                vec![Expr::ident(name)],
                Some(Expr::new(ExprKind::FuncType {
                    type_params: Vec::new(),
                    params,
                    results,
                })),
            )
        })
        .collect();
    Expr::new(ExprKind::InterfaceType { methods: fields })
}

fn struct_type(fields: Vec<(&str, &str)>) -> Expr {
    let fields = fields
        .into_iter()
        .map(|(name, typ)| FieldDecl::new(vec![Expr::ident(name)], Some(Expr::ident(typ))))
        .collect();
    Expr::new(ExprKind::StructType { fields })
}

fn example_metadata() -> Metadata {
    let file = source_file(
        "user.go",
        "example",
        vec![
            type_decl("User", struct_type(vec![("name", "string"), ("age", "int")])),
            method("User", "GetName", &[], Some("string")),
            method("User", "SetAge", &[("age", "int")], None),
            type_decl(
                "Namer",
                interface_type(vec![("GetName", Vec::new(), Some("string"))]),
            ),
            type_decl(
                "Ager",
                interface_type(vec![("SetAge", vec!["int"], None)]),
            ),
        ],
    );
    extract_single("example", file)
}

fn resolved_strings(meta: &Metadata, ids: &[i32]) -> Vec<String> {
    ids.iter().map(|&id| meta.lookup(id).to_string()).collect()
}

#[test]
fn structs_with_matching_method_sets_implement_interfaces() {
    let meta = example_metadata();
    let user = meta.find_type("example", "User").expect("User type");
    let implements = resolved_strings(&meta, &user.implements);
    assert!(implements.contains(&"example.Namer".to_string()));
    assert!(implements.contains(&"example.Ager".to_string()));
}

#[test]
fn interfaces_list_their_implementors() {
    let meta = example_metadata();
    for iface in ["Namer", "Ager"] {
        let typ = meta.find_type("example", iface).expect("interface type");
        assert_eq!(typ.kind, TypeKind::Interface);
        let implemented_by = resolved_strings(&meta, &typ.implemented_by);
        assert!(
            implemented_by.contains(&"example.User".to_string()),
            "{iface} should list example.User"
        );
    }
}

#[test]
fn the_implements_query_is_memoized_and_consistent() {
    let meta = example_metadata();
    assert!(meta.implements_interface("example", "User", "example.Namer"));
    assert!(meta.implements_interface("example", "User", "example.Namer"));
    assert!(!meta.implements_interface("example", "User", "example.Ghost"));
}

#[test]
fn a_struct_missing_a_method_does_not_implement() {
    let file = source_file(
        "user.go",
        "example",
        vec![
            type_decl("User", struct_type(vec![("name", "string")])),
            method("User", "GetName", &[], Some("string")),
            type_decl(
                "Full",
                interface_type(vec![
                    ("GetName", Vec::new(), Some("string")),
                    ("SetAge", vec!["int"], None),
                ]),
            ),
        ],
    );
    let meta = extract_single("example", file);
    let user = meta.find_type("example", "User").unwrap();
    assert!(resolved_strings(&meta, &user.implements).is_empty());
}

#[test]
fn signature_mismatch_blocks_implementation() {
    let file = source_file(
        "user.go",
        "example",
        vec![
            type_decl("User", struct_type(vec![("name", "string")])),
            method("User", "GetName", &[], Some("int")),
            type_decl(
                "Namer",
                interface_type(vec![("GetName", Vec::new(), Some("string"))]),
            ),
        ],
    );
    let meta = extract_single("example", file);
    let user = meta.find_type("example", "User").unwrap();
    assert!(resolved_strings(&meta, &user.implements).is_empty());
}

#[test]
fn struct_literal_values_register_explicit_resolutions() {
    // app := App{Store: &MemStore{}}
    let body = vec![Stmt::define(
        vec![Expr::ident("app").at(5, 2)],
        vec![composite(
            Expr::ident("App").at(5, 9),
            vec![key_value(
                Expr::ident("Store"),
                addr_of(composite(Expr::ident("MemStore").at(5, 21), Vec::new())).at(5, 20),
            )],
        )
        .at(5, 9)],
    )
    .at(5, 2)];
    let file = source_file(
        "app.go",
        "example",
        vec![
            type_decl("App", struct_type(vec![("Store", "Store")])),
            type_decl("MemStore", struct_type(Vec::new())),
            Decl::Func(plain_func("main", body)),
        ],
    );
    let meta = extract_single("example", file);

    let pkg = meta.package("example").expect("package");
    let resolution = pkg
        .interface_resolutions
        .get("Store.App")
        .expect("resolution recorded");
    assert_eq!(meta.lookup(resolution.interface_type), "Store");
    assert_eq!(meta.lookup(resolution.struct_type), "App");
    assert_eq!(meta.lookup(resolution.concrete_type), "*MemStore");
}

#[test]
fn struct_instances_capture_literal_fields() {
    let body = vec![Stmt::define(
        vec![Expr::ident("app").at(5, 2)],
        vec![composite(
            Expr::ident("App").at(5, 9),
            vec![key_value(Expr::ident("Store"), Expr::ident("store"))],
        )
        .at(5, 9)],
    )
    .at(5, 2)];
    let file = source_file(
        "app.go",
        "example",
        vec![
            type_decl("App", struct_type(vec![("Store", "Store")])),
            Decl::Func(plain_func("main", body)),
        ],
    );
    let meta = extract_single("example", file);

    let file_entity = &meta.package("example").unwrap().files["app.go"];
    assert_eq!(file_entity.struct_instances.len(), 1);
    let instance = &file_entity.struct_instances[0];
    assert_eq!(meta.lookup(instance.typ), "App");
    let store_id = meta.pool.get("Store").unwrap();
    assert_eq!(meta.lookup(instance.fields[&store_id]), "store");
}
