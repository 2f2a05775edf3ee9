//! The universal expression node of the metadata graph.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use srcgraph_core::types::{StringPool, EMPTY_ID};

/// Tag identifying the shape of a [`CallArgument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgKind {
    Ident,
    Literal,
    Selector,
    Call,
    TypeConversion,
    Unary,
    Binary,
    Star,
    Paren,
    Ellipsis,
    CompositeLit,
    Index,
    IndexList,
    Slice,
    KeyValue,
    TypeAssert,
    ArrayType,
    ChanType,
    MapType,
    StructType,
    InterfaceType,
    Field,
    Embed,
    FuncType,
    FuncResults,
    FuncLit,
    Raw,
}

/// One expression in the graph: a tagged union over [`ArgKind`] with
/// shared payload slots. Absent ids carry the `-1` sentinel; absent child
/// slots are `None`.
///
/// Payload discipline per kind follows the extraction rules: `binary`
/// keeps its RHS in `fun`, `index` keeps its subscript in `fun`,
/// `key_value` keeps its value in `fun`, `composite_lit` keeps its type
/// in `x` and its elements in `args`, `func_type` keeps parameters in
/// `args` and a `func_results` node in `fun`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallArgument {
    pub kind: ArgKind,
    pub name: i32,
    pub pkg: i32,
    #[serde(rename = "type")]
    pub typ: i32,
    pub value: i32,
    pub position: i32,
    pub x: Option<Box<CallArgument>>,
    pub sel: Option<Box<CallArgument>>,
    pub fun: Option<Box<CallArgument>>,
    pub args: Vec<CallArgument>,
    /// param-name id → bound argument, for `call` kinds.
    pub param_arg_map: BTreeMap<i32, CallArgument>,
    /// type-param-name id → concrete type string id.
    pub type_param_map: BTreeMap<i32, i32>,
    pub resolved_type: i32,
    pub is_generic_type: bool,
    pub generic_type_name: i32,
    /// Weak back-reference to the owning call-graph edge, as an index
    /// into `Metadata::call_graph`. Rebuilt on load, never serialized.
    #[serde(skip)]
    pub edge: Option<u32>,
}

impl CallArgument {
    /// A node of the given kind with every payload slot absent.
    pub fn new(kind: ArgKind) -> Self {
        Self {
            kind,
            name: EMPTY_ID,
            pkg: EMPTY_ID,
            typ: EMPTY_ID,
            value: EMPTY_ID,
            position: EMPTY_ID,
            x: None,
            sel: None,
            fun: None,
            args: Vec::new(),
            param_arg_map: BTreeMap::new(),
            type_param_map: BTreeMap::new(),
            resolved_type: EMPTY_ID,
            is_generic_type: false,
            generic_type_name: EMPTY_ID,
            edge: None,
        }
    }

    /// A `raw` node carrying the given text. The conservative fallback for
    /// anything the normalizer cannot classify.
    pub fn raw(pool: &StringPool, text: &str) -> Self {
        let mut node = Self::new(ArgKind::Raw);
        node.value = pool.intern(text);
        node
    }

    /// The identifier name when this node is an `ident`.
    pub fn ident_name<'p>(&self, pool: &'p StringPool) -> Option<&'p str> {
        if self.kind == ArgKind::Ident {
            Some(pool.lookup(self.name))
        } else {
            None
        }
    }

    /// Identifier of this node for the argument index: `pkg.name` for
    /// `ident`/`call`/`type_conversion` nodes, empty otherwise.
    pub fn id_string(&self, pool: &StringPool) -> String {
        match self.kind {
            ArgKind::Ident | ArgKind::Call | ArgKind::TypeConversion => {
                let name = pool.lookup(self.name);
                if name.is_empty() {
                    return String::new();
                }
                let pkg = pool.lookup(self.pkg);
                if pkg.is_empty() {
                    name.to_string()
                } else {
                    format!("{pkg}.{name}")
                }
            }
            _ => String::new(),
        }
    }

    /// Deterministic canonical string, stable across runs and independent
    /// of positions. Feeds signature strings and identifiers; two
    /// semantically-equal expressions produce one result.
    pub fn canonical_string(&self, pool: &StringPool) -> String {
        let look = |id: i32| pool.lookup(id);
        let child = |slot: &Option<Box<CallArgument>>| {
            slot.as_ref()
                .map(|c| c.canonical_string(pool))
                .unwrap_or_default()
        };
        let join = |nodes: &[CallArgument]| {
            nodes
                .iter()
                .map(|n| n.canonical_string(pool))
                .collect::<Vec<_>>()
                .join(", ")
        };

        match self.kind {
            ArgKind::Ident => look(self.name).to_string(),
            ArgKind::Literal | ArgKind::Raw => look(self.value).to_string(),
            ArgKind::Selector => format!("{}.{}", child(&self.x), child(&self.sel)),
            ArgKind::Call | ArgKind::TypeConversion => {
                format!("{}({})", child(&self.fun), join(&self.args))
            }
            ArgKind::Unary => format!("{}{}", look(self.value), child(&self.x)),
            ArgKind::Binary => {
                format!("{} {} {}", child(&self.x), look(self.value), child(&self.fun))
            }
            ArgKind::Star => format!("*{}", child(&self.x)),
            ArgKind::Paren => format!("({})", child(&self.x)),
            ArgKind::Ellipsis => format!("...{}", child(&self.x)),
            ArgKind::CompositeLit => format!("{}{{{}}}", child(&self.x), join(&self.args)),
            ArgKind::Index => format!("{}[{}]", child(&self.x), child(&self.fun)),
            ArgKind::IndexList => format!("{}[{}]", child(&self.x), join(&self.args)),
            ArgKind::Slice => format!("{}[{}]", child(&self.x), join(&self.args)),
            ArgKind::KeyValue => format!("{}: {}", child(&self.x), child(&self.fun)),
            ArgKind::TypeAssert => format!("{}.({})", child(&self.x), child(&self.fun)),
            ArgKind::ArrayType => {
                let len = look(self.value);
                format!("[{}]{}", len, child(&self.x))
            }
            ArgKind::ChanType => format!("{} {}", look(self.value), child(&self.x)),
            ArgKind::MapType => format!("map[{}]{}", child(&self.x), child(&self.fun)),
            ArgKind::StructType => format!("struct{{{}}}", join(&self.args)),
            ArgKind::InterfaceType => format!("interface{{{}}}", join(&self.args)),
            // Parameter names are deliberately excluded so that declared
            // and interface-listed signatures compare equal.
            ArgKind::Field => {
                let typ = look(self.typ);
                if typ.is_empty() {
                    look(self.name).to_string()
                } else {
                    typ.to_string()
                }
            }
            ArgKind::Embed => child(&self.x),
            ArgKind::FuncType => {
                let params = join(&self.args);
                let results = self
                    .fun
                    .as_ref()
                    .map(|r| r.canonical_string(pool))
                    .unwrap_or_default();
                if results.is_empty() {
                    format!("func({params})")
                } else {
                    format!("func({params}) {results}")
                }
            }
            ArgKind::FuncResults => {
                if self.args.len() == 1 {
                    self.args[0].canonical_string(pool)
                } else {
                    format!("({})", join(&self.args))
                }
            }
            ArgKind::FuncLit => {
                let typ = child(&self.fun);
                format!("{typ} {{...}}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(pool: &StringPool, name: &str) -> CallArgument {
        let mut node = CallArgument::new(ArgKind::Ident);
        node.name = pool.intern(name);
        node
    }

    #[test]
    fn selector_and_call_forms() {
        let pool = StringPool::new();
        let mut sel = CallArgument::new(ArgKind::Selector);
        sel.x = Some(Box::new(ident(&pool, "h")));
        sel.sel = Some(Box::new(ident(&pool, "Routes")));
        assert_eq!(sel.canonical_string(&pool), "h.Routes");

        let mut call = CallArgument::new(ArgKind::Call);
        call.fun = Some(Box::new(sel));
        assert_eq!(call.canonical_string(&pool), "h.Routes()");
    }

    #[test]
    fn signatures_exclude_parameter_names() {
        let pool = StringPool::new();
        let mut named = CallArgument::new(ArgKind::Field);
        named.name = pool.intern("age");
        named.typ = pool.intern("int");
        let mut unnamed = CallArgument::new(ArgKind::Field);
        unnamed.typ = pool.intern("int");

        let mut with_name = CallArgument::new(ArgKind::FuncType);
        with_name.args = vec![named];
        let mut without_name = CallArgument::new(ArgKind::FuncType);
        without_name.args = vec![unnamed];

        assert_eq!(
            with_name.canonical_string(&pool),
            without_name.canonical_string(&pool)
        );
        assert_eq!(with_name.canonical_string(&pool), "func(int)");
    }

    #[test]
    fn canonical_strings_are_position_independent() {
        let pool = StringPool::new();
        let mut a = ident(&pool, "x");
        a.position = pool.intern("main.go:1:1");
        let mut b = ident(&pool, "x");
        b.position = pool.intern("main.go:9:9");
        assert_eq!(a.canonical_string(&pool), b.canonical_string(&pool));
    }
}
