//! Named entities of the metadata graph.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use srcgraph_core::types::collections::SmallVec2;
use srcgraph_core::types::EMPTY_ID;

use super::call_argument::CallArgument;

/// Visibility of a declared name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Exported,
    Unexported,
}

impl Scope {
    /// Scope of a declared name: exported iff the first character is
    /// uppercase.
    pub fn of(name: &str) -> Self {
        if name.chars().next().is_some_and(|c| c.is_uppercase()) {
            Self::Exported
        } else {
            Self::Unexported
        }
    }
}

/// Classification of a named type declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Struct,
    Interface,
    Alias,
    Other,
}

/// Declaration token of a [`Variable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarTok {
    Var,
    Const,
}

/// A named type: struct, interface, alias, or other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Type {
    pub name: i32,
    pub pkg: i32,
    pub kind: TypeKind,
    /// Alias target for `kind == Alias`.
    pub target: i32,
    /// Interned `pkg.Name` ids of interfaces this type satisfies.
    pub implements: Vec<i32>,
    /// Interned `pkg.Name` ids of structs satisfying this interface.
    pub implemented_by: Vec<i32>,
    /// Embedded type names.
    pub embeds: Vec<i32>,
    pub fields: Vec<Field>,
    pub methods: Vec<Method>,
    pub scope: Scope,
    pub comments: i32,
    pub tags: Vec<i32>,
}

impl Type {
    pub fn new(name: i32, pkg: i32, kind: TypeKind, scope: Scope) -> Self {
        Self {
            name,
            pkg,
            kind,
            target: EMPTY_ID,
            implements: Vec::new(),
            implemented_by: Vec::new(),
            embeds: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            scope,
            comments: EMPTY_ID,
            tags: Vec::new(),
        }
    }
}

/// A struct field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: i32,
    #[serde(rename = "type")]
    pub typ: i32,
    pub tag: i32,
    pub scope: Scope,
    pub comments: i32,
    /// Present when the field's type is an anonymous struct literal.
    pub nested_type: Option<Box<Type>>,
}

/// A method: a function declared with a receiver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Method {
    pub name: i32,
    /// Receiver type, pointer form preserved (`*User`).
    pub receiver: i32,
    pub signature: CallArgument,
    pub signature_str: i32,
    pub position: i32,
    pub scope: Scope,
    pub comments: i32,
    pub tags: Vec<i32>,
    pub type_params: SmallVec2<i32>,
    pub return_vars: Vec<CallArgument>,
    /// var-name id → assignments to it inside the body.
    pub assignment_map: BTreeMap<i32, Vec<Assignment>>,
    pub filename: i32,
}

/// A top-level function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub name: i32,
    pub pkg: i32,
    pub signature: CallArgument,
    pub signature_str: i32,
    pub position: i32,
    pub scope: Scope,
    pub comments: i32,
    pub tags: Vec<i32>,
    pub type_params: SmallVec2<i32>,
    pub return_vars: Vec<CallArgument>,
    pub assignment_map: BTreeMap<i32, Vec<Assignment>>,
}

/// A package-level variable or constant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: i32,
    pub pkg: i32,
    pub tok: VarTok,
    #[serde(rename = "type")]
    pub typ: i32,
    pub resolved_type: i32,
    /// Source-level value expression, canonical form.
    pub value: i32,
    /// Checker-evaluated value, opaque; constants only.
    pub computed_value: i32,
    pub position: i32,
    pub comments: i32,
    /// Position within a grouped const declaration, for iota-like runs.
    pub group_index: i32,
}

/// A struct-literal occurrence `TypeName{ … }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructInstance {
    #[serde(rename = "type")]
    pub typ: i32,
    pub pkg: i32,
    pub position: i32,
    /// key id → value id, canonical strings.
    pub fields: BTreeMap<i32, i32>,
}

/// One assignment to a variable, selector, or index expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub variable_name: i32,
    pub pkg: i32,
    pub concrete_type: i32,
    pub position: i32,
    pub scope: Scope,
    pub value: CallArgument,
    pub lhs: CallArgument,
    /// Enclosing function name.
    pub func: i32,
    /// Callee name when the RHS is a call.
    pub callee_func: i32,
    pub callee_pkg: i32,
    /// Which return value flows in; recorded as 0 for every call RHS.
    pub return_index: Option<u32>,
}

/// An explicit interface→concrete resolution recorded at a struct-literal
/// site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceResolution {
    pub interface_type: i32,
    pub struct_type: i32,
    pub pkg: i32,
    pub concrete_type: i32,
    pub position: i32,
}

/// A compiled package: canonical type map plus its files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Package {
    /// Canonical home of the package's named types; the resolution passes
    /// mutate these entries.
    pub types: BTreeMap<String, Type>,
    pub files: BTreeMap<String, File>,
    /// `(interface.struct)` key → resolution recorded at a literal site.
    pub interface_resolutions: BTreeMap<String, InterfaceResolution>,
}

/// One source file's harvest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct File {
    /// Declaration-site snapshot of the types declared in this file.
    pub types: BTreeMap<String, Type>,
    pub functions: Vec<Function>,
    pub variables: Vec<Variable>,
    pub struct_instances: Vec<StructInstance>,
    /// alias id → import path id.
    pub imports: BTreeMap<i32, i32>,
}
