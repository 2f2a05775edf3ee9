//! Type-checker facade.
//!
//! The checker runs externally; this module defines the records it hands
//! over, keyed by the [`NodeId`]s on expression nodes. Missing records are
//! normal — every consumer degrades conservatively when a lookup fails.

use std::collections::BTreeMap;

use srcgraph_core::types::collections::FxHashMap;

use crate::ast::{NodeId, SourceFile};

/// What an identifier refers to, per the type checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// An imported package name.
    PkgName,
    Const,
    TypeName,
    Var,
    Func,
    Builtin,
    Nil,
}

/// Checker record for one identifier use.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectInfo {
    pub kind: ObjectKind,
    /// Defining package path, if the object belongs to a package.
    pub pkg: Option<String>,
    /// The object's type string, as the checker prints it.
    pub type_string: Option<String>,
}

impl ObjectInfo {
    pub fn new(kind: ObjectKind) -> Self {
        Self {
            kind,
            pkg: None,
            type_string: None,
        }
    }

    pub fn with_pkg(mut self, pkg: impl Into<String>) -> Self {
        self.pkg = Some(pkg.into());
        self
    }

    pub fn with_type(mut self, type_string: impl Into<String>) -> Self {
        self.type_string = Some(type_string.into());
        self
    }
}

/// Checker-evaluated constant value with its underlying type.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstValue {
    pub value: String,
    pub underlying: String,
}

/// All checker records for one file.
#[derive(Debug, Clone, Default)]
pub struct TypingInfo {
    objects: FxHashMap<NodeId, ObjectInfo>,
    types: FxHashMap<NodeId, String>,
    instances: FxHashMap<NodeId, Vec<String>>,
    constants: FxHashMap<NodeId, ConstValue>,
}

impl TypingInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the object an identifier refers to.
    pub fn with_object(mut self, id: NodeId, info: ObjectInfo) -> Self {
        self.objects.insert(id, info);
        self
    }

    /// Record the type of an expression.
    pub fn with_type(mut self, id: NodeId, type_string: impl Into<String>) -> Self {
        self.types.insert(id, type_string.into());
        self
    }

    /// Record the inferred type arguments of a generic instantiation.
    pub fn with_instance(mut self, id: NodeId, type_args: Vec<String>) -> Self {
        self.instances.insert(id, type_args);
        self
    }

    /// Record a checker-evaluated constant.
    pub fn with_constant(mut self, id: NodeId, value: ConstValue) -> Self {
        self.constants.insert(id, value);
        self
    }

    /// The object an identifier refers to, if recorded.
    pub fn object_of(&self, id: NodeId) -> Option<&ObjectInfo> {
        if id == 0 {
            return None;
        }
        self.objects.get(&id)
    }

    /// The type string of an expression, if recorded.
    pub fn type_of(&self, id: NodeId) -> Option<&str> {
        if id == 0 {
            return None;
        }
        self.types.get(&id).map(String::as_str)
    }

    /// The instantiated type arguments of a generic use, if recorded.
    pub fn instance_of(&self, id: NodeId) -> Option<&[String]> {
        if id == 0 {
            return None;
        }
        self.instances.get(&id).map(Vec::as_slice)
    }

    /// The evaluated constant value, if recorded.
    pub fn constant_of(&self, id: NodeId) -> Option<&ConstValue> {
        if id == 0 {
            return None;
        }
        self.constants.get(&id)
    }
}

/// The pipeline input: pre-parsed packages plus their typing records.
///
/// `BTreeMap`s keep package and file iteration deterministic — walk order
/// defines interner id assignment, which defines every output.
#[derive(Debug, Default)]
pub struct PackageSet {
    /// pkg-path → file-path → syntax tree.
    pub packages: BTreeMap<String, BTreeMap<String, SourceFile>>,
    /// file-path → checker records for that file.
    pub typing: FxHashMap<String, TypingInfo>,
    /// Module prefix separating internal packages from external ones.
    pub module_path: String,
}

impl PackageSet {
    pub fn new(module_path: impl Into<String>) -> Self {
        Self {
            packages: BTreeMap::new(),
            typing: FxHashMap::default(),
            module_path: module_path.into(),
        }
    }

    /// Add a file to a package.
    pub fn add_file(&mut self, pkg_path: impl Into<String>, file: SourceFile) {
        self.packages
            .entry(pkg_path.into())
            .or_default()
            .insert(file.path.clone(), file);
    }

    /// Attach typing records for a file path.
    pub fn add_typing(&mut self, file_path: impl Into<String>, info: TypingInfo) {
        self.typing.insert(file_path.into(), info);
    }

    /// Typing records for a file, or an empty stand-in.
    pub fn typing_for(&self, file_path: &str) -> Option<&TypingInfo> {
        self.typing.get(file_path)
    }

    /// Whether `pkg_path` belongs to the module under analysis.
    pub fn is_internal(&self, pkg_path: &str) -> bool {
        !self.module_path.is_empty() && pkg_path.starts_with(&self.module_path)
    }
}
