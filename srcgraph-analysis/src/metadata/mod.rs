//! The Program Metadata Graph data model.
//!
//! Every textual attribute is an interned id into the owning
//! [`Metadata`]'s string pool. Cross-references between entities go
//! through interned ids, string keys, or edge indexes — never owning
//! pointers — so the graph serializes flat and rebuilds its derived
//! indexes on load.

mod call;
mod call_argument;
mod edge;
mod entities;
#[allow(clippy::module_inception)]
mod metadata;

pub use call::{strip_id, Call};
pub use call_argument::{ArgKind, CallArgument};
pub use edge::CallGraphEdge;
pub use entities::{
    Assignment, Field, File, Function, InterfaceResolution, Method, Package, Scope,
    StructInstance, Type, TypeKind, Variable, VarTok,
};
pub use metadata::{Caches, GraphIndexes, Metadata, TraceOrigin};
