//! Call-graph edges.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use srcgraph_core::types::{StringPool, EMPTY_ID};

use super::call::Call;
use super::call_argument::CallArgument;
use super::entities::Assignment;

/// One record in the call graph: caller, callee, and the bindings at the
/// call site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallGraphEdge {
    pub caller: Call,
    pub callee: Call,
    pub position: i32,
    pub args: Vec<CallArgument>,
    /// The callee body's assignments, keyed by var-name id, captured so
    /// consumers can ask what the callee assigns without a second walk.
    pub assignment_map: BTreeMap<i32, Vec<Assignment>>,
    /// Declared parameter name id → argument bound at this site.
    pub param_arg_map: BTreeMap<i32, CallArgument>,
    /// Type-param name id → concrete type string id.
    pub type_param_map: BTreeMap<i32, i32>,
    /// Receiver variable the callee was reached through, if any.
    pub callee_var_name: i32,
    /// Variable receiving the call's return, if any.
    pub callee_recv_var_name: i32,
    /// Edge index of the inner call when the receiver is itself a call.
    pub chain_parent: Option<u32>,
    /// Leftmost receiver variable of the chain.
    pub chain_root: i32,
    /// Number of call links in the receiver chain (0 = plain receiver).
    pub chain_depth: u32,
    /// BaseID of the enclosing declared function when the caller is a
    /// function literal.
    pub parent_function: i32,
}

impl CallGraphEdge {
    pub fn new(caller: Call, callee: Call, position: i32) -> Self {
        Self {
            caller,
            callee,
            position,
            args: Vec::new(),
            assignment_map: BTreeMap::new(),
            param_arg_map: BTreeMap::new(),
            type_param_map: BTreeMap::new(),
            callee_var_name: EMPTY_ID,
            callee_recv_var_name: EMPTY_ID,
            chain_parent: None,
            chain_root: EMPTY_ID,
            chain_depth: 0,
            parent_function: EMPTY_ID,
        }
    }

    /// Caller BaseID under this edge's generics.
    pub fn caller_base_id<'a>(&'a self, pool: &StringPool) -> &'a str {
        self.caller.base_id(pool)
    }

    /// Callee BaseID under this edge's generics.
    pub fn callee_base_id<'a>(&'a self, pool: &StringPool) -> &'a str {
        self.callee.base_id(pool)
    }

    /// Callee GenericID under this edge's generics.
    pub fn callee_generic_id<'a>(&'a self, pool: &StringPool) -> &'a str {
        self.callee.generic_id(&self.type_param_map, pool)
    }

    /// Callee InstanceID under this edge's generics.
    pub fn callee_instance_id<'a>(&'a self, pool: &StringPool) -> &'a str {
        self.callee.instance_id(&self.type_param_map, pool)
    }
}
