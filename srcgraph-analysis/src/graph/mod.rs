//! Call-graph indexes, traversal, and the generic propagation pass.

mod index;
mod propagation;
mod traversal;

pub use index::build_indexes;
pub use propagation::propagate_generics;
pub use traversal::{
    call_depth, path, reachable, roots, traverse_caller_children, GraphView,
};
