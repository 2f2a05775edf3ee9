//! Performance-oriented collection types shared across the workspace.
//!
//! Map- and set-shaped state goes through these re-exports so every crate
//! hashes with the same (fast, non-DoS-hardened) hasher.

pub use rustc_hash::{FxHashMap, FxHashSet};
pub use smallvec::SmallVec;

/// SmallVec sized for type-parameter lists (usually <2).
pub type SmallVec2<T> = SmallVec<[T; 2]>;
