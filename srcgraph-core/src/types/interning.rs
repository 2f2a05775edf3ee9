//! String interning for every textual attribute of the metadata graph.
//!
//! Uses `lasso::ThreadedRodeo` so interning is cheap during the
//! single-threaded build phase and resolution is safe for concurrent
//! readers once the graph is frozen.
//!
//! Ids are dense integers in `[0, len)`. The empty string is never stored;
//! it is represented by the [`EMPTY_ID`] sentinel.

use std::fmt;

use lasso::{Key, Spur, ThreadedRodeo};
use serde::de::{Deserializer, SeqAccess, Visitor};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

/// Sentinel id for the empty string.
pub const EMPTY_ID: i32 = -1;

/// Append-only pool mapping distinct non-empty strings to dense ids.
///
/// Identical inputs always yield identical ids, id `0` is valid, and no id
/// is ever removed. Serializes as the ordered list of its values, so a
/// deserialized pool assigns the same id to every string.
pub struct StringPool {
    inner: ThreadedRodeo,
}

impl StringPool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self {
            inner: ThreadedRodeo::default(),
        }
    }

    /// Intern `s`, returning its dense id. Empty input returns [`EMPTY_ID`].
    pub fn intern(&self, s: &str) -> i32 {
        if s.is_empty() {
            return EMPTY_ID;
        }
        self.inner.get_or_intern(s).into_usize() as i32
    }

    /// Look up a previously interned string without inserting.
    pub fn get(&self, s: &str) -> Option<i32> {
        if s.is_empty() {
            return Some(EMPTY_ID);
        }
        self.inner.get(s).map(|k| k.into_usize() as i32)
    }

    /// Resolve an id back to its string. [`EMPTY_ID`] and out-of-range ids
    /// resolve to the empty string.
    pub fn lookup(&self, id: i32) -> &str {
        if id < 0 {
            return "";
        }
        Spur::try_from_usize(id as usize)
            .and_then(|key| self.inner.try_resolve(&key))
            .unwrap_or("")
    }

    /// Number of distinct strings in the pool.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterate the pool values in id order.
    pub fn strings(&self) -> impl Iterator<Item = &str> {
        (0..self.len() as i32).map(|id| self.lookup(id))
    }
}

impl Default for StringPool {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StringPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringPool").field("len", &self.len()).finish()
    }
}

impl PartialEq for StringPool {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.strings().eq(other.strings())
    }
}

impl Serialize for StringPool {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for s in self.strings() {
            seq.serialize_element(s)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for StringPool {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PoolVisitor;

        impl<'de> Visitor<'de> for PoolVisitor {
            type Value = StringPool;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an ordered sequence of pool strings")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<StringPool, A::Error> {
                let pool = StringPool::new();
                while let Some(s) = seq.next_element::<String>()? {
                    pool.intern(&s);
                }
                Ok(pool)
            }
        }

        deserializer.deserialize_seq(PoolVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_is_sentinel() {
        let pool = StringPool::new();
        assert_eq!(pool.intern(""), EMPTY_ID);
        assert_eq!(pool.lookup(EMPTY_ID), "");
        assert!(pool.is_empty());
    }

    #[test]
    fn ids_are_dense_and_stable() {
        let pool = StringPool::new();
        let a = pool.intern("alpha");
        let b = pool.intern("beta");
        assert_eq!(a, 0);
        assert_eq!(b, 1);
        assert_eq!(pool.intern("alpha"), a);
        assert_eq!(pool.lookup(a), "alpha");
        assert_eq!(pool.lookup(b), "beta");
    }

    #[test]
    fn out_of_range_lookup_is_empty() {
        let pool = StringPool::new();
        pool.intern("only");
        assert_eq!(pool.lookup(7), "");
        assert_eq!(pool.lookup(-3), "");
    }
}
