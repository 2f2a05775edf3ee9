//! Property tests for the interning and identifier invariants.

use proptest::prelude::*;

use srcgraph_analysis::metadata::strip_id;
use srcgraph_core::types::{StringPool, EMPTY_ID};

proptest! {
    #[test]
    fn intern_lookup_round_trips(s in "[a-zA-Z0-9/._-]{1,40}") {
        let pool = StringPool::new();
        let id = pool.intern(&s);
        prop_assert!(id >= 0);
        prop_assert_eq!(pool.lookup(id), s.as_str());
        prop_assert_eq!(pool.intern(&s), id);
    }

    #[test]
    fn distinct_strings_get_dense_ids(values in prop::collection::hash_set("[a-z]{1,12}", 1..50)) {
        let pool = StringPool::new();
        let mut ids: Vec<i32> = values.iter().map(|v| pool.intern(v)).collect();
        ids.sort_unstable();
        ids.dedup();
        prop_assert_eq!(ids.len(), values.len());
        prop_assert_eq!(ids.first().copied(), Some(0));
        prop_assert_eq!(ids.last().copied(), Some(values.len() as i32 - 1));
    }

    #[test]
    fn empty_is_never_a_dense_id(s in "[a-z]{1,10}") {
        let pool = StringPool::new();
        prop_assert_eq!(pool.intern(""), EMPTY_ID);
        prop_assert!(pool.intern(&s) != EMPTY_ID);
    }

    #[test]
    fn strip_removes_generic_and_position_suffixes(
        base in "[a-z]{1,8}\\.[A-Z][a-zA-Z]{0,8}",
        key in "[A-Z]",
        value in "[a-z]{1,8}",
        file in "[a-z]{1,8}",
        line in 1u32..500,
        col in 1u32..120,
    ) {
        let generic = format!("{base}[{key}={value}]");
        let instance = format!("{generic}@{file}.go:{line}:{col}");
        prop_assert_eq!(strip_id(&generic), base.as_str());
        prop_assert_eq!(strip_id(&instance), base.as_str());
        prop_assert_eq!(strip_id(&base), base.as_str());
    }
}
