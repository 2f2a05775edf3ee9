//! Shared constants for the srcgraph metadata engine.

/// srcgraph version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the entry function. Entry functions are always call-graph roots.
pub const ENTRY_FUNCTION: &str = "main";

/// Cap on immediate self-recursive edges during caller-children traversal.
pub const MAX_SELF_CALLING_DEPTH: usize = 50;

/// Pattern matching mock/fake/stub names in prefix, suffix, or delimited
/// position. Entities whose names match are excluded from extraction.
pub const MOCK_NAME_PATTERN: &str =
    r"(?i)(^(mock|fake|stub|mocked))|((mock|fake|stub|mocked)$)|(_(mock|fake|stub|mocked)_)";

/// File suffix for the serialized string pool document.
pub const POOL_DOC_SUFFIX: &str = "string-pool";

/// File suffix for the serialized packages document.
pub const PACKAGES_DOC_SUFFIX: &str = "packages";

/// File suffix for the serialized call-graph document.
pub const CALL_GRAPH_DOC_SUFFIX: &str = "call-graph";

/// Built-in primitive type names of the target language.
pub const PRIMITIVE_TYPES: &[&str] = &[
    "string",
    "bool",
    "int",
    "int8",
    "int16",
    "int32",
    "int64",
    "uint",
    "uint8",
    "uint16",
    "uint32",
    "uint64",
    "uintptr",
    "byte",
    "rune",
    "float32",
    "float64",
    "complex64",
    "complex128",
    "error",
    "any",
];

/// Whether `name` is a built-in primitive type of the target language.
pub fn is_primitive(name: &str) -> bool {
    PRIMITIVE_TYPES.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_table_lookup() {
        assert!(is_primitive("string"));
        assert!(is_primitive("uint8"));
        assert!(!is_primitive("Config"));
        assert!(!is_primitive(""));
    }
}
