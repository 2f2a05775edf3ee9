//! Extraction counters.
//!
//! Analytical failures degrade the graph instead of aborting, so the only
//! visibility into fidelity is this set of counters, logged at the end of
//! each pipeline stage.

/// Counters accumulated across one extraction run.
#[derive(Debug, Clone, Default)]
pub struct ExtractionStats {
    pub packages: usize,
    pub files: usize,
    pub types: usize,
    pub functions: usize,
    pub methods: usize,
    pub variables: usize,
    pub struct_instances: usize,
    pub assignments_processed: usize,
    pub edges_built: usize,
    pub propagated_edges: usize,
    pub skipped_mocks: usize,
    pub raw_fallbacks: usize,
    pub pool_size: usize,
}
