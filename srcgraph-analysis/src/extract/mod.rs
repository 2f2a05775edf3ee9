//! The extraction pipeline.
//!
//! Stages run in a fixed order over the pre-parsed input: harvest
//! packages, resolve interfaces, build the call graph, index it,
//! propagate generics, resolve return types. Caches unlock only once
//! every package is registered.

mod assignments;
mod callgraph;
mod harvester;
mod normalizer;
mod stats;

pub use stats::ExtractionStats;

pub(crate) use harvester::PendingResolution;

use std::sync::OnceLock;

use regex::Regex;
use tracing::info;

use srcgraph_core::constants;
use srcgraph_core::errors::ExtractError;
use srcgraph_core::types::collections::FxHashMap;

use crate::ast::Pos;
use crate::metadata::Metadata;
use crate::typing::{ObjectInfo, TypingInfo};
use crate::typing::PackageSet;

/// Per-file context threaded through every harvesting step.
pub(crate) struct FileCtx<'a> {
    pub pkg_path: &'a str,
    pub file_path: &'a str,
    pub module_path: &'a str,
    pub typing: Option<&'a TypingInfo>,
    /// Local import name (alias or last path segment) → import path.
    pub aliases: FxHashMap<String, String>,
    /// Type parameters of the enclosing function, for generic marking.
    pub type_params: Vec<String>,
}

impl<'a> FileCtx<'a> {
    pub fn new(
        input: &'a PackageSet,
        pkg_path: &'a str,
        file_path: &'a str,
        file: &crate::ast::SourceFile,
    ) -> Self {
        let mut aliases = FxHashMap::default();
        for import in &file.imports {
            let local = import
                .alias
                .clone()
                .unwrap_or_else(|| last_path_segment(&import.path).to_string());
            aliases.insert(local, import.path.clone());
        }
        Self {
            pkg_path,
            file_path,
            module_path: &input.module_path,
            typing: input.typing_for(file_path),
            aliases,
            type_params: Vec::new(),
        }
    }

    pub fn object_of(&self, id: crate::ast::NodeId) -> Option<&'a ObjectInfo> {
        self.typing.and_then(|t| t.object_of(id))
    }

    pub fn type_of(&self, id: crate::ast::NodeId) -> Option<&'a str> {
        self.typing.and_then(|t| t.type_of(id))
    }

    /// Intern the `file:line:col` position string; zero positions stay
    /// absent.
    pub fn pos_id(&self, meta: &Metadata, pos: Pos) -> i32 {
        if pos.is_zero() {
            return srcgraph_core::types::EMPTY_ID;
        }
        meta.intern(&format!("{}:{}:{}", self.file_path, pos.line, pos.col))
    }
}

pub(crate) fn last_path_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Whether a name matches the mock/fake/stub filter.
pub(crate) fn is_mock_name(name: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(constants::MOCK_NAME_PATTERN).expect("mock name pattern is valid")
    });
    !name.is_empty() && re.is_match(name)
}

/// Run the full pipeline over `input`, producing the metadata graph.
pub fn extract(input: &PackageSet) -> Result<Metadata, ExtractError> {
    extract_with_stats(input).map(|(meta, _)| meta)
}

/// Run the full pipeline, returning the graph and its counters.
pub fn extract_with_stats(
    input: &PackageSet,
) -> Result<(Metadata, ExtractionStats), ExtractError> {
    if input.packages.is_empty() {
        return Err(ExtractError::NoPackages);
    }
    for (pkg_path, files) in &input.packages {
        if files.is_empty() {
            return Err(ExtractError::NoFiles {
                pkg: pkg_path.clone(),
            });
        }
    }

    let mut meta = Metadata::new();
    let mut stats = ExtractionStats::default();
    let mut pending = Vec::new();

    for (pkg_path, files) in &input.packages {
        harvester::harvest_package(&mut meta, input, pkg_path, files, &mut pending, &mut stats);
        stats.packages += 1;
    }
    // Every package is registered from here on; memoization is safe.
    meta.caches.enable();
    info!(
        packages = stats.packages,
        types = stats.types,
        functions = stats.functions,
        methods = stats.methods,
        "harvest complete"
    );

    crate::resolve::resolve_interfaces(&mut meta);
    crate::resolve::apply_pending_resolutions(&mut meta, pending);

    callgraph::build_call_graph(&mut meta, input, &mut stats);
    info!(
        edges = stats.edges_built,
        assignments = stats.assignments_processed,
        "call graph complete"
    );

    crate::graph::build_indexes(&mut meta);
    stats.propagated_edges = crate::graph::propagate_generics(&mut meta);
    crate::resolve::resolve_return_types(&mut meta);

    stats.pool_size = meta.pool.len();
    info!(
        edges = meta.call_graph.len(),
        pool = stats.pool_size,
        "extraction complete"
    );
    Ok((meta, stats))
}
