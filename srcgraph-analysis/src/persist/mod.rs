//! Split-document persistence.
//!
//! The graph serializes into three documents: the ordered string pool,
//! the packages map, and the call-graph sequence. Loading re-interns the
//! pool in order (ids preserved) and performs reference fix-up: derived
//! indexes rebuilt, edge back-references restored, caches left cold.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use srcgraph_core::constants::{CALL_GRAPH_DOC_SUFFIX, PACKAGES_DOC_SUFFIX, POOL_DOC_SUFFIX};
use srcgraph_core::errors::PersistError;
use srcgraph_core::types::StringPool;

use crate::graph::build_indexes;
use crate::metadata::{CallGraphEdge, Metadata, Package};

/// Paths of the three documents for a given base name.
pub fn document_paths(dir: &Path, base: &str) -> [PathBuf; 3] {
    [
        dir.join(format!("{base}-{POOL_DOC_SUFFIX}.json")),
        dir.join(format!("{base}-{PACKAGES_DOC_SUFFIX}.json")),
        dir.join(format!("{base}-{CALL_GRAPH_DOC_SUFFIX}.json")),
    ]
}

/// Write the three split documents under `dir` with the given base name.
pub fn write_split(meta: &Metadata, dir: &Path, base: &str) -> Result<(), PersistError> {
    let [pool_path, packages_path, graph_path] = document_paths(dir, base);
    write_doc(&pool_path, POOL_DOC_SUFFIX, &meta.pool)?;
    write_doc(&packages_path, PACKAGES_DOC_SUFFIX, &meta.packages)?;
    write_doc(&graph_path, CALL_GRAPH_DOC_SUFFIX, &meta.call_graph)?;
    Ok(())
}

/// Load the three split documents and fix up references.
pub fn load_split(dir: &Path, base: &str) -> Result<Metadata, PersistError> {
    let [pool_path, packages_path, graph_path] = document_paths(dir, base);
    let pool: StringPool = read_doc(&pool_path)?;
    let packages: BTreeMap<String, Package> = read_doc(&packages_path)?;
    let call_graph: Vec<CallGraphEdge> = read_doc(&graph_path)?;

    let mut meta = Metadata {
        pool,
        packages,
        call_graph,
        ..Metadata::default()
    };
    build_indexes(&mut meta);
    meta.caches.enable();
    Ok(meta)
}

fn write_doc<T: serde::Serialize>(
    path: &Path,
    document: &str,
    value: &T,
) -> Result<(), PersistError> {
    let encoded = serde_json::to_vec_pretty(value).map_err(|source| PersistError::Encode {
        document: document.to_string(),
        source,
    })?;
    fs::write(path, encoded).map_err(|source| PersistError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn read_doc<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, PersistError> {
    let bytes = fs::read(path).map_err(|source| PersistError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| PersistError::Decode {
        path: path.to_path_buf(),
        source,
    })
}
