//! Input document discovery.

use std::path::{Path, PathBuf};

use crate::error::{ProtgraphError, ProtgraphResult};

/// One input document and the protein id derived from its filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub path: PathBuf,
    /// Base filename without extension (`P12345.xml` -> `P12345`).
    pub id: String,
}

impl SourceDocument {
    /// Build a document from a path, or `None` if it has no usable file stem.
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let id = path.file_stem()?.to_str()?.to_string();
        Some(Self { path, id })
    }

    pub fn read(&self) -> ProtgraphResult<String> {
        std::fs::read_to_string(&self.path).map_err(|e| ProtgraphError::io(&self.path, e))
    }
}

/// List the regular files in `dir` whose extension matches `extension`
/// (case-insensitive), sorted by path.
pub fn discover_documents(dir: &Path, extension: &str) -> ProtgraphResult<Vec<SourceDocument>> {
    let extension = extension.trim_start_matches('.');
    let entries = std::fs::read_dir(dir).map_err(|e| ProtgraphError::io(dir, e))?;

    let mut documents = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ProtgraphError::io(dir, e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
        if !matches {
            continue;
        }
        if let Some(document) = SourceDocument::from_path(path) {
            documents.push(document);
        }
    }

    documents.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(documents)
}
