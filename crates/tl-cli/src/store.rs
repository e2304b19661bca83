//! Filesystem-backed source store.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern, glob};
use tl_core::{Period, SourceStore, StoreError};

/// Reads log documents from a directory and writes reports to disk.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
    pattern: String,
}

impl FsStore {
    /// Creates a store over `root`, selecting documents matching `pattern`.
    pub fn new(root: impl Into<PathBuf>, pattern: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            pattern: pattern.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns true when `path` would be listed as a source document,
    /// whether or not it exists yet.
    pub fn is_source_path(&self, path: &Path) -> bool {
        let root = self.root.canonicalize().unwrap_or_else(|_| self.root.clone());
        let path = resolve_destination(path);
        let Ok(relative) = path.strip_prefix(&root) else {
            return false;
        };
        let options = MatchOptions {
            require_literal_separator: true,
            ..MatchOptions::new()
        };
        Pattern::new(&self.pattern).is_ok_and(|p| p.matches_path_with(relative, options))
    }
}

/// Absolute form of a possibly missing file, resolving links in its parent.
fn resolve_destination(path: &Path) -> PathBuf {
    if let Ok(resolved) = path.canonicalize() {
        return resolved;
    }
    let path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => parent
            .canonicalize()
            .map_or_else(|_| path.clone(), |p| p.join(name)),
        _ => path,
    }
}

fn ensure_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

impl SourceStore for FsStore {
    // The period is ignored: every document is scanned and the filter runs
    // on the parsed entries.
    fn list_source_documents(&self, _period: Option<&Period>) -> Result<Vec<PathBuf>, StoreError> {
        let root = Pattern::escape(&self.root.to_string_lossy());
        let pattern = Path::new(&root).join(&self.pattern);
        let pattern_str = pattern.to_string_lossy();

        let paths = glob(&pattern_str).map_err(|e| {
            StoreError::list(&self.root, io::Error::new(io::ErrorKind::InvalidInput, e))
        })?;

        let mut documents = Vec::new();
        for entry in paths {
            match entry {
                Ok(path) if path.is_file() => documents.push(path),
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(error = %e, "error accessing source document");
                }
            }
        }
        documents.sort();

        tracing::debug!(
            root = %self.root.display(),
            count = documents.len(),
            "listed source documents"
        );
        Ok(documents)
    }

    fn read(&self, document: &Path) -> Result<String, StoreError> {
        fs::read_to_string(document).map_err(|e| StoreError::read(document, e))
    }

    fn write(&self, destination: &Path, text: &str) -> Result<(), StoreError> {
        ensure_parent(destination)
            .and_then(|()| fs::write(destination, text))
            .map_err(|e| StoreError::write(destination, e))
    }

    fn append(&self, destination: &Path, text: &str) -> Result<(), StoreError> {
        ensure_parent(destination)
            .and_then(|()| {
                let mut file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(destination)?;
                file.write_all(text.as_bytes())
            })
            .map_err(|e| StoreError::write(destination, e))
    }
}
