//! Storage seam between the core and its environment.
//!
//! The core never touches the filesystem itself. Everything it reads or
//! writes goes through a [`SourceStore`], so the same pipeline runs against
//! real files, an in-memory map in tests, or anything else.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::period::Period;

/// Storage errors. Only writes are ever surfaced to users.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to list source documents in {}", location.display())]
    List {
        location: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    pub fn list(location: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::List {
            location: location.into(),
            source,
        }
    }

    pub fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}

/// Where source documents come from and where reports go.
pub trait SourceStore {
    /// Enumerates source documents.
    ///
    /// `period` is a hint only; implementations may return documents outside
    /// it because the period filter runs on the parsed entries regardless.
    fn list_source_documents(&self, period: Option<&Period>) -> Result<Vec<PathBuf>, StoreError>;

    /// Reads the full text of one document.
    fn read(&self, document: &Path) -> Result<String, StoreError>;

    /// Replaces `destination` with `text`.
    fn write(&self, destination: &Path, text: &str) -> Result<(), StoreError>;

    /// Appends `text` to `destination`, creating it (and its parents) first.
    fn append(&self, destination: &Path, text: &str) -> Result<(), StoreError>;
}

/// A store backed by an in-memory map.
///
/// Paths listed in `read_only` reject writes, which lets callers exercise
/// unwritable destinations.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RefCell<BTreeMap<PathBuf, String>>,
    read_only: Vec<PathBuf>,
}

impl MemoryStore {
    /// Builds a store holding the given documents.
    pub fn with_documents<I, P, S>(documents: I) -> Self
    where
        I: IntoIterator<Item = (P, S)>,
        P: Into<PathBuf>,
        S: Into<String>,
    {
        Self {
            documents: RefCell::new(
                documents
                    .into_iter()
                    .map(|(p, s)| (p.into(), s.into()))
                    .collect(),
            ),
            read_only: Vec::new(),
        }
    }

    /// Marks `path` as unwritable.
    #[must_use]
    pub fn with_read_only(mut self, path: impl Into<PathBuf>) -> Self {
        self.read_only.push(path.into());
        self
    }

    fn check_writable(&self, path: &Path) -> Result<(), StoreError> {
        if self.read_only.iter().any(|p| p == path) {
            return Err(StoreError::write(
                path,
                io::Error::new(io::ErrorKind::PermissionDenied, "read-only destination"),
            ));
        }
        Ok(())
    }
}

impl SourceStore for MemoryStore {
    fn list_source_documents(&self, _period: Option<&Period>) -> Result<Vec<PathBuf>, StoreError> {
        Ok(self.documents.borrow().keys().cloned().collect())
    }

    fn read(&self, document: &Path) -> Result<String, StoreError> {
        self.documents
            .borrow()
            .get(document)
            .cloned()
            .ok_or_else(|| StoreError::read(document, io::ErrorKind::NotFound.into()))
    }

    fn write(&self, destination: &Path, text: &str) -> Result<(), StoreError> {
        self.check_writable(destination)?;
        self.documents
            .borrow_mut()
            .insert(destination.to_path_buf(), text.to_string());
        Ok(())
    }

    fn append(&self, destination: &Path, text: &str) -> Result<(), StoreError> {
        self.check_writable(destination)?;
        self.documents
            .borrow_mut()
            .entry(destination.to_path_buf())
            .or_default()
            .push_str(text);
        Ok(())
    }
}
