//! Mock source reader for testing.
//!
//! Provides [`MockSourceReader`] for unit testing without filesystem access.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::reader::{ReadError, SourceReader, filter_source_lines};

/// In-memory source reader.
///
/// Files added with [`with_file`](Self::with_file) go through the same
/// filter as [`FsSourceReader`](crate::FsSourceReader). Every path passed
/// to [`read_lines`](SourceReader::read_lines) is recorded.
///
/// # Example
///
/// ```ignore
/// use bookgen_source::{MockSourceReader, SourceReader};
///
/// let reader = MockSourceReader::new().with_file("/book/a.go", "package main\n");
/// let lines = reader.read_lines("/book/a.go".as_ref())?;
/// ```
#[derive(Debug, Default)]
pub struct MockSourceReader {
    files: HashMap<PathBuf, String>,
    reads: RwLock<Vec<PathBuf>>,
}

impl MockSourceReader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }

    /// Paths requested so far, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn reads(&self) -> Vec<PathBuf> {
        self.reads.read().unwrap().clone()
    }
}

impl SourceReader for MockSourceReader {
    fn read_lines(&self, path: &Path) -> Result<Vec<String>, ReadError> {
        self.reads.write().unwrap().push(path.to_path_buf());
        self.files
            .get(path)
            .map(|content| filter_source_lines(content))
            .ok_or_else(|| ReadError::NotFound(path.to_path_buf()))
    }
}
