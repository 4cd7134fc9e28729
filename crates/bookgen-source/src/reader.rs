//! Reading source files referenced by embed blocks.
//!
//! Embedded files are shown as code listings, so their content goes through
//! [`filter_source_lines`] which drops lines that only matter to the build
//! tooling (build constraints, listing markers).

use std::path::{Path, PathBuf};

/// Error reading an embedded source file.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    /// The file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// No such file.
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),
}

/// Source of embedded file contents.
pub trait SourceReader: Send + Sync {
    /// Read the file at `path` and return its filtered lines.
    ///
    /// # Errors
    ///
    /// Returns `ReadError::NotFound` if the file does not exist and
    /// `ReadError::Io` for any other read failure.
    fn read_lines(&self, path: &Path) -> Result<Vec<String>, ReadError>;
}

/// Reads source files from the local filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsSourceReader;

impl FsSourceReader {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl SourceReader for FsSourceReader {
    fn read_lines(&self, path: &Path) -> Result<Vec<String>, ReadError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(filter_source_lines(&content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ReadError::NotFound(path.to_path_buf()))
            }
            Err(source) => Err(ReadError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

fn is_build_constraint(line: &str) -> bool {
    line.starts_with("// +build") || line.starts_with("//go:build")
}

/// Listing markers such as `// :show start` or `// :collapse`.
fn is_listing_marker(line: &str) -> bool {
    line.starts_with("// :")
}

/// Split `content` into lines and drop tooling-only lines.
///
/// - build constraints and the blank line following them
/// - listing marker comments
/// - trailing blank lines
#[must_use]
pub fn filter_source_lines(content: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut skip_blank = false;

    for line in content.lines() {
        let trimmed = line.trim();
        if is_build_constraint(trimmed) {
            skip_blank = true;
            continue;
        }
        if skip_blank && trimmed.is_empty() {
            skip_blank = false;
            continue;
        }
        skip_blank = false;
        if is_listing_marker(trimmed) {
            continue;
        }
        lines.push(line.to_owned());
    }

    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    lines
}
