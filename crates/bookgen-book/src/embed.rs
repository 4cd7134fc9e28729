//! Source files referenced by embed blocks.
//!
//! Code samples are embedded into pages through a viewer service that wraps
//! the URL of the file in the source repository:
//!
//! ```text
//! https://onlinetool.io/gitoembed/widget?url=https%3A%2F%2Fgithub.com%2Fessentialbooks%2Fbooks%2Fblob%2Fmaster%2Fbooks%2Fgo%2F0020-basic-types%2Fbooleans.go
//! ```
//!
//! [`EmbedConvention::relative_path`] decodes such a URL back to a path in the
//! local checkout of the repository (`books/go/0020-basic-types/booleans.go`)
//! and [`EmbedResolver`] loads the file.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use bookgen_source::{BlockKind, SourcePage, SourceReader};
use percent_encoding::percent_decode_str;
use url::Url;

use crate::page::{EmbeddedSourceFile, Page};

/// Shape of viewer-wrapper URLs that point into the source repository.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmbedConvention {
    /// Hosts of the viewer service.
    pub viewer_hosts: Vec<String>,
    /// Path of the viewer widget; the wrapped URL is in its `url` parameter.
    pub widget_path: String,
    /// Host of the wrapped URL.
    pub source_host: String,
    /// Path prefix of the repository on `source_host`, e.g. `/owner/repo/`.
    pub repo_prefix: String,
    /// Branch segments stripped after `blob/`. The first match wins.
    pub branches: Vec<String>,
}

impl Default for EmbedConvention {
    fn default() -> Self {
        Self {
            viewer_hosts: vec!["www.onlinetool.io".to_owned(), "onlinetool.io".to_owned()],
            widget_path: "/gitoembed/widget".to_owned(),
            source_host: "github.com".to_owned(),
            repo_prefix: "/essentialbooks/books/".to_owned(),
            branches: vec!["master".to_owned(), "notion".to_owned()],
        }
    }
}

impl EmbedConvention {
    /// Decode a viewer-wrapper URL to a path relative to the repository root.
    ///
    /// Returns `None` if `uri` does not follow the convention or the decoded
    /// path would point outside the repository (`..` segments).
    #[must_use]
    pub fn relative_path(&self, uri: &str) -> Option<String> {
        let outer = Url::parse(uri).ok()?;
        let host = outer.host_str()?;
        if !self.viewer_hosts.iter().any(|h| h == host) || outer.path() != self.widget_path {
            return None;
        }

        let (_, wrapped) = outer.query_pairs().find(|(k, _)| k == "url")?;
        let inner = Url::parse(&wrapped).ok()?;
        if inner.host_str()? != self.source_host {
            return None;
        }

        let path = percent_decode_str(inner.path()).decode_utf8().ok()?;
        let path = path.strip_prefix(self.repo_prefix.as_str())?;
        let path = path.strip_prefix("blob/").unwrap_or(path);
        let path = self
            .branches
            .iter()
            .find_map(|branch| path.strip_prefix(branch.as_str())?.strip_prefix('/'))
            .unwrap_or(path)
            .trim_start_matches('/');

        if path.is_empty() || !stays_relative(Path::new(path)) {
            return None;
        }
        Some(path.to_owned())
    }
}

/// True if joining `path` onto a directory cannot leave that directory.
fn stays_relative(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Resolves embed blocks to source files under a base directory.
pub struct EmbedResolver {
    convention: EmbedConvention,
    base_dir: PathBuf,
    reader: Arc<dyn SourceReader>,
}

impl EmbedResolver {
    /// Create a resolver reading files relative to `base_dir`.
    #[must_use]
    pub fn new(reader: Arc<dyn SourceReader>, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            convention: EmbedConvention::default(),
            base_dir: base_dir.into(),
            reader,
        }
    }

    /// Use a different URL convention.
    #[must_use]
    pub fn with_convention(mut self, convention: EmbedConvention) -> Self {
        self.convention = convention;
        self
    }

    #[must_use]
    pub fn convention(&self) -> &EmbedConvention {
        &self.convention
    }

    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolve and read the file behind `embed_url`.
    ///
    /// Never fails: unresolvable URLs and unreadable files are logged and
    /// returned with `file_exists == false`.
    pub fn resolve(&self, embed_url: &str) -> EmbeddedSourceFile {
        let mut file = EmbeddedSourceFile {
            embed_url: embed_url.to_owned(),
            ..Default::default()
        };

        let Some(relative_path) = self.convention.relative_path(embed_url) else {
            tracing::warn!(url = %embed_url, "Couldn't parse embed url");
            file.error = Some("embed url does not point into the source repository".to_owned());
            return file;
        };

        let path = self.base_dir.join(&relative_path);
        file.file_name = Path::new(&relative_path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        match self.reader.read_lines(&path) {
            Ok(lines) => {
                file.lines = lines;
                file.file_exists = true;
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    url = %embed_url,
                    error = %e,
                    "Failed to read embedded source file"
                );
                file.error = Some(e.to_string());
            }
        }
        file.path = path;
        file
    }

    /// Append one [`EmbeddedSourceFile`] to `page` per embed block of `source`.
    ///
    /// Embed blocks stay in the content; renderers look the file up with
    /// [`Page::find_source_file`].
    pub fn attach_source_files(&self, page: &mut Page, source: &SourcePage) {
        let files = source
            .content
            .iter()
            .filter(|block| block.kind == BlockKind::Embed)
            .map(|block| self.resolve(block.display_source()));
        page.source_files.extend(files);
    }
}
