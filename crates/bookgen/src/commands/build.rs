//! `bookgen build` command implementation.

use std::path::PathBuf;
use std::sync::Arc;

use bookgen_book::{Book, BookBuilder, EmbedConvention, EmbedResolver, Page};
use bookgen_config::{BookConfig, CliSettings, Config, EmbedConfig};
use bookgen_source::{FsSourceReader, SourceTree};
use clap::Args;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Path to configuration file (default: auto-discover bookgen.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Page snapshot directory (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Directory embedded source paths are relative to (overrides config).
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Build only the named book (repeatable).
    #[arg(short, long = "book")]
    books: Vec<String>,

    /// Build a single book from this start page instead of configured books.
    #[arg(long, conflicts_with = "books")]
    start_page: Option<String>,

    /// Print the page trees as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Enable verbose output (page counts and timing logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl BuildArgs {
    /// Execute the build command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or the snapshot cannot be loaded, or
    /// if any selected book has inconsistent content.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            source_dir: self.source_dir,
            base_dir: self.base_dir,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let selected = select_books(&config, &self.books, self.start_page.as_deref())?;

        output.info(&format!(
            "Source directory: {}",
            config.source_resolved.dir.display()
        ));
        output.info(&format!(
            "Embed base directory: {}",
            config.embed_resolved.base_dir.display()
        ));

        let tree = SourceTree::load_dir(&config.source_resolved.dir)?;
        output.info(&format!("Loaded {} pages", tree.len()));

        let resolver = EmbedResolver::new(
            Arc::new(FsSourceReader::new()),
            config.embed_resolved.base_dir.clone(),
        )
        .with_convention(embed_convention(&config.embed_resolved));
        let builder = BookBuilder::new(&tree, &resolver);

        let mut books = Vec::with_capacity(selected.len());
        for book_config in &selected {
            tracing::info!(
                book = %book_config.name,
                start_page = %book_config.start_page,
                "Building book"
            );
            let book = builder.build(&book_config.start_page)?;
            report(&output, &book_config.name, &book, !self.json);
            books.push(book);
        }

        if self.json {
            output.data(&serde_json::to_string_pretty(&books)?)?;
        }
        Ok(())
    }
}

/// Books to build: an ad-hoc start page, the named books, or all of them.
fn select_books(
    config: &Config,
    names: &[String],
    start_page: Option<&str>,
) -> Result<Vec<BookConfig>, CliError> {
    if let Some(start_page) = start_page {
        return Ok(vec![BookConfig {
            name: "book".to_owned(),
            start_page: start_page.to_owned(),
        }]);
    }

    if names.is_empty() {
        if config.books.is_empty() {
            return Err(CliError::Validation(
                "no books configured (add [[books]] to bookgen.toml or pass --start-page)"
                    .to_owned(),
            ));
        }
        return Ok(config.books.clone());
    }

    names
        .iter()
        .map(|name| {
            config
                .book(name)
                .cloned()
                .ok_or_else(|| CliError::Validation(format!("unknown book '{name}'")))
        })
        .collect()
}

/// URL convention from config, defaults for anything not configured.
fn embed_convention(embed: &EmbedConfig) -> EmbedConvention {
    let mut convention = EmbedConvention::default();
    if let Some(hosts) = &embed.viewer_hosts {
        convention.viewer_hosts.clone_from(hosts);
    }
    if let Some(widget_path) = &embed.widget_path {
        convention.widget_path.clone_from(widget_path);
    }
    if let Some(source_host) = &embed.source_host {
        convention.source_host.clone_from(source_host);
    }
    if let Some(repo_prefix) = &embed.repo_prefix {
        convention.repo_prefix.clone_from(repo_prefix);
    }
    if let Some(branches) = &embed.branches {
        convention.branches.clone_from(branches);
    }
    convention
}

/// Table of contents entry: depth, title and a short summary.
#[derive(Debug, PartialEq, Eq)]
struct TocEntry<'a> {
    depth: usize,
    title: &'a str,
    details: String,
}

fn toc_entries(root: &Page) -> Vec<TocEntry<'_>> {
    fn collect<'a>(page: &'a Page, depth: usize, entries: &mut Vec<TocEntry<'a>>) {
        let mut details = Vec::new();
        if let Some(id) = &page.id {
            details.push(format!("id {id}"));
        }
        if !page.source_files.is_empty() {
            details.push(format!("{} files", page.source_files.len()));
        }
        entries.push(TocEntry {
            depth,
            title: &page.title,
            details: details.join(", "),
        });
        for child in &page.children {
            collect(child, depth + 1, entries);
        }
    }

    let mut entries = Vec::new();
    collect(root, 0, &mut entries);
    entries
}

fn report(output: &Output, name: &str, book: &Book, with_toc: bool) {
    let files: Vec<_> = book.root.walk().flat_map(|p| &p.source_files).collect();
    let missing = files.iter().filter(|f| !f.file_exists).count();

    output.heading(&format!("{name}: {}", book.title));
    if with_toc {
        for entry in toc_entries(&book.root) {
            output.toc_entry(entry.depth, entry.title, &entry.details);
        }
    }
    output.success(&format!(
        "Built {} pages with {} source files",
        book.root.page_count(),
        files.len()
    ));
    if missing > 0 {
        output.warning(&format!("{missing} embedded source files could not be resolved"));
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn config(books: &[(&str, &str)]) -> Config {
        let mut config = Config::default();
        config.books = books
            .iter()
            .map(|(name, start_page)| BookConfig {
                name: (*name).to_owned(),
                start_page: (*start_page).to_owned(),
            })
            .collect();
        config
    }

    #[test]
    fn test_select_all_books() {
        let config = config(&[("go", "a"), ("python", "b")]);
        let books = select_books(&config, &[], None).unwrap();
        assert_eq!(books, config.books);
    }

    #[test]
    fn test_select_named_books() {
        let config = config(&[("go", "a"), ("python", "b")]);
        let books = select_books(&config, &["python".to_owned()], None).unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].start_page, "b");
    }

    #[test]
    fn test_select_unknown_book() {
        let config = config(&[("go", "a")]);
        let err = select_books(&config, &["rust".to_owned()], None).unwrap_err();
        assert!(err.to_string().contains("unknown book 'rust'"));
    }

    #[test]
    fn test_select_without_books_fails() {
        let err = select_books(&config(&[]), &[], None).unwrap_err();
        assert!(matches!(err, CliError::Validation(_)));
    }

    #[test]
    fn test_select_start_page() {
        let books = select_books(&config(&[]), &[], Some("abcd")).unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].start_page, "abcd");
    }

    #[test]
    fn test_embed_convention_defaults() {
        let convention = embed_convention(&EmbedConfig::default());
        assert_eq!(convention, EmbedConvention::default());
    }

    #[test]
    fn test_embed_convention_overrides() {
        let embed = EmbedConfig {
            source_host: Some("git.example.com".to_owned()),
            branches: Some(vec!["main".to_owned()]),
            ..Default::default()
        };
        let convention = embed_convention(&embed);
        assert_eq!(convention.source_host, "git.example.com");
        assert_eq!(convention.branches, vec!["main".to_owned()]);
        assert_eq!(convention.widget_path, EmbedConvention::default().widget_path);
    }

    #[test]
    fn test_toc_entries() {
        let root = Page {
            title: "Go".to_owned(),
            id: Some("1".to_owned()),
            children: vec![Page {
                title: "Basics".to_owned(),
                source_files: vec![Default::default()],
                ..Default::default()
            }],
            ..Default::default()
        };
        assert_eq!(
            toc_entries(&root),
            vec![
                TocEntry {
                    depth: 0,
                    title: "Go",
                    details: "id 1".to_owned(),
                },
                TocEntry {
                    depth: 1,
                    title: "Basics",
                    details: "1 files".to_owned(),
                },
            ]
        );
    }
}
