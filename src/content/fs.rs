//! Filesystem-backed content collaborator
//!
//! ```text
//! content/
//! ├── about.md
//! ├── blog/*.md
//! ├── portfolio/*.md
//! └── til/*.md
//! ```
//!
//! Metadata is scanned once at load and kept in memory. Bodies are read from
//! disk on every search.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::frontmatter::{split_frontmatter, Frontmatter};
use super::{ContentError, ContentIndex, ContentMeta, ContentSearch, LineMatch, SearchHit, Section};

const EXTENSIONS: [&str; 2] = ["md", "mdx"];

#[derive(Debug, Clone)]
struct Entry {
    meta: ContentMeta,
    section: Section,
    path: PathBuf,
}

/// Markdown content rooted at a directory
#[derive(Debug, Clone)]
pub struct FsContent {
    root: PathBuf,
    entries: Vec<Entry>,
}

impl FsContent {
    /// Scan the content root. Missing section directories are treated as empty.
    pub fn load(root: impl Into<PathBuf>) -> Result<Self, ContentError> {
        let root = root.into();
        let mut entries = Vec::new();

        for section in Section::ALL {
            let dir = root.join(section.as_str());
            if !dir.is_dir() {
                debug!(dir = %dir.display(), "section directory missing");
                continue;
            }

            let listing = std::fs::read_dir(&dir).map_err(|source| ContentError::Io {
                path: dir.display().to_string(),
                source,
            })?;

            for item in listing.flatten() {
                let path = item.path();
                if !has_content_extension(&path) {
                    continue;
                }
                match load_entry(section, &path) {
                    Ok(entry) => entries.push(entry),
                    Err(e) => warn!("skipping {}: {}", path.display(), e),
                }
            }
        }

        // Newest first; undated items sink to the end
        entries.sort_by(|a, b| {
            b.meta
                .date
                .cmp(&a.meta.date)
                .then_with(|| a.meta.slug.cmp(&b.meta.slug))
        });

        info!(root = %root.display(), items = entries.len(), "content loaded");
        Ok(Self { root, entries })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Candidate files for a slug: the root first, then `blog/`
    fn source_candidates(&self, slug: &str) -> Vec<PathBuf> {
        let mut out = Vec::new();
        for dir in [self.root.clone(), self.root.join(Section::Blog.as_str())] {
            for ext in EXTENSIONS {
                out.push(dir.join(format!("{}.{}", slug, ext)));
            }
        }
        out
    }
}

fn has_content_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| EXTENSIONS.contains(&e))
}

fn load_entry(section: Section, path: &Path) -> Result<Entry, ContentError> {
    let source = std::fs::read_to_string(path).map_err(|source| ContentError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let slug = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();

    let (yaml, _body) = split_frontmatter(&source);
    let fm = Frontmatter::parse(yaml.unwrap_or_default()).map_err(|source| {
        ContentError::Frontmatter {
            path: path.display().to_string(),
            source,
        }
    })?;

    let meta = ContentMeta {
        title: fm.title.clone().unwrap_or_else(|| slug.clone()),
        date: fm.date(),
        tags: fm.tags.clone(),
        directory: section.as_str().to_string(),
        description: fm.description.clone(),
        slug,
    };

    Ok(Entry {
        meta,
        section,
        path: path.to_path_buf(),
    })
}

/// Matching lines of a body, case-insensitive
fn match_lines(body: &str, term: &str, context: usize) -> Vec<LineMatch> {
    let needle = term.to_lowercase();
    let lines: Vec<&str> = body.lines().collect();

    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.to_lowercase().contains(&needle))
        .map(|(i, line)| {
            let start = i.saturating_sub(context);
            let end = (i + 1 + context).min(lines.len());
            LineMatch {
                line_number: i + 1,
                content: line.to_string(),
                before: lines[start..i].iter().map(|l| l.to_string()).collect(),
                after: lines[i + 1..end].iter().map(|l| l.to_string()).collect(),
            }
        })
        .collect()
}

impl ContentIndex for FsContent {
    fn list(&self, section: Section) -> Vec<ContentMeta> {
        self.entries
            .iter()
            .filter(|e| e.section == section)
            .map(|e| e.meta.clone())
            .collect()
    }

    fn read_source(&self, slug: &str) -> Result<Option<String>, ContentError> {
        // Slugs are single path components
        if slug.is_empty() || slug.contains(['/', '\\']) || slug.starts_with('.') {
            return Ok(None);
        }

        for path in self.source_candidates(slug) {
            if path.is_file() {
                return std::fs::read_to_string(&path)
                    .map(Some)
                    .map_err(|source| ContentError::Io {
                        path: path.display().to_string(),
                        source,
                    });
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl ContentSearch for FsContent {
    async fn search(&self, term: &str, context: usize) -> Result<Vec<SearchHit>, ContentError> {
        if term.trim().is_empty() {
            return Ok(Vec::new());
        }

        let mut hits = Vec::new();
        for entry in &self.entries {
            let source = tokio::fs::read_to_string(&entry.path)
                .await
                .map_err(|source| ContentError::Io {
                    path: entry.path.display().to_string(),
                    source,
                })?;
            let (_, body) = split_frontmatter(&source);
            let matches = match_lines(body, term, context);
            if !matches.is_empty() {
                hits.push(SearchHit {
                    slug: entry.meta.slug.clone(),
                    kind: entry.section,
                    title: entry.meta.title.clone(),
                    matches,
                });
            }
        }

        debug!(term, docs = hits.len(), "body search complete");
        Ok(hits)
    }
}
