//! Content collaborators consumed by the dispatcher
//!
//! Two read-only capabilities:
//! - `ContentIndex`: metadata listing per section, plus raw source for `cat`
//! - `ContentSearch`: line-level full-text search with context
//!
//! `FsContent` implements both over a directory of markdown files.

mod frontmatter;
mod fs;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use frontmatter::{split_frontmatter, Frontmatter};
pub use fs::FsContent;

/// Top-level content sections of the site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Blog,
    Portfolio,
    Til,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Blog, Section::Portfolio, Section::Til];

    /// Directory name, also the URL prefix
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Blog => "blog",
            Section::Portfolio => "portfolio",
            Section::Til => "til",
        }
    }
}

/// Metadata for one content item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentMeta {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Section directory the item lives in
    pub directory: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl ContentMeta {
    /// Site URL of the item
    pub fn url(&self) -> String {
        format!("/{}/{}", self.directory, self.slug)
    }
}

/// One matching line with surrounding context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineMatch {
    /// 1-based line number within the body
    pub line_number: usize,
    pub content: String,
    pub before: Vec<String>,
    pub after: Vec<String>,
}

/// All matches within one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub slug: String,
    #[serde(rename = "type")]
    pub kind: Section,
    pub title: String,
    pub matches: Vec<LineMatch>,
}

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid frontmatter in {path}: {source}")]
    Frontmatter {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("search backend unavailable: {0}")]
    Unavailable(String),
}

/// Metadata listing capability
pub trait ContentIndex: Send + Sync {
    /// Items in a section, newest first
    fn list(&self, section: Section) -> Vec<ContentMeta>;

    /// Raw source of the file a slug resolves to, if any
    fn read_source(&self, slug: &str) -> Result<Option<String>, ContentError>;

    /// First item with this slug across all sections
    fn find(&self, slug: &str) -> Option<ContentMeta> {
        Section::ALL
            .into_iter()
            .flat_map(|section| self.list(section))
            .find(|item| item.slug == slug)
    }

    /// Every item across all sections
    fn all(&self) -> Vec<ContentMeta> {
        Section::ALL
            .into_iter()
            .flat_map(|section| self.list(section))
            .collect()
    }
}

/// Full-text body search capability
#[async_trait]
pub trait ContentSearch: Send + Sync {
    async fn search(&self, term: &str, context: usize) -> Result<Vec<SearchHit>, ContentError>;
}
