//! File path to Qiita item id mapping.
//!
//! Once a file has been published, its item id is recorded so that later
//! edits patch the same article. Entries are stored as text lines of the
//! form `<file path>, <item id>`.
//!
//! A path may appear more than once. [`MappingStore::lookup`] returns the
//! first match in storage order, so the winning entry depends on how each
//! strategy orders its lines:
//!
//! | Strategy | Storage order | First match is |
//! |----------|---------------|----------------|
//! | [`LocalMappingStore`] | appended, oldest first | oldest entry |
//! | [`RemoteMappingStore`] | prepended, newest first | newest entry |
//! | [`InMemoryMappingStore`] | appended, oldest first | oldest entry |

mod local;
mod memory;
mod remote;

pub use local::LocalMappingStore;
pub use memory::InMemoryMappingStore;
pub use remote::RemoteMappingStore;

use std::fmt;

use async_trait::async_trait;

use crate::error::Result;

/// Persistent file path → item id associations.
#[async_trait]
pub trait MappingStore: Send + Sync {
    /// Item id recorded for `file_path`, or
    /// [`Error::ArticleMappingNotFound`](crate::Error::ArticleMappingNotFound).
    async fn lookup(&self, file_path: &str) -> Result<String>;

    /// Records a new association, creating the backing store if needed.
    async fn record(&self, file_path: &str, article_id: &str) -> Result<()>;
}

/// One line of a mapping file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingEntry {
    pub file_path: String,
    pub article_id: String,
}

impl MappingEntry {
    pub fn new(file_path: impl Into<String>, article_id: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            article_id: article_id.into(),
        }
    }

    /// Parses `<file path>, <item id>`. Item ids never contain commas, so
    /// the last comma separates the fields.
    pub fn parse(line: &str) -> Option<Self> {
        let (file_path, article_id) = line.rsplit_once(',')?;
        let file_path = file_path.trim();
        let article_id = article_id.trim();

        if file_path.is_empty() || article_id.is_empty() {
            return None;
        }
        Some(Self::new(file_path, article_id))
    }

    /// The entry as a newline-terminated record.
    pub fn to_line(&self) -> String {
        format!("{self}\n")
    }
}

impl fmt::Display for MappingEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.file_path, self.article_id)
    }
}

/// First item id recorded for `file_path` in `content`. Malformed lines are skipped.
pub fn find_article_id(content: &str, file_path: &str) -> Option<String> {
    content
        .lines()
        .filter_map(MappingEntry::parse)
        .find(|entry| entry.file_path == file_path)
        .map(|entry| entry.article_id)
}
