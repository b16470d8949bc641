//! In-memory [`MappingStore`] for tests.

use std::sync::RwLock;

use async_trait::async_trait;

use super::{MappingEntry, MappingStore};
use crate::error::{Error, Result};

/// Keeps entries in a `Vec`, appended in record order.
#[derive(Debug, Default)]
pub struct InMemoryMappingStore {
    entries: RwLock<Vec<MappingEntry>>,
}

impl InMemoryMappingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: impl IntoIterator<Item = MappingEntry>) -> Self {
        Self {
            entries: RwLock::new(entries.into_iter().collect()),
        }
    }

    /// Snapshot of all entries in storage order.
    pub fn entries(&self) -> Vec<MappingEntry> {
        self.entries
            .read()
            .map(|entries| entries.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

#[async_trait]
impl MappingStore for InMemoryMappingStore {
    async fn lookup(&self, file_path: &str) -> Result<String> {
        self.entries()
            .into_iter()
            .find(|entry| entry.file_path == file_path)
            .map(|entry| entry.article_id)
            .ok_or_else(|| Error::ArticleMappingNotFound {
                path: file_path.to_string(),
            })
    }

    async fn record(&self, file_path: &str, article_id: &str) -> Result<()> {
        let entry = MappingEntry::new(file_path, article_id);
        match self.entries.write() {
            Ok(mut entries) => entries.push(entry),
            Err(poisoned) => poisoned.into_inner().push(entry),
        }
        Ok(())
    }
}
