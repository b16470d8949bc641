//! Mapping store backed by an append-only local text file.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::{MappingEntry, MappingStore, find_article_id};
use crate::error::{Error, Result};

/// Appends one line per published file. The file is created on first write.
#[derive(Debug, Clone)]
pub struct LocalMappingStore {
    path: PathBuf,
}

impl LocalMappingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl MappingStore for LocalMappingStore {
    async fn lookup(&self, file_path: &str) -> Result<String> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };

        find_article_id(&content, file_path).ok_or_else(|| Error::ArticleMappingNotFound {
            path: file_path.to_string(),
        })
    }

    async fn record(&self, file_path: &str, article_id: &str) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(MappingEntry::new(file_path, article_id).to_line().as_bytes())
            .await?;
        file.flush().await?;

        debug!(mapping_file = %self.path.display(), %file_path, %article_id, "recorded mapping");
        Ok(())
    }
}
