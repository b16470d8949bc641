//! Mapping store kept as a file inside the source repository.
//!
//! Every call reads the file through the contents API, so writers outside
//! this process are always seen. Recording is read-then-write:
//!
//! ```text
//! FETCH ── exists ──> prepend entry, send sha ──┐
//!   │                                           ├─> WRITE ─> ok | RemoteStore error
//!   └──── 404 ─────> new file, no sha ──────────┘
//! ```
//!
//! A sha conflict (another commit touched the file in between) is reported
//! as [`Error::RemoteStore`] and not retried.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::{MappingEntry, MappingStore, find_article_id};
use crate::error::{Error, Result};
use crate::github::ContentApi;

const COMMIT_MESSAGE: &str = "Update mapping file";

/// Newest-first mapping file committed to the repository.
#[derive(Clone)]
pub struct RemoteMappingStore {
    api: Arc<dyn ContentApi>,
    path: String,
}

impl RemoteMappingStore {
    pub fn new(api: Arc<dyn ContentApi>, path: impl Into<String>) -> Self {
        Self {
            api,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

#[async_trait]
impl MappingStore for RemoteMappingStore {
    async fn lookup(&self, file_path: &str) -> Result<String> {
        let content = match self.api.fetch_file(&self.path).await? {
            Some(file) => String::from_utf8_lossy(&file.content).into_owned(),
            None => String::new(),
        };

        find_article_id(&content, file_path).ok_or_else(|| Error::ArticleMappingNotFound {
            path: file_path.to_string(),
        })
    }

    async fn record(&self, file_path: &str, article_id: &str) -> Result<()> {
        let existing = self.api.fetch_file(&self.path).await?;

        let mut content = MappingEntry::new(file_path, article_id).to_line().into_bytes();
        let sha = match &existing {
            Some(file) => {
                content.extend_from_slice(&file.content);
                Some(file.sha.as_str())
            }
            None => {
                info!(mapping_file = %self.path, "creating mapping file");
                None
            }
        };

        self.api
            .write_file(&self.path, &content, sha, COMMIT_MESSAGE)
            .await?;

        debug!(mapping_file = %self.path, %file_path, %article_id, "recorded mapping");
        Ok(())
    }
}
