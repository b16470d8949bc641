//! Push delivery → Qiita articles pipeline.
//!
//! Files are processed one at a time in delivery order. The first failure
//! aborts the rest of the delivery; nothing is retried and nothing already
//! published is rolled back.

use std::sync::Arc;

use tracing::{debug, error, info, instrument};

use crate::description::{Description, Visibility};
use crate::error::{Error, Result};
use crate::frontmatter;
use crate::github::RawSource;
use crate::mapping::MappingStore;
use crate::push::{IncludedDirs, PushEvent};
use crate::qiita::{Article, Publisher};

/// What a changed file turns into on Qiita.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Newly added file: create an article and record its id.
    Create,
    /// Modified file: patch the article recorded for it.
    Update,
}

/// An article created or updated during a delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedArticle {
    pub path: String,
    pub article_id: String,
    pub mode: Mode,
}

/// Outcome of one delivery.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub published: Vec<PublishedArticle>,
    /// Changed files outside the included directories.
    pub skipped: Vec<String>,
}

/// Publishes the files of push deliveries.
#[derive(Clone)]
pub struct ArticleSync {
    source: Arc<dyn RawSource>,
    publisher: Arc<dyn Publisher>,
    mapping: Arc<dyn MappingStore>,
    included_dirs: IncludedDirs,
    development: bool,
}

impl ArticleSync {
    pub fn new(
        source: Arc<dyn RawSource>,
        publisher: Arc<dyn Publisher>,
        mapping: Arc<dyn MappingStore>,
        included_dirs: IncludedDirs,
    ) -> Self {
        Self {
            source,
            publisher,
            mapping,
            included_dirs,
            development: false,
        }
    }

    /// Outside production every article is published privately.
    pub fn development(mut self, development: bool) -> Self {
        self.development = development;
        self
    }

    /// Publishes every included file of the delivery.
    pub async fn process_push(&self, event: &PushEvent) -> Result<SyncReport> {
        let mut report = SyncReport::default();

        for (path, mode) in event.changes() {
            if !self.included_dirs.contains_file(path) {
                debug!(%path, "skipping file outside included directories");
                report.skipped.push(path.to_string());
                continue;
            }

            let article_id = self.sync_file(path, mode).await?;
            report.published.push(PublishedArticle {
                path: path.to_string(),
                article_id,
                mode,
            });
        }

        for path in event.removed() {
            debug!(%path, "removed file left published");
        }

        Ok(report)
    }

    /// Publishes one file and returns its article id.
    #[instrument(skip(self), fields(development = self.development))]
    pub async fn sync_file(&self, path: &str, mode: Mode) -> Result<String> {
        // Resolve the target before fetching so an unmapped edit sends nothing.
        let existing_id = match mode {
            Mode::Create => None,
            Mode::Update => Some(self.mapping.lookup(path).await.inspect_err(|e| {
                error!(error = %e, "cannot update an article that was never published");
            })?),
        };

        let raw = self.source.fetch_raw_file(path).await?;
        let (article, visibility) = self.build_article(path, &raw)?;

        match existing_id {
            None => {
                let article_id = self
                    .publisher
                    .create_article(&article, visibility.announce)
                    .await?;

                if let Err(e) = self.mapping.record(path, &article_id).await {
                    error!(
                        %article_id,
                        error = %e,
                        "article published but its mapping was not recorded; add it by hand"
                    );
                    return Err(e);
                }

                info!(%article_id, "created article");
                Ok(article_id)
            }
            Some(article_id) => {
                self.publisher.update_article(&article_id, &article).await?;
                info!(%article_id, "updated article");
                Ok(article_id)
            }
        }
    }

    fn build_article(&self, path: &str, raw: &[u8]) -> Result<(Article, Visibility)> {
        let document = frontmatter::split(raw);

        if !document.terminated {
            return Err(Error::UnterminatedFrontMatter {
                path: path.to_string(),
            });
        }
        if !document.has_metadata() {
            return Err(Error::MissingDescription {
                path: path.to_string(),
            });
        }

        let description = Description::from_yaml(&document.metadata).map_err(|source| {
            Error::InvalidDescription {
                path: path.to_string(),
                source,
            }
        })?;
        let visibility = Visibility::resolve(description.published, self.development);

        let article = Article {
            title: description.title,
            body: document.body,
            tags: description.topics,
            private: visibility.private,
        };
        Ok((article, visibility))
    }
}
