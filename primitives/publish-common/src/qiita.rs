//! Qiita items API client.

use async_trait::async_trait;
use reqwest::{Client, header};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::{Error, Result};

/// Article content as sent to the publishing platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub body: String,
    pub tags: Vec<String>,
    pub private: bool,
}

/// Creates and updates articles on the publishing platform.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Creates an article and returns its id. `announce` asks the platform
    /// to share the new article.
    async fn create_article(&self, article: &Article, announce: bool) -> Result<String>;

    /// Replaces an existing article.
    async fn update_article(&self, article_id: &str, article: &Article) -> Result<()>;
}

/// Connection settings for [`QiitaClient`].
#[derive(Debug, Clone)]
pub struct QiitaConfig {
    /// Site root, e.g. `https://qiita.com`.
    pub base_url: String,
    pub access_token: String,
}

/// Qiita API v2 client.
#[derive(Debug, Clone)]
pub struct QiitaClient {
    http: Client,
    config: QiitaConfig,
}

#[derive(Debug, Serialize)]
struct Tag<'a> {
    name: &'a str,
}

/// Body of `POST /api/v2/items` and `PATCH /api/v2/items/:id`.
#[derive(Debug, Serialize)]
struct ItemRequest<'a> {
    body: &'a str,
    coediting: bool,
    group_url_name: Option<&'a str>,
    private: bool,
    tags: Vec<Tag<'a>>,
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    tweet: Option<bool>,
}

impl<'a> ItemRequest<'a> {
    fn new(article: &'a Article, tweet: Option<bool>) -> Self {
        Self {
            body: &article.body,
            coediting: false,
            group_url_name: None,
            private: article.private,
            tags: article.tags.iter().map(|name| Tag { name: name.as_str() }).collect(),
            title: &article.title,
            tweet,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ItemResponse {
    id: String,
}

impl QiitaClient {
    pub fn new(config: QiitaConfig) -> Result<Self> {
        let http = Client::builder().build()?;
        Ok(Self { http, config })
    }

    fn items_url(&self) -> String {
        format!("{}/api/v2/items", self.config.base_url.trim_end_matches('/'))
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<ItemResponse> {
        let response = request
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.config.access_token),
            )
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), reason = %body, "Qiita refused item request");
            return Err(Error::Publish {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl Publisher for QiitaClient {
    async fn create_article(&self, article: &Article, announce: bool) -> Result<String> {
        let request = self
            .http
            .post(self.items_url())
            .json(&ItemRequest::new(article, Some(announce)));

        let item = self.send(request).await?;
        info!(item_id = %item.id, title = %article.title, private = article.private, "published article to Qiita");
        Ok(item.id)
    }

    async fn update_article(&self, article_id: &str, article: &Article) -> Result<()> {
        let request = self
            .http
            .patch(format!("{}/{}", self.items_url(), article_id))
            .json(&ItemRequest::new(article, None));

        let item = self.send(request).await?;
        info!(item_id = %item.id, title = %article.title, private = article.private, "updated article on Qiita");
        Ok(())
    }
}
