//! GitHub API client.
//!
//! Two concerns share one client: fetching the raw bytes of a pushed file
//! ([`RawSource`]) and reading/writing a file through the JSON contents API
//! ([`ContentApi`]), which the remote mapping store builds on.

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use reqwest::{Client, StatusCode, header};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{Error, Result};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Fetches raw file content from the source repository.
#[async_trait]
pub trait RawSource: Send + Sync {
    /// Raw bytes of `path` at the repository's default branch.
    async fn fetch_raw_file(&self, path: &str) -> Result<Vec<u8>>;
}

/// A file read through the contents API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub content: Vec<u8>,
    /// Blob sha GitHub requires when overwriting the file.
    pub sha: String,
}

/// Read/write access to a single file inside the source repository.
#[async_trait]
pub trait ContentApi: Send + Sync {
    /// Current content and sha, or `None` when the file does not exist yet.
    async fn fetch_file(&self, path: &str) -> Result<Option<RemoteFile>>;

    /// Creates (`sha` is `None`) or replaces the file with a commit.
    async fn write_file(
        &self,
        path: &str,
        content: &[u8],
        sha: Option<&str>,
        message: &str,
    ) -> Result<()>;
}

/// Connection settings for [`GitHubClient`].
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    /// API root, e.g. `https://api.github.com`.
    pub api_url: String,
    /// Repository as `owner/name`.
    pub repo: String,
    /// Personal access token.
    pub token: String,
}

/// GitHub REST client for one repository.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    config: GitHubConfig,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    content: String,
    /// `base64`, or `none` when the file is over 1 MB and `content` is empty.
    #[serde(default)]
    encoding: String,
    sha: String,
}

#[derive(Serialize)]
struct WriteRequest<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

impl GitHubClient {
    pub fn new(config: GitHubConfig) -> Result<Self> {
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { http, config })
    }

    fn contents_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/contents/{}",
            self.config.api_url.trim_end_matches('/'),
            self.config.repo,
            path.trim_start_matches('/')
        )
    }

    fn authorization(&self) -> String {
        format!("token {}", self.config.token)
    }
}

#[async_trait]
impl RawSource for GitHubClient {
    async fn fetch_raw_file(&self, path: &str) -> Result<Vec<u8>> {
        let response = self
            .http
            .get(self.contents_url(path))
            .header(header::ACCEPT, "application/vnd.github.raw")
            .header(header::AUTHORIZATION, self.authorization())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%path, status = status.as_u16(), reason = %body, "GitHub refused raw content request");
            return Err(Error::SourceFetch {
                path: path.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        debug!(%path, len = bytes.len(), "fetched raw file");
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl ContentApi for GitHubClient {
    async fn fetch_file(&self, path: &str) -> Result<Option<RemoteFile>> {
        let response = self
            .http
            .get(self.contents_url(path))
            .header(header::ACCEPT, "application/vnd.github+json")
            .header(header::AUTHORIZATION, self.authorization())
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!(%path, "file does not exist yet");
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%path, status = status.as_u16(), reason = %body, "GitHub refused contents request");
            return Err(Error::RemoteStore {
                path: path.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let file: ContentResponse = response.json().await?;
        let content = if file.encoding == "base64" {
            decode_content(&file.content)?
        } else {
            debug!(%path, encoding = %file.encoding, "contents API omitted the body, fetching raw");
            self.fetch_raw_file(path).await.map_err(|e| match e {
                Error::SourceFetch { path, status, body } => Error::RemoteStore { path, status, body },
                other => other,
            })?
        };

        Ok(Some(RemoteFile {
            content,
            sha: file.sha,
        }))
    }

    async fn write_file(
        &self,
        path: &str,
        content: &[u8],
        sha: Option<&str>,
        message: &str,
    ) -> Result<()> {
        let request = WriteRequest {
            message,
            content: STANDARD.encode(content),
            sha,
        };

        let response = self
            .http
            .put(self.contents_url(path))
            .header(header::ACCEPT, "application/vnd.github+json")
            .header(header::AUTHORIZATION, self.authorization())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%path, status = status.as_u16(), reason = %body, "GitHub refused file write");
            return Err(Error::RemoteStore {
                path: path.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        debug!(%path, created = sha.is_none(), "wrote file");
        Ok(())
    }
}

/// The contents API wraps base64 output at 60 columns.
fn decode_content(encoded: &str) -> Result<Vec<u8>> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    Ok(STANDARD.decode(compact)?)
}
