//! Publish Common - Shared Logic for the Qiita Publisher
//!
//! Everything the webhook receiver needs to turn a GitHub push into Qiita
//! articles, independent of the HTTP server that drives it.
//!
//! # Modules
//!
//! - [`frontmatter`] - splits a `---` delimited description block from a body
//! - [`description`] - decodes the block and decides article visibility
//! - [`mapping`] - file path to Qiita item id store (local file or GitHub file)
//! - [`github`] - GitHub raw and content API client
//! - [`qiita`] - Qiita items API client
//! - [`push`] - push event payload and directory allow-list
//! - [`sync`] - the per-delivery pipeline tying the pieces together

pub mod description;
pub mod error;
pub mod frontmatter;
pub mod github;
pub mod mapping;
pub mod push;
pub mod qiita;
pub mod sync;

pub use description::{Description, Visibility};
pub use error::{Error, Result};
pub use frontmatter::{ParsedDocument, split};
pub use github::{ContentApi, GitHubClient, GitHubConfig, RawSource, RemoteFile};
pub use mapping::{InMemoryMappingStore, LocalMappingStore, MappingEntry, MappingStore, RemoteMappingStore};
pub use push::{Commit, IncludedDirs, PushEvent};
pub use qiita::{Article, Publisher, QiitaClient, QiitaConfig};
pub use sync::{ArticleSync, Mode, PublishedArticle, SyncReport};
