//! Error types shared by every stage of the publishing pipeline.

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures that abort processing of a push delivery.
#[derive(Debug, Error)]
pub enum Error {
    /// GitHub answered a raw content request with a non-2xx status.
    #[error("GitHub returned status {status} for {path}: {body}")]
    SourceFetch {
        path: String,
        status: u16,
        body: String,
    },

    /// Qiita answered a create or update request with a non-2xx status.
    #[error("Qiita returned status {status}: {body}")]
    Publish { status: u16, body: String },

    /// An edit arrived for a file that was never published.
    #[error("no Qiita item is mapped to {path}")]
    ArticleMappingNotFound { path: String },

    /// The mapping file inside the repository could not be read or written.
    #[error("mapping file {path} returned status {status}: {body}")]
    RemoteStore {
        path: String,
        status: u16,
        body: String,
    },

    /// The opening `---` line was never closed.
    #[error("front matter in {path} has no closing delimiter")]
    UnterminatedFrontMatter { path: String },

    /// The document carries no description block at all.
    #[error("{path} has no front matter description")]
    MissingDescription { path: String },

    /// The description block is not a valid description document.
    #[error("invalid front matter in {path}: {source}")]
    InvalidDescription {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// The mapping file returned by GitHub is not valid base64.
    #[error("mapping file content could not be decoded: {0}")]
    MappingEncoding(#[from] base64::DecodeError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("mapping file I/O failed: {0}")]
    Io(#[from] std::io::Error),
}
