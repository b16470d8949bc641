//! Command line and environment configuration.

use std::sync::Arc;

use clap::{Parser, ValueEnum};
use publish_common::{
    ArticleSync, GitHubClient, GitHubConfig, IncludedDirs, LocalMappingStore, MappingStore,
    QiitaClient, QiitaConfig, RemoteMappingStore,
};

/// GitHub push webhook receiver that republishes articles to Qiita.
#[derive(Parser, Debug, Clone)]
#[command(name = "qiita-webhook")]
#[command(about = "Publishes Markdown files pushed to GitHub as Qiita articles")]
pub struct Args {
    /// Port to listen on.
    #[arg(short, long, env = "QIITA_WEBHOOK_PORT", default_value = "8080")]
    pub port: u16,

    /// Host to bind to.
    #[arg(long, env = "QIITA_WEBHOOK_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Path to accept webhooks on.
    #[arg(long, env = "QIITA_WEBHOOK_PATH", default_value = "/payload")]
    pub path: String,

    /// Webhook secret for signature validation.
    #[arg(long, env = "GITHUB_WEBHOOK_SECRET_TOKEN", hide_env_values = true)]
    pub webhook_secret: String,

    /// GitHub personal access token.
    #[arg(long, env = "GITHUB_PERSONAL_ACCESS_TOKEN", hide_env_values = true)]
    pub github_token: String,

    /// Source repository as `owner/name`.
    #[arg(long, env = "GITHUB_REPOS")]
    pub github_repo: String,

    /// GitHub API root.
    #[arg(long, env = "GITHUB_API_URL", default_value = "https://api.github.com")]
    pub github_api_url: String,

    /// Qiita access token.
    #[arg(long, env = "QIITA_ACCESS_TOKEN", hide_env_values = true)]
    pub qiita_token: String,

    /// Qiita site root.
    #[arg(long, env = "QIITA_URL", default_value = "https://qiita.com")]
    pub qiita_url: String,

    /// Directories whose files are published (comma-separated).
    #[arg(long, env = "INCLUDED_DIR", value_delimiter = ',')]
    pub included_dir: Vec<String>,

    /// Where file path to item id mappings are kept.
    #[arg(long, env = "MAPPING_STORE", value_enum, default_value_t = MappingStoreKind::Remote)]
    pub mapping_store: MappingStoreKind,

    /// Mapping file: a local path, or a path inside the repository.
    #[arg(long, env = "MAPPING_FILEPATH", default_value = "mapping.txt")]
    pub mapping_filepath: String,

    /// Deployment environment. Anything but production publishes privately.
    #[arg(long, env = "APP_ENV", value_enum)]
    pub environment: Option<Environment>,

    /// Fallback for `APP_ENV`.
    #[arg(long, env = "RACK_ENV", value_enum, hide = true)]
    pub rack_env: Option<Environment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MappingStoreKind {
    /// Append-only file on local disk.
    Local,
    /// File committed to the source repository.
    Remote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Environment {
    Development,
    Test,
    Staging,
    Production,
}

impl Environment {
    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

impl Args {
    /// `APP_ENV`, then `RACK_ENV`, then development.
    pub fn environment(&self) -> Environment {
        self.environment
            .or(self.rack_env)
            .unwrap_or(Environment::Development)
    }

    pub fn included_dirs(&self) -> IncludedDirs {
        IncludedDirs::new(&self.included_dir)
    }

    /// Builds the GitHub and Qiita clients, the chosen mapping store and the pipeline.
    pub fn build_sync(&self) -> publish_common::Result<ArticleSync> {
        let github = Arc::new(GitHubClient::new(GitHubConfig {
            api_url: self.github_api_url.clone(),
            repo: self.github_repo.clone(),
            token: self.github_token.clone(),
        })?);
        let qiita = Arc::new(QiitaClient::new(QiitaConfig {
            base_url: self.qiita_url.clone(),
            access_token: self.qiita_token.clone(),
        })?);

        let mapping: Arc<dyn MappingStore> = match self.mapping_store {
            MappingStoreKind::Local => Arc::new(LocalMappingStore::new(&self.mapping_filepath)),
            MappingStoreKind::Remote => Arc::new(RemoteMappingStore::new(
                github.clone(),
                self.mapping_filepath.clone(),
            )),
        };

        Ok(ArticleSync::new(github, qiita, mapping, self.included_dirs())
            .development(!self.environment().is_production()))
    }
}
