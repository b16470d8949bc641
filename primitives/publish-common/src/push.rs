//! GitHub push event payload and the directory allow-list.

use std::path::Path;

use serde::Deserialize;

use crate::sync::Mode;

/// The parts of a push (or ping) delivery the publisher reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PushEvent {
    /// Absent on the ping GitHub sends when the hook is registered.
    #[serde(default)]
    pub commits: Option<Vec<Commit>>,
    #[serde(default)]
    pub zen: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Commit {
    #[serde(default)]
    pub added: Vec<String>,
    #[serde(default)]
    pub modified: Vec<String>,
    #[serde(default)]
    pub removed: Vec<String>,
}

impl PushEvent {
    /// A hook registration ping rather than a push.
    pub fn is_ping(&self) -> bool {
        self.commits.is_none() && self.zen.is_some()
    }

    /// Changed files in delivery order: per commit, added files then modified files.
    pub fn changes(&self) -> impl Iterator<Item = (&str, Mode)> {
        self.commits.iter().flatten().flat_map(|commit| {
            let added = commit.added.iter().map(|path| (path.as_str(), Mode::Create));
            let modified = commit
                .modified
                .iter()
                .map(|path| (path.as_str(), Mode::Update));
            added.chain(modified)
        })
    }

    /// Files deleted by the push. They are reported but never unpublished.
    pub fn removed(&self) -> impl Iterator<Item = &str> {
        self.commits
            .iter()
            .flatten()
            .flat_map(|commit| commit.removed.iter().map(String::as_str))
    }
}

/// Repository directories whose files are published.
///
/// Matching is on the file's immediate directory, so `blog/articles`
/// includes `blog/articles/a.md` but not `blog/articles/drafts/b.md`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncludedDirs(Vec<String>);

impl IncludedDirs {
    pub fn new<I, S>(dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            dirs.into_iter()
                .map(|dir| dir.as_ref().trim().trim_end_matches('/').to_string())
                .filter(|dir| !dir.is_empty())
                .collect(),
        )
    }

    /// Parses a comma-separated list such as `blog/articles,notes`.
    pub fn from_csv(value: &str) -> Self {
        Self::new(value.split(','))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains_file(&self, file_path: &str) -> bool {
        let dir = directory_of(file_path);
        self.0.iter().any(|included| included == dir)
    }
}

/// Directory component of a repository path, `.` for top-level files.
fn directory_of(file_path: &str) -> &str {
    match Path::new(file_path).parent().and_then(Path::to_str) {
        Some("") | None => ".",
        Some(dir) => dir,
    }
}
