//! Sources of raw version-control history text.
//!
//! A [`HistorySource`] turns some provider (a `git` subprocess, libgit2, a
//! file) into a stream of text lines. The extractor treats the provenance as
//! opaque and only relies on the lines looking like patch output.

pub mod git2_provider;
pub mod git_cli;
pub mod lines;
pub mod text;

pub use git2_provider::Git2History;
pub use git_cli::{GitCliHistory, DECLARATION_PICKAXE};
pub use lines::LossyLines;
pub use text::TextHistory;

use crate::errors::Result;
use crate::extraction::Lines;
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::Path;

/// Which part of the history to scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryMode {
    /// Only the changes introduced by `HEAD`
    LatestCommit,
    /// Every commit after the given date
    Since(NaiveDate),
}

/// Implementation used to read history from a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum HistoryBackend {
    /// Spawn the `git` command line tool
    #[default]
    Cli,
    /// Use the bundled libgit2 bindings
    Libgit2,
}

/// Producer of history text lines.
pub trait HistorySource {
    /// Short human-readable description for logs.
    fn describe(&self) -> String;

    /// Start producing lines. Fails only when the source cannot be started;
    /// later read failures end the stream early instead.
    fn open(&self) -> Result<Lines>;
}

/// Repository-backed source for `backend`.
pub fn repository_source(
    backend: HistoryBackend,
    repo: &Path,
    mode: HistoryMode,
) -> Box<dyn HistorySource> {
    match backend {
        HistoryBackend::Cli => Box::new(GitCliHistory::new(repo, mode)),
        HistoryBackend::Libgit2 => Box::new(Git2History::new(repo, mode)),
    }
}
