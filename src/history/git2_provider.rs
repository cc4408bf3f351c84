//! History read through libgit2.
//!
//! Produces the same unified-diff line stream as the command line source
//! without requiring a `git` binary. Commit ids are collected up front; patch
//! text is generated one commit at a time as the stream is consumed.
//!
//! Two cases differ from `git diff-tree HEAD --cc`. A merge commit is diffed
//! against its first parent only, where the command line prints a combined
//! diff. A root commit is diffed against the empty tree, where the command
//! line prints nothing because it runs without `--root`.

use super::{HistoryMode, HistorySource};
use crate::errors::{CompatError, Result};
use crate::extraction::Lines;
use chrono::NaiveTime;
use git2::{DiffFormat, Oid, Repository, Sort};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

/// Walks commits of a repository with `git2`.
#[derive(Debug, Clone)]
pub struct Git2History {
    repo: PathBuf,
    mode: HistoryMode,
}

impl Git2History {
    pub fn new(repo: impl Into<PathBuf>, mode: HistoryMode) -> Self {
        Self {
            repo: repo.into(),
            mode,
        }
    }

    fn discover(path: &Path) -> Result<Repository> {
        Repository::discover(path).map_err(|e| {
            CompatError::history(
                format!("Failed to discover git repository at {}", path.display()),
                e,
            )
        })
    }

    /// Commits to diff, newest first.
    fn select_commits(&self, repo: &Repository) -> std::result::Result<Vec<Oid>, git2::Error> {
        match self.mode {
            HistoryMode::LatestCommit => Ok(vec![repo.head()?.peel_to_commit()?.id()]),
            HistoryMode::Since(date) => {
                let cutoff = date.and_time(NaiveTime::MIN).and_utc().timestamp();
                let mut revwalk = repo.revwalk()?;
                revwalk.push_head()?;
                revwalk.set_sorting(Sort::TIME)?;

                let mut oids = Vec::new();
                for oid in revwalk {
                    let oid = oid?;
                    if repo.find_commit(oid)?.time().seconds() >= cutoff {
                        oids.push(oid);
                    }
                }
                Ok(oids)
            }
        }
    }
}

impl HistorySource for Git2History {
    fn describe(&self) -> String {
        format!("libgit2 {} ({:?})", self.repo.display(), self.mode)
    }

    fn open(&self) -> Result<Lines> {
        let repo = Self::discover(&self.repo)?;
        let oids = self
            .select_commits(&repo)
            .map_err(|e| CompatError::history("Failed to walk repository history", e))?;
        tracing::debug!(commits = oids.len(), "selected commits for patch scan");

        Ok(Box::new(CommitPatches {
            repo,
            oids: oids.into_iter(),
            buffer: VecDeque::new(),
        }))
    }
}

/// Lazily rendered patch lines, one commit at a time.
struct CommitPatches {
    repo: Repository,
    oids: std::vec::IntoIter<Oid>,
    buffer: VecDeque<String>,
}

impl Iterator for CommitPatches {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            if let Some(line) = self.buffer.pop_front() {
                return Some(line);
            }
            let oid = self.oids.next()?;
            if let Err(e) = render_patch(&self.repo, oid, &mut self.buffer) {
                tracing::warn!(commit = %oid, error = %e, "stopping history scan");
                self.buffer.clear();
                return None;
            }
        }
    }
}

/// Append the patch of `oid` against its first parent to `out`.
fn render_patch(
    repo: &Repository,
    oid: Oid,
    out: &mut VecDeque<String>,
) -> std::result::Result<(), git2::Error> {
    let commit = repo.find_commit(oid)?;
    let tree = commit.tree()?;
    let parent_tree = match commit.parent(0) {
        Ok(parent) => Some(parent.tree()?),
        Err(_) => None,
    };

    let diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;
    diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        let content = String::from_utf8_lossy(line.content());
        match line.origin() {
            origin @ ('+' | '-' | ' ') => {
                out.push_back(format!(
                    "{origin}{}",
                    content.trim_end_matches(['\n', '\r'])
                ));
            }
            _ => out.extend(content.lines().map(str::to_string)),
        }
        true
    })
}
