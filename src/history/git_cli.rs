//! History from the `git` command line tool.
//!
//! The subprocess writes its patch output into a pipe that is consumed line
//! by line, so arbitrarily long histories are processed in bounded memory.
//! If the process dies or is killed mid-stream, whatever was read so far is
//! treated as the complete input.

use super::lines::LossyLines;
use super::{HistoryMode, HistorySource};
use crate::errors::{CompatError, Result};
use crate::extraction::Lines;
use std::io::{BufReader, Read};
use std::path::PathBuf;
use std::process::{Child, ChildStdout, Command, Stdio};
use std::thread::JoinHandle;

/// Pickaxe pattern selecting commits that touch a C-style declaration.
pub const DECLARATION_PICKAXE: &str = r"^(cs_type\(.+\)[ \t])?\w+[ \t]\w+\(.*\)";

/// Runs `git log` / `git diff-tree` in a repository.
#[derive(Debug, Clone)]
pub struct GitCliHistory {
    repo: PathBuf,
    mode: HistoryMode,
}

impl GitCliHistory {
    pub fn new(repo: impl Into<PathBuf>, mode: HistoryMode) -> Self {
        Self {
            repo: repo.into(),
            mode,
        }
    }

    /// Arguments passed to `git` for the configured mode.
    #[must_use]
    pub fn command_args(&self) -> Vec<String> {
        match self.mode {
            HistoryMode::LatestCommit => ["diff-tree", "HEAD", "--cc", "--oneline", "--pretty="]
                .map(String::from)
                .to_vec(),
            HistoryMode::Since(date) => vec![
                "log".to_string(),
                "-p".to_string(),
                format!("-G{DECLARATION_PICKAXE}"),
                "--oneline".to_string(),
                "--pretty=".to_string(),
                format!("--after={}", date.format("%Y-%m-%d")),
            ],
        }
    }
}

impl HistorySource for GitCliHistory {
    fn describe(&self) -> String {
        format!("git {}", self.command_args().join(" "))
    }

    fn open(&self) -> Result<Lines> {
        let mut child = Command::new("git")
            .args(self.command_args())
            .current_dir(&self.repo)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                CompatError::history(
                    format!("Failed to start git in {}", self.repo.display()),
                    e,
                )
            })?;

        let stdout = child.stdout.take().ok_or_else(|| CompatError::History {
            message: "git stdout was not captured".to_string(),
            source: None,
        })?;
        let stderr = child.stderr.take().map(|mut pipe| {
            std::thread::spawn(move || {
                let mut text = String::new();
                let _ = pipe.read_to_string(&mut text);
                text
            })
        });

        Ok(Box::new(ChildLines {
            child,
            lines: LossyLines::new(BufReader::new(stdout)),
            stderr,
            finished: false,
        }))
    }
}

/// Lines of a running child process; reaps the child when exhausted and
/// kills it when dropped early.
struct ChildLines {
    child: Child,
    lines: LossyLines<BufReader<ChildStdout>>,
    stderr: Option<JoinHandle<String>>,
    finished: bool,
}

impl ChildLines {
    fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;

        let stderr = self
            .stderr
            .take()
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();

        match self.child.wait() {
            Ok(status) if status.success() => {
                tracing::debug!(truncated = self.lines.truncated(), "git finished");
            }
            Ok(status) => {
                tracing::warn!(
                    %status,
                    stderr = stderr.trim(),
                    "git exited unsuccessfully, using the output read so far"
                );
            }
            Err(e) => tracing::warn!(error = %e, "failed to wait for git"),
        }
    }
}

impl Iterator for ChildLines {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        match self.lines.next() {
            Some(line) => Some(line),
            None => {
                self.finish();
                None
            }
        }
    }
}

impl Drop for ChildLines {
    fn drop(&mut self) {
        if !self.finished {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_latest_commit_arguments() {
        let source = GitCliHistory::new(".", HistoryMode::LatestCommit);
        assert_eq!(
            source.command_args(),
            vec!["diff-tree", "HEAD", "--cc", "--oneline", "--pretty="]
        );
    }

    #[test]
    fn test_history_arguments_carry_date_and_pickaxe() {
        let date = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let args = GitCliHistory::new(".", HistoryMode::Since(date)).command_args();
        assert_eq!(args[0], "log");
        assert!(args.contains(&"--after=2023-01-01".to_string()));
        assert!(args.iter().any(|a| a.starts_with("-G^(cs_type")));
    }

    #[test]
    fn test_missing_directory_is_history_error() {
        let source = GitCliHistory::new(
            "/nonexistent/compatgen/repo",
            HistoryMode::LatestCommit,
        );
        let err = source.open().err().unwrap();
        assert_eq!(err.exit_code(), 9);
    }
}
