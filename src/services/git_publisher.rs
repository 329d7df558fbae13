//! Publishing the generated playlist to a git remote
//!
//! Shells out to the `git` binary in the configured repository: optional
//! repo-local identity, pull, add, commit, push. A run that leaves the
//! playlist unchanged commits nothing and pushes nothing.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::Output;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::PublishConfig;
use crate::errors::{PublishError, PublishResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishOutcome {
    Published,
    NothingToCommit,
}

/// Takes a written playlist somewhere other people can fetch it
#[async_trait]
pub trait PlaylistPublisher: Send + Sync {
    async fn publish(&self, file: &Path, message: &str) -> PublishResult<PublishOutcome>;
}

#[derive(Debug, Clone)]
pub struct GitPublisher {
    repo_path: PathBuf,
    author_name: Option<String>,
    author_email: Option<String>,
    pull_before_push: bool,
}

impl GitPublisher {
    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        Self {
            repo_path: repo_path.into(),
            author_name: None,
            author_email: None,
            pull_before_push: true,
        }
    }

    pub fn from_config(config: &PublishConfig) -> Self {
        Self {
            repo_path: config.repo_path.clone(),
            author_name: config.author_name.clone(),
            author_email: config.author_email.clone(),
            pull_before_push: config.pull_before_push,
        }
    }

    pub fn with_pull_before_push(mut self, pull: bool) -> Self {
        self.pull_before_push = pull;
        self
    }

    /// Expand `{timestamp}` in a commit message template
    pub fn commit_message(template: &str, now: DateTime<Utc>) -> String {
        template.replace("{timestamp}", &now.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    async fn git(&self, args: &[&str]) -> PublishResult<Output> {
        debug!("git {}", args.join(" "));
        let output = Command::new("git")
            .current_dir(&self.repo_path)
            .args(args)
            .output()
            .await?;

        if !output.status.success() {
            return Err(PublishError::CommandFailed {
                command: args.join(" "),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output)
    }

    /// `git diff --cached --quiet -- <file>` exits 1 when the file is staged
    async fn has_staged_changes(&self, file: &str) -> PublishResult<bool> {
        let status = Command::new("git")
            .current_dir(&self.repo_path)
            .args(["diff", "--cached", "--quiet", "--", file])
            .status()
            .await?;

        match status.code() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(PublishError::CommandFailed {
                command: format!("diff --cached --quiet -- {}", file),
                status: status.to_string(),
                stderr: String::new(),
            }),
        }
    }
}

#[async_trait]
impl PlaylistPublisher for GitPublisher {
    async fn publish(&self, file: &Path, message: &str) -> PublishResult<PublishOutcome> {
        if !self.repo_path.join(".git").exists() {
            return Err(PublishError::NotARepository {
                path: self.repo_path.clone(),
            });
        }

        if let Some(name) = &self.author_name {
            self.git(&["config", "user.name", name.as_str()]).await?;
        }
        if let Some(email) = &self.author_email {
            self.git(&["config", "user.email", email.as_str()]).await?;
        }

        if self.pull_before_push {
            self.git(&["pull", "--rebase", "--autostash"]).await?;
        }

        let file = tokio::fs::canonicalize(file)
            .await
            .map_err(|source| PublishError::MissingFile {
                path: file.to_path_buf(),
                source,
            })?;
        let file = file.to_string_lossy().into_owned();
        self.git(&["add", "--", file.as_str()]).await?;

        if !self.has_staged_changes(file.as_str()).await? {
            warn!("Playlist unchanged, nothing to commit");
            return Ok(PublishOutcome::NothingToCommit);
        }

        // Anything else staged in the repository stays out of this commit
        self.git(&["commit", "-m", message, "--", file.as_str()]).await?;
        self.git(&["push"]).await?;

        info!("Pushed playlist update from {}", self.repo_path.display());
        Ok(PublishOutcome::Published)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn git_available() -> bool {
        std::process::Command::new("git")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn run_git(dir: &Path, args: &[&str]) -> String {
        let output = std::process::Command::new("git")
            .current_dir(dir)
            .args(args)
            .output()
            .unwrap();
        assert!(output.status.success(), "git {:?} failed", args);
        String::from_utf8_lossy(&output.stdout).into_owned()
    }

    /// Repository with one committed playlist and a bare `origin` to push to
    fn repo_with_remote(root: &Path) -> PathBuf {
        let remote = root.join("remote.git");
        let repo = root.join("work");
        std::fs::create_dir_all(&repo).unwrap();
        run_git(root, &["init", "--quiet", "--bare", "remote.git"]);
        run_git(&repo, &["init", "--quiet"]);
        run_git(&repo, &["config", "user.name", "Test"]);
        run_git(&repo, &["config", "user.email", "test@example.com"]);
        run_git(&repo, &["config", "commit.gpgsign", "false"]);
        std::fs::write(repo.join("list.m3u"), "#EXTM3U\n").unwrap();
        run_git(&repo, &["add", "list.m3u"]);
        run_git(&repo, &["commit", "--quiet", "-m", "initial"]);
        run_git(&repo, &["remote", "add", "origin", remote.to_str().unwrap()]);
        run_git(&repo, &["push", "--quiet", "-u", "origin", "HEAD"]);
        repo
    }

    #[test]
    fn test_commit_message_timestamp() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        assert_eq!(
            GitPublisher::commit_message("Update playlist {timestamp}", now),
            "Update playlist 2024-03-01T12:30:00Z"
        );
        assert_eq!(GitPublisher::commit_message("Static", now), "Static");
    }

    #[tokio::test]
    async fn test_publish_requires_repository() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("list.m3u");
        std::fs::write(&file, "#EXTM3U\n").unwrap();

        let err = GitPublisher::new(dir.path())
            .publish(&file, "msg")
            .await
            .unwrap_err();
        assert!(matches!(err, PublishError::NotARepository { .. }));
    }

    #[tokio::test]
    async fn test_unchanged_playlist_is_not_committed() {
        if !git_available() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let repo = dir.path();
        run_git(repo, &["init", "--quiet"]);
        run_git(repo, &["config", "commit.gpgsign", "false"]);
        run_git(repo, &["config", "user.name", "Test"]);
        run_git(repo, &["config", "user.email", "test@example.com"]);

        let file = repo.join("list.m3u");
        std::fs::write(&file, "#EXTM3U\n").unwrap();
        run_git(repo, &["add", "list.m3u"]);
        run_git(repo, &["commit", "--quiet", "-m", "initial"]);

        let outcome = GitPublisher::new(repo)
            .with_pull_before_push(false)
            .publish(&file, "no-op")
            .await
            .unwrap();
        assert_eq!(outcome, PublishOutcome::NothingToCommit);
    }

    #[tokio::test]
    async fn test_publish_commits_only_the_playlist() {
        if !git_available() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let repo = repo_with_remote(dir.path());

        std::fs::write(repo.join("notes.txt"), "unrelated\n").unwrap();
        run_git(&repo, &["add", "notes.txt"]);

        let file = repo.join("list.m3u");
        let outcome = GitPublisher::new(&repo)
            .with_pull_before_push(false)
            .publish(&file, "only staged notes")
            .await
            .unwrap();
        assert_eq!(outcome, PublishOutcome::NothingToCommit);

        std::fs::write(&file, "#EXTM3U\n#EXTINF:-1,A\nhttp://x/1\n").unwrap();
        let outcome = GitPublisher::new(&repo)
            .with_pull_before_push(false)
            .publish(&file, "update playlist")
            .await
            .unwrap();
        assert_eq!(outcome, PublishOutcome::Published);

        let committed = run_git(&repo, &["show", "--name-only", "--format=", "HEAD"]);
        assert_eq!(committed.trim(), "list.m3u");
        let still_staged = run_git(&repo, &["diff", "--cached", "--name-only"]);
        assert_eq!(still_staged.trim(), "notes.txt");
    }
}
