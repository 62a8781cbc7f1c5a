//! Git introspection helpers
//!
//! Derives repository coordinates (vendor, repository name, current branch)
//! from the human-readable output of `git remote show -n origin` and
//! `git branch`. Remote URLs come in a small set of shapes, so each lookup
//! tries an SSH-shaped field rule first and falls back to an HTTPS-shaped one
//! instead of parsing URLs in full.

use super::command::{CommandError, ProcessInvocation, ProcessRunner, DEFAULT_TIMEOUT};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// A field selector in the spirit of `cut -d <delimiter> -f <field>`.
/// Fields are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub delimiter: char,
    pub field: usize,
}

const fn rule(delimiter: char, field: usize) -> FieldRule {
    FieldRule { delimiter, field }
}

// `git@github.com:acme/widget.git` style remotes
const REPOSITORY_SSH: [FieldRule; 2] = [rule('/', 2), rule('.', 1)];
// `https://github.com/acme/widget.git` style remotes
const REPOSITORY_HTTPS: [FieldRule; 2] = [rule('/', 5), rule('.', 1)];
const VENDOR_SSH: [FieldRule; 2] = [rule(':', 3), rule('/', 1)];
const VENDOR_HTTPS: [FieldRule; 2] = [rule(':', 3), rule('/', 4)];
const BRANCH: [FieldRule; 1] = [rule(' ', 2)];

/// Vendor, repository and branch of the working copy. Recomputed on every
/// request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RepositoryCoordinates {
    pub vendor: String,
    pub repository: String,
    pub branch: String,
}

/// Read-only git queries built on a [`ProcessRunner`].
#[derive(Clone)]
pub struct GitClient {
    runner: Arc<dyn ProcessRunner>,
    working_dir: PathBuf,
    timeout: Duration,
}

impl GitClient {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            runner,
            working_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Repository name of the `origin` remote, or an empty string when neither
    /// rule matches.
    pub async fn repository_name(&self) -> Result<String, CommandError> {
        self.remote_field(&REPOSITORY_SSH, &REPOSITORY_HTTPS).await
    }

    /// Owner or organization of the `origin` remote, or an empty string.
    pub async fn vendor_name(&self) -> Result<String, CommandError> {
        self.remote_field(&VENDOR_SSH, &VENDOR_HTTPS).await
    }

    /// Name of the checked out branch as shown by `git branch`.
    pub async fn current_branch(&self) -> Result<String, CommandError> {
        let output = self.git_stdout(&["branch"]).await?;
        Ok(extract_fields(&output, "*", &BRANCH))
    }

    pub async fn coordinates(&self) -> Result<RepositoryCoordinates, CommandError> {
        Ok(RepositoryCoordinates {
            vendor: self.vendor_name().await?,
            repository: self.repository_name().await?,
            branch: self.current_branch().await?,
        })
    }

    async fn remote_field(&self, primary: &[FieldRule], fallback: &[FieldRule]) -> Result<String, CommandError> {
        let output = self.git_stdout(&["remote", "show", "-n", "origin"]).await?;

        let value = extract_fields(&output, "Fetch", primary);
        if !value.is_empty() {
            return Ok(value);
        }

        tracing::debug!("Remote URL did not match the SSH layout, trying the HTTPS layout");
        Ok(extract_fields(&output, "Fetch", fallback))
    }

    /// Runs `git <args>` and returns stdout whatever the exit status was.
    async fn git_stdout(&self, args: &[&str]) -> Result<String, CommandError> {
        let invocation = ProcessInvocation::new(std::iter::once("git").chain(args.iter().copied()))
            .in_dir(&self.working_dir)
            .with_timeout(self.timeout)
            .allow_failures(true);

        let outcome = self.runner.run_silent(&invocation).await?;
        Ok(outcome.stdout)
    }
}

/// Select lines containing `needle`, apply `rules` to each in turn and
/// return the trimmed result, one line per selected input line.
pub fn extract_fields(output: &str, needle: &str, rules: &[FieldRule]) -> String {
    let selected: Vec<&str> = output
        .lines()
        .filter(|line| line.contains(needle))
        .map(|line| rules.iter().fold(line, |value, r| cut_field(value, r.delimiter, r.field)))
        .collect();

    selected.join("\n").trim().to_string()
}

/// A line without the delimiter is passed through whole; a field past the
/// end is empty.
pub fn cut_field(line: &str, delimiter: char, field: usize) -> &str {
    if !line.contains(delimiter) {
        return line;
    }
    field
        .checked_sub(1)
        .and_then(|index| line.split(delimiter).nth(index))
        .unwrap_or("")
}
