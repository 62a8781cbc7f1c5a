//! Shared command harness
//!
//! [`CommandBase`] is what every concrete command is written against: the
//! GitHub client, configuration lookups, process execution with live output,
//! git introspection, enum validation, slugs and message templates.

use crate::config::Configuration;
use crate::enums::{EnumError, EnumValidator};
use crate::external::{CommandError, GitClient, OutputStream, ProcessInvocation, ProcessOutcome, ProcessRunner};
use crate::github::{GitHubClient, GitHubError, RepositoryRef};
use crate::slug::Slugifier;
use crate::templates::{TemplateError, TemplateRenderer};
use octocrab::{Octocrab, Page};
use serde::de::DeserializeOwned;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Process-wide collaborators, built once at startup and shared by reference.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Configuration>,
    pub templates: Arc<TemplateRenderer>,
    pub github: Option<GitHubClient>,
    pub runner: Arc<dyn ProcessRunner>,
    pub slugifier: Arc<dyn Slugifier>,
    pub working_dir: PathBuf,
    pub timeout: Duration,
}

/// One line of a command batch, split on whitespace when run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub line: String,
    pub allow_failures: bool,
}

impl CommandLine {
    pub fn new(line: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            allow_failures: false,
        }
    }

    pub fn allowing_failures(line: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            allow_failures: true,
        }
    }
}

pub struct CommandBase {
    context: AppContext,
    enums: EnumValidator,
    git: GitClient,
}

impl CommandBase {
    /// Coarse command result, distinct from process exit codes.
    pub const SUCCESS: i32 = 1;
    pub const FAILURE: i32 = 0;

    pub fn new(context: AppContext, enums: EnumValidator) -> Self {
        let git = GitClient::new(context.runner.clone())
            .in_dir(&context.working_dir)
            .with_timeout(context.timeout);
        Self { context, enums, git }
    }

    /// The authenticated GitHub client.
    pub fn github(&self) -> Result<&Octocrab, GitHubError> {
        self.context
            .github
            .as_ref()
            .map(GitHubClient::octocrab)
            .ok_or_else(|| {
                GitHubError::TokenNotFound("No GitHub token configured for this command".to_string())
            })
    }

    pub fn parameter(&self, key: &str) -> Option<String> {
        self.context.config.parameter(key)
    }

    pub fn git(&self) -> &GitClient {
        &self.git
    }

    /// Every item of a listing, following the `next` links from its first page.
    pub async fn all_pages<T: DeserializeOwned>(&self, first_page: Page<T>) -> Result<Vec<T>, GitHubError> {
        Ok(self.github()?.all_pages(first_page).await?)
    }

    /// Target repository: explicit values win, the `origin` remote fills gaps.
    pub async fn repository(&self, org: Option<&str>, repo: Option<&str>) -> anyhow::Result<RepositoryRef> {
        let owner = match org {
            Some(org) => org.to_string(),
            None => self.git.vendor_name().await?,
        };
        let name = match repo {
            Some(repo) => repo.to_string(),
            None => self.git.repository_name().await?,
        };
        Ok(RepositoryRef::new(owner, name)?)
    }

    /// Run one argv with the configured timeout, echoing every chunk as it
    /// arrives: stdout chunks to stdout, stderr chunks to stderr.
    pub async fn run_item<S: Into<String>>(
        &self,
        argv: impl IntoIterator<Item = S>,
        allow_failures: bool,
    ) -> Result<ProcessOutcome, CommandError> {
        let invocation = ProcessInvocation::new(argv)
            .in_dir(&self.context.working_dir)
            .with_timeout(self.context.timeout)
            .allow_failures(allow_failures);

        self.context.runner.run(&invocation, &mut echo_chunk).await
    }

    /// Run each line in order, stopping at the first line that fails without
    /// being allowed to.
    pub async fn run_commands(&self, commands: &[CommandLine]) -> Result<Vec<ProcessOutcome>, CommandError> {
        let mut outcomes = Vec::with_capacity(commands.len());
        for command in commands {
            let outcome = self
                .run_item(command.line.split_whitespace(), command.allow_failures)
                .await?;
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    pub fn describe_enum(&self, name: &str) -> Result<String, EnumError> {
        self.enums.describe(name)
    }

    pub fn validate_enum(&self, name: &str, value: &str) -> Result<(), EnumError> {
        self.enums.validate(name, value)
    }

    pub fn slugifier(&self) -> &dyn Slugifier {
        self.context.slugifier.as_ref()
    }

    pub fn render<I, K, V>(&self, template_id: &str, values: I) -> Result<String, TemplateError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.context.templates.render(template_id, values)
    }
}

fn echo_chunk(stream: OutputStream, chunk: &str) {
    match stream {
        OutputStream::Out => {
            let mut out = std::io::stdout().lock();
            let _ = write!(out, "{}{}", stream.prefix(), chunk);
            let _ = out.flush();
        }
        OutputStream::Err => {
            let mut err = std::io::stderr().lock();
            let _ = write!(err, "{}{}", stream.prefix(), chunk);
            let _ = err.flush();
        }
    }
}
