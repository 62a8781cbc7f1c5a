use super::{Command, CommandBase, CommandLine};
use crate::templates::{BRANCH_NAME, BRANCH_SYNCED};
use anyhow::{bail, Result};
use clap::Args;

/// Bring the current branch up to date with its remote counterpart
#[derive(Args, Debug, Clone, Default)]
pub struct BranchSyncCommand {
    /// Remote to sync with (default: `branch.remote` setting, then origin)
    #[arg(long)]
    pub remote: Option<String>,
    /// Branch to sync (default: the checked out branch)
    #[arg(long)]
    pub branch: Option<String>,
}

impl Command for BranchSyncCommand {
    fn name(&self) -> &'static str {
        "branch:sync"
    }

    async fn execute(&self, base: &CommandBase) -> Result<i32> {
        let remote = self
            .remote
            .clone()
            .or_else(|| base.parameter("branch.remote"))
            .unwrap_or_else(|| "origin".to_string());

        let branch = match &self.branch {
            Some(branch) => branch.clone(),
            None => base.git().current_branch().await?,
        };
        if branch.is_empty() {
            bail!("Could not determine the current branch, pass --branch explicitly");
        }

        tracing::info!(remote = %remote, branch = %branch, "Syncing branch");

        // An unreachable remote should not stop a local checkout.
        base.run_commands(&[
            CommandLine::allowing_failures(format!("git fetch {remote}")),
            CommandLine::new(format!("git checkout {branch}")),
            CommandLine::new(format!("git pull --rebase {remote} {branch}")),
        ])
        .await?;

        println!(
            "{}",
            base.render(BRANCH_SYNCED, [("branch", branch.as_str()), ("remote", remote.as_str())])?
        );
        Ok(CommandBase::SUCCESS)
    }
}

/// Print a branch name derived from a title
#[derive(Args, Debug, Clone, Default)]
pub struct BranchNameCommand {
    /// Free text to build the name from, e.g. an issue title
    #[arg(required = true)]
    pub title: Vec<String>,
    /// Prefix prepended to the slug (default: `branch.prefix` setting)
    #[arg(long)]
    pub prefix: Option<String>,
}

impl Command for BranchNameCommand {
    fn name(&self) -> &'static str {
        "branch:name"
    }

    async fn execute(&self, base: &CommandBase) -> Result<i32> {
        let slug = base.slugifier().slugify(&self.title.join(" "));
        if slug.is_empty() {
            tracing::warn!("Title has no characters usable in a branch name");
            return Ok(CommandBase::FAILURE);
        }

        let prefix = self
            .prefix
            .clone()
            .or_else(|| base.parameter("branch.prefix"))
            .unwrap_or_default();

        println!(
            "{}",
            base.render(BRANCH_NAME, [("prefix", prefix.as_str()), ("slug", slug.as_str())])?
        );
        Ok(CommandBase::SUCCESS)
    }
}
