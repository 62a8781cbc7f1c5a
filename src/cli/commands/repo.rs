use super::{Command, CommandBase};
use crate::templates::REPOSITORY_INFO;
use anyhow::Result;
use clap::Args;

/// Show the vendor, repository and branch of the working copy
#[derive(Args, Debug, Clone, Default)]
pub struct RepoInfoCommand {}

impl Command for RepoInfoCommand {
    fn name(&self) -> &'static str {
        "repo:info"
    }

    async fn execute(&self, base: &CommandBase) -> Result<i32> {
        let coordinates = base.git().coordinates().await?;

        println!(
            "{}",
            base.render(
                REPOSITORY_INFO,
                [
                    ("vendor", coordinates.vendor.as_str()),
                    ("repository", coordinates.repository.as_str()),
                    ("branch", coordinates.branch.as_str()),
                ],
            )?
        );

        if coordinates.repository.is_empty() {
            tracing::warn!("No origin remote found in {}", base.git().working_dir().display());
            return Ok(CommandBase::FAILURE);
        }
        Ok(CommandBase::SUCCESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::base::test_support::{context, ScriptedRunner};
    use crate::cli::commands::run_command;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_info_from_ssh_remote() {
        let runner = Arc::new(
            ScriptedRunner::default()
                .respond(
                    "git remote show -n origin",
                    0,
                    "* remote origin\n  Fetch URL: git@github.com:acme/widget.git\n  Push  URL: git@github.com:acme/widget.git\n",
                    "",
                )
                .respond("git branch", 0, "* main\n", ""),
        );

        let status = run_command(&RepoInfoCommand::default(), context(runner.clone())).await.unwrap();

        assert_eq!(status, CommandBase::SUCCESS);
        assert_eq!(
            runner.lines(),
            vec!["git remote show -n origin", "git remote show -n origin", "git branch"]
        );
    }

    #[tokio::test]
    async fn test_info_outside_a_repository_fails() {
        let runner = Arc::new(ScriptedRunner::default().respond("git branch", 128, "", "not a git repository"));

        let status = run_command(&RepoInfoCommand::default(), context(runner)).await.unwrap();
        assert_eq!(status, CommandBase::FAILURE);
    }
}
