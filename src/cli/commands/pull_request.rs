use super::{Command, CommandBase, RepoArgs};
use crate::github::GitHubError;
use crate::templates::NO_LABELS;
use anyhow::Result;
use clap::Args;

/// List the labels available to pull requests in a repository
#[derive(Args, Debug, Clone, Default)]
pub struct PullRequestLabelsCommand {
    #[command(flatten)]
    pub target: RepoArgs,
}

impl Command for PullRequestLabelsCommand {
    fn name(&self) -> &'static str {
        "pull-request:labels"
    }

    async fn execute(&self, base: &CommandBase) -> Result<i32> {
        let target = base
            .repository(self.target.org.as_deref(), self.target.repo.as_deref())
            .await?;
        let first_page = base
            .github()?
            .issues(&target.owner, &target.repo)
            .list_labels_for_repo()
            .per_page(100)
            .send()
            .await
            .map_err(GitHubError::from)?;
        let labels = base.all_pages(first_page).await?;

        if labels.is_empty() {
            println!(
                "{}",
                base.render(NO_LABELS, [("vendor", &target.owner), ("repository", &target.repo)])?
            );
            return Ok(CommandBase::SUCCESS);
        }

        for label in &labels {
            println!("{}", label.name);
        }
        Ok(CommandBase::SUCCESS)
    }
}
