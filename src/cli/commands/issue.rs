use super::{Command, CommandBase, RepoArgs};
use crate::enums::EnumValidator;
use crate::github::GitHubError;
use crate::templates::{ISSUE_SHOW, NO_ISSUES};
use anyhow::Result;
use clap::Args;
use octocrab::models::issues::Issue;
use octocrab::models::IssueState;
use octocrab::params::State;

pub const STATE_ENUM: &str = "state";
pub const TYPE_ENUM: &str = "type";

/// List issues of a repository
#[derive(Args, Debug, Clone)]
pub struct IssueListCommand {
    #[command(flatten)]
    pub target: RepoArgs,
    /// Issue state: open, closed or all
    #[arg(long, default_value = "open")]
    pub state: String,
    /// Restrict to plain issues or pull requests: issue, pr or all
    #[arg(long = "type", default_value = "all")]
    pub kind: String,
}

impl Command for IssueListCommand {
    fn name(&self) -> &'static str {
        "issue:list"
    }

    fn define_enums(&self, enums: &mut EnumValidator) {
        enums.define(STATE_ENUM, ["open", "closed", "all"]);
        enums.define(TYPE_ENUM, ["issue", "pr", "all"]);
    }

    async fn execute(&self, base: &CommandBase) -> Result<i32> {
        base.validate_enum(STATE_ENUM, &self.state)?;
        base.validate_enum(TYPE_ENUM, &self.kind)?;

        let target = base
            .repository(self.target.org.as_deref(), self.target.repo.as_deref())
            .await?;
        let state = match self.state.as_str() {
            "closed" => State::Closed,
            "all" => State::All,
            _ => State::Open,
        };

        let first_page = base
            .github()?
            .issues(&target.owner, &target.repo)
            .list()
            .state(state)
            .per_page(100)
            .send()
            .await
            .map_err(GitHubError::from)?;
        let issues = base.all_pages(first_page).await?;

        let matching: Vec<&Issue> = issues
            .iter()
            .filter(|issue| matches_kind(&self.kind, issue.pull_request.is_some()))
            .collect();

        if matching.is_empty() {
            println!(
                "{}",
                base.render(
                    NO_ISSUES,
                    [
                        ("state", self.state.as_str()),
                        ("vendor", target.owner.as_str()),
                        ("repository", target.repo.as_str()),
                    ],
                )?
            );
            return Ok(CommandBase::SUCCESS);
        }

        for issue in matching {
            println!("#{} {}", issue.number, issue.title);
        }
        Ok(CommandBase::SUCCESS)
    }
}

fn matches_kind(kind: &str, is_pull_request: bool) -> bool {
    match kind {
        "issue" => !is_pull_request,
        "pr" => is_pull_request,
        _ => true,
    }
}

/// Show the details of one issue
#[derive(Args, Debug, Clone)]
pub struct IssueShowCommand {
    /// Issue number
    pub number: u64,
    #[command(flatten)]
    pub target: RepoArgs,
}

impl Command for IssueShowCommand {
    fn name(&self) -> &'static str {
        "issue:show"
    }

    async fn execute(&self, base: &CommandBase) -> Result<i32> {
        let target = base
            .repository(self.target.org.as_deref(), self.target.repo.as_deref())
            .await?;

        let issue = base
            .github()?
            .issues(&target.owner, &target.repo)
            .get(self.number)
            .await
            .map_err(GitHubError::from)?;

        let summary = IssueSummary::from(&issue);
        println!("{}", base.render(ISSUE_SHOW, summary.placeholders())?);
        Ok(CommandBase::SUCCESS)
    }
}

/// The parts of an issue the `issue_show` template displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueSummary {
    pub number: u64,
    pub state: String,
    pub author: String,
    pub assignee: Option<String>,
    pub is_pull_request: bool,
    pub milestone: Option<String>,
    pub labels: Vec<String>,
    pub title: String,
    pub body: String,
}

impl IssueSummary {
    pub fn kind(&self) -> &'static str {
        if self.is_pull_request {
            "Pull Request"
        } else {
            "Issue"
        }
    }

    /// Values in template order. A marker inside an earlier value is
    /// rewritten by a later key.
    pub fn placeholders(&self) -> Vec<(&'static str, String)> {
        vec![
            ("number", self.number.to_string()),
            ("state", self.state.clone()),
            ("author", self.author.clone()),
            ("assignee", self.assignee.clone().unwrap_or_else(|| "none".to_string())),
            ("type", self.kind().to_string()),
            ("milestone", self.milestone.clone().unwrap_or_else(|| "none".to_string())),
            ("labels", self.labels.join(", ")),
            ("title", self.title.clone()),
            ("body", self.body.clone()),
        ]
    }
}

impl From<&Issue> for IssueSummary {
    fn from(issue: &Issue) -> Self {
        let state = match issue.state {
            IssueState::Open => "open",
            IssueState::Closed => "closed",
            _ => "unknown",
        };

        Self {
            number: issue.number,
            state: state.to_string(),
            author: issue.user.login.clone(),
            assignee: issue.assignee.as_ref().map(|a| a.login.clone()),
            is_pull_request: issue.pull_request.is_some(),
            milestone: issue.milestone.as_ref().map(|m| m.title.clone()),
            labels: issue.labels.iter().map(|l| l.name.clone()).collect(),
            title: issue.title.clone(),
            body: issue.body.clone().unwrap_or_default(),
        }
    }
}
