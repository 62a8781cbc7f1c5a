use clap::{Parser, Subcommand};

pub mod commands;

use commands::branch::{BranchNameCommand, BranchSyncCommand};
use commands::issue::{IssueListCommand, IssueShowCommand};
use commands::pull_request::PullRequestLabelsCommand;
use commands::release::ReleaseListCommand;
use commands::repo::RepoInfoCommand;
use commands::{run_command, AppContext, Command};

#[derive(Parser)]
#[command(name = "ghkit")]
#[command(about = "Everyday GitHub and git chores from the command line")]
#[command(long_about = "ghkit wraps the GitHub API and the local git checkout behind a small set of \
                       commands. The target repository is read from the origin remote unless \
                       --org and --repo are given.")]
pub struct Cli {
    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub json_logs: bool,
    /// Timeout in seconds for each external command
    #[arg(long, global = true, value_name = "SECONDS")]
    pub timeout: Option<u64>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Pull request helpers
    #[command(subcommand)]
    PullRequest(PullRequestCommands),
    /// Issue helpers
    #[command(subcommand)]
    Issue(IssueCommands),
    /// Release helpers
    #[command(subcommand)]
    Release(ReleaseCommands),
    /// Local branch helpers
    #[command(subcommand)]
    Branch(BranchCommands),
    /// Working copy information
    #[command(subcommand)]
    Repo(RepoCommands),
}

#[derive(Subcommand)]
pub enum PullRequestCommands {
    /// List labels usable on pull requests
    Labels(PullRequestLabelsCommand),
}

#[derive(Subcommand)]
pub enum IssueCommands {
    /// List issues
    List(IssueListCommand),
    /// Show one issue
    Show(IssueShowCommand),
}

#[derive(Subcommand)]
pub enum ReleaseCommands {
    /// List releases as a table
    List(ReleaseListCommand),
}

#[derive(Subcommand)]
pub enum BranchCommands {
    /// Fetch, check out and rebase a branch on its remote
    Sync(BranchSyncCommand),
    /// Print a branch name built from a title
    Name(BranchNameCommand),
}

#[derive(Subcommand)]
pub enum RepoCommands {
    /// Show vendor, repository and branch
    Info(RepoInfoCommand),
}

impl Commands {
    /// Name of the selected command, used for the command span.
    pub fn name(&self) -> &'static str {
        match self {
            Commands::PullRequest(PullRequestCommands::Labels(c)) => c.name(),
            Commands::Issue(IssueCommands::List(c)) => c.name(),
            Commands::Issue(IssueCommands::Show(c)) => c.name(),
            Commands::Release(ReleaseCommands::List(c)) => c.name(),
            Commands::Branch(BranchCommands::Sync(c)) => c.name(),
            Commands::Branch(BranchCommands::Name(c)) => c.name(),
            Commands::Repo(RepoCommands::Info(c)) => c.name(),
        }
    }

    /// Run the selected command and return its coarse status.
    pub async fn dispatch(&self, context: AppContext) -> anyhow::Result<i32> {
        match self {
            Commands::PullRequest(PullRequestCommands::Labels(c)) => run_command(c, context).await,
            Commands::Issue(IssueCommands::List(c)) => run_command(c, context).await,
            Commands::Issue(IssueCommands::Show(c)) => run_command(c, context).await,
            Commands::Release(ReleaseCommands::List(c)) => run_command(c, context).await,
            Commands::Branch(BranchCommands::Sync(c)) => run_command(c, context).await,
            Commands::Branch(BranchCommands::Name(c)) => run_command(c, context).await,
            Commands::Repo(RepoCommands::Info(c)) => run_command(c, context).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_nested_subcommands() {
        let cli = Cli::parse_from(["ghkit", "issue", "list", "--state", "closed", "--type", "pr", "--org", "acme"]);
        assert_eq!(cli.command.name(), "issue:list");
        match cli.command {
            Commands::Issue(IssueCommands::List(list)) => {
                assert_eq!(list.state, "closed");
                assert_eq!(list.kind, "pr");
                assert_eq!(list.target.org.as_deref(), Some("acme"));
                assert!(list.target.repo.is_none());
            }
            _ => panic!("expected issue list"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["ghkit", "branch", "name", "Fix", "Login", "--timeout", "30", "--json-logs"]);
        assert_eq!(cli.timeout, Some(30));
        assert!(cli.json_logs);
        match cli.command {
            Commands::Branch(BranchCommands::Name(name)) => assert_eq!(name.title, vec!["Fix", "Login"]),
            _ => panic!("expected branch name"),
        }
    }

    #[test]
    fn test_issue_list_defaults() {
        let cli = Cli::parse_from(["ghkit", "issue", "list"]);
        match cli.command {
            Commands::Issue(IssueCommands::List(list)) => {
                assert_eq!(list.state, "open");
                assert_eq!(list.kind, "all");
            }
            _ => panic!("expected issue list"),
        }
    }
}
