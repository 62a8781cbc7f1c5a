use crate::enums::EnumValidator;
use anyhow::Result;
use clap::Args;

pub mod base;
pub mod branch;
pub mod issue;
pub mod pull_request;
pub mod release;
pub mod repo;

pub use base::{AppContext, CommandBase, CommandLine};

/// A concrete CLI command built on the shared harness.
#[allow(async_fn_in_trait)]
pub trait Command {
    /// Name used in logs and spans.
    fn name(&self) -> &'static str;

    /// Register the enumerated option domains this command validates.
    fn define_enums(&self, _enums: &mut EnumValidator) {}

    /// Returns [`CommandBase::SUCCESS`] or [`CommandBase::FAILURE`].
    async fn execute(&self, base: &CommandBase) -> Result<i32>;
}

/// Give the command its own enum table and run it.
pub async fn run_command<C: Command>(command: &C, context: AppContext) -> Result<i32> {
    let mut enums = EnumValidator::new();
    command.define_enums(&mut enums);
    let base = CommandBase::new(context, enums);

    tracing::debug!(command = command.name(), "Executing command");
    command.execute(&base).await
}

/// Repository selection shared by the API commands. Missing values are read
/// from the `origin` remote.
#[derive(Args, Debug, Clone, Default)]
pub struct RepoArgs {
    /// Repository owner or organization
    #[arg(long)]
    pub org: Option<String>,
    /// Repository name
    #[arg(long)]
    pub repo: Option<String>,
}
