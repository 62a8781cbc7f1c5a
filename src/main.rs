use anyhow::Result;
use clap::Parser;
use ghkit::cli::Cli;
use ghkit::{
    create_command_span, generate_correlation_id, init_telemetry, AppContext, CommandBase, Configuration,
    GitHubClient, LatinSlugifier, TemplateRenderer, TokioProcessRunner,
};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(status) if status == CommandBase::SUCCESS => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("❌ {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<i32> {
    Configuration::load_env_file()?;
    let config = Configuration::load()?;

    let observability = &config.settings().observability;
    init_telemetry(&observability.log_level, cli.json_logs || observability.json_logs)?;

    let timeout = cli
        .timeout
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.timeout());
    if timeout.is_zero() {
        anyhow::bail!("--timeout must be greater than zero");
    }

    let context = AppContext {
        github: GitHubClient::from_config(&config.settings().github)?,
        config: Arc::new(config),
        templates: Arc::new(TemplateRenderer::builtin()),
        runner: Arc::new(TokioProcessRunner),
        slugifier: Arc::new(LatinSlugifier::default()),
        working_dir: std::env::current_dir()?,
        timeout,
    };

    let correlation_id = generate_correlation_id();
    let span = create_command_span(cli.command.name(), &correlation_id);

    async {
        tracing::debug!(timeout_secs = timeout.as_secs(), "Starting command");
        let status = cli.command.dispatch(context).await?;
        tracing::debug!(status, "Command finished");
        Ok::<_, anyhow::Error>(status)
    }
    .instrument(span)
    .await
}
