use clap::Parser;
use deploy_watch::errors::ErrorHandler;
use deploy_watch::structs::cli::Cli;
use deploy_watch::workers::command_runner::CommandRunner;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();

    let mut runner = CommandRunner::new(cli.config);
    if let Err(e) = runner.run_command(cli.command).await {
        ErrorHandler::handle_error(&e);
        return Err(e.into());
    }

    Ok(())
}
