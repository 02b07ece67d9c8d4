use std::path::PathBuf;
use clap::Parser;
use crate::enums::commands::Commands;

#[derive(Parser, Debug)]
#[clap(name = "deploy-watch")]
#[clap(about = "Watch GitHub Actions runs waiting for deployment approval", long_about = None)]
#[clap(version)]
pub struct Cli {
    /// Configuration file (defaults to ~/.deploy-watch/config.toml)
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    /// Debug logging
    #[clap(short, long, global = true)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Commands,
}
