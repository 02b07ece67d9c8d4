use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a sample configuration file
    Init,
    /// Check the configuration and report every problem found
    Validate,
    /// List runs waiting for deployment approval
    Pending {
        #[clap(long)]
        json: bool,
    },
    /// List the most recent runs across active repositories
    Recent {
        #[clap(long)]
        json: bool,
        #[clap(short, long)]
        limit: Option<usize>,
    },
    /// Keep polling for waiting runs until interrupted
    Watch {
        #[clap(long)]
        json: bool,
    },
    /// Approve every pending deployment of a run you are allowed to approve
    Approve {
        #[clap(short, long)]
        repo: String,
        #[clap(long)]
        run_id: u64,
        #[clap(short, long)]
        comment: Option<String>,
    },
    /// Cancel a workflow run
    Cancel {
        #[clap(short, long)]
        repo: String,
        #[clap(long)]
        run_id: u64,
    },
}
