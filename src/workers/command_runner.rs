use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use crate::config::config_manager::ConfigManager;
use crate::config::constants::{DEFAULT_APPROVAL_COMMENT, DEFAULT_BATCH_CHANNEL_CAPACITY};
use crate::enums::commands::Commands;
use crate::errors::{MonitorError, MonitorResult};
use crate::helpers::job_helper::limit_jobs;
use crate::logger::job_logger::JobLogger;
use crate::logger::progress_spinner::ProgressSpinner;
use crate::services::github_client::GithubClient;
use crate::services::monitor::Monitor;
use crate::structs::config::config::Config;
use crate::structs::job_batch::JobBatch;

pub struct CommandRunner {
    config_path: Option<PathBuf>,
    start_time: Option<Instant>,
}

impl CommandRunner {
    pub const fn new(config_path: Option<PathBuf>) -> Self {
        Self {
            config_path,
            start_time: None,
        }
    }

    pub async fn run_command(&mut self, command: Commands) -> MonitorResult<()> {
        self.start_time = Some(Instant::now());

        let result = match command {
            Commands::Init => self.init_command(),
            Commands::Validate => self.validate_command(),
            Commands::Pending { json } => self.pending_command(json).await,
            Commands::Recent { json, limit } => self.recent_command(json, limit).await,
            Commands::Watch { json } => self.watch_command(json).await,
            Commands::Approve { repo, run_id, comment } => self.approve_command(&repo, run_id, comment).await,
            Commands::Cancel { repo, run_id } => self.cancel_command(&repo, run_id).await,
        };

        if let Some(start) = self.start_time {
            let duration = start.elapsed();
            log::info!("⏱️  Command completed in {:.2}s", duration.as_secs_f64());
        }

        result
    }

    fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    fn init_command(&self) -> MonitorResult<()> {
        log::info!("🚀 Initializing deploy-watch configuration...");

        let path = ConfigManager::create_sample_config(self.config_path())?;
        log::info!("📝 Edit {} and set github.org", path.display());
        log::info!("🔧 Run 'deploy-watch validate' to check your configuration.");
        Ok(())
    }

    fn validate_command(&self) -> MonitorResult<()> {
        log::info!("🔍 Validating configuration...");

        let config = ConfigManager::load(self.config_path())?;
        if let Err(errors) = ConfigManager::validate_config(&config) {
            for error in &errors {
                log::error!("❌ {}", error);
            }
            return Err(MonitorError::config_error("config", format!("{} problem(s) found", errors.len())));
        }

        match ConfigManager::resolve_token(&config) {
            Ok(_) => log::info!("🔑 API token found"),
            Err(e) => log::warn!("⚠️  {}", e),
        }

        log::info!("✅ Configuration is valid (org: {})", config.github.org);
        Ok(())
    }

    fn load_config(&self) -> MonitorResult<Config> {
        let config = match ConfigManager::load(self.config_path()) {
            Ok(config) => config,
            Err(e) => {
                log::error!("❌ Failed to load configuration: {}", e);
                log::error!("💡 Run 'deploy-watch init' to create a configuration file.");
                return Err(e);
            }
        };

        if let Err(errors) = ConfigManager::validate_config(&config) {
            return Err(MonitorError::config_error("config", errors.join("; ")));
        }

        Ok(config)
    }

    fn build_monitor(&self) -> MonitorResult<(Config, Monitor)> {
        let config = self.load_config()?;
        let token = ConfigManager::resolve_token(&config)?;
        let client = GithubClient::new(&config.github.base_url, &config.github.org, &token)
            .map_err(|e| MonitorError::api_error("creating API client", e))?;

        let monitor = Monitor::new(Arc::new(client), &config)?;
        Ok((config, monitor))
    }

    /// Cancels the returned token on Ctrl-C.
    fn interrupt_token() -> CancellationToken {
        let token = CancellationToken::new();
        let trigger = token.clone();

        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::info!("🛑 Interrupted, stopping...");
                trigger.cancel();
            }
        });

        token
    }

    async fn pending_command(&self, json: bool) -> MonitorResult<()> {
        let (config, monitor) = self.build_monitor()?;
        let token = Self::interrupt_token();

        let mut spinner = ProgressSpinner::new("Looking for waiting runs", monitor.progress_tracker());
        if !json {
            spinner.start();
        }

        let jobs = match monitor.get_pending_jobs(&token).await {
            Ok(jobs) => {
                spinner.stop(&format!("Scan finished, {} waiting run(s)", jobs.len())).await;
                jobs
            }
            Err(e) => {
                spinner.error("Scan failed").await;
                return Err(e);
            }
        };

        if json {
            return JobLogger::print_json(&jobs);
        }

        let title = match config.monitor.environment_filter() {
            Some(environment) => format!("⏳ Waiting for approval in {}", environment),
            None => "⏳ Waiting for approval".to_string(),
        };
        JobLogger::print_jobs(&title, &jobs);
        Ok(())
    }

    async fn recent_command(&self, json: bool, limit: Option<usize>) -> MonitorResult<()> {
        let (_, monitor) = self.build_monitor()?;
        let token = Self::interrupt_token();

        let mut spinner = ProgressSpinner::new("Collecting recent runs", monitor.progress_tracker());
        if !json {
            spinner.start();
        }

        let jobs = match monitor.get_recent_jobs(&token).await {
            Ok(jobs) => {
                spinner.stop("Scan finished").await;
                jobs
            }
            Err(e) => {
                spinner.error("Scan failed").await;
                return Err(e);
            }
        };

        let jobs = match limit {
            Some(limit) => limit_jobs(jobs, limit),
            None => jobs,
        };

        if json {
            return JobLogger::print_json(&jobs);
        }

        JobLogger::print_jobs("🕘 Recent runs", &jobs);
        Ok(())
    }

    async fn watch_command(&self, json: bool) -> MonitorResult<()> {
        let (_, monitor) = self.build_monitor()?;
        let token = Self::interrupt_token();
        let (sender, mut receiver) = mpsc::channel::<JobBatch>(DEFAULT_BATCH_CHANNEL_CAPACITY);

        log::info!(
            "👀 Watching for waiting runs every {}s (Ctrl-C to stop)",
            monitor.update_interval().as_secs()
        );

        let printer = async {
            while let Some(batch) = receiver.recv().await {
                if let Err(e) = JobLogger::print_batch(&batch, json) {
                    log::error!("❌ {}", e);
                    token.cancel();
                    return Err(e);
                }
            }
            Ok(())
        };

        let ((), printed) = tokio::join!(monitor.start_monitoring(&token, sender), printer);

        let stats = monitor.environment_cache_stats();
        log::debug!("📊 Environment cache held {} entries at shutdown", stats.total());
        printed
    }

    async fn approve_command(&self, repo: &str, run_id: u64, comment: Option<String>) -> MonitorResult<()> {
        let (_, monitor) = self.build_monitor()?;
        let token = Self::interrupt_token();
        let comment = comment.unwrap_or_else(|| DEFAULT_APPROVAL_COMMENT.to_string());

        let approved = monitor.approve_pending_deployments(&token, repo, run_id, &comment).await?;
        if approved.is_empty() {
            println!("Nothing to approve for run {} in {}", run_id, repo);
            return Ok(());
        }

        for deployment in &approved {
            println!("✅ Approved {} for run {} in {}", deployment.environment_name, run_id, repo);
        }
        Ok(())
    }

    async fn cancel_command(&self, repo: &str, run_id: u64) -> MonitorResult<()> {
        let (_, monitor) = self.build_monitor()?;
        let token = Self::interrupt_token();

        monitor.cancel_workflow_run(&token, repo, run_id).await?;
        println!("🚫 Cancelled run {} in {}", run_id, repo);
        Ok(())
    }
}
