use std::sync::Arc;
use std::time::Duration;
use chrono::Utc;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use crate::enums::resource_class::ResourceClass;
use crate::enums::scan_mode::ScanMode;
use crate::errors::{MonitorError, MonitorResult};
use crate::helpers::job_helper::{limit_jobs, sort_jobs_by_time, SortOrder};
use crate::services::environment_cache::EnvironmentCache;
use crate::services::progress_tracker::ProgressTracker;
use crate::services::rate_limiter::RateLimiter;
use crate::services::repository_manager::RepositoryManager;
use crate::services::scanners::recent_scanner::RecentScanner;
use crate::services::scanners::smart_scanner::SmartScanner;
use crate::services::worker_pool::{ProgressReporter, WorkerPool, WorkerPoolConfig};
use crate::structs::cache_stats::CacheStats;
use crate::structs::config::config::Config;
use crate::structs::config::monitor_config::MonitorConfig;
use crate::structs::config::worker_config::WorkerConfig;
use crate::structs::job_batch::JobBatch;
use crate::structs::job_status::JobStatus;
use crate::structs::scan_progress::ScanProgress;
use crate::structs::workflow::PendingDeployment;
use crate::traits::github_api::GithubApi;
use crate::traits::scanner::Scanner;

/// Orchestrates inventory, scanners, worker pools and progress into the
/// pending and recent job views, and drives the polling loop.
pub struct Monitor {
    api: Arc<dyn GithubApi>,
    rate_limiter: Arc<RateLimiter>,
    repo_manager: RepositoryManager,
    environment_cache: Arc<EnvironmentCache>,
    progress_tracker: Arc<ProgressTracker>,
    smart_pool: WorkerPool,
    recent_scanner: Arc<dyn Scanner>,
    monitor_config: MonitorConfig,
    worker_config: WorkerConfig,
    max_smart_repos: usize,
    max_active_repos: usize,
}

impl Monitor {
    pub fn new(api: Arc<dyn GithubApi>, config: &Config) -> MonitorResult<Self> {
        if config.monitor.interval_secs == 0 {
            return Err(MonitorError::config_error("monitor.interval_secs", "polling interval must be positive, got 0"));
        }
        if config.workers.smart_workers == 0 || config.workers.recent_workers == 0 {
            return Err(MonitorError::config_error("workers", "worker counts must be positive"));
        }

        let rate_limiter = Arc::new(RateLimiter::new(&config.rate_limits)?);
        let repo_manager = RepositoryManager::new(Arc::clone(&api), Arc::clone(&rate_limiter), config.repositories.clone());
        let environment_cache = Arc::new(EnvironmentCache::new(
            Arc::clone(&api),
            Arc::clone(&rate_limiter),
            config.environment_cache.clone(),
        ));

        let activity_window = config.repositories.activity_window();
        let smart_scanner = SmartScanner::new(
            Arc::clone(&api),
            Arc::clone(&rate_limiter),
            environment_cache.clone(),
            config.monitor.environment_filter().map(str::to_string),
            activity_window,
            config.workers.smart_page_size,
        );
        let recent_scanner = RecentScanner::new(
            Arc::clone(&api),
            Arc::clone(&rate_limiter),
            activity_window,
            config.workers.recent_page_size,
        );

        let smart_pool = WorkerPool::new(
            config.workers.smart_workers,
            Arc::new(smart_scanner),
            WorkerPoolConfig::from_worker_config(&config.workers),
        );

        Ok(Self {
            api,
            rate_limiter,
            repo_manager,
            environment_cache,
            progress_tracker: Arc::new(ProgressTracker::new()),
            smart_pool,
            recent_scanner: Arc::new(recent_scanner),
            monitor_config: config.monitor.clone(),
            worker_config: config.workers.clone(),
            max_smart_repos: config.repositories.max_smart_repos,
            max_active_repos: config.repositories.max_active_repos,
        })
    }

    pub fn progress_tracker(&self) -> Arc<ProgressTracker> {
        Arc::clone(&self.progress_tracker)
    }

    pub fn get_scan_progress(&self) -> ScanProgress {
        let mut progress = self.progress_tracker.get_progress();
        progress.cache_status = self.repo_manager.cache_status();
        progress
    }

    pub const fn update_interval(&self) -> Duration {
        self.monitor_config.interval()
    }

    pub fn environment_cache_stats(&self) -> CacheStats {
        self.environment_cache.stats()
    }

    pub async fn get_pending_jobs(&self, token: &CancellationToken) -> MonitorResult<Vec<JobStatus>> {
        self.bounded(self.monitor_config.pending_timeout(), self.scan_pending(token, None)).await
    }

    pub async fn get_pending_jobs_with_progress(
        &self,
        token: &CancellationToken,
        progress: mpsc::Sender<ScanProgress>,
    ) -> MonitorResult<Vec<JobStatus>> {
        self.bounded(self.monitor_config.pending_timeout(), self.scan_pending(token, Some(progress))).await
    }

    pub async fn get_recent_jobs(&self, token: &CancellationToken) -> MonitorResult<Vec<JobStatus>> {
        self.bounded(self.monitor_config.recent_timeout(), self.scan_recent(token, None)).await
    }

    pub async fn get_recent_jobs_with_progress(
        &self,
        token: &CancellationToken,
        progress: mpsc::Sender<ScanProgress>,
    ) -> MonitorResult<Vec<JobStatus>> {
        self.bounded(self.monitor_config.recent_timeout(), self.scan_recent(token, Some(progress))).await
    }

    /// Applies the scan deadline and returns the tracker to idle whatever the
    /// outcome.
    async fn bounded<F>(&self, limit: Duration, scan: F) -> MonitorResult<Vec<JobStatus>>
    where
        F: std::future::Future<Output = MonitorResult<Vec<JobStatus>>>,
    {
        let result = match tokio::time::timeout(limit, scan).await {
            Ok(result) => result,
            Err(_) => Err(MonitorError::Timeout(limit)),
        };
        self.progress_tracker.set_idle();
        result
    }

    async fn scan_pending(
        &self,
        token: &CancellationToken,
        progress: Option<mpsc::Sender<ScanProgress>>,
    ) -> MonitorResult<Vec<JobStatus>> {
        let all_repos = self.repo_manager.get_repositories_with_cache(token).await?;
        let smart_repos = self.repo_manager.get_smart_repositories(token, self.max_smart_repos).await?;

        let stats = RepositoryManager::calculate_repo_stats(&all_repos);
        self.progress_tracker.initialize_progress(
            ScanMode::ScanningSmart,
            all_repos.len(),
            smart_repos.len(),
            self.worker_config.smart_workers,
            stats,
        );
        let reporter = self.reporter(token, progress).await?;

        let started = Instant::now();
        let report = self.smart_pool.scan_repositories(token, smart_repos, Some(reporter)).await;
        let mut jobs = report.into_result()?;
        sort_jobs_by_time(&mut jobs, SortOrder::OldestFirst);

        log::info!(
            "⏳ Pending scan: {} waiting jobs across {} repositories in {:.2}s",
            jobs.len(),
            stats.valid,
            started.elapsed().as_secs_f64()
        );
        Ok(jobs)
    }

    async fn scan_recent(
        &self,
        token: &CancellationToken,
        progress: Option<mpsc::Sender<ScanProgress>>,
    ) -> MonitorResult<Vec<JobStatus>> {
        let active_repos = self.repo_manager.get_active_repositories(token, self.max_active_repos).await?;
        let all_repos = self.repo_manager.get_repositories_with_cache(token).await?;

        let stats = RepositoryManager::calculate_repo_stats(&all_repos);
        self.progress_tracker.initialize_progress(
            ScanMode::ScanningRecent,
            all_repos.len(),
            active_repos.len(),
            self.worker_config.recent_workers,
            stats,
        );
        let reporter = self.reporter(token, progress).await?;

        let pool = WorkerPool::new(
            self.worker_config.recent_workers,
            Arc::clone(&self.recent_scanner),
            WorkerPoolConfig::from_worker_config(&self.worker_config),
        );

        let started = Instant::now();
        let report = pool.scan_repositories(token, active_repos, Some(reporter)).await;
        let mut jobs = report.into_result()?;
        sort_jobs_by_time(&mut jobs, SortOrder::NewestFirst);
        let jobs = limit_jobs(jobs, self.monitor_config.recent_job_limit);

        log::info!("📋 Recent scan: {} jobs in {:.2}s", jobs.len(), started.elapsed().as_secs_f64());
        Ok(jobs)
    }

    /// Publishes the freshly initialized snapshot before any repository
    /// completes.
    async fn reporter(
        &self,
        token: &CancellationToken,
        progress: Option<mpsc::Sender<ScanProgress>>,
    ) -> MonitorResult<ProgressReporter> {
        let Some(sender) = progress else {
            return Ok(ProgressReporter::new(self.progress_tracker()));
        };

        tokio::select! {
            biased;
            () = token.cancelled() => return Err(MonitorError::Cancelled),
            sent = sender.send(self.progress_tracker.get_progress()) => {
                if sent.is_err() {
                    log::debug!("Progress receiver dropped before the scan started");
                }
            }
        }

        Ok(ProgressReporter::with_channel(self.progress_tracker(), sender))
    }

    /// Runs a pending scan now and then once per interval, publishing one
    /// batch per cycle, until the token is cancelled or the receiver goes
    /// away. A failed cycle is published as an error batch and the loop
    /// carries on.
    pub async fn start_monitoring(&self, token: &CancellationToken, batches: mpsc::Sender<JobBatch>) {
        let interval = self.update_interval();
        let sweeper = tokio::spawn(sweep_environment_cache(
            Arc::clone(&self.environment_cache),
            token.clone(),
            self.monitor_config.cache_cleanup_interval(),
        ));

        let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let step = chrono::Duration::from_std(interval).unwrap_or_else(|_| chrono::Duration::zero());

        log::info!("👀 Monitoring started, scanning every {}s", interval.as_secs());

        let mut cycle: u64 = 0;
        loop {
            cycle += 1;
            self.progress_tracker.set_next_scan_timer(Utc::now() + step, cycle);

            let outcome = match self.get_pending_jobs(token).await {
                Ok(jobs) => {
                    self.progress_tracker.set_scan_completed();
                    Ok(jobs)
                }
                Err(_) if token.is_cancelled() => break,
                Err(e) => {
                    log::warn!("⚠️ Scan cycle {} failed: {}", cycle, e);
                    Err(e.to_string())
                }
            };

            let batch = JobBatch {
                cycle,
                completed_at: Utc::now(),
                outcome,
            };

            tokio::select! {
                biased;
                () = token.cancelled() => break,
                sent = batches.send(batch) => {
                    if sent.is_err() {
                        log::info!("Job batch receiver closed; stopping monitor");
                        break;
                    }
                }
            }

            tokio::select! {
                biased;
                () = token.cancelled() => break,
                _ = ticker.tick() => {}
            }
        }

        sweeper.abort();
        log::info!("🛑 Monitoring stopped after {} cycle(s)", cycle);
    }

    pub async fn cancel_workflow_run(&self, token: &CancellationToken, repo: &str, run_id: u64) -> MonitorResult<()> {
        self.rate_limiter
            .run(ResourceClass::WorkflowRuns, token, self.api.cancel_workflow_run(repo, run_id))
            .await?
            .map_err(|e| MonitorError::api_error(format!("cancelling run {} in {}", run_id, repo), e))?;

        log::info!("🚫 Cancelled run {} in {}", run_id, repo);
        Ok(())
    }

    /// Approves every environment gate of the run that the current user is
    /// allowed to approve and returns those gates.
    pub async fn approve_pending_deployments(
        &self,
        token: &CancellationToken,
        repo: &str,
        run_id: u64,
        comment: &str,
    ) -> MonitorResult<Vec<PendingDeployment>> {
        let pending = self
            .rate_limiter
            .run(ResourceClass::Deployments, token, self.api.list_pending_deployments(repo, run_id))
            .await?
            .map_err(|e| MonitorError::api_error(format!("listing pending deployments of run {} in {}", run_id, repo), e))?;

        let approvable: Vec<PendingDeployment> = pending.into_iter().filter(|p| p.current_user_can_approve).collect();
        if approvable.is_empty() {
            log::info!("No approvable deployments for run {} in {}", run_id, repo);
            return Ok(approvable);
        }

        let environment_ids: Vec<u64> = approvable.iter().map(|p| p.environment_id).collect();
        self.rate_limiter
            .run(
                ResourceClass::Deployments,
                token,
                self.api.approve_pending_deployment(repo, run_id, &environment_ids, comment),
            )
            .await?
            .map_err(|e| MonitorError::api_error(format!("approving run {} in {}", run_id, repo), e))?;

        log::info!("✅ Approved run {} in {} for {} environment(s)", run_id, repo, approvable.len());
        Ok(approvable)
    }
}

async fn sweep_environment_cache(cache: Arc<EnvironmentCache>, token: CancellationToken, every: Duration) {
    let mut ticker = tokio::time::interval_at(Instant::now() + every, every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = token.cancelled() => return,
            _ = ticker.tick() => {
                cache.cleanup_expired();
            }
        }
    }
}
