use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use crate::errors::{MonitorError, MonitorResult};
use crate::services::performance_optimizer::PerformanceOptimizer;
use crate::services::progress_tracker::ProgressTracker;
use crate::structs::config::worker_config::WorkerConfig;
use crate::structs::job_status::JobStatus;
use crate::structs::repository::Repository;
use crate::structs::scan_progress::ScanProgress;
use crate::structs::scan_report::ScanReport;
use crate::traits::scanner::Scanner;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerPoolConfig {
    pub base_delay: Duration,
    pub stagger: Duration,
    pub slow_threshold: Duration,
}

impl WorkerPoolConfig {
    pub const fn from_worker_config(config: &WorkerConfig) -> Self {
        Self {
            base_delay: config.base_delay(),
            stagger: config.stagger(),
            slow_threshold: config.slow_threshold(),
        }
    }
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self::from_worker_config(&WorkerConfig::default())
    }
}

/// Where per-repository completion is reported: always the tracker, and a
/// snapshot channel when a consumer wants live updates.
#[derive(Clone)]
pub struct ProgressReporter {
    tracker: Arc<ProgressTracker>,
    sender: Option<mpsc::Sender<ScanProgress>>,
}

impl ProgressReporter {
    pub const fn new(tracker: Arc<ProgressTracker>) -> Self {
        Self { tracker, sender: None }
    }

    pub const fn with_channel(tracker: Arc<ProgressTracker>, sender: mpsc::Sender<ScanProgress>) -> Self {
        Self {
            tracker,
            sender: Some(sender),
        }
    }

    async fn report(&self, token: &CancellationToken, completed: usize) -> MonitorResult<()> {
        self.tracker.update_completed(completed);

        let Some(sender) = &self.sender else {
            return Ok(());
        };

        let snapshot = self.tracker.get_progress();
        tokio::select! {
            biased;
            () = token.cancelled() => Err(MonitorError::Cancelled),
            sent = sender.send(snapshot) => {
                if sent.is_err() {
                    log::debug!("Progress receiver dropped; continuing without live updates");
                }
                Ok(())
            }
        }
    }
}

type ScanOutcome = MonitorResult<Vec<JobStatus>>;

/// Fixed-size pool applying one `Scanner` across a repository batch.
pub struct WorkerPool {
    max_workers: usize,
    scanner: Arc<dyn Scanner>,
    config: WorkerPoolConfig,
    optimizer: Arc<PerformanceOptimizer>,
}

impl WorkerPool {
    pub fn new(max_workers: usize, scanner: Arc<dyn Scanner>, config: WorkerPoolConfig) -> Self {
        Self {
            max_workers: max_workers.max(1),
            scanner,
            optimizer: Arc::new(PerformanceOptimizer::new(config.slow_threshold)),
            config,
        }
    }

    pub fn optimizer(&self) -> &PerformanceOptimizer {
        &self.optimizer
    }

    /// Scans every repository once. A failing repository only loses its own
    /// results; cancellation stops the batch and the report keeps whatever
    /// had already completed.
    pub async fn scan_repositories(
        &self,
        token: &CancellationToken,
        repos: Vec<Repository>,
        reporter: Option<ProgressReporter>,
    ) -> ScanReport {
        if repos.is_empty() {
            return ScanReport::default();
        }

        let worker_count = self.max_workers.min(repos.len());
        let total = repos.len();
        let scan_token = token.child_token();
        let started = Instant::now();

        log::debug!("🔍 {} scan of {} repositories with {} workers", self.scanner.name(), total, worker_count);

        let (queue_tx, queue_rx) = mpsc::channel::<Repository>(worker_count);
        let queue_rx = Arc::new(Mutex::new(queue_rx));
        let (result_tx, mut result_rx) = mpsc::channel::<ScanOutcome>(total);

        let mut workers = JoinSet::new();
        workers.spawn(feed(scan_token.clone(), repos, queue_tx));
        for index in 0..worker_count {
            workers.spawn(work(
                index,
                scan_token.clone(),
                Arc::clone(&self.scanner),
                Arc::clone(&self.optimizer),
                self.config,
                Arc::clone(&queue_rx),
                result_tx.clone(),
            ));
        }
        drop(result_tx);

        let mut report = ScanReport::default();
        let mut seen = HashSet::new();

        loop {
            let received = tokio::select! {
                biased;
                () = scan_token.cancelled() => {
                    // Results that finished before the stop still count.
                    while let Ok(outcome) = result_rx.try_recv() {
                        if outcome.is_ok() {
                            aggregate(&mut report, &mut seen, outcome);
                        }
                    }
                    report.error = Some(MonitorError::Cancelled);
                    break;
                }
                received = result_rx.recv() => received,
            };

            let Some(outcome) = received else {
                break;
            };
            if matches!(outcome, Err(MonitorError::Cancelled)) {
                report.error = Some(MonitorError::Cancelled);
                break;
            }
            aggregate(&mut report, &mut seen, outcome);

            if let Some(reporter) = &reporter {
                if let Err(e) = reporter.report(&scan_token, report.completed).await {
                    report.error = Some(e);
                    break;
                }
            }

            if report.completed == total {
                break;
            }
        }

        scan_token.cancel();
        workers.shutdown().await;

        log::debug!(
            "{} scan finished: {}/{} repositories, {} jobs in {:.2}s",
            self.scanner.name(),
            report.completed,
            total,
            report.jobs.len(),
            started.elapsed().as_secs_f64()
        );
        if self.optimizer.is_server_under_load() {
            log::warn!("🐢 API latency averaging {:?}; slowing down workers", self.optimizer.average_response_time());
        }

        report
    }
}

fn aggregate(report: &mut ScanReport, seen: &mut HashSet<(String, u64, u64)>, outcome: ScanOutcome) {
    report.completed += 1;

    match outcome {
        Ok(jobs) => {
            for job in jobs {
                let (repository, run_id, id) = job.identity();
                if seen.insert((repository.to_string(), run_id, id)) {
                    report.jobs.push(job);
                }
            }
        }
        Err(e) => log::warn!("Repository scan failed: {}", e),
    }
}

async fn feed(token: CancellationToken, repos: Vec<Repository>, queue: mpsc::Sender<Repository>) {
    for repo in repos {
        tokio::select! {
            biased;
            () = token.cancelled() => return,
            sent = queue.send(repo) => {
                if sent.is_err() {
                    return;
                }
            }
        }
    }
}

async fn work(
    index: usize,
    token: CancellationToken,
    scanner: Arc<dyn Scanner>,
    optimizer: Arc<PerformanceOptimizer>,
    config: WorkerPoolConfig,
    queue: Arc<Mutex<mpsc::Receiver<Repository>>>,
    results: mpsc::Sender<ScanOutcome>,
) {
    // Worker index is tiny; the stagger is a few hundred milliseconds at most.
    let base_delay = config.base_delay + config.stagger * u32::try_from(index).unwrap_or(u32::MAX);

    loop {
        let next = {
            let mut queue = queue.lock().await;
            tokio::select! {
                biased;
                () = token.cancelled() => None,
                repo = queue.recv() => repo,
            }
        };
        let Some(repo) = next else {
            return;
        };

        let started = Instant::now();
        let outcome = scanner.scan_repository(&token, &repo).await;
        optimizer.record_response_time(started.elapsed());

        if results.send(outcome).await.is_err() {
            return;
        }

        tokio::select! {
            biased;
            () = token.cancelled() => return,
            () = tokio::time::sleep(optimizer.optimal_delay(base_delay)) => {}
        }
    }
}
