use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use deploy_watch::enums::api_error::ApiError;
use deploy_watch::structs::config::config::Config;
use deploy_watch::structs::page::Page;
use deploy_watch::structs::repository::Repository;
use deploy_watch::structs::workflow::{Deployment, Environment, PendingDeployment, RunFilter, WorkflowJob, WorkflowRun};
use deploy_watch::traits::github_api::GithubApi;

/// In-memory organization that records which repositories were touched.
#[derive(Default)]
pub struct FakeGithub {
    repos: Vec<Repository>,
    runs: HashMap<String, Vec<WorkflowRun>>,
    failing_listings: AtomicUsize,
    calls: Mutex<HashMap<String, usize>>,
}

impl FakeGithub {
    pub fn new(repos: Vec<Repository>) -> Self {
        Self {
            repos,
            ..Self::default()
        }
    }

    pub fn with_runs(mut self, repo: &str, runs: Vec<WorkflowRun>) -> Self {
        self.runs.insert(repo.to_string(), runs);
        self
    }

    /// The next `count` repository listings fail with a server error.
    pub fn fail_listings(self, count: usize) -> Self {
        self.failing_listings.store(count, Ordering::SeqCst);
        self
    }

    pub fn calls_for(&self, repo: &str) -> usize {
        self.calls.lock().unwrap().get(repo).copied().unwrap_or(0)
    }

    fn record(&self, repo: &str) {
        *self.calls.lock().unwrap().entry(repo.to_string()).or_insert(0) += 1;
    }

    fn runs_of(&self, repo: &str) -> Vec<WorkflowRun> {
        self.runs.get(repo).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl GithubApi for FakeGithub {
    async fn list_repositories(&self, _page: u32, _per_page: u32) -> Result<Page<Repository>, ApiError> {
        let failed = self
            .failing_listings
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failed {
            return Err(ApiError::Http { status: 502, message: "bad gateway".into() });
        }
        Ok(Page::last(self.repos.clone()))
    }

    async fn list_workflow_runs(&self, repo: &str, filter: &RunFilter) -> Result<Vec<WorkflowRun>, ApiError> {
        self.record(repo);
        Ok(self
            .runs_of(repo)
            .into_iter()
            .filter(|run| filter.status.as_ref().map_or(true, |status| run.status == *status))
            .take(filter.per_page as usize)
            .collect())
    }

    async fn list_workflow_jobs(&self, repo: &str, _run_id: u64, _per_page: u32) -> Result<Vec<WorkflowJob>, ApiError> {
        self.record(repo);
        Ok(Vec::new())
    }

    async fn get_workflow_run(&self, repo: &str, run_id: u64) -> Result<WorkflowRun, ApiError> {
        self.record(repo);
        self.runs_of(repo)
            .into_iter()
            .find(|run| run.id == run_id)
            .ok_or_else(|| ApiError::NotFound(format!("{}/runs/{}", repo, run_id)))
    }

    async fn list_environments(&self, repo: &str) -> Result<Vec<Environment>, ApiError> {
        self.record(repo);
        Ok(vec![Environment { id: 1, name: "prod".into() }, Environment { id: 2, name: "staging".into() }])
    }

    async fn list_deployments(&self, repo: &str, _per_page: u32) -> Result<Vec<Deployment>, ApiError> {
        self.record(repo);
        Ok(Vec::new())
    }

    async fn path_exists(&self, _owner: &str, repo: &str, _path: &str) -> Result<bool, ApiError> {
        self.record(repo);
        Ok(true)
    }

    async fn cancel_workflow_run(&self, repo: &str, _run_id: u64) -> Result<(), ApiError> {
        self.record(repo);
        Ok(())
    }

    async fn list_pending_deployments(&self, repo: &str, _run_id: u64) -> Result<Vec<PendingDeployment>, ApiError> {
        self.record(repo);
        Ok(Vec::new())
    }

    async fn approve_pending_deployment(
        &self,
        repo: &str,
        _run_id: u64,
        _environment_ids: &[u64],
        _comment: &str,
    ) -> Result<(), ApiError> {
        self.record(repo);
        Ok(())
    }
}

pub fn repository(id: u64, name: &str, archived: bool) -> Repository {
    Repository {
        id,
        name: name.to_string(),
        owner: "acme".to_string(),
        archived,
        disabled: false,
        pushed_at: Some(Utc::now() - Duration::hours(id as i64)),
        updated_at: Some(Utc::now() - Duration::hours(id as i64)),
        default_branch: Some("main".to_string()),
    }
}

pub fn run(id: u64, name: &str, status: &str, created_at: DateTime<Utc>) -> WorkflowRun {
    WorkflowRun {
        id,
        run_number: id,
        name: name.to_string(),
        status: status.to_string(),
        conclusion: None,
        head_sha: format!("sha-{}", id),
        head_branch: "main".to_string(),
        event: "push".to_string(),
        actor: "octocat".to_string(),
        created_at: Some(created_at),
        updated_at: Some(created_at),
    }
}

/// Defaults with the pacing shrunk so scans finish quickly.
pub fn fast_config() -> Config {
    let mut config = Config::default();
    config.github.org = "acme".to_string();
    config.monitor.interval_secs = 1;
    config.monitor.environment = Some("prod".to_string());
    config.workers.base_delay_ms = 0;
    config.workers.stagger_ms = 0;
    config.rate_limits.batch_size = 10;
    config.rate_limits.batch_interval_ms = 1;
    config.rate_limits.workflow_runs = 4;
    config
}
