use std::sync::Arc;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use crate::config::constants::STATUS_WAITING;
use crate::enums::resource_class::ResourceClass;
use crate::errors::{MonitorError, MonitorResult};
use crate::services::rate_limiter::RateLimiter;
use crate::structs::cache_stats::CacheStats;
use crate::structs::config::environment_cache_config::EnvironmentCacheConfig;
use crate::structs::ttl_cache::TtlCache;
use crate::structs::workflow::{Deployment, WorkflowJob, WorkflowRun};
use crate::traits::environment_resolver::EnvironmentResolver;
use crate::traits::github_api::GithubApi;

/// Resolves the deployment environment of workflow runs, caching the
/// repository environments, the recent deployments and the final answer.
pub struct EnvironmentCache {
    api: Arc<dyn GithubApi>,
    rate_limiter: Arc<RateLimiter>,
    config: EnvironmentCacheConfig,
    repo_environments: TtlCache<String, Arc<Vec<String>>>,
    run_environments: TtlCache<(String, u64), String>,
    deployments: TtlCache<String, Arc<Vec<Deployment>>>,
}

impl EnvironmentCache {
    pub fn new(api: Arc<dyn GithubApi>, rate_limiter: Arc<RateLimiter>, config: EnvironmentCacheConfig) -> Self {
        Self {
            repo_environments: TtlCache::new(config.repo_environments_ttl()),
            run_environments: TtlCache::new(config.run_environment_ttl()),
            deployments: TtlCache::new(config.deployments_ttl()),
            api,
            rate_limiter,
            config,
        }
    }

    /// Environment names configured on `repo`.
    pub async fn get_repository_environments(&self, token: &CancellationToken, repo: &str) -> MonitorResult<Arc<Vec<String>>> {
        if let Some(environments) = self.repo_environments.get(&repo.to_string()) {
            return Ok(environments);
        }

        let environments = self
            .rate_limiter
            .run(ResourceClass::Environments, token, self.api.list_environments(repo))
            .await?
            .map_err(|e| MonitorError::api_error(format!("listing environments of {}", repo), e))?;

        let names = Arc::new(environments.into_iter().map(|env| env.name).collect::<Vec<_>>());
        self.repo_environments.insert(repo.to_string(), Arc::clone(&names));
        Ok(names)
    }

    /// Returns the environment `run_id` targets, or an empty string when it
    /// cannot be determined. Only cancellation is reported as an error.
    pub async fn get_workflow_run_environment(&self, token: &CancellationToken, repo: &str, run_id: u64) -> MonitorResult<String> {
        let key = (repo.to_string(), run_id);
        if let Some(environment) = self.run_environments.get(&key) {
            return Ok(environment);
        }

        let (environment, degraded) = self.detect_environment(token, repo, run_id).await?;

        if environment.is_empty() && degraded {
            log::debug!("Environment of {}#{} unresolved after failed lookups; not caching", repo, run_id);
        } else {
            self.run_environments.insert(key, environment.clone());
        }

        Ok(environment)
    }

    async fn detect_environment(&self, token: &CancellationToken, repo: &str, run_id: u64) -> MonitorResult<(String, bool)> {
        let mut degraded = false;

        let run = absorb(self.fetch_run(token, repo, run_id).await, &mut degraded)?;

        if let Some(run) = &run {
            let deployments = absorb(self.recent_deployments(token, repo).await, &mut degraded)?;
            if let Some(deployment) = deployments
                .iter()
                .flat_map(|deployments| deployments.iter())
                .find(|deployment| !run.head_sha.is_empty() && deployment.sha == run.head_sha)
            {
                log::debug!("{}#{} matched deployment {} by SHA", repo, run_id, deployment.id);
                return Ok((deployment.environment.clone(), degraded));
            }
        }

        let jobs = absorb(self.fetch_jobs(token, repo, run_id).await, &mut degraded)?.unwrap_or_default();
        let waiting: Vec<&WorkflowJob> = jobs.iter().filter(|job| job.status == STATUS_WAITING).collect();

        if waiting.is_empty() && run.is_none() {
            return Ok((String::new(), degraded));
        }

        let Some(environments) = absorb(self.get_repository_environments(token, repo).await, &mut degraded)? else {
            return Ok((String::new(), degraded));
        };

        for job in waiting {
            if let Some(environment) = match_environment(&job.name, &environments) {
                return Ok((environment.to_string(), degraded));
            }
        }

        let by_workflow = run
            .as_ref()
            .and_then(|run| match_environment(&run.name, &environments))
            .map(str::to_string)
            .unwrap_or_default();

        Ok((by_workflow, degraded))
    }

    async fn fetch_run(&self, token: &CancellationToken, repo: &str, run_id: u64) -> MonitorResult<WorkflowRun> {
        self.rate_limiter
            .run(ResourceClass::WorkflowRuns, token, self.api.get_workflow_run(repo, run_id))
            .await?
            .map_err(|e| MonitorError::api_error(format!("fetching run {} of {}", run_id, repo), e))
    }

    async fn fetch_jobs(&self, token: &CancellationToken, repo: &str, run_id: u64) -> MonitorResult<Vec<WorkflowJob>> {
        self.rate_limiter
            .run(
                ResourceClass::WorkflowJobs,
                token,
                self.api.list_workflow_jobs(repo, run_id, self.config.jobs_page_size),
            )
            .await?
            .map_err(|e| MonitorError::api_error(format!("listing jobs of run {} in {}", run_id, repo), e))
    }

    async fn recent_deployments(&self, token: &CancellationToken, repo: &str) -> MonitorResult<Arc<Vec<Deployment>>> {
        if let Some(deployments) = self.deployments.get(&repo.to_string()) {
            return Ok(deployments);
        }

        let deployments = self
            .rate_limiter
            .run(
                ResourceClass::Deployments,
                token,
                self.api.list_deployments(repo, self.config.deployments_page_size),
            )
            .await?
            .map_err(|e| MonitorError::api_error(format!("listing deployments of {}", repo), e))?;

        let deployments = Arc::new(deployments);
        self.deployments.insert(repo.to_string(), Arc::clone(&deployments));
        Ok(deployments)
    }

    /// Removes expired entries from every table and returns how many went.
    pub fn cleanup_expired(&self) -> usize {
        let removed = self.repo_environments.remove_expired()
            + self.run_environments.remove_expired()
            + self.deployments.remove_expired();

        if removed > 0 {
            log::debug!("🧹 Environment cache sweep removed {} expired entries", removed);
        }
        removed
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            repo_environments: self.repo_environments.len(),
            run_environments: self.run_environments.len(),
            deployments: self.deployments.len(),
        }
    }
}

#[async_trait]
impl EnvironmentResolver for EnvironmentCache {
    async fn resolve_environment(&self, token: &CancellationToken, repo: &str, run_id: u64) -> MonitorResult<String> {
        self.get_workflow_run_environment(token, repo, run_id).await
    }
}

/// A failed detection step yields nothing; cancellation still aborts.
fn absorb<T>(result: MonitorResult<T>, degraded: &mut bool) -> MonitorResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(MonitorError::Cancelled) => Err(MonitorError::Cancelled),
        Err(e) => {
            log::debug!("Environment detection step failed: {}", e);
            *degraded = true;
            Ok(None)
        }
    }
}

/// First environment whose name contains, or is contained in, `candidate`,
/// ignoring case.
fn match_environment<'a>(candidate: &str, environments: &'a [String]) -> Option<&'a str> {
    let candidate = candidate.to_lowercase();
    if candidate.is_empty() {
        return None;
    }

    environments
        .iter()
        .filter(|env| !env.is_empty())
        .find(|env| {
            let env = env.to_lowercase();
            candidate.contains(&env) || env.contains(&candidate)
        })
        .map(String::as_str)
}
