use std::sync::Arc;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use crate::config::constants::STATUS_WAITING;
use crate::enums::resource_class::ResourceClass;
use crate::errors::{MonitorError, MonitorResult};
use crate::services::rate_limiter::RateLimiter;
use crate::services::scanners::{should_skip, tolerate_failure};
use crate::structs::job_status::JobStatus;
use crate::structs::repository::Repository;
use crate::structs::workflow::RunFilter;
use crate::traits::environment_resolver::EnvironmentResolver;
use crate::traits::github_api::GithubApi;
use crate::traits::scanner::Scanner;

/// Approval-queue probe: only runs the server reports as waiting, optionally
/// narrowed to one deployment environment.
pub struct SmartScanner {
    api: Arc<dyn GithubApi>,
    rate_limiter: Arc<RateLimiter>,
    resolver: Arc<dyn EnvironmentResolver>,
    environment: Option<String>,
    activity_window: chrono::Duration,
    page_size: u32,
}

impl SmartScanner {
    pub fn new(
        api: Arc<dyn GithubApi>,
        rate_limiter: Arc<RateLimiter>,
        resolver: Arc<dyn EnvironmentResolver>,
        environment: Option<String>,
        activity_window: chrono::Duration,
        page_size: u32,
    ) -> Self {
        Self {
            api,
            rate_limiter,
            resolver,
            environment: environment.filter(|env| !env.trim().is_empty()),
            activity_window,
            page_size,
        }
    }

    async fn resolve(&self, token: &CancellationToken, repo: &Repository, run_id: u64) -> MonitorResult<String> {
        match self.resolver.resolve_environment(token, &repo.name, run_id).await {
            Ok(environment) => Ok(environment),
            Err(MonitorError::Cancelled) => Err(MonitorError::Cancelled),
            Err(e) => {
                log::debug!("Could not resolve environment of {}#{}: {}", repo.name, run_id, e);
                Ok(String::new())
            }
        }
    }
}

#[async_trait]
impl Scanner for SmartScanner {
    async fn scan_repository(&self, token: &CancellationToken, repo: &Repository) -> MonitorResult<Vec<JobStatus>> {
        if should_skip(repo, self.activity_window) {
            return Ok(Vec::new());
        }

        let filter = RunFilter::with_status(STATUS_WAITING, self.page_size);
        let listing = self
            .rate_limiter
            .run(ResourceClass::WorkflowRuns, token, self.api.list_workflow_runs(&repo.name, &filter))
            .await;
        let runs = tolerate_failure(self.name(), repo, listing)?;

        let mut waiting = Vec::with_capacity(runs.len());
        for run in &runs {
            let environment = self.resolve(token, repo, run.id).await?;

            let wanted = match &self.environment {
                Some(filter) => environment == *filter,
                None => true,
            };
            if wanted {
                waiting.push(JobStatus::from_run(&repo.name, run, run.status.clone(), environment));
            }
        }

        if !waiting.is_empty() {
            log::debug!("⏳ {} waiting run(s) in {}", waiting.len(), repo.name);
        }
        Ok(waiting)
    }

    fn name(&self) -> &'static str {
        "smart"
    }
}
