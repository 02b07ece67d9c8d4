use std::sync::Arc;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use crate::enums::resource_class::ResourceClass;
use crate::errors::MonitorResult;
use crate::services::rate_limiter::RateLimiter;
use crate::services::scanners::{should_skip, tolerate_failure};
use crate::structs::job_status::{display_status, JobStatus};
use crate::structs::repository::Repository;
use crate::structs::workflow::RunFilter;
use crate::traits::github_api::GithubApi;
use crate::traits::scanner::Scanner;

/// Activity-feed probe: the latest runs of any status.
pub struct RecentScanner {
    api: Arc<dyn GithubApi>,
    rate_limiter: Arc<RateLimiter>,
    activity_window: chrono::Duration,
    page_size: u32,
}

impl RecentScanner {
    pub fn new(api: Arc<dyn GithubApi>, rate_limiter: Arc<RateLimiter>, activity_window: chrono::Duration, page_size: u32) -> Self {
        Self {
            api,
            rate_limiter,
            activity_window,
            page_size,
        }
    }
}

#[async_trait]
impl Scanner for RecentScanner {
    async fn scan_repository(&self, token: &CancellationToken, repo: &Repository) -> MonitorResult<Vec<JobStatus>> {
        if should_skip(repo, self.activity_window) {
            return Ok(Vec::new());
        }

        let filter = RunFilter::latest(self.page_size);
        let listing = self
            .rate_limiter
            .run(ResourceClass::WorkflowRuns, token, self.api.list_workflow_runs(&repo.name, &filter))
            .await;
        let runs = tolerate_failure(self.name(), repo, listing)?;

        Ok(runs
            .iter()
            .map(|run| {
                let status = display_status(&run.status, run.conclusion.as_deref());
                JobStatus::from_run(&repo.name, run, status, String::new())
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "recent"
    }
}
