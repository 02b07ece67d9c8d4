use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use crate::errors::MonitorResult;
use crate::structs::job_status::JobStatus;
use crate::structs::repository::Repository;

/// Probe strategy applied to one repository by the worker pool.
///
/// Implementations swallow per-repository API failures (returning an empty
/// list) and only return `Err` for cancellation.
#[async_trait]
pub trait Scanner: Send + Sync {
    async fn scan_repository(&self, token: &CancellationToken, repo: &Repository) -> MonitorResult<Vec<JobStatus>>;

    fn name(&self) -> &'static str;
}
