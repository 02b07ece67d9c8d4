use async_trait::async_trait;
use crate::enums::api_error::ApiError;
use crate::structs::page::Page;
use crate::structs::repository::Repository;
use crate::structs::workflow::{Deployment, Environment, PendingDeployment, RunFilter, WorkflowJob, WorkflowRun};

/// Everything the engine needs from the hosting API, scoped to one
/// organization. The engine never sees HTTP.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GithubApi: Send + Sync {
    async fn list_repositories(&self, page: u32, per_page: u32) -> Result<Page<Repository>, ApiError>;

    async fn list_workflow_runs(&self, repo: &str, filter: &RunFilter) -> Result<Vec<WorkflowRun>, ApiError>;

    async fn list_workflow_jobs(&self, repo: &str, run_id: u64, per_page: u32) -> Result<Vec<WorkflowJob>, ApiError>;

    async fn get_workflow_run(&self, repo: &str, run_id: u64) -> Result<WorkflowRun, ApiError>;

    async fn list_environments(&self, repo: &str) -> Result<Vec<Environment>, ApiError>;

    async fn list_deployments(&self, repo: &str, per_page: u32) -> Result<Vec<Deployment>, ApiError>;

    /// Whether `path` exists on the repository's default branch.
    async fn path_exists(&self, owner: &str, repo: &str, path: &str) -> Result<bool, ApiError>;

    async fn cancel_workflow_run(&self, repo: &str, run_id: u64) -> Result<(), ApiError>;

    async fn list_pending_deployments(&self, repo: &str, run_id: u64) -> Result<Vec<PendingDeployment>, ApiError>;

    async fn approve_pending_deployment(
        &self,
        repo: &str,
        run_id: u64,
        environment_ids: &[u64],
        comment: &str,
    ) -> Result<(), ApiError>;
}
