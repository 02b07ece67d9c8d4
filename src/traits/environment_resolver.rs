use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use crate::errors::MonitorResult;

/// Maps a workflow run to the deployment environment it targets.
/// An empty string means "unresolved", which is not an error.
#[async_trait]
pub trait EnvironmentResolver: Send + Sync {
    async fn resolve_environment(&self, token: &CancellationToken, repo: &str, run_id: u64) -> MonitorResult<String>;
}

pub struct NoopEnvironmentResolver;

#[async_trait]
impl EnvironmentResolver for NoopEnvironmentResolver {
    async fn resolve_environment(&self, _token: &CancellationToken, _repo: &str, _run_id: u64) -> MonitorResult<String> {
        Ok(String::new())
    }
}
