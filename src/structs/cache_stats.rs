use serde::Serialize;

/// Entry counts of the environment cache tables, expired entries included
/// until the next sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub repo_environments: usize,
    pub run_environments: usize,
    pub deployments: usize,
}

impl CacheStats {
    pub const fn total(&self) -> usize {
        self.repo_environments + self.run_environments + self.deployments
    }
}
