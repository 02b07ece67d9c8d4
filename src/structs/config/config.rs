use serde::{Deserialize, Serialize};
use crate::structs::config::environment_cache_config::EnvironmentCacheConfig;
use crate::structs::config::github_config::GithubConfig;
use crate::structs::config::monitor_config::MonitorConfig;
use crate::structs::config::rate_limit_config::RateLimitConfig;
use crate::structs::config::repository_config::RepositoryConfig;
use crate::structs::config::worker_config::WorkerConfig;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub github: GithubConfig,

    #[serde(default)]
    pub monitor: MonitorConfig,

    #[serde(default)]
    pub repositories: RepositoryConfig,

    #[serde(default)]
    pub environment_cache: EnvironmentCacheConfig,

    #[serde(default)]
    pub workers: WorkerConfig,

    #[serde(default)]
    pub rate_limits: RateLimitConfig,
}
