use std::time::Duration;
use serde::{Deserialize, Serialize};
use crate::config::constants::secs;
use crate::helpers::config_helper::ConfigHelper;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EnvironmentCacheConfig {
    #[serde(default = "ConfigHelper::default_repo_environments_ttl_secs")]
    pub repo_environments_ttl_secs: u64,

    #[serde(default = "ConfigHelper::default_run_environment_ttl_secs")]
    pub run_environment_ttl_secs: u64,

    #[serde(default = "ConfigHelper::default_deployments_ttl_secs")]
    pub deployments_ttl_secs: u64,

    #[serde(default = "ConfigHelper::default_deployments_page_size")]
    pub deployments_page_size: u32,

    #[serde(default = "ConfigHelper::default_jobs_page_size")]
    pub jobs_page_size: u32,
}

impl EnvironmentCacheConfig {
    pub const fn repo_environments_ttl(&self) -> Duration {
        secs(self.repo_environments_ttl_secs)
    }

    pub const fn run_environment_ttl(&self) -> Duration {
        secs(self.run_environment_ttl_secs)
    }

    pub const fn deployments_ttl(&self) -> Duration {
        secs(self.deployments_ttl_secs)
    }
}

impl Default for EnvironmentCacheConfig {
    fn default() -> Self {
        Self {
            repo_environments_ttl_secs: ConfigHelper::default_repo_environments_ttl_secs(),
            run_environment_ttl_secs: ConfigHelper::default_run_environment_ttl_secs(),
            deployments_ttl_secs: ConfigHelper::default_deployments_ttl_secs(),
            deployments_page_size: ConfigHelper::default_deployments_page_size(),
            jobs_page_size: ConfigHelper::default_jobs_page_size(),
        }
    }
}
