use std::time::Duration;
use serde::{Deserialize, Serialize};
use crate::config::constants::secs;
use crate::helpers::config_helper::ConfigHelper;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RepositoryConfig {
    #[serde(default = "ConfigHelper::default_repo_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Repositories without a push in this many days are skipped.
    #[serde(default = "ConfigHelper::default_activity_window_days")]
    pub activity_window_days: i64,

    #[serde(default = "ConfigHelper::default_max_smart_repos")]
    pub max_smart_repos: usize,

    #[serde(default = "ConfigHelper::default_max_active_repos")]
    pub max_active_repos: usize,

    #[serde(default = "ConfigHelper::default_repo_page_size")]
    pub page_size: u32,

    #[serde(default = "ConfigHelper::default_workflows_path")]
    pub workflows_path: String,
}

impl RepositoryConfig {
    pub const fn cache_ttl(&self) -> Duration {
        secs(self.cache_ttl_secs)
    }

    pub fn activity_window(&self) -> chrono::Duration {
        chrono::Duration::days(self.activity_window_days)
    }
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: ConfigHelper::default_repo_cache_ttl_secs(),
            activity_window_days: ConfigHelper::default_activity_window_days(),
            max_smart_repos: ConfigHelper::default_max_smart_repos(),
            max_active_repos: ConfigHelper::default_max_active_repos(),
            page_size: ConfigHelper::default_repo_page_size(),
            workflows_path: ConfigHelper::default_workflows_path(),
        }
    }
}
