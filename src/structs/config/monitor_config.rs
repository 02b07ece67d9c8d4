use std::time::Duration;
use serde::{Deserialize, Serialize};
use crate::config::constants::secs;
use crate::helpers::config_helper::ConfigHelper;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MonitorConfig {
    #[serde(default = "ConfigHelper::default_interval_secs")]
    pub interval_secs: u64,

    /// Only pending runs targeting this environment are reported. Empty or
    /// absent disables the filter.
    #[serde(default = "ConfigHelper::default_environment")]
    pub environment: Option<String>,

    #[serde(default = "ConfigHelper::default_pending_timeout_secs")]
    pub pending_timeout_secs: u64,

    #[serde(default = "ConfigHelper::default_recent_timeout_secs")]
    pub recent_timeout_secs: u64,

    #[serde(default = "ConfigHelper::default_recent_job_limit")]
    pub recent_job_limit: usize,

    #[serde(default = "ConfigHelper::default_cache_cleanup_interval_secs")]
    pub cache_cleanup_interval_secs: u64,
}

impl MonitorConfig {
    pub const fn interval(&self) -> Duration {
        secs(self.interval_secs)
    }

    pub const fn pending_timeout(&self) -> Duration {
        secs(self.pending_timeout_secs)
    }

    pub const fn recent_timeout(&self) -> Duration {
        secs(self.recent_timeout_secs)
    }

    pub const fn cache_cleanup_interval(&self) -> Duration {
        secs(self.cache_cleanup_interval_secs)
    }

    pub fn environment_filter(&self) -> Option<&str> {
        self.environment.as_deref().map(str::trim).filter(|env| !env.is_empty())
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_secs: ConfigHelper::default_interval_secs(),
            environment: ConfigHelper::default_environment(),
            pending_timeout_secs: ConfigHelper::default_pending_timeout_secs(),
            recent_timeout_secs: ConfigHelper::default_recent_timeout_secs(),
            recent_job_limit: ConfigHelper::default_recent_job_limit(),
            cache_cleanup_interval_secs: ConfigHelper::default_cache_cleanup_interval_secs(),
        }
    }
}
