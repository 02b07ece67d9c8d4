use std::time::Duration;
use serde::{Deserialize, Serialize};
use crate::config::constants::millis;
use crate::helpers::config_helper::ConfigHelper;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WorkerConfig {
    #[serde(default = "ConfigHelper::default_smart_workers")]
    pub smart_workers: usize,

    #[serde(default = "ConfigHelper::default_recent_workers")]
    pub recent_workers: usize,

    /// Pause between two repositories on the same worker.
    #[serde(default = "ConfigHelper::default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Extra pause per worker index, so workers do not fire in lockstep.
    #[serde(default = "ConfigHelper::default_worker_stagger_ms")]
    pub stagger_ms: u64,

    /// Average latency above which the backend is treated as overloaded.
    #[serde(default = "ConfigHelper::default_slow_threshold_ms")]
    pub slow_threshold_ms: u64,

    #[serde(default = "ConfigHelper::default_smart_page_size")]
    pub smart_page_size: u32,

    #[serde(default = "ConfigHelper::default_recent_page_size")]
    pub recent_page_size: u32,
}

impl WorkerConfig {
    pub const fn base_delay(&self) -> Duration {
        millis(self.base_delay_ms)
    }

    pub const fn stagger(&self) -> Duration {
        millis(self.stagger_ms)
    }

    pub const fn slow_threshold(&self) -> Duration {
        millis(self.slow_threshold_ms)
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            smart_workers: ConfigHelper::default_smart_workers(),
            recent_workers: ConfigHelper::default_recent_workers(),
            base_delay_ms: ConfigHelper::default_base_delay_ms(),
            stagger_ms: ConfigHelper::default_worker_stagger_ms(),
            slow_threshold_ms: ConfigHelper::default_slow_threshold_ms(),
            smart_page_size: ConfigHelper::default_smart_page_size(),
            recent_page_size: ConfigHelper::default_recent_page_size(),
        }
    }
}
