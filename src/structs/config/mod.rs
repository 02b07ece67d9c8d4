pub mod config;
pub mod environment_cache_config;
pub mod github_config;
pub mod monitor_config;
pub mod rate_limit_config;
pub mod repository_config;
pub mod worker_config;
