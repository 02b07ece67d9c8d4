pub mod rate_limiter;
pub mod repository_manager;
pub mod environment_cache;
pub mod scanners;
pub mod performance_optimizer;
pub mod worker_pool;
pub mod progress_tracker;
pub mod monitor;
pub mod github_client;
