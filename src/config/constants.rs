use std::time::Duration;

pub const CONFIG_DIR_NAME: &str = ".deploy-watch";
pub const CONFIG_FILE_NAME: &str = "config.toml";

pub const DEFAULT_BASE_URL: &str = "https://api.github.com";
pub const DEFAULT_TOKEN_ENV: &str = "GITHUB_TOKEN";
pub const DEFAULT_ENVIRONMENT: &str = "prod";

pub const GITHUB_API_VERSION: &str = "2022-11-28";
pub const USER_AGENT: &str = concat!("deploy-watch/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

pub const ENV_ORG: &str = "DEPLOY_WATCH_ORG";
pub const ENV_BASE_URL: &str = "DEPLOY_WATCH_BASE_URL";
pub const ENV_ENVIRONMENT: &str = "DEPLOY_WATCH_ENVIRONMENT";

pub const DEFAULT_INTERVAL_SECS: u64 = 5;
pub const DEFAULT_PENDING_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_RECENT_TIMEOUT_SECS: u64 = 90;
pub const DEFAULT_RECENT_JOB_LIMIT: usize = 200;
pub const DEFAULT_CACHE_CLEANUP_INTERVAL_SECS: u64 = 300;
pub const DEFAULT_BATCH_CHANNEL_CAPACITY: usize = 16;

pub const DEFAULT_REPO_CACHE_TTL_SECS: u64 = 60 * 60;
pub const DEFAULT_ACTIVITY_WINDOW_DAYS: i64 = 7;
pub const DEFAULT_MAX_SMART_REPOS: usize = 200;
pub const DEFAULT_MAX_ACTIVE_REPOS: usize = 100;
pub const DEFAULT_REPO_PAGE_SIZE: u32 = 30;
pub const DEFAULT_WORKFLOWS_PATH: &str = ".github/workflows";

pub const DEFAULT_REPO_ENVIRONMENTS_TTL_SECS: u64 = 10 * 60;
pub const DEFAULT_RUN_ENVIRONMENT_TTL_SECS: u64 = 2 * 60;
pub const DEFAULT_DEPLOYMENTS_TTL_SECS: u64 = 60;
pub const DEFAULT_DEPLOYMENTS_PAGE_SIZE: u32 = 20;
pub const DEFAULT_JOBS_PAGE_SIZE: u32 = 50;

pub const DEFAULT_SMART_WORKERS: usize = 2;
pub const DEFAULT_RECENT_WORKERS: usize = 2;
pub const DEFAULT_BASE_DELAY_MS: u64 = 300;
pub const DEFAULT_WORKER_STAGGER_MS: u64 = 100;
pub const DEFAULT_SLOW_THRESHOLD_MS: u64 = 2000;
pub const DEFAULT_SMART_PAGE_SIZE: u32 = 10;
pub const DEFAULT_RECENT_PAGE_SIZE: u32 = 20;
pub const LATENCY_HISTORY_SIZE: usize = 10;
pub const MODERATE_LATENCY_THRESHOLD: Duration = Duration::from_secs(1);

pub const DEFAULT_RESOURCE_LIMIT: usize = 1;
pub const DEFAULT_BATCH_SIZE: usize = 2;
pub const DEFAULT_BATCH_INTERVAL_MS: u64 = 800;

pub const STATUS_WAITING: &str = "waiting";
pub const STATUS_COMPLETED: &str = "completed";

pub const DEFAULT_APPROVAL_COMMENT: &str = "Approved via deploy-watch";

pub const fn secs(seconds: u64) -> Duration {
    Duration::from_secs(seconds)
}

pub const fn millis(milliseconds: u64) -> Duration {
    Duration::from_millis(milliseconds)
}
