use crate::config::constants::*;

pub struct ConfigHelper;

impl ConfigHelper {
    pub fn default_base_url() -> String {
        DEFAULT_BASE_URL.to_string()
    }

    pub fn default_token_env() -> String {
        DEFAULT_TOKEN_ENV.to_string()
    }

    pub const fn default_interval_secs() -> u64 {
        DEFAULT_INTERVAL_SECS
    }

    pub fn default_environment() -> Option<String> {
        Some(DEFAULT_ENVIRONMENT.to_string())
    }

    pub const fn default_pending_timeout_secs() -> u64 {
        DEFAULT_PENDING_TIMEOUT_SECS
    }

    pub const fn default_recent_timeout_secs() -> u64 {
        DEFAULT_RECENT_TIMEOUT_SECS
    }

    pub const fn default_recent_job_limit() -> usize {
        DEFAULT_RECENT_JOB_LIMIT
    }

    pub const fn default_cache_cleanup_interval_secs() -> u64 {
        DEFAULT_CACHE_CLEANUP_INTERVAL_SECS
    }

    pub const fn default_repo_cache_ttl_secs() -> u64 {
        DEFAULT_REPO_CACHE_TTL_SECS
    }

    pub const fn default_activity_window_days() -> i64 {
        DEFAULT_ACTIVITY_WINDOW_DAYS
    }

    pub const fn default_max_smart_repos() -> usize {
        DEFAULT_MAX_SMART_REPOS
    }

    pub const fn default_max_active_repos() -> usize {
        DEFAULT_MAX_ACTIVE_REPOS
    }

    pub const fn default_repo_page_size() -> u32 {
        DEFAULT_REPO_PAGE_SIZE
    }

    pub fn default_workflows_path() -> String {
        DEFAULT_WORKFLOWS_PATH.to_string()
    }

    pub const fn default_repo_environments_ttl_secs() -> u64 {
        DEFAULT_REPO_ENVIRONMENTS_TTL_SECS
    }

    pub const fn default_run_environment_ttl_secs() -> u64 {
        DEFAULT_RUN_ENVIRONMENT_TTL_SECS
    }

    pub const fn default_deployments_ttl_secs() -> u64 {
        DEFAULT_DEPLOYMENTS_TTL_SECS
    }

    pub const fn default_deployments_page_size() -> u32 {
        DEFAULT_DEPLOYMENTS_PAGE_SIZE
    }

    pub const fn default_jobs_page_size() -> u32 {
        DEFAULT_JOBS_PAGE_SIZE
    }

    pub const fn default_smart_workers() -> usize {
        DEFAULT_SMART_WORKERS
    }

    pub const fn default_recent_workers() -> usize {
        DEFAULT_RECENT_WORKERS
    }

    pub const fn default_base_delay_ms() -> u64 {
        DEFAULT_BASE_DELAY_MS
    }

    pub const fn default_worker_stagger_ms() -> u64 {
        DEFAULT_WORKER_STAGGER_MS
    }

    pub const fn default_slow_threshold_ms() -> u64 {
        DEFAULT_SLOW_THRESHOLD_MS
    }

    pub const fn default_smart_page_size() -> u32 {
        DEFAULT_SMART_PAGE_SIZE
    }

    pub const fn default_recent_page_size() -> u32 {
        DEFAULT_RECENT_PAGE_SIZE
    }

    pub const fn default_resource_limit() -> usize {
        DEFAULT_RESOURCE_LIMIT
    }

    pub const fn default_batch_size() -> usize {
        DEFAULT_BATCH_SIZE
    }

    pub const fn default_batch_interval_ms() -> u64 {
        DEFAULT_BATCH_INTERVAL_MS
    }
}
