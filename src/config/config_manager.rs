use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use crate::config::constants::{CONFIG_DIR_NAME, CONFIG_FILE_NAME, ENV_BASE_URL, ENV_ENVIRONMENT, ENV_ORG};
use crate::errors::{MonitorError, MonitorResult};
use crate::structs::config::config::Config;

const SAMPLE_CONFIG: &str = r#"# deploy-watch configuration

[github]
# Organization whose repositories are scanned
org = "my-org"
# Use https://<host>/api/v3 for GitHub Enterprise Server
base_url = "https://api.github.com"
# Environment variable holding the API token (falls back to `gh auth token`)
token_env = "GITHUB_TOKEN"

[monitor]
# Seconds between pending scans in watch mode
interval_secs = 5
# Only report waiting runs targeting this environment ("" for all)
environment = "prod"
pending_timeout_secs = 60
recent_timeout_secs = 90
recent_job_limit = 200
cache_cleanup_interval_secs = 300

[repositories]
cache_ttl_secs = 3600
# Repositories without a push in this many days are skipped
activity_window_days = 7
max_smart_repos = 200
max_active_repos = 100
page_size = 30
workflows_path = ".github/workflows"

[environment_cache]
repo_environments_ttl_secs = 600
run_environment_ttl_secs = 120
deployments_ttl_secs = 60
deployments_page_size = 20
jobs_page_size = 50

[workers]
smart_workers = 2
recent_workers = 2
base_delay_ms = 300
stagger_ms = 100
slow_threshold_ms = 2000
smart_page_size = 10
recent_page_size = 20

# Concurrent in-flight calls per API resource class
[rate_limits]
repo_list = 1
workflow_runs = 1
workflow_jobs = 1
environments = 1
deployments = 1
contents = 1
batch_size = 2
batch_interval_ms = 800
"#;

pub struct ConfigManager;

impl ConfigManager {
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Loads `path`, or the default location when none is given, then applies
    /// environment overrides. A missing default file means built-in defaults;
    /// a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> MonitorResult<Config> {
        let mut config = match path {
            Some(path) => Self::load_file(path)?,
            None => match Self::default_path() {
                Some(default) if default.exists() => Self::load_file(&default)?,
                _ => {
                    log::debug!("No configuration file found, using defaults");
                    Config::default()
                }
            },
        };

        Self::apply_overrides(&mut config, |key| std::env::var(key).ok());
        Ok(config)
    }

    fn load_file(path: &Path) -> MonitorResult<Config> {
        log::info!("📋 Loading config from: {}", path.display());

        let content = fs::read_to_string(path).map_err(|e| MonitorError::ConfigFile {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        Self::parse(&content, path)
    }

    pub fn parse(content: &str, path: &Path) -> MonitorResult<Config> {
        toml::from_str(content).map_err(|e| MonitorError::ConfigFile {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    pub fn apply_overrides<F>(config: &mut Config, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(org) = lookup(ENV_ORG).filter(|org| !org.trim().is_empty()) {
            config.github.org = org.trim().to_string();
        }
        if let Some(base_url) = lookup(ENV_BASE_URL).filter(|url| !url.trim().is_empty()) {
            config.github.base_url = base_url.trim().to_string();
        }
        if let Some(environment) = lookup(ENV_ENVIRONMENT) {
            config.monitor.environment = Some(environment.trim().to_string());
        }
    }

    /// Inline token first, then the configured environment variable, then
    /// the GitHub CLI.
    pub fn resolve_token(config: &Config) -> MonitorResult<String> {
        Self::resolve_token_with(config, |key| std::env::var(key).ok(), Self::gh_cli_token)
    }

    fn resolve_token_with<E, G>(config: &Config, lookup: E, gh_cli: G) -> MonitorResult<String>
    where
        E: Fn(&str) -> Option<String>,
        G: FnOnce() -> Option<String>,
    {
        let non_empty = |token: String| {
            let token = token.trim().to_string();
            (!token.is_empty()).then_some(token)
        };

        if let Some(token) = config.github.token.clone().and_then(non_empty) {
            return Ok(token);
        }
        if let Some(token) = lookup(&config.github.token_env).and_then(non_empty) {
            return Ok(token);
        }
        if let Some(token) = gh_cli().and_then(non_empty) {
            log::debug!("Using token from `gh auth token`");
            return Ok(token);
        }

        Err(MonitorError::config_error(
            "github.token",
            format!("no API token found; set {} or run `gh auth login`", config.github.token_env),
        ))
    }

    fn gh_cli_token() -> Option<String> {
        let output = Command::new("gh").args(["auth", "token"]).output().ok()?;
        if !output.status.success() {
            return None;
        }
        String::from_utf8(output.stdout).ok()
    }

    /// Writes the sample configuration and returns where it went. An existing
    /// file is never overwritten.
    pub fn create_sample_config(path: Option<&Path>) -> MonitorResult<PathBuf> {
        let target = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path()
                .ok_or_else(|| MonitorError::config_error("config", "cannot determine home directory"))?,
        };

        if target.exists() {
            return Err(MonitorError::ConfigFile {
                path: target.display().to_string(),
                reason: "file already exists".to_string(),
            });
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, SAMPLE_CONFIG)?;

        log::info!("✅ Created sample config at: {}", target.display());
        Ok(target)
    }

    pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if config.github.org.trim().is_empty() {
            errors.push(format!("github.org is required (or set {})", ENV_ORG));
        }
        if !config.github.base_url.starts_with("http://") && !config.github.base_url.starts_with("https://") {
            errors.push(format!("github.base_url must be an http(s) URL: {}", config.github.base_url));
        }

        let positive = [
            ("monitor.interval_secs", config.monitor.interval_secs),
            ("monitor.pending_timeout_secs", config.monitor.pending_timeout_secs),
            ("monitor.recent_timeout_secs", config.monitor.recent_timeout_secs),
            ("monitor.cache_cleanup_interval_secs", config.monitor.cache_cleanup_interval_secs),
            ("repositories.cache_ttl_secs", config.repositories.cache_ttl_secs),
            ("rate_limits.batch_interval_ms", config.rate_limits.batch_interval_ms),
        ];
        for (field, value) in positive {
            if value == 0 {
                errors.push(format!("{} must be positive", field));
            }
        }

        let counts = [
            ("monitor.recent_job_limit", config.monitor.recent_job_limit),
            ("repositories.max_smart_repos", config.repositories.max_smart_repos),
            ("repositories.max_active_repos", config.repositories.max_active_repos),
            ("workers.smart_workers", config.workers.smart_workers),
            ("workers.recent_workers", config.workers.recent_workers),
            ("rate_limits.batch_size", config.rate_limits.batch_size),
        ];
        for (field, value) in counts {
            if value == 0 {
                errors.push(format!("{} must be positive", field));
            }
        }

        for (class, limit) in config.rate_limits.limits() {
            if limit == 0 {
                errors.push(format!("rate_limits.{} must be positive", class));
            }
        }

        let page_sizes = [
            ("repositories.page_size", config.repositories.page_size),
            ("workers.smart_page_size", config.workers.smart_page_size),
            ("workers.recent_page_size", config.workers.recent_page_size),
            ("environment_cache.jobs_page_size", config.environment_cache.jobs_page_size),
            ("environment_cache.deployments_page_size", config.environment_cache.deployments_page_size),
        ];
        for (field, value) in page_sizes {
            if !(1..=100).contains(&value) {
                errors.push(format!("{} must be between 1 and 100, got {}", field, value));
            }
        }

        if config.repositories.activity_window_days <= 0 {
            errors.push("repositories.activity_window_days must be positive".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            errors.sort();
            Err(errors)
        }
    }
}
