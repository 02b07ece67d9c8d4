use std::sync::{Arc, PoisonError, RwLock};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use crate::enums::resource_class::ResourceClass;
use crate::errors::{MonitorError, MonitorResult};
use crate::services::rate_limiter::RateLimiter;
use crate::structs::cache_entry::CacheEntry;
use crate::structs::config::repository_config::RepositoryConfig;
use crate::structs::repo_stats::RepoStats;
use crate::structs::repository::Repository;
use crate::structs::ttl_cache::TtlCache;
use crate::traits::github_api::GithubApi;

/// Owns the repository inventory cache and derives scan target sets from it.
pub struct RepositoryManager {
    api: Arc<dyn GithubApi>,
    rate_limiter: Arc<RateLimiter>,
    config: RepositoryConfig,
    inventory: RwLock<Option<CacheEntry<Arc<Vec<Repository>>>>>,
    fetch_lock: Mutex<()>,
    workflow_probes: TtlCache<String, bool>,
}

impl RepositoryManager {
    pub fn new(api: Arc<dyn GithubApi>, rate_limiter: Arc<RateLimiter>, config: RepositoryConfig) -> Self {
        let probe_ttl = config.cache_ttl();
        Self {
            api,
            rate_limiter,
            config,
            inventory: RwLock::new(None),
            fetch_lock: Mutex::new(()),
            workflow_probes: TtlCache::new(probe_ttl),
        }
    }

    pub const fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// Returns the full inventory, fetching it only when the cache is empty or
    /// older than the TTL. A failed fetch leaves the previous cache untouched.
    pub async fn get_repositories_with_cache(&self, token: &CancellationToken) -> MonitorResult<Arc<Vec<Repository>>> {
        if let Some(repos) = self.cached_inventory() {
            return Ok(repos);
        }

        let _fetching = tokio::select! {
            biased;
            () = token.cancelled() => return Err(MonitorError::Cancelled),
            guard = self.fetch_lock.lock() => guard,
        };

        // Another caller may have refreshed the cache while we waited.
        if let Some(repos) = self.cached_inventory() {
            return Ok(repos);
        }

        let repos = Arc::new(self.fetch_all_repositories(token).await?);
        log::info!("📦 Repository inventory refreshed: {} repositories", repos.len());

        let mut inventory = self.inventory.write().unwrap_or_else(PoisonError::into_inner);
        *inventory = Some(CacheEntry::new(Arc::clone(&repos), self.config.cache_ttl()));

        Ok(repos)
    }

    fn cached_inventory(&self) -> Option<Arc<Vec<Repository>>> {
        let inventory = self.inventory.read().unwrap_or_else(PoisonError::into_inner);
        inventory.as_ref().and_then(CacheEntry::get).cloned()
    }

    async fn fetch_all_repositories(&self, token: &CancellationToken) -> MonitorResult<Vec<Repository>> {
        let mut all_repos = Vec::new();
        let mut page = 1;

        loop {
            let result = self
                .rate_limiter
                .run(ResourceClass::RepoList, token, self.api.list_repositories(page, self.config.page_size))
                .await?;

            let listing = result.map_err(|e| {
                MonitorError::api_error(
                    format!("listing repositories (page {}) - check your token and organization name", page),
                    e,
                )
            })?;

            log::debug!("Fetched repository page {} ({} repositories)", page, listing.items.len());
            all_repos.extend(listing.items);

            match listing.next_page {
                Some(next) if next > page => page = next,
                _ => break,
            }
        }

        Ok(all_repos)
    }

    /// Recently pushed, scannable repositories, most recent first. Falls back
    /// to the most recently updated scannable repositories when nothing was
    /// pushed inside the activity window.
    pub async fn get_active_repositories(&self, token: &CancellationToken, max_repos: usize) -> MonitorResult<Vec<Repository>> {
        let all_repos = self.get_repositories_with_cache(token).await?;
        let limit = max_repos.min(self.config.max_active_repos);

        Ok(select_active_repositories(&all_repos, Utc::now(), self.config.activity_window(), limit))
    }

    /// Recently pushed, scannable repositories that contain workflow
    /// definitions, most recent first.
    pub async fn get_smart_repositories(&self, token: &CancellationToken, max_repos: usize) -> MonitorResult<Vec<Repository>> {
        let all_repos = self.get_repositories_with_cache(token).await?;
        let candidates = recently_pushed(&all_repos, Utc::now(), self.config.activity_window());

        if max_repos == 0 || candidates.is_empty() {
            return Ok(Vec::new());
        }

        // Cached probes resolve without touching the limiter; live ones are
        // bounded by the contents class only.
        let in_flight = self.rate_limiter.limit(ResourceClass::Contents)?;
        let mut probes = stream::iter(candidates)
            .map(|repo| async move {
                let has_workflows = self.has_workflow_files(token, &repo).await;
                (repo, has_workflows)
            })
            .buffered(in_flight);

        let mut smart_repos = Vec::with_capacity(max_repos);
        while let Some((repo, has_workflows)) = probes.next().await {
            if token.is_cancelled() {
                return Err(MonitorError::Cancelled);
            }
            if has_workflows? {
                smart_repos.push(repo);
                if smart_repos.len() >= max_repos {
                    break;
                }
            }
        }

        log::debug!("Smart repository set: {} repositories with workflows", smart_repos.len());
        Ok(smart_repos)
    }

    /// Heuristic: the workflows directory exists on the default branch. Any
    /// failure other than cancellation counts as "no workflows".
    async fn has_workflow_files(&self, token: &CancellationToken, repo: &Repository) -> MonitorResult<bool> {
        if let Some(cached) = self.workflow_probes.get(&repo.name) {
            return Ok(cached);
        }

        let result = self
            .rate_limiter
            .run(
                ResourceClass::Contents,
                token,
                self.api.path_exists(&repo.owner, &repo.name, &self.config.workflows_path),
            )
            .await?;

        let has_workflows = match result {
            Ok(exists) => exists,
            Err(e) => {
                log::debug!("Workflow probe failed for {}: {}", repo.name, e);
                return Ok(false);
            }
        };

        self.workflow_probes.insert(repo.name.clone(), has_workflows);
        Ok(has_workflows)
    }

    pub fn calculate_repo_stats(repos: &[Repository]) -> RepoStats {
        RepoStats::from_repositories(repos)
    }

    pub fn cache_status(&self) -> String {
        let inventory = self.inventory.read().unwrap_or_else(PoisonError::into_inner);

        let Some(entry) = inventory.as_ref() else {
            return "Empty".to_string();
        };

        let remaining = entry.remaining();
        if remaining.is_zero() {
            "Expired".to_string()
        } else if remaining.as_secs() > 60 {
            format!("ttl {}m", remaining.as_secs() / 60)
        } else {
            format!("ttl {}s", remaining.as_secs())
        }
    }
}

/// Scannable repositories pushed within `window`, most recent push first.
pub fn recently_pushed(repos: &[Repository], now: DateTime<Utc>, window: chrono::Duration) -> Vec<Repository> {
    let mut recent: Vec<Repository> = repos
        .iter()
        .filter(|repo| repo.is_scannable() && repo.pushed_within(now, window))
        .cloned()
        .collect();

    recent.sort_by(|a, b| b.pushed_at.cmp(&a.pushed_at));
    recent
}

pub fn select_active_repositories(
    repos: &[Repository],
    now: DateTime<Utc>,
    window: chrono::Duration,
    limit: usize,
) -> Vec<Repository> {
    let mut active = recently_pushed(repos, now, window);

    if active.is_empty() {
        active = repos.iter().filter(|repo| repo.is_scannable()).cloned().collect();
        active.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    }

    active.truncate(limit);
    active
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;
    use mockall::predicate::eq;
    use proptest::prelude::*;
    use crate::enums::api_error::ApiError;
    use crate::structs::config::rate_limit_config::RateLimitConfig;
    use crate::structs::page::Page;
    use crate::traits::github_api::MockGithubApi;

    fn repo(id: u64, name: &str, pushed_days_ago: Option<i64>) -> Repository {
        let now = Utc::now();
        Repository {
            id,
            name: name.to_string(),
            owner: "acme".to_string(),
            archived: false,
            disabled: false,
            pushed_at: pushed_days_ago.map(|days| now - chrono::Duration::days(days)),
            updated_at: pushed_days_ago.map(|days| now - chrono::Duration::days(days)),
            default_branch: Some("main".to_string()),
        }
    }

    fn fast_limiter() -> Arc<RateLimiter> {
        let limits = ResourceClass::ALL.into_iter().map(|class| (class, 1)).collect::<HashMap<_, _>>();
        Arc::new(RateLimiter::with_limits(limits, 2, Duration::from_millis(1)).unwrap())
    }

    fn manager(api: MockGithubApi) -> RepositoryManager {
        RepositoryManager::new(Arc::new(api), fast_limiter(), RepositoryConfig::default())
    }

    #[tokio::test]
    async fn inventory_is_fetched_once_within_ttl() {
        let mut api = MockGithubApi::new();
        api.expect_list_repositories()
            .with(eq(1), eq(30))
            .times(1)
            .returning(|_, _| Ok(Page::with_next(vec![repo(1, "api", Some(1))], 2)));
        api.expect_list_repositories()
            .with(eq(2), eq(30))
            .times(1)
            .returning(|_, _| Ok(Page::last(vec![repo(2, "web", Some(2))])));

        let manager = manager(api);
        let token = CancellationToken::new();

        let first = manager.get_repositories_with_cache(&token).await.unwrap();
        let second = manager.get_repositories_with_cache(&token).await.unwrap();

        assert_eq!(first.len(), 2);
        assert!(Arc::ptr_eq(&first, &second));
        assert!(manager.cache_status().starts_with("ttl "));
    }

    #[tokio::test(start_paused = true)]
    async fn expired_inventory_is_refetched_exactly_once() {
        let mut api = MockGithubApi::new();
        let mut seq = mockall::Sequence::new();
        api.expect_list_repositories()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(Page::last(vec![repo(1, "old", Some(1))])));
        api.expect_list_repositories()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(Page::last(vec![repo(2, "new", Some(1)), repo(3, "newer", Some(1))])));

        let manager = manager(api);
        let token = CancellationToken::new();

        assert_eq!(manager.get_repositories_with_cache(&token).await.unwrap().len(), 1);

        tokio::time::advance(Duration::from_secs(60 * 60 + 1)).await;
        assert_eq!(manager.cache_status(), "Expired");

        let refreshed = manager.get_repositories_with_cache(&token).await.unwrap();
        let again = manager.get_repositories_with_cache(&token).await.unwrap();
        let names: Vec<&str> = refreshed.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["new", "newer"]);
        assert!(Arc::ptr_eq(&refreshed, &again));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_page_keeps_previous_cache() {
        let mut api = MockGithubApi::new();
        let mut seq = mockall::Sequence::new();
        api.expect_list_repositories()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(Page::last(vec![repo(1, "api", Some(1))])));
        api.expect_list_repositories()
            .with(eq(1), eq(30))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(Page::with_next(vec![repo(9, "partial", Some(1))], 2)));
        api.expect_list_repositories()
            .with(eq(2), eq(30))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(ApiError::Forbidden("token lacks read:org".into())));

        let manager = manager(api);
        let token = CancellationToken::new();
        let original = manager.get_repositories_with_cache(&token).await.unwrap();

        tokio::time::advance(Duration::from_secs(60 * 60 + 1)).await;
        let error = manager.get_repositories_with_cache(&token).await.unwrap_err();
        assert!(matches!(error, MonitorError::Api { source: ApiError::Forbidden(_), .. }));

        // The stale entry is neither replaced by the partial listing nor dropped.
        assert_eq!(manager.cache_status(), "Expired");
        assert_eq!(original.len(), 1);
    }

    #[tokio::test]
    async fn active_repositories_exclude_archived_and_fall_back_to_updated() {
        let mut api = MockGithubApi::new();
        api.expect_list_repositories().times(1).returning(|_, _| {
            let mut archived = repo(1, "archived", Some(40));
            archived.archived = true;
            let mut disabled = repo(2, "disabled", Some(50));
            disabled.disabled = true;
            Ok(Page::last(vec![archived, disabled, repo(3, "stale", Some(30)), repo(4, "older", Some(90))]))
        });

        let manager = manager(api);
        let active = manager.get_active_repositories(&CancellationToken::new(), 10).await.unwrap();

        let names: Vec<&str> = active.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["stale", "older"]);
    }

    #[tokio::test]
    async fn smart_repositories_require_workflows_and_skip_inactive() {
        let mut api = MockGithubApi::new();
        api.expect_list_repositories().times(1).returning(|_, _| {
            let mut archived = repo(1, "archived", Some(1));
            archived.archived = true;
            Ok(Page::last(vec![
                archived,
                repo(2, "with-ci", Some(2)),
                repo(3, "no-ci", Some(1)),
                repo(4, "stale", Some(30)),
                repo(5, "probe-fails", Some(3)),
            ]))
        });
        api.expect_path_exists()
            .withf(|owner, repo, path| owner == "acme" && repo == "with-ci" && path == ".github/workflows")
            .times(1)
            .returning(|_, _, _| Ok(true));
        api.expect_path_exists()
            .withf(|_, repo, _| repo == "no-ci")
            .times(1)
            .returning(|_, _, _| Ok(false));
        api.expect_path_exists()
            .withf(|_, repo, _| repo == "probe-fails")
            .times(1)
            .returning(|_, _, _| Err(ApiError::NotFound(".github/workflows".into())));

        let manager = manager(api);
        let token = CancellationToken::new();

        let smart = manager.get_smart_repositories(&token, 10).await.unwrap();
        assert_eq!(smart.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(), vec!["with-ci"]);
        assert_eq!(manager.workflow_probes.get(&"with-ci".to_string()), Some(true));
        assert_eq!(manager.workflow_probes.get(&"no-ci".to_string()), Some(false));
        assert_eq!(manager.workflow_probes.get(&"probe-fails".to_string()), None);
    }

    #[tokio::test]
    async fn smart_probing_stops_once_enough_repositories_are_confirmed() {
        let mut api = MockGithubApi::new();
        api.expect_list_repositories().times(1).returning(|_, _| {
            Ok(Page::last((1..=6).map(|i| repo(i, &format!("repo-{}", i), Some(i as i64))).collect()))
        });
        api.expect_path_exists().times(2).returning(|_, _, _| Ok(true));

        let manager = manager(api);
        let smart = manager.get_smart_repositories(&CancellationToken::new(), 2).await.unwrap();

        assert_eq!(smart.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(), vec!["repo-1", "repo-2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn smart_probing_ignores_batch_pacing() {
        let mut api = MockGithubApi::new();
        api.expect_list_repositories().times(1).returning(|_, _| {
            Ok(Page::last((1..=40).map(|i| repo(i, &format!("repo-{}", i), Some(1))).collect()))
        });
        api.expect_path_exists().times(40).returning(|_, _, _| Ok(true));

        let limiter = Arc::new(RateLimiter::new(&RateLimitConfig::default()).unwrap());
        let manager = RepositoryManager::new(Arc::new(api), limiter, RepositoryConfig::default());
        let token = CancellationToken::new();

        let started = tokio::time::Instant::now();
        assert_eq!(manager.get_smart_repositories(&token, 200).await.unwrap().len(), 40);
        assert!(started.elapsed() < Duration::from_millis(800));

        let started = tokio::time::Instant::now();
        assert_eq!(manager.get_smart_repositories(&token, 200).await.unwrap().len(), 40);
        assert!(started.elapsed() < Duration::from_millis(1));
    }

    #[test]
    fn repo_stats_count_archived_before_disabled() {
        let mut both = repo(1, "both", Some(1));
        both.archived = true;
        both.disabled = true;
        let mut disabled = repo(2, "disabled", Some(1));
        disabled.disabled = true;

        let stats = RepositoryManager::calculate_repo_stats(&[both, disabled, repo(3, "ok", None)]);
        assert_eq!(stats, RepoStats { total: 3, archived: 1, disabled: 1, valid: 1 });
    }

    fn arb_repository() -> impl Strategy<Value = Repository> {
        (any::<u64>(), any::<bool>(), any::<bool>(), proptest::option::of(0i64..60), proptest::option::of(0i64..400))
            .prop_map(|(id, archived, disabled, pushed, updated)| {
                let now = Utc::now();
                Repository {
                    id,
                    name: format!("repo-{}", id),
                    owner: "acme".to_string(),
                    archived,
                    disabled,
                    pushed_at: pushed.map(|days| now - chrono::Duration::days(days)),
                    updated_at: updated.map(|days| now - chrono::Duration::days(days)),
                    default_branch: None,
                }
            })
    }

    proptest! {
        #[test]
        fn active_selection_never_returns_unscannable(repos in proptest::collection::vec(arb_repository(), 0..40), limit in 0usize..50) {
            let selected = select_active_repositories(&repos, Utc::now(), chrono::Duration::days(7), limit);

            prop_assert!(selected.len() <= limit);
            prop_assert!(selected.iter().all(Repository::is_scannable));
        }

        #[test]
        fn recently_pushed_is_sorted_and_scannable(repos in proptest::collection::vec(arb_repository(), 0..40)) {
            let now = Utc::now();
            let recent = recently_pushed(&repos, now, chrono::Duration::days(7));

            prop_assert!(recent.iter().all(|r| r.is_scannable() && r.pushed_within(now, chrono::Duration::days(7))));
            prop_assert!(recent.windows(2).all(|pair| pair[0].pushed_at >= pair[1].pushed_at));
        }
    }
}
