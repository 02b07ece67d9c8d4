use serde::Serialize;
use crate::structs::repository::Repository;

/// Inventory breakdown used for progress reporting only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RepoStats {
    pub total: usize,
    pub archived: usize,
    pub disabled: usize,
    pub valid: usize,
}

impl RepoStats {
    /// Archived wins over disabled when a repository is both.
    pub fn from_repositories(repos: &[Repository]) -> Self {
        let mut stats = Self {
            total: repos.len(),
            ..Self::default()
        };

        for repo in repos {
            if repo.archived {
                stats.archived += 1;
            } else if repo.disabled {
                stats.disabled += 1;
            } else {
                stats.valid += 1;
            }
        }

        stats
    }
}
