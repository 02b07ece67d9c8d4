use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A repository as reported by the hosting API. Read-only to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub owner: String,

    #[serde(default)]
    pub archived: bool,

    #[serde(default)]
    pub disabled: bool,

    #[serde(default)]
    pub pushed_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub default_branch: Option<String>,
}

impl Repository {
    /// Archived and disabled repositories are never scan targets.
    pub const fn is_scannable(&self) -> bool {
        !self.archived && !self.disabled
    }

    pub fn pushed_within(&self, now: DateTime<Utc>, window: Duration) -> bool {
        self.pushed_at.is_some_and(|pushed| now - pushed <= window)
    }
}
