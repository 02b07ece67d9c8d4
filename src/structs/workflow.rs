use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowRun {
    pub id: u64,
    pub run_number: u64,
    pub name: String,
    pub status: String,

    #[serde(default)]
    pub conclusion: Option<String>,

    #[serde(default)]
    pub head_sha: String,

    #[serde(default)]
    pub head_branch: String,

    #[serde(default)]
    pub event: String,

    #[serde(default)]
    pub actor: String,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowJob {
    pub id: u64,
    pub run_id: u64,
    pub name: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    pub id: u64,
    pub environment: String,
    pub sha: String,

    #[serde(rename = "ref", default)]
    pub git_ref: String,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// An environment gate a workflow run is currently blocked on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingDeployment {
    pub environment_id: u64,
    pub environment_name: String,
    pub current_user_can_approve: bool,
}

/// Query for `GithubApi::list_workflow_runs`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunFilter {
    pub status: Option<String>,
    pub page: u32,
    pub per_page: u32,
}

impl RunFilter {
    pub fn with_status(status: &str, per_page: u32) -> Self {
        Self {
            status: Some(status.to_string()),
            page: 1,
            per_page,
        }
    }

    pub const fn latest(per_page: u32) -> Self {
        Self {
            status: None,
            page: 1,
            per_page,
        }
    }
}
