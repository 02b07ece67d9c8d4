use std::fmt;
use serde::{Deserialize, Serialize};

/// Category of API endpoint with its own concurrency ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceClass {
    RepoList,
    WorkflowRuns,
    WorkflowJobs,
    Environments,
    Deployments,
    /// Content-existence probes (the "has workflows" check).
    Contents,
}

impl ResourceClass {
    pub const ALL: [ResourceClass; 6] = [
        ResourceClass::RepoList,
        ResourceClass::WorkflowRuns,
        ResourceClass::WorkflowJobs,
        ResourceClass::Environments,
        ResourceClass::Deployments,
        ResourceClass::Contents,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            ResourceClass::RepoList => "repo_list",
            ResourceClass::WorkflowRuns => "workflow_runs",
            ResourceClass::WorkflowJobs => "workflow_jobs",
            ResourceClass::Environments => "environments",
            ResourceClass::Deployments => "deployments",
            ResourceClass::Contents => "contents",
        }
    }
}

impl fmt::Display for ResourceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
