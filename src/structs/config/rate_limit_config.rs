use std::collections::HashMap;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use crate::config::constants::millis;
use crate::enums::resource_class::ResourceClass;
use crate::helpers::config_helper::ConfigHelper;

/// Concurrent in-flight calls allowed per resource class.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RateLimitConfig {
    #[serde(default = "ConfigHelper::default_resource_limit")]
    pub repo_list: usize,

    #[serde(default = "ConfigHelper::default_resource_limit")]
    pub workflow_runs: usize,

    #[serde(default = "ConfigHelper::default_resource_limit")]
    pub workflow_jobs: usize,

    #[serde(default = "ConfigHelper::default_resource_limit")]
    pub environments: usize,

    #[serde(default = "ConfigHelper::default_resource_limit")]
    pub deployments: usize,

    #[serde(default = "ConfigHelper::default_resource_limit")]
    pub contents: usize,

    #[serde(default = "ConfigHelper::default_batch_size")]
    pub batch_size: usize,

    #[serde(default = "ConfigHelper::default_batch_interval_ms")]
    pub batch_interval_ms: u64,
}

impl RateLimitConfig {
    pub fn limits(&self) -> HashMap<ResourceClass, usize> {
        ResourceClass::ALL
            .into_iter()
            .map(|class| (class, self.limit_for(class)))
            .collect()
    }

    pub const fn limit_for(&self, class: ResourceClass) -> usize {
        match class {
            ResourceClass::RepoList => self.repo_list,
            ResourceClass::WorkflowRuns => self.workflow_runs,
            ResourceClass::WorkflowJobs => self.workflow_jobs,
            ResourceClass::Environments => self.environments,
            ResourceClass::Deployments => self.deployments,
            ResourceClass::Contents => self.contents,
        }
    }

    pub const fn batch_interval(&self) -> Duration {
        millis(self.batch_interval_ms)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            repo_list: ConfigHelper::default_resource_limit(),
            workflow_runs: ConfigHelper::default_resource_limit(),
            workflow_jobs: ConfigHelper::default_resource_limit(),
            environments: ConfigHelper::default_resource_limit(),
            deployments: ConfigHelper::default_resource_limit(),
            contents: ConfigHelper::default_resource_limit(),
            batch_size: ConfigHelper::default_batch_size(),
            batch_interval_ms: ConfigHelper::default_batch_interval_ms(),
        }
    }
}
