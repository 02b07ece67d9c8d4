use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::config::constants::STATUS_COMPLETED;
use crate::structs::workflow::WorkflowRun;

/// Normalized view of one workflow run (or job) produced by a scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatus {
    pub id: u64,
    pub name: String,
    pub run_id: u64,
    pub run_number: u64,
    pub status: String,
    pub conclusion: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub environment: String,
    pub workflow_name: String,
    pub branch: String,
    pub event: String,
    pub actor: String,
    pub repository: String,
}

impl JobStatus {
    /// Builds a run-level record; the job id is the run id.
    pub fn from_run(repository: &str, run: &WorkflowRun, status: String, environment: String) -> Self {
        Self {
            id: run.id,
            name: run.name.clone(),
            run_id: run.id,
            run_number: run.run_number,
            status,
            conclusion: run.conclusion.clone(),
            started_at: run.created_at,
            completed_at: run.updated_at,
            environment,
            workflow_name: run.name.clone(),
            branch: run.head_branch.clone(),
            event: run.event.clone(),
            actor: run.actor.clone(),
            repository: repository.to_string(),
        }
    }

    pub fn identity(&self) -> (&str, u64, u64) {
        (self.repository.as_str(), self.run_id, self.id)
    }
}

/// The conclusion replaces the raw status once a run has completed.
pub fn display_status(status: &str, conclusion: Option<&str>) -> String {
    match conclusion {
        Some(conclusion) if status == STATUS_COMPLETED && !conclusion.is_empty() => conclusion.to_string(),
        _ => status.to_string(),
    }
}
