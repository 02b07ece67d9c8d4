use chrono::{DateTime, Utc};
use crate::structs::job_status::JobStatus;

/// One polling cycle's output, pushed to the consumer as a whole.
#[derive(Debug, Clone)]
pub struct JobBatch {
    pub cycle: u64,
    pub completed_at: DateTime<Utc>,
    pub outcome: Result<Vec<JobStatus>, String>,
}

impl JobBatch {
    pub fn jobs(&self) -> &[JobStatus] {
        match &self.outcome {
            Ok(jobs) => jobs,
            Err(_) => &[],
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.outcome.as_ref().err().map(String::as_str)
    }
}
