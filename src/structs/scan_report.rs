use crate::errors::MonitorError;
use crate::structs::job_status::JobStatus;

/// Result of running a scanner across one repository batch.
///
/// When the batch was interrupted, `jobs` still holds everything aggregated
/// before the interruption and `error` says why it stopped.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub jobs: Vec<JobStatus>,
    pub completed: usize,
    pub error: Option<MonitorError>,
}

impl ScanReport {
    pub const fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_result(self) -> Result<Vec<JobStatus>, MonitorError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.jobs),
        }
    }
}
