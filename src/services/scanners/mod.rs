pub mod smart_scanner;
pub mod recent_scanner;

use chrono::Utc;
use crate::enums::api_error::ApiError;
use crate::errors::{MonitorError, MonitorResult};
use crate::structs::repository::Repository;

/// Archived, disabled and quiet repositories are answered without an API call.
pub(crate) fn should_skip(repo: &Repository, activity_window: chrono::Duration) -> bool {
    !repo.is_scannable() || !repo.pushed_within(Utc::now(), activity_window)
}

/// One bad repository must not end the scan: API failures become an empty
/// result, cancellation stays an error.
pub(crate) fn tolerate_failure<T>(
    scanner: &str,
    repo: &Repository,
    result: MonitorResult<Result<Vec<T>, ApiError>>,
) -> MonitorResult<Vec<T>> {
    match result {
        Ok(Ok(jobs)) => Ok(jobs),
        Ok(Err(e)) => {
            log::debug!("{} scan of {} failed, skipping: {}", scanner, repo.name, e);
            Ok(Vec::new())
        }
        Err(MonitorError::Cancelled) => Err(MonitorError::Cancelled),
        Err(e) => {
            log::debug!("{} scan of {} failed, skipping: {}", scanner, repo.name, e);
            Ok(Vec::new())
        }
    }
}
