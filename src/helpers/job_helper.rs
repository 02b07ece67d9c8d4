use std::cmp::Ordering;
use crate::structs::job_status::JobStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    OldestFirst,
    NewestFirst,
}

/// Stable sort by start time. Jobs without a start time lead the
/// oldest-first view and trail the newest-first one.
pub fn sort_jobs_by_time(jobs: &mut [JobStatus], order: SortOrder) {
    jobs.sort_by(|a, b| match order {
        SortOrder::OldestFirst => a.started_at.cmp(&b.started_at),
        SortOrder::NewestFirst => match (a.started_at, b.started_at) {
            (Some(a), Some(b)) => b.cmp(&a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
    });
}

pub fn limit_jobs(mut jobs: Vec<JobStatus>, limit: usize) -> Vec<JobStatus> {
    jobs.truncate(limit);
    jobs
}
