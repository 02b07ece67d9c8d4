use chrono::{DateTime, Utc};
use serde::Serialize;
use crate::enums::scan_mode::ScanMode;

/// Point-in-time view of the scan state, handed out by value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanProgress {
    pub scan_mode: ScanMode,
    pub total_repos: usize,
    pub active_repos: usize,
    pub completed_repos: usize,
    pub archived_repos: usize,
    pub disabled_repos: usize,
    pub valid_repos: usize,
    pub active_workers: usize,
    pub next_scan_at: Option<DateTime<Utc>>,
    /// Seconds until `next_scan_at`, clamped at zero.
    pub scan_countdown: u64,
    pub last_scan_at: Option<DateTime<Utc>>,
    pub current_state_start: DateTime<Utc>,
    /// Seconds spent in the current mode, clamped at zero.
    pub state_duration: u64,
    pub scan_cycle_count: u64,
    pub cache_status: String,
}

impl ScanProgress {
    pub fn idle(now: DateTime<Utc>) -> Self {
        Self {
            scan_mode: ScanMode::Idle,
            total_repos: 0,
            active_repos: 0,
            completed_repos: 0,
            archived_repos: 0,
            disabled_repos: 0,
            valid_repos: 0,
            active_workers: 0,
            next_scan_at: None,
            scan_countdown: 0,
            last_scan_at: None,
            current_state_start: now,
            state_duration: 0,
            scan_cycle_count: 0,
            cache_status: String::new(),
        }
    }

    pub fn summary(&self) -> String {
        if self.scan_mode.is_scanning() {
            format!(
                "scanning {} {}/{} repos ({} workers, {}s)",
                self.scan_mode, self.completed_repos, self.active_repos, self.active_workers, self.state_duration
            )
        } else {
            format!("idle, next scan in {}s (cycle {})", self.scan_countdown, self.scan_cycle_count)
        }
    }
}
