use std::sync::{PoisonError, RwLock};
use chrono::{DateTime, Utc};
use crate::enums::scan_mode::ScanMode;
use crate::structs::repo_stats::RepoStats;
use crate::structs::scan_progress::ScanProgress;

/// Single source of truth for the scan state. Every read is a full copy, so
/// a reader never sees a half-written snapshot.
#[derive(Debug)]
pub struct ProgressTracker {
    progress: RwLock<ScanProgress>,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            progress: RwLock::new(ScanProgress::idle(Utc::now())),
        }
    }

    pub fn get_progress(&self) -> ScanProgress {
        self.progress.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn update<F: FnOnce(&mut ScanProgress)>(&self, apply: F) {
        let mut progress = self.progress.write().unwrap_or_else(PoisonError::into_inner);
        apply(&mut progress);
    }

    /// Starts a scan: counts are reset, the state timer only when the mode
    /// actually changes.
    pub fn initialize_progress(&self, mode: ScanMode, total_repos: usize, active_repos: usize, workers: usize, stats: RepoStats) {
        let now = Utc::now();
        self.update(|progress| {
            enter_mode(progress, mode, now);
            progress.total_repos = total_repos;
            progress.active_repos = active_repos;
            progress.completed_repos = 0;
            progress.archived_repos = stats.archived;
            progress.disabled_repos = stats.disabled;
            progress.valid_repos = stats.valid;
            progress.active_workers = workers;
        });
    }

    /// Never moves backwards and never exceeds the number of active repos.
    pub fn update_completed(&self, completed: usize) {
        self.update(|progress| {
            progress.completed_repos = progress.completed_repos.max(completed.min(progress.active_repos));
        });
    }

    /// Ends a scan. The last scan's counts and the timer fields stay visible.
    pub fn set_idle(&self) {
        let now = Utc::now();
        self.update(|progress| {
            enter_mode(progress, ScanMode::Idle, now);
            progress.active_workers = 0;
        });
    }

    pub fn set_mode(&self, mode: ScanMode) {
        let now = Utc::now();
        self.update(|progress| enter_mode(progress, mode, now));
    }

    pub fn set_next_scan_timer(&self, next_scan_at: DateTime<Utc>, cycle: u64) {
        let now = Utc::now();
        self.update(|progress| {
            progress.next_scan_at = Some(next_scan_at);
            progress.scan_cycle_count = cycle;
            progress.scan_countdown = seconds_between(now, next_scan_at);
        });
    }

    /// Recomputes the countdown and the time spent in the current state.
    /// Meant to be called on every UI tick.
    pub fn update_scan_countdown(&self) {
        let now = Utc::now();
        self.update(|progress| {
            if let Some(next_scan_at) = progress.next_scan_at {
                progress.scan_countdown = seconds_between(now, next_scan_at);
            }
            progress.state_duration = seconds_between(progress.current_state_start, now);
        });
    }

    pub fn set_scan_completed(&self) {
        let now = Utc::now();
        self.update(|progress| progress.last_scan_at = Some(now));
    }
}

fn enter_mode(progress: &mut ScanProgress, mode: ScanMode, now: DateTime<Utc>) {
    if progress.scan_mode != mode {
        progress.current_state_start = now;
        progress.state_duration = 0;
    }
    progress.scan_mode = mode;
}

fn seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> u64 {
    u64::try_from((to - from).num_seconds()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn stats() -> RepoStats {
        RepoStats { total: 10, archived: 2, disabled: 1, valid: 7 }
    }

    #[test]
    fn starts_idle() {
        let progress = ProgressTracker::new().get_progress();
        assert_eq!(progress.scan_mode, ScanMode::Idle);
        assert_eq!(progress.completed_repos, 0);
        assert!(progress.next_scan_at.is_none());
    }

    #[test]
    fn initialize_records_counts_and_resets_completion() {
        let tracker = ProgressTracker::new();
        tracker.initialize_progress(ScanMode::ScanningSmart, 10, 5, 2, stats());
        tracker.update_completed(3);

        tracker.initialize_progress(ScanMode::ScanningSmart, 10, 4, 2, stats());
        let progress = tracker.get_progress();

        assert_eq!(progress.scan_mode, ScanMode::ScanningSmart);
        assert_eq!(progress.total_repos, 10);
        assert_eq!(progress.active_repos, 4);
        assert_eq!(progress.completed_repos, 0);
        assert_eq!(progress.archived_repos, 2);
        assert_eq!(progress.disabled_repos, 1);
        assert_eq!(progress.valid_repos, 7);
        assert_eq!(progress.active_workers, 2);
    }

    #[test]
    fn state_start_only_moves_on_mode_change() {
        let tracker = ProgressTracker::new();
        tracker.initialize_progress(ScanMode::ScanningRecent, 3, 3, 2, stats());
        let started = tracker.get_progress().current_state_start;

        tracker.initialize_progress(ScanMode::ScanningRecent, 3, 3, 2, stats());
        assert_eq!(tracker.get_progress().current_state_start, started);

        tracker.set_mode(ScanMode::ScanningSmart);
        assert!(tracker.get_progress().current_state_start >= started);
        assert_eq!(tracker.get_progress().scan_mode, ScanMode::ScanningSmart);
    }

    #[test]
    fn completion_is_monotonic_and_clamped() {
        let tracker = ProgressTracker::new();
        tracker.initialize_progress(ScanMode::ScanningSmart, 8, 5, 2, stats());

        tracker.update_completed(3);
        tracker.update_completed(2);
        assert_eq!(tracker.get_progress().completed_repos, 3);

        tracker.update_completed(50);
        assert_eq!(tracker.get_progress().completed_repos, 5);
    }

    #[test]
    fn idle_keeps_last_counts_and_timers() {
        let tracker = ProgressTracker::new();
        let next = Utc::now() + chrono::Duration::seconds(30);
        tracker.set_next_scan_timer(next, 4);
        tracker.initialize_progress(ScanMode::ScanningSmart, 8, 5, 2, stats());
        tracker.update_completed(5);
        tracker.set_scan_completed();

        tracker.set_idle();
        let progress = tracker.get_progress();

        assert_eq!(progress.scan_mode, ScanMode::Idle);
        assert_eq!(progress.active_workers, 0);
        assert_eq!(progress.completed_repos, 5);
        assert_eq!(progress.next_scan_at, Some(next));
        assert_eq!(progress.scan_cycle_count, 4);
        assert!(progress.last_scan_at.is_some());
    }

    #[test]
    fn countdown_and_duration_are_clamped_at_zero() {
        let tracker = ProgressTracker::new();

        tracker.set_next_scan_timer(Utc::now() + chrono::Duration::seconds(30), 1);
        let countdown = tracker.get_progress().scan_countdown;
        assert!((29..=30).contains(&countdown));

        tracker.set_next_scan_timer(Utc::now() - chrono::Duration::seconds(30), 2);
        tracker.update_scan_countdown();
        let progress = tracker.get_progress();
        assert_eq!(progress.scan_countdown, 0);
        assert!(progress.state_duration < 5);
    }

    #[test]
    fn concurrent_readers_see_whole_snapshots() {
        let tracker = Arc::new(ProgressTracker::new());
        tracker.initialize_progress(ScanMode::ScanningSmart, 100, 100, 2, stats());

        let writer = {
            let tracker = Arc::clone(&tracker);
            std::thread::spawn(move || {
                for completed in 1..=100 {
                    tracker.update_completed(completed);
                }
            })
        };

        let mut last = 0;
        for _ in 0..200 {
            let progress = tracker.get_progress();
            assert!(progress.completed_repos >= last);
            assert!(progress.completed_repos <= progress.active_repos);
            last = progress.completed_repos;
        }

        writer.join().unwrap();
        assert_eq!(tracker.get_progress().completed_repos, 100);
    }
}
