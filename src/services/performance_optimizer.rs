use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use crate::config::constants::{LATENCY_HISTORY_SIZE, MODERATE_LATENCY_THRESHOLD};

/// Rolling latency window used to stretch worker delays while the backend is
/// slow. Shared by every worker of a pool.
#[derive(Debug)]
pub struct PerformanceOptimizer {
    history: Mutex<VecDeque<Duration>>,
    slow_threshold: Duration,
}

impl PerformanceOptimizer {
    pub fn new(slow_threshold: Duration) -> Self {
        Self {
            history: Mutex::new(VecDeque::with_capacity(LATENCY_HISTORY_SIZE)),
            slow_threshold,
        }
    }

    pub fn record_response_time(&self, latency: Duration) {
        let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
        if history.len() == LATENCY_HISTORY_SIZE {
            history.pop_front();
        }
        history.push_back(latency);
    }

    pub fn average_response_time(&self) -> Duration {
        let history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
        if history.is_empty() {
            return Duration::ZERO;
        }

        let total: Duration = history.iter().sum();
        // History is capped well below u32::MAX.
        total / history.len() as u32
    }

    pub fn is_server_under_load(&self) -> bool {
        self.average_response_time() > self.slow_threshold
    }

    pub fn optimal_delay(&self, base_delay: Duration) -> Duration {
        let average = self.average_response_time();

        if average > self.slow_threshold {
            base_delay * 3
        } else if average > MODERATE_LATENCY_THRESHOLD {
            base_delay * 2
        } else {
            base_delay
        }
    }
}
