use std::time::Duration;
use tokio::time::Instant;

/// A cached value together with the instant it stops being valid.
///
/// Value and expiry are only ever written together: there is no way to
/// refresh one without the other.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    value: T,
    expires_at: Instant,
}

impl<T> CacheEntry<T> {
    pub fn new(value: T, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + ttl,
        }
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    /// The value, or `None` once the entry has expired.
    pub fn get(&self) -> Option<&T> {
        if self.is_expired() {
            None
        } else {
            Some(&self.value)
        }
    }

    pub fn remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn entry_is_a_miss_after_expiry() {
        let entry = CacheEntry::new(vec!["prod".to_string()], Duration::from_secs(60));
        assert_eq!(entry.get().map(Vec::len), Some(1));

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(entry.get().is_some());
        assert_eq!(entry.remaining(), Duration::from_secs(1));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(entry.get().is_none());
        assert!(entry.is_expired());
        assert_eq!(entry.remaining(), Duration::ZERO);
    }
}
