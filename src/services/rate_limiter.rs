use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use futures::future::join_all;
use tokio::sync::{Semaphore, SemaphorePermit};
use tokio_util::sync::CancellationToken;
use crate::enums::resource_class::ResourceClass;
use crate::errors::{MonitorError, MonitorResult};
use crate::structs::config::rate_limit_config::RateLimitConfig;

/// Per-resource-class bulkhead bounding in-flight API calls.
#[derive(Debug)]
pub struct RateLimiter {
    semaphores: HashMap<ResourceClass, Semaphore>,
    limits: HashMap<ResourceClass, usize>,
    batch_size: usize,
    batch_interval: Duration,
}

/// Holds one slot of a resource class; the slot is returned on drop.
#[derive(Debug)]
pub struct RateLimitPermit<'a> {
    class: ResourceClass,
    _permit: SemaphorePermit<'a>,
}

impl RateLimitPermit<'_> {
    pub const fn class(&self) -> ResourceClass {
        self.class
    }

    pub fn release(self) {}
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> MonitorResult<Self> {
        Self::with_limits(config.limits(), config.batch_size, config.batch_interval())
    }

    /// Classes missing from `limits` are rejected at `acquire` time.
    pub fn with_limits(
        limits: HashMap<ResourceClass, usize>,
        batch_size: usize,
        batch_interval: Duration,
    ) -> MonitorResult<Self> {
        if batch_size == 0 {
            return Err(MonitorError::config_error("rate_limits.batch_size", "batch size must be positive, got 0"));
        }
        if batch_interval.is_zero() {
            return Err(MonitorError::config_error("rate_limits.batch_interval_ms", "batch interval must be positive, got 0"));
        }
        for (class, limit) in &limits {
            if *limit == 0 {
                return Err(MonitorError::config_error(
                    &format!("rate_limits.{}", class),
                    format!("limit for {} must be positive, got 0", class),
                ));
            }
        }

        let semaphores = limits
            .iter()
            .map(|(class, limit)| (*class, Semaphore::new(*limit)))
            .collect();

        Ok(Self {
            semaphores,
            limits,
            batch_size,
            batch_interval,
        })
    }

    /// Waits for a slot of `class`, or fails with `Cancelled` if the token
    /// fires first.
    pub async fn acquire(&self, class: ResourceClass, token: &CancellationToken) -> MonitorResult<RateLimitPermit<'_>> {
        let semaphore = self.semaphores.get(&class).ok_or(MonitorError::UnknownResource(class))?;

        tokio::select! {
            biased;
            () = token.cancelled() => Err(MonitorError::Cancelled),
            permit = semaphore.acquire() => {
                let permit = permit.map_err(|_| MonitorError::Cancelled)?;
                Ok(RateLimitPermit { class, _permit: permit })
            }
        }
    }

    /// Runs `call` while holding a slot of `class`. The call itself is also
    /// abandoned when the token fires.
    pub async fn run<T, F>(&self, class: ResourceClass, token: &CancellationToken, call: F) -> MonitorResult<T>
    where
        F: Future<Output = T>,
    {
        let _permit = self.acquire(class, token).await?;

        tokio::select! {
            biased;
            () = token.cancelled() => Err(MonitorError::Cancelled),
            value = call => Ok(value),
        }
    }

    /// Processes `items` in batches of `batch_size`, all items of a batch
    /// concurrently, with `batch_interval` between batches.
    pub async fn batch_process<T, R, F, Fut>(&self, token: &CancellationToken, items: Vec<T>, process: F) -> MonitorResult<Vec<R>>
    where
        F: FnMut(T) -> Fut,
        Fut: Future<Output = R>,
    {
        self.batch_process_until(token, items, process, |_| false).await
    }

    /// Like `batch_process`, but stops before the next batch once `done`
    /// returns true for the results gathered so far.
    pub async fn batch_process_until<T, R, F, Fut, D>(
        &self,
        token: &CancellationToken,
        items: Vec<T>,
        mut process: F,
        mut done: D,
    ) -> MonitorResult<Vec<R>>
    where
        F: FnMut(T) -> Fut,
        Fut: Future<Output = R>,
        D: FnMut(&[R]) -> bool,
    {
        let mut results = Vec::with_capacity(items.len());
        let mut items = items.into_iter().peekable();

        while items.peek().is_some() {
            let batch: Vec<Fut> = items.by_ref().take(self.batch_size).map(&mut process).collect();

            let outputs = tokio::select! {
                biased;
                () = token.cancelled() => return Err(MonitorError::Cancelled),
                outputs = join_all(batch) => outputs,
            };
            results.extend(outputs);

            if done(&results) || items.peek().is_none() {
                break;
            }

            tokio::select! {
                biased;
                () = token.cancelled() => return Err(MonitorError::Cancelled),
                () = tokio::time::sleep(self.batch_interval) => {}
            }
        }

        Ok(results)
    }

    pub fn limit(&self, class: ResourceClass) -> MonitorResult<usize> {
        self.limits.get(&class).copied().ok_or(MonitorError::UnknownResource(class))
    }

    pub fn available(&self, class: ResourceClass) -> MonitorResult<usize> {
        self.semaphores
            .get(&class)
            .map(Semaphore::available_permits)
            .ok_or(MonitorError::UnknownResource(class))
    }

    pub const fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub const fn batch_interval(&self) -> Duration {
        self.batch_interval
    }
}
