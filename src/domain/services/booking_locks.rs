use chrono::NaiveDate;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Per block-date critical sections. Booking validates availability and commits the
/// reservation while holding the guard, so two requests for the same block-date are
/// linearized inside this process.
#[derive(Default)]
pub struct BookingLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl BookingLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(block_id: &str, date: NaiveDate) -> String {
        format!("{}:{}", block_id, date)
    }

    pub async fn acquire(&self, block_id: &str, date: NaiveDate) -> OwnedMutexGuard<()> {
        let mutex = self.locks
            .entry(Self::key(block_id, date))
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        mutex.lock_owned().await
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }

    /// Drops entries nobody is holding or waiting on.
    pub fn prune(&self) {
        self.locks.retain(|_, mutex| Arc::strong_count(mutex) > 1);
    }
}
