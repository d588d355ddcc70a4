//! Bounded in-memory session store.
//!
//! Session records live in a moka cache with the same capacity and idle
//! expiry as shopper state, so a flood of cookieless clients cannot grow
//! memory without limit.

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tower_sessions::SessionStore;
use tower_sessions::cookie::time::OffsetDateTime;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store;

/// Most sessions kept at once. Least recently used ones are evicted first.
pub const MAX_SESSIONS: u64 = 100_000;

/// Session store backed by a bounded moka cache.
#[derive(Debug, Clone)]
pub struct MokaSessionStore {
    records: Cache<Id, Record>,
}

impl MokaSessionStore {
    /// Create a store holding at most `capacity` sessions, each dropped
    /// after `idle` without access.
    #[must_use]
    pub fn new(capacity: u64, idle: Duration) -> Self {
        let records = Cache::builder()
            .max_capacity(capacity)
            .time_to_idle(idle)
            .build();
        Self { records }
    }

    #[cfg(test)]
    async fn len(&self) -> u64 {
        self.records.run_pending_tasks().await;
        self.records.entry_count()
    }
}

#[async_trait]
impl SessionStore for MokaSessionStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        loop {
            let entry = self
                .records
                .entry(record.id)
                .or_insert_with(async { record.clone() })
                .await;
            if entry.is_fresh() {
                return Ok(());
            }
            record.id = Id::default();
        }
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.records.insert(record.id, record.clone()).await;
        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        Ok(self
            .records
            .get(session_id)
            .await
            .filter(|record| record.expiry_date > OffsetDateTime::now_utc()))
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.records.invalidate(session_id).await;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use tower_sessions::cookie::time::Duration as TimeDuration;

    use super::*;

    fn record(expires_in: TimeDuration) -> Record {
        Record {
            id: Id::default(),
            data: HashMap::new(),
            expiry_date: OffsetDateTime::now_utc() + expires_in,
        }
    }

    fn store(capacity: u64) -> MokaSessionStore {
        MokaSessionStore::new(capacity, Duration::from_secs(60))
    }

    #[tokio::test]
    async fn test_save_load_delete() {
        let store = store(10);
        let mut record = record(TimeDuration::minutes(5));
        store.create(&mut record).await.unwrap();

        let loaded = store.load(&record.id).await.unwrap();
        assert_eq!(loaded.map(|r| r.id), Some(record.id));

        store.delete(&record.id).await.unwrap();
        assert!(store.load(&record.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_record_is_not_loaded() {
        let store = store(10);
        let record = record(TimeDuration::seconds(-1));
        store.save(&record).await.unwrap();

        assert!(store.load(&record.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_never_overwrites_existing_id() {
        let store = store(10);
        let first = record(TimeDuration::minutes(5));
        store.save(&first).await.unwrap();

        let mut second = record(TimeDuration::minutes(5));
        second.id = first.id;
        store.create(&mut second).await.unwrap();

        assert_ne!(second.id, first.id);
        assert!(store.load(&first.id).await.unwrap().is_some());
        assert!(store.load(&second.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_capacity_is_bounded() {
        let store = store(8);
        for _ in 0..200 {
            let mut record = record(TimeDuration::minutes(5));
            store.create(&mut record).await.unwrap();
        }

        assert!(store.len().await <= 8);
    }
}
