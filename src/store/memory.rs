//! In-memory statistics store
//!
//! A single `RwLock` guards the whole map: mutations take the write lock,
//! reads take the read lock and copy records out before doing any work on
//! them. The lock is never held across an `.await`.

use crate::store::order::sort_records;
use crate::store::{OrderKey, StatsStore, StoreError, StoreResult, StoreSummary, UrlRecord};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

/// Process-lifetime store of per-URL statistics
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, UrlRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Every mutation leaves its record consistent before it can panic, so a
    // poisoned lock still guards valid data.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, UrlRecord>> {
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, UrlRecord>> {
        self.records.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StatsStore for MemoryStore {
    fn exists(&self, url: &str) -> bool {
        self.read().contains_key(url)
    }

    fn register_new(&self, url: &str) -> StoreResult<()> {
        let mut records = self.write();
        if records.contains_key(url) {
            return Err(StoreError::AlreadyExists(url.to_string()));
        }
        records.insert(url.to_string(), UrlRecord::new(url, Utc::now()));
        Ok(())
    }

    fn increment_hit(&self, url: &str) -> StoreResult<u64> {
        let mut records = self.write();
        let record = records
            .get_mut(url)
            .ok_or_else(|| StoreError::NotFound(url.to_string()))?;

        record.hit_count += 1;
        record.updated_at = Utc::now();
        Ok(record.hit_count)
    }

    fn record_fetch_outcome(
        &self,
        url: &str,
        success: bool,
        bytes: u64,
        elapsed: Duration,
    ) -> StoreResult<()> {
        let mut records = self.write();
        let record = records
            .get_mut(url)
            .ok_or_else(|| StoreError::NotFound(url.to_string()))?;

        record.last_bytes = bytes;
        record.last_download_time = elapsed;
        if success {
            record.download_success_count += 1;
        } else {
            record.download_failure_count += 1;
        }
        record.updated_at = Utc::now();
        Ok(())
    }

    fn get(&self, url: &str) -> Option<UrlRecord> {
        self.read().get(url).cloned()
    }

    fn list(&self, order: &[OrderKey], limit: usize) -> Vec<UrlRecord> {
        let mut records: Vec<UrlRecord> = self.read().values().cloned().collect();

        sort_records(&mut records, order);
        records.truncate(limit);
        records
    }

    fn delete(&self, url: &str) -> StoreResult<()> {
        self.write()
            .remove(url)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(url.to_string()))
    }

    fn len(&self) -> usize {
        self.read().len()
    }

    fn summary(&self) -> StoreSummary {
        let records = self.read();
        let mut summary = StoreSummary::default();
        for record in records.values() {
            summary.add(record);
        }
        summary
    }
}
