/*
 * Copyright (c) Huawei Technologies Co., Ltd. 2025. All rights reserved.
 * Global Trust Authority is licensed under the Mulan PSL v2.
 * You can use this software according to the terms and conditions of the Mulan PSL v2.
 * You may obtain a copy of Mulan PSL v2 at:
 *     http://license.coscl.org.cn/MulanPSL2
 * THIS SOFTWARE IS PROVIDED ON AN "AS IS" BASIS, WITHOUT WARRANTIES OF ANY KIND, EITHER EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO NON-INFRINGEMENT, MERCHANTABILITY OR FIT FOR A PARTICULAR
 * PURPOSE.
 * See the Mulan PSL v2 for more details.
 */

use std::collections::HashMap;
use std::time::Duration;
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;
use crate::error::StoreError;
use crate::store::{LockStore, ReleaseOutcome};

#[derive(Debug, Clone)]
struct Record {
    token: String,
    /// `None` when the deadline is past what the clock can represent
    expires_at: Option<Instant>,
}

impl Record {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |expires_at| now < expires_at)
    }
}

/// In-process lock store.
///
/// Each operation runs under one mutex, which gives the same indivisibility Redis gives
/// `SET NX PX` and the release script. Expirations follow the tokio clock, so paused-time
/// tests can step over a TTL. Expired records are swept on every acquisition. Only
/// coordinates tasks inside a single process.
#[derive(Debug, Default)]
pub struct MemoryLockStore {
    records: Mutex<HashMap<String, Record>>,
}

impl MemoryLockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of unexpired records
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.records.lock().values().filter(|r| r.is_live(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn live_record<'a>(records: &'a mut HashMap<String, Record>, key: &str, now: Instant) -> Option<&'a Record> {
        if records.get(key).map_or(false, |r| !r.is_live(now)) {
            records.remove(key);
        }
        records.get(key)
    }
}

#[async_trait]
impl LockStore for MemoryLockStore {
    async fn set_if_absent(&self, key: &str, token: &str, ttl: Duration) -> Result<bool, StoreError> {
        let now = Instant::now();
        let mut records = self.records.lock();
        records.retain(|_, record| record.is_live(now));
        if records.contains_key(key) {
            return Ok(false);
        }
        records.insert(
            key.to_string(),
            Record {
                token: token.to_string(),
                expires_at: now.checked_add(ttl),
            },
        );
        Ok(true)
    }

    async fn compare_and_delete(&self, key: &str, token: &str) -> Result<ReleaseOutcome, StoreError> {
        let now = Instant::now();
        let mut records = self.records.lock();
        let outcome = match Self::live_record(&mut records, key, now) {
            None => ReleaseOutcome::Missing,
            Some(record) if record.token == token => ReleaseOutcome::Deleted,
            Some(_) => ReleaseOutcome::TokenMismatch,
        };
        if outcome == ReleaseOutcome::Deleted {
            records.remove(key);
        }
        Ok(outcome)
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let now = Instant::now();
        let mut records = self.records.lock();
        Ok(Self::live_record(&mut records, key, now).map(|r| r.token.clone()))
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let now = Instant::now();
        let mut records = self.records.lock();
        let existed = Self::live_record(&mut records, key, now).is_some();
        records.remove(key);
        Ok(existed)
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, StoreError> {
        let now = Instant::now();
        let mut records = self.records.lock();
        Ok(Self::live_record(&mut records, key, now).and_then(|r| r.expires_at).map(|at| at - now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_set_if_absent_respects_existing_record() {
        let store = MemoryLockStore::new();
        assert!(store.set_if_absent("k", "t1", Duration::from_secs(10)).await.unwrap());
        assert!(!store.set_if_absent("k", "t2", Duration::from_secs(10)).await.unwrap());
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("t1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_record_expires_after_ttl() {
        let store = MemoryLockStore::new();
        store.set_if_absent("k", "t1", Duration::from_secs(1)).await.unwrap();
        assert_eq!(store.ttl("k").await.unwrap(), Some(Duration::from_secs(1)));

        tokio::time::advance(Duration::from_millis(1000)).await;

        assert_eq!(store.get("k").await.unwrap(), None);
        assert!(store.is_empty());
        assert!(store.set_if_absent("k", "t2", Duration::from_secs(1)).await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_acquire_sweeps_expired_records() {
        let store = MemoryLockStore::new();
        for i in 0..100 {
            store.set_if_absent(&format!("job-{}", i), "t", Duration::from_secs(1)).await.unwrap();
        }
        store.set_if_absent("long", "t", Duration::from_secs(60)).await.unwrap();
        assert_eq!(store.records.lock().len(), 101);

        tokio::time::advance(Duration::from_secs(2)).await;
        store.set_if_absent("fresh", "t", Duration::from_secs(1)).await.unwrap();

        let records = store.records.lock();
        assert_eq!(records.len(), 2);
        assert!(records.contains_key("long") && records.contains_key("fresh"));
    }

    #[tokio::test]
    async fn test_unrepresentable_deadline_never_expires() {
        let store = MemoryLockStore::new();
        assert!(store.set_if_absent("k", "t1", Duration::MAX).await.unwrap());
        assert!(!store.set_if_absent("k", "t2", Duration::from_secs(1)).await.unwrap());
        assert_eq!(store.ttl("k").await.unwrap(), None);
        assert_eq!(store.compare_and_delete("k", "t1").await.unwrap(), ReleaseOutcome::Deleted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_compare_and_delete_outcomes() {
        let store = MemoryLockStore::new();
        assert_eq!(store.compare_and_delete("k", "t1").await.unwrap(), ReleaseOutcome::Missing);

        store.set_if_absent("k", "t1", Duration::from_secs(10)).await.unwrap();
        assert_eq!(store.compare_and_delete("k", "other").await.unwrap(), ReleaseOutcome::TokenMismatch);
        assert_eq!(store.len(), 1);

        assert_eq!(store.compare_and_delete("k", "t1").await.unwrap(), ReleaseOutcome::Deleted);
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_reports_existence() {
        let store = MemoryLockStore::new();
        assert!(!store.delete("k").await.unwrap());
        store.set_if_absent("k", "t1", Duration::from_secs(10)).await.unwrap();
        assert!(store.delete("k").await.unwrap());
        assert_eq!(store.get("k").await.unwrap(), None);
    }
}
