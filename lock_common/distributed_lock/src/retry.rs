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

//! Caller-side polling on top of [`LockManager::try_acquire`].
//!
//! `try_acquire` never waits. Services that would rather poll for a while before giving
//! up use [`acquire_with_retry`]; waiters are not queued and get no ordering guarantee.

use std::time::Duration;
use log::{error, info};
use crate::error::{DistributedLockError, Result};
use crate::lock::Lock;
use crate::manager::LockManager;

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_millis(100);

/// How many times to try and how long to sleep between contended attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self { max_attempts, interval }
    }

    /// A single attempt, equivalent to calling `try_acquire` directly
    pub fn fail_fast() -> Self {
        Self::new(1, Duration::ZERO)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_INTERVAL)
    }
}

/// Poll `try_acquire` until it succeeds or `policy.max_attempts` contended attempts pass.
///
/// Only contention is retried. Store failures and invalid arguments are returned at once.
///
/// # Errors
/// * `LockContended` - Every attempt found the key held.
/// * Any other error from the first attempt that was not contention.
pub async fn acquire_with_retry(
    manager: &LockManager,
    key: &str,
    ttl: Duration,
    policy: RetryPolicy,
) -> Result<Lock> {
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match manager.try_acquire(key, ttl).await {
            Ok(lock) => return Ok(lock),
            Err(DistributedLockError::LockContended { .. }) if attempt < attempts => {
                info!(
                    "Lock {} is contended, retrying... (attempt {}/{})",
                    key, attempt, attempts
                );
                tokio::time::sleep(policy.interval).await;
                attempt += 1;
            }
            Err(e) => {
                if !e.is_contended() {
                    error!("Failed to acquire lock {}: {}", key, e);
                }
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use mockall::Sequence;
    use crate::error::StoreError;
    use crate::store::MockLockStore;
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_retry_until_acquired() {
        let mut store = MockLockStore::new();
        let mut seq = Sequence::new();
        store
            .expect_set_if_absent()
            .times(2)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(false));
        store
            .expect_set_if_absent()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(true));
        let manager = LockManager::new(Arc::new(store));

        let lock = acquire_with_retry(&manager, "res", Duration::from_secs(5), RetryPolicy::default())
            .await
            .unwrap();
        assert_eq!(lock.key(), "res");
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_gives_up_with_contention() {
        let mut store = MockLockStore::new();
        store.expect_set_if_absent().times(3).returning(|_, _, _| Ok(false));
        let manager = LockManager::new(Arc::new(store));

        let err = acquire_with_retry(&manager, "res", Duration::from_secs(5), RetryPolicy::default())
            .await
            .unwrap_err();
        assert!(err.is_contended());
    }

    #[tokio::test]
    async fn test_store_failure_is_not_retried() {
        let mut store = MockLockStore::new();
        store
            .expect_set_if_absent()
            .times(1)
            .returning(|_, _, _| Err(StoreError::Connection("refused".to_string())));
        let manager = LockManager::new(Arc::new(store));

        let err = acquire_with_retry(&manager, "res", Duration::from_secs(5), RetryPolicy::new(5, Duration::from_secs(1)))
            .await
            .unwrap_err();
        assert!(err.is_store_unavailable());
    }

    #[tokio::test]
    async fn test_fail_fast_makes_one_attempt() {
        let mut store = MockLockStore::new();
        store.expect_set_if_absent().times(1).returning(|_, _, _| Ok(false));
        let manager = LockManager::new(Arc::new(store));

        let err = acquire_with_retry(&manager, "res", Duration::from_secs(5), RetryPolicy::fail_fast())
            .await
            .unwrap_err();
        assert!(err.is_contended());
    }
}
