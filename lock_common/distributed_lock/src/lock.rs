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

use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use log::{debug, error, info, warn};
use tokio::time::Instant;
use crate::error::{DistributedLockError, NotHeldReason, Result};
use crate::store::{bounded, LockStore, ReleaseOutcome};

/// A successfully acquired distributed lock.
///
/// The handle carries the ownership token that the store checks on release; nothing
/// else about the handle grants ownership. It is produced only by
/// [`LockManager::try_acquire`](crate::LockManager::try_acquire) and should be dropped
/// once released. Dropping it without releasing leaves the record to expire by TTL.
pub struct Lock {
    /// Lock key name as given by the caller
    key: String,
    /// Key as stored, including the manager's prefix
    store_key: String,
    /// Lock value, used to identify the lock owner
    token: String,
    /// Expiration set when the lock was created
    ttl: Duration,
    /// Taken just before the acquire request was sent
    acquired_at: Instant,
    operation_timeout: Duration,
    store: Arc<dyn LockStore>,
    released: bool,
}

impl Lock {
    pub(crate) fn new(
        key: String,
        store_key: String,
        token: String,
        ttl: Duration,
        acquired_at: Instant,
        operation_timeout: Duration,
        store: Arc<dyn LockStore>,
    ) -> Self {
        Self {
            key,
            store_key,
            token,
            ttl,
            acquired_at,
            operation_timeout,
            store,
            released: false,
        }
    }

    /// Release the lock
    ///
    /// Deletes the record only if it still carries this handle's token, as one atomic
    /// store operation.
    ///
    /// # Errors
    /// * `LockNotHeld` - The lock expired, was taken over by another holder, or this
    ///   handle was already released.
    /// * `StoreUnavailable` - The store could not be reached or timed out.
    pub async fn release(&mut self) -> Result<()> {
        self.release_within(self.operation_timeout).await
    }

    /// Release the lock, bounding the store call by `timeout` instead of the manager default
    pub async fn release_within(&mut self, timeout: Duration) -> Result<()> {
        if self.released {
            warn!("Release called again on lock {}", self.key);
            return Err(self.not_held(NotHeldReason::AlreadyReleased));
        }

        let outcome = bounded(timeout, self.store.compare_and_delete(&self.store_key, &self.token))
            .await
            .map_err(|e| {
                error!("Failed to release lock {}: {}", self.key, e);
                DistributedLockError::StoreUnavailable(e)
            })?;

        match outcome {
            ReleaseOutcome::Deleted => {
                self.released = true;
                info!("Released lock {}", self.key);
                Ok(())
            }
            ReleaseOutcome::Missing => {
                debug!("Lock {} already expired before release", self.key);
                Err(self.not_held(NotHeldReason::Missing))
            }
            ReleaseOutcome::TokenMismatch => {
                warn!("Lock {} is now owned by another holder, left untouched", self.key);
                Err(self.not_held(NotHeldReason::TokenMismatch))
            }
        }
    }

    /// Whether the store still maps this key to this handle's token.
    ///
    /// Diagnostic only: the answer can be stale by the time it is returned.
    pub async fn is_held(&self) -> Result<bool> {
        if self.released {
            return Ok(false);
        }
        let current = bounded(self.operation_timeout, self.store.get(&self.store_key)).await?;
        Ok(current.as_deref() == Some(self.token.as_str()))
    }

    /// Remaining store TTL of this lock, `None` once it is no longer ours
    pub async fn remaining_ttl(&self) -> Result<Option<Duration>> {
        if !self.is_held().await? {
            return Ok(None);
        }
        Ok(bounded(self.operation_timeout, self.store.ttl(&self.store_key)).await?)
    }

    /// Latest local instant at which the lock can still be assumed valid.
    ///
    /// Measured from before the acquire request left, so it never overestimates the
    /// lease on this host's monotonic clock. `None` when the deadline lies beyond what
    /// the clock can represent.
    pub fn valid_until(&self) -> Option<Instant> {
        self.acquired_at.checked_add(self.ttl)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn acquired_at(&self) -> Instant {
        self.acquired_at
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    fn not_held(&self, reason: NotHeldReason) -> DistributedLockError {
        DistributedLockError::LockNotHeld {
            key: self.key.clone(),
            reason,
        }
    }
}

impl fmt::Debug for Lock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lock")
            .field("key", &self.key)
            .field("store_key", &self.store_key)
            .field("ttl", &self.ttl)
            .field("released", &self.released)
            .finish()
    }
}
