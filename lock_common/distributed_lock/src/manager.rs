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
use crate::client::RedisLockStore;
use crate::config::LockConfig;
use crate::error::{DistributedLockError, Result};
use crate::lock::Lock;
use crate::store::{bounded, LockStore};
use crate::token::{TokenGenerator, UuidTokenGenerator};

const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(3);

/// Longest TTL accepted, the `PX` limit of Redis
pub const MAX_TTL: Duration = Duration::from_millis(i64::MAX as u64);

/// Entry point for acquiring distributed locks over a shared store connection.
///
/// The manager is cheap to clone and safe to share between tasks; every call is an
/// independent round trip and nothing is queued in-process.
#[derive(Clone)]
pub struct LockManager {
    store: Arc<dyn LockStore>,
    tokens: Arc<dyn TokenGenerator>,
    operation_timeout: Duration,
    key_prefix: String,
}

impl LockManager {
    /// Create a manager over `store` with UUID tokens and the default operation timeout
    pub fn new(store: Arc<dyn LockStore>) -> Self {
        Self {
            store,
            tokens: Arc::new(UuidTokenGenerator),
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
            key_prefix: String::new(),
        }
    }

    pub fn with_token_generator(mut self, tokens: Arc<dyn TokenGenerator>) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// Connect to Redis as described by `config` and build a manager over it
    ///
    /// # Errors
    /// * `InvalidArgument` - If the config is invalid or has no Redis address.
    /// * `StoreUnavailable` - If Redis cannot be reached.
    pub async fn from_config(config: &LockConfig) -> Result<Self> {
        config.validate()?;
        if config.redis_url.is_empty() {
            return Err(DistributedLockError::InvalidArgument("redis_url is not configured".to_string()));
        }
        let store = bounded(config.operation_timeout(), RedisLockStore::connect(&config.redis_url))
            .await
            .map_err(|e| {
                error!("Failed to connect lock store: {}", e);
                DistributedLockError::StoreUnavailable(e)
            })?;
        Ok(Self::new(Arc::new(store))
            .with_operation_timeout(config.operation_timeout())
            .with_key_prefix(config.key_prefix.clone()))
    }

    /// Attempt to acquire `key` for `ttl`, without waiting or retrying.
    ///
    /// A fresh ownership token is generated and written with a single atomic
    /// set-if-absent carrying the expiration.
    ///
    /// # Errors
    /// * `LockContended` - Another holder currently owns the key.
    /// * `StoreUnavailable` - The store could not be reached or timed out.
    /// * `InvalidArgument` - Empty key, or a TTL below one millisecond or above [`MAX_TTL`].
    pub async fn try_acquire(&self, key: &str, ttl: Duration) -> Result<Lock> {
        self.try_acquire_within(key, ttl, self.operation_timeout).await
    }

    /// Like [`try_acquire`](Self::try_acquire), bounding the store call by `timeout`
    pub async fn try_acquire_within(&self, key: &str, ttl: Duration, timeout: Duration) -> Result<Lock> {
        validate_key(key)?;
        if ttl < Duration::from_millis(1) {
            return Err(DistributedLockError::InvalidArgument(format!(
                "ttl must be at least 1ms, got {:?}",
                ttl
            )));
        }
        if ttl > MAX_TTL {
            return Err(DistributedLockError::InvalidArgument(format!(
                "ttl must be at most {:?}, got {:?}",
                MAX_TTL, ttl
            )));
        }

        let store_key = self.store_key(key);
        let token = self.tokens.generate();
        let started = Instant::now();
        let acquired = bounded(timeout, self.store.set_if_absent(&store_key, &token, ttl))
            .await
            .map_err(|e| {
                error!("Failed to acquire lock {}: {}", key, e);
                DistributedLockError::StoreUnavailable(e)
            })?;

        if !acquired {
            debug!("Lock {} is held by another owner", key);
            return Err(DistributedLockError::LockContended { key: key.to_string() });
        }

        info!("Acquired lock {} for {:?}", key, ttl);
        Ok(Lock::new(
            key.to_string(),
            store_key,
            token,
            ttl,
            started,
            self.operation_timeout,
            Arc::clone(&self.store),
        ))
    }

    /// Current owner token of `key`, for diagnostics
    pub async fn holder(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;
        Ok(bounded(self.operation_timeout, self.store.get(&self.store_key(key))).await?)
    }

    /// Time left before `key` expires, `None` if it is not locked
    pub async fn remaining_ttl(&self, key: &str) -> Result<Option<Duration>> {
        validate_key(key)?;
        Ok(bounded(self.operation_timeout, self.store.ttl(&self.store_key(key))).await?)
    }

    /// Unconditionally remove `key` regardless of owner.
    ///
    /// Administrative escape hatch for clearing a lock known to be abandoned. It bypasses
    /// the ownership check, so it must never stand in for [`Lock::release`].
    pub async fn force_delete(&self, key: &str) -> Result<bool> {
        validate_key(key)?;
        let removed = bounded(self.operation_timeout, self.store.delete(&self.store_key(key))).await?;
        if removed {
            warn!("Force deleted lock {}", key);
        }
        Ok(removed)
    }

    pub fn operation_timeout(&self) -> Duration {
        self.operation_timeout
    }

    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    fn store_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(DistributedLockError::InvalidArgument("lock key must not be empty".to_string()));
    }
    Ok(())
}

impl fmt::Debug for LockManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockManager")
            .field("operation_timeout", &self.operation_timeout)
            .field("key_prefix", &self.key_prefix)
            .finish()
    }
}
