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

use std::time::Duration;
use async_trait::async_trait;
use mockall::automock;
use crate::error::StoreError;

/// Result of an atomic compare-and-delete on a lock record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// The stored token matched and the record was removed.
    Deleted,
    /// A record exists but carries a different token; it was left untouched.
    TokenMismatch,
    /// No record exists for the key.
    Missing,
}

/// Primitives a key-value store must offer to back the lock.
///
/// `set_if_absent` and `compare_and_delete` must each be indivisible on the store side.
/// `get`, `delete` and `ttl` are for diagnostics and are never part of the release path.
/// Atomic lease renewal (compare-and-expire) would be added here.
#[automock]
#[async_trait]
pub trait LockStore: Send + Sync {
    /// Set `key` to `token` with expiration `ttl` only if `key` does not exist.
    async fn set_if_absent(&self, key: &str, token: &str, ttl: Duration) -> Result<bool, StoreError>;

    /// Delete `key` only if its value equals `token`, in one server-side step.
    async fn compare_and_delete(&self, key: &str, token: &str) -> Result<ReleaseOutcome, StoreError>;

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn delete(&self, key: &str) -> Result<bool, StoreError>;

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, StoreError>;
}

/// Runs one store operation, failing with `StoreError::Timeout` once `timeout` elapses.
///
/// On timeout the in-flight future is dropped, which abandons the network call. Both lock
/// primitives are atomic on the store side, so an abandoned call has either fully applied
/// or not applied at all.
pub(crate) async fn bounded<T, F>(timeout: Duration, op: F) -> Result<T, StoreError>
where
    F: std::future::Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(timeout, op).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout(timeout)),
    }
}
