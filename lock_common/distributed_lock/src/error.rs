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
use std::time::Duration;
use thiserror::Error;

/// Why a release found nothing of ours to remove
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotHeldReason {
    /// The key no longer exists: it expired or was never set.
    Missing,
    /// The key exists but holds another owner's token.
    TokenMismatch,
    /// This handle was already released.
    AlreadyReleased,
}

impl fmt::Display for NotHeldReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            NotHeldReason::Missing => "lock does not exist or has expired",
            NotHeldReason::TokenMismatch => "lock is owned by another holder",
            NotHeldReason::AlreadyReleased => "lock handle was already released",
        };
        f.write_str(reason)
    }
}

/// Failure talking to the backing store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Redis operation failed: {0}")]
    Redis(#[from] cache::RedisError),

    #[error("Store operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Store connection error: {0}")]
    Connection(String),
}

impl From<redis::RedisError> for StoreError {
    fn from(e: redis::RedisError) -> Self {
        StoreError::Redis(cache::RedisError::CommandError(e))
    }
}

#[derive(Debug, Error)]
pub enum DistributedLockError {
    #[error("Lock {key} is held by another owner")]
    LockContended { key: String },

    #[error("Lock {key} is not held: {reason}")]
    LockNotHeld { key: String, reason: NotHeldReason },

    #[error("Lock store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    #[error("Parameter error: {0}")]
    InvalidArgument(String),
}

impl DistributedLockError {
    pub fn is_contended(&self) -> bool {
        matches!(self, DistributedLockError::LockContended { .. })
    }

    pub fn is_not_held(&self) -> bool {
        matches!(self, DistributedLockError::LockNotHeld { .. })
    }

    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, DistributedLockError::StoreUnavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, DistributedLockError>;
