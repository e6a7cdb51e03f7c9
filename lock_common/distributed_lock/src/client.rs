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
use cache::RedisClient;
use redis::Script;
use crate::error::StoreError;
use crate::scripts::RELEASE_LOCK;
use crate::store::{LockStore, ReleaseOutcome};

/// Lock store backed by Redis
#[derive(Debug, Clone)]
pub struct RedisLockStore {
    client: RedisClient,
    release_script: Script,
}

impl RedisLockStore {
    pub fn new(client: RedisClient) -> Self {
        Self {
            client,
            release_script: Script::new(RELEASE_LOCK),
        }
    }

    /// Connect to Redis at `redis_url` and build a store over the connection
    pub async fn connect(redis_url: &str) -> Result<Self, StoreError> {
        let client = RedisClient::connect(redis_url).await?;
        Ok(Self::new(client))
    }
}

/// Maps the reply of the release script onto an outcome
pub(crate) fn release_outcome(reply: Option<i64>) -> Result<ReleaseOutcome, StoreError> {
    match reply {
        None => Ok(ReleaseOutcome::Missing),
        Some(0) => Ok(ReleaseOutcome::TokenMismatch),
        Some(1) => Ok(ReleaseOutcome::Deleted),
        Some(other) => Err(StoreError::Redis(cache::RedisError::UnexpectedReply(format!(
            "release script returned {}",
            other
        )))),
    }
}

#[async_trait]
impl LockStore for RedisLockStore {
    async fn set_if_absent(&self, key: &str, token: &str, ttl: Duration) -> Result<bool, StoreError> {
        Ok(self.client.set_nx_px(key, token, ttl).await?)
    }

    async fn compare_and_delete(&self, key: &str, token: &str) -> Result<ReleaseOutcome, StoreError> {
        let reply: Option<i64> = self
            .client
            .invoke_script(&self.release_script, &[key], &[token])
            .await?;
        release_outcome(reply)
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.client.get(key).await?)
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.client.del(key).await?)
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, StoreError> {
        Ok(self.client.pttl(key).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_outcome_mapping() {
        assert_eq!(release_outcome(None).unwrap(), ReleaseOutcome::Missing);
        assert_eq!(release_outcome(Some(0)).unwrap(), ReleaseOutcome::TokenMismatch);
        assert_eq!(release_outcome(Some(1)).unwrap(), ReleaseOutcome::Deleted);
    }

    #[test]
    fn test_release_outcome_rejects_unexpected_reply() {
        assert!(matches!(release_outcome(Some(2)), Err(StoreError::Redis(_))));
    }

    #[tokio::test]
    async fn test_connect_rejects_malformed_url() {
        let result = RedisLockStore::connect("definitely not a url").await;
        assert!(matches!(result, Err(StoreError::Redis(cache::RedisError::ConnectionError(_)))));
    }
}
