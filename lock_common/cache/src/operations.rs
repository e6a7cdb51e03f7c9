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
use redis::{AsyncCommands, FromRedisValue, Script};
use crate::client::RedisClient;
use crate::error::RedisError;

impl RedisClient {
    /// Sets `key` to `value` only if the key does not exist, with a millisecond expiration.
    ///
    /// Issued as a single `SET key value NX PX ttl` so the value and its expiration are
    /// applied together or not at all.
    ///
    /// # Returns
    ///
    /// Returns `Ok(true)` if the key was set, `Ok(false)` if it already existed.
    ///
    /// # Errors
    /// * `RedisError::ConfigError` - If `ttl` is beyond what `PX` accepts.
    /// * `RedisError::CommandError` - If the command fails.
    pub async fn set_nx_px(&self, key: &str, value: &str, ttl: Duration) -> Result<bool, RedisError> {
        let millis = ttl_to_millis(ttl)?;
        let mut conn = self.conn.clone();
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .arg("PX")
            .arg(millis)
            .query_async(&mut conn)
            .await?;
        match reply.as_deref() {
            Some("OK") => Ok(true),
            None => Ok(false),
            Some(other) => Err(RedisError::UnexpectedReply(format!("SET NX returned {}", other))),
        }
    }

    /// Runs a Lua script server-side with the given keys and arguments.
    ///
    /// The script is sent by hash first and loaded on a `NOSCRIPT` miss.
    ///
    /// # Errors
    /// * `RedisError::CommandError` - If the script fails or its reply cannot be converted.
    pub async fn invoke_script<T: FromRedisValue>(
        &self,
        script: &Script,
        keys: &[&str],
        args: &[&str],
    ) -> Result<T, RedisError> {
        let mut conn = self.conn.clone();
        let mut invocation = script.prepare_invoke();
        for key in keys {
            invocation.key(*key);
        }
        for arg in args {
            invocation.arg(*arg);
        }
        Ok(invocation.invoke_async(&mut conn).await?)
    }

    /// Gets the value for a given key, `None` if the key does not exist.
    pub async fn get(&self, key: &str) -> Result<Option<String>, RedisError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    /// Deletes a key unconditionally.
    ///
    /// # Returns
    ///
    /// Returns `Ok(true)` if a key was removed.
    pub async fn del(&self, key: &str) -> Result<bool, RedisError> {
        let mut conn = self.conn.clone();
        let removed: i64 = conn.del(key).await?;
        Ok(removed > 0)
    }

    /// Gets the remaining time to live of a key.
    ///
    /// # Returns
    ///
    /// Returns `Ok(None)` if the key does not exist or has no expiration.
    pub async fn pttl(&self, key: &str) -> Result<Option<Duration>, RedisError> {
        let mut conn = self.conn.clone();
        let millis: i64 = conn.pttl(key).await?;
        Ok(ttl_from_millis(millis))
    }
}

/// Largest expiration `PX` accepts, in milliseconds
pub const MAX_PX_MILLIS: u64 = i64::MAX as u64;

fn ttl_to_millis(ttl: Duration) -> Result<u64, RedisError> {
    u64::try_from(ttl.as_millis())
        .ok()
        .filter(|millis| *millis <= MAX_PX_MILLIS)
        .ok_or_else(|| RedisError::ConfigError(format!("ttl {:?} exceeds the PX limit of {}ms", ttl, MAX_PX_MILLIS)))
}

// PTTL replies -2 for a missing key and -1 for a key without expiration
fn ttl_from_millis(millis: i64) -> Option<Duration> {
    if millis >= 0 {
        Some(Duration::from_millis(millis as u64))
    } else {
        None
    }
}
