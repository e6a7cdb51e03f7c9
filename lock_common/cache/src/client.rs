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
use log::info;
use redis::aio::ConnectionManager;
use redis::Client;
use crate::error::RedisError;

/// Environment variable holding the Redis connection address
pub const REDIS_URL_ENV: &str = "REDIS_URL";

/// Async Redis connection handle.
///
/// Cloning is cheap: every clone shares the same multiplexed, auto-reconnecting
/// connection, so one instance can be built at startup and handed to every
/// component that talks to Redis.
#[derive(Clone)]
pub struct RedisClient {
    pub(crate) client: Client,
    pub(crate) conn: ConnectionManager,
}

impl RedisClient {
    /// Open a connection to the Redis server at `redis_url`
    ///
    /// # Errors
    /// * `RedisError::ConnectionError` - If the address is malformed or the server is unreachable.
    pub async fn connect(redis_url: &str) -> Result<RedisClient, RedisError> {
        let client = Client::open(redis_url).map_err(RedisError::ConnectionError)?;
        let conn = ConnectionManager::new(client.clone())
            .await
            .map_err(RedisError::ConnectionError)?;
        info!("Connected to redis at {:?}", client.get_connection_info().addr);
        Ok(RedisClient { client, conn })
    }

    /// Open a connection using the address in the `REDIS_URL` environment variable
    ///
    /// # Errors
    /// * `RedisError::ConfigError` - If `REDIS_URL` is not set.
    /// * `RedisError::ConnectionError` - If the connection cannot be established.
    pub async fn from_env() -> Result<RedisClient, RedisError> {
        let redis_url = std::env::var(REDIS_URL_ENV)
            .map_err(|_| RedisError::ConfigError(format!("{} environment variable not set", REDIS_URL_ENV)))?;
        Self::connect(&redis_url).await
    }
}

impl fmt::Debug for RedisClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisClient")
            .field("addr", &self.client.get_connection_info().addr)
            .finish()
    }
}
