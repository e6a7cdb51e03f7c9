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

use std::env;
use std::path::PathBuf;
use std::time::Duration;
use log::{debug, info};
use serde::Deserialize;
use crate::error::{DistributedLockError, Result};

pub const REDIS_URL_ENV: &str = "REDIS_URL";
pub const DEFAULT_TTL_ENV: &str = "LOCK_DEFAULT_TTL_MS";
pub const OPERATION_TIMEOUT_ENV: &str = "LOCK_OPERATION_TIMEOUT_MS";
pub const KEY_PREFIX_ENV: &str = "LOCK_KEY_PREFIX";

const DEFAULT_TTL_MS: u64 = 30_000;
const DEFAULT_OPERATION_TIMEOUT_MS: u64 = 3_000;

fn default_ttl_ms() -> u64 {
    DEFAULT_TTL_MS
}

fn default_operation_timeout_ms() -> u64 {
    DEFAULT_OPERATION_TIMEOUT_MS
}

/// Connection and timing parameters for the lock manager
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LockConfig {
    #[serde(default)]
    pub redis_url: String,
    /// TTL used by callers that do not pick their own
    #[serde(default = "default_ttl_ms")]
    pub default_ttl_ms: u64,
    /// Upper bound on a single store round trip
    #[serde(default = "default_operation_timeout_ms")]
    pub operation_timeout_ms: u64,
    /// Prepended to every lock key
    #[serde(default)]
    pub key_prefix: String,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            redis_url: String::new(),
            default_ttl_ms: DEFAULT_TTL_MS,
            operation_timeout_ms: DEFAULT_OPERATION_TIMEOUT_MS,
            key_prefix: String::new(),
        }
    }
}

impl LockConfig {
    /// Parse configuration from a YAML file
    pub fn from_yaml(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            DistributedLockError::InvalidArgument(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| DistributedLockError::InvalidArgument(format!("Invalid lock config: {}", e)))
    }

    /// Build configuration from defaults overridden by the environment (and `.env`)
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Load a YAML file, then let environment variables override its values
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let mut config = Self::from_yaml(path)?;
        config.apply_env()?;
        Ok(config)
    }

    /// Override fields with any of `REDIS_URL`, `LOCK_DEFAULT_TTL_MS`,
    /// `LOCK_OPERATION_TIMEOUT_MS`, `LOCK_KEY_PREFIX` that are set
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(path) = dotenv::dotenv() {
            info!("load .env file: {}", path.display());
        }
        if let Ok(url) = env::var(REDIS_URL_ENV) {
            self.redis_url = url;
        }
        if let Some(ttl) = env_millis(DEFAULT_TTL_ENV)? {
            self.default_ttl_ms = ttl;
        }
        if let Some(timeout) = env_millis(OPERATION_TIMEOUT_ENV)? {
            self.operation_timeout_ms = timeout;
        }
        if let Ok(prefix) = env::var(KEY_PREFIX_ENV) {
            self.key_prefix = prefix;
        }
        debug!("lock config resolved: ttl={}ms timeout={}ms prefix={:?}",
            self.default_ttl_ms, self.operation_timeout_ms, self.key_prefix);
        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_ttl_ms == 0 {
            return Err(DistributedLockError::InvalidArgument("default_ttl_ms must be positive".to_string()));
        }
        if self.operation_timeout_ms == 0 {
            return Err(DistributedLockError::InvalidArgument("operation_timeout_ms must be positive".to_string()));
        }
        Ok(())
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_millis(self.default_ttl_ms)
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }
}

fn env_millis(name: &str) -> Result<Option<u64>> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|e| DistributedLockError::InvalidArgument(format!("{} is not a number: {}", name, e))),
        Err(_) => Ok(None),
    }
}
