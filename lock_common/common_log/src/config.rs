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

use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Directory the per-logger `log_directory` values are resolved against.
    /// Falls back to `LOG_OUTPUT_DIR`, then the working directory.
    #[serde(default)]
    pub output_dir: Option<String>,
    /// Also write root output to stdout
    #[serde(default)]
    pub console: bool,
    pub loggers: Vec<LoggerConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggerConfig {
    pub path_prefix: String,
    pub log_directory: String,
    pub log_file_name: String,
    pub max_file_size: u64,
    pub max_zip_count: u32,
    pub level: String,
}

impl LogConfig {
    pub fn from_yaml(path: impl Into<PathBuf>) -> Result<Self, Box<dyn std::error::Error>> {
        let config_str = std::fs::read_to_string(path.into())?;
        let config: LogConfig = serde_yaml::from_str(&config_str)?;
        Ok(config)
    }

    pub fn get_logger_config(&self, path_prefix: &str) -> Option<&LoggerConfig> {
        self.loggers.iter().find(|l| path_prefix.starts_with(&l.path_prefix))
    }

    pub fn get_root_config(&self) -> Option<&LoggerConfig> {
        self.get_logger_config("root")
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use super::*;

    const YAML: &str = r#"
console: true
loggers:
  - path_prefix: root
    log_directory: logs
    log_file_name: root.log
    max_file_size: 10485760
    max_zip_count: 6
    level: info
  - path_prefix: distributed_lock
    log_directory: logs
    log_file_name: lock.log
    max_file_size: 10485760
    max_zip_count: 3
    level: debug
"#;

    #[test]
    fn test_from_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(YAML.as_bytes()).unwrap();

        let config = LogConfig::from_yaml(file.path()).unwrap();
        assert!(config.console);
        assert!(config.output_dir.is_none());
        assert_eq!(config.loggers.len(), 2);
        assert_eq!(config.get_root_config().unwrap().log_file_name, "root.log");
    }

    #[test]
    fn test_logger_lookup_by_module_path() {
        let config: LogConfig = serde_yaml::from_str(YAML).unwrap();
        let lock_logger = config.get_logger_config("distributed_lock::manager").unwrap();
        assert_eq!(lock_logger.level, "debug");
        assert!(config.get_logger_config("cache::client").is_none());
    }
}
