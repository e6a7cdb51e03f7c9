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

use chrono::{DateTime, Local};
use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::append::rolling_file::policy::compound::roll::fixed_window::FixedWindowRoller;
use log4rs::append::rolling_file::policy::compound::trigger::size::SizeTrigger as SizeBasedTriggerPolicy;
use log4rs::append::rolling_file::policy::compound::CompoundPolicy;
use log4rs::{
    append::rolling_file::RollingFileAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    Config, Handle,
};
use std::env;
use std::path::{Path, PathBuf};
use crate::config::{LogConfig, LoggerConfig};

const LOG_OUTPUT_DIR_ENV: &str = "LOG_OUTPUT_DIR";
const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S:%3f)} {l} [{M}:{L}] - {m}{n}";
const ROOT_APPENDER: &str = "root_appender";
const CONSOLE_APPENDER: &str = "console_appender";

pub struct Logger {
    handle: Handle,
}

impl Logger {
    pub fn new_from_yaml(config_path: impl Into<PathBuf>) -> Result<Self, Box<dyn std::error::Error>> {
        let config = LogConfig::from_yaml(config_path)?;
        Self::new_from_config(config)
    }

    pub fn new_from_config(config: LogConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let log4rs_config = Self::build_config(&config)?;
        let handle = log4rs::init_config(log4rs_config)?;
        Ok(Self { handle })
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    pub(crate) fn build_config(config: &LogConfig) -> Result<Config, Box<dyn std::error::Error>> {
        let output_dir = Self::output_dir(config);
        let mut log4rs_config = Config::builder();

        // Module loggers write only to their own file
        for logger_config in config.loggers.iter().filter(|l| l.path_prefix != "root") {
            let appender = Self::create_appender(&output_dir, logger_config)?;
            let appender_name = format!("{}_appender", logger_config.path_prefix);
            log4rs_config = log4rs_config
                .appender(Appender::builder().build(&appender_name, Box::new(appender)));

            let logger = log4rs::config::Logger::builder()
                .appender(appender_name)
                .additive(false)
                .build(
                    logger_config.path_prefix.clone(),
                    Self::parse_level(&logger_config.level),
                );
            log4rs_config = log4rs_config.logger(logger);
        }

        let mut root = Root::builder();
        if config.console {
            let console = ConsoleAppender::builder()
                .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
                .build();
            log4rs_config = log4rs_config
                .appender(Appender::builder().build(CONSOLE_APPENDER, Box::new(console)));
            root = root.appender(CONSOLE_APPENDER);
        }

        let root_level = match config.get_root_config() {
            Some(root_config) => {
                let root_appender = Self::create_appender(&output_dir, root_config)?;
                log4rs_config = log4rs_config
                    .appender(Appender::builder().build(ROOT_APPENDER, Box::new(root_appender)));
                root = root.appender(ROOT_APPENDER);
                Self::parse_level(&root_config.level)
            }
            None => LevelFilter::Info,
        };

        Ok(log4rs_config.build(root.build(root_level))?)
    }

    fn output_dir(config: &LogConfig) -> PathBuf {
        if let Some(dir) = &config.output_dir {
            return PathBuf::from(dir);
        }
        dotenv::dotenv().ok();
        env::var(LOG_OUTPUT_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."))
    }

    fn create_appender(
        output_dir: &Path,
        config: &LoggerConfig,
    ) -> Result<RollingFileAppender, Box<dyn std::error::Error>> {
        let log_directory = output_dir.join(&config.log_directory);
        std::fs::create_dir_all(&log_directory)?;

        let now: DateTime<Local> = Local::now();
        let formatted_time = now.format("%Y%m%d%H%M%S%3f").to_string();

        let log_file = log_directory.join(&config.log_file_name);
        let archived_log_pattern = format!(
            "{}/{}-{{}}-{}.gz",
            log_directory.display(),
            config.log_file_name,
            formatted_time
        );

        let size_trigger = SizeBasedTriggerPolicy::new(config.max_file_size);
        let roller =
            FixedWindowRoller::builder().build(&archived_log_pattern, config.max_zip_count)?;
        let compound_policy = CompoundPolicy::new(Box::new(size_trigger), Box::new(roller));

        let appender = RollingFileAppender::builder()
            .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
            .build(log_file, Box::new(compound_policy))?;

        Ok(appender)
    }

    pub(crate) fn parse_level(level: &str) -> LevelFilter {
        match level.to_lowercase().as_str() {
            "trace" => LevelFilter::Trace,
            "debug" => LevelFilter::Debug,
            "info" => LevelFilter::Info,
            "warn" => LevelFilter::Warn,
            "error" => LevelFilter::Error,
            "off" => LevelFilter::Off,
            _ => LevelFilter::Info,
        }
    }
}
