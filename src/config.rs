use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::bulk::BulkConfig;
use crate::conflicts::ConflictConfig;
use crate::error::SchedulerError;
use crate::scoring::EngagementWeights;
use crate::timing::SlotConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Days of history read for slot analysis and recommendations.
    pub history_days: i64,
    /// Window used by the timing refresh.
    pub refresh_days: i64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            history_days: 90,
            refresh_days: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub log_level: String,
    pub data_path: PathBuf,
    pub engagement: EngagementWeights,
    pub slots: SlotConfig,
    pub conflicts: ConflictConfig,
    pub bulk: BulkConfig,
    pub service: ServiceConfig,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            data_path: PathBuf::from("data/content.json"),
            engagement: EngagementWeights::default(),
            slots: SlotConfig::default(),
            conflicts: ConflictConfig::default(),
            bulk: BulkConfig::default(),
            service: ServiceConfig::default(),
        }
    }
}

impl SchedulerConfig {
    pub fn load(path: Option<PathBuf>) -> Result<(Self, Option<PathBuf>), SchedulerError> {
        let config_path = path.or_else(default_config_path);
        let mut config = match config_path.as_ref() {
            Some(path) if path.exists() => {
                let contents = std::fs::read_to_string(path)
                    .map_err(|err| SchedulerError::Config(format!("failed to read config: {}", err)))?;
                Self::from_toml(&contents)?
            }
            _ => SchedulerConfig::default(),
        };

        config.apply_env_overrides();
        Ok((config, config_path))
    }

    pub fn from_toml(contents: &str) -> Result<Self, SchedulerError> {
        toml::from_str(contents)
            .map_err(|err| SchedulerError::Config(format!("failed to parse config: {}", err)))
    }

    pub fn write(&self, path: &Path) -> Result<(), SchedulerError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|err| {
                SchedulerError::Config(format!("failed to create config dir: {}", err))
            })?;
        }
        let payload = toml::to_string_pretty(self)
            .map_err(|err| SchedulerError::Config(format!("failed to serialize config: {}", err)))?;
        std::fs::write(path, payload)
            .map_err(|err| SchedulerError::Config(format!("failed to write config: {}", err)))?;
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(level) = env::var("SCHEDULER_LOG_LEVEL") {
            if !level.trim().is_empty() {
                self.log_level = level;
            }
        }
        if let Ok(path) = env::var("SCHEDULER_DATA_PATH") {
            if !path.trim().is_empty() {
                self.data_path = PathBuf::from(path);
            }
        }
        if let Ok(days) = env::var("SCHEDULER_HISTORY_DAYS") {
            if let Ok(value) = days.parse::<i64>() {
                if value > 0 {
                    self.service.history_days = value;
                }
            }
        }
        if let Ok(samples) = env::var("SCHEDULER_MIN_SAMPLES") {
            if let Ok(value) = samples.parse::<usize>() {
                self.slots.min_samples = value;
            }
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    env::var("SCHEDULER_CONFIG_PATH")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .or_else(|| Some(PathBuf::from("config/scheduler.toml")))
}
