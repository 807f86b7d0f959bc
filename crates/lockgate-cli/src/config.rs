//! Configuration loading from TOML files
//!
//! Config file is selected via:
//! 1. --config <path> command line argument
//! 2. LOCKGATE_CONFIG environment variable
//! 3. Default: config/lockgate.toml
//!
//! A missing file is not an error: every field has a default.

use anyhow::Context;
use lockgate_core::constants::{DEFAULT_ACTUATOR_SETTLE, DEFAULT_BAUD_RATE, DEFAULT_COOLDOWN};
use lockgate_pipeline::{AuditOrder, PipelineConfig};
use lockgate_storage::DatabaseConfig;
use serde::Deserialize;
use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_ENV_VAR: &str = "LOCKGATE_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config/lockgate.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// evdev character device of the QR scanner
    pub device: String,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            device: "/dev/input/event0".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ActuatorConfig {
    /// Serial port of the locker controller
    pub device: String,
    pub baud_rate: u32,
    /// Wait after opening the port; the controller resets on open
    pub settle_ms: u64,
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        Self {
            device: "/dev/ttyUSB0".to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            settle_ms: DEFAULT_ACTUATOR_SETTLE.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub path: String,
    pub max_connections: u32,
    pub auto_migrate: bool,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            path: "lockgate.db".to_string(),
            max_connections: 4,
            auto_migrate: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PolicySection {
    pub cooldown_secs: u64,
    /// Unset or 0 waits for the operator forever
    pub confirmation_timeout_secs: Option<u64>,
    pub audit_order: AuditOrder,
}

impl Default for PolicySection {
    fn default() -> Self {
        Self {
            cooldown_secs: DEFAULT_COOLDOWN.as_secs(),
            confirmation_timeout_secs: None,
            audit_order: AuditOrder::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is not set
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Full gate configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scanner: ScannerConfig,
    pub actuator: ActuatorConfig,
    pub database: DatabaseSection,
    pub policy: PolicySection,
    pub logging: LoggingConfig,
}

impl Config {
    /// Pick the config file path.
    pub fn resolve_path(cli: Option<&Path>) -> PathBuf {
        if let Some(path) = cli {
            return path.to_path_buf();
        }

        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return PathBuf::from(path);
        }

        PathBuf::from(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from `path`.
    ///
    /// Returns `Ok(None)` if the file does not exist.
    pub fn from_file(path: &Path) -> anyhow::Result<Option<Self>> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read config file {}", path.display()));
            }
        };

        let config = Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Ok(Some(config))
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.scanner.device.is_empty(),
            "scanner.device must not be empty"
        );
        anyhow::ensure!(
            !self.actuator.device.is_empty(),
            "actuator.device must not be empty"
        );
        anyhow::ensure!(self.actuator.baud_rate > 0, "actuator.baud_rate must be positive");
        anyhow::ensure!(
            self.database.max_connections > 0,
            "database.max_connections must be positive"
        );
        Ok(())
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.actuator.settle_ms)
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        let mut config = PipelineConfig::default()
            .with_cooldown(Duration::from_secs(self.policy.cooldown_secs))
            .with_audit_order(self.policy.audit_order);

        if let Some(secs) = self.policy.confirmation_timeout_secs.filter(|&s| s > 0) {
            config = config.with_confirmation_timeout(Duration::from_secs(secs));
        }

        config
    }

    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig::new(&self.database.path)
            .max_connections(self.database.max_connections)
            .auto_migrate(self.database.auto_migrate)
    }
}
