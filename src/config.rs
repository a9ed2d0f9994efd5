//! Configuration system for cost scenarios.
//!
//! This module provides YAML/JSON configuration file support for defining
//! cost accrual scenarios declaratively.
//!
//! # Configuration File Structure
//!
//! ```yaml
//! simulation:
//!   max_time: 1000
//!   log_level: info
//!
//! report:
//!   interval: 100
//!   metrics: [cost_over_time, aggregated_cost_over_time]
//!
//! resources:
//!   - id: web-1
//!     priced: true
//!     amount: 5.0
//!     unit: USD
//!     interval: 10
//!   - id: db-1
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::model::{ReportConfig, Resource, ResourceModel};
use crate::spec::{FIELD_AMOUNT, FIELD_INTERVAL, FIELD_UNIT};
use crate::types::SimTime;

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown file format: {0}")]
    UnknownFormat(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Global simulation parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationParams {
    /// Maximum simulation time
    #[serde(default = "default_max_time")]
    pub max_time: SimTime,

    /// Logging level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_max_time() -> SimTime {
    1000.0
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            max_time: default_max_time(),
            log_level: default_log_level(),
        }
    }
}

/// Configuration for a single resource.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Unique resource identifier
    pub id: String,

    /// Whether the resource carries the pricing marker
    #[serde(default)]
    pub priced: bool,

    /// Cost amount charged per interval
    #[serde(default)]
    pub amount: Option<f64>,

    /// Currency or accounting unit of the amount
    #[serde(default)]
    pub unit: Option<String>,

    /// Charging interval in simulation time units
    #[serde(default)]
    pub interval: Option<SimTime>,
}

impl ResourceConfig {
    /// Validates the resource configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.id.is_empty() {
            return Err(ConfigError::Validation(
                "Resource with empty id".to_string(),
            ));
        }
        if let Some(amount) = self.amount {
            if !amount.is_finite() || amount < 0.0 {
                return Err(ConfigError::Validation(format!(
                    "Resource {} has invalid amount: {amount}",
                    self.id
                )));
            }
        }
        if let Some(interval) = self.interval {
            if !interval.is_finite() || interval <= 0.0 {
                return Err(ConfigError::Validation(format!(
                    "Resource {} has invalid interval: {interval}",
                    self.id
                )));
            }
        }
        if !self.priced && (self.amount.is_some() || self.unit.is_some() || self.interval.is_some())
        {
            tracing::warn!(
                "Resource {} declares cost fields but no pricing marker (ignored)",
                self.id
            );
        }
        Ok(())
    }
}

/// Complete scenario configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Global simulation parameters
    #[serde(default)]
    pub simulation: SimulationParams,

    /// Environment-wide report configuration
    #[serde(default)]
    pub report: Option<ReportConfig>,

    /// Resource definitions
    #[serde(default)]
    pub resources: Vec<ResourceConfig>,
}

impl ScenarioConfig {
    /// Creates a new empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Loads configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> ConfigResult<Self> {
        let config: ScenarioConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Loads configuration from a JSON string.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: ScenarioConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a file, auto-detecting format.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        match ext.to_lowercase().as_str() {
            "yaml" | "yml" => Self::from_yaml_file(path),
            "json" => Self::from_json_file(path),
            _ => Err(ConfigError::UnknownFormat(ext.to_string())),
        }
    }

    /// Validates the entire configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.simulation.max_time.is_finite() || self.simulation.max_time <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "Invalid max_time: {}",
                self.simulation.max_time
            )));
        }

        if let Some(report) = &self.report {
            if !report.interval.is_finite() || report.interval <= 0.0 {
                return Err(ConfigError::Validation(format!(
                    "Invalid report interval: {}",
                    report.interval
                )));
            }
        }

        let mut ids = std::collections::HashSet::new();
        for resource in &self.resources {
            resource.validate()?;
            if !ids.insert(resource.id.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "Duplicate resource ID: {}",
                    resource.id
                )));
            }
        }

        Ok(())
    }

    /// Saves configuration to a YAML file.
    pub fn to_yaml_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Converts to YAML string.
    pub fn to_yaml(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Converts to JSON string.
    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Returns the number of configured resources.
    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    /// Finds a resource configuration by ID.
    pub fn find_resource(&self, id: &str) -> Option<&ResourceConfig> {
        self.resources.iter().find(|r| r.id == id)
    }

    /// Builds the initial topology described by this configuration.
    ///
    /// Cost fields are only materialized for marked resources; an unmarked
    /// resource keeps an empty field map regardless of what the file says.
    pub fn build_model(&self) -> ResourceModel {
        let mut model = ResourceModel::new();
        for rc in &self.resources {
            let mut resource = Resource::new(&rc.id);
            if rc.priced {
                resource = resource.priced();
                if let Some(amount) = rc.amount {
                    resource = resource.with_field(FIELD_AMOUNT, amount);
                }
                if let Some(unit) = &rc.unit {
                    resource = resource.with_field(FIELD_UNIT, unit.as_str());
                }
                if let Some(interval) = rc.interval {
                    resource = resource.with_field(FIELD_INTERVAL, interval);
                }
            }
            model.add_resource(resource);
        }
        if let Some(report) = &self.report {
            model.set_report(report.clone());
        }
        model
    }
}

/// Builder for creating ScenarioConfig programmatically.
#[derive(Default)]
pub struct ScenarioConfigBuilder {
    config: ScenarioConfig,
}

impl ScenarioConfigBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum simulation time.
    pub fn max_time(mut self, time: SimTime) -> Self {
        self.config.simulation.max_time = time;
        self
    }

    /// Sets the log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.simulation.log_level = level.into();
        self
    }

    /// Sets the environment-wide report configuration.
    pub fn report(mut self, report: ReportConfig) -> Self {
        self.config.report = Some(report);
        self
    }

    /// Adds a priced resource with a full cost specification.
    pub fn add_priced_resource(
        mut self,
        id: impl Into<String>,
        amount: f64,
        unit: impl Into<String>,
        interval: SimTime,
    ) -> Self {
        self.config.resources.push(ResourceConfig {
            id: id.into(),
            priced: true,
            amount: Some(amount),
            unit: Some(unit.into()),
            interval: Some(interval),
        });
        self
    }

    /// Adds a resource without cost fields.
    pub fn add_resource(mut self, id: impl Into<String>) -> Self {
        self.config.resources.push(ResourceConfig {
            id: id.into(),
            priced: false,
            amount: None,
            unit: None,
            interval: None,
        });
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> ConfigResult<ScenarioConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
