//! Reporting search configuration.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `REPORTING_DEVICES_INDEX_NAME` | devices | Device index |
//! | `REPORTING_DEPLOYMENTS_INDEX_NAME` | deployments | Deployment index |
//! | `REPORTING_DEFAULT_PER_PAGE` | 20 | Page size when a request gives none |
//! | `REPORTING_MAX_PER_PAGE` | 500 | Largest accepted page size |
//! | `REPORTING_LOG_LEVEL` | info | Log level |
//!
//! # Example
//!
//! ```rust
//! use reporting_query::ReportingConfig;
//!
//! let config = ReportingConfig {
//!     devices_index_name: "tenant_devices".to_string(),
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use clap::Parser;

use crate::types::DEFAULT_PER_PAGE;

/// Search settings of the reporting service.
#[derive(Debug, Clone, Parser)]
#[command(name = "query-compiler")]
#[command(about = "Compiles reporting search requests into search engine queries")]
pub struct ReportingConfig {
    /// Name of the device index.
    #[arg(long, env = "REPORTING_DEVICES_INDEX_NAME", default_value = "devices")]
    pub devices_index_name: String,

    /// Name of the deployment index.
    #[arg(
        long,
        env = "REPORTING_DEPLOYMENTS_INDEX_NAME",
        default_value = "deployments"
    )]
    pub deployments_index_name: String,

    /// Page size used when a request gives none.
    #[arg(long, env = "REPORTING_DEFAULT_PER_PAGE", default_value = "20")]
    pub default_per_page: i64,

    /// Largest accepted page size.
    #[arg(long, env = "REPORTING_MAX_PER_PAGE", default_value = "500")]
    pub max_per_page: i64,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "REPORTING_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            devices_index_name: "devices".to_string(),
            deployments_index_name: "deployments".to_string(),
            default_per_page: DEFAULT_PER_PAGE,
            max_per_page: 500,
            log_level: "info".to_string(),
        }
    }
}

impl ReportingConfig {
    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.devices_index_name.is_empty() {
            errors.push("Devices index name cannot be empty".to_string());
        }

        if self.deployments_index_name.is_empty() {
            errors.push("Deployments index name cannot be empty".to_string());
        }

        if self.default_per_page <= 0 {
            errors.push("Default page size must be positive".to_string());
        }

        if self.max_per_page <= 0 {
            errors.push("Max page size must be positive".to_string());
        }

        if self.default_per_page > self.max_per_page {
            errors.push("Default page size cannot exceed max page size".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Creates a configuration suitable for testing.
    pub fn for_testing() -> Self {
        Self {
            devices_index_name: "test_devices".to_string(),
            deployments_index_name: "test_deployments".to_string(),
            default_per_page: 10,
            max_per_page: 100,
            log_level: "debug".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ReportingConfig::default();
        assert_eq!(config.devices_index_name, "devices");
        assert_eq!(config.deployments_index_name, "deployments");
        assert_eq!(config.default_per_page, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_args() {
        let config = ReportingConfig::try_parse_from([
            "query-compiler",
            "--devices-index-name",
            "devs",
            "--max-per-page",
            "50",
        ])
        .unwrap();
        assert_eq!(config.devices_index_name, "devs");
        assert_eq!(config.max_per_page, 50);
        assert_eq!(config.deployments_index_name, "deployments");
    }

    #[test]
    fn test_validation_errors() {
        let config = ReportingConfig {
            devices_index_name: String::new(),
            max_per_page: 0,
            ..Default::default()
        };
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().any(|e| e.contains("exceed")));
    }

    #[test]
    fn test_for_testing_is_valid() {
        assert!(ReportingConfig::for_testing().validate().is_ok());
    }
}
