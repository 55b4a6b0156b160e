use serde::Deserialize;

use super::maintenance::MaintenanceConfig;
use super::security::{RateLimitsConfig, SpamConfig};
use super::telemetry::{LoggingConfig, TelemetryConfig};

/// Main configuration structure
///
/// Every section is optional; an empty file yields the built-in defaults.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Per-category rate limit policies
    #[serde(default)]
    pub rate_limits: RateLimitsConfig,
    /// Spam detection thresholds
    #[serde(default)]
    pub spam: SpamConfig,
    /// Background sweep of stale per-actor data
    #[serde(default)]
    pub maintenance: MaintenanceConfig,
    /// Telemetry configuration
    /// Controls metrics and the observability server
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}
