use serde::Deserialize;
use std::time::Duration;

/// Maintenance sweep configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct MaintenanceConfig {
    /// How often the background sweep runs, in seconds
    /// Default: 3600 (1 hour)
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
    /// Timestamps older than this are dropped by the sweep, in hours
    /// Must be larger than any category or spam window
    /// Default: 24
    #[serde(default = "default_max_age_hours")]
    pub max_age_hours: u64,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval(),
            max_age_hours: default_max_age_hours(),
        }
    }
}

impl MaintenanceConfig {
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_hours.saturating_mul(3600))
    }
}

fn default_sweep_interval() -> u64 {
    3600
}

fn default_max_age_hours() -> u64 {
    24
}
