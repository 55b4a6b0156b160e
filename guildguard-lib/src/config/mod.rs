mod loader;
mod maintenance;
mod root;
mod security;
mod telemetry;
pub mod validator;

pub use loader::{load_from_path, load_from_str};
pub use maintenance::MaintenanceConfig;
pub use root::Config;
pub use security::{CategoryPolicy, RateLimitsConfig, SpamConfig};
pub use telemetry::{LoggingConfig, TelemetryConfig};
