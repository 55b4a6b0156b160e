use guildguard_lib::config::{load_from_path, load_from_str, CategoryPolicy, Config};
use guildguard_lib::GuardError;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

#[test]
fn test_empty_file_yields_defaults() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let file = NamedTempFile::new()?;
    let config = load_from_path(file.path())?;

    assert_eq!(config, Config::default());
    assert_eq!(config.rate_limits.commands, CategoryPolicy::new(30, 3));
    assert_eq!(config.rate_limits.city_selection, CategoryPolicy::new(60, 5));
    assert_eq!(config.rate_limits.role_updates, CategoryPolicy::new(10, 2));
    assert_eq!(config.rate_limits.combo_role_updates, CategoryPolicy::new(30, 3));
    assert_eq!(config.spam.window_seconds, 60);
    assert_eq!(config.spam.max_repeated_messages, 3);
    assert_eq!(config.spam.max_messages_per_minute, 10);
    assert_eq!(config.maintenance.sweep_interval(), Duration::from_secs(3600));
    assert_eq!(config.maintenance.max_age(), Duration::from_secs(24 * 3600));
    assert_eq!(config.logging.level, "info");
    assert!(config.telemetry.metrics_port.is_none());
    Ok(())
}

#[test]
fn test_full_config() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut file = NamedTempFile::new()?;
    writeln!(
        file,
        r#"
[logging]
level = "debug"
show_target = true

[rate_limits.commands]
window_seconds = 10
max_events = 1

[rate_limits.role_updates]
window_seconds = 5
max_events = 4

[spam]
window_seconds = 30
max_repeated_messages = 2
max_messages_per_minute = 6

[maintenance]
sweep_interval_secs = 600
max_age_hours = 2

[telemetry]
metrics_port = 9090
otel_log_level = "error"
"#
    )?;

    let config = load_from_path(file.path())?;
    assert_eq!(config.logging.level, "debug");
    assert!(config.logging.show_target);
    assert_eq!(config.rate_limits.commands, CategoryPolicy::new(10, 1));
    assert_eq!(config.rate_limits.role_updates, CategoryPolicy::new(5, 4));
    // Omitted categories keep their defaults.
    assert_eq!(config.rate_limits.city_selection, CategoryPolicy::new(60, 5));
    assert_eq!(config.spam.window(), Duration::from_secs(30));
    assert_eq!(config.spam.max_repeated_messages, 2);
    assert_eq!(config.maintenance.sweep_interval_secs, 600);
    assert_eq!(config.maintenance.max_age(), Duration::from_secs(7200));
    assert_eq!(config.telemetry.metrics_port, Some(9090));
    assert_eq!(config.telemetry.otel_log_level, "error");
    Ok(())
}

#[test]
fn test_missing_file_is_config_error() {
    let result = load_from_path("/nonexistent/guildguard.toml");
    assert!(matches!(result, Err(GuardError::Config(_))));
}

#[test]
fn test_invalid_toml_is_config_error() {
    let result = load_from_str("[rate_limits.commands\nwindow_seconds = 1");
    assert!(matches!(result, Err(GuardError::Config(_))));
}

#[test]
fn test_incomplete_policy_is_rejected() {
    let result = load_from_str(
        r#"
[rate_limits.commands]
window_seconds = 30
"#,
    );
    assert!(matches!(result, Err(GuardError::Config(_))));
}

#[test]
fn test_sample_config_loads() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../config/guildguard.toml");
    let config = load_from_path(path)?;
    assert_eq!(config, Config::default());
    Ok(())
}
