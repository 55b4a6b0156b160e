use crate::config::{CategoryPolicy, Config};
use crate::error::{GuardError, Result};
use crate::security::Category;

/// One year.
pub const MAX_SWEEP_INTERVAL_SECS: u64 = 365 * 24 * 3600;

pub fn validate(config: &Config) -> Result<()> {
    for category in Category::ALL {
        validate_policy(category, &config.rate_limits.policy(category))?;
    }

    let spam = &config.spam;
    if spam.window_seconds == 0 {
        return Err(GuardError::Config("spam.window_seconds must be > 0".into()));
    }
    if spam.max_repeated_messages == 0 {
        return Err(GuardError::Config("spam.max_repeated_messages must be > 0".into()));
    }
    if spam.max_messages_per_minute == 0 {
        return Err(GuardError::Config("spam.max_messages_per_minute must be > 0".into()));
    }

    let maintenance = &config.maintenance;
    if maintenance.sweep_interval_secs == 0 {
        return Err(GuardError::Config("maintenance.sweep_interval_secs must be > 0".into()));
    }
    if maintenance.max_age_hours == 0 {
        return Err(GuardError::Config("maintenance.max_age_hours must be > 0".into()));
    }
    if maintenance.sweep_interval_secs > MAX_SWEEP_INTERVAL_SECS {
        return Err(GuardError::Config(format!(
            "maintenance.sweep_interval_secs must be <= {MAX_SWEEP_INTERVAL_SECS}"
        )));
    }

    // A sweep must never trim timestamps that still count against a window.
    let max_age = maintenance.max_age();
    let longest_window = Category::ALL
        .into_iter()
        .map(|category| config.rate_limits.policy(category).window())
        .chain(std::iter::once(spam.window()))
        .max()
        .unwrap_or_default();
    if max_age <= longest_window {
        return Err(GuardError::Config(format!(
            "maintenance.max_age_hours ({}h) must exceed the longest window ({}s)",
            maintenance.max_age_hours,
            longest_window.as_secs()
        )));
    }

    Ok(())
}

pub fn validate_policy(category: Category, policy: &CategoryPolicy) -> Result<()> {
    if policy.window_seconds == 0 {
        return Err(GuardError::InvalidPolicy {
            category,
            reason: "window_seconds must be > 0".into(),
        });
    }
    if policy.max_events == 0 {
        return Err(GuardError::InvalidPolicy {
            category,
            reason: "max_events must be > 0".into(),
        });
    }
    Ok(())
}
