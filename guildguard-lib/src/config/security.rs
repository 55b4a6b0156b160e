use ahash::AHashMap;
use serde::Deserialize;
use std::time::Duration;

use crate::security::Category;

/// Window and event budget for one category of guarded action
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct CategoryPolicy {
    /// Length of the trailing window in seconds
    pub window_seconds: u64,
    /// Events admitted per actor within one window
    pub max_events: u32,
}

impl CategoryPolicy {
    /// Applied to categories with no configured policy.
    pub const FALLBACK: CategoryPolicy = CategoryPolicy { window_seconds: 60, max_events: 5 };

    pub const fn new(window_seconds: u64, max_events: u32) -> Self {
        Self { window_seconds, max_events }
    }

    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_seconds)
    }
}

/// Per-category rate limiting configuration
///
/// Every category has its own table; omitted tables keep the defaults:
///
/// ```toml
/// [rate_limits.commands]
/// window_seconds = 30
/// max_events = 3
/// ```
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RateLimitsConfig {
    /// Free-text messages and admin commands
    /// Default: 3 per 30 seconds
    #[serde(default = "default_commands")]
    pub commands: CategoryPolicy,
    /// City picks in the city selection channel
    /// Default: 5 per 60 seconds
    #[serde(default = "default_city_selection")]
    pub city_selection: CategoryPolicy,
    /// Single role assignments and removals
    /// Default: 2 per 10 seconds
    #[serde(default = "default_role_updates")]
    pub role_updates: CategoryPolicy,
    /// Recomputation of combined country/city roles
    /// Default: 3 per 30 seconds
    #[serde(default = "default_combo_role_updates")]
    pub combo_role_updates: CategoryPolicy,
}

impl Default for RateLimitsConfig {
    fn default() -> Self {
        Self {
            commands: default_commands(),
            city_selection: default_city_selection(),
            role_updates: default_role_updates(),
            combo_role_updates: default_combo_role_updates(),
        }
    }
}

impl RateLimitsConfig {
    pub fn policy(&self, category: Category) -> CategoryPolicy {
        match category {
            Category::Commands => self.commands,
            Category::CitySelection => self.city_selection,
            Category::RoleUpdates => self.role_updates,
            Category::ComboRoleUpdates => self.combo_role_updates,
        }
    }

    pub fn policies(&self) -> AHashMap<Category, CategoryPolicy> {
        Category::ALL
            .iter()
            .map(|category| (*category, self.policy(*category)))
            .collect()
    }
}

/// Spam detection configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SpamConfig {
    /// Trailing window for message history in seconds
    /// Default: 60
    #[serde(default = "default_spam_window")]
    pub window_seconds: u64,
    /// Identical messages tolerated within the window before further copies are spam
    /// Default: 3
    #[serde(default = "default_max_repeated_messages")]
    pub max_repeated_messages: u32,
    /// Messages of any content tolerated within the window
    /// Default: 10
    #[serde(default = "default_max_messages_per_minute")]
    pub max_messages_per_minute: u32,
}

impl Default for SpamConfig {
    fn default() -> Self {
        Self {
            window_seconds: default_spam_window(),
            max_repeated_messages: default_max_repeated_messages(),
            max_messages_per_minute: default_max_messages_per_minute(),
        }
    }
}

impl SpamConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_seconds)
    }
}

fn default_commands() -> CategoryPolicy {
    CategoryPolicy::new(30, 3)
}

fn default_city_selection() -> CategoryPolicy {
    CategoryPolicy::new(60, 5)
}

fn default_role_updates() -> CategoryPolicy {
    CategoryPolicy::new(10, 2)
}

fn default_combo_role_updates() -> CategoryPolicy {
    CategoryPolicy::new(30, 3)
}

fn default_spam_window() -> u64 {
    60
}

fn default_max_repeated_messages() -> u32 {
    3
}

fn default_max_messages_per_minute() -> u32 {
    10
}
