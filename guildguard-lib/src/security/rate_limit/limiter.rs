//! High-level rate limiter over the category catalog.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::window::{WindowDecision, WindowStore};
use crate::config::{CategoryPolicy, RateLimitsConfig};
use crate::security::{ActorId, Category};

/// Result of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Action is allowed to proceed and was recorded.
    Allowed {
        /// Maximum number of actions allowed in the window
        limit: u32,
        /// Number of actions remaining in the current window
        remaining: u32,
    },
    /// Action is rate limited and was not recorded.
    Limited {
        /// Maximum number of actions allowed in the window
        limit: u32,
        /// Number of actions remaining (always 0)
        remaining: u32,
        /// Time until the oldest recorded action leaves the window
        reset_after: Duration,
    },
}

impl RateLimitResult {
    fn from_decision(decision: WindowDecision) -> Self {
        let limit = decision.limit;
        if decision.over_limit {
            RateLimitResult::Limited { limit, remaining: 0, reset_after: decision.reset_after }
        } else {
            let count = u32::try_from(decision.count).unwrap_or(u32::MAX);
            RateLimitResult::Allowed { limit, remaining: limit.saturating_sub(count) }
        }
    }

    /// Returns true if the action is allowed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed { .. })
    }

    /// Returns true if the action is limited.
    pub fn is_limited(&self) -> bool {
        matches!(self, RateLimitResult::Limited { .. })
    }

    /// Get the limit value.
    pub fn limit(&self) -> u32 {
        match self {
            RateLimitResult::Allowed { limit, .. } => *limit,
            RateLimitResult::Limited { limit, .. } => *limit,
        }
    }

    /// Get the remaining count.
    pub fn remaining(&self) -> u32 {
        match self {
            RateLimitResult::Allowed { remaining, .. } => *remaining,
            RateLimitResult::Limited { remaining, .. } => *remaining,
        }
    }

    /// Get the reset duration if limited.
    pub fn reset_after(&self) -> Option<Duration> {
        match self {
            RateLimitResult::Limited { reset_after, .. } => Some(*reset_after),
            _ => None,
        }
    }
}

/// Rate limiter enforcing one [`CategoryPolicy`] per [`Category`].
///
/// Category names that do not parse into a [`Category`] are still limited, under
/// [`CategoryPolicy::FALLBACK`], in a separate store that [`RateLimiter::stats`] does not report.
///
/// # Example
/// ```ignore
/// use guildguard_lib::config::RateLimitsConfig;
/// use guildguard_lib::security::{ActorId, Category, RateLimitResult, RateLimiter};
///
/// let limiter = RateLimiter::new(&RateLimitsConfig::default());
///
/// match limiter.check(Category::CitySelection, ActorId(7)) {
///     RateLimitResult::Allowed { remaining, .. } => {
///         println!("City pick allowed, {} remaining", remaining);
///     }
///     RateLimitResult::Limited { reset_after, .. } => {
///         println!("Rate limited, retry after {:?}", reset_after);
///     }
/// }
/// ```
pub struct RateLimiter {
    store: WindowStore<Category>,
    unknown: WindowStore<String>,
}

impl RateLimiter {
    /// Create a rate limiter with one policy per category from configuration.
    pub fn new(config: &RateLimitsConfig) -> Self {
        Self::from_policies(config.policies())
    }

    /// Create a rate limiter from explicit policies.
    ///
    /// Categories missing from `policies` are limited under [`CategoryPolicy::FALLBACK`].
    pub fn from_policies(policies: ahash::AHashMap<Category, CategoryPolicy>) -> Self {
        Self { store: WindowStore::new(policies), unknown: WindowStore::new(Default::default()) }
    }

    /// Check and record an action for `actor` in `category` at `now`.
    pub fn check_at(&self, category: Category, actor: ActorId, now: Instant) -> RateLimitResult {
        let decision = self.store.record_and_check(&category, actor, now);
        let result = RateLimitResult::from_decision(decision);

        if result.is_limited() {
            warn!(
                category = %category,
                actor = %actor,
                count = decision.count,
                reset_after_ms = decision.reset_after.as_millis() as u64,
                "Rate limited"
            );
        } else {
            debug!(category = %category, actor = %actor, count = decision.count, "Action admitted");
        }

        result
    }

    /// Check and record an action for `actor` in `category` now.
    pub fn check(&self, category: Category, actor: ActorId) -> RateLimitResult {
        self.check_at(category, actor, Instant::now())
    }

    pub fn is_rate_limited_at(&self, category: Category, actor: ActorId, now: Instant) -> bool {
        self.check_at(category, actor, now).is_limited()
    }

    /// Returns true if the action must be rejected. Admitted actions are recorded.
    pub fn is_rate_limited(&self, category: Category, actor: ActorId) -> bool {
        self.is_rate_limited_at(category, actor, Instant::now())
    }

    /// Same as [`RateLimiter::is_rate_limited_at`] for a category given by name.
    ///
    /// Unknown names never fail: they are limited under the fallback policy.
    pub fn is_rate_limited_named_at(&self, name: &str, actor: ActorId, now: Instant) -> bool {
        match Category::from_str(name) {
            Ok(category) => self.is_rate_limited_at(category, actor, now),
            Err(_) => {
                let decision = self.unknown.record_and_check(&name.to_string(), actor, now);
                if decision.over_limit {
                    warn!(category = name, actor = %actor, "Rate limited under fallback policy");
                }
                decision.over_limit
            }
        }
    }

    pub fn is_rate_limited_named(&self, name: &str, actor: ActorId) -> bool {
        self.is_rate_limited_named_at(name, actor, Instant::now())
    }

    pub fn is_command_rate_limited(&self, actor: ActorId) -> bool {
        self.is_rate_limited(Category::Commands, actor)
    }

    pub fn is_city_selection_rate_limited(&self, actor: ActorId) -> bool {
        self.is_rate_limited(Category::CitySelection, actor)
    }

    pub fn is_role_update_rate_limited(&self, actor: ActorId) -> bool {
        self.is_rate_limited(Category::RoleUpdates, actor)
    }

    pub fn is_combo_role_rate_limited(&self, actor: ActorId) -> bool {
        self.is_rate_limited(Category::ComboRoleUpdates, actor)
    }

    /// Configured policy for `category`.
    pub fn policy(&self, category: Category) -> CategoryPolicy {
        self.store.policy(&category)
    }

    /// User-facing wait message. Depends only on the category's policy.
    pub fn rate_limit_message(&self, category: Category) -> String {
        format_rate_limit_message(&self.policy(category))
    }

    /// Wait message for a category given by name; unknown names describe the fallback policy.
    pub fn rate_limit_message_named(&self, name: &str) -> String {
        match Category::from_str(name) {
            Ok(category) => self.rate_limit_message(category),
            Err(_) => format_rate_limit_message(&CategoryPolicy::FALLBACK),
        }
    }

    /// Actors currently tracked per category. Categories without entries since the last sweep are
    /// omitted.
    pub fn stats(&self) -> BTreeMap<Category, usize> {
        self.store.stats()
    }

    /// Drop timestamps older than `max_age` and forget actors left without any.
    ///
    /// Returns the number of removed (category, actor) entries.
    pub fn sweep(&self, now: Instant, max_age: Duration) -> usize {
        self.store.sweep(now, max_age) + self.unknown.sweep(now, max_age)
    }

    /// Total (category, actor) entries held, including unknown-category entries.
    pub fn len(&self) -> usize {
        self.store.len() + self.unknown.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Distinct unknown category names currently held by the fallback store.
    pub fn unknown_category_count(&self) -> usize {
        self.unknown.shard_count()
    }
}

fn format_rate_limit_message(policy: &CategoryPolicy) -> String {
    format!(
        "⏰ Please wait before making another request. Rate limit: {} requests per {} seconds.",
        policy.max_events, policy.window_seconds
    )
}
