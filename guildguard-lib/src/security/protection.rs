use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

use super::sweeper::SweepReport;
use super::{ActorId, Category, RateLimiter, SpamDetector, SpamStats};
use crate::config::Config;
use crate::dispatch::{DenyReason, EventCategory, GuardEvent, Verdict};
use crate::telemetry::Metrics;

/// Abuse-mitigation state for one bot process.
///
/// Owns the rate limiter and the spam detector; share it between handlers as
/// `Arc<DosProtection>`.
pub struct DosProtection {
    limiter: RateLimiter,
    spam: SpamDetector,
    metrics: Option<Arc<Metrics>>,
}

impl DosProtection {
    pub fn new(config: &Config) -> Self {
        Self::from_parts(
            RateLimiter::new(&config.rate_limits),
            SpamDetector::new(config.spam.clone()),
        )
    }

    pub fn from_parts(limiter: RateLimiter, spam: SpamDetector) -> Self {
        Self { limiter, spam, metrics: None }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn spam_detector(&self) -> &SpamDetector {
        &self.spam
    }

    pub fn is_rate_limited_at(&self, category: Category, actor: ActorId, now: Instant) -> bool {
        let limited = self.limiter.is_rate_limited_at(category, actor, now);
        if let Some(m) = &self.metrics {
            m.record_rate_limit_check(category, limited);
        }
        limited
    }

    pub fn is_rate_limited(&self, category: Category, actor: ActorId) -> bool {
        self.is_rate_limited_at(category, actor, Instant::now())
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

    pub fn rate_limit_message(&self, category: Category) -> String {
        self.limiter.rate_limit_message(category)
    }

    pub fn is_spam_at(&self, actor: ActorId, content: &str, now: Instant) -> bool {
        let trigger = self.spam.check_at(actor, content, now);
        if let Some(m) = &self.metrics {
            m.record_spam_check(trigger);
        }
        trigger.is_some()
    }

    pub fn is_spam(&self, actor: ActorId, content: &str) -> bool {
        self.is_spam_at(actor, content, Instant::now())
    }

    pub fn spam_message(&self) -> String {
        self.spam.spam_message()
    }

    /// Remove data older than `max_age` from both stores.
    pub fn cleanup_at(&self, now: Instant, max_age: Duration) -> SweepReport {
        let rate_limit_removed = self.limiter.sweep(now, max_age);
        let spam_removed = self.spam.sweep(now, max_age);
        let report = SweepReport {
            rate_limit_removed,
            spam_removed,
            rate_limit_remaining: self.limiter.len(),
            spam_remaining: self.spam.len(),
        };

        if let Some(m) = &self.metrics {
            m.record_sweep(rate_limit_removed, spam_removed);
        }
        info!(
            removed = report.removed(),
            active_entries = report.rate_limit_remaining,
            active_spam_actors = report.spam_remaining,
            max_age_secs = max_age.as_secs(),
            "Cleaned up rate limit data"
        );

        report
    }

    pub fn cleanup(&self, max_age: Duration) -> SweepReport {
        self.cleanup_at(Instant::now(), max_age)
    }

    pub fn stats(&self) -> BTreeMap<Category, usize> {
        self.limiter.stats()
    }

    pub fn spam_stats(&self) -> SpamStats {
        self.spam.stats()
    }

    /// Run the checks guarding `event` at `now`.
    ///
    /// The rate limit is checked first; message content reaches the spam detector only when the
    /// rate limit admitted it.
    pub fn evaluate_at(&self, event: &GuardEvent, now: Instant) -> Verdict {
        let actor = event.actor();

        let (label, rate_limit_notice) = match event.category() {
            EventCategory::Known(category) => (
                category.as_str().to_string(),
                self.is_rate_limited_at(category, actor, now)
                    .then(|| self.limiter.rate_limit_message(category)),
            ),
            EventCategory::Named(name) => (
                name.to_string(),
                self.limiter
                    .is_rate_limited_named_at(name, actor, now)
                    .then(|| self.limiter.rate_limit_message_named(name)),
            ),
        };

        if let Some(notice) = rate_limit_notice {
            return Verdict::denied(actor, label, DenyReason::RateLimited, notice);
        }

        if let Some(content) = event.content() {
            if self.is_spam_at(actor, content, now) {
                return Verdict::denied(actor, label, DenyReason::Spam, self.spam_message());
            }
        }

        Verdict::allowed(actor, label)
    }

    pub fn evaluate(&self, event: &GuardEvent) -> Verdict {
        self.evaluate_at(event, Instant::now())
    }
}
