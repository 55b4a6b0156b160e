//! Per-category, per-actor timestamp logs with prune-and-count semantics.

use ahash::AHashMap;
use std::collections::hash_map::Entry;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::hash::Hash;
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};
use tracing::warn;

use super::{lock, read, write};
use crate::config::CategoryPolicy;
use crate::security::ActorId;

/// Timestamps of admitted events for one (category, actor) pair.
///
/// Only admitted events are stored, so a log never holds more than `max_events` live entries.
#[derive(Debug, Default, Clone)]
pub struct WindowLog {
    timestamps: Vec<Instant>,
}

impl WindowLog {
    fn prune(&mut self, now: Instant, window: Duration) {
        self.timestamps
            .retain(|ts| now.saturating_duration_since(*ts) < window);
    }

    fn oldest(&self) -> Option<Instant> {
        self.timestamps.iter().min().copied()
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

/// Outcome of [`WindowStore::record_and_check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowDecision {
    /// The event was rejected and not recorded
    pub over_limit: bool,
    /// Live events in the window after the decision
    pub count: usize,
    /// Time until the oldest live event leaves the window
    pub reset_after: Duration,
    /// Event budget of the policy that was applied
    pub limit: u32,
}

type Shard = Arc<Mutex<AHashMap<ActorId, WindowLog>>>;

/// Sliding-window event logs keyed by category and actor.
///
/// Each category owns a shard behind its own mutex, so the prune, count and append sequence for a
/// key is atomic. Categories without a configured policy fall back to [`CategoryPolicy::FALLBACK`].
pub struct WindowStore<C> {
    policies: AHashMap<C, CategoryPolicy>,
    shards: RwLock<AHashMap<C, Shard>>,
}

impl<C> WindowStore<C>
where
    C: Eq + Hash + Clone + Display,
{
    pub fn new(policies: AHashMap<C, CategoryPolicy>) -> Self {
        Self { policies, shards: RwLock::new(AHashMap::new()) }
    }

    /// Resolve the policy for `category`, or [`CategoryPolicy::FALLBACK`] when none is configured.
    pub fn policy(&self, category: &C) -> CategoryPolicy {
        self.policies
            .get(category)
            .copied()
            .unwrap_or(CategoryPolicy::FALLBACK)
    }

    fn shard(&self, category: &C) -> Shard {
        if let Some(shard) = read(&self.shards).get(category) {
            return shard.clone();
        }
        match write(&self.shards).entry(category.clone()) {
            Entry::Occupied(entry) => entry.get().clone(),
            Entry::Vacant(entry) => {
                // Logged once per shard lifetime, not once per event.
                if !self.policies.contains_key(category) {
                    warn!(
                        category = %category,
                        window_seconds = CategoryPolicy::FALLBACK.window_seconds,
                        max_events = CategoryPolicy::FALLBACK.max_events,
                        "No policy configured for category, applying fallback"
                    );
                }
                entry.insert(Shard::default()).clone()
            }
        }
    }

    /// Prune the log for (`category`, `actor`) and record `now` unless the limit is already reached.
    ///
    /// A rejected event is not recorded, so repeated rejections never push the reset further out.
    pub fn record_and_check(&self, category: &C, actor: ActorId, now: Instant) -> WindowDecision {
        let policy = self.policy(category);
        let window = policy.window();
        let shard = self.shard(category);
        let mut logs = lock(&shard);
        let log = logs.entry(actor).or_default();

        log.prune(now, window);

        let over_limit = log.len() >= policy.max_events as usize;
        if !over_limit {
            log.timestamps.push(now);
        }

        let reset_after = log
            .oldest()
            .map(|oldest| window.saturating_sub(now.saturating_duration_since(oldest)))
            .unwrap_or_default();

        WindowDecision { over_limit, count: log.len(), reset_after, limit: policy.max_events }
    }

    /// Number of actors holding at least one timestamp in `category`. Does not prune.
    pub fn tracked_actors(&self, category: &C) -> usize {
        let shard = read(&self.shards).get(category).cloned();
        shard
            .map(|shard| lock(&shard).values().filter(|log| !log.is_empty()).count())
            .unwrap_or(0)
    }

    /// Drop timestamps older than `max_age`, remove logs left empty, then drop empty shards.
    ///
    /// Returns the number of (category, actor) entries removed.
    pub fn sweep(&self, now: Instant, max_age: Duration) -> usize {
        let shards: Vec<Shard> = read(&self.shards).values().cloned().collect();
        let removed: usize = shards
            .iter()
            .map(|shard| {
                let mut logs = lock(shard);
                let before = logs.len();
                logs.retain(|_, log| {
                    log.prune(now, max_age);
                    !log.is_empty()
                });
                before.saturating_sub(logs.len())
            })
            .sum();
        drop(shards);

        // Clones are only handed out under the map lock, so a strong count of 1 means no caller
        // is between `shard()` and its insert.
        write(&self.shards)
            .retain(|_, shard| Arc::strong_count(shard) > 1 || !lock(shard).is_empty());

        removed
    }

    /// Number of categories currently holding a shard.
    pub fn shard_count(&self) -> usize {
        read(&self.shards).len()
    }

    /// Total number of (category, actor) entries, empty or not.
    pub fn len(&self) -> usize {
        let shards: Vec<Shard> = read(&self.shards).values().cloned().collect();
        shards.iter().map(|shard| lock(shard).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<C> WindowStore<C>
where
    C: Eq + Hash + Clone + Display + Ord,
{
    /// Tracked actors per category that has seen at least one event.
    pub fn stats(&self) -> BTreeMap<C, usize> {
        let categories: Vec<C> = read(&self.shards).keys().cloned().collect();
        categories
            .into_iter()
            .map(|category| {
                let count = self.tracked_actors(&category);
                (category, count)
            })
            .collect()
    }
}
