//! Per-actor, per-category rate limiting.
//!
//! Every category carries a [`CategoryPolicy`](crate::config::CategoryPolicy): a window length and
//! an event budget. Admitted events are logged with their timestamp; a new event is admitted while
//! fewer than `max_events` logged events are younger than the window.
//!
//! # Architecture
//!
//! 1. **WindowStore** (`window.rs`): timestamp logs keyed by (category, actor), pruned lazily on
//!    access and swept explicitly for cold keys.
//!
//! 2. **RateLimiter** (`limiter.rs`): binds the store to the category catalog, produces
//!    [`RateLimitResult`]s and the user-facing wait message.
//!
//! # Rejections are not recorded
//!
//! A denied event leaves the log untouched. An actor pinned at the limit is admitted again as soon
//! as its oldest admitted event ages out, however many attempts were denied in between.
//!
//! # Example Usage
//!
//! ```ignore
//! use guildguard_lib::config::RateLimitsConfig;
//! use guildguard_lib::security::{ActorId, Category, RateLimiter};
//!
//! let limiter = RateLimiter::new(&RateLimitsConfig::default());
//!
//! if limiter.is_rate_limited(Category::Commands, ActorId(42)) {
//!     println!("{}", limiter.rate_limit_message(Category::Commands));
//! }
//! ```
//!
//! # Configuration
//!
//! ```toml
//! [rate_limits.commands]
//! window_seconds = 30
//! max_events = 3
//! ```

mod limiter;
mod window;

pub use limiter::{RateLimitResult, RateLimiter};
pub use window::{WindowDecision, WindowLog, WindowStore};

use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::warn;

// Logs hold plain timestamps, so a panic mid-update cannot leave them inconsistent.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        warn!("Rate limit lock poisoned, recovering");
        poisoned.into_inner()
    })
}

pub(crate) fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| {
        warn!("Rate limit lock poisoned, recovering");
        poisoned.into_inner()
    })
}

pub(crate) fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| {
        warn!("Rate limit lock poisoned, recovering");
        poisoned.into_inner()
    })
}
