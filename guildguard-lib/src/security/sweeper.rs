use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant as TokioInstant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::DosProtection;

/// Outcome of one maintenance sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// (category, actor) entries removed from the rate limiter
    pub rate_limit_removed: usize,
    /// Actors removed from the spam detector
    pub spam_removed: usize,
    /// (category, actor) entries still held by the rate limiter
    pub rate_limit_remaining: usize,
    /// Actors still held by the spam detector
    pub spam_remaining: usize,
}

impl SweepReport {
    pub fn removed(&self) -> usize {
        self.rate_limit_removed + self.spam_removed
    }
}

/// Spawn a task that sweeps `protection` every `period` until `cancel` fires.
///
/// The first sweep runs one full `period` after spawning. A `period` too large to schedule leaves
/// the task idle until cancelled.
pub fn spawn_sweeper(
    protection: Arc<DosProtection>,
    period: Duration,
    max_age: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let Some(start) = TokioInstant::now().checked_add(period) else {
            // A period past the clock's range never elapses.
            warn!(period_secs = period.as_secs(), "Sweep period out of range, sweeper idle");
            cancel.cancelled().await;
            return;
        };
        let mut ticker = interval_at(start, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(period_secs = period.as_secs(), max_age_secs = max_age.as_secs(), "Sweeper started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Sweeper: cancellation requested, stopping");
                    break;
                }
                _ = ticker.tick() => {
                    let report = protection.cleanup(max_age);
                    debug!(?report, "Sweep finished");
                }
            }
        }
    })
}
