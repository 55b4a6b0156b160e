//! Repeated-content and message-velocity detection for free-text messages.

use ahash::AHashMap;
use serde::Serialize;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::warn;

use crate::config::SpamConfig;
use crate::security::rate_limit::lock;
use crate::security::ActorId;

/// Which threshold flagged a message as spam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpamTrigger {
    /// The same content already appeared `max_repeated_messages` times in the window
    RepeatedContent,
    /// The actor already sent `max_messages_per_minute` messages in the window
    Volume,
}

impl SpamTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpamTrigger::RepeatedContent => "repeated_content",
            SpamTrigger::Volume => "volume",
        }
    }
}

/// Snapshot of spam detection activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SpamStats {
    /// Tracked actors with at least one message flagged as spam
    pub spam_detected_actors: usize,
    /// Messages flagged as spam across tracked actors
    pub total_spam_messages: u64,
}

#[derive(Debug, Default)]
struct SpamLog {
    messages: Vec<(Instant, String)>,
    flagged: u64,
}

impl SpamLog {
    fn prune(&mut self, now: Instant, window: Duration) {
        self.messages
            .retain(|(ts, _)| now.saturating_duration_since(*ts) < window);
    }
}

/// Per-actor message history with two independent spam thresholds.
///
/// Flagged messages are not recorded, like rejected rate-limited actions.
pub struct SpamDetector {
    config: SpamConfig,
    logs: Mutex<AHashMap<ActorId, SpamLog>>,
}

impl SpamDetector {
    pub fn new(config: SpamConfig) -> Self {
        Self { config, logs: Mutex::new(AHashMap::new()) }
    }

    pub fn config(&self) -> &SpamConfig {
        &self.config
    }

    /// Evaluate `content` from `actor` at `now`, recording it when it is not spam.
    pub fn check_at(&self, actor: ActorId, content: &str, now: Instant) -> Option<SpamTrigger> {
        let window = self.config.window();
        let mut logs = lock(&self.logs);
        let log = logs.entry(actor).or_default();

        log.prune(now, window);

        let repeats = log
            .messages
            .iter()
            .filter(|(_, previous)| previous == content)
            .count();

        let trigger = if repeats >= self.config.max_repeated_messages as usize {
            Some(SpamTrigger::RepeatedContent)
        } else if log.messages.len() >= self.config.max_messages_per_minute as usize {
            Some(SpamTrigger::Volume)
        } else {
            None
        };

        match trigger {
            Some(trigger) => {
                log.flagged = log.flagged.saturating_add(1);
                warn!(
                    actor = %actor,
                    trigger = trigger.as_str(),
                    recent_messages = log.messages.len(),
                    "Spam detected"
                );
            }
            None => log.messages.push((now, content.to_string())),
        }

        trigger
    }

    pub fn is_spam_at(&self, actor: ActorId, content: &str, now: Instant) -> bool {
        self.check_at(actor, content, now).is_some()
    }

    /// Returns true if `content` must be treated as spam. Non-spam messages are recorded.
    pub fn is_spam(&self, actor: ActorId, content: &str) -> bool {
        self.is_spam_at(actor, content, Instant::now())
    }

    /// User-facing notice for flagged messages.
    pub fn spam_message(&self) -> String {
        "🚫 Please slow down, you are sending messages too quickly.".to_string()
    }

    pub fn stats(&self) -> SpamStats {
        let logs = lock(&self.logs);
        logs.values()
            .filter(|log| log.flagged > 0)
            .fold(SpamStats::default(), |acc, log| SpamStats {
                spam_detected_actors: acc.spam_detected_actors + 1,
                total_spam_messages: acc.total_spam_messages.saturating_add(log.flagged),
            })
    }

    /// Actors holding at least one recorded message. Does not prune.
    pub fn tracked_actors(&self) -> usize {
        lock(&self.logs)
            .values()
            .filter(|log| !log.messages.is_empty())
            .count()
    }

    /// Drop messages older than `max_age` and forget actors left without any.
    ///
    /// Returns the number of actors removed.
    pub fn sweep(&self, now: Instant, max_age: Duration) -> usize {
        let mut logs = lock(&self.logs);
        let before = logs.len();
        logs.retain(|_, log| {
            log.prune(now, max_age);
            !log.messages.is_empty()
        });
        before.saturating_sub(logs.len())
    }

    pub fn len(&self) -> usize {
        lock(&self.logs).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
