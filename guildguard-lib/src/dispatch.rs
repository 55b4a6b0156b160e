//! Bot events and the verdicts returned before the guarded action runs.
//!
//! Events arrive as JSON objects tagged by `kind`:
//!
//! ```json
//! {"kind": "message", "actor": 42, "content": "hello"}
//! {"kind": "command", "actor": 42, "name": "listroles"}
//! {"kind": "city_selection", "actor": 42}
//! {"kind": "role_update", "actor": 42}
//! {"kind": "combo_role_update", "actor": 42}
//! {"kind": "action", "actor": 42, "category": "role_updates"}
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{GuardError, Result};
use crate::security::{ActorId, Category};

/// An event that precedes a guarded action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GuardEvent {
    /// Free-text message; checked against the command budget and the spam detector
    Message { actor: ActorId, content: String },
    /// Bot command invocation
    Command { actor: ActorId, name: String },
    /// City pick in the selection channel
    CitySelection { actor: ActorId },
    /// Role assigned or removed
    RoleUpdate { actor: ActorId },
    /// Combined country/city role recomputed
    ComboRoleUpdate { actor: ActorId },
    /// Any guarded action identified by category name
    Action { actor: ActorId, category: String },
}

/// Target of an event's rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventCategory<'a> {
    Known(Category),
    Named(&'a str),
}

impl GuardEvent {
    pub fn actor(&self) -> ActorId {
        match self {
            GuardEvent::Message { actor, .. }
            | GuardEvent::Command { actor, .. }
            | GuardEvent::CitySelection { actor }
            | GuardEvent::RoleUpdate { actor }
            | GuardEvent::ComboRoleUpdate { actor }
            | GuardEvent::Action { actor, .. } => *actor,
        }
    }

    pub fn category(&self) -> EventCategory<'_> {
        match self {
            GuardEvent::Message { .. } | GuardEvent::Command { .. } => {
                EventCategory::Known(Category::Commands)
            }
            GuardEvent::CitySelection { .. } => EventCategory::Known(Category::CitySelection),
            GuardEvent::RoleUpdate { .. } => EventCategory::Known(Category::RoleUpdates),
            GuardEvent::ComboRoleUpdate { .. } => {
                EventCategory::Known(Category::ComboRoleUpdates)
            }
            GuardEvent::Action { category, .. } => match category.parse::<Category>() {
                Ok(known) => EventCategory::Known(known),
                Err(_) => EventCategory::Named(category),
            },
        }
    }

    /// Message text subject to spam detection, if any.
    pub fn content(&self) -> Option<&str> {
        match self {
            GuardEvent::Message { content, .. } => Some(content.as_str()),
            _ => None,
        }
    }
}

/// Parse one JSON-encoded event.
pub fn parse_event(line: &str) -> Result<GuardEvent> {
    serde_json::from_str(line).map_err(|e| GuardError::Event(e.to_string()))
}

/// Why an event was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    RateLimited,
    Spam,
}

/// Decision for one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub actor: ActorId,
    pub category: String,
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<DenyReason>,
    /// Notice to show the actor when denied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

impl Verdict {
    pub fn allowed(actor: ActorId, category: impl Into<String>) -> Self {
        Self { actor, category: category.into(), allowed: true, reason: None, notice: None }
    }

    pub fn denied(
        actor: ActorId,
        category: impl Into<String>,
        reason: DenyReason,
        notice: String,
    ) -> Self {
        Self {
            actor,
            category: category.into(),
            allowed: false,
            reason: Some(reason),
            notice: Some(notice),
        }
    }
}
