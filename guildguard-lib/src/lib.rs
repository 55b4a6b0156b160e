#![forbid(unsafe_code)]

pub mod config;
pub mod dispatch;
pub mod error;
pub mod security;
pub mod telemetry;

pub use config::{load_from_path, CategoryPolicy, Config};
pub use dispatch::{parse_event, DenyReason, GuardEvent, Verdict};
pub use error::{GuardError, Result};
pub use security::{
    spawn_sweeper, ActorId, Category, DosProtection, RateLimitResult, RateLimiter, SpamDetector,
    SpamStats, SweepReport,
};
