pub mod category;
pub mod protection;
pub mod rate_limit;
pub mod spam;
pub mod sweeper;

pub use category::{ActorId, Category};
pub use protection::DosProtection;
pub use rate_limit::{RateLimitResult, RateLimiter};
pub use spam::{SpamDetector, SpamStats, SpamTrigger};
pub use sweeper::{spawn_sweeper, SweepReport};
