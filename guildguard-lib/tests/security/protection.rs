use guildguard_lib::config::Config;
use guildguard_lib::security::{ActorId, Category, DosProtection, SpamStats, SweepReport};
use std::time::{Duration, Instant};

#[test]
fn test_facade_checks_and_messages() {
    let protection = DosProtection::new(&Config::default());
    let actor = ActorId(1);

    for _ in 0..5 {
        assert!(!protection.is_city_selection_rate_limited(actor));
    }
    assert!(protection.is_city_selection_rate_limited(actor));
    assert_eq!(
        protection.rate_limit_message(Category::CitySelection),
        "⏰ Please wait before making another request. Rate limit: 5 requests per 60 seconds."
    );
}

#[test]
fn test_cleanup_removes_stale_actor_from_stats() {
    let protection = DosProtection::new(&Config::default());
    let x = ActorId(42);
    let t0 = Instant::now();

    protection.is_rate_limited_at(Category::Commands, x, t0);
    protection.is_spam_at(x, "hi", t0);
    assert_eq!(protection.stats().get(&Category::Commands), Some(&1));

    let report = protection.cleanup_at(t0 + Duration::from_secs(120), Duration::from_secs(60));
    assert_eq!(
        report,
        SweepReport {
            rate_limit_removed: 1,
            spam_removed: 1,
            rate_limit_remaining: 0,
            spam_remaining: 0,
        }
    );
    assert_eq!(report.removed(), 2);
    assert_eq!(protection.stats().get(&Category::Commands), None);
}

#[test]
fn test_cleanup_keeps_recent_activity() {
    let protection = DosProtection::new(&Config::default());
    let t0 = Instant::now();

    protection.is_rate_limited_at(Category::RoleUpdates, ActorId(1), t0);
    protection.is_rate_limited_at(Category::RoleUpdates, ActorId(2), t0 + Duration::from_secs(90));

    let report = protection.cleanup_at(t0 + Duration::from_secs(100), Duration::from_secs(60));
    assert_eq!(report.rate_limit_removed, 1);
    assert_eq!(report.rate_limit_remaining, 1);
    assert_eq!(protection.stats().get(&Category::RoleUpdates), Some(&1));
}

#[test]
fn test_spam_stats_reset_when_actor_is_swept() {
    let protection = DosProtection::new(&Config::default());
    let t0 = Instant::now();

    for _ in 0..4 {
        protection.is_spam_at(ActorId(3), "again", t0);
    }
    assert_eq!(
        protection.spam_stats(),
        SpamStats { spam_detected_actors: 1, total_spam_messages: 1 }
    );

    protection.cleanup_at(t0 + Duration::from_secs(7200), Duration::from_secs(3600));
    assert_eq!(protection.spam_stats(), SpamStats::default());
}
