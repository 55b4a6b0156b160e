use guildguard_lib::config::SpamConfig;
use guildguard_lib::security::{ActorId, SpamDetector, SpamStats, SpamTrigger};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn detector() -> SpamDetector {
    SpamDetector::new(SpamConfig::default())
}

#[test]
fn test_fourth_identical_message_is_spam() {
    let detector = detector();
    let actor = ActorId(1);
    let t0 = Instant::now();

    for i in 0..3 {
        assert!(!detector.is_spam_at(actor, "buy gold", t0), "copy {i} should be recorded");
    }
    assert_eq!(
        detector.check_at(actor, "buy gold", t0),
        Some(SpamTrigger::RepeatedContent)
    );
}

#[test]
fn test_two_identical_and_one_different_is_not_spam() {
    let detector = detector();
    let actor = ActorId(2);
    let t0 = Instant::now();

    assert!(!detector.is_spam_at(actor, "hello", t0));
    assert!(!detector.is_spam_at(actor, "hello", t0));
    assert!(!detector.is_spam_at(actor, "how are you", t0));
    assert_eq!(detector.stats(), SpamStats::default());
}

#[test]
fn test_volume_trigger() {
    let detector = detector();
    let actor = ActorId(3);
    let t0 = Instant::now();

    for i in 0..10 {
        assert!(!detector.is_spam_at(actor, &format!("message {i}"), t0));
    }
    assert_eq!(
        detector.check_at(actor, "message 10", t0),
        Some(SpamTrigger::Volume)
    );
}

#[test]
fn test_history_expires_after_window() {
    let detector = detector();
    let actor = ActorId(4);
    let t0 = Instant::now();

    for _ in 0..3 {
        detector.is_spam_at(actor, "again", t0);
    }
    assert!(detector.is_spam_at(actor, "again", t0 + Duration::from_secs(59)));
    assert!(!detector.is_spam_at(actor, "again", t0 + Duration::from_secs(60)));
}

#[test]
fn test_flagged_messages_are_not_recorded() {
    let detector = detector();
    let actor = ActorId(5);
    let t0 = Instant::now();

    for i in 0..10 {
        detector.is_spam_at(actor, &format!("m{i}"), t0);
    }
    // Rejected sends at t=30 must not keep the actor flagged once the first batch expires.
    for _ in 0..5 {
        assert!(detector.is_spam_at(actor, "late", t0 + Duration::from_secs(30)));
    }
    assert!(!detector.is_spam_at(actor, "late", t0 + Duration::from_secs(60)));
}

#[test]
fn test_actors_are_independent() {
    let detector = detector();
    let t0 = Instant::now();

    for _ in 0..3 {
        detector.is_spam_at(ActorId(6), "same", t0);
    }
    assert!(detector.is_spam_at(ActorId(6), "same", t0));
    assert!(!detector.is_spam_at(ActorId(7), "same", t0));
}

#[test]
fn test_stats_count_flagged_actors_and_messages() {
    let detector = detector();
    let t0 = Instant::now();

    for _ in 0..5 {
        detector.is_spam_at(ActorId(8), "x", t0);
    }
    for _ in 0..4 {
        detector.is_spam_at(ActorId(9), "y", t0);
    }
    detector.is_spam_at(ActorId(10), "z", t0);

    assert_eq!(
        detector.stats(),
        SpamStats { spam_detected_actors: 2, total_spam_messages: 3 }
    );
    assert_eq!(detector.tracked_actors(), 3);
}

#[test]
fn test_sweep_forgets_idle_actors() {
    let detector = detector();
    let t0 = Instant::now();

    detector.is_spam_at(ActorId(11), "old", t0);
    detector.is_spam_at(ActorId(12), "new", t0 + Duration::from_secs(7200));

    let removed = detector.sweep(t0 + Duration::from_secs(7200), Duration::from_secs(3600));
    assert_eq!(removed, 1);
    assert_eq!(detector.len(), 1);
}

#[test]
fn test_spam_message() {
    assert_eq!(
        detector().spam_message(),
        "🚫 Please slow down, you are sending messages too quickly."
    );
}

#[test]
fn test_concurrent_checks_never_exceed_volume() {
    let detector = Arc::new(detector());
    let limit = detector.config().max_messages_per_minute as usize;
    let now = Instant::now();

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let detector = detector.clone();
            thread::spawn(move || {
                (0..20)
                    .filter(|i| {
                        detector
                            .check_at(ActorId(99), &format!("worker {worker} message {i}"), now)
                            .is_none()
                    })
                    .count()
            })
        })
        .collect();

    let admitted: usize = handles
        .into_iter()
        .map(|h| h.join().unwrap_or_else(|_| panic!("worker thread panicked")))
        .sum();

    assert_eq!(admitted, limit);
    assert_eq!(detector.tracked_actors(), 1);
    assert_eq!(
        detector.stats(),
        SpamStats { spam_detected_actors: 1, total_spam_messages: (8 * 20 - limit) as u64 }
    );
    // History stays capped: every further distinct message trips the volume trigger.
    assert_eq!(detector.check_at(ActorId(99), "one more", now), Some(SpamTrigger::Volume));
}
