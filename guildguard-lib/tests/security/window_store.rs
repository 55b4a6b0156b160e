use ahash::AHashMap;
use guildguard_lib::config::CategoryPolicy;
use guildguard_lib::security::rate_limit::WindowStore;
use guildguard_lib::security::{ActorId, Category};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn store_with(category: Category, window_seconds: u64, max_events: u32) -> WindowStore<Category> {
    let mut policies = AHashMap::new();
    policies.insert(category, CategoryPolicy::new(window_seconds, max_events));
    WindowStore::new(policies)
}

#[test]
fn test_window_boundary() {
    let store = store_with(Category::Commands, 30, 3);
    let actor = ActorId(1);
    let t0 = Instant::now();

    for i in 0..3 {
        let decision = store.record_and_check(&Category::Commands, actor, t0);
        assert!(!decision.over_limit, "event {i} at t=0 should be admitted");
    }

    let decision = store.record_and_check(&Category::Commands, actor, t0 + Duration::from_secs(1));
    assert!(decision.over_limit, "4th event at t=1 should be rejected");
    assert_eq!(decision.count, 3);

    let decision = store.record_and_check(&Category::Commands, actor, t0 + Duration::from_secs(31));
    assert!(!decision.over_limit, "event at t=31 should be admitted");
    assert_eq!(decision.count, 1);
}

#[test]
fn test_entry_at_exact_window_age_is_pruned() {
    let store = store_with(Category::RoleUpdates, 10, 1);
    let actor = ActorId(1);
    let t0 = Instant::now();

    assert!(!store.record_and_check(&Category::RoleUpdates, actor, t0).over_limit);
    assert!(
        store
            .record_and_check(&Category::RoleUpdates, actor, t0 + Duration::from_millis(9_999))
            .over_limit
    );
    assert!(
        !store
            .record_and_check(&Category::RoleUpdates, actor, t0 + Duration::from_secs(10))
            .over_limit
    );
}

#[test]
fn test_rejections_do_not_extend_reset() {
    let store = store_with(Category::RoleUpdates, 10, 2);
    let actor = ActorId(9);
    let t0 = Instant::now();

    store.record_and_check(&Category::RoleUpdates, actor, t0);
    store.record_and_check(&Category::RoleUpdates, actor, t0 + Duration::from_secs(5));

    // Hammer the key while limited; none of these may be recorded.
    for secs in 6..10 {
        let decision =
            store.record_and_check(&Category::RoleUpdates, actor, t0 + Duration::from_secs(secs));
        assert!(decision.over_limit, "event at t={secs} should be rejected");
        assert_eq!(decision.count, 2);
        assert_eq!(decision.reset_after, Duration::from_secs(10 - secs));
    }

    let decision =
        store.record_and_check(&Category::RoleUpdates, actor, t0 + Duration::from_secs(10));
    assert!(!decision.over_limit, "oldest admitted event left the window");
    assert_eq!(decision.count, 2);
}

#[test]
fn test_unconfigured_category_uses_fallback() {
    let store = store_with(Category::Commands, 30, 3);
    let actor = ActorId(4);
    let t0 = Instant::now();

    assert_eq!(store.policy(&Category::CitySelection), CategoryPolicy::FALLBACK);

    for _ in 0..CategoryPolicy::FALLBACK.max_events {
        assert!(!store.record_and_check(&Category::CitySelection, actor, t0).over_limit);
    }
    let decision = store.record_and_check(&Category::CitySelection, actor, t0);
    assert!(decision.over_limit);
    assert_eq!(decision.limit, CategoryPolicy::FALLBACK.max_events);
}

#[test]
fn test_sweep_removes_stale_entries_only() {
    let store = store_with(Category::Commands, 30, 3);
    let t0 = Instant::now();

    store.record_and_check(&Category::Commands, ActorId(1), t0);
    store.record_and_check(&Category::Commands, ActorId(2), t0 + Duration::from_secs(100));

    let removed = store.sweep(t0 + Duration::from_secs(120), Duration::from_secs(60));
    assert_eq!(removed, 1);
    assert_eq!(store.len(), 1);
    assert_eq!(store.tracked_actors(&Category::Commands), 1);
}

#[test]
fn test_concurrent_admission_never_exceeds_limit() {
    let max_events = 5;
    let store = Arc::new(store_with(Category::Commands, 60, max_events));
    let now = Instant::now();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = store.clone();
            thread::spawn(move || {
                (0..50)
                    .filter(|_| {
                        !store
                            .record_and_check(&Category::Commands, ActorId(77), now)
                            .over_limit
                    })
                    .count()
            })
        })
        .collect();

    let admitted: usize = handles
        .into_iter()
        .map(|h| h.join().unwrap_or_else(|_| panic!("worker thread panicked")))
        .sum();

    assert_eq!(admitted, max_events as usize);
}
