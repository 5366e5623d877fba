//! Concurrent acquire storms against one key.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use kvlock::{AcquireMode, InMemoryStore, LockConfig, LockKey, LockManager, LockToken};

use crate::support::{process, TTL};

fn storm(mode: AcquireMode) -> (usize, usize) {
    const THREADS: usize = 16;
    const ROUNDS: usize = 50;

    let store = InMemoryStore::new();
    let holders = Arc::new(AtomicUsize::new(0));
    let max_holders = Arc::new(AtomicUsize::new(0));
    let wins = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let locks = LockManager::with_config(
                store.clone(),
                LockConfig::default().with_acquire_mode(mode),
            );
            let holders = Arc::clone(&holders);
            let max_holders = Arc::clone(&max_holders);
            let wins = Arc::clone(&wins);
            let barrier = Arc::clone(&barrier);

            thread::spawn(move || {
                barrier.wait();
                for _ in 0..ROUNDS {
                    if let Some(handle) = locks.try_lock("storm", TTL).unwrap() {
                        let now = holders.fetch_add(1, Ordering::SeqCst) + 1;
                        max_holders.fetch_max(now, Ordering::SeqCst);
                        wins.fetch_add(1, Ordering::SeqCst);
                        thread::sleep(Duration::from_micros(200));
                        holders.fetch_sub(1, Ordering::SeqCst);
                        assert!(locks.unlock(handle).unwrap());
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    (
        max_holders.load(Ordering::SeqCst),
        wins.load(Ordering::SeqCst),
    )
}

// ============================================================================
// Test 1: At most one holder at any instant
// ============================================================================

#[test]
fn set_if_absent_storm_never_has_two_holders() {
    let (max_holders, wins) = storm(AcquireMode::SetIfAbsent);
    assert_eq!(max_holders, 1);
    assert!(wins > 0);
}

#[test]
fn scripted_storm_never_has_two_holders() {
    let (max_holders, wins) = storm(AcquireMode::Script);
    assert_eq!(max_holders, 1);
    assert!(wins > 0);
}

// ============================================================================
// Test 2: Same-instant race on "X" has exactly one winner
// ============================================================================

#[test]
fn two_callers_race_then_loser_retries() {
    let store = InMemoryStore::new();
    let barrier = Arc::new(Barrier::new(2));

    let racers: Vec<_> = ["tA", "tB"]
        .into_iter()
        .map(|token| {
            let locks = process(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let key = LockKey::new("X").unwrap();
                let token = LockToken::new(token);
                barrier.wait();
                let won = locks
                    .acquire(&key, &token, Duration::from_secs(5))
                    .unwrap();
                (token, won)
            })
        })
        .collect();

    let results: Vec<(LockToken, bool)> = racers.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results.iter().filter(|(_, won)| *won).count(), 1);

    let key = LockKey::new("X").unwrap();
    let locks = process(&store);
    let (winner, _) = results.iter().find(|(_, won)| *won).unwrap();
    let (loser, _) = results.iter().find(|(_, won)| !*won).unwrap();

    assert!(!locks.acquire(&key, loser, Duration::from_secs(5)).unwrap());
    assert!(locks.release(&key, winner).unwrap());
    assert!(locks.acquire(&key, loser, Duration::from_secs(5)).unwrap());
}

// ============================================================================
// Test 3: Threads in one process get no special treatment
// ============================================================================

#[test]
fn shared_manager_across_threads_still_excludes() {
    let locks = Arc::new(LockManager::new(InMemoryStore::new()));
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let locks = Arc::clone(&locks);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                locks.try_lock("shared", TTL).unwrap()
            })
        })
        .collect();

    let acquired: Vec<_> = handles
        .into_iter()
        .filter_map(|h| h.join().unwrap())
        .collect();
    assert_eq!(acquired.len(), 1);
}
