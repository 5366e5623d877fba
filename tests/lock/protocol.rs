//! Acquire/release protocol between independent processes.

use std::thread;
use std::time::Duration;

use kvlock::{
    AcquireMode, InMemoryStore, KeyValueStore, LockConfig, LockError, LockKey, LockManager,
    LockToken, StoreError,
};

use crate::support::{process, FlakyStore, TTL};

fn key(name: &str) -> LockKey {
    LockKey::new(name).unwrap()
}

// ============================================================================
// Test 1: A held lock is busy for every other token
// ============================================================================

#[test]
fn second_acquirer_is_busy_while_ttl_is_live() {
    let store = InMemoryStore::new();
    let a = process(&store);
    let b = process(&store);

    assert!(a.acquire(&key("X"), &LockToken::new("t1"), TTL).unwrap());
    assert!(!b.acquire(&key("X"), &LockToken::new("t2"), TTL).unwrap());
    assert!(!b
        .acquire_scripted(&key("X"), &LockToken::new("t2"), TTL)
        .unwrap());
}

// ============================================================================
// Test 2: Matching release frees the key for the next owner
// ============================================================================

#[test]
fn matching_release_lets_next_acquire_succeed() {
    let store = InMemoryStore::new();
    let a = process(&store);
    let b = process(&store);
    let t = LockToken::generate();

    assert!(a.acquire(&key("X"), &t, TTL).unwrap());
    assert!(a.release(&key("X"), &t).unwrap());
    assert!(b.acquire(&key("X"), &LockToken::generate(), TTL).unwrap());
}

// ============================================================================
// Test 3: Wrong-token release never touches the holder's record
// ============================================================================

#[test]
fn wrong_token_release_is_false_and_harmless() {
    let store = InMemoryStore::new();
    let holder = process(&store);
    let other = process(&store);

    assert!(holder.acquire(&key("X"), &LockToken::new("real"), TTL).unwrap());
    assert!(!other.release(&key("X"), &LockToken::new("wrong")).unwrap());

    assert!(!other.acquire(&key("X"), &LockToken::new("third"), TTL).unwrap());
    assert_eq!(store.get("lock:X").unwrap().as_deref(), Some("real"));
}

// ============================================================================
// Test 4: TTL expiry is the safety net for a crashed holder
// ============================================================================

#[test]
fn expired_lock_can_be_taken_without_release() {
    let store = InMemoryStore::new();
    let crashed = process(&store);
    let survivor = process(&store);

    assert!(crashed
        .acquire(&key("X"), &LockToken::new("t1"), Duration::from_millis(50))
        .unwrap());
    drop(crashed);

    thread::sleep(Duration::from_millis(80));
    assert!(survivor.acquire(&key("X"), &LockToken::new("t2"), TTL).unwrap());
}

#[test]
fn scripted_acquire_expires_too() {
    let locks = LockManager::with_config(
        InMemoryStore::new(),
        LockConfig::default().with_acquire_mode(AcquireMode::Script),
    );
    let _abandoned = locks.try_lock("X", Duration::from_millis(50)).unwrap().unwrap();

    thread::sleep(Duration::from_millis(80));
    assert!(locks.try_lock("X", TTL).unwrap().is_some());
}

// ============================================================================
// Test 5: Store failures are not contention
// ============================================================================

#[test]
fn store_failure_is_distinct_from_busy() {
    let store = FlakyStore::new();
    store.fail_writes(true);
    store.fail_scripts(true);
    let locks = LockManager::new(&store);

    let err = locks
        .acquire(&key("X"), &LockToken::new("t1"), TTL)
        .unwrap_err();
    assert_eq!(
        err,
        LockError::Store(StoreError::Connection("connection refused".into()))
    );
    assert!(locks
        .acquire_scripted(&key("X"), &LockToken::new("t1"), TTL)
        .unwrap_err()
        .is_store_unavailable());
    assert!(locks
        .release(&key("X"), &LockToken::new("t1"))
        .unwrap_err()
        .is_store_unavailable());
}

#[test]
fn store_recovers_after_failure() {
    let store = FlakyStore::new();
    let locks = LockManager::new(&store);

    store.fail_writes(true);
    assert!(locks.try_lock("X", TTL).is_err());

    store.fail_writes(false);
    let handle = locks.try_lock("X", TTL).unwrap().unwrap();
    assert!(locks.unlock(handle).unwrap());
}
