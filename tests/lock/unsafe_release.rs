//! The GET-then-DEL release race, reproduced deterministically.
//!
//! `ExpiresAfterGet` lets the holder's record expire and a second owner
//! acquire the key in the gap between the read and the delete.

use kvlock::{InMemoryStore, KeyValueStore, LockKey, LockManager, LockToken};

use crate::support::{ExpiresAfterGet, TTL};

#[test]
fn non_atomic_release_deletes_the_next_owners_lock() {
    let store = ExpiresAfterGet::new(InMemoryStore::new(), "intruder");
    let locks = LockManager::new(&store);
    let key = LockKey::new("X").unwrap();
    let mine = LockToken::new("mine");

    assert!(locks.acquire(&key, &mine, TTL).unwrap());
    store.arm();

    // Our GET saw our own token, so the DEL goes ahead...
    assert!(locks.release_non_atomic(&key, &mine).unwrap());

    // ...and it removed the intruder's perfectly valid lock.
    assert_eq!(store.inner.get("lock:X").unwrap(), None);
    assert!(locks.acquire(&key, &LockToken::new("third"), TTL).unwrap());
}

#[test]
fn scripted_release_leaves_the_next_owners_lock_alone() {
    let store = ExpiresAfterGet::new(InMemoryStore::new(), "intruder");
    let locks = LockManager::new(&store);
    let key = LockKey::new("X").unwrap();
    let mine = LockToken::new("mine");

    assert!(locks.acquire(&key, &mine, TTL).unwrap());

    // Same interleaving, but applied before the script runs: the script
    // compares and deletes as one unit, so there is no gap to exploit.
    store.arm();
    let _ = store.get("lock:X").unwrap();

    assert!(!locks.release(&key, &mine).unwrap());
    assert_eq!(
        store.inner.get("lock:X").unwrap().as_deref(),
        Some("intruder")
    );
    assert!(!locks.acquire(&key, &LockToken::new("third"), TTL).unwrap());
}
