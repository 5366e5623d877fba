//! Protocol checks against a real Redis server.
//!
//! Runs only when `REDIS_URL` is set, e.g.
//! `REDIS_URL=redis://127.0.0.1:6379/ cargo test --features redis`.

use std::time::Duration;

use kvlock::{
    AcquireMode, GuardedInvocation, LockConfig, LockKey, LockManager, LockToken,
    RedisStore, RedisStoreConfig,
};

fn manager(mode: AcquireMode) -> Option<LockManager<RedisStore>> {
    std::env::var("REDIS_URL").ok()?;
    let config = RedisStoreConfig::from_env().unwrap();
    let store = RedisStore::open(config).unwrap();
    let prefix = format!("kvlock-test:{}:", LockToken::generate());
    Some(LockManager::with_config(
        store,
        LockConfig::default()
            .with_key_prefix(prefix)
            .with_acquire_mode(mode),
    ))
}

#[test]
fn set_if_absent_then_scripted_release() {
    let Some(locks) = manager(AcquireMode::SetIfAbsent) else {
        return;
    };
    let key = LockKey::new("X").unwrap();
    let (t1, t2) = (LockToken::generate(), LockToken::generate());

    assert!(locks.acquire(&key, &t1, Duration::from_secs(5)).unwrap());
    assert!(!locks.acquire(&key, &t2, Duration::from_secs(5)).unwrap());
    assert!(!locks.release(&key, &t2).unwrap());
    assert!(locks.release(&key, &t1).unwrap());
    assert!(locks.acquire(&key, &t2, Duration::from_secs(5)).unwrap());
    assert!(locks.release(&key, &t2).unwrap());
}

#[test]
fn scripted_acquire_sets_expiry() {
    let Some(locks) = manager(AcquireMode::Script) else {
        return;
    };
    let handle = locks.try_lock("X", Duration::from_secs(5)).unwrap().unwrap();

    let left = locks.remaining_ttl("X").unwrap().unwrap();
    assert!(left <= Duration::from_secs(5) && left > Duration::ZERO);
    assert!(locks.try_lock("X", Duration::from_secs(5)).unwrap().is_none());
    assert!(locks.unlock(handle).unwrap());
}

#[test]
fn ttl_expiry_frees_the_key() {
    let Some(locks) = manager(AcquireMode::SetIfAbsent) else {
        return;
    };
    let _abandoned = locks.try_lock("X", Duration::from_millis(100)).unwrap().unwrap();
    std::thread::sleep(Duration::from_millis(250));
    assert!(locks.try_lock("X", Duration::from_secs(5)).unwrap().is_some());
}

#[test]
fn guarded_call_releases() {
    let Some(locks) = manager(AcquireMode::SetIfAbsent) else {
        return;
    };
    let guarded = GuardedInvocation::new(locks);
    let outcome = guarded
        .run("X", Duration::from_secs(5), || Err::<(), _>("failed"))
        .unwrap_err();
    assert!(outcome.release_outcome().unwrap().is_released());
    assert!(!guarded.manager().is_locked("X").unwrap());
}
