#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;
    use distributed_lock::{DistributedLockError, LockManager, LockStore, MemoryLockStore, NotHeldReason};

    fn manager_over(store: &Arc<MemoryLockStore>) -> LockManager {
        LockManager::new(Arc::clone(store) as Arc<dyn LockStore>)
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_lock_cannot_release_new_holder() {
        let store = Arc::new(MemoryLockStore::new());
        let first_caller = manager_over(&store);
        let second_caller = manager_over(&store);

        let mut first = first_caller.try_acquire("res-A", Duration::from_secs(1)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(1500)).await;

        let mut second = second_caller.try_acquire("res-A", Duration::from_secs(1)).await.unwrap();
        assert_ne!(first.token(), second.token());

        let err = first.release().await.unwrap_err();
        assert!(matches!(
            err,
            DistributedLockError::LockNotHeld { reason: NotHeldReason::TokenMismatch, .. }
        ));
        assert_eq!(store.get("res-A").await.unwrap().as_deref(), Some(second.token()));

        second.release().await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_acquire_has_single_winner() {
        let store = Arc::new(MemoryLockStore::new());
        let manager = Arc::new(manager_over(&store));

        let attempts: Vec<_> = (0..16)
            .map(|_| {
                let manager = Arc::clone(&manager);
                tokio::spawn(async move { manager.try_acquire("res-B", Duration::from_secs(60)).await })
            })
            .collect();

        let mut winners = 0;
        let mut contended = 0;
        for attempt in attempts {
            match attempt.await.unwrap() {
                Ok(_) => winners += 1,
                Err(e) if e.is_contended() => contended += 1,
                Err(e) => panic!("unexpected error: {}", e),
            }
        }
        assert_eq!(winners, 1);
        assert_eq!(contended, 15);
    }

    #[tokio::test(start_paused = true)]
    async fn test_release_removes_record_exactly_once() {
        let store = Arc::new(MemoryLockStore::new());
        let manager = manager_over(&store);

        let mut lock = manager.try_acquire("res-C", Duration::from_secs(30)).await.unwrap();
        assert_eq!(manager.holder("res-C").await.unwrap().as_deref(), Some(lock.token()));

        lock.release().await.unwrap();
        assert_eq!(manager.holder("res-C").await.unwrap(), None);

        let err = lock.release().await.unwrap_err();
        assert!(err.is_not_held());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_frees_the_key() {
        let store = Arc::new(MemoryLockStore::new());
        let manager = manager_over(&store);

        let mut first = manager.try_acquire("res-D", Duration::from_secs(2)).await.unwrap();
        let contended = manager.try_acquire("res-D", Duration::from_secs(2)).await.unwrap_err();
        assert!(contended.is_contended());

        tokio::time::sleep(Duration::from_secs(2)).await;
        let second = manager.try_acquire("res-D", Duration::from_secs(2)).await.unwrap();
        assert_ne!(first.token(), second.token());

        let err = first.release().await.unwrap_err();
        assert!(err.is_not_held());
    }

    #[tokio::test(start_paused = true)]
    async fn test_release_after_expiry_reports_missing() {
        let store = Arc::new(MemoryLockStore::new());
        let manager = manager_over(&store);

        let mut lock = manager.try_acquire("res-E", Duration::from_millis(500)).await.unwrap();
        assert!(lock.is_held().await.unwrap());
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(!lock.is_held().await.unwrap());
        assert_eq!(lock.remaining_ttl().await.unwrap(), None);
        let err = lock.release().await.unwrap_err();
        assert!(matches!(err, DistributedLockError::LockNotHeld { reason: NotHeldReason::Missing, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_remaining_ttl_counts_down() {
        let store = Arc::new(MemoryLockStore::new());
        let manager = manager_over(&store);

        let lock = manager.try_acquire("res-F", Duration::from_secs(10)).await.unwrap();
        tokio::time::sleep(Duration::from_secs(4)).await;

        assert_eq!(lock.remaining_ttl().await.unwrap(), Some(Duration::from_secs(6)));
        assert_eq!(manager.remaining_ttl("res-F").await.unwrap(), Some(Duration::from_secs(6)));
        assert_eq!(lock.valid_until(), Some(lock.acquired_at() + Duration::from_secs(10)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_distinct_keys_do_not_contend() {
        let store = Arc::new(MemoryLockStore::new());
        let manager = manager_over(&store);

        let mut a = manager.try_acquire("res-G", Duration::from_secs(5)).await.unwrap();
        let mut b = manager.try_acquire("res-H", Duration::from_secs(5)).await.unwrap();
        assert_eq!(store.len(), 2);

        a.release().await.unwrap();
        b.release().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_prefixed_managers_are_isolated() {
        let store = Arc::new(MemoryLockStore::new());
        let billing = manager_over(&store).with_key_prefix("billing:");
        let reports = manager_over(&store).with_key_prefix("reports:");

        let _billing = billing.try_acquire("nightly", Duration::from_secs(5)).await.unwrap();
        let _reports = reports.try_acquire("nightly", Duration::from_secs(5)).await.unwrap();
        assert!(store.get("billing:nightly").await.unwrap().is_some());
        assert!(store.get("reports:nightly").await.unwrap().is_some());
    }
}
