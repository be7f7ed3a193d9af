use std::{
    collections::HashMap,
    sync::Mutex,
    time::{Duration, Instant},
};

/// How long an admitted event identifier keeps suppressing redeliveries.
pub const RETENTION: Duration = Duration::from_secs(600);

/// Process-wide record of recently admitted event identifiers.
///
/// Slack retries deliveries it considers unacknowledged; the same
/// `client_msg_id` may arrive several times within a few seconds. The first
/// sighting is admitted, later ones inside the retention window are reported
/// as duplicates.
pub struct DedupStore {
    entries: Mutex<HashMap<String, Instant>>,
    retention: Duration,
}

impl DedupStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_retention(RETENTION)
    }

    #[must_use]
    pub fn with_retention(retention: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            retention,
        }
    }

    /// Returns `true` when `id` was already admitted within the retention
    /// window. Otherwise records it and returns `false`.
    ///
    /// Absent or empty identifiers are never duplicates and leave no trace.
    pub fn check_and_admit(&self, id: Option<&str>) -> bool {
        self.check_and_admit_at(id, Instant::now())
    }

    pub fn check_and_admit_at(&self, id: Option<&str>, now: Instant) -> bool {
        let Some(id) = id.filter(|id| !id.is_empty()) else {
            return false;
        };

        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Self::sweep_locked(&mut entries, self.retention, now);

        if entries.contains_key(id) {
            return true;
        }
        entries.insert(id.to_string(), now);
        false
    }

    /// Drop every entry older than the retention window.
    pub fn sweep(&self, now: Instant) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Self::sweep_locked(&mut entries, self.retention, now);
    }

    fn sweep_locked(entries: &mut HashMap<String, Instant>, retention: Duration, now: Instant) {
        entries.retain(|_, admitted_at| now.saturating_duration_since(*admitted_at) <= retention);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for DedupStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {
        super::*,
        std::sync::{Arc, Barrier},
    };

    #[test]
    fn second_sighting_is_duplicate() {
        let store = DedupStore::new();
        assert!(!store.check_and_admit(Some("abc")));
        assert!(store.check_and_admit(Some("abc")));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn distinct_ids_are_independent() {
        let store = DedupStore::new();
        assert!(!store.check_and_admit(Some("a")));
        assert!(!store.check_and_admit(Some("b")));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn missing_or_empty_ids_never_duplicate() {
        let store = DedupStore::new();
        for _ in 0..3 {
            assert!(!store.check_and_admit(None));
            assert!(!store.check_and_admit(Some("")));
        }
        assert!(store.is_empty());
    }

    #[test]
    fn concurrent_sightings_admit_exactly_one() {
        const THREADS: usize = 16;
        let store = Arc::new(DedupStore::new());
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let store = Arc::clone(&store);
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    store.check_and_admit(Some("same-id"))
                })
            })
            .collect();

        let admitted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|duplicate| !duplicate)
            .count();
        assert_eq!(admitted, 1);
    }

    #[test]
    fn entries_expire_after_retention() {
        let store = DedupStore::new();
        let t0 = Instant::now();
        assert!(!store.check_and_admit_at(Some("abc"), t0));
        assert!(store.check_and_admit_at(Some("abc"), t0 + Duration::from_secs(599)));
        assert!(!store.check_and_admit_at(Some("abc"), t0 + Duration::from_secs(601)));
    }

    #[test]
    fn sweep_removes_only_stale_entries() {
        let store = DedupStore::with_retention(Duration::from_secs(10));
        let t0 = Instant::now();
        store.check_and_admit_at(Some("old"), t0);
        store.check_and_admit_at(Some("new"), t0 + Duration::from_secs(8));

        store.sweep(t0 + Duration::from_secs(11));
        assert_eq!(store.len(), 1);
        assert!(store.check_and_admit_at(Some("new"), t0 + Duration::from_secs(11)));
    }

    #[test]
    fn poisoned_lock_is_recovered() {
        let store = Arc::new(DedupStore::new());
        let poisoner = Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.entries.lock().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(!store.check_and_admit(Some("abc")));
        assert!(store.check_and_admit(Some("abc")));
    }
}
