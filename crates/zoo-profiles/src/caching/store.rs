use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use crate::types::{CacheEntry, ProfileResult, UserId};

/// The keyed slot store backing the profile cache.
///
/// The cache is the only writer and touches a slot at exactly two points:
/// `try_set_pending` (`Absent → Pending`) and `settle` (`Pending → Settled`).
/// The check-and-set in `try_set_pending` must be atomic, as it is what
/// collapses concurrent loads for the same user into a single fetch sequence.
pub trait ProfileStore: Send + Sync + 'static {
    /// The current state of the user's slot.
    fn get(&self, user_id: &UserId) -> CacheEntry;

    /// Marks the user's slot as pending if it has no entry yet.
    ///
    /// Returns `false` if the slot is already pending or settled, in which
    /// case the caller must not start a load sequence.
    fn try_set_pending(&self, user_id: &UserId) -> bool;

    /// Finalizes the user's slot with the results of one load sequence.
    fn settle(&self, user_id: &UserId, results: Arc<[ProfileResult]>);

    /// Read-only dump of all slots, for diagnostics.
    fn snapshot(&self) -> BTreeMap<UserId, CacheEntry>;
}

/// The default process-local store.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    slots: Mutex<HashMap<UserId, CacheEntry>>,
}

impl ProfileStore for InMemoryStore {
    fn get(&self, user_id: &UserId) -> CacheEntry {
        self.slots
            .lock()
            .unwrap()
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }

    fn try_set_pending(&self, user_id: &UserId) -> bool {
        let mut slots = self.slots.lock().unwrap();
        match slots.get(user_id) {
            Some(_) => false,
            None => {
                slots.insert(user_id.clone(), CacheEntry::Pending);
                true
            }
        }
    }

    fn settle(&self, user_id: &UserId, results: Arc<[ProfileResult]>) {
        let mut slots = self.slots.lock().unwrap();
        let slot = slots.entry(user_id.clone()).or_default();
        debug_assert!(
            matches!(slot, CacheEntry::Pending),
            "settled a slot that was not pending"
        );
        *slot = CacheEntry::Settled(results);
    }

    fn snapshot(&self) -> BTreeMap<UserId, CacheEntry> {
        self.slots
            .lock()
            .unwrap()
            .iter()
            .map(|(user_id, entry)| (user_id.clone(), entry.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_by_default() {
        let store = InMemoryStore::default();
        assert_eq!(store.get(&UserId::new("nobody")), CacheEntry::Absent);
    }

    #[test]
    fn test_pending_is_exclusive() {
        let store = InMemoryStore::default();
        let user = UserId::new("user-1");

        assert!(store.try_set_pending(&user));
        assert!(!store.try_set_pending(&user));
        assert_eq!(store.get(&user), CacheEntry::Pending);
    }

    #[test]
    fn test_settled_slots_stay_settled() {
        let store = InMemoryStore::default();
        let user = UserId::new("user-1");

        assert!(store.try_set_pending(&user));
        store.settle(&user, Vec::new().into());

        // no implicit refresh once a value exists
        assert!(!store.try_set_pending(&user));
        assert_eq!(store.get(&user).settled(), Some(&[][..]));
    }

    #[test]
    fn test_snapshot() {
        let store = InMemoryStore::default();
        store.try_set_pending(&UserId::new("a"));
        store.try_set_pending(&UserId::new("b"));
        store.settle(&UserId::new("b"), Vec::new().into());

        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[&UserId::new("a")], CacheEntry::Pending);
        assert!(matches!(
            snapshot[&UserId::new("b")],
            CacheEntry::Settled(_)
        ));
    }
}
