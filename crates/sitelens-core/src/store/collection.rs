// ── Keyed entity collection ──
//
// Sharded map keyed by id, a unique string key on the side, and a watch
// channel carrying the id-ordered snapshot.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::watch;

use crate::model::SiteId;
use crate::stream::Snapshot;

/// Entities addressed by [`SiteId`] and by one unique string key.
///
/// Each successful mutation republishes the snapshot and then bumps the
/// version, so a reader that sees version N also sees its snapshot.
pub(crate) struct EntityCollection<T: Clone + Send + Sync + 'static> {
    by_id: DashMap<SiteId, Arc<T>>,
    /// Normalized URL -> id.
    key_to_id: DashMap<String, SiteId>,
    id_to_key: DashMap<SiteId, String>,
    version: watch::Sender<u64>,
    snapshot: watch::Sender<Snapshot<T>>,
}

impl<T: Clone + Send + Sync + 'static> EntityCollection<T> {
    pub(crate) fn new() -> Self {
        let (version, _) = watch::channel(0u64);
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));

        Self {
            by_id: DashMap::new(),
            key_to_id: DashMap::new(),
            id_to_key: DashMap::new(),
            version,
            snapshot,
        }
    }

    /// Insert a new entity under a unique key.
    ///
    /// `build` runs only when the key is free. Returns `None` and changes
    /// nothing if the key is already taken.
    pub(crate) fn insert_with<F>(&self, key: String, build: F) -> Option<Arc<T>>
    where
        F: FnOnce() -> (SiteId, T),
    {
        let inserted = match self.key_to_id.entry(key.clone()) {
            Entry::Occupied(_) => return None,
            Entry::Vacant(slot) => {
                let (id, entity) = build();
                let entity = Arc::new(entity);
                self.by_id.insert(id, Arc::clone(&entity));
                self.id_to_key.insert(id, key);
                slot.insert(id);
                entity
            }
        };

        self.rebuild_snapshot();
        self.bump_version();
        Some(inserted)
    }

    /// Remove an entity by id. Returns the removed entity if it existed.
    pub(crate) fn remove(&self, id: SiteId) -> Option<Arc<T>> {
        let removed = self.by_id.remove(&id).map(|(_, v)| v);
        if removed.is_some() {
            if let Some((_, key)) = self.id_to_key.remove(&id) {
                self.key_to_id.remove(&key);
            }
            self.rebuild_snapshot();
            self.bump_version();
        }
        removed
    }

    /// Replace an entity with a modified copy in a single swap.
    ///
    /// Returns `None` when the id is unknown.
    pub(crate) fn update<F>(&self, id: SiteId, f: F) -> Option<Arc<T>>
    where
        F: FnOnce(&mut T),
    {
        let updated = {
            let mut entry = self.by_id.get_mut(&id)?;
            let mut next = T::clone(entry.value());
            f(&mut next);
            let next = Arc::new(next);
            *entry = Arc::clone(&next);
            next
        };

        self.rebuild_snapshot();
        self.bump_version();
        Some(updated)
    }

    /// Look up an entity by its unique key.
    pub(crate) fn get_by_key(&self, key: &str) -> Option<Arc<T>> {
        let id = *self.key_to_id.get(key)?;
        self.get_by_id(id)
    }

    pub(crate) fn get_by_id(&self, id: SiteId) -> Option<Arc<T>> {
        self.by_id.get(&id).map(|r| Arc::clone(r.value()))
    }

    pub(crate) fn snapshot(&self) -> Snapshot<T> {
        Arc::clone(&self.snapshot.borrow())
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Snapshot<T>> {
        self.snapshot.subscribe()
    }

    pub(crate) fn version(&self) -> u64 {
        *self.version.borrow()
    }

    pub(crate) fn len(&self) -> usize {
        self.by_id.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    // ── Publishing ───────────────────────────────────────────────────

    /// Rebuild under the watch write lock. Rebuilds run one at a time and
    /// each reads the map after its own mutation, so the last one to
    /// publish always sees every completed mutation.
    fn rebuild_snapshot(&self) {
        self.snapshot.send_modify(|snap| {
            let mut entries: Vec<(SiteId, Arc<T>)> = self
                .by_id
                .iter()
                .map(|r| (*r.key(), Arc::clone(r.value())))
                .collect();
            entries.sort_unstable_by_key(|(id, _)| *id);
            *snap = Arc::new(entries.into_iter().map(|(_, v)| v).collect());
        });
    }

    fn bump_version(&self) {
        self.version.send_modify(|v| *v = v.wrapping_add(1));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn id(raw: u64) -> SiteId {
        SiteId::new(raw)
    }

    #[test]
    fn insert_with_returns_new_entity() {
        let col: EntityCollection<String> = EntityCollection::new();
        let inserted = col.insert_with("key1".into(), || (id(1), "hello".into()));
        assert_eq!(*inserted.unwrap(), "hello");
        assert_eq!(col.len(), 1);
    }

    #[test]
    fn duplicate_key_is_rejected_without_building() {
        let col: EntityCollection<String> = EntityCollection::new();
        col.insert_with("key1".into(), || (id(1), "hello".into()))
            .unwrap();
        let version = col.version();

        let rejected = col.insert_with("key1".into(), || panic!("must not build"));
        assert!(rejected.is_none());
        assert_eq!(col.len(), 1);
        assert_eq!(col.version(), version);
    }

    #[test]
    fn get_by_key_and_id() {
        let col: EntityCollection<String> = EntityCollection::new();
        col.insert_with("key1".into(), || (id(7), "hello".into()))
            .unwrap();

        assert_eq!(*col.get_by_key("key1").unwrap(), "hello");
        assert_eq!(*col.get_by_id(id(7)).unwrap(), "hello");
        assert!(col.get_by_key("nope").is_none());
    }

    #[test]
    fn remove_cleans_up_indexes() {
        let col: EntityCollection<String> = EntityCollection::new();
        col.insert_with("key1".into(), || (id(1), "hello".into()))
            .unwrap();

        let removed = col.remove(id(1));
        assert_eq!(*removed.unwrap(), "hello");
        assert!(col.get_by_key("key1").is_none());
        assert!(col.get_by_id(id(1)).is_none());
        assert!(col.is_empty());

        // Key is free again.
        assert!(col.insert_with("key1".into(), || (id(2), "again".into())).is_some());
    }

    #[test]
    fn update_swaps_whole_value() {
        let col: EntityCollection<String> = EntityCollection::new();
        col.insert_with("k".into(), || (id(1), "a".into())).unwrap();

        let updated = col.update(id(1), |s| s.push('b')).unwrap();
        assert_eq!(*updated, "ab");
        assert_eq!(*col.snapshot()[0], "ab");
        assert!(col.update(id(9), |s| s.push('c')).is_none());
    }

    #[test]
    fn snapshot_is_ordered_by_id() {
        let col: EntityCollection<String> = EntityCollection::new();
        assert!(col.snapshot().is_empty());

        for raw in [5, 1, 3] {
            col.insert_with(format!("k{raw}"), || (id(raw), raw.to_string()))
                .unwrap();
        }

        let snap: Vec<String> = col.snapshot().iter().map(|s| s.to_string()).collect();
        assert_eq!(snap, vec!["1", "3", "5"]);
    }

    #[test]
    fn concurrent_updates_publish_the_final_state() {
        const THREADS: u64 = 8;
        const ROUNDS: u32 = 50;

        for _ in 0..40 {
            let col: EntityCollection<u32> = EntityCollection::new();
            for raw in 1..=THREADS {
                col.insert_with(format!("k{raw}"), || (id(raw), 0)).unwrap();
            }

            std::thread::scope(|scope| {
                for raw in 1..=THREADS {
                    let col = &col;
                    scope.spawn(move || {
                        for _ in 0..ROUNDS {
                            col.update(id(raw), |n| *n += 1).unwrap();
                        }
                    });
                }
            });

            let published: Vec<u32> = col.snapshot().iter().map(|n| **n).collect();
            assert_eq!(published, vec![ROUNDS; 8]);
        }
    }

    #[test]
    fn every_mutation_bumps_version() {
        let col: EntityCollection<String> = EntityCollection::new();
        col.insert_with("k".into(), || (id(1), "a".into())).unwrap();
        col.update(id(1), |s| s.push('b'));
        col.remove(id(1));
        assert_eq!(col.version(), 3);
    }
}
