// ── Site registry ──
//
// Owns every registered site. All mutations are whole-value swaps, so a
// reader never sees a half-updated site, and every mutation is pushed to
// subscribers.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use super::collection::EntityCollection;
use crate::error::CoreError;
use crate::model::{Site, SiteId};
use crate::stream::{EntityStream, Snapshot};

/// Reactive, concurrency-safe collection of sites keyed by normalized URL.
pub struct SiteRegistry {
    sites: EntityCollection<Site>,
    next_id: AtomicU64,
}

impl SiteRegistry {
    pub fn new() -> Self {
        Self {
            sites: EntityCollection::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a never-analyzed site.
    ///
    /// `url` must already be normalized. A URL that is already registered
    /// is rejected and the registry is left untouched.
    pub fn insert(&self, url: String, keywords: Vec<String>) -> Result<Arc<Site>, CoreError> {
        let inserted = self.sites.insert_with(url.clone(), || {
            let id = SiteId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
            (id, Site::new(id, url.clone(), keywords))
        });

        match inserted {
            Some(site) => {
                debug!(id = %site.id, url = %site.url, "site registered");
                Ok(site)
            }
            None => Err(CoreError::DuplicateSite { url }),
        }
    }

    pub fn remove(&self, id: SiteId) -> Option<Arc<Site>> {
        let removed = self.sites.remove(id);
        if removed.is_some() {
            debug!(%id, "site removed");
        }
        removed
    }

    pub fn get(&self, id: SiteId) -> Option<Arc<Site>> {
        self.sites.get_by_id(id)
    }

    /// Look up by normalized URL.
    pub fn find_by_url(&self, url: &str) -> Option<Arc<Site>> {
        self.sites.get_by_key(url)
    }

    /// Apply `f` to a copy of the site and swap it in.
    pub fn update<F>(&self, id: SiteId, f: F) -> Result<Arc<Site>, CoreError>
    where
        F: FnOnce(&mut Site),
    {
        self.sites
            .update(id, f)
            .ok_or_else(|| CoreError::not_found(id))
    }

    /// All sites, ordered by id (insertion order).
    pub fn snapshot(&self) -> Snapshot<Site> {
        self.sites.snapshot()
    }

    pub fn subscribe(&self) -> EntityStream<Site> {
        EntityStream::new(self.sites.subscribe())
    }

    /// Mutation counter; increases by one for every change.
    pub fn version(&self) -> u64 {
        self.sites.version()
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}

impl Default for SiteRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{Issue, Scores};

    fn kw() -> Vec<String> {
        vec!["general".into()]
    }

    #[test]
    fn ids_increase_in_insertion_order() {
        let registry = SiteRegistry::new();
        let a = registry.insert("https://a.test/".into(), kw()).unwrap();
        let b = registry.insert("https://b.test/".into(), kw()).unwrap();

        assert!(a.id < b.id);
        let urls: Vec<_> = registry.snapshot().iter().map(|s| s.url.clone()).collect();
        assert_eq!(urls, vec!["https://a.test/", "https://b.test/"]);
    }

    #[test]
    fn duplicate_url_is_rejected_without_mutation() {
        let registry = SiteRegistry::new();
        registry.insert("https://a.test/".into(), kw()).unwrap();
        let version = registry.version();

        let err = registry
            .insert("https://a.test/".into(), vec!["other".into()])
            .unwrap_err();
        assert!(matches!(err, CoreError::DuplicateSite { .. }));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.version(), version);
        assert_eq!(
            registry.find_by_url("https://a.test/").unwrap().keywords,
            kw()
        );
    }

    #[test]
    fn update_unknown_site_is_not_found() {
        let registry = SiteRegistry::new();
        let err = registry
            .update(SiteId::new(42), |s| s.scores = Scores::new(1, 1, 1))
            .unwrap_err();
        assert!(matches!(err, CoreError::SiteNotFound { .. }));
    }

    #[test]
    fn removed_ids_are_never_reused() {
        let registry = SiteRegistry::new();
        let a = registry.insert("https://a.test/".into(), kw()).unwrap();
        registry.remove(a.id).unwrap();
        let b = registry.insert("https://a.test/".into(), kw()).unwrap();
        assert!(b.id > a.id);
        assert!(registry.get(a.id).is_none());
    }

    #[tokio::test]
    async fn subscribers_observe_every_mutation() {
        let registry = SiteRegistry::new();
        let mut stream = registry.subscribe();
        assert!(stream.current().is_empty());

        let site = registry.insert("https://a.test/".into(), kw()).unwrap();
        let snap = stream.changed().await.unwrap();
        assert_eq!(snap.len(), 1);

        registry
            .update(site.id, |s| s.issues = vec![Issue::NoMajorProblems])
            .unwrap();
        let snap = stream.changed().await.unwrap();
        assert_eq!(snap[0].issues, vec![Issue::NoMajorProblems]);

        registry.remove(site.id);
        let snap = stream.changed().await.unwrap();
        assert!(snap.is_empty());
        assert!(!stream.has_changed());
    }
}
