//! Concurrent resolver registry
//!
//! Entries are keyed by owner, so duplicate detection and insertion happen
//! in one atomic step on the owning shard. Readers take an ordered snapshot
//! and never hold a map lock while a resolver runs.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use vault_types::{OwnerId, RegistrationId};

use crate::entry::ResolverEntry;

/// Priority-ordered, immutable list of entries
pub type ResolverList = Arc<[Arc<ResolverEntry>]>;

/// Registry of resolver entries, at most one per owner
pub struct ResolverRegistry {
    entries: DashMap<OwnerId, Arc<ResolverEntry>>,
    next_id: AtomicU64,
    /// Bumped after every successful insert or remove.
    generation: AtomicU64,
}

impl ResolverRegistry {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            next_id: AtomicU64::new(1),
            generation: AtomicU64::new(0),
        }
    }

    pub(crate) fn issue_id(&self) -> RegistrationId {
        RegistrationId::from_raw(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Insert an entry unless its owner is already registered.
    ///
    /// On conflict the existing entry is returned as the error.
    pub fn insert(&self, entry: ResolverEntry) -> Result<Arc<ResolverEntry>, Arc<ResolverEntry>> {
        match self.entries.entry(entry.owner().clone()) {
            Entry::Occupied(existing) => Err(existing.get().clone()),
            Entry::Vacant(slot) => {
                let entry = Arc::new(entry);
                slot.insert(entry.clone());
                self.generation.fetch_add(1, Ordering::AcqRel);
                Ok(entry)
            }
        }
    }

    /// Remove the entry for `owner`, but only if it is registration `id`.
    pub fn remove(&self, owner: &OwnerId, id: RegistrationId) -> Option<Arc<ResolverEntry>> {
        let removed = self
            .entries
            .remove_if(owner, |_, entry| entry.id() == id)
            .map(|(_, entry)| entry);

        if removed.is_some() {
            self.generation.fetch_add(1, Ordering::AcqRel);
        }
        removed
    }

    pub fn get(&self, owner: &OwnerId) -> Option<Arc<ResolverEntry>> {
        self.entries.get(owner).map(|e| e.value().clone())
    }

    pub fn contains(&self, id: RegistrationId) -> bool {
        self.entries.iter().any(|e| e.value().id() == id)
    }

    /// Current mutation count. Changes whenever the set of entries does.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// All entries in query order.
    pub fn snapshot(&self) -> ResolverList {
        let mut entries: Vec<Arc<ResolverEntry>> =
            self.entries.iter().map(|e| e.value().clone()).collect();
        entries.sort_by(ResolverEntry::query_order);
        entries.into()
    }

    pub fn owners(&self) -> Vec<OwnerId> {
        self.entries.iter().map(|e| e.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ResolverRegistry {
    fn default() -> Self {
        Self::new()
    }
}
