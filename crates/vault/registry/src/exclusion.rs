//! Exclusion views
//!
//! A resolver that wants to double-check its own answers against everyone
//! else asks the vault for a view that skips its registration.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use vault_types::{PlayerName, RegistrationId, Uuid};

use crate::engine::{NameLookup, UuidLookup};
use crate::resolution::Resolution;
use crate::resolver::CollectiveResolver;
use crate::vault::VaultInner;

/// Aggregate resolver that skips exactly one registration.
///
/// Equality is identity based: two views are equal when they wrap the same
/// vault and skip the same registration.
#[derive(Clone)]
pub struct ExcludingResolver {
    vault: Arc<VaultInner>,
    skip: RegistrationId,
}

impl ExcludingResolver {
    pub(crate) fn new(vault: Arc<VaultInner>, skip: RegistrationId) -> Self {
        Self { vault, skip }
    }

    pub fn skipped(&self) -> RegistrationId {
        self.skip
    }
}

impl CollectiveResolver for ExcludingResolver {
    fn resolve_name_immediately(&self, name: &PlayerName) -> Option<Uuid> {
        self.vault.immediately(&NameLookup(name.clone()), Some(self.skip))
    }

    fn resolve_uuid_immediately(&self, uuid: Uuid) -> Option<String> {
        self.vault.immediately(&UuidLookup(uuid), Some(self.skip))
    }

    fn resolve_name(&self, name: &PlayerName) -> Resolution<Uuid> {
        self.vault.resolve(NameLookup(name.clone()), Some(self.skip))
    }

    fn resolve_uuid(&self, uuid: Uuid) -> Resolution<String> {
        self.vault.resolve(UuidLookup(uuid), Some(self.skip))
    }
}

impl PartialEq for ExcludingResolver {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.vault, &other.vault) && self.skip == other.skip
    }
}

impl Eq for ExcludingResolver {}

impl Hash for ExcludingResolver {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Arc::as_ptr(&self.vault), state);
        self.skip.hash(state);
    }
}

impl fmt::Debug for ExcludingResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExcludingResolver")
            .field("vault", &Arc::as_ptr(&self.vault))
            .field("skip", &self.skip)
            .finish()
    }
}
