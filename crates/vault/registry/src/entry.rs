//! Registered resolver entries

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use vault_types::{OwnerId, Priority, RegistrationId};

use crate::resolver::{UpdatableResolver, UuidResolver};

/// Label used in diagnostics for resolvers registered without a name.
pub const UNNAMED_RESOLVER: &str = "Unnamed";

/// One resolver registration. Immutable once created.
pub struct ResolverEntry {
    id: RegistrationId,
    owner: OwnerId,
    priority: Priority,
    display_name: String,
    resolver: Arc<dyn UuidResolver>,
    /// Same object as `resolver` when it accepts hints.
    hints: Option<Arc<dyn UpdatableResolver>>,
}

impl ResolverEntry {
    pub(crate) fn new(
        id: RegistrationId,
        owner: OwnerId,
        priority: Priority,
        display_name: String,
        resolver: Arc<dyn UuidResolver>,
        hints: Option<Arc<dyn UpdatableResolver>>,
    ) -> Self {
        Self {
            id,
            owner,
            priority,
            display_name,
            resolver,
            hints,
        }
    }

    pub fn id(&self) -> RegistrationId {
        self.id
    }

    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Display name, or [`UNNAMED_RESOLVER`] when it is empty.
    pub fn display_label(&self) -> &str {
        if self.display_name.is_empty() {
            UNNAMED_RESOLVER
        } else {
            &self.display_name
        }
    }

    pub fn resolver(&self) -> &dyn UuidResolver {
        self.resolver.as_ref()
    }

    pub fn hints(&self) -> Option<&Arc<dyn UpdatableResolver>> {
        self.hints.as_ref()
    }

    pub fn accepts_hints(&self) -> bool {
        self.hints.is_some()
    }

    /// Query order: priority descending, then earliest registration first.
    pub fn query_order(a: &Arc<Self>, b: &Arc<Self>) -> Ordering {
        b.priority.cmp(&a.priority).then(a.id.cmp(&b.id))
    }
}

impl fmt::Debug for ResolverEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverEntry")
            .field("id", &self.id)
            .field("owner", &self.owner)
            .field("priority", &self.priority)
            .field("display_name", &self.display_name)
            .field("accepts_hints", &self.accepts_hints())
            .finish()
    }
}
