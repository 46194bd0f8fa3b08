//! Resolver capability traits
//!
//! A resolver is anything that can map player names to UUIDs and back.
//! Plugins implement [`UuidResolver`] (or [`UpdatableResolver`] if they
//! accept mapping hints) and register it with a [`UuidVault`](crate::UuidVault).
//! Callers query the vault, or an exclusion view of it, through
//! [`CollectiveResolver`].

use futures::future::BoxFuture;
use vault_types::{PlayerName, ResolverError, Uuid};

use crate::resolution::Resolution;

/// Deferred answer from a single resolver.
///
/// `Ok(None)` means the resolver has no mapping. Errors are reported by the
/// vault and otherwise treated like `Ok(None)`.
pub type Deferred<T> = BoxFuture<'static, Result<Option<T>, ResolverError>>;

/// A name/UUID resolver registered by a plugin
pub trait UuidResolver: Send + Sync {
    /// Look up a UUID in memory. Must never block or start background work.
    fn resolve_name_immediately(&self, name: &PlayerName) -> Option<Uuid>;

    /// Look up a name in memory. Must never block or start background work.
    fn resolve_uuid_immediately(&self, uuid: Uuid) -> Option<String>;

    /// Start a full lookup that may touch storage.
    ///
    /// Returning `None` declines the query. The in-memory lookup has already
    /// been tried by the time this is called, so implementations need not
    /// repeat it.
    fn resolve_name(&self, _name: &PlayerName) -> Option<Deferred<Uuid>> {
        None
    }

    /// Start a full lookup that may touch storage. See [`Self::resolve_name`].
    fn resolve_uuid(&self, _uuid: Uuid) -> Option<Deferred<String>> {
        None
    }
}

/// A resolver that also accepts out-of-band mapping hints
pub trait UpdatableResolver: UuidResolver {
    /// Suggest that `uuid` belongs to the player called `name`.
    ///
    /// `force` marks the hint as authoritative (the caller saw the player).
    /// Implementations are free to ignore hints.
    fn update(&self, uuid: Uuid, name: &str, force: bool);
}

/// Aggregate view over every registered resolver
pub trait CollectiveResolver: Send + Sync {
    fn resolve_name_immediately(&self, name: &PlayerName) -> Option<Uuid>;

    fn resolve_uuid_immediately(&self, uuid: Uuid) -> Option<String>;

    fn resolve_name(&self, name: &PlayerName) -> Resolution<Uuid>;

    fn resolve_uuid(&self, uuid: Uuid) -> Resolution<String>;
}
