//! Host environment collaborator
//!
//! Each game server platform supplies one [`VaultHost`]: how to validate and
//! describe plugin owners, where failures are logged, how to look players up
//! natively, and where background work runs.

use dashmap::DashMap;
use futures::future::BoxFuture;
use tokio::runtime::Handle;
use tracing::warn;
use vault_types::{OwnerId, PlayerName, ResolverError, Uuid};

use crate::error::{VaultError, VaultResult};

pub trait VaultHost: Send + Sync + 'static {
    /// Reject owner identities that do not name a loaded component.
    fn verify_owner(&self, _owner: &OwnerId) -> bool {
        true
    }

    /// Human readable owner description for diagnostics.
    fn describe_owner(&self, _owner: &OwnerId) -> Option<String> {
        None
    }

    /// Called once for every resolver failure caught during a query.
    fn report_failure(&self, context: &str, error: &ResolverError) {
        warn!(error = %error, "{}", context);
    }

    /// Online players, plus the offline cache where the platform has one.
    fn native_uuid(&self, _name: &PlayerName) -> Option<Uuid> {
        None
    }

    fn native_name(&self, _uuid: Uuid) -> Option<String> {
        None
    }

    /// Whether native lookups may only run on the server's main thread.
    fn native_lookup_requires_main_thread(&self) -> bool {
        false
    }

    /// Whether native lookups may run on the calling thread.
    ///
    /// Hosts with a main-thread restriction override this to check the
    /// current thread.
    fn native_lookup_allowed_here(&self) -> bool {
        !self.native_lookup_requires_main_thread()
    }

    /// Run a task off the caller's thread.
    ///
    /// Dropping the task instead of running it completes any pending
    /// resolution with "not found".
    fn schedule(&self, task: BoxFuture<'static, ()>);
}

/// Host backed by a tokio runtime, with an optional table of online players.
///
/// Suitable for standalone deployments and tests.
pub struct TokioHost {
    handle: Handle,
    players: DashMap<Uuid, String>,
    requires_main_thread: bool,
}

impl TokioHost {
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            players: DashMap::new(),
            requires_main_thread: false,
        }
    }

    /// Use the runtime the caller is running in.
    pub fn current() -> VaultResult<Self> {
        let handle = Handle::try_current().map_err(|e| VaultError::NoRuntime(e.to_string()))?;
        Ok(Self::new(handle))
    }

    pub fn with_player(self, uuid: Uuid, name: impl Into<String>) -> Self {
        self.players.insert(uuid, name.into());
        self
    }

    pub fn with_main_thread_restriction(mut self, restricted: bool) -> Self {
        self.requires_main_thread = restricted;
        self
    }

    pub fn player_joined(&self, uuid: Uuid, name: impl Into<String>) {
        self.players.insert(uuid, name.into());
    }

    pub fn player_left(&self, uuid: Uuid) {
        self.players.remove(&uuid);
    }
}

impl VaultHost for TokioHost {
    fn native_uuid(&self, name: &PlayerName) -> Option<Uuid> {
        self.players
            .iter()
            .find(|p| name.eq_ignore_case(p.value()))
            .map(|p| *p.key())
    }

    fn native_name(&self, uuid: Uuid) -> Option<String> {
        self.players.get(&uuid).map(|p| p.value().clone())
    }

    fn native_lookup_requires_main_thread(&self) -> bool {
        self.requires_main_thread
    }

    fn schedule(&self, task: BoxFuture<'static, ()>) {
        self.handle.spawn(task);
    }
}
