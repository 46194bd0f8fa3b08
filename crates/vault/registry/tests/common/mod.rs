//! Resolvers and hosts shared by the integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::BoxFuture;
use vault_registry::{
    Deferred, OwnerId, PlayerName, ResolverError, UpdatableResolver, UuidResolver, Uuid,
    VaultHost,
};

/// Never answers and declines every deferred query.
pub struct NullResolver;

impl UuidResolver for NullResolver {
    fn resolve_name_immediately(&self, _name: &PlayerName) -> Option<Uuid> {
        None
    }

    fn resolve_uuid_immediately(&self, _uuid: Uuid) -> Option<String> {
        None
    }
}

/// Never answers, but does run (empty) deferred lookups.
pub struct EmptyResolver;

impl UuidResolver for EmptyResolver {
    fn resolve_name_immediately(&self, _name: &PlayerName) -> Option<Uuid> {
        None
    }

    fn resolve_uuid_immediately(&self, _uuid: Uuid) -> Option<String> {
        None
    }

    fn resolve_name(&self, _name: &PlayerName) -> Option<Deferred<Uuid>> {
        Some(Box::pin(async { Ok(None) }))
    }

    fn resolve_uuid(&self, _uuid: Uuid) -> Option<Deferred<String>> {
        Some(Box::pin(async { Ok(None) }))
    }
}

/// Knows a single mapping, in memory only.
pub struct SingleImmediateResolver {
    pub uuid: Uuid,
    pub name: String,
}

impl SingleImmediateResolver {
    pub fn new(uuid: Uuid, name: &str) -> Arc<Self> {
        Arc::new(Self {
            uuid,
            name: name.to_string(),
        })
    }
}

impl UuidResolver for SingleImmediateResolver {
    fn resolve_name_immediately(&self, name: &PlayerName) -> Option<Uuid> {
        name.eq_ignore_case(&self.name).then_some(self.uuid)
    }

    fn resolve_uuid_immediately(&self, uuid: Uuid) -> Option<String> {
        (uuid == self.uuid).then(|| self.name.clone())
    }
}

/// Mappings reachable only through deferred lookups, after a short delay.
/// Records the hints it receives.
pub struct StorageResolver {
    by_name: Mutex<HashMap<PlayerName, Uuid>>,
    deferred_calls: AtomicUsize,
    pub hints: Mutex<Vec<(Uuid, String, bool)>>,
}

impl StorageResolver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            by_name: Mutex::new(HashMap::new()),
            deferred_calls: AtomicUsize::new(0),
            hints: Mutex::new(Vec::new()),
        })
    }

    pub fn with(self: Arc<Self>, uuid: Uuid, name: &str) -> Arc<Self> {
        self.by_name
            .lock()
            .unwrap()
            .insert(PlayerName::new(name), uuid);
        self
    }

    pub fn deferred_calls(&self) -> usize {
        self.deferred_calls.load(Ordering::SeqCst)
    }

    fn lookup_name(&self, name: &PlayerName) -> Option<Uuid> {
        self.by_name.lock().unwrap().get(name).copied()
    }

    fn lookup_uuid(&self, uuid: Uuid) -> Option<String> {
        self.by_name
            .lock()
            .unwrap()
            .iter()
            .find(|(_, u)| **u == uuid)
            .map(|(n, _)| n.to_string())
    }
}

impl UuidResolver for StorageResolver {
    fn resolve_name_immediately(&self, _name: &PlayerName) -> Option<Uuid> {
        None
    }

    fn resolve_uuid_immediately(&self, _uuid: Uuid) -> Option<String> {
        None
    }

    fn resolve_name(&self, name: &PlayerName) -> Option<Deferred<Uuid>> {
        self.deferred_calls.fetch_add(1, Ordering::SeqCst);
        let found = self.lookup_name(name);
        Some(Box::pin(async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok(found)
        }))
    }

    fn resolve_uuid(&self, uuid: Uuid) -> Option<Deferred<String>> {
        self.deferred_calls.fetch_add(1, Ordering::SeqCst);
        let found = self.lookup_uuid(uuid);
        Some(Box::pin(async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok(found)
        }))
    }
}

impl UpdatableResolver for StorageResolver {
    fn update(&self, uuid: Uuid, name: &str, force: bool) {
        self.hints
            .lock()
            .unwrap()
            .push((uuid, name.to_string(), force));
    }
}

/// Deferred lookups always fail.
pub struct FailingResolver;

impl UuidResolver for FailingResolver {
    fn resolve_name_immediately(&self, _name: &PlayerName) -> Option<Uuid> {
        None
    }

    fn resolve_uuid_immediately(&self, _uuid: Uuid) -> Option<String> {
        None
    }

    fn resolve_name(&self, _name: &PlayerName) -> Option<Deferred<Uuid>> {
        Some(Box::pin(async {
            Err(ResolverError::Unavailable("database offline".into()))
        }))
    }

    fn resolve_uuid(&self, _uuid: Uuid) -> Option<Deferred<String>> {
        Some(Box::pin(async {
            Err(ResolverError::from(anyhow::anyhow!("connection reset")))
        }))
    }
}

/// Tokio-backed host that records reported failures and can reject owners.
pub struct TestHost {
    handle: tokio::runtime::Handle,
    rejected_owner: Option<OwnerId>,
    pub failures: Arc<Mutex<Vec<String>>>,
    players: HashMap<Uuid, String>,
}

impl TestHost {
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self {
            handle,
            rejected_owner: None,
            failures: Arc::new(Mutex::new(Vec::new())),
            players: HashMap::new(),
        }
    }

    pub fn current() -> Self {
        Self::new(tokio::runtime::Handle::current())
    }

    pub fn rejecting(mut self, owner: &str) -> Self {
        self.rejected_owner = Some(OwnerId::new(owner));
        self
    }

    pub fn with_player(mut self, uuid: Uuid, name: &str) -> Self {
        self.players.insert(uuid, name.to_string());
        self
    }
}

impl VaultHost for TestHost {
    fn verify_owner(&self, owner: &OwnerId) -> bool {
        self.rejected_owner.as_ref() != Some(owner)
    }

    fn describe_owner(&self, owner: &OwnerId) -> Option<String> {
        Some(format!("{} v1.0", owner.as_str()))
    }

    fn report_failure(&self, context: &str, error: &ResolverError) {
        self.failures
            .lock()
            .unwrap()
            .push(format!("{context}: {error}"));
    }

    fn native_uuid(&self, name: &PlayerName) -> Option<Uuid> {
        self.players
            .iter()
            .find(|(_, n)| name.eq_ignore_case(n))
            .map(|(u, _)| *u)
    }

    fn native_name(&self, uuid: Uuid) -> Option<String> {
        self.players.get(&uuid).cloned()
    }

    fn schedule(&self, task: BoxFuture<'static, ()>) {
        self.handle.spawn(task);
    }
}

pub fn a248() -> (Uuid, PlayerName) {
    (
        Uuid::parse_str("ed5f12cd-6007-45d9-a4b9-940524ddaecf").unwrap(),
        PlayerName::new("A248"),
    )
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
