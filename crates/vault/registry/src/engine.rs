//! Resolution engine
//!
//! Runs one query over an ordered resolver list. The immediate pass calls
//! every resolver's in-memory lookup and returns the first hit. The deferred
//! pass starts each resolver's full lookup one after another, in priority
//! order, and stops at the first hit, so lower priority resolvers do no work
//! for queries answered earlier.
//!
//! Resolver failures (errors and panics) never leave the engine. Each one is
//! reported to the host and the resolver is treated as having found nothing.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use futures::FutureExt;
use tracing::{debug, trace};
use vault_types::{PlayerName, RegistrationId, ResolverError, Uuid};

use crate::entry::ResolverEntry;
use crate::host::VaultHost;
use crate::registry::ResolverList;
use crate::resolver::{Deferred, UuidResolver};

/// One direction of lookup: name to UUID, or UUID to name.
pub(crate) trait Lookup: Send + Sync + 'static {
    type Value: Clone + Send + 'static;

    /// Cheap validity filter applied before any resolver is consulted.
    fn is_plausible(&self, max_name_length: usize) -> bool;

    fn natively(&self, host: &dyn VaultHost) -> Option<Self::Value>;

    fn immediately(&self, resolver: &dyn UuidResolver) -> Option<Self::Value>;

    fn deferred(&self, resolver: &dyn UuidResolver) -> Option<Deferred<Self::Value>>;

    /// The (uuid, name) pair a hit establishes.
    fn mapping(&self, value: &Self::Value) -> (Uuid, String);
}

pub(crate) struct NameLookup(pub PlayerName);

impl Lookup for NameLookup {
    type Value = Uuid;

    fn is_plausible(&self, max_name_length: usize) -> bool {
        self.0.is_plausible(max_name_length)
    }

    fn natively(&self, host: &dyn VaultHost) -> Option<Uuid> {
        host.native_uuid(&self.0)
    }

    fn immediately(&self, resolver: &dyn UuidResolver) -> Option<Uuid> {
        resolver.resolve_name_immediately(&self.0)
    }

    fn deferred(&self, resolver: &dyn UuidResolver) -> Option<Deferred<Uuid>> {
        resolver.resolve_name(&self.0)
    }

    fn mapping(&self, value: &Uuid) -> (Uuid, String) {
        (*value, self.0.as_str().to_string())
    }
}

pub(crate) struct UuidLookup(pub Uuid);

impl Lookup for UuidLookup {
    type Value = String;

    fn is_plausible(&self, _max_name_length: usize) -> bool {
        true
    }

    fn natively(&self, host: &dyn VaultHost) -> Option<String> {
        host.native_name(self.0)
    }

    fn immediately(&self, resolver: &dyn UuidResolver) -> Option<String> {
        resolver.resolve_uuid_immediately(self.0)
    }

    fn deferred(&self, resolver: &dyn UuidResolver) -> Option<Deferred<String>> {
        resolver.resolve_uuid(self.0)
    }

    fn mapping(&self, value: &String) -> (Uuid, String) {
        (self.0, value.clone())
    }
}

#[derive(Clone)]
pub(crate) struct ResolutionEngine {
    host: Arc<dyn VaultHost>,
    mutual_update: bool,
}

impl ResolutionEngine {
    pub fn new(host: Arc<dyn VaultHost>, mutual_update: bool) -> Self {
        Self {
            host,
            mutual_update,
        }
    }

    /// First in-memory answer from `entries`, skipping registration `skip`.
    pub fn immediately<L: Lookup>(
        &self,
        entries: &[Arc<ResolverEntry>],
        lookup: &L,
        skip: Option<RegistrationId>,
    ) -> Option<L::Value> {
        for entry in consulted(entries, skip) {
            match catch_unwind(AssertUnwindSafe(|| lookup.immediately(entry.resolver()))) {
                Ok(Some(value)) => return Some(value),
                Ok(None) => {}
                Err(payload) => self.report(entry, &ResolverError::from_panic(payload)),
            }
        }
        None
    }

    /// Chain the full lookups of `entries` in order until one answers.
    pub async fn deferred<L: Lookup>(
        self,
        entries: ResolverList,
        lookup: L,
        skip: Option<RegistrationId>,
    ) -> Option<L::Value> {
        let mut missed: Vec<Arc<ResolverEntry>> = Vec::new();

        for entry in consulted(&entries, skip) {
            if let Some(value) = self.consult(entry, &lookup).await {
                trace!(resolver = entry.display_label(), "Deferred lookup answered");
                self.push_hints(missed, &lookup, &value);
                return Some(value);
            }
            if self.mutual_update && entry.accepts_hints() {
                missed.push(entry.clone());
            }
        }
        None
    }

    async fn consult<L: Lookup>(&self, entry: &ResolverEntry, lookup: &L) -> Option<L::Value> {
        let started = catch_unwind(AssertUnwindSafe(|| lookup.deferred(entry.resolver())));
        let future = match started {
            Ok(Some(future)) => future,
            // Declined
            Ok(None) => return None,
            Err(payload) => {
                self.report(entry, &ResolverError::from_panic(payload));
                return None;
            }
        };

        match AssertUnwindSafe(future).catch_unwind().await {
            Ok(Ok(value)) => value,
            Ok(Err(error)) => {
                self.report(entry, &error);
                None
            }
            Err(payload) => {
                self.report(entry, &ResolverError::from_panic(payload));
                None
            }
        }
    }

    /// Send the winning mapping to resolvers that missed it, off the
    /// caller's path.
    fn push_hints<L: Lookup>(
        &self,
        missed: Vec<Arc<ResolverEntry>>,
        lookup: &L,
        value: &L::Value,
    ) {
        if missed.is_empty() {
            return;
        }
        let (uuid, name) = lookup.mapping(value);
        debug!(
            uuid = %uuid,
            name = %name,
            resolvers = missed.len(),
            "Pushing mapping hint to resolvers that missed"
        );
        self.broadcast(missed, uuid, name, false);
    }

    /// Deliver an `update` hint to every hint-accepting entry in a scheduled task.
    pub fn broadcast(
        &self,
        entries: Vec<Arc<ResolverEntry>>,
        uuid: Uuid,
        name: String,
        force: bool,
    ) {
        let engine = self.clone();
        self.host.schedule(Box::pin(async move {
            for entry in entries {
                let Some(hints) = entry.hints() else {
                    continue;
                };
                let delivered = catch_unwind(AssertUnwindSafe(|| hints.update(uuid, &name, force)));
                if let Err(payload) = delivered {
                    engine.report(&entry, &ResolverError::from_panic(payload));
                }
            }
        }));
    }

    fn report(&self, entry: &ResolverEntry, error: &ResolverError) {
        let owner = self
            .host
            .describe_owner(entry.owner())
            .unwrap_or_else(|| entry.owner().to_string());
        let context = format!(
            "Resolver '{}' from {} encountered an error while resolving a UUID or name",
            entry.display_label(),
            owner
        );
        self.host.report_failure(&context, error);
    }
}

fn consulted(
    entries: &[Arc<ResolverEntry>],
    skip: Option<RegistrationId>,
) -> impl Iterator<Item = &Arc<ResolverEntry>> {
    entries.iter().filter(move |e| Some(e.id()) != skip)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::UpdatableResolver;
    use futures::future::BoxFuture;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use vault_types::{OwnerId, Priority};

    /// Host that runs scheduled tasks inline and records failures.
    #[derive(Default)]
    struct RecordingHost {
        failures: Mutex<Vec<String>>,
    }

    impl VaultHost for RecordingHost {
        fn describe_owner(&self, owner: &OwnerId) -> Option<String> {
            Some(format!("{} v1.0", owner.as_str()))
        }

        fn report_failure(&self, context: &str, _error: &ResolverError) {
            self.failures.lock().unwrap().push(context.to_string());
        }

        fn schedule(&self, task: BoxFuture<'static, ()>) {
            futures::executor::block_on(task);
        }
    }

    enum Behavior {
        Answer(Uuid),
        Miss,
        Decline,
        Fail,
        Panic,
    }

    struct Scripted {
        behavior: Behavior,
        deferred_calls: AtomicUsize,
        hints: Mutex<Vec<(Uuid, String, bool)>>,
    }

    impl Scripted {
        fn new(behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                behavior,
                deferred_calls: AtomicUsize::new(0),
                hints: Mutex::new(Vec::new()),
            })
        }
    }

    impl UuidResolver for Scripted {
        fn resolve_name_immediately(&self, _name: &PlayerName) -> Option<Uuid> {
            None
        }

        fn resolve_uuid_immediately(&self, _uuid: Uuid) -> Option<String> {
            None
        }

        fn resolve_name(&self, _name: &PlayerName) -> Option<Deferred<Uuid>> {
            self.deferred_calls.fetch_add(1, Ordering::SeqCst);
            match self.behavior {
                Behavior::Answer(uuid) => Some(Box::pin(async move { Ok(Some(uuid)) })),
                Behavior::Miss => Some(Box::pin(async { Ok(None) })),
                Behavior::Decline => None,
                Behavior::Fail => Some(Box::pin(async {
                    Err(ResolverError::Backend("connection refused".into()))
                })),
                Behavior::Panic => Some(Box::pin(async { explode() })),
            }
        }
    }

    fn explode() -> Result<Option<Uuid>, ResolverError> {
        panic!("resolver bug")
    }

    impl UpdatableResolver for Scripted {
        fn update(&self, uuid: Uuid, name: &str, force: bool) {
            self.hints.lock().unwrap().push((uuid, name.to_string(), force));
        }
    }

    fn entry(id: u64, name: &str, resolver: Arc<Scripted>, updatable: bool) -> Arc<ResolverEntry> {
        let hints: Option<Arc<dyn UpdatableResolver>> = if updatable {
            Some(resolver.clone())
        } else {
            None
        };
        Arc::new(ResolverEntry::new(
            RegistrationId::from_raw(id),
            OwnerId::new(format!("plugin{id}")),
            Priority::NORMAL,
            name.to_string(),
            resolver,
            hints,
        ))
    }

    #[tokio::test]
    async fn test_chain_stops_at_first_hit() {
        let host = Arc::new(RecordingHost::default());
        let engine = ResolutionEngine::new(host, false);
        let uuid = Uuid::new_v4();
        let first = Scripted::new(Behavior::Miss);
        let second = Scripted::new(Behavior::Answer(uuid));
        let third = Scripted::new(Behavior::Answer(Uuid::new_v4()));

        let entries: ResolverList = vec![
            entry(1, "first", first.clone(), false),
            entry(2, "second", second.clone(), false),
            entry(3, "third", third.clone(), false),
        ]
        .into();

        let found = engine
            .deferred(entries, NameLookup(PlayerName::new("A248")), None)
            .await;
        assert_eq!(found, Some(uuid));
        assert_eq!(first.deferred_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second.deferred_calls.load(Ordering::SeqCst), 1);
        assert_eq!(third.deferred_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failures_are_reported_and_skipped() {
        let host = Arc::new(RecordingHost::default());
        let engine = ResolutionEngine::new(host.clone(), false);
        let uuid = Uuid::new_v4();

        let entries: ResolverList = vec![
            entry(1, "", Scripted::new(Behavior::Fail), false),
            entry(2, "Crashy", Scripted::new(Behavior::Panic), false),
            entry(3, "Quiet", Scripted::new(Behavior::Decline), false),
            entry(4, "Good", Scripted::new(Behavior::Answer(uuid)), false),
        ]
        .into();

        let found = engine
            .deferred(entries, NameLookup(PlayerName::new("A248")), None)
            .await;
        assert_eq!(found, Some(uuid));

        let failures = host.failures.lock().unwrap();
        assert_eq!(failures.len(), 2);
        assert_eq!(
            failures[0],
            "Resolver 'Unnamed' from plugin1 v1.0 encountered an error while resolving a UUID or name"
        );
        assert!(failures[1].starts_with("Resolver 'Crashy' from plugin2 v1.0"));
    }

    #[tokio::test]
    async fn test_skip_excludes_one_registration() {
        let host = Arc::new(RecordingHost::default());
        let engine = ResolutionEngine::new(host, false);
        let skipped = Scripted::new(Behavior::Answer(Uuid::new_v4()));

        let entries: ResolverList = vec![entry(1, "skipped", skipped.clone(), false)].into();
        let found = engine
            .deferred(
                entries,
                NameLookup(PlayerName::new("A248")),
                Some(RegistrationId::from_raw(1)),
            )
            .await;

        assert_eq!(found, None);
        assert_eq!(skipped.deferred_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_mutual_update_hints_missed_resolvers() {
        let host = Arc::new(RecordingHost::default());
        let engine = ResolutionEngine::new(host, true);
        let uuid = Uuid::new_v4();
        let missed = Scripted::new(Behavior::Miss);
        let plain_miss = Scripted::new(Behavior::Miss);
        let winner = Scripted::new(Behavior::Answer(uuid));

        let entries: ResolverList = vec![
            entry(1, "missed", missed.clone(), true),
            entry(2, "plain", plain_miss.clone(), false),
            entry(3, "winner", winner.clone(), true),
        ]
        .into();

        let found = engine
            .deferred(entries, NameLookup(PlayerName::new("A248")), None)
            .await;
        assert_eq!(found, Some(uuid));

        assert_eq!(
            *missed.hints.lock().unwrap(),
            vec![(uuid, "A248".to_string(), false)]
        );
        assert!(winner.hints.lock().unwrap().is_empty());
    }

    #[test]
    fn test_immediate_panic_is_isolated() {
        struct Exploding;

        impl UuidResolver for Exploding {
            fn resolve_name_immediately(&self, _name: &PlayerName) -> Option<Uuid> {
                panic!("cache poisoned")
            }

            fn resolve_uuid_immediately(&self, _uuid: Uuid) -> Option<String> {
                None
            }
        }

        let host = Arc::new(RecordingHost::default());
        let engine = ResolutionEngine::new(host.clone(), false);
        let entries = vec![Arc::new(ResolverEntry::new(
            RegistrationId::from_raw(1),
            OwnerId::new("exploding"),
            Priority::HIGHEST,
            "Exploding".into(),
            Arc::new(Exploding),
            None,
        ))];

        let found = engine.immediately(&entries, &NameLookup(PlayerName::new("A248")), None);
        assert_eq!(found, None);
        assert_eq!(host.failures.lock().unwrap().len(), 1);
    }
}
