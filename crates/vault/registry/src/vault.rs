//! The vault facade
//!
//! [`UuidVault`] is the single entry point plugins and callers use. It owns
//! the registry and lifecycle gate, consults the host's native player lookup
//! first, then falls through to the registered resolvers.

use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

use tokio::sync::oneshot;
use tracing::{info, warn};
use vault_types::{OwnerId, PlayerName, Priority, RegistrationId, Uuid};

use crate::config::{LateRegistrationPolicy, VaultConfig};
use crate::engine::{Lookup, NameLookup, ResolutionEngine, UuidLookup};
use crate::entry::ResolverEntry;
use crate::error::{RegisterError, VaultError, VaultResult};
use crate::exclusion::ExcludingResolver;
use crate::host::VaultHost;
use crate::lifecycle::{LifecycleGate, LifecycleState};
use crate::registry::{ResolverList, ResolverRegistry};
use crate::resolution::Resolution;
use crate::resolver::{CollectiveResolver, UpdatableResolver, UuidResolver};

pub(crate) struct VaultInner {
    config: VaultConfig,
    host: Arc<dyn VaultHost>,
    registry: ResolverRegistry,
    gate: LifecycleGate,
    engine: ResolutionEngine,
}

/// Name/UUID resolution vault.
///
/// Cloning is cheap and every clone refers to the same registry.
#[derive(Clone)]
pub struct UuidVault {
    inner: Arc<VaultInner>,
}

impl UuidVault {
    pub fn new(host: impl VaultHost, config: VaultConfig) -> VaultResult<Self> {
        Self::with_shared_host(Arc::new(host), config)
    }

    pub fn with_shared_host(host: Arc<dyn VaultHost>, config: VaultConfig) -> VaultResult<Self> {
        config.validate()?;
        Ok(Self::build(host, config))
    }

    /// Vault with the default configuration.
    pub fn with_host(host: impl VaultHost) -> Self {
        Self::build(Arc::new(host), VaultConfig::default())
    }

    fn build(host: Arc<dyn VaultHost>, config: VaultConfig) -> Self {
        let engine = ResolutionEngine::new(host.clone(), config.mutual_update);
        Self {
            inner: Arc::new(VaultInner {
                config,
                host,
                registry: ResolverRegistry::new(),
                gate: LifecycleGate::new(),
                engine,
            }),
        }
    }

    pub fn config(&self) -> &VaultConfig {
        &self.inner.config
    }

    /// Register a resolver for `owner`.
    ///
    /// Fails with [`RegisterError::AlreadyRegistered`] when the owner already
    /// has a registration; that registration stays active.
    pub fn register<R>(
        &self,
        resolver: Arc<R>,
        owner: OwnerId,
        priority: Priority,
        display_name: impl Into<String>,
    ) -> Result<Registration, RegisterError>
    where
        R: UuidResolver + 'static,
    {
        self.inner
            .register(owner, priority, display_name.into(), resolver, None)
            .map(|entry| Registration::new(&self.inner, &entry))
    }

    /// Register a resolver that also receives mapping hints.
    pub fn register_updatable<R>(
        &self,
        resolver: Arc<R>,
        owner: OwnerId,
        priority: Priority,
        display_name: impl Into<String>,
    ) -> Result<Registration, RegisterError>
    where
        R: UpdatableResolver + 'static,
    {
        let hints: Arc<dyn UpdatableResolver> = resolver.clone();
        self.inner
            .register(owner, priority, display_name.into(), resolver, Some(hints))
            .map(|entry| Registration::new(&self.inner, &entry))
    }

    /// Remove a registration. `false` if it was already removed or belongs
    /// to another vault.
    pub fn unregister(&self, registration: &Registration) -> bool {
        if !registration.belongs_to(&self.inner) {
            return false;
        }
        self.inner.unregister(&registration.owner, registration.id)
    }

    /// Signal that the host finished loading plugins.
    ///
    /// Freezes the resolver list. Returns `false` if startup had already
    /// completed.
    pub fn complete_startup(&self) -> bool {
        let frozen = self.inner.gate.freeze(&self.inner.registry);
        if frozen {
            info!(
                resolvers = self.inner.registry.len(),
                late_registrations = ?self.inner.config.late_registrations,
                "Startup completed, resolver list frozen"
            );
        }
        frozen
    }

    pub fn lifecycle_state(&self) -> LifecycleState {
        self.inner.gate.state()
    }

    pub fn is_started(&self) -> bool {
        self.inner.gate.is_frozen()
    }

    pub fn is_accepting_registrations(&self) -> bool {
        self.inner.is_accepting_registrations()
    }

    /// Resolvers in the order queries consult them.
    pub fn resolvers(&self) -> ResolverList {
        self.inner.effective()
    }

    pub fn registration_count(&self) -> usize {
        self.inner.registry.len()
    }

    /// Whether [`Self::resolve_natively_name`] and
    /// [`Self::resolve_natively_uuid`] must be called on the server's main
    /// thread. Not enforced by the vault.
    pub fn native_lookup_requires_main_thread(&self) -> bool {
        self.inner.host.native_lookup_requires_main_thread()
    }

    pub fn resolve_natively_name(&self, name: &PlayerName) -> Option<Uuid> {
        let lookup = NameLookup(name.clone());
        if !lookup.is_plausible(self.inner.config.max_name_length) {
            return None;
        }
        lookup.natively(self.inner.host.as_ref())
    }

    pub fn resolve_natively_uuid(&self, uuid: Uuid) -> Option<String> {
        UuidLookup(uuid).natively(self.inner.host.as_ref())
    }

    /// In-memory lookup across the native players and every resolver.
    /// Never blocks.
    pub fn resolve_name_immediately(&self, name: &PlayerName) -> Option<Uuid> {
        self.inner.immediately(&NameLookup(name.clone()), None)
    }

    pub fn resolve_uuid_immediately(&self, uuid: Uuid) -> Option<String> {
        self.inner.immediately(&UuidLookup(uuid), None)
    }

    /// Full lookup. The resolution always completes, with `None` when no
    /// resolver knows the name.
    pub fn resolve_name(&self, name: &PlayerName) -> Resolution<Uuid> {
        self.inner.resolve(NameLookup(name.clone()), None)
    }

    pub fn resolve_uuid(&self, uuid: Uuid) -> Resolution<String> {
        self.inner.resolve(UuidLookup(uuid), None)
    }

    /// View of this vault that never consults `registration`'s resolver.
    ///
    /// Lets a resolver query everyone else without recursing into itself.
    pub fn create_excluding(&self, registration: &Registration) -> VaultResult<ExcludingResolver> {
        if !registration.belongs_to(&self.inner) {
            return Err(VaultError::ForeignRegistration(registration.id));
        }
        Ok(ExcludingResolver::new(self.inner.clone(), registration.id))
    }

    /// Suggest a mapping to every resolver that accepts hints.
    ///
    /// Delivery happens on the host scheduler. Returns how many resolvers
    /// were sent the hint.
    pub fn suggest(&self, uuid: Uuid, name: &str, force: bool) -> usize {
        let targets: Vec<Arc<ResolverEntry>> = self
            .inner
            .effective()
            .iter()
            .filter(|e| e.accepts_hints())
            .cloned()
            .collect();
        let count = targets.len();
        if count > 0 {
            self.inner
                .engine
                .broadcast(targets, uuid, name.to_string(), force);
        }
        count
    }
}

impl fmt::Debug for UuidVault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UuidVault")
            .field("state", &self.inner.gate.state())
            .field("registrations", &self.inner.registry.len())
            .field("config", &self.inner.config)
            .finish()
    }
}

impl CollectiveResolver for UuidVault {
    fn resolve_name_immediately(&self, name: &PlayerName) -> Option<Uuid> {
        UuidVault::resolve_name_immediately(self, name)
    }

    fn resolve_uuid_immediately(&self, uuid: Uuid) -> Option<String> {
        UuidVault::resolve_uuid_immediately(self, uuid)
    }

    fn resolve_name(&self, name: &PlayerName) -> Resolution<Uuid> {
        UuidVault::resolve_name(self, name)
    }

    fn resolve_uuid(&self, uuid: Uuid) -> Resolution<String> {
        UuidVault::resolve_uuid(self, uuid)
    }
}

impl VaultInner {
    fn is_accepting_registrations(&self) -> bool {
        !self.gate.is_frozen() || self.config.late_registrations == LateRegistrationPolicy::Accept
    }

    fn register(
        &self,
        owner: OwnerId,
        priority: Priority,
        display_name: String,
        resolver: Arc<dyn UuidResolver>,
        hints: Option<Arc<dyn UpdatableResolver>>,
    ) -> Result<Arc<ResolverEntry>, RegisterError> {
        if !self.is_accepting_registrations() {
            warn!(owner = %owner, "Registration refused, startup already completed");
            return Err(RegisterError::NotAccepting);
        }
        if !self.host.verify_owner(&owner) {
            warn!(owner = %owner, "Registration refused, owner identity not recognised");
            return Err(RegisterError::InvalidOwner(owner));
        }

        let entry = ResolverEntry::new(
            self.registry.issue_id(),
            owner,
            priority,
            display_name,
            resolver,
            hints,
        );

        match self.registry.insert(entry) {
            Ok(entry) => {
                info!(
                    owner = %entry.owner(),
                    id = %entry.id(),
                    priority = %entry.priority(),
                    resolver = entry.display_label(),
                    "Resolver registered"
                );
                Ok(entry)
            }
            Err(existing) => Err(RegisterError::AlreadyRegistered(existing.owner().clone())),
        }
    }

    fn unregister(&self, owner: &OwnerId, id: RegistrationId) -> bool {
        match self.registry.remove(owner, id) {
            Some(entry) => {
                info!(
                    owner = %entry.owner(),
                    id = %entry.id(),
                    resolver = entry.display_label(),
                    "Resolver unregistered"
                );
                true
            }
            None => false,
        }
    }

    fn effective(&self) -> ResolverList {
        self.gate.effective(&self.registry)
    }

    fn native_allowed(&self) -> bool {
        self.config.consult_native && self.host.native_lookup_allowed_here()
    }

    pub(crate) fn immediately<L: Lookup>(
        &self,
        lookup: &L,
        skip: Option<RegistrationId>,
    ) -> Option<L::Value> {
        if !lookup.is_plausible(self.config.max_name_length) {
            return None;
        }
        if self.native_allowed() {
            if let Some(value) = lookup.natively(self.host.as_ref()) {
                return Some(value);
            }
        }
        let entries = self.effective();
        self.engine.immediately(&entries, lookup, skip)
    }

    pub(crate) fn resolve<L: Lookup>(
        &self,
        lookup: L,
        skip: Option<RegistrationId>,
    ) -> Resolution<L::Value> {
        if !lookup.is_plausible(self.config.max_name_length) {
            return Resolution::not_found();
        }
        if self.native_allowed() {
            if let Some(value) = lookup.natively(self.host.as_ref()) {
                return Resolution::ready(Some(value));
            }
        }

        let entries = self.effective();
        if let Some(value) = self.engine.immediately(&entries, &lookup, skip) {
            return Resolution::ready(Some(value));
        }
        if entries.iter().all(|e| Some(e.id()) == skip) {
            return Resolution::not_found();
        }

        let (tx, rx) = oneshot::channel();
        let chain = self.engine.clone().deferred(entries, lookup, skip);
        self.host.schedule(Box::pin(async move {
            // The caller may have dropped the resolution
            let _ = tx.send(chain.await);
        }));
        Resolution::pending(rx)
    }
}

/// Handle to one registration. Unregisters exactly that registration, never
/// a newer one from the same owner.
#[derive(Clone)]
pub struct Registration {
    id: RegistrationId,
    owner: OwnerId,
    priority: Priority,
    vault: Weak<VaultInner>,
}

impl Registration {
    fn new(vault: &Arc<VaultInner>, entry: &ResolverEntry) -> Self {
        Self {
            id: entry.id(),
            owner: entry.owner().clone(),
            priority: entry.priority(),
            vault: Arc::downgrade(vault),
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

    /// Unregister through the vault this handle came from.
    pub fn unregister(&self) -> bool {
        match self.vault.upgrade() {
            Some(vault) => vault.unregister(&self.owner, self.id),
            None => false,
        }
    }

    fn belongs_to(&self, vault: &Arc<VaultInner>) -> bool {
        std::ptr::eq(self.vault.as_ptr(), Arc::as_ptr(vault))
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("id", &self.id)
            .field("owner", &self.owner)
            .field("priority", &self.priority)
            .finish()
    }
}

impl PartialEq for Registration {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && Weak::ptr_eq(&self.vault, &other.vault)
    }
}

impl Eq for Registration {}

/// Construct-once holder for the vault at the composition root.
#[derive(Default)]
pub struct VaultSlot {
    cell: OnceLock<UuidVault>,
}

impl VaultSlot {
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    /// Install the vault. Only the first call succeeds.
    pub fn install(&self, vault: UuidVault) -> VaultResult<&UuidVault> {
        let mut installed = false;
        let current = self.cell.get_or_init(|| {
            installed = true;
            vault
        });
        if installed {
            Ok(current)
        } else {
            Err(VaultError::AlreadyInstalled)
        }
    }

    pub fn get(&self) -> Option<&UuidVault> {
        self.cell.get()
    }
}
