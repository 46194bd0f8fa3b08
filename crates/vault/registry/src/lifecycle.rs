//! Startup lifecycle gate
//!
//! Until the host signals that startup completed, every query builds a fresh
//! ordered list from the registry. Afterwards the gate serves a cached list
//! and rebuilds it only when the registry generation moved on.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use tracing::debug;

use crate::registry::{ResolverList, ResolverRegistry};

/// Lifecycle state of a vault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Plugins are still loading.
    Accepting,

    /// Startup completed; queries use the frozen list.
    Frozen,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleState::Accepting => write!(f, "accepting"),
            LifecycleState::Frozen => write!(f, "frozen"),
        }
    }
}

struct FrozenList {
    /// Registry generation observed before the list was built.
    generation: u64,
    entries: ResolverList,
}

pub struct LifecycleGate {
    frozen: AtomicBool,
    list: ArcSwapOption<FrozenList>,
}

impl LifecycleGate {
    pub fn new() -> Self {
        Self {
            frozen: AtomicBool::new(false),
            list: ArcSwapOption::empty(),
        }
    }

    pub fn state(&self) -> LifecycleState {
        if self.is_frozen() {
            LifecycleState::Frozen
        } else {
            LifecycleState::Accepting
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }

    /// Transition to [`LifecycleState::Frozen`] and build the frozen list.
    ///
    /// Returns `false` if the gate was already frozen.
    pub fn freeze(&self, registry: &ResolverRegistry) -> bool {
        if self
            .frozen
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        self.rebuild(registry);
        true
    }

    /// The list queries should iterate right now.
    pub fn effective(&self, registry: &ResolverRegistry) -> ResolverList {
        if !self.is_frozen() {
            return registry.snapshot();
        }

        let current = registry.generation();
        if let Some(frozen) = &*self.list.load() {
            if frozen.generation == current {
                return frozen.entries.clone();
            }
        }
        self.rebuild(registry)
    }

    fn rebuild(&self, registry: &ResolverRegistry) -> ResolverList {
        // Read the generation first: a mutation racing with the snapshot
        // leaves the stored generation behind, forcing another rebuild.
        let generation = registry.generation();
        let entries = registry.snapshot();

        debug!(
            generation = generation,
            resolvers = entries.len(),
            "Rebuilt frozen resolver list"
        );

        self.list.store(Some(Arc::new(FrozenList {
            generation,
            entries: entries.clone(),
        })));
        entries
    }
}

impl Default for LifecycleGate {
    fn default() -> Self {
        Self::new()
    }
}
