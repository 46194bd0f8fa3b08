//! UUID Vault Registry - Resolver registry and resolution engine
//!
//! Plugins register resolvers that map player names to UUIDs and back.
//! Callers query one [`UuidVault`], which consults the host's native player
//! lookup and then every registered resolver in priority order, returning
//! the first answer.
//!
//! - **Registry**: at most one resolver per owner, ordered by priority
//! - **Lifecycle gate**: freezes the resolver list once startup completes
//! - **Resolution engine**: immediate (in-memory) and deferred (chained)
//!   queries with per-resolver failure isolation
//! - **Exclusion views**: query everyone except one registration
//!
//! ## Hosting
//!
//! Platform adapters implement [`VaultHost`]. [`TokioHost`] covers
//! standalone use on a tokio runtime.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod config;
mod engine;
pub mod entry;
pub mod error;
pub mod exclusion;
pub mod host;
pub mod lifecycle;
pub mod registry;
pub mod resolution;
pub mod resolver;
pub mod vault;

// Re-exports
pub use config::{LateRegistrationPolicy, VaultConfig};
pub use entry::{ResolverEntry, UNNAMED_RESOLVER};
pub use error::{ConfigError, RegisterError, VaultError, VaultResult};
pub use exclusion::ExcludingResolver;
pub use host::{TokioHost, VaultHost};
pub use lifecycle::LifecycleState;
pub use registry::ResolverList;
pub use resolution::Resolution;
pub use resolver::{CollectiveResolver, Deferred, UpdatableResolver, UuidResolver};
pub use vault::{Registration, UuidVault, VaultSlot};
pub use vault_types::{OwnerId, PlayerName, Priority, RegistrationId, ResolverError, Uuid};
