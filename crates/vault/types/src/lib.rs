//! UUID Vault Types - Core types shared by resolvers and the registry
//!
//! This crate provides the vocabulary every other vault crate speaks:
//!
//! - **Identifiers**: [`OwnerId`] for the registering component and
//!   [`RegistrationId`] for a single registration
//! - **Player names**: [`PlayerName`], compared case-insensitively
//! - **Priorities**: [`Priority`] with the conventional scale constants
//! - **UUID helpers**: short/long text forms and byte conversions
//! - **Errors**: [`ResolverError`] raised by resolver backends

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod error;
pub mod ids;
pub mod name;
pub mod priority;
pub mod uuid_util;

// Re-exports
pub use error::{ResolverError, UuidFormatError};
pub use ids::{OwnerId, RegistrationId};
pub use name::{PlayerName, DEFAULT_MAX_NAME_LENGTH};
pub use priority::Priority;
pub use uuid::Uuid;
