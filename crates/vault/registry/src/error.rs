//! Registry error types

use thiserror::Error;
use vault_types::{OwnerId, RegistrationId};

/// Why a resolver registration did not produce a handle
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegisterError {
    /// The owner already has an active registration. Not a programmer error;
    /// callers are expected to check for it.
    #[error("Owner already has a registered resolver: {0}")]
    AlreadyRegistered(OwnerId),

    /// The host does not recognise the owner identity.
    #[error("Invalid owner identity: {0}")]
    InvalidOwner(OwnerId),

    /// Startup has completed and the vault rejects late registrations.
    #[error("Vault is not accepting registrations")]
    NotAccepting,
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Vault errors
#[derive(Debug, Error)]
pub enum VaultError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("A vault is already installed")]
    AlreadyInstalled,

    #[error("Registration belongs to a different vault: {0}")]
    ForeignRegistration(RegistrationId),

    #[error("No tokio runtime available: {0}")]
    NoRuntime(String),
}

/// Result type for vault operations
pub type VaultResult<T> = std::result::Result<T, VaultError>;
