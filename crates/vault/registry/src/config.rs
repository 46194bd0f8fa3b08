//! Vault configuration
//!
//! Loaded from TOML. Every field has a default, so an absent file or an
//! empty table yields [`VaultConfig::default`].

use std::path::Path;

use serde::{Deserialize, Serialize};
use vault_types::DEFAULT_MAX_NAME_LENGTH;

use crate::error::ConfigError;

/// What happens to registrations that arrive after startup completed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LateRegistrationPolicy {
    /// Accept them; the frozen resolver list is rebuilt on the next query.
    #[default]
    Accept,

    /// Reject them with [`RegisterError::NotAccepting`](crate::RegisterError::NotAccepting).
    Reject,
}

/// Configuration for a [`UuidVault`](crate::UuidVault)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Names longer than this are never looked up.
    pub max_name_length: usize,

    /// Push hints to resolvers that missed a deferred query once another
    /// resolver answers it.
    pub mutual_update: bool,

    /// Registration policy once startup has completed.
    pub late_registrations: LateRegistrationPolicy,

    /// Consult the host's own player lookup before registered resolvers.
    pub consult_native: bool,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            max_name_length: DEFAULT_MAX_NAME_LENGTH,
            mutual_update: false,
            late_registrations: LateRegistrationPolicy::Accept,
            consult_native: true,
        }
    }
}

impl VaultConfig {
    /// Load configuration from a TOML file.
    ///
    /// `None` or a missing file gives the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: VaultConfig =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_name_length == 0 {
            return Err(ConfigError::Invalid(
                "max_name_length must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
