//! TOML configuration for group parameters and protocol options.
//!
//! ```toml
//! [group]
//! preset = "custom"
//! modulus = "7fffffffffffffffffffffffffffffff"
//! generator = "5"
//!
//! [protocol]
//! disclosure = "mutual"
//! exchange_timeout_ms = 30000
//! ```

use crate::error::{PsiError, Result};
use crate::group::GroupParameters;
use crate::protocol::Disclosure;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Receive timeout used when none is configured.
pub const DEFAULT_EXCHANGE_TIMEOUT: Duration = Duration::from_secs(30);

/// Runtime options for one protocol run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolConfig {
    pub disclosure: Disclosure,
    /// How long a blocking receive may wait before the run is abandoned.
    /// `None` waits indefinitely.
    pub exchange_timeout: Option<Duration>,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            disclosure: Disclosure::default(),
            exchange_timeout: Some(DEFAULT_EXCHANGE_TIMEOUT),
        }
    }
}

/// Named group choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GroupPreset {
    /// `GroupParameters::demo`, undersized.
    Demo,
    /// `GroupParameters::modp_2048`.
    #[default]
    #[serde(rename = "modp-2048")]
    Modp2048,
    /// Explicit `modulus` and `generator`.
    Custom,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GroupSection {
    pub preset: GroupPreset,
    /// Hex modulus, required for `custom`.
    pub modulus: Option<String>,
    /// Hex generator, required for `custom`.
    pub generator: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProtocolSection {
    pub disclosure: Disclosure,
    pub exchange_timeout_ms: Option<u64>,
}

/// Top-level configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PsiConfig {
    pub group: GroupSection,
    pub protocol: ProtocolSection,
}

impl PsiConfig {
    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| PsiError::Config(e.to_string()))
    }

    /// Read and parse a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| PsiError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    /// Build and validate the configured group.
    ///
    /// # Errors
    /// Returns `PsiError::Config` if a custom group is missing a field, and
    /// `PsiError::InvalidGroup` if the group fails validation.
    pub fn group_parameters(&self) -> Result<GroupParameters> {
        let params = match self.group.preset {
            GroupPreset::Demo => GroupParameters::demo(),
            GroupPreset::Modp2048 => GroupParameters::modp_2048(),
            GroupPreset::Custom => {
                let modulus = self.group.modulus.as_deref().ok_or_else(|| {
                    PsiError::Config("custom group requires `modulus`".to_string())
                })?;
                let generator = self.group.generator.as_deref().ok_or_else(|| {
                    PsiError::Config("custom group requires `generator`".to_string())
                })?;
                return GroupParameters::from_hex(modulus, generator);
            }
        };
        params.validate()?;
        Ok(params)
    }

    pub fn protocol_config(&self) -> ProtocolConfig {
        ProtocolConfig {
            disclosure: self.protocol.disclosure,
            exchange_timeout: Some(
                self.protocol
                    .exchange_timeout_ms
                    .map_or(DEFAULT_EXCHANGE_TIMEOUT, Duration::from_millis),
            ),
        }
    }
}
