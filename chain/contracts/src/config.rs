//! Vault configuration

use custody_types::numeric::{MAX_SCALE, UNIT_SCALE};
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Configuration for a `SecureVault`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Decimal places of the smallest transferable fraction.
    pub unit_scale: u32,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            unit_scale: UNIT_SCALE,
        }
    }
}

impl VaultConfig {
    /// Parse and validate a JSON config. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.unit_scale > MAX_SCALE {
            return Err(ConfigError::InvalidScale {
                scale: self.unit_scale,
                max: MAX_SCALE,
            });
        }
        Ok(())
    }
}
