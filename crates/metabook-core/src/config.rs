//! Book configuration.
//!
//! Read once at construction. The configuration file may carry other tables;
//! only `[book]` is read here.
//!
//! ```toml
//! [book]
//! enabled = true
//! provableType = "|-"
//! ```

use serde::{Deserialize, Serialize};

/// Statement type marking theorems, logic axioms, and logical hypotheses.
pub const DEFAULT_PROVABLE_TYPE: &str = "|-";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid book configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("provable statement type must not be empty")]
    EmptyProvableType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BookConfig {
    /// When false the book keeps no data and every operation is a no-op.
    pub enabled: bool,
    pub provable_type: String,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            provable_type: DEFAULT_PROVABLE_TYPE.to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    book: BookConfig,
}

impl BookConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Parse the `[book]` table of a TOML document; missing keys take defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(text)?;
        file.book.validated()
    }

    fn validated(self) -> Result<Self, ConfigError> {
        if self.provable_type.trim().is_empty() {
            return Err(ConfigError::EmptyProvableType);
        }
        Ok(self)
    }
}
