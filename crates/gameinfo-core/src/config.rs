use std::path::Path;

use serde::Deserialize;

use crate::codec::{MAX_MESSAGE_SIZE, MIN_MESSAGE_SIZE};
use crate::native::StringPolicy;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "gameinfo.toml";

/// Boundary configuration, loaded from `gameinfo.toml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BoundaryConfig {
    pub codec: CodecConfig,
    pub native: NativeConfig,
}

/// Wire codec limits.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Largest encoded record accepted or produced, including the version byte.
    pub max_message_size: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_message_size: MAX_MESSAGE_SIZE,
        }
    }
}

/// Native mirror behavior.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NativeConfig {
    pub string_policy: StringPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Parse(String),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "config parse error: {e}"),
            Self::Invalid(e) => write!(f, "invalid config: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl BoundaryConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.codec.max_message_size < MIN_MESSAGE_SIZE {
            tracing::error!(
                max_message_size = self.codec.max_message_size,
                "codec.max_message_size is too small to hold an empty record"
            );
            return Err(ConfigError::Invalid(format!(
                "codec.max_message_size must be at least {MIN_MESSAGE_SIZE}"
            )));
        }
        Ok(())
    }

    /// Load `gameinfo.toml` from the working directory if present, then apply
    /// `GAMEINFO_*` environment overrides.
    pub fn load() -> Self {
        Self::load_from(CONFIG_FILE)
    }

    /// Like [`BoundaryConfig::load`], with an explicit file path. A missing or
    /// malformed file, or a result that fails [`BoundaryConfig::validate`],
    /// falls back to defaults.
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        Self::load_with(path.as_ref(), |key| std::env::var(key).ok())
    }

    fn load_with<F>(path: &Path, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match std::fs::read_to_string(path) {
            Ok(content) => match Self::from_toml_str(&content) {
                Ok(cfg) => {
                    tracing::info!(path = %path.display(), "Loaded boundary configuration");
                    cfg
                },
                Err(e) => {
                    tracing::warn!(path = %path.display(), "{e}, using defaults");
                    Self::default()
                },
            },
            Err(_) => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                Self::default()
            },
        };
        config.apply_overrides(lookup);
        if let Err(e) = config.validate() {
            tracing::warn!(path = %path.display(), "{e}, using defaults");
            return Self::default();
        }
        config
    }

    /// Apply overrides from a key lookup (the environment, in [`BoundaryConfig::load`]).
    /// Unparseable values are ignored with a warning.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("GAMEINFO_MAX_MESSAGE_SIZE") {
            match val.trim().parse::<usize>() {
                Ok(n) => self.codec.max_message_size = n,
                Err(_) => tracing::warn!(value = %val, "ignoring invalid GAMEINFO_MAX_MESSAGE_SIZE"),
            }
        }
        if let Some(val) = lookup("GAMEINFO_STRING_POLICY")
            && !val.is_empty()
        {
            match val.parse::<StringPolicy>() {
                Ok(policy) => self.native.string_policy = policy,
                Err(e) => tracing::warn!("ignoring GAMEINFO_STRING_POLICY: {e}"),
            }
        }
    }
}
