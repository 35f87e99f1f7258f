#![forbid(unsafe_code)]

//! Appearance controller configuration.
//!
//! [`ThemeConfig`] can be built in code or, with the `theme-config`
//! feature, loaded from TOML or JSON:
//!
//! ```toml
//! # nova-theme.toml
//! storage_key = "nova.appearance"
//! default_mode = "dark"
//! persist_resolved_mode = true
//! event_name = "nova:appearance-change"
//! ```
//!
//! ```rust,ignore
//! let config = ThemeConfig::from_toml_file("nova-theme.toml")?;
//! ```
//!
//! Every field has a default, so a partial file only overrides what it
//! names.

#[cfg(feature = "theme-config")]
use std::path::Path;

#[cfg(feature = "theme-config")]
use serde::{Deserialize, Serialize};

use nova_style::AppearanceMode;

/// Default storage key for the persisted mode.
pub const DEFAULT_STORAGE_KEY: &str = "nova.appearance";
/// Default name of the browser change event.
pub const DEFAULT_EVENT_NAME: &str = "nova:appearance-change";

/// Tunable controller settings.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "theme-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "theme-config", serde(default))]
pub struct ThemeConfig {
    /// Key under which the mode is persisted. Default: `nova.appearance`.
    pub storage_key: String,
    /// Mode used when neither storage nor the OS decide. Default: dark.
    pub default_mode: AppearanceMode,
    /// Write the mode resolved at startup back to storage when none was
    /// stored. While true, the first launch pins the mode and later OS
    /// changes are ignored until the preference is cleared. Default: true.
    pub persist_resolved_mode: bool,
    /// Name of the change event dispatched by browser hosts.
    /// Default: `nova:appearance-change`.
    pub event_name: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            default_mode: AppearanceMode::Dark,
            persist_resolved_mode: true,
            event_name: DEFAULT_EVENT_NAME.to_string(),
        }
    }
}

impl ThemeConfig {
    #[must_use]
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    #[must_use]
    pub fn with_default_mode(mut self, mode: AppearanceMode) -> Self {
        self.default_mode = mode;
        self
    }

    #[must_use]
    pub fn with_persist_resolved_mode(mut self, persist: bool) -> Self {
        self.persist_resolved_mode = persist;
        self
    }

    #[must_use]
    pub fn with_event_name(mut self, name: impl Into<String>) -> Self {
        self.event_name = name.into();
        self
    }

    /// Load from a TOML string.
    #[cfg(feature = "theme-config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ThemeConfigError> {
        let config: Self = toml::from_str(s).map_err(ThemeConfigError::Toml)?;
        config.validated()
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "theme-config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ThemeConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ThemeConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "theme-config")]
    pub fn from_json_str(s: &str) -> Result<Self, ThemeConfigError> {
        let config: Self = serde_json::from_str(s).map_err(ThemeConfigError::Json)?;
        config.validated()
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "theme-config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ThemeConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ThemeConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Check field constraints. An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.storage_key.trim().is_empty() {
            errors.push("storage_key must not be empty".into());
        } else if self.storage_key.chars().any(char::is_whitespace) {
            errors.push(format!(
                "storage_key must not contain whitespace, got {:?}",
                self.storage_key
            ));
        }

        if self.event_name.trim().is_empty() {
            errors.push("event_name must not be empty".into());
        }

        errors
    }

    /// `self` if valid, otherwise [`ThemeConfigError::Validation`].
    pub fn validated(self) -> Result<Self, ThemeConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ThemeConfigError::Validation(errors))
        }
    }
}

/// Errors that can occur when loading a [`ThemeConfig`].
#[derive(Debug)]
pub enum ThemeConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "theme-config")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "theme-config")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ThemeConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "theme-config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "theme-config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ThemeConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "theme-config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "theme-config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = ThemeConfig::default();
        assert!(config.validate().is_empty());
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
        assert_eq!(config.default_mode, AppearanceMode::Dark);
        assert!(config.persist_resolved_mode);
    }

    #[test]
    fn builder_methods_override_fields() {
        let config = ThemeConfig::default()
            .with_storage_key("mission.theme")
            .with_default_mode(AppearanceMode::Light)
            .with_persist_resolved_mode(false)
            .with_event_name("mission:theme");
        assert_eq!(config.storage_key, "mission.theme");
        assert_eq!(config.default_mode, AppearanceMode::Light);
        assert!(!config.persist_resolved_mode);
        assert_eq!(config.event_name, "mission:theme");
    }

    #[test]
    fn empty_storage_key_rejected() {
        let errors = ThemeConfig::default().with_storage_key("  ").validate();
        assert_eq!(errors, vec!["storage_key must not be empty".to_string()]);
    }

    #[test]
    fn whitespace_in_storage_key_rejected() {
        let err = ThemeConfig::default()
            .with_storage_key("nova theme")
            .validated()
            .unwrap_err();
        assert!(matches!(err, ThemeConfigError::Validation(ref e) if e.len() == 1));
        assert!(err.to_string().contains("whitespace"));
    }

    #[test]
    fn empty_event_name_rejected() {
        let errors = ThemeConfig::default().with_event_name("").validate();
        assert_eq!(errors.len(), 1);
    }
}
