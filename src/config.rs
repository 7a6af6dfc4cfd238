//! Client configuration.
//!
//! Every field has a default, so an empty document is a valid config.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::language::{Language, LanguagePair, CATALAN, ENGLISH};
use crate::session::{PLACEHOLDER, TRANSLATION_ERROR};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Oracle base URL. Empty means same origin.
    pub base_url: String,
    pub default_source_language: Language,
    pub default_target_language: Language,
    /// Text shown in the target pane before any translation.
    pub placeholder: String,
    /// Text shown in the target pane when translation fails.
    pub translation_error: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            default_source_language: CATALAN.into(),
            default_target_language: ENGLISH.into(),
            placeholder: PLACEHOLDER.to_string(),
            translation_error: TRANSLATION_ERROR.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid client config (TOML)")
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(text).context("invalid client config (JSON)")
    }

    pub fn default_languages(&self) -> LanguagePair {
        LanguagePair::new(
            self.default_source_language.clone(),
            self.default_target_language.clone(),
        )
    }
}
