//! Language identifiers.
//!
//! Codes are passed to the oracle as-is; the client never validates them.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const CATALAN: &str = "cat_Latn";
pub const SPANISH: &str = "spa_Latn";
pub const ENGLISH: &str = "eng_Latn";

/// Language codes the reference translation backend accepts.
pub const KNOWN_LANGUAGES: &[&str] = &[CATALAN, SPANISH, ENGLISH];

/// Opaque language identifier (e.g. `cat_Latn`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Language(String);

impl Language {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Language {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

/// Source and target language. Equal values are allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguagePair {
    pub source: Language,
    pub target: Language,
}

impl LanguagePair {
    pub fn new(source: Language, target: Language) -> Self {
        Self { source, target }
    }

    pub fn swap(&mut self) {
        std::mem::swap(&mut self.source, &mut self.target);
    }
}
