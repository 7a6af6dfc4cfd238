//! Verified Translate - machine translation you can check
//!
//! A browser client for a translation service that can attach a certificate
//! ("proof of correct translation") to each result:
//! - Request translations, optionally in verified mode
//! - Track whether the text on screen still matches its certificate
//! - Export certificates as portable proof packages and re-import them
//! - Re-check any text/certificate pair with the verification service
//!
//! # Architecture
//!
//! 1. The UI sends [`app::UiEvent`]s to an [`App`]
//! 2. The [`Session`] changes; translation goes through the [`oracle::Oracle`]
//! 3. The [`seal`] lifecycle decides whether the certificate still holds
//! 4. The UI redraws from the [`app::Frame`] it is handed

pub mod app;
pub mod certificate;
pub mod config;
pub mod exchange;
pub mod language;
pub mod oracle;
pub mod orchestrator;
pub mod prefs;
pub mod seal;
pub mod session;
pub mod verify;

// WASM bindings (only compiled when wasm feature is enabled)
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export main types
pub use app::App;
pub use certificate::{Certificate, ProofPackage};
pub use config::ClientConfig;
pub use language::{Language, LanguagePair};
pub use seal::TrustSeal;
pub use session::Session;
