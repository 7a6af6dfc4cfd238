//! Session state for one page lifetime.
//!
//! Everything here is synchronous and free of I/O. The translation cycle is
//! split into [`Session::begin_translation`] and
//! [`Session::finish_translation`] so the network call can happen between
//! them without holding the session.

use serde::Serialize;

use crate::certificate::Certificate;
use crate::language::{Language, LanguagePair};
use crate::oracle::{OracleError, TranslateRequest, TranslateResponse};
use crate::seal::{CertificateLifecycle, TrustSeal};

/// Default text of the target pane before any translation.
pub const PLACEHOLDER: &str = "Translation will appear here";

/// Default text of the target pane when the translation oracle fails.
pub const TRANSLATION_ERROR: &str =
    "Error: Could not connect to the translation server. Please ensure the backend is running.";

/// Contents of the (editable) translation surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetPane {
    Placeholder,
    Text(String),
    /// The last translation request failed.
    Failed,
}

impl TargetPane {
    /// The real text, if any. Placeholders and errors have none.
    pub fn text(&self) -> &str {
        match self {
            TargetPane::Text(text) => text,
            TargetPane::Placeholder | TargetPane::Failed => "",
        }
    }
}

/// Working/idle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Translating,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::Idle => "Ready",
            Phase::Translating => "Translating...",
        }
    }
}

/// Proof that a translation was begun. Consumed by
/// [`Session::finish_translation`].
#[derive(Debug)]
#[must_use = "a pending translation must be finished or the session stays busy"]
pub struct PendingTranslation {
    request: TranslateRequest,
}

impl PendingTranslation {
    pub fn request(&self) -> &TranslateRequest {
        &self.request
    }
}

/// Result of trying to start a translation.
#[derive(Debug)]
pub enum Begin {
    /// A request is already in flight; nothing changed.
    Busy,
    /// The source was empty; the display and certificate were cleared.
    Cleared,
    /// Send this request, then finish with the result.
    Dispatch(PendingTranslation),
}

/// What a `translate()` call ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslateOutcome {
    Busy,
    Cleared,
    Translated {
        elapsed_ms: u64,
        certificate_id: Option<String>,
    },
    Failed(OracleError),
}

/// The single mutable record behind the UI.
#[derive(Debug, Clone)]
pub struct Session {
    languages: LanguagePair,
    verified_mode: bool,
    phase: Phase,
    source_text: String,
    target: TargetPane,
    elapsed_ms: Option<u64>,
    certificate: CertificateLifecycle,
}

impl Session {
    pub fn new(languages: LanguagePair) -> Self {
        Self {
            languages,
            verified_mode: false,
            phase: Phase::Idle,
            source_text: String::new(),
            target: TargetPane::Placeholder,
            elapsed_ms: None,
            certificate: CertificateLifecycle::new(),
        }
    }

    pub fn languages(&self) -> &LanguagePair {
        &self.languages
    }

    pub fn verified_mode(&self) -> bool {
        self.verified_mode
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_translating(&self) -> bool {
        self.phase == Phase::Translating
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn target(&self) -> &TargetPane {
        &self.target
    }

    pub fn elapsed_ms(&self) -> Option<u64> {
        self.elapsed_ms
    }

    pub fn last_certificate(&self) -> Option<&Certificate> {
        self.certificate.certificate()
    }

    pub fn seal(&self) -> &TrustSeal {
        self.certificate.seal()
    }

    /// Changing either language breaks the pairing a certificate covers.
    pub fn set_source_language(&mut self, language: Language) {
        if self.languages.source != language {
            self.languages.source = language;
            self.certificate.invalidate();
        }
    }

    pub fn set_target_language(&mut self, language: Language) {
        if self.languages.target != language {
            self.languages.target = language;
            self.certificate.invalidate();
        }
    }

    pub fn set_verified_mode(&mut self, enabled: bool) {
        self.verified_mode = enabled;
        if !enabled {
            self.certificate.revoke();
        }
    }

    /// Replace the source text. Invalidates a held certificate.
    pub fn edit_source(&mut self, text: impl Into<String>) {
        self.source_text = text.into();
        self.certificate.invalidate();
    }

    /// Replace the displayed translation. Invalidates a held certificate.
    pub fn edit_target(&mut self, text: impl Into<String>) {
        self.target = TargetPane::Text(text.into());
        self.certificate.invalidate();
    }

    /// Exchange languages and texts in one step, discarding any certificate.
    pub fn swap_languages(&mut self) {
        self.languages.swap();

        let new_source = self.target.text().to_string();
        let old_source = std::mem::replace(&mut self.source_text, new_source);
        self.target = if old_source.is_empty() {
            TargetPane::Placeholder
        } else {
            TargetPane::Text(old_source)
        };

        self.elapsed_ms = None;
        self.certificate.reset();
    }

    pub fn clear(&mut self) {
        self.source_text.clear();
        self.target = TargetPane::Placeholder;
        self.elapsed_ms = None;
        self.certificate.reset();
    }

    /// Guarded start of a translation.
    pub fn begin_translation(&mut self) -> Begin {
        if self.is_translating() {
            return Begin::Busy;
        }

        let text = self.source_text.trim();
        if text.is_empty() {
            self.target = TargetPane::Placeholder;
            self.elapsed_ms = None;
            self.certificate.reset();
            return Begin::Cleared;
        }

        let request = TranslateRequest {
            text: text.to_string(),
            src_lang: self.languages.source.clone(),
            tgt_lang: self.languages.target.clone(),
            verified_mode: self.verified_mode,
        };

        self.phase = Phase::Translating;
        self.certificate.begin(self.verified_mode);

        Begin::Dispatch(PendingTranslation { request })
    }

    /// Apply the oracle's answer and return to idle.
    pub fn finish_translation(
        &mut self,
        pending: PendingTranslation,
        result: Result<TranslateResponse, OracleError>,
    ) -> TranslateOutcome {
        let PendingTranslation { request } = pending;
        self.phase = Phase::Idle;

        match result {
            Ok(response) => {
                self.target = TargetPane::Text(response.translated_text);
                self.elapsed_ms = Some(response.time_ms);
                self.certificate
                    .settle(response.verification, self.verified_mode && request.verified_mode);

                TranslateOutcome::Translated {
                    elapsed_ms: response.time_ms,
                    certificate_id: self.last_certificate().map(|c| c.id().to_string()),
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "translation failed");
                self.target = TargetPane::Failed;
                self.certificate.abandon();
                TranslateOutcome::Failed(err)
            }
        }
    }
}
