//! Independent verification of a translation against a certificate.
//!
//! The dialog here is deliberately detached from the session: whatever the
//! user puts in its three fields is what gets checked, and the outcome never
//! feeds back into the held certificate.

use serde::Serialize;

use crate::exchange::ImportedProof;
use crate::language::LanguagePair;
use crate::oracle::{Oracle, VerifyRequest};
use crate::session::Session;

pub const INVALID_CERTIFICATE_JSON: &str = "invalid certificate JSON";
pub const CONNECTION_ERROR: &str = "connection error";

/// Pass/fail message shown under the dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationResult {
    pub success: bool,
    pub message: String,
}

impl VerificationResult {
    fn failure(message: &str) -> Self {
        Self {
            success: false,
            message: message.to_string(),
        }
    }

    /// Message with its pass/fail glyph.
    pub fn display(&self) -> String {
        let glyph = if self.success { '✓' } else { '✗' };
        format!("{glyph} {}", self.message)
    }
}

/// Send a certificate and the texts it should cover to the verifier.
///
/// Never fails: parse and network problems come back as unsuccessful results.
pub async fn submit_verification<O: Oracle + ?Sized>(
    oracle: &O,
    languages: &LanguagePair,
    src_text: &str,
    tgt_text: &str,
    certificate_json: &str,
) -> VerificationResult {
    let proof_data: serde_json::Value = match serde_json::from_str(certificate_json) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(error = %e, "certificate field is not JSON");
            return VerificationResult::failure(INVALID_CERTIFICATE_JSON);
        }
    };

    let request = VerifyRequest {
        src_text: src_text.to_string(),
        tgt_text: tgt_text.to_string(),
        src_lang: languages.source.clone(),
        tgt_lang: languages.target.clone(),
        proof_data,
    };

    match oracle.verify(&request).await {
        Ok(response) => {
            tracing::info!(success = response.success, "verification answered");
            VerificationResult {
                success: response.success,
                message: response.message,
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "verification request failed");
            VerificationResult::failure(CONNECTION_ERROR)
        }
    }
}

/// Fields of the verification dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VerifyDialog {
    pub open: bool,
    pub source: String,
    pub target: String,
    pub certificate_json: String,
    pub result: Option<VerificationResult>,
}

impl VerifyDialog {
    /// Open pre-filled from the session. Only possible while a certificate is
    /// held; returns `false` otherwise.
    pub fn open_from(&mut self, session: &Session) -> bool {
        let Some(certificate) = session.last_certificate() else {
            return false;
        };

        self.open = true;
        self.source = session.source_text().to_string();
        self.target = session.target().text().to_string();
        self.certificate_json = certificate.to_pretty_json();
        self.result = None;
        true
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Fill fields from an uploaded file. A bare certificate leaves the
    /// texts as the user typed them.
    pub fn apply_import(&mut self, imported: ImportedProof) {
        self.open = true;
        let certificate = match imported {
            ImportedProof::Package {
                source,
                translation,
                certificate,
            } => {
                self.source = source;
                self.target = translation;
                certificate
            }
            ImportedProof::BareCertificate(certificate) => certificate,
        };
        self.certificate_json =
            serde_json::to_string_pretty(&certificate).unwrap_or_else(|_| certificate.to_string());
    }
}
