//! Proof package export and import.

use serde_json::Value;

use crate::certificate::ProofPackage;
use crate::session::Session;

/// Message shown when an uploaded file is not JSON.
pub const MALFORMED_FILE: &str = "malformed file";

#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    #[error("malformed file: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A proof package ready to be offered as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedPackage {
    pub filename: String,
    pub contents: String,
}

/// What an uploaded file turned out to contain.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportedProof {
    /// A full package: fills source, translation and certificate.
    Package {
        source: String,
        translation: String,
        certificate: Value,
    },
    /// Anything else: treated as the certificate alone.
    BareCertificate(Value),
}

/// Bundle the displayed texts with the held certificate.
///
/// Returns `None` when no certificate is held.
pub fn export_package(session: &Session) -> Option<ExportedPackage> {
    let certificate = session.last_certificate()?.clone();
    let package = ProofPackage {
        source: session.source_text().to_string(),
        translation: session.target().text().to_string(),
        certificate,
    };

    let contents = match serde_json::to_string_pretty(&package) {
        Ok(contents) => contents,
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize proof package");
            return None;
        }
    };

    let filename = package.filename();
    tracing::info!(%filename, "exporting proof package");
    Some(ExportedPackage { filename, contents })
}

/// Parse an uploaded package or bare certificate.
pub fn import_package(raw: &[u8]) -> Result<ImportedProof, ExchangeError> {
    let value: Value = serde_json::from_slice(raw)?;

    let imported = match value {
        Value::Object(mut fields)
            if fields.get("source").is_some_and(Value::is_string)
                && fields.get("translation").is_some_and(Value::is_string)
                && fields.contains_key("certificate") =>
        {
            let take_string = |fields: &mut serde_json::Map<String, Value>, key: &str| {
                match fields.remove(key) {
                    Some(Value::String(s)) => s,
                    _ => String::new(),
                }
            };
            let source = take_string(&mut fields, "source");
            let translation = take_string(&mut fields, "translation");
            let certificate = fields.remove("certificate").unwrap_or(Value::Null);
            ImportedProof::Package {
                source,
                translation,
                certificate,
            }
        }
        other => ImportedProof::BareCertificate(other),
    };

    Ok(imported)
}
