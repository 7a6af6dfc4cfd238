//! Opaque translation certificates and the portable proof package.
//!
//! A certificate is whatever the translation oracle put under `verification`.
//! The client only ever reads `certificate_id`; every other field is carried
//! through untouched so the verification oracle sees exactly what it issued.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Prefix of exported proof package filenames.
pub const PACKAGE_FILE_PREFIX: &str = "translation-certificate-";

/// Errors raised when a JSON value cannot serve as a certificate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CertificateError {
    #[error("certificate must be a JSON object")]
    NotAnObject,

    #[error("certificate has no string `certificate_id`")]
    MissingId,
}

/// Proof issued by the translation oracle for one exact translation.
///
/// Only meaningful together with the source text, translated text and
/// language pair that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct Certificate {
    id: String,
    fields: Map<String, Value>,
}

impl Certificate {
    /// Identifier used for display and filenames.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Pretty-printed JSON, as placed in the verification dialog.
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(&self.fields).unwrap_or_else(|_| "{}".to_string())
    }
}

impl TryFrom<Value> for Certificate {
    type Error = CertificateError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(fields) = value else {
            return Err(CertificateError::NotAnObject);
        };

        let id = fields
            .get("certificate_id")
            .and_then(Value::as_str)
            .ok_or(CertificateError::MissingId)?
            .to_string();

        Ok(Self { id, fields })
    }
}

impl From<Certificate> for Value {
    fn from(cert: Certificate) -> Self {
        Value::Object(cert.fields)
    }
}

/// Self-contained bundle of a translation and the certificate covering it.
///
/// Field order matches the on-disk format: `source`, `translation`,
/// `certificate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProofPackage {
    pub source: String,
    pub translation: String,
    pub certificate: Certificate,
}

impl ProofPackage {
    /// Download filename, derived only from the certificate id.
    pub fn filename(&self) -> String {
        package_filename(self.certificate.id())
    }
}

/// Build `translation-certificate-<id>.json`, neutralising characters that
/// could form a path.
pub fn package_filename(certificate_id: &str) -> String {
    let safe: String = certificate_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{PACKAGE_FILE_PREFIX}{safe}.json")
}
