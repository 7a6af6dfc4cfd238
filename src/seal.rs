//! Certificate lifecycle and the trust seal derived from it.
//!
//! The lifecycle is the single owner of the held certificate. Everything that
//! could break the link between the certificate and the text on screen goes
//! through here.

use serde::Serialize;

use crate::certificate::Certificate;

/// What the UI shows about the trustworthiness of the current translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TrustSeal {
    /// Verified mode off, nothing issued, or the session was reset.
    Hidden,
    /// A verified translation request is in flight.
    Generating,
    /// The held certificate still covers what is displayed.
    Valid { certificate_id: String },
    /// A certificate was issued and then invalidated.
    Invalid,
}

impl TrustSeal {
    pub fn is_valid(&self) -> bool {
        matches!(self, TrustSeal::Valid { .. })
    }
}

/// What happened to the displayed pairing while a verified request was out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InFlight {
    None,
    Untouched,
    /// Text or a language changed; a late certificate no longer covers it.
    Edited,
    /// Swap, clear or verified mode off; a late certificate is dropped.
    Discarded,
}

/// Holds the last certificate and decides the seal.
#[derive(Debug, Clone)]
pub struct CertificateLifecycle {
    certificate: Option<Certificate>,
    seal: TrustSeal,
    in_flight: InFlight,
}

impl Default for CertificateLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl CertificateLifecycle {
    pub fn new() -> Self {
        Self {
            certificate: None,
            seal: TrustSeal::Hidden,
            in_flight: InFlight::None,
        }
    }

    /// The certificate, present only while the seal is valid.
    pub fn certificate(&self) -> Option<&Certificate> {
        self.certificate.as_ref()
    }

    pub fn seal(&self) -> &TrustSeal {
        &self.seal
    }

    /// Source text, target text or a language changed.
    ///
    /// Returns `true` when a held certificate was dropped.
    pub fn invalidate(&mut self) -> bool {
        if self.in_flight == InFlight::Untouched {
            tracing::debug!("pairing changed while a verified request is in flight");
            self.in_flight = InFlight::Edited;
        }

        match self.certificate.take() {
            Some(cert) => {
                tracing::info!(certificate_id = cert.id(), "certificate invalidated by edit");
                self.seal = TrustSeal::Invalid;
                true
            }
            None => false,
        }
    }

    /// Verified mode was switched off.
    pub fn revoke(&mut self) {
        self.discard_in_flight();
        if self.certificate.take().is_some() {
            tracing::info!("certificate revoked, verified mode disabled");
            self.seal = TrustSeal::Invalid;
        } else {
            self.seal = TrustSeal::Hidden;
        }
    }

    /// Forget everything: swap, clear, or an empty-source translate.
    pub fn reset(&mut self) {
        self.discard_in_flight();
        if self.certificate.take().is_some() {
            tracing::debug!("certificate discarded");
        }
        self.seal = TrustSeal::Hidden;
    }

    fn discard_in_flight(&mut self) {
        if matches!(self.in_flight, InFlight::Untouched | InFlight::Edited) {
            self.in_flight = InFlight::Discarded;
        }
    }

    /// A new translation request is starting.
    pub fn begin(&mut self, verified_mode: bool) {
        self.reset();
        self.in_flight = if verified_mode {
            self.seal = TrustSeal::Generating;
            InFlight::Untouched
        } else {
            InFlight::None
        };
    }

    /// A translation response landed. Only a certificate arriving while
    /// verified mode is on, for a pairing nobody touched since the request
    /// began, makes the seal valid.
    pub fn settle(&mut self, certificate: Option<Certificate>, verified_mode: bool) {
        let in_flight = std::mem::replace(&mut self.in_flight, InFlight::None);

        match certificate {
            Some(cert) if verified_mode => match in_flight {
                InFlight::None | InFlight::Untouched => {
                    tracing::info!(certificate_id = cert.id(), "certificate issued");
                    self.seal = TrustSeal::Valid {
                        certificate_id: cert.id().to_string(),
                    };
                    self.certificate = Some(cert);
                }
                InFlight::Edited => {
                    tracing::info!(
                        certificate_id = cert.id(),
                        "certificate arrived for edited text, not issued"
                    );
                    self.certificate = None;
                    self.seal = TrustSeal::Invalid;
                }
                InFlight::Discarded => {
                    tracing::debug!(
                        certificate_id = cert.id(),
                        "dropping certificate, session reset mid-request"
                    );
                    self.reset();
                }
            },
            Some(cert) => {
                tracing::debug!(
                    certificate_id = cert.id(),
                    "dropping certificate, verified mode turned off mid-request"
                );
                self.reset();
            }
            None => {
                if verified_mode {
                    tracing::warn!("verified translation returned without a certificate");
                }
                self.reset();
            }
        }
    }

    /// The request failed; nothing was issued.
    pub fn abandon(&mut self) {
        self.in_flight = InFlight::None;
        self.reset();
    }
}
