//! Request/response boundary to the translation and verification oracles.
//!
//! Both oracles are opaque: the client sends JSON, gets JSON back, and never
//! looks inside the certificate it receives or forwards.

pub mod http;
pub mod scripted;

#[cfg(feature = "wasm")]
pub mod fetch;

use futures::{future::LocalBoxFuture, FutureExt};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::certificate::Certificate;
use crate::language::Language;

pub use http::{HttpClient, HttpResponse};
pub use scripted::ScriptedOracle;

pub const TRANSLATE_PATH: &str = "/translate";
pub const VERIFY_PATH: &str = "/verify";

const JSON_HEADERS: &[(&str, &str)] = &[("content-type", "application/json")];

/// Errors talking to an oracle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    #[error("oracle unreachable: {0}")]
    Transport(String),

    #[error("oracle returned HTTP {0}")]
    Status(u16),

    #[error("invalid oracle response: {0}")]
    Decode(String),

    #[error("could not encode request: {0}")]
    Encode(String),
}

/// Body of `POST /translate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslateRequest {
    pub text: String,
    pub src_lang: Language,
    pub tgt_lang: Language,
    pub verified_mode: bool,
}

/// Body returned by `POST /translate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslateResponse {
    pub translated_text: String,
    pub time_ms: u64,
    #[serde(default)]
    pub verification: Option<Certificate>,
}

/// Body of `POST /verify`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyRequest {
    pub src_text: String,
    pub tgt_text: String,
    pub src_lang: Language,
    pub tgt_lang: Language,
    pub proof_data: serde_json::Value,
}

/// Body returned by `POST /verify`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub success: bool,
    pub message: String,
}

/// The translation and verification services.
pub trait Oracle {
    fn translate<'a>(
        &'a self,
        request: &'a TranslateRequest,
    ) -> LocalBoxFuture<'a, Result<TranslateResponse, OracleError>>;

    fn verify<'a>(
        &'a self,
        request: &'a VerifyRequest,
    ) -> LocalBoxFuture<'a, Result<VerifyResponse, OracleError>>;
}

/// Oracle reached over HTTP at `base_url`.
///
/// An empty base URL means same-origin relative paths.
#[derive(Debug, Clone)]
pub struct HttpOracle<C> {
    base_url: String,
    http: C,
}

impl<C: HttpClient> HttpOracle<C> {
    pub fn new(base_url: &str, http: C) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<Req, Resp>(&self, path: &str, request: &Req) -> Result<Resp, OracleError>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let url = self.endpoint(path);
        let body = serde_json::to_vec(request).map_err(|e| OracleError::Encode(e.to_string()))?;

        tracing::debug!(%url, bytes = body.len(), "oracle request");

        let response = self
            .http
            .post(&url, JSON_HEADERS, body)
            .await
            .map_err(|e| OracleError::Transport(e.to_string()))?;

        if !response.is_success() {
            tracing::warn!(%url, status = response.status, "oracle returned error status");
            return Err(OracleError::Status(response.status));
        }

        serde_json::from_slice(&response.body).map_err(|e| OracleError::Decode(e.to_string()))
    }
}

impl<C: HttpClient> Oracle for HttpOracle<C> {
    fn translate<'a>(
        &'a self,
        request: &'a TranslateRequest,
    ) -> LocalBoxFuture<'a, Result<TranslateResponse, OracleError>> {
        self.post_json(TRANSLATE_PATH, request).boxed_local()
    }

    fn verify<'a>(
        &'a self,
        request: &'a VerifyRequest,
    ) -> LocalBoxFuture<'a, Result<VerifyResponse, OracleError>> {
        self.post_json(VERIFY_PATH, request).boxed_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use serde_json::{json, Value};
    use std::cell::RefCell;

    #[derive(Debug, thiserror::Error)]
    #[error("connection refused")]
    struct Refused;

    /// Records requests and answers with a canned response.
    struct CannedHttp {
        reply: Option<HttpResponse>,
        seen: RefCell<Vec<(String, Vec<(String, String)>, Value)>>,
    }

    impl CannedHttp {
        fn new(status: u16, body: Value) -> Self {
            Self {
                reply: Some(HttpResponse {
                    status,
                    body: serde_json::to_vec(&body).unwrap(),
                }),
                seen: RefCell::new(Vec::new()),
            }
        }

        fn unreachable() -> Self {
            Self {
                reply: None,
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl HttpClient for CannedHttp {
        type Error = Refused;

        fn post<'a>(
            &'a self,
            url: &'a str,
            headers: &'a [(&'a str, &'a str)],
            body: Vec<u8>,
        ) -> LocalBoxFuture<'a, Result<HttpResponse, Self::Error>> {
            let headers = headers
                .iter()
                .map(|&(k, v)| (k.to_string(), v.to_string()))
                .collect();
            let body: Value = serde_json::from_slice(&body).unwrap();
            self.seen.borrow_mut().push((url.to_string(), headers, body));
            let reply = self.reply.clone().ok_or(Refused);
            async move { reply }.boxed_local()
        }
    }

    fn translate_request(verified_mode: bool) -> TranslateRequest {
        TranslateRequest {
            text: "Bon dia".into(),
            src_lang: "cat_Latn".into(),
            tgt_lang: "eng_Latn".into(),
            verified_mode,
        }
    }

    #[test]
    fn test_translate_wire_format() {
        let http = CannedHttp::new(
            200,
            json!({
                "translated_text": "Good morning",
                "time_ms": 120,
                "verification": {"certificate_id": "abc123", "proof": "zisk_v1_ff"}
            }),
        );
        let oracle = HttpOracle::new("http://localhost:8000/", http);

        let response = block_on(oracle.translate(&translate_request(true))).unwrap();
        assert_eq!(response.translated_text, "Good morning");
        assert_eq!(response.time_ms, 120);
        assert_eq!(response.verification.as_ref().map(|c| c.id()), Some("abc123"));

        let seen = oracle.http.seen.borrow();
        let (url, headers, body) = &seen[0];
        assert_eq!(url, "http://localhost:8000/translate");
        assert_eq!(
            headers,
            &vec![("content-type".to_string(), "application/json".to_string())]
        );
        assert_eq!(
            body,
            &json!({
                "text": "Bon dia",
                "src_lang": "cat_Latn",
                "tgt_lang": "eng_Latn",
                "verified_mode": true
            })
        );
    }

    #[test]
    fn test_null_or_missing_verification() {
        for body in [
            json!({"translated_text": "Good morning", "time_ms": 5, "verification": null}),
            json!({"translated_text": "Good morning", "time_ms": 5}),
        ] {
            let oracle = HttpOracle::new("", CannedHttp::new(200, body));
            let response = block_on(oracle.translate(&translate_request(false))).unwrap();
            assert!(response.verification.is_none());
            assert_eq!(oracle.http.seen.borrow()[0].0, "/translate");
        }
    }

    #[test]
    fn test_verify_wire_format() {
        let http = CannedHttp::new(
            200,
            json!({"success": false, "message": "Text has been modified (Hash mismatch)"}),
        );
        let oracle = HttpOracle::new("http://oracle", http);

        let request = VerifyRequest {
            src_text: "Bon dia".into(),
            tgt_text: "Good evening".into(),
            src_lang: "cat_Latn".into(),
            tgt_lang: "eng_Latn".into(),
            proof_data: json!({"certificate_id": "abc123"}),
        };
        let response = block_on(oracle.verify(&request)).unwrap();
        assert!(!response.success);
        assert_eq!(response.message, "Text has been modified (Hash mismatch)");

        let seen = oracle.http.seen.borrow();
        assert_eq!(seen[0].0, "http://oracle/verify");
        assert_eq!(
            seen[0].2,
            json!({
                "src_text": "Bon dia",
                "tgt_text": "Good evening",
                "src_lang": "cat_Latn",
                "tgt_lang": "eng_Latn",
                "proof_data": {"certificate_id": "abc123"}
            })
        );
    }

    #[test]
    fn test_error_status() {
        let oracle = HttpOracle::new("", CannedHttp::new(500, json!({"detail": "boom"})));
        let err = block_on(oracle.translate(&translate_request(false))).unwrap_err();
        assert_eq!(err, OracleError::Status(500));
    }

    #[test]
    fn test_transport_failure() {
        let oracle = HttpOracle::new("", CannedHttp::unreachable());
        let err = block_on(oracle.translate(&translate_request(false))).unwrap_err();
        assert_eq!(err, OracleError::Transport("connection refused".into()));
    }

    #[test]
    fn test_certificate_without_id_is_decode_error() {
        let oracle = HttpOracle::new(
            "",
            CannedHttp::new(
                200,
                json!({"translated_text": "x", "time_ms": 1, "verification": {"proof": "p"}}),
            ),
        );
        let err = block_on(oracle.translate(&translate_request(true))).unwrap_err();
        assert!(matches!(err, OracleError::Decode(_)));
    }
}
