//! WASM bindings for Verified Translate
//!
//! This module exposes the translation client to JavaScript via
//! wasm-bindgen. The page owns the DOM; it forwards user actions to
//! [`WasmTranslatorApp`] and redraws from the frame JSON passed to its
//! `onRender` callback.

use std::rc::Rc;

use wasm_bindgen::prelude::*;
#[cfg(feature = "wasm-tracing")]
use wasm_tracing::WasmLayerConfig;

use crate::app::{App, Frame, View};
use crate::config::ClientConfig;
use crate::exchange::ExportedPackage;
use crate::language::{Language, KNOWN_LANGUAGES};
use crate::oracle::fetch::FetchHttpClient;
use crate::oracle::HttpOracle;
use crate::prefs::LocalStoragePreferences;
use crate::session::TranslateOutcome;
use crate::verify::VerificationResult;

// Initialize panic hook and console logging for the browser
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    #[cfg(feature = "wasm-tracing")]
    {
        let mut config = WasmLayerConfig::new().with_max_level(tracing::Level::INFO);
        config.use_console_methods = true;

        if let Err(e) = wasm_tracing::set_as_global_default_with_config(config) {
            web_sys::console::warn_1(&format!("tracing already initialised: {e}").into());
        }
    }
}

// ============== VIEW ==============

/// Forwards frames and downloads to JavaScript callbacks.
struct JsView {
    on_render: js_sys::Function,
    on_download: js_sys::Function,
}

impl View for JsView {
    fn render(&self, frame: &Frame) {
        let json = match serde_json::to_string(frame) {
            Ok(json) => json,
            Err(e) => {
                web_sys::console::error_1(&format!("Failed to encode frame: {e}").into());
                return;
            }
        };

        if let Err(e) = self.on_render.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
            web_sys::console::error_1(&e);
        }
    }

    fn offer_download(&self, package: &ExportedPackage) {
        let result = self.on_download.call2(
            &JsValue::NULL,
            &JsValue::from_str(&package.filename),
            &JsValue::from_str(&package.contents),
        );
        if let Err(e) = result {
            web_sys::console::error_1(&e);
        }
    }
}

type BrowserApp = App<HttpOracle<FetchHttpClient>, JsView, LocalStoragePreferences>;

// ============== RESULT TYPES ==============

/// Translation result for JavaScript
#[wasm_bindgen]
pub struct TranslationResult {
    status: String,
    elapsed_ms: Option<f64>,
    certificate_id: Option<String>,
    error: Option<String>,
}

impl From<TranslateOutcome> for TranslationResult {
    fn from(outcome: TranslateOutcome) -> Self {
        let (status, elapsed_ms, certificate_id, error) = match outcome {
            TranslateOutcome::Busy => ("busy", None, None, None),
            TranslateOutcome::Cleared => ("cleared", None, None, None),
            TranslateOutcome::Translated {
                elapsed_ms,
                certificate_id,
            } => ("translated", Some(elapsed_ms as f64), certificate_id, None),
            TranslateOutcome::Failed(e) => ("failed", None, None, Some(e.to_string())),
        };

        Self {
            status: status.to_string(),
            elapsed_ms,
            certificate_id,
            error,
        }
    }
}

#[wasm_bindgen]
impl TranslationResult {
    /// One of `busy`, `cleared`, `translated`, `failed`.
    #[wasm_bindgen(getter)]
    pub fn status(&self) -> String {
        self.status.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn elapsed_ms(&self) -> Option<f64> {
        self.elapsed_ms
    }

    #[wasm_bindgen(getter)]
    pub fn certificate_id(&self) -> Option<String> {
        self.certificate_id.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn error(&self) -> Option<String> {
        self.error.clone()
    }
}

/// Verification result for JavaScript
#[wasm_bindgen]
pub struct VerificationOutcome {
    success: bool,
    message: String,
    display: String,
}

impl From<VerificationResult> for VerificationOutcome {
    fn from(result: VerificationResult) -> Self {
        Self {
            display: result.display(),
            success: result.success,
            message: result.message,
        }
    }
}

#[wasm_bindgen]
impl VerificationOutcome {
    #[wasm_bindgen(getter)]
    pub fn success(&self) -> bool {
        self.success
    }

    #[wasm_bindgen(getter)]
    pub fn message(&self) -> String {
        self.message.clone()
    }

    /// Message prefixed with its pass/fail glyph.
    #[wasm_bindgen(getter)]
    pub fn display(&self) -> String {
        self.display.clone()
    }
}

// ============== CLIENT ==============

/// The translation client as seen from JavaScript.
#[wasm_bindgen(js_name = TranslatorApp)]
pub struct WasmTranslatorApp {
    inner: Rc<BrowserApp>,
}

#[wasm_bindgen(js_class = TranslatorApp)]
impl WasmTranslatorApp {
    /// Create the client.
    ///
    /// `config_json` may be empty. `on_render(frameJson)` is called after
    /// every state change; `on_download(filename, contents)` when a proof
    /// package is exported.
    #[wasm_bindgen(constructor)]
    pub fn new(
        config_json: &str,
        on_render: js_sys::Function,
        on_download: js_sys::Function,
    ) -> Result<WasmTranslatorApp, JsError> {
        let config =
            ClientConfig::from_json_str(config_json).map_err(|e| JsError::new(&format!("{e:#}")))?;
        let oracle = HttpOracle::new(&config.base_url, FetchHttpClient::new());
        let view = JsView {
            on_render,
            on_download,
        };
        let app = App::new(config, oracle, view, LocalStoragePreferences::new());

        tracing::info!("✓ Verified Translate client ready");
        Ok(Self {
            inner: Rc::new(app),
        })
    }

    /// Current frame as JSON.
    #[wasm_bindgen]
    pub fn frame(&self) -> String {
        serde_json::to_string(&self.inner.frame()).unwrap_or_else(|_| "{}".to_string())
    }

    #[wasm_bindgen]
    pub async fn translate(&self) -> TranslationResult {
        let app = Rc::clone(&self.inner);
        app.translate().await.into()
    }

    #[wasm_bindgen(js_name = editSource)]
    pub fn edit_source(&self, text: String) {
        self.inner.edit_source(text);
    }

    #[wasm_bindgen(js_name = editTarget)]
    pub fn edit_target(&self, text: String) {
        self.inner.edit_target(text);
    }

    #[wasm_bindgen(js_name = selectSourceLanguage)]
    pub fn select_source_language(&self, code: String) {
        self.inner.select_source_language(Language::new(code));
    }

    #[wasm_bindgen(js_name = selectTargetLanguage)]
    pub fn select_target_language(&self, code: String) {
        self.inner.select_target_language(Language::new(code));
    }

    #[wasm_bindgen(js_name = swapLanguages)]
    pub fn swap_languages(&self) {
        self.inner.swap_languages();
    }

    #[wasm_bindgen]
    pub fn clear(&self) {
        self.inner.clear();
    }

    #[wasm_bindgen(js_name = setVerifiedMode)]
    pub fn set_verified_mode(&self, enabled: bool) {
        self.inner.set_verified_mode(enabled);
    }

    /// Returns false when there is no valid certificate to export.
    #[wasm_bindgen(js_name = exportCertificate)]
    pub fn export_certificate(&self) -> bool {
        self.inner.export_certificate().is_some()
    }

    #[wasm_bindgen(js_name = openVerifyDialog)]
    pub fn open_verify_dialog(&self) -> bool {
        self.inner.open_verify_dialog()
    }

    #[wasm_bindgen(js_name = closeVerifyDialog)]
    pub fn close_verify_dialog(&self) {
        self.inner.close_verify_dialog();
    }

    #[wasm_bindgen(js_name = editDialogSource)]
    pub fn edit_dialog_source(&self, text: String) {
        self.inner.edit_dialog_source(text);
    }

    #[wasm_bindgen(js_name = editDialogTarget)]
    pub fn edit_dialog_target(&self, text: String) {
        self.inner.edit_dialog_target(text);
    }

    #[wasm_bindgen(js_name = editDialogCertificate)]
    pub fn edit_dialog_certificate(&self, text: String) {
        self.inner.edit_dialog_certificate(text);
    }

    #[wasm_bindgen(js_name = importCertificateFile)]
    pub fn import_certificate_file(&self, bytes: Vec<u8>) {
        self.inner.import_certificate_file(&bytes);
    }

    #[wasm_bindgen]
    pub async fn verify(&self) -> VerificationOutcome {
        let app = Rc::clone(&self.inner);
        app.verify().await.into()
    }
}

// ============== UTILITIES ==============

/// Get list of known language codes as JSON
#[wasm_bindgen(js_name = knownLanguages)]
pub fn known_languages() -> String {
    serde_json::to_string(KNOWN_LANGUAGES).unwrap_or_else(|_| "[]".to_string())
}

/// Get version info
#[wasm_bindgen]
pub fn version() -> String {
    format!("Verified Translate WASM v{}", env!("CARGO_PKG_VERSION"))
}
