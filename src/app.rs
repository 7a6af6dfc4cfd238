//! Event dispatch between an abstract UI and the client core.
//!
//! The UI sends [`UiEvent`]s and draws whatever [`Frame`] it is handed. No
//! borrow of the session is held across an oracle call, so events keep
//! flowing while a request is in flight.

use std::cell::RefCell;

use serde::Serialize;

use crate::config::ClientConfig;
use crate::exchange::{self, ExportedPackage, MALFORMED_FILE};
use crate::language::Language;
use crate::oracle::Oracle;
use crate::orchestrator;
use crate::prefs::{PreferenceStore, LAST_TEXT_KEY, SOURCE_LANGUAGE_KEY, TARGET_LANGUAGE_KEY};
use crate::seal::TrustSeal;
use crate::session::{Session, TargetPane, TranslateOutcome};
use crate::verify::{self, VerificationResult, VerifyDialog};

/// Everything a user can do.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    SourceEdited(String),
    TargetEdited(String),
    SourceLanguageSelected(Language),
    TargetLanguageSelected(Language),
    SwapLanguages,
    Clear,
    VerifiedModeToggled(bool),
    TranslateRequested,
    ExportRequested,
    OpenVerifyDialog,
    CloseVerifyDialog,
    DialogSourceEdited(String),
    DialogTargetEdited(String),
    DialogCertificateEdited(String),
    CertificateFileUploaded(Vec<u8>),
    VerifyRequested,
}

/// Something that can show the client's state.
pub trait View {
    fn render(&self, frame: &Frame);

    /// Hand a proof package to the user as a file.
    fn offer_download(&self, package: &ExportedPackage);
}

/// Snapshot of everything on screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frame {
    pub source_language: Language,
    pub target_language: Language,
    pub source_text: String,
    /// Displayed target, including placeholder or error text.
    pub target_text: String,
    pub target_is_placeholder: bool,
    pub elapsed: Option<String>,
    pub status: &'static str,
    pub working: bool,
    pub verified_mode: bool,
    pub seal: TrustSeal,
    pub can_export: bool,
    pub can_open_verify: bool,
    pub dialog: VerifyDialog,
    pub verification_message: Option<String>,
    pub import_error: Option<String>,
}

impl Frame {
    fn capture(
        config: &ClientConfig,
        session: &Session,
        dialog: &VerifyDialog,
        import_error: Option<&str>,
    ) -> Self {
        let (target_text, target_is_placeholder) = match session.target() {
            TargetPane::Placeholder => (config.placeholder.clone(), true),
            TargetPane::Failed => (config.translation_error.clone(), true),
            TargetPane::Text(text) => (text.clone(), false),
        };
        let seal = session.seal().clone();
        let certified = seal.is_valid();

        Self {
            source_language: session.languages().source.clone(),
            target_language: session.languages().target.clone(),
            source_text: session.source_text().to_string(),
            target_text,
            target_is_placeholder,
            elapsed: session.elapsed_ms().map(|ms| format!("{ms}ms")),
            status: session.phase().label(),
            working: session.is_translating(),
            verified_mode: session.verified_mode(),
            seal,
            can_export: certified,
            can_open_verify: certified,
            dialog: dialog.clone(),
            verification_message: dialog.result.as_ref().map(VerificationResult::display),
            import_error: import_error.map(str::to_string),
        }
    }
}

/// The client: session, verification dialog, and the collaborators they use.
pub struct App<O, V, P> {
    config: ClientConfig,
    oracle: O,
    view: V,
    prefs: P,
    session: RefCell<Session>,
    dialog: RefCell<VerifyDialog>,
    import_error: RefCell<Option<String>>,
}

impl<O: Oracle, V: View, P: PreferenceStore> App<O, V, P> {
    /// Restore preferences and draw the first frame.
    pub fn new(config: ClientConfig, oracle: O, view: V, prefs: P) -> Self {
        let mut languages = config.default_languages();
        if let Some(code) = prefs.get(SOURCE_LANGUAGE_KEY) {
            languages.source = Language::new(code);
        }
        if let Some(code) = prefs.get(TARGET_LANGUAGE_KEY) {
            languages.target = Language::new(code);
        }

        let mut session = Session::new(languages);
        if let Some(text) = prefs.get(LAST_TEXT_KEY) {
            session.edit_source(text);
        }

        tracing::debug!(
            source = %session.languages().source,
            target = %session.languages().target,
            "client started"
        );

        let app = Self {
            config,
            oracle,
            view,
            prefs,
            session: RefCell::new(session),
            dialog: RefCell::new(VerifyDialog::default()),
            import_error: RefCell::new(None),
        };
        app.render();
        app
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Current session state (cloned).
    pub fn session(&self) -> Session {
        self.session.borrow().clone()
    }

    pub fn frame(&self) -> Frame {
        let session = self.session.borrow();
        let dialog = self.dialog.borrow();
        let import_error = self.import_error.borrow();
        Frame::capture(&self.config, &session, &dialog, import_error.as_deref())
    }

    fn render(&self) {
        let frame = self.frame();
        self.view.render(&frame);
    }

    /// Apply one UI event.
    pub async fn dispatch(&self, event: UiEvent) {
        match event {
            UiEvent::SourceEdited(text) => self.edit_source(text),
            UiEvent::TargetEdited(text) => self.edit_target(text),
            UiEvent::SourceLanguageSelected(language) => self.select_source_language(language),
            UiEvent::TargetLanguageSelected(language) => self.select_target_language(language),
            UiEvent::SwapLanguages => self.swap_languages(),
            UiEvent::Clear => self.clear(),
            UiEvent::VerifiedModeToggled(enabled) => self.set_verified_mode(enabled),
            UiEvent::TranslateRequested => {
                self.translate().await;
            }
            UiEvent::ExportRequested => {
                self.export_certificate();
            }
            UiEvent::OpenVerifyDialog => {
                self.open_verify_dialog();
            }
            UiEvent::CloseVerifyDialog => self.close_verify_dialog(),
            UiEvent::DialogSourceEdited(text) => self.edit_dialog(|d| d.source = text),
            UiEvent::DialogTargetEdited(text) => self.edit_dialog(|d| d.target = text),
            UiEvent::DialogCertificateEdited(text) => {
                self.edit_dialog(|d| d.certificate_json = text)
            }
            UiEvent::CertificateFileUploaded(bytes) => self.import_certificate_file(&bytes),
            UiEvent::VerifyRequested => {
                self.verify().await;
            }
        }
    }

    pub fn edit_source(&self, text: String) {
        self.session.borrow_mut().edit_source(text);
        self.render();
    }

    pub fn edit_target(&self, text: String) {
        self.session.borrow_mut().edit_target(text);
        self.render();
    }

    pub fn select_source_language(&self, language: Language) {
        self.prefs.set(SOURCE_LANGUAGE_KEY, language.as_str());
        self.session.borrow_mut().set_source_language(language);
        self.render();
    }

    pub fn select_target_language(&self, language: Language) {
        self.prefs.set(TARGET_LANGUAGE_KEY, language.as_str());
        self.session.borrow_mut().set_target_language(language);
        self.render();
    }

    pub fn swap_languages(&self) {
        let languages = {
            let mut session = self.session.borrow_mut();
            session.swap_languages();
            session.languages().clone()
        };
        self.prefs.set(SOURCE_LANGUAGE_KEY, languages.source.as_str());
        self.prefs.set(TARGET_LANGUAGE_KEY, languages.target.as_str());
        self.render();
    }

    pub fn clear(&self) {
        self.session.borrow_mut().clear();
        self.render();
    }

    pub fn set_verified_mode(&self, enabled: bool) {
        self.session.borrow_mut().set_verified_mode(enabled);
        self.render();
    }

    /// Translate the current source text.
    ///
    /// A call made while another is in flight returns
    /// [`TranslateOutcome::Busy`] without touching anything.
    pub async fn translate(&self) -> TranslateOutcome {
        orchestrator::translate(&self.session, &self.oracle, &self.prefs, || self.render()).await
    }

    /// Offer the held certificate as a download. `None` if nothing is held.
    pub fn export_certificate(&self) -> Option<ExportedPackage> {
        let package = exchange::export_package(&self.session.borrow())?;
        self.view.offer_download(&package);
        Some(package)
    }

    /// Open the verification dialog pre-filled from the session.
    pub fn open_verify_dialog(&self) -> bool {
        let opened = self.dialog.borrow_mut().open_from(&self.session.borrow());
        if opened {
            *self.import_error.borrow_mut() = None;
            self.render();
        }
        opened
    }

    pub fn close_verify_dialog(&self) {
        self.dialog.borrow_mut().close();
        self.render();
    }

    fn edit_dialog(&self, edit: impl FnOnce(&mut VerifyDialog)) {
        edit(&mut *self.dialog.borrow_mut());
        self.render();
    }

    pub fn edit_dialog_source(&self, text: String) {
        self.edit_dialog(|d| d.source = text);
    }

    pub fn edit_dialog_target(&self, text: String) {
        self.edit_dialog(|d| d.target = text);
    }

    pub fn edit_dialog_certificate(&self, text: String) {
        self.edit_dialog(|d| d.certificate_json = text);
    }

    /// Load an uploaded package or bare certificate into the dialog.
    pub fn import_certificate_file(&self, bytes: &[u8]) {
        match exchange::import_package(bytes) {
            Ok(imported) => {
                self.dialog.borrow_mut().apply_import(imported);
                *self.import_error.borrow_mut() = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "rejected uploaded certificate");
                *self.import_error.borrow_mut() = Some(MALFORMED_FILE.to_string());
            }
        }
        self.render();
    }

    /// Check the dialog's fields with the verification oracle.
    pub async fn verify(&self) -> VerificationResult {
        let (languages, source, target, certificate_json) = {
            let session = self.session.borrow();
            let dialog = self.dialog.borrow();
            (
                session.languages().clone(),
                dialog.source.clone(),
                dialog.target.clone(),
                dialog.certificate_json.clone(),
            )
        };

        let result =
            verify::submit_verification(&self.oracle, &languages, &source, &target, &certificate_json)
                .await;

        self.dialog.borrow_mut().result = Some(result.clone());
        self.render();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certificate::Certificate;
    use crate::oracle::{ScriptedOracle, TranslateResponse, VerifyResponse};
    use crate::prefs::MemoryPreferences;
    use futures::executor::block_on;
    use serde_json::json;

    #[derive(Default)]
    struct RecordingView {
        frames: RefCell<Vec<Frame>>,
        downloads: RefCell<Vec<ExportedPackage>>,
    }

    impl View for RecordingView {
        fn render(&self, frame: &Frame) {
            self.frames.borrow_mut().push(frame.clone());
        }

        fn offer_download(&self, package: &ExportedPackage) {
            self.downloads.borrow_mut().push(package.clone());
        }
    }

    type TestApp = App<ScriptedOracle, RecordingView, MemoryPreferences>;

    fn app_with(prefs: MemoryPreferences) -> TestApp {
        App::new(
            ClientConfig::default(),
            ScriptedOracle::new(),
            RecordingView::default(),
            prefs,
        )
    }

    fn app() -> TestApp {
        app_with(MemoryPreferences::new())
    }

    fn good_morning(certificate_id: Option<&str>) -> TranslateResponse {
        TranslateResponse {
            translated_text: "Good morning".into(),
            time_ms: 120,
            verification: certificate_id.map(|id| {
                Certificate::try_from(json!({ "certificate_id": id, "proof": "zisk_v1_ff" }))
                    .unwrap()
            }),
        }
    }

    fn certified(app: &TestApp) {
        app.oracle().push_translation(Ok(good_morning(Some("abc123"))));
        block_on(async {
            app.dispatch(UiEvent::VerifiedModeToggled(true)).await;
            app.dispatch(UiEvent::SourceEdited("Bon dia".into())).await;
            app.dispatch(UiEvent::TranslateRequested).await;
        });
    }

    #[test]
    fn test_initial_frame_uses_defaults() {
        let app = app();
        let frames = app.view().frames.borrow();
        assert_eq!(frames.len(), 1);

        let frame = &frames[0];
        assert_eq!(frame.source_language.as_str(), "cat_Latn");
        assert_eq!(frame.target_language.as_str(), "eng_Latn");
        assert_eq!(frame.target_text, "Translation will appear here");
        assert!(frame.target_is_placeholder);
        assert_eq!(frame.status, "Ready");
        assert_eq!(frame.seal, TrustSeal::Hidden);
    }

    #[test]
    fn test_restores_preferences() {
        let app = app_with(MemoryPreferences::with_entries([
            (SOURCE_LANGUAGE_KEY, "spa_Latn"),
            (LAST_TEXT_KEY, "Hola mundo"),
        ]));
        let frame = app.frame();
        assert_eq!(frame.source_language.as_str(), "spa_Latn");
        assert_eq!(frame.target_language.as_str(), "eng_Latn");
        assert_eq!(frame.source_text, "Hola mundo");
    }

    #[test]
    fn test_translate_persists_and_renders_working() {
        let app = app();
        app.oracle().push_translation(Ok(good_morning(None)));
        block_on(async {
            app.dispatch(UiEvent::SourceEdited(" Bon dia ".into())).await;
            app.dispatch(UiEvent::TranslateRequested).await;
        });

        assert_eq!(app.prefs.get(LAST_TEXT_KEY).as_deref(), Some(" Bon dia "));

        let frames = app.view().frames.borrow();
        let working = &frames[frames.len() - 2];
        assert!(working.working);
        assert_eq!(working.status, "Translating...");

        let done = frames.last().unwrap();
        assert!(!done.working);
        assert_eq!(done.target_text, "Good morning");
        assert_eq!(done.elapsed.as_deref(), Some("120ms"));
    }

    #[test]
    fn test_generating_seal_while_in_flight() {
        let app = app();
        let tx = app.oracle().defer_translation();
        block_on(async {
            app.set_verified_mode(true);
            app.edit_source("Bon dia".into());

            let mut first = Box::pin(app.translate());
            assert!(futures::poll!(&mut first).is_pending());
            assert_eq!(app.frame().seal, TrustSeal::Generating);

            tx.send(Ok(good_morning(Some("abc123")))).unwrap();
            first.await;
        });
        assert!(app.frame().seal.is_valid());
    }

    #[test]
    fn test_failure_shows_error_text_and_returns_idle() {
        let app = app();
        block_on(async {
            app.dispatch(UiEvent::SourceEdited("Bon dia".into())).await;
            app.dispatch(UiEvent::TranslateRequested).await;
        });

        let frame = app.frame();
        assert_eq!(
            frame.target_text,
            "Error: Could not connect to the translation server. Please ensure the backend is running."
        );
        assert!(!frame.working);
        assert_eq!(frame.status, "Ready");
    }

    #[test]
    fn test_export_offers_download() {
        let app = app();
        certified(&app);
        let frame = app.frame();
        assert!(frame.can_export && frame.can_open_verify);

        block_on(app.dispatch(UiEvent::ExportRequested));
        let downloads = app.view().downloads.borrow();
        assert_eq!(downloads.len(), 1);
        assert_eq!(downloads[0].filename, "translation-certificate-abc123.json");
    }

    #[test]
    fn test_export_without_certificate_is_noop() {
        let app = app();
        assert!(app.export_certificate().is_none());
        assert!(app.view().downloads.borrow().is_empty());
    }

    #[test]
    fn test_open_dialog_prefills_edited_target() {
        let app = app();
        certified(&app);
        assert!(app.open_verify_dialog());

        // Dialog keeps its copy; editing afterwards is what tampering looks like.
        app.edit_dialog_target("Good evening".into());
        let dialog = app.frame().dialog;
        assert!(dialog.open);
        assert_eq!(dialog.source, "Bon dia");
        assert_eq!(dialog.target, "Good evening");
        let cert: serde_json::Value = serde_json::from_str(&dialog.certificate_json).unwrap();
        assert_eq!(cert["certificate_id"], "abc123");
    }

    #[test]
    fn test_verify_does_not_touch_certificate() {
        let app = app();
        certified(&app);
        app.open_verify_dialog();
        app.oracle().push_verification(Ok(VerifyResponse {
            success: true,
            message: "Verification Successful".into(),
        }));

        let result = block_on(app.verify());
        assert!(result.success);

        let frame = app.frame();
        assert_eq!(
            frame.verification_message.as_deref(),
            Some("✓ Verification Successful")
        );
        assert!(frame.seal.is_valid());

        let sent = &app.oracle().verify_requests()[0];
        assert_eq!(sent.src_text, "Bon dia");
        assert_eq!(sent.tgt_text, "Good morning");
    }

    #[test]
    fn test_malformed_upload_reports_and_keeps_state() {
        let app = app();
        block_on(app.dispatch(UiEvent::DialogSourceEdited("mine".into())));
        let before = app.frame().dialog;

        block_on(app.dispatch(UiEvent::CertificateFileUploaded(b"not json".to_vec())));
        let frame = app.frame();
        assert_eq!(frame.import_error.as_deref(), Some("malformed file"));
        assert_eq!(frame.dialog, before);

        block_on(app.dispatch(UiEvent::CertificateFileUploaded(
            br#"{"certificate_id": "x"}"#.to_vec(),
        )));
        let frame = app.frame();
        assert_eq!(frame.import_error, None);
        assert_eq!(frame.dialog.source, "mine");
    }

    #[test]
    fn test_language_selection_persists() {
        let app = app();
        block_on(app.dispatch(UiEvent::TargetLanguageSelected("spa_Latn".into())));
        assert_eq!(app.prefs.get(TARGET_LANGUAGE_KEY).as_deref(), Some("spa_Latn"));

        block_on(app.dispatch(UiEvent::SwapLanguages));
        assert_eq!(app.prefs.get(SOURCE_LANGUAGE_KEY).as_deref(), Some("spa_Latn"));
        assert_eq!(app.prefs.get(TARGET_LANGUAGE_KEY).as_deref(), Some("cat_Latn"));
    }

    #[test]
    fn test_frame_serializes_for_js() {
        let app = app();
        certified(&app);
        let value = serde_json::to_value(app.frame()).unwrap();
        assert_eq!(value["seal"], json!({"state": "valid", "certificate_id": "abc123"}));
        assert_eq!(value["status"], "Ready");
        assert_eq!(value["elapsed"], "120ms");
    }
}
