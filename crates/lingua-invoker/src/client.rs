//! Translator client: the user-facing operations over an [`Invoker`].
//!
//! ```text
//!   detect_flow / translate_flow / ocr_translate_flow
//!        │  take a Ticket, publish TranslationView if still current
//!        ▼
//!   detect ── translate ── test_backend
//!        │  status messages via StatusLine::set_for
//!        ▼
//!   Invoker::invoke (offline check → endpoint → retry)
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use lingua_core::capability::CapabilityFuture;
use lingua_core::speech::TransitionCallback;
use lingua_core::{
    CapabilityError, DetectRequest, HistoryEntry, Liveness, RecognitionState, ServiceError, SpeechSession, TextExtractor,
    TranslateReply, TranslateRequest, TranslationHistory, Translator, UNKNOWN_LANGUAGE, first_language,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{InvokeError, InvokeResult};
use crate::invoker::Invoker;
use crate::status::{STATUS_READY, StatusLine, Ticket};
use crate::transport::{Request, Response};

/// Placeholder rendered before anything has been detected or translated.
pub const PLACEHOLDER: &str = "—";
/// Rendered in place of a translation that did not come back.
pub const TRANSLATION_FAILED: &str = "Translation failed";

/// What the translator UI shows besides the status line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslationView {
    pub input: String,
    pub detected: String,
    pub translation: String,
}

impl TranslationView {
    /// The translation, if one was produced.
    pub fn translated(&self) -> Option<&str> {
        match self.translation.as_str() {
            PLACEHOLDER | TRANSLATION_FAILED => None,
            text => Some(text),
        }
    }
}

impl Default for TranslationView {
    fn default() -> Self {
        Self {
            input: String::new(),
            detected: PLACEHOLDER.to_string(),
            translation: PLACEHOLDER.to_string(),
        }
    }
}

#[derive(Default)]
struct ClientState {
    view: TranslationView,
    history: TranslationHistory,
}

pub struct TranslatorClient {
    invoker: Invoker,
    state: Mutex<ClientState>,
}

impl TranslatorClient {
    pub fn new(invoker: Invoker) -> Self {
        Self {
            invoker,
            state: Mutex::new(ClientState::default()),
        }
    }

    pub fn invoker(&self) -> &Invoker {
        &self.invoker
    }

    pub fn status(&self) -> &Arc<StatusLine> {
        self.invoker.status()
    }

    pub fn view(&self) -> TranslationView {
        self.state().view.clone()
    }

    /// Completed translations, newest first.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.state().history.entries().cloned().collect()
    }

    fn state(&self) -> MutexGuard<'_, ClientState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Startup discovery.
    pub async fn start(&self) -> InvokeResult<()> {
        match self.invoker.discover().await {
            Ok(endpoint) => {
                info!(%endpoint, "translation service found");
                Ok(())
            }
            Err(err) => {
                self.status().set(err.status_message());
                Err(err)
            }
        }
    }

    /// Reflect a connectivity transition in the status line.
    pub fn on_connectivity_change(&self, online: bool) {
        if online {
            self.status().set(STATUS_READY);
        } else {
            self.status().set(InvokeError::Offline.status_message());
        }
    }

    pub async fn detect(&self, text: &str) -> InvokeResult<Option<String>> {
        let ticket = self.status().ticket();
        self.detect_with(ticket, text).await
    }

    /// Detect the language of `text`. Empty input yields `None` without a
    /// network call.
    pub async fn detect_with(&self, ticket: Ticket, text: &str) -> InvokeResult<Option<String>> {
        if text.trim().is_empty() {
            return Ok(None);
        }
        let status = self.status();
        if !self.invoker.is_online() {
            status.set_for(ticket, "Offline — please check your network");
            return Err(InvokeError::Offline);
        }
        status.set_for(ticket, "Detecting language...");

        let request = Request::post_json("/detect", &DetectRequest { q: text.to_string() })
            .map_err(|e| InvokeError::Malformed(e.to_string()))?;
        match self.invoker.invoke(&request, self.invoker.policies().detect).await {
            Ok(response) => {
                let language = first_language(&response.body);
                debug!(?language, "detection reply");
                Ok(language)
            }
            Err(err) => {
                status.set_for(ticket, detect_failure_message(&err));
                warn!(error = %err, "language detection failed");
                Err(err)
            }
        }
    }

    pub async fn translate(&self, text: &str, source: Option<&str>, target: &str) -> InvokeResult<Option<String>> {
        let ticket = self.status().ticket();
        self.translate_with(ticket, text, source, target).await
    }

    /// Translate `text` into `target`. A missing source is sent as `auto`.
    pub async fn translate_with(
        &self,
        ticket: Ticket,
        text: &str,
        source: Option<&str>,
        target: &str,
    ) -> InvokeResult<Option<String>> {
        if text.trim().is_empty() {
            return Ok(None);
        }
        let status = self.status();
        status.set_for(ticket, "Connecting to translation service...");

        let request = Request::post_json("/translate", &TranslateRequest::new(text, source, target))
            .map_err(|e| InvokeError::Malformed(e.to_string()))?;
        let outcome = self
            .invoker
            .invoke(&request, self.invoker.policies().translate)
            .await
            .and_then(|response| parse_translation(&response));

        match outcome {
            Ok(translated) => {
                status.set_for(ticket, "Translation complete");
                Ok(Some(translated))
            }
            Err(err) => {
                status.set_for(ticket, translate_failure_message(&err));
                warn!(error = %err, "translation failed");
                Err(err)
            }
        }
    }

    /// Probe the backend end to end and report the outcome on the status line.
    pub async fn test_backend(&self) -> InvokeResult<Liveness> {
        let status = self.status();
        let ticket = status.ticket();
        status.set_for(ticket, "Testing backend connectivity...");

        if !self.invoker.is_online() {
            status.set_for(ticket, "Offline — check your network");
            return Err(InvokeError::Offline);
        }
        if let Err(err) = self.invoker.discover().await {
            status.set_for(ticket, "Could not find running Python server on any port");
            return Err(err);
        }

        match self.invoker.invoke(&Request::get("/"), self.invoker.policies().probe).await {
            Ok(response) => {
                let liveness: Liveness = response.json().unwrap_or_default();
                if liveness.is_ok() {
                    status.set_for(ticket, "Backend reachable");
                } else {
                    status.set_for(ticket, "Backend reachable (unexpected response)");
                }
                Ok(liveness)
            }
            Err(err @ InvokeError::Http { .. }) => {
                warn!(error = %err, "backend test got an error response");
                status.set_for(ticket, "Backend responded with error");
                Err(err)
            }
            Err(err) => {
                warn!(error = %err, "backend test failed");
                status.set_for(ticket, "Backend unreachable — start Python server");
                Err(err)
            }
        }
    }

    /// Detect only, rendering the language (or `unknown`).
    pub async fn detect_flow(&self, text: &str) -> TranslationView {
        let ticket = self.status().ticket();
        let detected = self.detect_with(ticket, text).await.ok().flatten();
        self.status().set_for(ticket, "Language detection done");
        self.publish(ticket, |view| {
            view.input = text.to_string();
            view.detected = detected.unwrap_or_else(|| UNKNOWN_LANGUAGE.to_string());
        })
    }

    /// Detect, then translate with the detected language as the source.
    pub async fn translate_flow(&self, text: &str, target: &str) -> TranslationView {
        let ticket = self.status().ticket();
        if text.trim().is_empty() {
            self.status().set_for(ticket, "Please enter text to translate");
            return self.view();
        }
        self.status().set_for(ticket, "Detecting language...");
        self.detect_and_translate(ticket, text, target).await
    }

    /// Extract text from an image, then detect and translate it.
    pub async fn ocr_translate_flow(
        &self,
        extractor: &dyn TextExtractor,
        image: &[u8],
        mime: &str,
        target: &str,
    ) -> TranslationView {
        let status = self.status();
        let ticket = status.ticket();
        status.set_for(ticket, "Recognizing text from image (OCR)...");

        let text = match extractor.extract_text(image, mime).await {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, "text extraction failed");
                status.set_for(ticket, "OCR failed");
                return self.view();
            }
        };
        status.set_for(ticket, "OCR done. Detecting language...");
        let view = self.detect_and_translate(ticket, &text, target).await;
        status.set_for(ticket, "OCR + Translation complete");
        view
    }

    /// Reset the view and the status line.
    pub fn clear(&self) {
        let ticket = self.status().ticket();
        self.publish(ticket, |view| *view = TranslationView::default());
        self.status().set_for(ticket, STATUS_READY);
    }

    /// A speech session whose transitions are written to the status line.
    pub fn speech_session(&self, available: bool) -> SpeechSession {
        let status = Arc::clone(self.status());
        let callback: TransitionCallback =
            Arc::new(move |_state: RecognitionState, message: &'static str| status.set(message));
        SpeechSession::new(available).with_callback(callback)
    }

    async fn detect_and_translate(&self, ticket: Ticket, text: &str, target: &str) -> TranslationView {
        let detected = match self.detect_with(ticket, text).await {
            Ok(language) => language,
            Err(err @ (InvokeError::Offline | InvokeError::NoEndpoint)) => {
                debug!(error = %err, "skipping translation");
                return self.publish(ticket, |view| {
                    view.input = text.to_string();
                    view.detected = UNKNOWN_LANGUAGE.to_string();
                    view.translation = TRANSLATION_FAILED.to_string();
                });
            }
            Err(_) => None,
        };

        let translated = self
            .translate_with(ticket, text, detected.as_deref(), target)
            .await
            .ok()
            .flatten();
        if let Some(translated) = &translated {
            self.state().history.push(text, translated.clone());
        }
        self.publish(ticket, |view| {
            view.input = text.to_string();
            view.detected = detected.unwrap_or_else(|| UNKNOWN_LANGUAGE.to_string());
            view.translation = translated.unwrap_or_else(|| TRANSLATION_FAILED.to_string());
        })
    }

    /// Apply `update` to a copy of the view and publish it if `ticket` is
    /// still the newest. Returns the updated copy either way.
    fn publish(&self, ticket: Ticket, update: impl FnOnce(&mut TranslationView)) -> TranslationView {
        let mut state = self.state();
        let mut view = state.view.clone();
        update(&mut view);
        if self.status().is_current(ticket) {
            state.view = view.clone();
        } else {
            debug!(ticket = ticket.id(), "not publishing view from superseded request");
        }
        view
    }
}

impl Translator for TranslatorClient {
    fn translate<'a>(
        &'a self,
        text: &'a str,
        source: Option<&'a str>,
        target: &'a str,
    ) -> CapabilityFuture<'a, String> {
        Box::pin(async move {
            match TranslatorClient::translate(self, text, source, target).await {
                Ok(Some(translated)) => Ok(translated),
                Ok(None) => Err(CapabilityError::Empty),
                Err(err) => Err(err.into()),
            }
        })
    }
}

/// Read a 2xx `/translate` reply.
fn parse_translation(response: &Response) -> InvokeResult<String> {
    let reply: TranslateReply = response
        .json()
        .map_err(|e| InvokeError::Malformed(e.to_string()))?;
    if let Some(error) = reply.error {
        return Err(InvokeError::Service(error));
    }
    match reply.translated_text {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(InvokeError::Malformed("empty translatedText".to_string())),
    }
}

fn detect_failure_message(err: &InvokeError) -> String {
    match err.root_cause() {
        InvokeError::Http { body, .. } => {
            let detail = ServiceError::from_body(body);
            format!("Detection failed: {}", detail.message().unwrap_or("Unknown error"))
        }
        InvokeError::Timeout(_) | InvokeError::Network(_) => {
            "Cannot reach language service — check Python server".to_string()
        }
        other => other.status_message(),
    }
}

fn translate_failure_message(err: &InvokeError) -> String {
    match err.root_cause() {
        InvokeError::Service(error) => format!("Translation failed: {error}"),
        InvokeError::Http { body, .. } => match ServiceError::from_body(body).error {
            Some(error) => format!("Translation failed: {error}"),
            None => TRANSLATE_UNREACHABLE.to_string(),
        },
        InvokeError::Malformed(_) => "Translation returned empty result".to_string(),
        InvokeError::Offline | InvokeError::NoEndpoint => err.status_message(),
        _ => TRANSLATE_UNREACHABLE.to_string(),
    }
}

const TRANSLATE_UNREACHABLE: &str = "Translation service error - check if Python server is running";
