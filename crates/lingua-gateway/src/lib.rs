//! lingua-gateway — HTTP gateway for translation, OCR and speech.
//!
//! Fronts a text-generation model with the JSON routes the translator UI
//! calls. The model is reached through [`TextGenerator`]; the routes only
//! see the capability traits from `lingua-core`, so any provider (or a
//! fake in tests) can stand behind them.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/` | Liveness |
//! | POST | `/api/translate` | `{text, sourceLang, targetLang}` → `{translatedText}` |
//! | POST | `/api/ocr` | multipart `image` → `{text}` |
//! | POST | `/api/speech-to-text` | multipart `audio` → `{text, detectedLang}` |
//! | POST | `/api/text-to-speech` | `{text, lang}` → `{audioUrl}` |

pub mod capabilities;
pub mod generator;
pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use lingua_core::{TextExtractor, Transcriber, Translator};

pub use capabilities::GeneratorCapabilities;
pub use generator::{ChatCompletionsGenerator, ChatMessage, GenerateError, TextGenerator};

/// Largest accepted upload.
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Shared state for gateway handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub translator: Arc<dyn Translator>,
    pub extractor: Arc<dyn TextExtractor>,
    pub transcriber: Arc<dyn Transcriber>,
}

impl GatewayState {
    /// Serve every capability from one text generator.
    pub fn from_generator(generator: Arc<dyn TextGenerator>) -> Self {
        let caps = Arc::new(GeneratorCapabilities::new(generator));
        Self {
            translator: caps.clone(),
            extractor: caps.clone(),
            transcriber: caps,
        }
    }
}

/// Build the gateway router.
pub fn build_router(state: GatewayState) -> Router {
    let api_routes = Router::new()
        .route("/translate", post(handlers::translate))
        .route("/ocr", post(handlers::ocr))
        .route("/speech-to-text", post(handlers::speech_to_text))
        .route("/text-to-speech", post(handlers::text_to_speech))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state);

    Router::new()
        .route("/", get(handlers::liveness))
        .nest("/api", api_routes)
}
