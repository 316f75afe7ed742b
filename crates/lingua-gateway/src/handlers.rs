//! HTTP handlers.
//!
//! Every route answers JSON. Failures carry `{ "error": "..." }` with a
//! fixed, route-specific message; the underlying cause is logged only.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use lingua_core::wav;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use crate::GatewayState;

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

fn error_response(msg: &str, status: StatusCode) -> Response {
    (status, Json(ErrorBody { error: msg })).into_response()
}

/// An uploaded multipart file.
struct Upload {
    bytes: Vec<u8>,
    mime: String,
}

/// Find the field named `name`. `Ok(None)` when absent.
async fn read_upload(multipart: &mut Multipart, name: &str) -> Result<Option<Upload>, String> {
    while let Some(field) = multipart.next_field().await.map_err(|e| e.to_string())? {
        if field.name() != Some(name) {
            continue;
        }
        let mime = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field.bytes().await.map_err(|e| e.to_string())?;
        return Ok(Some(Upload {
            bytes: bytes.to_vec(),
            mime,
        }));
    }
    Ok(None)
}

// ── Liveness ───────────────────────────────────────────────────

/// GET /
pub async fn liveness() -> impl IntoResponse {
    Json(json!({ "status": "ok", "service": "lingua-gateway" }))
}

// ── Translation ────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TranslateBody {
    #[serde(default)]
    pub text: String,
    #[serde(default, rename = "sourceLang")]
    pub source_lang: Option<String>,
    #[serde(rename = "targetLang")]
    pub target_lang: String,
}

/// POST /api/translate
pub async fn translate(
    State(state): State<GatewayState>,
    body: Result<Json<TranslateBody>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(e) => {
            error!(error = %e, "translate: bad request body");
            return error_response("Translation failed", StatusCode::INTERNAL_SERVER_ERROR);
        }
    };
    let source = body.source_lang.as_deref().filter(|s| !s.is_empty());
    match state.translator.translate(&body.text, source, &body.target_lang).await {
        Ok(translated) => {
            info!(target_lang = %body.target_lang, chars = body.text.len(), "translated");
            Json(json!({ "translatedText": translated })).into_response()
        }
        Err(e) => {
            error!(error = %e, "translation failed");
            error_response("Translation failed", StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

// ── OCR ────────────────────────────────────────────────────────

/// POST /api/ocr (multipart field `image`)
pub async fn ocr(State(state): State<GatewayState>, mut multipart: Multipart) -> Response {
    let upload = match read_upload(&mut multipart, "image").await {
        Ok(Some(upload)) => upload,
        Ok(None) => return error_response("No image file provided", StatusCode::BAD_REQUEST),
        Err(e) => {
            error!(error = %e, "ocr: unreadable upload");
            return error_response("OCR processing failed", StatusCode::INTERNAL_SERVER_ERROR);
        }
    };
    match state.extractor.extract_text(&upload.bytes, &upload.mime).await {
        Ok(text) => {
            info!(bytes = upload.bytes.len(), mime = %upload.mime, "text extracted");
            Json(json!({ "text": text })).into_response()
        }
        Err(e) => {
            error!(error = %e, "OCR failed");
            error_response("OCR processing failed", StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

// ── Speech ─────────────────────────────────────────────────────

/// POST /api/speech-to-text (multipart field `audio`)
pub async fn speech_to_text(State(state): State<GatewayState>, mut multipart: Multipart) -> Response {
    let upload = match read_upload(&mut multipart, "audio").await {
        Ok(Some(upload)) => upload,
        Ok(None) => return error_response("No audio file provided", StatusCode::BAD_REQUEST),
        Err(e) => {
            error!(error = %e, "speech-to-text: unreadable upload");
            return error_response("Speech-to-text conversion failed", StatusCode::INTERNAL_SERVER_ERROR);
        }
    };
    match state.transcriber.transcribe(&upload.bytes).await {
        Ok(transcript) => Json(transcript).into_response(),
        Err(e) => {
            error!(error = %e, "speech-to-text failed");
            error_response("Speech-to-text conversion failed", StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SpeakBody {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub lang: Option<String>,
}

/// POST /api/text-to-speech
pub async fn text_to_speech(body: Result<Json<SpeakBody>, JsonRejection>) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(e) => {
            error!(error = %e, "text-to-speech: bad request body");
            return error_response("Text-to-speech conversion failed", StatusCode::INTERNAL_SERVER_ERROR);
        }
    };
    let text = match body.text.as_deref() {
        Some(text) if !text.is_empty() => text,
        _ => return error_response("No text provided", StatusCode::BAD_REQUEST),
    };
    info!(lang = body.lang.as_deref().unwrap_or("-"), chars = text.len(), "rendering placeholder audio");
    Json(json!({ "audioUrl": wav::placeholder_data_url(text) })).into_response()
}
