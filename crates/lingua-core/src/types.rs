//! Wire types for the local translation service.
//!
//! The service answers `GET /` with a liveness body, `POST /detect` with
//! a list of detections, and `POST /translate` with either a translation
//! or an error object. Replies are parsed leniently: missing fields are
//! `None`, never a hard deserialization failure.

use serde::{Deserialize, Serialize};

/// Source language sentinel meaning "let the service decide".
pub const AUTO: &str = "auto";

/// Rendered in place of a language code when detection yields nothing.
pub const UNKNOWN_LANGUAGE: &str = "unknown";

/// Body of `GET /`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Liveness {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}

impl Liveness {
    pub fn is_ok(&self) -> bool {
        self.status.as_deref() == Some("ok")
    }
}

/// Body of `POST /detect`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectRequest {
    pub q: String,
}

/// One entry of the `/detect` reply array.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Detection {
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// Body of `POST /translate`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranslateRequest {
    pub q: String,
    pub source: String,
    pub target: String,
}

impl TranslateRequest {
    /// Build a request, mapping a missing or empty source to `auto`.
    pub fn new(q: impl Into<String>, source: Option<&str>, target: impl Into<String>) -> Self {
        let source = match source {
            Some(s) if !s.trim().is_empty() => s.to_string(),
            _ => AUTO.to_string(),
        };
        Self {
            q: q.into(),
            source,
            target: target.into(),
        }
    }
}

/// Reply of `POST /translate`: either `translatedText` or `error`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TranslateReply {
    #[serde(rename = "translatedText", default, skip_serializing_if = "Option::is_none")]
    pub translated_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest: Option<String>,
}

/// Error body returned by the service on non-2xx (`detail` or `error`).
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ServiceError {
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ServiceError {
    /// Parse an error body, tolerating non-JSON payloads.
    pub fn from_body(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }

    pub fn message(&self) -> Option<&str> {
        self.detail.as_deref().or(self.error.as_deref())
    }
}

/// Extract the first detected language from a `/detect` reply body.
///
/// Anything other than a non-empty array whose first element carries a
/// string `language` yields `None`.
pub fn first_language(body: &[u8]) -> Option<String> {
    let detections: Vec<Detection> = serde_json::from_slice(body).ok()?;
    detections
        .into_iter()
        .next()?
        .language
        .filter(|l| !l.trim().is_empty())
}
