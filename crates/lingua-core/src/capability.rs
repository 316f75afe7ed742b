//! Injected capabilities.
//!
//! Translation, OCR and transcription are provided by interchangeable
//! backends: the local translation service (through the invoker), or a
//! hosted text-generation model (through the gateway). Callers depend on
//! these traits so flows can be exercised against fakes.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CapabilityError {
    /// The provider could not be reached or refused the request.
    #[error("provider unavailable: {0}")]
    Unavailable(String),
    /// The provider answered but the answer was unusable.
    #[error("provider returned an unusable reply: {0}")]
    Malformed(String),
    /// The provider answered with nothing.
    #[error("provider returned an empty result")]
    Empty,
}

/// Boxed future alias for capability results.
pub type CapabilityFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, CapabilityError>> + Send + 'a>>;

pub trait Translator: Send + Sync {
    /// Translate `text` into `target`. `source` of `None` means auto-detect.
    fn translate<'a>(
        &'a self,
        text: &'a str,
        source: Option<&'a str>,
        target: &'a str,
    ) -> CapabilityFuture<'a, String>;
}

pub trait TextExtractor: Send + Sync {
    /// Extract all text from an encoded image.
    fn extract_text<'a>(&'a self, image: &'a [u8], mime: &'a str) -> CapabilityFuture<'a, String>;
}

/// Output of a transcription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    pub text: String,
    #[serde(rename = "detectedLang")]
    pub detected_lang: String,
}

pub trait Transcriber: Send + Sync {
    fn transcribe<'a>(&'a self, audio: &'a [u8]) -> CapabilityFuture<'a, Transcript>;
}
