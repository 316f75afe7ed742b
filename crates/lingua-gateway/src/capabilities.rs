//! Translation, OCR and transcription on top of a [`TextGenerator`].

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use lingua_core::capability::CapabilityFuture;
use lingua_core::{AUTO, TextExtractor, Transcriber, Transcript, Translator};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::generator::{ChatMessage, TextGenerator};

const EXTRACT_PROMPT: &str = "Extract all text from this image. Return only the extracted text, nothing else.";

const TRANSCRIBE_PROMPT: &str = "You are a speech-to-text converter. Simulate transcribing audio and detecting language.\n\
Return a JSON response with: { \"text\": \"sample transcribed text\", \"detectedLang\": \"en\" }\n\
Make the response realistic and varied.";

/// Returned when the model's transcription reply is not the expected JSON.
pub const FALLBACK_TRANSCRIPT: &str = "Sample transcription: Hello, this is a test message.";
pub const FALLBACK_LANGUAGE: &str = "en";

pub fn translate_prompt(text: &str, source: &str, target: &str) -> String {
    format!(
        "Translate the following text from {source} to {target}. Only provide the translation, nothing else.\n\nText: {text}"
    )
}

#[derive(Deserialize)]
struct GeneratedTranscript {
    #[serde(default)]
    text: Option<String>,
    #[serde(default, rename = "detectedLang")]
    detected_lang: Option<String>,
}

/// Parse the model's transcription reply, falling back to a fixed sample.
pub fn parse_transcript(reply: &str) -> Transcript {
    match serde_json::from_str::<GeneratedTranscript>(reply.trim()) {
        Ok(parsed) => Transcript {
            text: parsed
                .text
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "Sample transcription".to_string()),
            detected_lang: parsed
                .detected_lang
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| FALLBACK_LANGUAGE.to_string()),
        },
        Err(e) => {
            debug!(error = %e, "transcription reply is not JSON, using fallback");
            Transcript {
                text: FALLBACK_TRANSCRIPT.to_string(),
                detected_lang: FALLBACK_LANGUAGE.to_string(),
            }
        }
    }
}

#[derive(Clone)]
pub struct GeneratorCapabilities {
    generator: Arc<dyn TextGenerator>,
}

impl GeneratorCapabilities {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }
}

impl Translator for GeneratorCapabilities {
    fn translate<'a>(
        &'a self,
        text: &'a str,
        source: Option<&'a str>,
        target: &'a str,
    ) -> CapabilityFuture<'a, String> {
        Box::pin(async move {
            let prompt = translate_prompt(text, source.unwrap_or(AUTO), target);
            let messages = [ChatMessage::user(prompt)];
            Ok(self.generator.generate(&messages).await?)
        })
    }
}

impl TextExtractor for GeneratorCapabilities {
    fn extract_text<'a>(&'a self, image: &'a [u8], mime: &'a str) -> CapabilityFuture<'a, String> {
        Box::pin(async move {
            let data_url = format!("data:{mime};base64,{}", STANDARD.encode(image));
            let messages = [ChatMessage::user_with_image(data_url, EXTRACT_PROMPT)];
            Ok(self.generator.generate(&messages).await?)
        })
    }
}

impl Transcriber for GeneratorCapabilities {
    fn transcribe<'a>(&'a self, audio: &'a [u8]) -> CapabilityFuture<'a, Transcript> {
        Box::pin(async move {
            // The model only simulates a transcription; the audio is not sent.
            if audio.is_empty() {
                warn!("transcribing an empty audio upload");
            }
            let messages = [ChatMessage::user(TRANSCRIBE_PROMPT)];
            let reply = self.generator.generate(&messages).await?;
            Ok(parse_transcript(&reply))
        })
    }
}
