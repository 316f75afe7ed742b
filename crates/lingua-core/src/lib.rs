//! lingua-core — shared types for the Lingua translator.
//!
//! Holds everything that does not touch the network: `lingua.toml`
//! parsing, the wire types spoken by the local translation service,
//! the supported language table, the bounded translation history,
//! the speech-recognition state machine, and the capability traits
//! (`Translator`, `TextExtractor`, `Transcriber`) that the invoker and
//! gateway implement.

pub mod capability;
pub mod config;
pub mod history;
pub mod languages;
pub mod speech;
pub mod types;
pub mod wav;

pub use capability::{CapabilityError, TextExtractor, Transcriber, Transcript, Translator};
pub use config::{ConfigError, LinguaConfig};
pub use history::{HistoryEntry, TranslationHistory};
pub use languages::{LANGUAGES, language_name};
pub use speech::{RecognitionEvent, RecognitionState, SpeechResult, SpeechSession};
pub use types::*;
