//! Placeholder speech synthesis.
//!
//! Until a real TTS provider is wired in, text-to-speech answers with a
//! WAV header sized for a rough duration estimate (one second per ten
//! characters, at least one second) encoded as a `data:` URL.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

pub const SAMPLE_RATE: u32 = 16_000;
const BITS_PER_SAMPLE: u16 = 16;
const CHANNELS: u16 = 1;
const BYTES_PER_SECOND: u32 = SAMPLE_RATE * (CHANNELS * BITS_PER_SAMPLE / 8) as u32;

/// Longest duration whose RIFF size still fits in a `u32`.
pub const MAX_SECONDS: u32 = (u32::MAX - 36) / BYTES_PER_SECOND;

/// Estimated spoken duration in whole seconds, at most [`MAX_SECONDS`].
pub fn estimated_seconds(text: &str) -> u32 {
    let seconds = text.chars().count().div_ceil(10).max(1);
    u32::try_from(seconds).unwrap_or(u32::MAX).min(MAX_SECONDS)
}

/// 44-byte PCM WAV header for `seconds` of 16 kHz mono 16-bit audio.
/// Durations beyond [`MAX_SECONDS`] are clamped.
pub fn wav_header(seconds: u32) -> [u8; 44] {
    let block_align = CHANNELS * BITS_PER_SAMPLE / 8;
    let byte_rate = BYTES_PER_SECOND;
    let data_len = seconds.min(MAX_SECONDS) * BYTES_PER_SECOND;

    let mut h = [0u8; 44];
    h[0..4].copy_from_slice(b"RIFF");
    h[4..8].copy_from_slice(&(36 + data_len).to_le_bytes());
    h[8..12].copy_from_slice(b"WAVE");
    h[12..16].copy_from_slice(b"fmt ");
    h[16..20].copy_from_slice(&16u32.to_le_bytes());
    h[20..22].copy_from_slice(&1u16.to_le_bytes()); // PCM
    h[22..24].copy_from_slice(&CHANNELS.to_le_bytes());
    h[24..28].copy_from_slice(&SAMPLE_RATE.to_le_bytes());
    h[28..32].copy_from_slice(&byte_rate.to_le_bytes());
    h[32..34].copy_from_slice(&block_align.to_le_bytes());
    h[34..36].copy_from_slice(&BITS_PER_SAMPLE.to_le_bytes());
    h[36..40].copy_from_slice(b"data");
    h[40..44].copy_from_slice(&data_len.to_le_bytes());
    h
}

/// `data:audio/wav;base64,...` URL for the placeholder audio of `text`.
pub fn placeholder_data_url(text: &str) -> String {
    let header = wav_header(estimated_seconds(text));
    format!("data:audio/wav;base64,{}", STANDARD.encode(header))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_estimate() {
        assert_eq!(estimated_seconds(""), 1);
        assert_eq!(estimated_seconds("hello"), 1);
        assert_eq!(estimated_seconds("hello world"), 2);
        assert_eq!(estimated_seconds(&"a".repeat(30)), 3);
    }

    #[test]
    fn header_layout() {
        let h = wav_header(2);
        assert_eq!(&h[0..4], b"RIFF");
        assert_eq!(&h[8..12], b"WAVE");
        assert_eq!(&h[36..40], b"data");
        let data_len = u32::from_le_bytes(h[40..44].try_into().unwrap());
        assert_eq!(data_len, 2 * 16_000 * 2);
        let riff_len = u32::from_le_bytes(h[4..8].try_into().unwrap());
        assert_eq!(riff_len, 36 + data_len);
    }

    #[test]
    fn long_text_is_clamped_to_a_valid_header() {
        let text = "a".repeat(1_400_000);
        assert_eq!(estimated_seconds(&text), MAX_SECONDS);

        let h = wav_header(estimated_seconds(&text));
        let data_len = u32::from_le_bytes(h[40..44].try_into().unwrap());
        let riff_len = u32::from_le_bytes(h[4..8].try_into().unwrap());
        assert_eq!(data_len, MAX_SECONDS * 16_000 * 2);
        assert_eq!(riff_len, 36 + data_len);
        assert_eq!(wav_header(u32::MAX), h);

        assert!(placeholder_data_url(&text).starts_with("data:audio/wav;base64,UklGR"));
    }

    #[test]
    fn data_url_prefix() {
        let url = placeholder_data_url("Hola");
        assert!(url.starts_with("data:audio/wav;base64,UklGR"));
    }
}
