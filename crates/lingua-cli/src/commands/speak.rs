//! `lingua speak` — placeholder text-to-speech.

use anyhow::{Result, bail};
use lingua_core::wav;
use tracing::info;

pub fn speak(text: &str, lang: Option<&str>) -> Result<()> {
    if text.is_empty() {
        bail!("No text provided");
    }
    info!(lang = lang.unwrap_or("-"), seconds = wav::estimated_seconds(text), "placeholder audio");
    println!("{}", wav::placeholder_data_url(text));
    eprintln!("Speaking...");
    Ok(())
}
