//! `lingua ocr` — extract text with the gateway's model, translate locally.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use lingua_core::LinguaConfig;
use lingua_gateway::{ChatCompletionsGenerator, GeneratorCapabilities};

use super::backend::{client, report_status};

pub async fn ocr(config: &LinguaConfig, image: &Path, to: &str) -> Result<()> {
    let bytes = std::fs::read(image).with_context(|| format!("reading {}", image.display()))?;
    let generator = ChatCompletionsGenerator::from_settings(&config.gateway_settings(), &config.invoke_settings()?)?;
    let extractor = GeneratorCapabilities::new(Arc::new(generator));

    let client = client(config)?;
    let view = client.ocr_translate_flow(&extractor, &bytes, mime_for(image), to).await;
    report_status(&client);

    if !view.input.is_empty() {
        println!("{}", view.input.trim_end());
        println!("---");
    }
    match view.translated() {
        Some(translated) => {
            println!("{translated}");
            Ok(())
        }
        None => bail!("OCR translation failed"),
    }
}

/// Image MIME type from the file extension.
pub fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_from_extension() {
        assert_eq!(mime_for(Path::new("sign.PNG")), "image/png");
        assert_eq!(mime_for(Path::new("menu.jpeg")), "image/jpeg");
        assert_eq!(mime_for(Path::new("scan")), "application/octet-stream");
    }
}
