//! Commands that talk to the local translation service.

use anyhow::{Result, bail};
use lingua_core::{LinguaConfig, UNKNOWN_LANGUAGE, language_name};
use lingua_invoker::{Invoker, TranslatorClient};
use tracing::info;

pub fn client(config: &LinguaConfig) -> Result<TranslatorClient> {
    Ok(TranslatorClient::new(Invoker::from_config(config)?))
}

/// Print the final status line to stderr.
pub fn report_status(client: &TranslatorClient) {
    eprintln!("{}", client.status().current());
}

pub async fn probe(config: &LinguaConfig) -> Result<()> {
    let client = client(config)?;
    let outcome = client.test_backend().await;
    report_status(&client);
    let liveness = outcome?;
    if let Some(endpoint) = client.invoker().active_endpoint() {
        info!(%endpoint, service = liveness.service.as_deref().unwrap_or("-"), "backend");
        println!("{}", endpoint.base_url());
    }
    Ok(())
}

pub async fn detect(config: &LinguaConfig, text: &str) -> Result<()> {
    let client = client(config)?;
    let outcome = client.detect(text).await;
    report_status(&client);
    let language = outcome?.unwrap_or_else(|| UNKNOWN_LANGUAGE.to_string());
    match language_name(&language) {
        Some(name) => println!("{language} ({name})"),
        None => println!("{language}"),
    }
    Ok(())
}

pub async fn translate(config: &LinguaConfig, text: &str, to: &str, from: Option<&str>) -> Result<()> {
    let client = client(config)?;
    if text.trim().is_empty() {
        bail!("Please enter text to translate");
    }
    let translation = match from {
        Some(source) => client.translate(text, Some(source), to).await.ok().flatten(),
        None => {
            let view = client.translate_flow(text, to).await;
            if view.detected != UNKNOWN_LANGUAGE {
                info!(detected = %view.detected, "source language");
            }
            view.translated().map(str::to_string)
        }
    };
    report_status(&client);
    match translation {
        Some(translated) => {
            println!("{translated}");
            Ok(())
        }
        None => bail!("translation failed"),
    }
}
