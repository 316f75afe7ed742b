//! `lingua serve` — run the HTTP gateway until Ctrl-C.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use lingua_core::LinguaConfig;
use lingua_gateway::{ChatCompletionsGenerator, GatewayState, build_router};
use tracing::{error, info};

pub async fn serve(config: &LinguaConfig, listen: Option<&str>) -> Result<()> {
    let settings = config.gateway_settings();
    let listen = listen.unwrap_or(settings.listen.as_str());
    let addr: SocketAddr = listen.parse().with_context(|| format!("invalid listen address {listen:?}"))?;

    let generator = ChatCompletionsGenerator::from_settings(&settings, &config.invoke_settings()?)?;
    info!(endpoint = %generator.endpoint(), model = %generator.model(), "text generator");
    let router = build_router(GatewayState::from_generator(Arc::new(generator)));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "gateway listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
            info!("shutdown signal received");
        })
        .await?;

    info!("gateway stopped");
    Ok(())
}
