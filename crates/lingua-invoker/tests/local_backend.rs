//! Invoker against a real translation service on loopback.
//!
//! Each test starts an axum stand-in for the local translation service on
//! an ephemeral port and mixes it with ports nothing listens on.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::{Json, Router};
use lingua_core::{DetectRequest, TranslateRequest};
use lingua_invoker::{
    Candidates, Endpoint, HyperTransport, InvokeError, Invoker, OnlineFlag, Request, RetryPolicy, TranslatorClient,
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

async fn detect(Json(req): Json<DetectRequest>) -> Json<Value> {
    let language = if req.q.contains("Bonjour") { "fr" } else { "en" };
    Json(json!([{ "language": language, "confidence": 0.9 }]))
}

async fn translate(Json(req): Json<TranslateRequest>) -> Json<Value> {
    match (req.q.as_str(), req.target.as_str()) {
        ("Hello", "es") => Json(json!({ "translatedText": "Hola", "src": req.source, "dest": "es" })),
        _ => Json(json!({ "error": "unsupported pair" })),
    }
}

async fn spawn_service() -> u16 {
    let app = Router::new()
        .route("/", get(|| async { Json(json!({ "status": "ok", "service": "translator" })) }))
        .route("/detect", post(detect))
        .route("/translate", post(translate));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    port
}

/// A loopback port with nothing listening on it.
fn dead_port() -> u16 {
    let listener = std::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).unwrap();
    listener.local_addr().unwrap().port()
}

fn client(ports: &[u16]) -> TranslatorClient {
    let invoker = Invoker::new(Arc::new(HyperTransport::new()), Candidates::local(ports))
        .with_probe_timeout(Duration::from_millis(500))
        .with_timeout(Duration::from_secs(2));
    TranslatorClient::new(invoker)
}

#[tokio::test]
async fn discovery_skips_dead_candidates() {
    let live = spawn_service().await;
    let client = client(&[dead_port(), live, dead_port()]);

    client.start().await.unwrap();
    assert_eq!(client.invoker().active_endpoint(), Some(Endpoint::local(live)));
}

#[tokio::test]
async fn detects_and_translates() {
    let live = spawn_service().await;
    let client = client(&[dead_port(), live]);

    assert_eq!(client.detect("Bonjour le monde").await.unwrap().as_deref(), Some("fr"));

    let out = client.translate("Hello", Some("en"), "es").await.unwrap();
    assert_eq!(out.as_deref(), Some("Hola"));
    assert_eq!(client.status().current(), "Translation complete");

    let err = client.translate("Hello", Some("en"), "xx").await.unwrap_err();
    assert_eq!(err, InvokeError::Service("unsupported pair".into()));
    assert_eq!(client.status().current(), "Translation failed: unsupported pair");
}

#[tokio::test]
async fn full_flow_records_history() {
    let live = spawn_service().await;
    let client = client(&[live]);

    let view = client.translate_flow("Hello", "es").await;
    assert_eq!(view.detected, "en");
    assert_eq!(view.translation, "Hola");
    assert_eq!(client.history().len(), 1);

    client.test_backend().await.unwrap();
    assert_eq!(client.status().current(), "Backend reachable");
}

#[tokio::test]
async fn nothing_listening() {
    let client = client(&[dead_port(), dead_port(), dead_port()]);

    assert_eq!(client.start().await.unwrap_err(), InvokeError::NoEndpoint);
    assert_eq!(client.status().current(), "Could not find running Python server");
    assert_eq!(client.invoker().active_endpoint(), None);
}

#[tokio::test]
async fn unknown_route_is_an_http_error() {
    let live = spawn_service().await;
    let client = client(&[live]);

    let err = client
        .invoker()
        .invoke(&Request::get("/missing"), RetryPolicy::translate())
        .await
        .unwrap_err();
    match err {
        InvokeError::Http { status, .. } => assert_eq!(status.as_u16(), 404),
        other => panic!("expected HTTP error, got {other:?}"),
    }
}

#[tokio::test]
async fn offline_short_circuits() {
    let live = spawn_service().await;
    let flag = OnlineFlag::new(false);
    let invoker = Invoker::new(Arc::new(HyperTransport::new()), Candidates::local(&[live]))
        .with_connectivity(Arc::new(flag.clone()));
    let client = TranslatorClient::new(invoker);

    assert_eq!(client.detect("Hello").await.unwrap_err(), InvokeError::Offline);
    assert_eq!(client.invoker().active_endpoint(), None);

    flag.set_online(true);
    assert_eq!(client.detect("Hello").await.unwrap().as_deref(), Some("en"));
}
