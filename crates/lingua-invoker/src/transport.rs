//! HTTP transport.
//!
//! `Transport` is the seam between the invoker and the network: the
//! production `HyperTransport` opens a TCP connection per request and
//! speaks HTTP/1.1 over it; tests inject scripted transports.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use http::header::{ACCEPT, CONTENT_TYPE, HOST, USER_AGENT};
use http::{Method, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper_util::rt::TokioIo;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::endpoint::Endpoint;

const JSON: &str = "application/json";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// No connection could be established.
    #[error("connection to {endpoint} failed: {reason}")]
    Connect { endpoint: String, reason: String },

    /// The connection was established but the exchange failed.
    #[error("HTTP exchange with {endpoint} failed: {reason}")]
    Protocol { endpoint: String, reason: String },

    /// The request could not be built.
    #[error("invalid request: {0}")]
    Request(String),
}

/// One HTTP request, built fresh per call.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Bytes>,
    /// Overrides the invoker's default timeout for this request.
    pub timeout: Option<Duration>,
}

impl Request {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            headers: Vec::new(),
            body: None,
            timeout: None,
        }
    }

    /// POST with `payload` serialized as the JSON body.
    pub fn post_json<T: Serialize>(path: impl Into<String>, payload: &T) -> Result<Self, TransportError> {
        let body = serde_json::to_vec(payload).map_err(|e| TransportError::Request(e.to_string()))?;
        Ok(Self {
            method: Method::POST,
            path: path.into(),
            headers: Vec::new(),
            body: Some(Bytes::from(body)),
            timeout: None,
        })
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// A fully buffered HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: StatusCode,
    pub body: Bytes,
}

impl Response {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Boxed future alias for transport results.
pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Response, TransportError>> + Send + 'a>>;

/// Sends a single request to an endpoint. No retries, no deadline: those
/// are layered on top by `call_with_timeout` and `retry`.
pub trait Transport: Send + Sync {
    fn send<'a>(&'a self, endpoint: &'a Endpoint, request: &'a Request) -> TransportFuture<'a>;
}

/// HTTP/1.1 over a fresh tokio TCP connection per request.
#[derive(Debug, Clone)]
pub struct HyperTransport {
    user_agent: String,
}

impl HyperTransport {
    pub fn new() -> Self {
        Self {
            user_agent: format!("lingua/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    async fn exchange(&self, endpoint: &Endpoint, request: &Request) -> Result<Response, TransportError> {
        let authority = endpoint.authority();
        let protocol = |reason: String| TransportError::Protocol {
            endpoint: authority.clone(),
            reason,
        };

        let stream = TcpStream::connect(&authority)
            .await
            .map_err(|e| TransportError::Connect {
                endpoint: authority.clone(),
                reason: e.to_string(),
            })?;

        let io = TokioIo::new(stream);
        let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
            .await
            .map_err(|e| protocol(e.to_string()))?;

        // Drive the connection in the background; the guard tears it down
        // when this exchange finishes or is cancelled.
        let endpoint_label = authority.clone();
        let _conn = ConnectionTask(tokio::spawn(async move {
            if let Err(e) = conn.await {
                debug!(error = %e, endpoint = %endpoint_label, "connection closed with error");
            }
        }));

        let mut builder = http::Request::builder()
            .method(request.method.clone())
            .uri(request.path.as_str())
            .header(HOST, authority.as_str())
            .header(USER_AGENT, self.user_agent.as_str())
            .header(ACCEPT, JSON)
            .header(CONTENT_TYPE, JSON);
        for (name, value) in &request.headers {
            if name.eq_ignore_ascii_case(CONTENT_TYPE.as_str()) {
                continue;
            }
            builder = builder.header(name.as_str(), value.as_str());
        }
        let req = builder
            .body(Full::new(request.body.clone().unwrap_or_default()))
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let resp = sender
            .send_request(req)
            .await
            .map_err(|e| protocol(e.to_string()))?;
        let status = resp.status();
        let body = resp
            .into_body()
            .collect()
            .await
            .map_err(|e| protocol(e.to_string()))?
            .to_bytes();

        debug!(endpoint = %authority, method = %request.method, path = %request.path, %status, "http exchange complete");
        Ok(Response { status, body })
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HyperTransport {
    fn send<'a>(&'a self, endpoint: &'a Endpoint, request: &'a Request) -> TransportFuture<'a> {
        Box::pin(self.exchange(endpoint, request))
    }
}

/// Aborts the connection driver on drop.
struct ConnectionTask(JoinHandle<()>);

impl Drop for ConnectionTask {
    fn drop(&mut self) {
        self.0.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_json_serializes_body() {
        let req = Request::post_json("/detect", &serde_json::json!({"q": "Bonjour"})).unwrap();
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.body.unwrap(), Bytes::from_static(br#"{"q":"Bonjour"}"#));
    }

    #[test]
    fn response_json() {
        let resp = Response::new(StatusCode::OK, &br#"{"status":"ok"}"#[..]);
        let live: lingua_core::Liveness = resp.json().unwrap();
        assert!(live.is_ok());
        assert!(resp.is_success());
    }

    #[tokio::test]
    async fn connect_to_closed_port_fails() {
        // Port 1 won't be listening.
        let transport = HyperTransport::new();
        let err = transport
            .send(&Endpoint::local(1), &Request::get("/"))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Connect { .. }));
    }
}
