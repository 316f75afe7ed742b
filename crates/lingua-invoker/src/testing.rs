//! Scripted transport for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use http::StatusCode;

use crate::endpoint::Endpoint;
use crate::transport::{Request, Response, Transport, TransportError, TransportFuture};

#[derive(Debug, Clone)]
pub(crate) enum Scripted {
    Reply(StatusCode, &'static str),
    Refuse,
    Hang,
    /// The transport rejects the request before sending it.
    Unbuildable,
}

/// Answers by `(port, path)`. Each route plays its script in order and
/// keeps repeating the last step; unknown routes refuse the connection.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    routes: Mutex<HashMap<(u16, String), VecDeque<Scripted>>>,
    calls: Mutex<Vec<(u16, String)>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn route(self, port: u16, path: &str, step: Scripted) -> Self {
        self.script(port, path, vec![step])
    }

    pub(crate) fn script(self, port: u16, path: &str, steps: Vec<Scripted>) -> Self {
        self.routes
            .lock()
            .unwrap()
            .insert((port, path.to_string()), steps.into());
        self
    }

    /// Mark a candidate healthy for discovery.
    pub(crate) fn healthy(self, port: u16) -> Self {
        self.route(port, "/", Scripted::Reply(StatusCode::OK, r#"{"status":"ok"}"#))
    }

    pub(crate) fn calls(&self) -> Vec<(u16, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn calls_to(&self, path: &str) -> usize {
        self.calls().iter().filter(|(_, p)| p == path).count()
    }

    fn next_step(&self, port: u16, path: &str) -> Scripted {
        let mut routes = self.routes.lock().unwrap();
        match routes.get_mut(&(port, path.to_string())) {
            Some(steps) if steps.len() > 1 => steps.pop_front().unwrap(),
            Some(steps) => steps.front().cloned().unwrap_or(Scripted::Refuse),
            None => Scripted::Refuse,
        }
    }
}

impl Transport for ScriptedTransport {
    fn send<'a>(&'a self, endpoint: &'a Endpoint, request: &'a Request) -> TransportFuture<'a> {
        self.calls
            .lock()
            .unwrap()
            .push((endpoint.port, request.path.clone()));
        let step = self.next_step(endpoint.port, &request.path);
        Box::pin(async move {
            match step {
                Scripted::Reply(status, body) => Ok(Response::new(status, body.as_bytes().to_vec())),
                Scripted::Refuse => Err(TransportError::Connect {
                    endpoint: endpoint.authority(),
                    reason: "connection refused".to_string(),
                }),
                Scripted::Hang => std::future::pending().await,
                Scripted::Unbuildable => Err(TransportError::Request("invalid header name".to_string())),
            }
        })
    }
}
