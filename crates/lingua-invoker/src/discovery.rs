//! Endpoint discovery.
//!
//! Probes the candidates in priority order with a short liveness request
//! (`GET /`); the first to answer 2xx becomes the Active Endpoint. Runs
//! are serialized so an older probe sequence can never overwrite the
//! result of a newer one. A run that finds nothing leaves the previous
//! selection in place.

use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::call::call_with_timeout;
use crate::endpoint::{Candidates, Endpoint};
use crate::error::InvokeError;
use crate::transport::{Request, Transport};

/// Result of a single liveness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeResult {
    /// The endpoint returned 2xx (body is not inspected).
    Healthy,
    /// The endpoint answered outside 2xx.
    Unhealthy,
    /// No answer: refused, reset, or timed out.
    Failed,
}

/// Probe `endpoint` with `GET /`, bounded by `timeout`.
pub async fn probe<T: Transport + ?Sized>(transport: &T, endpoint: &Endpoint, timeout: Duration) -> ProbeResult {
    match call_with_timeout(transport, endpoint, &Request::get("/"), timeout).await {
        Ok(_) => ProbeResult::Healthy,
        Err(InvokeError::Http { status, .. }) => {
            debug!(%endpoint, %status, "liveness probe non-2xx");
            ProbeResult::Unhealthy
        }
        Err(e) => {
            debug!(%endpoint, error = %e, "liveness probe failed");
            ProbeResult::Failed
        }
    }
}

pub struct Discovery {
    candidates: Candidates,
    probe_timeout: Duration,
    active: RwLock<Option<Endpoint>>,
    running: Mutex<()>,
}

impl Discovery {
    pub fn new(candidates: Candidates, probe_timeout: Duration) -> Self {
        Self {
            candidates,
            probe_timeout,
            active: RwLock::new(None),
            running: Mutex::new(()),
        }
    }

    pub fn candidates(&self) -> &Candidates {
        &self.candidates
    }

    pub fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }

    /// Change the per-probe deadline. The Active Endpoint is kept.
    pub fn set_probe_timeout(&mut self, probe_timeout: Duration) {
        self.probe_timeout = probe_timeout;
    }

    /// The current Active Endpoint, if discovery has succeeded before.
    pub fn active(&self) -> Option<Endpoint> {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Probe every candidate in order and select the first healthy one.
    ///
    /// Returns `None` when nothing answered; the previous Active Endpoint
    /// is kept in that case.
    pub async fn discover<T: Transport + ?Sized>(&self, transport: &T) -> Option<Endpoint> {
        let _running = self.running.lock().await;

        for candidate in self.candidates.iter() {
            if probe(transport, candidate, self.probe_timeout).await == ProbeResult::Healthy {
                let previous = self
                    .active
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .replace(candidate.clone());
                if previous.as_ref() != Some(candidate) {
                    info!(endpoint = %candidate, "selected backend endpoint");
                }
                return Some(candidate.clone());
            }
        }

        warn!(
            candidates = self.candidates.len(),
            kept = ?self.active(),
            "no candidate endpoint answered the liveness probe"
        );
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Scripted, ScriptedTransport};
    use http::StatusCode;
    use std::sync::Arc;

    fn discovery() -> Discovery {
        Discovery::new(Candidates::local(&[5002, 5003, 5004]), Duration::from_millis(200))
    }

    #[tokio::test]
    async fn selects_first_healthy_in_order() {
        let transport = ScriptedTransport::new().healthy(5003).healthy(5004);
        let discovery = discovery();

        assert_eq!(discovery.discover(&transport).await, Some(Endpoint::local(5003)));
        assert_eq!(discovery.active(), Some(Endpoint::local(5003)));

        // 5004 is never probed once 5003 answers.
        let probed: Vec<_> = transport.calls().into_iter().map(|(port, _)| port).collect();
        assert_eq!(probed, vec![5002, 5003]);
    }

    #[tokio::test]
    async fn non_2xx_candidate_is_skipped() {
        let transport = ScriptedTransport::new()
            .route(5002, "/", Scripted::Reply(StatusCode::INTERNAL_SERVER_ERROR, ""))
            .healthy(5004);
        let discovery = discovery();
        assert_eq!(discovery.discover(&transport).await, Some(Endpoint::local(5004)));
    }

    #[tokio::test]
    async fn malformed_liveness_body_still_counts() {
        let transport =
            ScriptedTransport::new().route(5002, "/", Scripted::Reply(StatusCode::OK, "<html>hi</html>"));
        assert_eq!(discovery().discover(&transport).await, Some(Endpoint::local(5002)));
    }

    #[tokio::test]
    async fn failed_run_keeps_previous_selection() {
        let transport = ScriptedTransport::new().script(
            5002,
            "/",
            vec![
                Scripted::Reply(StatusCode::OK, r#"{"status":"ok"}"#),
                Scripted::Refuse,
            ],
        );
        let discovery = discovery();

        assert_eq!(discovery.discover(&transport).await, Some(Endpoint::local(5002)));
        assert_eq!(discovery.discover(&transport).await, None);
        assert_eq!(discovery.active(), Some(Endpoint::local(5002)));
    }

    #[tokio::test]
    async fn nothing_reachable_sets_nothing() {
        let transport = ScriptedTransport::new();
        let discovery = discovery();
        assert_eq!(discovery.discover(&transport).await, None);
        assert_eq!(discovery.active(), None);
        assert_eq!(transport.calls_to("/"), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn hung_candidate_does_not_stall_the_rest() {
        let transport = ScriptedTransport::new().route(5002, "/", Scripted::Hang).healthy(5003);
        let discovery = discovery();
        assert_eq!(discovery.discover(&transport).await, Some(Endpoint::local(5003)));
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_runs_are_serialized() {
        let transport = Arc::new(ScriptedTransport::new().route(5002, "/", Scripted::Hang).healthy(5003));
        let discovery = Arc::new(discovery());

        let (a, b) = tokio::join!(discovery.discover(transport.as_ref()), discovery.discover(transport.as_ref()));
        assert_eq!(a, Some(Endpoint::local(5003)));
        assert_eq!(b, Some(Endpoint::local(5003)));

        // Serialized: the second run starts only after the first has
        // finished both of its probes.
        let probed: Vec<_> = transport.calls().into_iter().map(|(port, _)| port).collect();
        assert_eq!(probed, vec![5002, 5003, 5002, 5003]);
    }
}
