//! The Resilient Remote Invoker.
//!
//! Owns the transport, discovery state, status line and connectivity
//! signal for one backend. Every call goes: connectivity check → ensure an
//! Active Endpoint (discovering if none) → timeout-bounded call under a
//! retry policy.

use std::sync::Arc;
use std::time::Duration;

use lingua_core::LinguaConfig;
use lingua_core::config::ConfigResult;
use tracing::debug;

use crate::call::call_with_retry;
use crate::connectivity::{AlwaysOnline, Connectivity};
use crate::discovery::Discovery;
use crate::endpoint::{Candidates, Endpoint};
use crate::error::InvokeError;
use crate::retry::{RetryPolicies, RetryPolicy};
use crate::status::StatusLine;
use crate::transport::{HyperTransport, Request, Response, Transport};

/// Default per-request deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);
/// Default per-probe deadline during discovery.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(1);

pub struct Invoker {
    transport: Arc<dyn Transport>,
    discovery: Discovery,
    status: Arc<StatusLine>,
    connectivity: Arc<dyn Connectivity>,
    timeout: Duration,
    policies: RetryPolicies,
}

impl Invoker {
    pub fn new(transport: Arc<dyn Transport>, candidates: Candidates) -> Self {
        Self {
            transport,
            discovery: Discovery::new(candidates, DEFAULT_PROBE_TIMEOUT),
            status: Arc::new(StatusLine::new()),
            connectivity: Arc::new(AlwaysOnline),
            timeout: DEFAULT_TIMEOUT,
            policies: RetryPolicies::default(),
        }
    }

    /// Build an invoker over HTTP from `[backend]` and `[invoke]`.
    pub fn from_config(config: &LinguaConfig) -> ConfigResult<Self> {
        Self::from_config_with(config, Arc::new(HyperTransport::new()))
    }

    /// As [`Invoker::from_config`], over the given transport.
    pub fn from_config_with(config: &LinguaConfig, transport: Arc<dyn Transport>) -> ConfigResult<Self> {
        let backend = config.backend_settings()?;
        let invoke = config.invoke_settings()?;
        Ok(Self::new(transport, Candidates::from_settings(&backend))
            .with_probe_timeout(backend.probe_timeout)
            .with_timeout(invoke.timeout)
            .with_policies(RetryPolicies::from_config(config)?))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_probe_timeout(mut self, probe_timeout: Duration) -> Self {
        self.discovery.set_probe_timeout(probe_timeout);
        self
    }

    pub fn with_policies(mut self, policies: RetryPolicies) -> Self {
        self.policies = policies;
        self
    }

    pub fn with_connectivity(mut self, connectivity: Arc<dyn Connectivity>) -> Self {
        self.connectivity = connectivity;
        self
    }

    pub fn with_status(mut self, status: Arc<StatusLine>) -> Self {
        self.status = status;
        self
    }

    pub fn status(&self) -> &Arc<StatusLine> {
        &self.status
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Retry policy of each client operation.
    pub fn policies(&self) -> &RetryPolicies {
        &self.policies
    }

    pub fn is_online(&self) -> bool {
        self.connectivity.is_online()
    }

    pub fn active_endpoint(&self) -> Option<Endpoint> {
        self.discovery.active()
    }

    pub fn candidates(&self) -> &Candidates {
        self.discovery.candidates()
    }

    /// Re-run discovery.
    pub async fn discover(&self) -> Result<Endpoint, InvokeError> {
        if !self.is_online() {
            return Err(InvokeError::Offline);
        }
        self.discovery
            .discover(self.transport.as_ref())
            .await
            .ok_or(InvokeError::NoEndpoint)
    }

    /// The Active Endpoint, discovering one if none is selected yet.
    pub async fn ensure_endpoint(&self) -> Result<Endpoint, InvokeError> {
        match self.active_endpoint() {
            Some(endpoint) => Ok(endpoint),
            None => self.discover().await,
        }
    }

    /// Send `request` to the Active Endpoint under `policy`.
    pub async fn invoke(&self, request: &Request, policy: RetryPolicy) -> Result<Response, InvokeError> {
        if !self.is_online() {
            debug!(path = %request.path, "offline, skipping request");
            return Err(InvokeError::Offline);
        }
        let endpoint = self.ensure_endpoint().await?;
        call_with_retry(self.transport.as_ref(), &endpoint, request, self.timeout, &policy).await
    }
}
