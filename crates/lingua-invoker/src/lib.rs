//! lingua-invoker — resilient calls to the local translation service.
//!
//! Discovers a reachable backend among a fixed list of loopback
//! candidates, issues timeout-bounded HTTP requests, retries transient
//! failures with capped exponential backoff, and reports every state
//! transition to a single last-write-wins status line.
//!
//! # Architecture
//!
//! ```text
//! TranslatorClient (detect / translate / test_backend / flows)
//!   └── Invoker
//!         ├── Connectivity ── offline short-circuit
//!         ├── Discovery ───── probe candidates in order → Active Endpoint
//!         ├── retry() ─────── RetryPolicy, base * 2^i capped at 10s
//!         │     └── call_with_timeout() → Transport (hyper HTTP/1)
//!         └── StatusLine ──── watch slot + request tickets
//! ```
//!
//! Only `Timeout` and `Network` failures are retried. A non-2xx reply is
//! returned to the caller immediately as `InvokeError::Http`.

pub mod call;
pub mod client;
pub mod connectivity;
pub mod discovery;
pub mod endpoint;
pub mod error;
pub mod invoker;
pub mod retry;
pub mod status;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use call::{call_with_retry, call_with_timeout};
pub use client::{TranslationView, TranslatorClient};
pub use connectivity::{AlwaysOnline, Connectivity, OnlineFlag};
pub use discovery::{Discovery, ProbeResult, probe};
pub use endpoint::{Candidates, Endpoint};
pub use error::{InvokeError, InvokeResult};
pub use invoker::Invoker;
pub use retry::{RetryPolicies, RetryPolicy, retry};
pub use status::{StatusLine, Ticket};
pub use transport::{HyperTransport, Request, Response, Transport, TransportError};
