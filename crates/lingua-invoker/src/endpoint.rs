//! Backend addresses.

use std::fmt;
use std::sync::Arc;

use lingua_core::config::BackendSettings;

/// A `host:port` the translation service may be listening on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Loopback endpoint on `port`.
    pub fn local(port: u16) -> Self {
        Self::new("127.0.0.1", port)
    }

    /// `host:port`, used for the TCP connect and the `Host` header.
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Parse `host:port`.
    pub fn parse(s: &str) -> Option<Self> {
        let (host, port) = s.trim().rsplit_once(':')?;
        if host.is_empty() {
            return None;
        }
        Some(Self::new(host, port.parse().ok()?))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Candidate endpoints in priority order. Immutable once built.
#[derive(Debug, Clone)]
pub struct Candidates(Arc<[Endpoint]>);

impl Candidates {
    pub fn new(endpoints: Vec<Endpoint>) -> Self {
        Self(endpoints.into())
    }

    /// Loopback candidates on the given ports.
    pub fn local(ports: &[u16]) -> Self {
        Self::new(ports.iter().copied().map(Endpoint::local).collect())
    }

    pub fn from_settings(settings: &BackendSettings) -> Self {
        Self::new(
            settings
                .ports
                .iter()
                .map(|port| Endpoint::new(settings.host.clone(), *port))
                .collect(),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = &Endpoint> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_formats() {
        let ep = Endpoint::local(5003);
        assert_eq!(ep.authority(), "127.0.0.1:5003");
        assert_eq!(ep.base_url(), "http://127.0.0.1:5003");
        assert_eq!(ep.to_string(), "127.0.0.1:5003");
    }

    #[test]
    fn endpoint_parse() {
        assert_eq!(Endpoint::parse("localhost:11434"), Some(Endpoint::new("localhost", 11434)));
        assert_eq!(Endpoint::parse("localhost"), None);
        assert_eq!(Endpoint::parse(":80"), None);
        assert_eq!(Endpoint::parse("host:notaport"), None);
    }

    #[test]
    fn candidates_keep_order() {
        let c = Candidates::local(&[5002, 5003, 5004]);
        let ports: Vec<_> = c.iter().map(|e| e.port).collect();
        assert_eq!(ports, vec![5002, 5003, 5004]);
        assert_eq!(c.len(), 3);
    }
}
