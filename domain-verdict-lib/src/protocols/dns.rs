//! DNS probing for domain availability inference.
//!
//! Resolution is treated as a registration signal, not a liveness check: a
//! domain that resolves to at least one address is almost certainly
//! registered, an authoritative NXDOMAIN means it does not resolve, and
//! everything else (timeouts, SERVFAIL, refused queries) stays indeterminate
//! so the verdict layer never mistakes network trouble for availability.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use hickory_resolver::config::{NameServerConfig, Protocol, ResolverConfig, ResolverOpts};
use hickory_resolver::error::ResolveErrorKind;
use hickory_resolver::proto::op::ResponseCode;
use hickory_resolver::TokioAsyncResolver;
use tracing::{debug, instrument};

use crate::error::DomainCheckError;
use crate::types::DnsSignal;

/// Default port for DNS queries.
const DNS_PORT: u16 = 53;

/// Default per-probe timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// DNS prober that resolves A/AAAA records through a recursive resolver.
///
/// Uses well-known public resolvers by default so results do not depend on
/// the local stub resolver's cache or search-domain configuration. A custom
/// nameserver (IP or IP:port) can be supplied for split-horizon setups and
/// tests.
#[derive(Debug, Clone)]
pub struct DnsProber {
    /// Per-attempt resolution budget
    timeout: Duration,

    /// Custom nameserver spec, IP or IP:port
    nameserver: Option<String>,
}

impl DnsProber {
    /// Create a new DNS prober with default settings.
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            nameserver: None,
        }
    }

    /// Create a new DNS prober with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            nameserver: None,
        }
    }

    /// Create a prober with a custom timeout and an optional nameserver.
    pub fn with_config(timeout: Duration, nameserver: Option<String>) -> Self {
        Self {
            timeout,
            nameserver,
        }
    }

    /// Resolve a domain and classify the outcome as a signal.
    ///
    /// Lookup outcomes, including NXDOMAIN, server failures and timeouts,
    /// are classifications, not errors; they all return `Ok`.
    ///
    /// # Errors
    ///
    /// `ConfigError` when the configured nameserver spec cannot be parsed.
    #[instrument(skip(self), fields(domain = %domain))]
    pub async fn probe(&self, domain: &str) -> Result<DnsSignal, DomainCheckError> {
        let resolver = self.build_resolver()?;

        match resolver.lookup_ip(domain).await {
            Ok(lookup) => {
                let addresses: Vec<String> = lookup.iter().map(|ip| ip.to_string()).collect();
                if addresses.is_empty() {
                    return Ok(DnsSignal::indeterminate("DNS lookup returned no addresses"));
                }
                debug!(count = addresses.len(), "domain resolves");
                Ok(DnsSignal::resolving(addresses))
            }
            Err(e) => Ok(classify_failure(e.kind(), self.timeout)),
        }
    }

    /// Build a resolver for one probe.
    fn build_resolver(&self) -> Result<TokioAsyncResolver, DomainCheckError> {
        let config = match &self.nameserver {
            Some(spec) => {
                let addr = parse_nameserver(spec)?;
                let mut config = ResolverConfig::new();
                config.add_name_server(NameServerConfig::new(addr, Protocol::Udp));
                config
            }
            None => ResolverConfig::google(),
        };

        let mut opts = ResolverOpts::default();
        opts.timeout = self.timeout;
        opts.attempts = 2;
        opts.use_hosts_file = false;

        Ok(TokioAsyncResolver::tokio(config, opts))
    }
}

impl Default for DnsProber {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a resolution failure onto the signal space.
///
/// Only an authoritative NXDOMAIN counts as "does not resolve"; every other
/// failure mode is indeterminate.
fn classify_failure(kind: &ResolveErrorKind, timeout: Duration) -> DnsSignal {
    match kind {
        ResolveErrorKind::NoRecordsFound { response_code, .. } => {
            if *response_code == ResponseCode::NXDomain {
                debug!("domain does not resolve (NXDOMAIN)");
                DnsSignal::unresolvable()
            } else if *response_code == ResponseCode::NoError {
                // The name exists in DNS but has no A/AAAA records.
                DnsSignal::indeterminate("DNS name exists but has no address records")
            } else {
                DnsSignal::indeterminate(format!(
                    "DNS lookup returned {:?} without address records",
                    response_code
                ))
            }
        }
        ResolveErrorKind::Timeout => {
            DnsSignal::indeterminate(format!("DNS lookup timed out after {:?}", timeout))
        }
        other => DnsSignal::indeterminate(format!("DNS lookup failed: {}", other)),
    }
}

/// Parse a nameserver spec into a socket address, defaulting the DNS port.
fn parse_nameserver(spec: &str) -> Result<SocketAddr, DomainCheckError> {
    if let Ok(addr) = spec.parse::<SocketAddr>() {
        return Ok(addr);
    }
    if let Ok(ip) = spec.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, DNS_PORT));
    }

    Err(DomainCheckError::config(format!(
        "invalid nameserver '{}': expected an IP address or IP:port",
        spec
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nameserver_forms() {
        assert_eq!(
            parse_nameserver("8.8.8.8").unwrap(),
            "8.8.8.8:53".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(
            parse_nameserver("1.1.1.1:5353").unwrap(),
            "1.1.1.1:5353".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(
            parse_nameserver("2001:4860:4860::8888").unwrap().port(),
            53
        );

        let err = parse_nameserver("resolver.example.com").unwrap_err();
        assert!(matches!(err, DomainCheckError::ConfigError { .. }));
    }

    #[test]
    fn test_probe_rejects_bad_nameserver_spec() {
        let prober = DnsProber::with_config(Duration::from_secs(1), Some("nonsense".to_string()));
        let err = tokio_test::block_on(prober.probe("example.com")).unwrap_err();
        assert!(matches!(err, DomainCheckError::ConfigError { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_nameserver_is_indeterminate() {
        // 192.0.2.1 sits in TEST-NET-1 and never answers.
        let prober =
            DnsProber::with_config(Duration::from_millis(200), Some("192.0.2.1".to_string()));

        let started = std::time::Instant::now();
        let signal = prober
            .probe("example.com")
            .await
            .expect("lookup outcomes are classifications, not errors");

        assert!(signal.is_indeterminate());
        // Two attempts at 200ms each, plus scheduling slack.
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test]
    #[ignore] // needs internet access
    async fn test_live_resolving_domain() {
        let prober = DnsProber::new();
        let signal = prober.probe("example.com").await.unwrap();
        assert!(signal.is_resolvable());
        assert!(!signal.addresses.is_empty());
    }

    #[tokio::test]
    #[ignore] // needs internet access
    async fn test_live_nxdomain() {
        let prober = DnsProber::new();
        let signal = prober
            .probe("this-domain-does-not-exist-a8f3k2j9x.com")
            .await
            .unwrap();
        assert!(signal.is_unresolvable());
        assert_eq!(signal.reason, "Domain does not resolve (NXDOMAIN)");
    }
}
