//! WHOIS probing for domain availability inference.
//!
//! This module speaks the WHOIS protocol directly over TCP port 43 and
//! classifies the free-text response. Registries use inconsistent,
//! non-machine-readable formats, so classification is heuristic pattern
//! matching with an explicit unknown state, never a grammar: an empty or
//! unclassifiable response becomes an indeterminate signal rather than a
//! guess, because absence of a "no match" phrase does not prove registration.

use std::collections::HashSet;
use std::time::Duration;

use regex::Regex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, instrument};

use crate::error::DomainCheckError;
use crate::protocols::servers::resolve_whois_server;
use crate::types::WhoisSignal;

/// Standard WHOIS TCP port.
const WHOIS_PORT: u16 = 43;

/// Default probe timeout, covering connect, query, read and referrals.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Responses are truncated past this size; the classifier works on the prefix.
const MAX_RESPONSE_SIZE: usize = 1024 * 1024; // 1MB

/// Referral hops allowed after the initial registry query.
const MAX_REFERRAL_HOPS: usize = 2;

/// Length cap for the raw excerpt retained on registered domains.
const RAW_EXCERPT_LIMIT: usize = 240;

/// Phrases that indicate the queried domain has no registration record.
///
/// Checked case-insensitively. This list is data, not control flow: new
/// registry phrasings go here (or arrive via [`WhoisProber::with_patterns`])
/// without touching the classifier.
const AVAILABLE_PATTERNS: &[&str] = &[
    "no match",
    "not found",
    "no data found",
    "no entries found",
    "domain not found",
    "domain available",
    "status: available",
    "status: free",
    "not registered",
    "no matching record",
    "domain status: no object found",
    "the queried object does not exist",
    "object does not exist",
    "no matching entry",
    "domain name not found",
    "this domain name has not been registered",
];

/// Phrases that indicate the registry refused to answer rather than answered.
///
/// A rate-limited response carries no registration data, so it classifies as
/// indeterminate, never as a registered domain.
const RATE_LIMIT_PATTERNS: &[&str] = &[
    "rate limit exceeded",
    "too many requests",
    "try again later",
    "quota exceeded",
    "limit exceeded",
    "throttled",
    "rate-limited",
];

// Referral line shapes seen across registry responses
lazy_static::lazy_static! {
    static ref REFERRAL_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)Registrar WHOIS Server:\s*(.+)").expect("static referral regex"),
        Regex::new(r"(?i)Whois Server:\s*(.+)").expect("static referral regex"),
        Regex::new(r"(?i)ReferralServer:\s*whois://(.+)").expect("static referral regex"),
        Regex::new(r"(?im)^refer:\s*(.+)").expect("static referral regex"),
    ];
}

/// WHOIS prober speaking the protocol directly over TCP.
///
/// One wall-clock deadline covers the whole probe, referral hops included,
/// so a slow registrar server cannot stretch the probe past its budget.
#[derive(Debug, Clone)]
pub struct WhoisProber {
    /// Wall-clock budget for the whole probe
    timeout: Duration,

    /// Fixed server (host or host:port) replacing per-TLD routing
    server_override: Option<String>,

    /// Caller-supplied availability phrases checked after the built-ins
    extra_patterns: Vec<String>,
}

impl WhoisProber {
    /// Create a new WHOIS prober with default settings.
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            server_override: None,
            extra_patterns: Vec::new(),
        }
    }

    /// Create a new WHOIS prober with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            server_override: None,
            extra_patterns: Vec::new(),
        }
    }

    /// Create a prober with a custom timeout and an optional server override.
    ///
    /// With an override, every query goes to that server (host or host:port)
    /// instead of the per-TLD table. Used for private registries and tests.
    pub fn with_config(timeout: Duration, server_override: Option<String>) -> Self {
        Self {
            timeout,
            server_override,
            extra_patterns: Vec::new(),
        }
    }

    /// Extend the availability pattern table with caller-supplied phrases.
    ///
    /// Patterns are matched case-insensitively after the built-in table.
    pub fn with_patterns(mut self, patterns: Vec<String>) -> Self {
        self.extra_patterns
            .extend(patterns.into_iter().map(|p| p.to_lowercase()));
        self
    }

    /// Probe a domain and classify the registry's answer.
    ///
    /// The server is resolved from the per-TLD table (IANA fallback) unless
    /// an override is configured.
    ///
    /// # Errors
    ///
    /// `Timeout` when the deadline expires before any data arrived,
    /// `NetworkError` when the connection fails. A response that arrives but
    /// cannot be classified is not an error; it yields an indeterminate
    /// signal.
    #[instrument(skip(self), fields(domain = %domain))]
    pub async fn probe(&self, domain: &str) -> Result<WhoisSignal, DomainCheckError> {
        let server = match &self.server_override {
            Some(server) => server.clone(),
            None => resolve_whois_server(domain)?.to_string(),
        };
        self.probe_with_server(domain, &server).await
    }

    /// Probe a domain against a specific WHOIS server.
    pub async fn probe_with_server(
        &self,
        domain: &str,
        server: &str,
    ) -> Result<WhoisSignal, DomainCheckError> {
        let deadline = Instant::now() + self.timeout;
        let response = self.query_with_referrals(domain, server, deadline).await?;
        Ok(self.classify(&response))
    }

    /// Query a server and follow registrar referrals under one deadline.
    ///
    /// A referral hop that fails or answers empty falls back to the response
    /// already in hand; the registry answer is always better than nothing.
    async fn query_with_referrals(
        &self,
        domain: &str,
        first_server: &str,
        deadline: Instant,
    ) -> Result<String, DomainCheckError> {
        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(first_server.to_lowercase());

        debug!(server = %first_server, "querying WHOIS server");
        let mut response = self.query_server(first_server, domain, deadline).await?;

        for _ in 0..MAX_REFERRAL_HOPS {
            let referral = match extract_referral(&response) {
                Some(server) if !visited.contains(&server) => server,
                _ => break,
            };

            debug!(referral = %referral, "following WHOIS referral");
            visited.insert(referral.clone());

            match self.query_server(&referral, domain, deadline).await {
                Ok(better) if !better.trim().is_empty() => response = better,
                Ok(_) => break,
                Err(e) => {
                    debug!(error = %e, "referral query failed, keeping registry response");
                    break;
                }
            }
        }

        Ok(response)
    }

    /// Send one query to one server and read the response until EOF.
    ///
    /// A read that stalls or errors after partial data arrived salvages what
    /// was received; the classifier can usually work with a prefix.
    async fn query_server(
        &self,
        server: &str,
        query: &str,
        deadline: Instant,
    ) -> Result<String, DomainCheckError> {
        let addr = server_addr(server);

        let mut stream = timeout_at(deadline, TcpStream::connect(&addr))
            .await
            .map_err(|_| {
                DomainCheckError::timeout(format!("WHOIS connect to {}", server), self.timeout)
            })?
            .map_err(|e| {
                DomainCheckError::network_with_source(
                    format!("failed to connect to {}", addr),
                    e.to_string(),
                )
            })?;

        let query_line = format!("{}\r\n", query);
        timeout_at(deadline, stream.write_all(query_line.as_bytes()))
            .await
            .map_err(|_| {
                DomainCheckError::timeout(format!("WHOIS query to {}", server), self.timeout)
            })?
            .map_err(|e| {
                DomainCheckError::network_with_source("failed to send WHOIS query", e.to_string())
            })?;

        let mut response = Vec::new();
        let mut buf = [0u8; 4096];

        loop {
            match timeout_at(deadline, stream.read(&mut buf)).await {
                Ok(Ok(0)) => break, // EOF
                Ok(Ok(n)) => {
                    response.extend_from_slice(&buf[..n]);
                    if response.len() > MAX_RESPONSE_SIZE {
                        debug!(server = %server, "WHOIS response exceeded size cap, truncating");
                        break;
                    }
                }
                Ok(Err(e)) => {
                    if response.is_empty() {
                        return Err(DomainCheckError::network_with_source(
                            format!("WHOIS read from {} failed", server),
                            e.to_string(),
                        ));
                    }
                    break; // salvage partial data
                }
                Err(_) => {
                    if response.is_empty() {
                        return Err(DomainCheckError::timeout(
                            format!("WHOIS read from {}", server),
                            self.timeout,
                        ));
                    }
                    break; // salvage partial data
                }
            }
        }

        // UTF-8 first; some registries still send Latin-1
        Ok(match String::from_utf8(response) {
            Ok(text) => text,
            Err(err) => err.into_bytes().iter().map(|&b| b as char).collect(),
        })
    }

    /// Classify a raw WHOIS response into a signal.
    fn classify(&self, raw: &str) -> WhoisSignal {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return WhoisSignal::indeterminate("WHOIS parser error: empty response from server");
        }

        let lower = raw.to_lowercase();

        if let Some(pattern) = RATE_LIMIT_PATTERNS.iter().find(|p| lower.contains(**p)) {
            return WhoisSignal::indeterminate(format!(
                "WHOIS rate limited: response matched \"{}\"",
                pattern
            ));
        }

        let patterns = AVAILABLE_PATTERNS
            .iter()
            .copied()
            .chain(self.extra_patterns.iter().map(String::as_str));
        for pattern in patterns {
            if lower.contains(pattern) {
                return WhoisSignal::available(format!(
                    "WHOIS response contains \"{}\"",
                    pattern
                ));
            }
        }

        WhoisSignal::registered("WHOIS record found", Some(excerpt(trimmed)))
    }
}

impl Default for WhoisProber {
    fn default() -> Self {
        Self::new()
    }
}

/// Append the WHOIS port unless the server spec already carries one.
fn server_addr(server: &str) -> String {
    if server.contains(':') {
        server.to_string()
    } else {
        format!("{}:{}", server, WHOIS_PORT)
    }
}

/// Take a short, human-reviewable prefix of the raw response.
fn excerpt(text: &str) -> String {
    text.chars().take(RAW_EXCERPT_LIMIT).collect()
}

/// Find a referral to a more authoritative WHOIS server, if the response
/// names one.
fn extract_referral(response: &str) -> Option<String> {
    for pattern in REFERRAL_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(response) {
            if let Some(m) = caps.get(1) {
                let server = m.as_str().trim().to_lowercase();
                if !server.is_empty() && server.contains('.') && !server.contains(' ') {
                    return Some(server);
                }
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGISTERED_RESPONSE: &str = "Domain Name: EXAMPLE.COM\n\
        Registry Domain ID: 2336799_DOMAIN_COM-VRSN\n\
        Registrar WHOIS Server: whois.iana.org\n\
        Updated Date: 2024-08-14T07:01:34Z\n\
        Creation Date: 1995-08-14T04:00:00Z\n";

    #[test]
    fn test_classify_no_match_as_available() {
        let prober = WhoisProber::new();
        let signal = prober.classify("No match for domain \"EXAMPLE-FREE.COM\".\n");
        assert!(signal.is_available());
        assert!(signal.reason.contains("no match"));
        assert!(signal.raw_excerpt.is_none());
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        let prober = WhoisProber::new();
        let signal = prober.classify("NOT FOUND\n>>> Last update of WHOIS database <<<\n");
        assert!(signal.is_available());
    }

    #[test]
    fn test_classify_record_as_registered_with_excerpt() {
        let prober = WhoisProber::new();
        let signal = prober.classify(REGISTERED_RESPONSE);
        assert!(signal.is_registered());
        assert_eq!(signal.reason, "WHOIS record found");
        let excerpt = signal.raw_excerpt.expect("registered signals keep an excerpt");
        assert!(excerpt.starts_with("Domain Name: EXAMPLE.COM"));
    }

    #[test]
    fn test_classify_empty_as_indeterminate() {
        let prober = WhoisProber::new();
        let signal = prober.classify("");
        assert!(signal.is_indeterminate());
        assert!(signal.reason.contains("WHOIS parser error"));

        let signal = prober.classify("  \n\t  ");
        assert!(signal.is_indeterminate());
    }

    #[test]
    fn test_classify_rate_limit_as_indeterminate() {
        let prober = WhoisProber::new();
        let signal = prober.classify("Rate limit exceeded. Try again later.\n");
        assert!(signal.is_indeterminate());
        assert!(signal.reason.contains("rate limited"));
    }

    #[test]
    fn test_extra_patterns_extend_the_table() {
        let prober = WhoisProber::new()
            .with_patterns(vec!["Dieses Objekt existiert nicht".to_string()]);
        let signal = prober.classify("dieses objekt existiert nicht\n");
        assert!(signal.is_available());

        // Built-ins still apply.
        let signal = prober.classify("No match for example.com\n");
        assert!(signal.is_available());
    }

    #[test]
    fn test_excerpt_is_capped() {
        let long = "x".repeat(RAW_EXCERPT_LIMIT * 3);
        assert_eq!(excerpt(&long).chars().count(), RAW_EXCERPT_LIMIT);
    }

    #[test]
    fn test_server_addr_appends_port_once() {
        assert_eq!(server_addr("whois.nic.io"), "whois.nic.io:43");
        assert_eq!(server_addr("127.0.0.1:9999"), "127.0.0.1:9999");
    }

    #[test]
    fn test_extract_referral_forms() {
        assert_eq!(
            extract_referral("Registrar WHOIS Server: whois.godaddy.com\n"),
            Some("whois.godaddy.com".to_string())
        );
        assert_eq!(
            extract_referral("whois server: WHOIS.MARKMONITOR.COM\n"),
            Some("whois.markmonitor.com".to_string())
        );
        assert_eq!(
            extract_referral("ReferralServer: whois://whois.arin.net\n"),
            Some("whois.arin.net".to_string())
        );
        assert_eq!(
            extract_referral("refer:        whois.verisign-grs.com\n"),
            Some("whois.verisign-grs.com".to_string())
        );
        assert_eq!(extract_referral("Domain Name: EXAMPLE.COM\n"), None);
        // Values without a dot are junk, not servers.
        assert_eq!(extract_referral("Whois Server: none\n"), None);
    }

    // Loopback stub servers: hermetic probe tests without touching real
    // registries.

    async fn spawn_stub(response: &'static str) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind loopback stub");
        let addr = listener.local_addr().expect("stub addr").to_string();
        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 256];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(response.as_bytes()).await;
            }
        });
        addr
    }

    #[tokio::test]
    async fn test_probe_classifies_stub_available_response() {
        let addr = spawn_stub("No match for \"FRESH-NAME.COM\".\r\n").await;
        let prober = WhoisProber::with_timeout(Duration::from_secs(2));

        let signal = prober
            .probe_with_server("fresh-name.com", &addr)
            .await
            .expect("loopback probe succeeds");
        assert!(signal.is_available());
    }

    #[tokio::test]
    async fn test_probe_classifies_stub_registered_response() {
        let addr = spawn_stub(
            "Domain Name: TAKEN.COM\nCreation Date: 2001-01-01T00:00:00Z\n",
        )
        .await;
        let prober = WhoisProber::with_timeout(Duration::from_secs(2));

        let signal = prober
            .probe_with_server("taken.com", &addr)
            .await
            .expect("loopback probe succeeds");
        assert!(signal.is_registered());
        assert!(signal.raw_excerpt.is_some());
    }

    #[tokio::test]
    async fn test_probe_times_out_against_hanging_server() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind loopback stub");
        let addr = listener.local_addr().expect("stub addr").to_string();
        tokio::spawn(async move {
            if let Ok((socket, _)) = listener.accept().await {
                // Accept and go silent; the probe has to give up on its own.
                tokio::time::sleep(Duration::from_secs(60)).await;
                drop(socket);
            }
        });

        let prober = WhoisProber::with_timeout(Duration::from_millis(250));
        let started = std::time::Instant::now();
        let err = prober
            .probe_with_server("example.com", &addr)
            .await
            .expect_err("hanging server must time out");

        assert!(err.is_timeout());
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_probe_salvages_partial_response() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind loopback stub");
        let addr = listener.local_addr().expect("stub addr").to_string();
        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 256];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(b"No match for domain\n").await;
                // Leave the connection open without ever sending EOF.
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
        });

        let prober = WhoisProber::with_timeout(Duration::from_millis(400));
        let signal = prober
            .probe_with_server("example.com", &addr)
            .await
            .expect("partial data should classify");
        assert!(signal.is_available());
    }

    #[tokio::test]
    async fn test_probe_reports_connection_refusal() {
        // Grab an ephemeral port, then free it so the connect is refused.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind loopback stub");
        let addr = listener.local_addr().expect("stub addr").to_string();
        drop(listener);

        let prober = WhoisProber::with_timeout(Duration::from_secs(1));
        let err = prober
            .probe_with_server("example.com", &addr)
            .await
            .expect_err("refused connection must error");
        assert!(matches!(err, DomainCheckError::NetworkError { .. }));
    }
}
