//! Main domain checker implementation.
//!
//! This module provides the primary `DomainChecker` struct that orchestrates
//! availability inference: it runs the WHOIS and DNS probes concurrently for
//! each domain and reconciles their signals into a verdict.

use std::pin::Pin;

use futures::stream::{Stream, StreamExt};
use tracing::{debug, warn};

use crate::concurrent::run_bounded;
use crate::error::DomainCheckError;
use crate::protocols::{DnsProber, WhoisProber};
use crate::types::{CheckConfig, DnsSignal, DomainCheckResult, WhoisSignal};
use crate::utils::{normalize_domain, parse_domain_list};
use crate::verdict::reconcile;

/// Main domain checker that coordinates availability inference.
///
/// The `DomainChecker` handles all aspects of a check:
/// - Domain name validation and normalization
/// - Concurrent WHOIS and DNS probing
/// - Signal reconciliation into a verdict
/// - Batch processing with bounded concurrency
///
/// # Example
///
/// ```rust,no_run
/// use domain_verdict_lib::DomainChecker;
///
/// #[tokio::main]
/// async fn main() {
///     let checker = DomainChecker::new();
///     let result = checker.check_domain("example.com").await;
///     if let Some(verdict) = &result.verdict {
///         println!("{}: {}", result.domain, verdict);
///     }
/// }
/// ```
pub struct DomainChecker {
    /// Configuration settings for this checker instance
    config: CheckConfig,
    /// WHOIS prober for registration records
    whois_prober: WhoisProber,
    /// DNS prober for resolution evidence
    dns_prober: DnsProber,
}

impl DomainChecker {
    /// Create a new domain checker with default configuration.
    ///
    /// Default settings:
    /// - Concurrency: 10
    /// - WHOIS timeout: 5 seconds
    /// - DNS timeout: 3 seconds
    /// - Per-domain check timeout: 10 seconds
    pub fn new() -> Self {
        Self::with_config(CheckConfig::default())
    }

    /// Create a new domain checker with custom configuration.
    ///
    /// # Example
    ///
    /// ```rust
    /// use domain_verdict_lib::{CheckConfig, DomainChecker};
    /// use std::time::Duration;
    ///
    /// let config = CheckConfig::default()
    ///     .with_concurrency(20)
    ///     .with_whois_timeout(Duration::from_secs(10));
    ///
    /// let checker = DomainChecker::with_config(config);
    /// ```
    pub fn with_config(config: CheckConfig) -> Self {
        let whois_prober =
            WhoisProber::with_config(config.whois_timeout, config.whois_server.clone())
                .with_patterns(config.whois_patterns.clone());
        let dns_prober = DnsProber::with_config(config.dns_timeout, config.nameserver.clone());

        Self {
            config,
            whois_prober,
            dns_prober,
        }
    }

    /// Check availability of a single domain.
    ///
    /// The checking process:
    /// 1. Validates and normalizes the domain name
    /// 2. Runs the WHOIS and DNS probes concurrently
    /// 3. Reconciles the two signals into a verdict with a rationale
    ///
    /// This method never fails: a domain name that does not survive
    /// validation yields a result with `error` set and no verdict, and a
    /// probe failure is folded in as an indeterminate signal with a note in
    /// `probe_errors`. Policy is that one unreachable registry must not
    /// abort a batch.
    ///
    /// # Arguments
    ///
    /// * `domain` - The domain name to check (e.g., "example.com")
    ///
    /// # Returns
    ///
    /// A `DomainCheckResult` carrying the verdict, both signals, and the
    /// reconciler's rationale.
    pub async fn check_domain(&self, domain: &str) -> DomainCheckResult {
        let started = std::time::Instant::now();

        let normalized = match normalize_domain(domain) {
            Ok(normalized) => normalized,
            Err(e) => {
                debug!(domain = %domain, error = %e, "rejected domain name");
                return DomainCheckResult::invalid(domain, &e);
            }
        };

        let (whois, dns, probe_errors) = match tokio::time::timeout(
            self.config.check_timeout,
            self.probe_both(&normalized),
        )
        .await
        {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(domain = %normalized, "check timed out");
                let note = format!("check timed out after {:?}", self.config.check_timeout);
                (
                    WhoisSignal::indeterminate(note.clone()),
                    DnsSignal::indeterminate(note.clone()),
                    vec![note],
                )
            }
        };

        let (verdict, rationale) = reconcile(&whois, &dns);
        debug!(domain = %normalized, verdict = %verdict, "check concluded");

        DomainCheckResult {
            domain: normalized,
            verdict: Some(verdict),
            whois: Some(whois),
            dns: Some(dns),
            rationale: Some(rationale),
            probe_errors,
            check_duration: Some(started.elapsed()),
            error: None,
        }
    }

    /// Run both probes concurrently and fold failures into signals.
    async fn probe_both(&self, domain: &str) -> (WhoisSignal, DnsSignal, Vec<String>) {
        let (whois_outcome, dns_outcome) = tokio::join!(
            self.whois_prober.probe(domain),
            self.dns_prober.probe(domain),
        );

        let mut probe_errors = Vec::new();

        let whois = match whois_outcome {
            Ok(signal) => signal,
            Err(e) => {
                warn!(domain = %domain, error = %e, "WHOIS probe failed");
                probe_errors.push(format!("whois: {}", e));
                WhoisSignal::indeterminate(format!("WHOIS probe failed: {}", e))
            }
        };

        let dns = match dns_outcome {
            Ok(signal) => signal,
            Err(e) => {
                warn!(domain = %domain, error = %e, "DNS probe failed");
                probe_errors.push(format!("dns: {}", e));
                DnsSignal::indeterminate(format!("DNS probe failed: {}", e))
            }
        };

        (whois, dns, probe_errors)
    }

    /// Check availability of multiple domains concurrently.
    ///
    /// Domains are processed in parallel up to the configured concurrency
    /// limit. Results come back in input order regardless of which checks
    /// finished first, and one slot per input domain is always present;
    /// invalid names produce error-carrying results in place.
    ///
    /// # Arguments
    ///
    /// * `domains` - Slice of domain names to check
    ///
    /// # Returns
    ///
    /// Vector of `DomainCheckResult` in the same order as input domains.
    ///
    /// # Errors
    ///
    /// Returns `DomainCheckError` only when the domain list is empty.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use domain_verdict_lib::DomainChecker;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let checker = DomainChecker::new();
    ///     let domains = vec!["example.com".to_string(), "example.org".to_string()];
    ///     let results = checker.check_domains(&domains).await?;
    ///
    ///     for result in results {
    ///         println!("{}: {:?}", result.domain, result.verdict);
    ///     }
    ///     Ok(())
    /// }
    /// ```
    pub async fn check_domains(
        &self,
        domains: &[String],
    ) -> Result<Vec<DomainCheckResult>, DomainCheckError> {
        if domains.is_empty() {
            return Err(DomainCheckError::config("domain list is empty"));
        }

        debug!(count = domains.len(), concurrency = self.config.concurrency, "starting batch");
        let results = run_bounded(domains.to_vec(), self.config.concurrency, |domain| async move {
            self.check_domain(&domain).await
        })
        .await;

        Ok(results)
    }

    /// Check domains and yield results as they complete.
    ///
    /// Unlike `check_domains`, results arrive in completion order, not input
    /// order; each result carries its domain name so callers can correlate.
    /// Useful for progress display over large batches.
    ///
    /// # Arguments
    ///
    /// * `domains` - Slice of domain names to check
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use domain_verdict_lib::DomainChecker;
    /// use futures::StreamExt;
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let checker = DomainChecker::new();
    ///     let domains = vec!["example.com".to_string(), "example.org".to_string()];
    ///
    ///     let mut stream = checker.check_domains_stream(&domains);
    ///     while let Some(result) = stream.next().await {
    ///         println!("{}: {:?}", result.domain, result.verdict);
    ///     }
    /// }
    /// ```
    pub fn check_domains_stream(
        &self,
        domains: &[String],
    ) -> Pin<Box<dyn Stream<Item = DomainCheckResult> + Send + '_>> {
        let concurrency = self.config.concurrency.max(1);
        let stream = futures::stream::iter(domains.to_vec())
            .map(move |domain| async move { self.check_domain(&domain).await })
            .buffer_unordered(concurrency);

        Box::pin(stream)
    }

    /// Read domain names from a file and check their availability.
    ///
    /// The file should contain one domain name per line. Empty lines and
    /// lines starting with '#' are ignored as comments.
    ///
    /// # Arguments
    ///
    /// * `file_path` - Path to the file containing domain names
    ///
    /// # Returns
    ///
    /// Vector of `DomainCheckResult` for all domain lines in the file, in
    /// file order.
    ///
    /// # Errors
    ///
    /// Returns `DomainCheckError` if the file cannot be read or contains no
    /// domain lines.
    pub async fn check_domains_from_file(
        &self,
        file_path: &str,
    ) -> Result<Vec<DomainCheckResult>, DomainCheckError> {
        let content = tokio::fs::read_to_string(file_path).await.map_err(|e| {
            DomainCheckError::file_error(file_path, format!("failed to read file: {}", e))
        })?;

        let domains = parse_domain_list(&content);
        if domains.is_empty() {
            return Err(DomainCheckError::file_error(
                file_path,
                "no domains found in file",
            ));
        }

        debug!(count = domains.len(), path = %file_path, "checking domains from file");
        self.check_domains(&domains).await
    }

    /// Get the current configuration for this checker.
    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// Update the configuration for this checker.
    ///
    /// Recreates the internal probers, so new timeouts and server overrides
    /// take effect for subsequent checks.
    pub fn set_config(&mut self, config: CheckConfig) {
        self.whois_prober =
            WhoisProber::with_config(config.whois_timeout, config.whois_server.clone())
                .with_patterns(config.whois_patterns.clone());
        self.dns_prober = DnsProber::with_config(config.dns_timeout, config.nameserver.clone());
        self.config = config;
    }
}

impl Default for DomainChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_domain_yields_error_result() {
        let checker = DomainChecker::new();
        let result = checker.check_domain("not a domain").await;

        assert!(!result.is_concluded());
        assert_eq!(result.domain, "not a domain");
        assert!(result.verdict.is_none());
        assert!(result.whois.is_none());
        assert!(result.dns.is_none());
        assert!(result.error.is_some());
    }

    #[tokio::test]
    async fn test_empty_batch_is_rejected() {
        let checker = DomainChecker::new();
        let err = checker.check_domains(&[]).await.unwrap_err();
        assert!(matches!(err, DomainCheckError::ConfigError { .. }));
    }

    #[tokio::test]
    async fn test_missing_file_is_reported() {
        let checker = DomainChecker::new();
        let err = checker
            .check_domains_from_file("/no/such/path/domains.txt")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainCheckError::FileError { .. }));
    }

    #[tokio::test]
    async fn test_file_with_only_comments_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"# just a comment\n\n  \n").unwrap();

        let checker = DomainChecker::new();
        let err = checker
            .check_domains_from_file(file.path().to_str().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainCheckError::FileError { .. }));
    }
}
