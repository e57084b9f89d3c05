//! Core data types for domain availability inference.
//!
//! This module defines all the main data structures used throughout the library:
//! probe signals, verdicts, per-domain results, and configuration options.
//! The serialized form of [`DomainCheckResult`] (field names, status strings)
//! is a wire contract consumed by other tools; changes here are breaking.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::DomainCheckError;

/// Classification of a WHOIS probe response.
///
/// The availability field is tri-state:
/// - `Some(true)`: response matched a known "no match" pattern
/// - `Some(false)`: a WHOIS record was found
/// - `None`: indeterminate (empty response, parse trouble, probe failure)
///
/// Signals are immutable once produced; the reconciler only reads them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhoisSignal {
    /// Whether WHOIS suggests the domain is available for registration
    pub available: Option<bool>,

    /// Human-readable explanation of the classification
    pub reason: String,

    /// Short prefix of the raw response text (registered domains only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_excerpt: Option<String>,
}

impl WhoisSignal {
    /// Signal for a response that matched an availability pattern.
    pub fn available<R: Into<String>>(reason: R) -> Self {
        Self {
            available: Some(true),
            reason: reason.into(),
            raw_excerpt: None,
        }
    }

    /// Signal for a response carrying a registration record.
    pub fn registered<R: Into<String>>(reason: R, raw_excerpt: Option<String>) -> Self {
        Self {
            available: Some(false),
            reason: reason.into(),
            raw_excerpt,
        }
    }

    /// Signal for a probe that produced no usable classification.
    pub fn indeterminate<R: Into<String>>(reason: R) -> Self {
        Self {
            available: None,
            reason: reason.into(),
            raw_excerpt: None,
        }
    }

    /// True when the signal affirmatively indicates availability.
    pub fn is_available(&self) -> bool {
        self.available == Some(true)
    }

    /// True when the signal affirmatively indicates registration.
    pub fn is_registered(&self) -> bool {
        self.available == Some(false)
    }

    /// True when the probe could not classify the domain either way.
    pub fn is_indeterminate(&self) -> bool {
        self.available.is_none()
    }
}

/// Classification of a DNS probe outcome.
///
/// Mirrors [`WhoisSignal`]'s tri-state encoding:
/// - `Some(true)`: the domain resolved to at least one address
/// - `Some(false)`: authoritative NXDOMAIN
/// - `None`: indeterminate (server failure, network error, timeout)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DnsSignal {
    /// Whether the domain resolves to address records
    pub resolvable: Option<bool>,

    /// Human-readable explanation of the classification
    pub reason: String,

    /// Resolved addresses, when resolution succeeded
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub addresses: Vec<String>,
}

impl DnsSignal {
    /// Signal for a successful resolution.
    pub fn resolving(addresses: Vec<String>) -> Self {
        Self {
            resolvable: Some(true),
            reason: "Domain resolves to an address".to_string(),
            addresses,
        }
    }

    /// Signal for an authoritative NXDOMAIN answer.
    pub fn unresolvable() -> Self {
        Self {
            resolvable: Some(false),
            reason: "Domain does not resolve (NXDOMAIN)".to_string(),
            addresses: Vec::new(),
        }
    }

    /// Signal for a lookup that failed for infrastructure reasons.
    ///
    /// Distinct from NXDOMAIN: a resolver failure never proves non-existence.
    pub fn indeterminate<R: Into<String>>(reason: R) -> Self {
        Self {
            resolvable: None,
            reason: reason.into(),
            addresses: Vec::new(),
        }
    }

    /// True when the domain resolved to at least one address.
    pub fn is_resolvable(&self) -> bool {
        self.resolvable == Some(true)
    }

    /// True when the lookup got an authoritative NXDOMAIN.
    pub fn is_unresolvable(&self) -> bool {
        self.resolvable == Some(false)
    }

    /// True when the lookup failed without an authoritative answer.
    pub fn is_indeterminate(&self) -> bool {
        self.resolvable.is_none()
    }
}

/// Final availability verdict for a domain.
///
/// Derived by the reconciler from the two probe signals; callers never
/// construct one directly. The serialized strings are a wire contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// Both signals (or the decisive one) indicate the domain is unregistered
    #[serde(rename = "✅ LIKELY AVAILABLE")]
    LikelyAvailable,

    /// Both signals (or the decisive one) indicate the domain is registered
    #[serde(rename = "❌ NOT AVAILABLE")]
    NotAvailable,

    /// Signals were inconclusive or conflicting; a human should adjudicate
    #[serde(rename = "❓ UNCLEAR")]
    Unclear,
}

impl Verdict {
    /// The serialized status string, emoji prefix included.
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::LikelyAvailable => "✅ LIKELY AVAILABLE",
            Verdict::NotAvailable => "❌ NOT AVAILABLE",
            Verdict::Unclear => "❓ UNCLEAR",
        }
    }

    /// The status text without the emoji prefix (for plain terminals).
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::LikelyAvailable => "LIKELY AVAILABLE",
            Verdict::NotAvailable => "NOT AVAILABLE",
            Verdict::Unclear => "UNCLEAR",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of a single domain availability check.
///
/// Exactly one of two shapes is produced:
/// - a concluded check: `verdict`, `whois`, `dns` and `rationale` populated;
/// - a validation failure: only `error` populated.
///
/// Each result is owned by the batch call that created it and returned by
/// value; nothing is shared between pipelines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainCheckResult {
    /// The domain name that was checked (normalized for valid input,
    /// verbatim for rejected input)
    pub domain: String,

    /// Final verdict; absent when the domain name failed validation
    #[serde(rename = "status", skip_serializing_if = "Option::is_none")]
    pub verdict: Option<Verdict>,

    /// WHOIS probe signal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whois: Option<WhoisSignal>,

    /// DNS probe signal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns: Option<DnsSignal>,

    /// The reconciler's explanation for the verdict
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,

    /// Per-probe failure notes, in probe order (WHOIS first)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub probe_errors: Vec<String>,

    /// How long the domain check took to complete
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_duration: Option<Duration>,

    /// Validation error message, for rejected domain names
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DomainCheckResult {
    /// Build the result for a domain name that failed validation.
    pub fn invalid<D: Into<String>>(domain: D, error: &DomainCheckError) -> Self {
        Self {
            domain: domain.into(),
            verdict: None,
            whois: None,
            dns: None,
            rationale: None,
            probe_errors: Vec::new(),
            check_duration: None,
            error: Some(error.to_string()),
        }
    }

    /// True when the check produced a verdict rather than an input error.
    pub fn is_concluded(&self) -> bool {
        self.verdict.is_some()
    }
}

/// Configuration options for domain checking operations.
///
/// This struct allows fine-tuning of the checking behavior, including
/// concurrency, per-probe timeouts, and probe target overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Maximum number of concurrent domain checks
    /// Default: 10, Range: 1-100
    pub concurrency: usize,

    /// Timeout for the WHOIS probe (connect, query, read, referrals)
    /// Default: 5 seconds
    #[serde(skip)] // Don't serialize Duration directly
    pub whois_timeout: Duration,

    /// Timeout for the DNS probe
    /// Default: 3 seconds
    #[serde(skip)] // Don't serialize Duration directly
    pub dns_timeout: Duration,

    /// Overall wall-clock deadline for one domain's pipeline
    /// Default: 10 seconds
    #[serde(skip)] // Don't serialize Duration directly
    pub check_timeout: Duration,

    /// WHOIS server override (host or host:port)
    /// If None, the per-TLD server table decides
    pub whois_server: Option<String>,

    /// Custom nameserver IP for DNS probes
    /// If None, well-known public resolvers are used
    pub nameserver: Option<String>,

    /// Extra WHOIS availability phrases checked after the built-in table
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub whois_patterns: Vec<String>,
}

/// Output mode for displaying results.
///
/// This controls how and when results are presented to the user,
/// affecting both performance perception and data formatting.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputMode {
    /// Stream results as they become available (good for interactive use)
    Streaming,

    /// Collect all results before displaying (good for formatting/sorting)
    Collected,

    /// Automatically choose based on context (terminal vs pipe, etc.)
    Auto,
}

impl Default for CheckConfig {
    /// Create a sensible default configuration.
    ///
    /// These defaults are chosen to work well for most use cases
    /// while being conservative about resource usage.
    fn default() -> Self {
        Self {
            concurrency: 10,
            whois_timeout: Duration::from_secs(5),
            dns_timeout: Duration::from_secs(3),
            check_timeout: Duration::from_secs(10),
            whois_server: None,
            nameserver: None,
            whois_patterns: Vec::new(),
        }
    }
}

impl CheckConfig {
    /// Create a new configuration with custom concurrency.
    ///
    /// Automatically caps concurrency at 100 to prevent resource exhaustion.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.clamp(1, 100);
        self
    }

    /// Set the WHOIS probe timeout.
    pub fn with_whois_timeout(mut self, timeout: Duration) -> Self {
        self.whois_timeout = timeout;
        self
    }

    /// Set the DNS probe timeout.
    pub fn with_dns_timeout(mut self, timeout: Duration) -> Self {
        self.dns_timeout = timeout;
        self
    }

    /// Set the overall per-domain deadline.
    pub fn with_check_timeout(mut self, timeout: Duration) -> Self {
        self.check_timeout = timeout;
        self
    }

    /// Route all WHOIS probes to a fixed server (host or host:port).
    pub fn with_whois_server<S: Into<String>>(mut self, server: S) -> Self {
        self.whois_server = Some(server.into());
        self
    }

    /// Resolve through a custom nameserver IP instead of the defaults.
    pub fn with_nameserver<S: Into<String>>(mut self, nameserver: S) -> Self {
        self.nameserver = Some(nameserver.into());
        self
    }

    /// Add WHOIS availability phrases on top of the built-in table.
    pub fn with_whois_patterns(mut self, patterns: Vec<String>) -> Self {
        self.whois_patterns.extend(patterns);
        self
    }
}

impl std::fmt::Display for OutputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputMode::Streaming => write!(f, "Streaming"),
            OutputMode::Collected => write!(f, "Collected"),
            OutputMode::Auto => write!(f, "Auto"),
        }
    }
}
