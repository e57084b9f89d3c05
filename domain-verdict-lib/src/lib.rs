//! # Domain Verdict Library
//!
//! A fast, robust library for inferring domain availability from WHOIS and
//! DNS evidence.
//!
//! Neither WHOIS nor DNS is authoritative on its own: registries rate-limit
//! and write free-text records, and resolution failures have many causes.
//! Each check therefore runs both probes concurrently, keeps an explicit
//! unknown state per signal, and reconciles the pair into one of three
//! verdicts: likely available, not available, or unclear.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use domain_verdict_lib::DomainChecker;
//!
//! #[tokio::main]
//! async fn main() {
//!     let checker = DomainChecker::new();
//!     let result = checker.check_domain("example.com").await;
//!
//!     if let Some(verdict) = &result.verdict {
//!         println!("{}: {}", result.domain, verdict);
//!     }
//! }
//! ```
//!
//! ## Features
//!
//! - **Dual Probes**: WHOIS over TCP port 43 plus DNS resolution
//! - **Tri-State Signals**: Every probe outcome keeps an explicit unknown
//! - **Verdict Reconciliation**: Deterministic precedence rules with a rationale
//! - **Concurrent Batches**: Bounded parallelism with input-order results
//! - **Configurable**: Timeouts, servers, and classifier patterns

// Re-export main public API types and functions
// This makes them available as domain_verdict_lib::TypeName
pub use checker::DomainChecker;
pub use config::{
    load_env_config, parse_timeout_string, ConfigManager, DefaultsConfig, EnvConfig, FileConfig,
    OutputConfig, WhoisConfig,
};
pub use error::DomainCheckError;
pub use protocols::{extract_tld, resolve_whois_server, DnsProber, WhoisProber};
pub use types::{
    CheckConfig, DnsSignal, DomainCheckResult, OutputMode, Verdict, WhoisSignal,
};
pub use utils::{normalize_domain, parse_domain_list};
pub use verdict::reconcile;

// Internal modules - these are not part of the public API
mod checker;
mod concurrent;
mod config;
mod error;
mod protocols;
mod types;
mod utils;
mod verdict;

// Type alias for convenience
pub type Result<T> = std::result::Result<T, DomainCheckError>;

// Library version for display purposes
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
