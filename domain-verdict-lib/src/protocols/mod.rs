//! Protocol implementations for domain probing.
//!
//! This module contains the two probe transports the checker drives, WHOIS
//! over TCP port 43 and DNS resolution, plus the per-TLD WHOIS server table.

/// WHOIS protocol implementation
pub mod whois;

/// DNS resolution probing
pub mod dns;

/// Per-TLD WHOIS server routing
pub mod servers;

// Re-export commonly used types and functions
pub use dns::DnsProber;
pub use servers::{extract_tld, get_whois_server, resolve_whois_server, DEFAULT_WHOIS_SERVER};
pub use whois::WhoisProber;
