//! Verdict reconciliation for the two probe signals.
//!
//! This module contains the fixed precedence policy that turns one WHOIS
//! signal and one DNS signal into a final [`Verdict`] plus a human-readable
//! rationale. It is a pure total function: every combination of the two
//! tri-state signals, indeterminate ones included, maps to a verdict, so the
//! engine can always answer even when both probes failed.

use crate::types::{DnsSignal, Verdict, WhoisSignal};

/// Combine the two probe signals into a verdict and rationale.
///
/// Policy, checked in order, first match wins:
///
/// 1. WHOIS available + DNS unresolvable: `LikelyAvailable` (agreement).
/// 2. WHOIS registered + DNS resolvable: `NotAvailable` (agreement).
/// 3. WHOIS indeterminate + DNS resolvable: `NotAvailable` (DNS resolution
///    is strong enough evidence of registration on its own).
/// 4. WHOIS available + DNS indeterminate: `Unclear` (one positive signal
///    is not enough to call a domain available).
/// 5. Everything else: `Unclear`, with both raw probe reasons in the
///    rationale so a human can adjudicate.
///
/// DNS resolvability is treated as slightly stronger positive evidence of
/// registration than WHOIS text, because its failure modes are narrower than
/// registry-dependent response formats. Agreement is decisive; disagreement
/// always degrades to `Unclear` rather than guessing.
pub fn reconcile(whois: &WhoisSignal, dns: &DnsSignal) -> (Verdict, String) {
    match (whois.available, dns.resolvable) {
        (Some(true), Some(false)) => (
            Verdict::LikelyAvailable,
            "both signals indicate the domain is unregistered".to_string(),
        ),
        (Some(false), Some(true)) => (
            Verdict::NotAvailable,
            "both signals indicate the domain is registered".to_string(),
        ),
        (None, Some(true)) => (
            Verdict::NotAvailable,
            "DNS resolution confirms registration despite inconclusive WHOIS".to_string(),
        ),
        (Some(true), None) => (
            Verdict::Unclear,
            "WHOIS suggests available but DNS signal inconclusive".to_string(),
        ),
        _ => (
            Verdict::Unclear,
            format!(
                "signals are inconclusive or conflicting (WHOIS: {}; DNS: {})",
                whois.reason, dns.reason
            ),
        ),
    }
}
