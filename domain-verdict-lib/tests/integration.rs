// domain-verdict-lib/tests/integration.rs

//! Integration tests for domain-verdict-lib exports, the JSON wire contract,
//! and batch behavior.
//!
//! Network-dependent tests are marked #[ignore]; everything else runs against
//! loopback stubs or pure functions so the suite stays deterministic.

use std::time::Duration;

use domain_verdict_lib::{
    extract_tld, normalize_domain, parse_timeout_string, reconcile, resolve_whois_server,
    CheckConfig, DnsSignal, DomainCheckResult, DomainChecker, Verdict, WhoisSignal,
};
use futures::StreamExt;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

#[test]
fn test_library_exports_work() {
    // The exported helpers must be accessible and behave
    assert_eq!(
        resolve_whois_server("example.com").unwrap(),
        "whois.verisign-grs.com"
    );
    assert_eq!(extract_tld("example.co.uk").unwrap(), "uk");
    assert_eq!(normalize_domain("  Example.COM  ").unwrap(), "example.com");
    assert_eq!(parse_timeout_string("2m"), Some(120));
}

#[test]
fn test_default_config_values() {
    let config = CheckConfig::default();
    assert_eq!(config.concurrency, 10);
    assert_eq!(config.whois_timeout, Duration::from_secs(5));
    assert_eq!(config.dns_timeout, Duration::from_secs(3));
    assert_eq!(config.check_timeout, Duration::from_secs(10));
    assert!(config.whois_server.is_none());
    assert!(config.nameserver.is_none());
}

// ============================================================
// JSON wire contract
// ============================================================

/// The three status strings are consumed by other tooling and must never
/// drift, emoji included.
#[test]
fn test_verdict_status_strings() {
    assert_eq!(
        serde_json::to_string(&Verdict::LikelyAvailable).unwrap(),
        "\"✅ LIKELY AVAILABLE\""
    );
    assert_eq!(
        serde_json::to_string(&Verdict::NotAvailable).unwrap(),
        "\"❌ NOT AVAILABLE\""
    );
    assert_eq!(
        serde_json::to_string(&Verdict::Unclear).unwrap(),
        "\"❓ UNCLEAR\""
    );
}

#[test]
fn test_concluded_result_serialization() {
    let whois = WhoisSignal::available("WHOIS response contains \"no match\"");
    let dns = DnsSignal::unresolvable();
    let (verdict, rationale) = reconcile(&whois, &dns);

    let result = DomainCheckResult {
        domain: "fresh-name.com".to_string(),
        verdict: Some(verdict),
        whois: Some(whois),
        dns: Some(dns),
        rationale: Some(rationale),
        probe_errors: Vec::new(),
        check_duration: Some(Duration::from_millis(740)),
        error: None,
    };

    let v = serde_json::to_value(&result).unwrap();
    assert_eq!(v["domain"], "fresh-name.com");
    assert_eq!(v["status"], "✅ LIKELY AVAILABLE");
    assert_eq!(v["whois"]["available"], true);
    assert_eq!(v["whois"]["reason"], "WHOIS response contains \"no match\"");
    assert_eq!(v["dns"]["resolvable"], false);
    assert_eq!(v["dns"]["reason"], "Domain does not resolve (NXDOMAIN)");
    assert_eq!(
        v["rationale"],
        "both signals indicate the domain is unregistered"
    );

    // Empty/absent optional fields stay off the wire entirely
    assert!(v.get("error").is_none());
    assert!(v.get("probe_errors").is_none());
    assert!(v["whois"].get("raw_excerpt").is_none());
    assert!(v["dns"].get("addresses").is_none());
}

/// An indeterminate signal carries an explicit null, not a missing key:
/// consumers must be able to distinguish "unknown" from "not probed".
#[test]
fn test_indeterminate_signal_serializes_null() {
    let signal = WhoisSignal::indeterminate("WHOIS probe failed: connection refused");
    let v = serde_json::to_value(&signal).unwrap();
    assert!(v["available"].is_null());
    assert_eq!(v["reason"], "WHOIS probe failed: connection refused");
}

#[test]
fn test_registered_result_carries_evidence() {
    let whois = WhoisSignal::registered(
        "WHOIS record found",
        Some("Domain Name: EXAMPLE.COM".to_string()),
    );
    let dns = DnsSignal::resolving(vec!["93.184.216.34".to_string()]);
    let (verdict, rationale) = reconcile(&whois, &dns);
    assert_eq!(verdict, Verdict::NotAvailable);
    assert_eq!(rationale, "both signals indicate the domain is registered");

    let v = serde_json::to_value(&whois).unwrap();
    assert_eq!(v["raw_excerpt"], "Domain Name: EXAMPLE.COM");

    let v = serde_json::to_value(&dns).unwrap();
    assert_eq!(v["addresses"][0], "93.184.216.34");
    assert_eq!(v["reason"], "Domain resolves to an address");
}

#[test]
fn test_result_round_trips_through_json() {
    let whois = WhoisSignal::registered("WHOIS record found", None);
    let dns = DnsSignal::resolving(vec!["203.0.113.7".to_string()]);
    let (verdict, rationale) = reconcile(&whois, &dns);

    let result = DomainCheckResult {
        domain: "taken.org".to_string(),
        verdict: Some(verdict),
        whois: Some(whois),
        dns: Some(dns),
        rationale: Some(rationale),
        probe_errors: vec!["whois: slow referral".to_string()],
        check_duration: None,
        error: None,
    };

    let json = serde_json::to_string(&result).unwrap();
    let back: DomainCheckResult = serde_json::from_str(&json).unwrap();
    assert_eq!(back.domain, "taken.org");
    assert_eq!(back.verdict, Some(Verdict::NotAvailable));
    assert_eq!(back.probe_errors, vec!["whois: slow referral".to_string()]);
}

// ============================================================
// Batch behavior (hermetic)
// ============================================================

/// Invalid domains never touch the network, so a batch of them exercises
/// ordering and per-domain isolation without any probes.
#[tokio::test]
async fn test_batch_preserves_input_order() {
    let checker = DomainChecker::new();
    let domains = vec![
        "has space.com".to_string(),
        "nodots".to_string(),
        "-lead.com".to_string(),
        "trail-.com".to_string(),
        "double..dot.com".to_string(),
        "ab".to_string(),
    ];

    let results = checker.check_domains(&domains).await.unwrap();

    assert_eq!(results.len(), domains.len());
    for (input, result) in domains.iter().zip(&results) {
        assert_eq!(&result.domain, input, "slot order must match input order");
        assert!(!result.is_concluded());
        assert!(result.error.is_some());
    }
}

#[tokio::test]
async fn test_stream_yields_every_domain() {
    let checker = DomainChecker::new();
    let domains = vec![
        "first bad".to_string(),
        "second bad".to_string(),
        "third bad".to_string(),
    ];

    let results: Vec<_> = checker.check_domains_stream(&domains).collect().await;

    assert_eq!(results.len(), domains.len());
    let mut seen: Vec<String> = results.into_iter().map(|r| r.domain).collect();
    seen.sort();
    let mut expected = domains.clone();
    expected.sort();
    assert_eq!(seen, expected);
}

/// Stub WHOIS server that answers every connection with a canned response.
async fn spawn_whois_stub(response: &'static str) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind loopback stub");
    let addr = listener.local_addr().expect("stub addr").to_string();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 256];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(response.as_bytes()).await;
            });
        }
    });
    addr
}

/// Hermetic configuration: WHOIS goes to a loopback stub, DNS goes to a
/// TEST-NET-1 blackhole so it comes back indeterminate quickly.
fn stub_config(whois_addr: &str) -> CheckConfig {
    CheckConfig::default()
        .with_whois_server(whois_addr)
        .with_whois_timeout(Duration::from_secs(2))
        .with_nameserver("192.0.2.1")
        .with_dns_timeout(Duration::from_millis(200))
}

/// Full pipeline against a stub registry: WHOIS says available, DNS is
/// inconclusive, so the verdict must stay cautious.
#[tokio::test]
async fn test_pipeline_whois_available_dns_unknown_is_unclear() {
    let addr = spawn_whois_stub("No match for \"SOMETHING-FRESH.COM\".\r\n").await;
    let checker = DomainChecker::with_config(stub_config(&addr));

    let result = checker.check_domain("something-fresh.com").await;

    assert_eq!(result.verdict, Some(Verdict::Unclear));
    assert_eq!(
        result.rationale.as_deref(),
        Some("WHOIS suggests available but DNS signal inconclusive")
    );
    let whois = result.whois.unwrap();
    assert!(whois.is_available());
    let dns = result.dns.unwrap();
    assert!(dns.is_indeterminate());
    assert!(result.check_duration.is_some());
}

#[tokio::test]
async fn test_pipeline_batch_against_stub() {
    let addr = spawn_whois_stub("Domain Name: TAKEN.COM\nRegistrar: Example Registrar\n").await;
    let checker = DomainChecker::with_config(stub_config(&addr));

    let domains = vec![
        "one.com".to_string(),
        "not a domain".to_string(),
        "two.com".to_string(),
    ];
    let results = checker.check_domains(&domains).await.unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].domain, "one.com");
    assert_eq!(results[1].domain, "not a domain");
    assert_eq!(results[2].domain, "two.com");

    // The invalid entry fails in place without disturbing its neighbors
    assert!(results[0].is_concluded());
    assert!(!results[1].is_concluded());
    assert!(results[2].is_concluded());

    let whois = results[0].whois.as_ref().unwrap();
    assert!(whois.is_registered());
    assert_eq!(whois.reason, "WHOIS record found");
}

/// One dead probe must not sink the check: the WHOIS side times out against
/// a silent server, the result still concludes from what is known.
#[tokio::test]
async fn test_probe_failure_is_isolated() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(60)).await;
                drop(socket);
            });
        }
    });

    let config = stub_config(&addr).with_whois_timeout(Duration::from_millis(300));
    let checker = DomainChecker::with_config(config);

    let started = std::time::Instant::now();
    let result = checker.check_domain("example.com").await;

    assert_eq!(result.verdict, Some(Verdict::Unclear));
    let whois = result.whois.unwrap();
    assert!(whois.is_indeterminate());
    assert!(whois.reason.contains("WHOIS probe failed"));
    assert!(
        result.probe_errors.iter().any(|e| e.starts_with("whois:")),
        "probe failure must be recorded: {:?}",
        result.probe_errors
    );

    // Probe timeouts bound the check; nothing waits on the full 10s backstop
    assert!(started.elapsed() < Duration::from_secs(3));
}

// ============================================================
// Live network smoke tests
// ============================================================

/// Smoke test: google.com must always be reported as taken.
/// This is the single most important invariant for an availability checker.
#[tokio::test]
#[ignore] // needs internet access
async fn test_known_taken_domain_google_com() {
    let checker = DomainChecker::new();
    let result = checker.check_domain("google.com").await;
    assert_eq!(
        result.verdict,
        Some(Verdict::NotAvailable),
        "google.com must be reported as NOT AVAILABLE: {:?}",
        result
    );
}

/// A long random label should come back likely available: WHOIS has no
/// record and DNS answers NXDOMAIN.
#[tokio::test]
#[ignore] // needs internet access
async fn test_nonsense_domain_likely_available() {
    let checker = DomainChecker::new();
    let result = checker
        .check_domain("this-name-surely-does-not-exist-8f3k2j9x.com")
        .await;
    assert_eq!(result.verdict, Some(Verdict::LikelyAvailable), "{:?}", result);
}
