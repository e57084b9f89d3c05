//! Display logic for the domain-verdict CLI.
//!
//! This module handles all terminal output: colored result lines, grouped
//! batch output, spinner animation, progress counters, headers, and
//! summaries. Uses only the `console` crate (already a dependency).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use console::{pad_str, style, Alignment, Term};
use domain_verdict_lib::{DomainCheckResult, Verdict};

use crate::{Args, ErrorStats};

// ── Spinner ──────────────────────────────────────────────────────────────────

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// An async braille-dot spinner that writes to stderr so stdout stays clean.
pub struct Spinner {
    running: Arc<AtomicBool>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl Spinner {
    /// Start a new spinner with the given message (e.g. "Checking 8 domains...").
    ///
    /// Returns None when stderr is not a terminal; piped runs stay clean.
    pub fn start(message: String) -> Option<Self> {
        if !Term::stderr().is_term() {
            return None;
        }

        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();

        let handle = tokio::spawn(async move {
            let term = Term::stderr();
            let mut idx = 0usize;
            while running_clone.load(Ordering::Relaxed) {
                let frame = SPINNER_FRAMES[idx % SPINNER_FRAMES.len()];
                let _ = term.clear_line();
                let _ = term.write_str(&format!("{} {}", style(frame).cyan(), message));
                idx += 1;
                tokio::time::sleep(Duration::from_millis(80)).await;
            }
            let _ = term.clear_line();
        });

        Some(Self {
            running,
            handle: Some(handle),
        })
    }

    /// Stop the spinner and clear the line.
    pub async fn stop(mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(h) = self.handle.take() {
            let _ = h.await;
        }
    }
}

// ── Grouping ─────────────────────────────────────────────────────────────────

/// Display bucket for a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Group {
    Available,
    Taken,
    Unclear,
    Invalid,
}

/// Classify a result into its display bucket.
pub fn group_of(result: &DomainCheckResult) -> Group {
    match result.verdict {
        Some(Verdict::LikelyAvailable) => Group::Available,
        Some(Verdict::NotAvailable) => Group::Taken,
        Some(Verdict::Unclear) => Group::Unclear,
        None => Group::Invalid,
    }
}

// ── Header ───────────────────────────────────────────────────────────────────

/// Print a styled header at the start of a pretty run.
pub fn print_header(domain_count: usize, concurrency: usize, args: &Args) {
    println!(
        "{} {}  {}",
        style("domain-verdict").bold(),
        style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim(),
        style(format!(
            "Checking {} domain{}",
            domain_count,
            if domain_count == 1 { "" } else { "s" }
        ))
        .dim(),
    );

    let mut meta_parts: Vec<String> = Vec::new();

    if let Some(server) = &args.whois_server {
        meta_parts.push(format!("WHOIS server: {}", server));
    }
    if let Some(nameserver) = &args.nameserver {
        meta_parts.push(format!("Nameserver: {}", nameserver));
    }
    meta_parts.push(format!("Concurrency: {}", concurrency));

    println!("{}", style(meta_parts.join(" | ")).dim());
    println!();
}

// ── Single result line ───────────────────────────────────────────────────────

/// Print a single result in the default flat format.
///
/// If `counter` is Some((current, total)), a progress prefix like `[3/8]` is
/// shown.
pub fn print_result_default(result: &DomainCheckResult, debug: bool, counter: Option<(usize, usize)>) {
    let prefix = match counter {
        Some((cur, total)) => format!("{} ", style(format!("[{}/{}]", cur, total)).dim()),
        None => String::new(),
    };

    match &result.verdict {
        Some(verdict) => {
            println!("{}{} → {}", prefix, result.domain, verdict);
        }
        None => {
            let reason = result.error.as_deref().unwrap_or("invalid domain");
            println!(
                "{}{} → ⚠️ {}",
                prefix,
                result.domain,
                style(reason).yellow()
            );
        }
    }

    if debug {
        print_debug_details(result, "  ");
    }
}

/// Format and print a single domain result with colors and alignment.
pub fn print_result(result: &DomainCheckResult, debug: bool, counter: Option<(usize, usize)>) {
    let domain_width = 30;
    let padded_domain = pad_str(&result.domain, domain_width, Alignment::Left, Some(".."));

    let prefix = match counter {
        Some((cur, total)) => format!("{} ", style(format!("[{}/{}]", cur, total)).dim()),
        None => String::new(),
    };

    match &result.verdict {
        Some(verdict) => {
            let status = match verdict {
                Verdict::LikelyAvailable => style(verdict.label()).green().bold(),
                Verdict::NotAvailable => style(verdict.label()).red().bold(),
                Verdict::Unclear => style(verdict.label()).yellow(),
            };

            if *verdict == Verdict::Unclear {
                println!(
                    "  {}{}  {}  {}",
                    prefix,
                    style(&padded_domain).white(),
                    status,
                    style(brief_note(result)).dim(),
                );
            } else {
                println!(
                    "  {}{}  {}",
                    prefix,
                    style(&padded_domain).white(),
                    status,
                );
            }
        }
        None => {
            println!(
                "  {}{}  {}  {}",
                prefix,
                style(&padded_domain).white(),
                style("INVALID").yellow().bold(),
                style(brief_note(result)).dim(),
            );
        }
    }

    if debug {
        print_debug_details(result, "    ");
    }
}

/// Print the per-probe evidence beneath a result line.
fn print_debug_details(result: &DomainCheckResult, indent: &str) {
    if let Some(whois) = &result.whois {
        println!(
            "{}{} whois: {}",
            indent,
            style("└─").dim(),
            style(&whois.reason).dim()
        );
        if let Some(excerpt) = &whois.raw_excerpt {
            println!(
                "{}   {}",
                indent,
                style(excerpt.lines().next().unwrap_or_default()).dim()
            );
        }
    }
    if let Some(dns) = &result.dns {
        let addresses = if dns.addresses.is_empty() {
            String::new()
        } else {
            format!(" [{}]", dns.addresses.join(", "))
        };
        println!(
            "{}{} dns: {}{}",
            indent,
            style("└─").dim(),
            style(&dns.reason).dim(),
            style(addresses).dim()
        );
    }
    if let Some(duration) = result.check_duration {
        println!(
            "{}{} checked in {}ms",
            indent,
            style("└─").dim(),
            duration.as_millis()
        );
    }
}

// ── Grouped batch output ─────────────────────────────────────────────────────

/// Print results grouped by verdict. Empty sections are omitted entirely.
pub fn print_grouped_results(results: &[DomainCheckResult], debug: bool) {
    let available: Vec<&DomainCheckResult> = results
        .iter()
        .filter(|r| group_of(r) == Group::Available)
        .collect();
    let taken: Vec<&DomainCheckResult> = results
        .iter()
        .filter(|r| group_of(r) == Group::Taken)
        .collect();
    let unclear: Vec<&DomainCheckResult> = results
        .iter()
        .filter(|r| group_of(r) == Group::Unclear)
        .collect();
    let invalid: Vec<&DomainCheckResult> = results
        .iter()
        .filter(|r| group_of(r) == Group::Invalid)
        .collect();

    if !available.is_empty() {
        println!(
            "  {} {}",
            style(format!("── Likely Available ({}) ", available.len()))
                .green()
                .bold(),
            style("─".repeat(40)).green().dim(),
        );
        for r in &available {
            print_grouped_line(r, debug);
        }
        println!();
    }

    if !taken.is_empty() {
        println!(
            "  {} {}",
            style(format!("── Not Available ({}) ", taken.len()))
                .red()
                .bold(),
            style("─".repeat(40)).red().dim(),
        );
        for r in &taken {
            print_grouped_line(r, debug);
        }
        println!();
    }

    if !unclear.is_empty() {
        println!(
            "  {} {}",
            style(format!("── Unclear ({}) ", unclear.len()))
                .yellow()
                .bold(),
            style("─".repeat(40)).yellow().dim(),
        );
        for r in &unclear {
            print_grouped_line(r, debug);
        }
        println!();
    }

    if !invalid.is_empty() {
        println!(
            "  {} {}",
            style(format!("── Invalid ({}) ", invalid.len()))
                .yellow()
                .bold(),
            style("─".repeat(40)).yellow().dim(),
        );
        for r in &invalid {
            print_grouped_line(r, debug);
        }
        println!();
    }
}

/// Print a single line inside a grouped section.
fn print_grouped_line(result: &DomainCheckResult, debug: bool) {
    let domain_width = 30;
    let padded = pad_str(&result.domain, domain_width, Alignment::Left, Some(".."));

    match group_of(result) {
        Group::Available | Group::Taken => {
            println!("    {}", style(&padded).white());
        }
        Group::Unclear | Group::Invalid => {
            println!(
                "    {}  {}",
                style(&padded).white(),
                style(brief_note(result)).dim()
            );
        }
    }

    if debug {
        print_debug_details(result, "      ");
    }
}

// ── Summary ──────────────────────────────────────────────────────────────────

/// Print the final summary bar with colored counts.
pub fn print_summary(
    total: usize,
    available: usize,
    taken: usize,
    unclear: usize,
    invalid: usize,
    duration: Duration,
) {
    println!(
        "  {}",
        style("────────────────────────────────────────────────────").dim()
    );

    let mut line = format!(
        "  {} domain{} in {:.1}s  {}  {}  {}  {}  {}  {}",
        style(total).bold(),
        if total == 1 { "" } else { "s" },
        duration.as_secs_f64(),
        style("|").dim(),
        style(format!("{} likely available", available)).green(),
        style("|").dim(),
        style(format!("{} not available", taken)).red(),
        style("|").dim(),
        style(format!("{} unclear", unclear)).yellow(),
    );
    if invalid > 0 {
        line.push_str(&format!(
            "  {}  {}",
            style("|").dim(),
            style(format!("{} invalid", invalid)).yellow()
        ));
    }
    println!("{}", line);
}

// ── Error summary ────────────────────────────────────────────────────────────

/// Print a categorized error summary using colors.
pub fn print_error_summary(error_stats: &ErrorStats) {
    if !error_stats.has_errors() {
        return;
    }

    println!("  {}", style("Some checks ran into trouble:").yellow());

    let format_list = |domains: &[String], max_show: usize| -> String {
        if domains.len() <= max_show {
            domains.join(", ")
        } else {
            let shown = &domains[..max_show];
            let remaining = domains.len() - max_show;
            format!("{}, ... and {} more", shown.join(", "), remaining)
        }
    };

    if !error_stats.invalid.is_empty() {
        println!(
            "  {} {} invalid domain{}: {}",
            style("•").dim(),
            error_stats.invalid.len(),
            if error_stats.invalid.len() == 1 { "" } else { "s" },
            format_list(&error_stats.invalid, 5),
        );
    }
    if !error_stats.timeouts.is_empty() {
        println!(
            "  {} {} probe timeout{}: {}",
            style("•").dim(),
            error_stats.timeouts.len(),
            if error_stats.timeouts.len() == 1 { "" } else { "s" },
            format_list(&error_stats.timeouts, 5),
        );
    }
    if !error_stats.whois_failures.is_empty() {
        println!(
            "  {} {} WHOIS failure{}: {}",
            style("•").dim(),
            error_stats.whois_failures.len(),
            if error_stats.whois_failures.len() == 1 { "" } else { "s" },
            format_list(&error_stats.whois_failures, 5),
        );
    }
    if !error_stats.dns_failures.is_empty() {
        println!(
            "  {} {} DNS failure{}: {}",
            style("•").dim(),
            error_stats.dns_failures.len(),
            if error_stats.dns_failures.len() == 1 { "" } else { "s" },
            format_list(&error_stats.dns_failures, 5),
        );
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// A one-line note explaining an unclear or invalid result.
fn brief_note(result: &DomainCheckResult) -> &str {
    if let Some(error) = &result.error {
        return error;
    }
    result.rationale.as_deref().unwrap_or("no details")
}

// ── Tests ────────────────────────────────────────────────────────────────────
