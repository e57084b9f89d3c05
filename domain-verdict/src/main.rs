//! Domain Verdict CLI Application
//!
//! A command-line interface for inferring domain availability from WHOIS and
//! DNS probes. This CLI application provides a user-friendly interface to the
//! domain-verdict-lib library.

mod ui;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::Parser;
use domain_verdict_lib::{
    load_env_config, parse_domain_list, parse_timeout_string, ConfigManager, EnvConfig, FileConfig,
};
use domain_verdict_lib::{CheckConfig, DomainCheckResult, DomainChecker, OutputMode};
use std::net::{IpAddr, SocketAddr};
use std::process;

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// CLI arguments for domain-verdict
#[derive(Parser, Debug)]
#[command(name = "domain-verdict")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Infer domain availability from WHOIS and DNS signals")]
#[command(
    long_about = "Infer domain availability by probing WHOIS and DNS concurrently and reconciling the two signals into a single verdict.\n\nSupports concurrent batch checks, input files, streaming output, and JSON export."
)]
#[command(styles = STYLES)]
pub struct Args {
    /// Domain names to check (fully qualified, e.g. example.com)
    #[arg(value_name = "DOMAINS", help_heading = "Domain Selection")]
    pub domains: Vec<String>,

    /// Input file with domains (one per line, # comments allowed)
    #[arg(
        short = 'f',
        long = "file",
        value_name = "FILE",
        help_heading = "Domain Selection"
    )]
    pub file: Option<String>,

    /// Output results in JSON format
    #[arg(short = 'j', long = "json", help_heading = "Output Format")]
    pub json: bool,

    /// Enable grouped, structured output with section headers
    #[arg(short = 'p', long = "pretty", help_heading = "Output Format")]
    pub pretty: bool,

    /// Collect all results before displaying
    #[arg(long = "batch", help_heading = "Output Format")]
    pub batch: bool,

    /// Show results as they complete
    #[arg(long = "streaming", help_heading = "Output Format")]
    pub streaming: bool,

    /// Max concurrent domain checks (default: 10, max: 100)
    #[arg(
        short = 'c',
        long = "concurrency",
        value_name = "N",
        help_heading = "Performance"
    )]
    pub concurrency: Option<usize>,

    /// WHOIS probe timeout (e.g. 5s, 2m)
    #[arg(
        long = "whois-timeout",
        value_name = "DURATION",
        help_heading = "Probes"
    )]
    pub whois_timeout: Option<String>,

    /// DNS probe timeout (e.g. 3s)
    #[arg(long = "dns-timeout", value_name = "DURATION", help_heading = "Probes")]
    pub dns_timeout: Option<String>,

    /// Overall per-domain deadline (e.g. 10s)
    #[arg(
        long = "check-timeout",
        value_name = "DURATION",
        help_heading = "Probes"
    )]
    pub check_timeout: Option<String>,

    /// WHOIS server to query instead of per-TLD routing
    #[arg(long = "whois-server", value_name = "HOST", help_heading = "Probes")]
    pub whois_server: Option<String>,

    /// Nameserver for DNS probes (IP or IP:port)
    #[arg(long = "nameserver", value_name = "ADDR", help_heading = "Probes")]
    pub nameserver: Option<String>,

    /// Use specific config file instead of automatic discovery
    #[arg(long = "config", value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Show detailed debug information and probe evidence
    #[arg(short = 'd', long = "debug", help_heading = "Configuration")]
    pub debug: bool,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose", help_heading = "Configuration")]
    pub verbose: bool,
}

/// Error statistics for aggregated reporting
#[derive(Debug, Default)]
pub(crate) struct ErrorStats {
    pub(crate) invalid: Vec<String>,
    pub(crate) timeouts: Vec<String>,
    pub(crate) whois_failures: Vec<String>,
    pub(crate) dns_failures: Vec<String>,
}

impl ErrorStats {
    fn add_result(&mut self, result: &DomainCheckResult) {
        if result.error.is_some() {
            self.invalid.push(result.domain.clone());
            return;
        }

        for entry in &result.probe_errors {
            if entry.contains("Timeout after") || entry.contains("timed out") {
                self.timeouts.push(result.domain.clone());
            } else if entry.starts_with("whois:") {
                self.whois_failures.push(result.domain.clone());
            } else if entry.starts_with("dns:") {
                self.dns_failures.push(result.domain.clone());
            }
        }
    }

    fn has_errors(&self) -> bool {
        !self.invalid.is_empty()
            || !self.timeouts.is_empty()
            || !self.whois_failures.is_empty()
            || !self.dns_failures.is_empty()
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Validate arguments
    if let Err(e) = validate_args(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    init_tracing(&args);

    // Set up logging if verbose
    if args.verbose {
        println!(
            "🔧 Domain Verdict CLI v{} starting...",
            env!("CARGO_PKG_VERSION")
        );
    }

    // Run the domain checking
    if let Err(e) = run_domain_check(args).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Route library tracing to stderr so stdout stays parseable.
///
/// RUST_LOG wins when set; otherwise -d and -v pick sensible defaults.
fn init_tracing(args: &Args) {
    let default_directives = if args.debug {
        "domain_verdict=debug,domain_verdict_lib=debug"
    } else if args.verbose {
        "domain_verdict=info,domain_verdict_lib=info"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directives));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Validate command line arguments
fn validate_args(args: &Args) -> Result<(), String> {
    // Must have either domains or a file; DV_FILE can stand in for --file
    if args.domains.is_empty() && args.file.is_none() && std::env::var("DV_FILE").is_err() {
        return Err("You must specify domain names or a file with --file".to_string());
    }

    // Can't have conflicting output modes
    if args.batch && args.streaming {
        return Err("Cannot specify both --batch and --streaming modes".to_string());
    }

    // Streaming mode doesn't support structured output
    if args.streaming && args.json {
        return Err(
            "Cannot use --streaming with --json. Use --batch for structured output".to_string(),
        );
    }

    // Validate concurrency
    if let Some(concurrency) = args.concurrency {
        if concurrency == 0 || concurrency > 100 {
            return Err("Concurrency must be between 1 and 100".to_string());
        }
    }

    // Validate timeout formats early so bad input fails before any probing
    let timeouts = [
        ("--whois-timeout", &args.whois_timeout),
        ("--dns-timeout", &args.dns_timeout),
        ("--check-timeout", &args.check_timeout),
    ];
    for (flag, value) in timeouts {
        if let Some(timeout_str) = value {
            if parse_timeout_string(timeout_str).is_none() {
                return Err(format!(
                    "Invalid {} value '{}': use formats like '5s', '2m', or plain seconds",
                    flag, timeout_str
                ));
            }
        }
    }

    // Validate nameserver address
    if let Some(nameserver) = &args.nameserver {
        let valid = nameserver.parse::<SocketAddr>().is_ok() || nameserver.parse::<IpAddr>().is_ok();
        if !valid {
            return Err(format!(
                "Invalid nameserver '{}': expected an IP address or IP:port",
                nameserver
            ));
        }
    }

    Ok(())
}

/// Main domain checking logic
async fn run_domain_check(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables once; both config and domain selection use them
    let env_config = load_env_config(args.verbose);

    // Load config file (explicit path, DV_CONFIG, or discovery)
    let file_config = load_file_config(&args, &env_config)?;

    // Build configuration with CLI > env > file > defaults precedence
    let config = resolve_check_config(&args, &env_config, &file_config)?;

    // Resolve output settings with the same precedence
    let (json, pretty) = resolve_output_flags(&args, &env_config, &file_config);
    let output_mode = resolve_output_mode(&args, &env_config, &file_config);

    // Determine domains to check
    let domains = get_domains_to_check(&args, &env_config).await?;

    // Create domain checker
    let checker = DomainChecker::with_config(config);

    if should_use_streaming(output_mode, domains.len(), json) {
        // Streaming mode for multiple domains - show real-time results
        run_streaming_check(&checker, &domains, &args, pretty).await?;
    } else {
        // Batch mode for single domains or when explicitly requested
        run_batch_check(&checker, &domains, &args, json, pretty).await?;
    }

    Ok(())
}

/// Load the config file with explicit paths taking priority over discovery.
///
/// Precedence: CLI --config > DV_CONFIG env var > automatic discovery.
/// An explicit path that fails to load is an error; discovery failures
/// fall back to defaults.
fn load_file_config(
    args: &Args,
    env_config: &EnvConfig,
) -> Result<FileConfig, Box<dyn std::error::Error>> {
    let config_manager = ConfigManager::new(args.verbose);

    if let Some(explicit_path) = &args.config {
        if args.verbose {
            println!(
                "🔧 Using explicit config file (CLI --config): {}",
                explicit_path
            );
        }

        let file_config = config_manager
            .load_file(explicit_path)
            .map_err(|e| format!("Failed to load config file '{}': {}", explicit_path, e))?;

        return Ok(file_config);
    }

    if let Some(env_path) = &env_config.config {
        if args.verbose {
            println!(
                "🔧 Using explicit config file (DV_CONFIG env var): {}",
                env_path
            );
        }

        let file_config = config_manager
            .load_file(env_path)
            .map_err(|e| format!("Failed to load config file '{}': {}", env_path, e))?;

        return Ok(file_config);
    }

    if args.verbose {
        println!("🔧 Discovering config files...");
    }

    match config_manager.discover_and_load() {
        Ok(file_config) => Ok(file_config),
        Err(e) => {
            if args.verbose {
                eprintln!("⚠️ Config discovery warning: {}", e);
            }
            // Silently continue with defaults if no config files found
            Ok(FileConfig::default())
        }
    }
}

/// Build CheckConfig with CLI > environment > config file > defaults precedence.
fn resolve_check_config(
    args: &Args,
    env_config: &EnvConfig,
    file_config: &FileConfig,
) -> Result<CheckConfig, String> {
    let mut config = CheckConfig::default();

    config = merge_file_config_into_check_config(config, file_config);
    config = apply_environment_config(config, env_config);
    config = apply_cli_args_to_config(config, args)?;

    Ok(config)
}

/// Merge FileConfig into CheckConfig
fn merge_file_config_into_check_config(
    mut config: CheckConfig,
    file_config: &FileConfig,
) -> CheckConfig {
    if let Some(defaults) = &file_config.defaults {
        if let Some(concurrency) = defaults.concurrency {
            config.concurrency = concurrency;
        }

        // Timeout strings were validated at load time
        if let Some(secs) = defaults.whois_timeout.as_deref().and_then(parse_timeout_string) {
            config.whois_timeout = std::time::Duration::from_secs(secs);
        }
        if let Some(secs) = defaults.dns_timeout.as_deref().and_then(parse_timeout_string) {
            config.dns_timeout = std::time::Duration::from_secs(secs);
        }
        if let Some(secs) = defaults.check_timeout.as_deref().and_then(parse_timeout_string) {
            config.check_timeout = std::time::Duration::from_secs(secs);
        }

        if let Some(whois_server) = &defaults.whois_server {
            config.whois_server = Some(whois_server.clone());
        }
        if let Some(nameserver) = &defaults.nameserver {
            config.nameserver = Some(nameserver.clone());
        }
    }

    if let Some(whois) = &file_config.whois {
        if let Some(patterns) = &whois.available_patterns {
            config.whois_patterns = patterns.clone();
        }
    }

    config
}

/// Apply environment variables to config with comprehensive DV_* support.
///
/// The variables themselves are read and validated by the library's
/// load_env_config().
fn apply_environment_config(mut config: CheckConfig, env_config: &EnvConfig) -> CheckConfig {
    if let Some(concurrency) = env_config.concurrency {
        config.concurrency = concurrency;
    }

    if let Some(secs) = env_config.whois_timeout.as_deref().and_then(parse_timeout_string) {
        config.whois_timeout = std::time::Duration::from_secs(secs);
    }
    if let Some(secs) = env_config.dns_timeout.as_deref().and_then(parse_timeout_string) {
        config.dns_timeout = std::time::Duration::from_secs(secs);
    }
    if let Some(secs) = env_config.check_timeout.as_deref().and_then(parse_timeout_string) {
        config.check_timeout = std::time::Duration::from_secs(secs);
    }

    if let Some(whois_server) = &env_config.whois_server {
        config.whois_server = Some(whois_server.clone());
    }
    if let Some(nameserver) = &env_config.nameserver {
        config.nameserver = Some(nameserver.clone());
    }

    config
}

/// Apply CLI arguments to config (highest precedence).
///
/// Every probe flag is Option-typed, so only values the user actually
/// passed override environment and config file settings.
fn apply_cli_args_to_config(mut config: CheckConfig, args: &Args) -> Result<CheckConfig, String> {
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }

    if let Some(timeout_str) = &args.whois_timeout {
        let secs = parse_timeout_string(timeout_str)
            .ok_or_else(|| format!("Invalid --whois-timeout value '{}'", timeout_str))?;
        config.whois_timeout = std::time::Duration::from_secs(secs);
    }
    if let Some(timeout_str) = &args.dns_timeout {
        let secs = parse_timeout_string(timeout_str)
            .ok_or_else(|| format!("Invalid --dns-timeout value '{}'", timeout_str))?;
        config.dns_timeout = std::time::Duration::from_secs(secs);
    }
    if let Some(timeout_str) = &args.check_timeout {
        let secs = parse_timeout_string(timeout_str)
            .ok_or_else(|| format!("Invalid --check-timeout value '{}'", timeout_str))?;
        config.check_timeout = std::time::Duration::from_secs(secs);
    }

    if let Some(whois_server) = &args.whois_server {
        config.whois_server = Some(whois_server.clone());
    }
    if let Some(nameserver) = &args.nameserver {
        config.nameserver = Some(nameserver.clone());
    }

    Ok(config)
}

/// Resolve the output mode from flags, environment, and config file.
fn resolve_output_mode(args: &Args, env_config: &EnvConfig, file_config: &FileConfig) -> OutputMode {
    if args.batch {
        return OutputMode::Collected;
    }
    if args.streaming {
        return OutputMode::Streaming;
    }

    if env_config.streaming == Some(true) {
        return OutputMode::Streaming;
    }

    let file_streaming = file_config.output.as_ref().and_then(|o| o.streaming);
    if file_streaming == Some(true) {
        return OutputMode::Streaming;
    }

    OutputMode::Auto
}

/// Resolve (json, pretty) output flags from CLI, environment, and config file.
///
/// These are enable-only flags, so any layer can turn them on.
fn resolve_output_flags(
    args: &Args,
    env_config: &EnvConfig,
    file_config: &FileConfig,
) -> (bool, bool) {
    let file_output = file_config.output.as_ref();

    let json = args.json
        || env_config.json.unwrap_or(false)
        || file_output.and_then(|o| o.json).unwrap_or(false);
    let pretty = args.pretty
        || env_config.pretty.unwrap_or(false)
        || file_output.and_then(|o| o.pretty).unwrap_or(false);

    (json, pretty)
}

/// Determine whether to use streaming or batch mode.
///
/// JSON output always collects; a streaming run cannot emit a valid
/// top-level array incrementally.
fn should_use_streaming(mode: OutputMode, domain_count: usize, json: bool) -> bool {
    match mode {
        OutputMode::Collected => false,
        OutputMode::Streaming => !json,
        OutputMode::Auto => domain_count > 1 && !json,
    }
}

/// Get the list of domains to check from CLI args, environment, or file
async fn get_domains_to_check(
    args: &Args,
    env_config: &EnvConfig,
) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let mut domains = args.domains.clone();

    if let Some(cli_file) = &args.file {
        if args.verbose {
            println!("🔧 Reading domains from file (CLI --file): {}", cli_file);
        }
        domains.extend(read_domains_from_file(cli_file).await?);
    } else if let Some(env_file) = &env_config.file {
        if args.verbose {
            println!(
                "🔧 Reading domains from file (DV_FILE env var): {}",
                env_file
            );
        }
        domains.extend(read_domains_from_file(env_file).await?);
    }

    if domains.is_empty() {
        return Err("No domains found to check".into());
    }

    Ok(domains)
}

/// Read domains from a file
async fn read_domains_from_file(file_path: &str) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let path = std::path::Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {}", file_path).into());
    }

    let contents = tokio::fs::read_to_string(path).await?;
    let domains = parse_domain_list(&contents);

    if domains.is_empty() {
        return Err("No valid domains found in the file.".into());
    }

    Ok(domains)
}

/// Run domain check in streaming mode with real-time progress
async fn run_streaming_check(
    checker: &DomainChecker,
    domains: &[String],
    args: &Args,
    pretty: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    use futures::StreamExt;

    // Show initial progress message
    if pretty {
        ui::print_header(domains.len(), checker.config().concurrency, args);
    } else if args.verbose {
        println!(
            "🔍 Checking {} domains with concurrency: {}",
            domains.len(),
            checker.config().concurrency
        );

        if args.debug {
            println!("🔧 Domains: {}", domains.join(", "));
        }

        println!(); // Empty line for readability
    }

    // Track statistics for summary
    let mut available_count = 0;
    let mut taken_count = 0;
    let mut unclear_count = 0;
    let mut invalid_count = 0;
    let mut error_stats = ErrorStats::default();
    let mut completed = 0usize;
    let total = domains.len();

    let start_time = std::time::Instant::now();

    let mut stream = checker.check_domains_stream(domains);

    // Process results as they complete
    while let Some(result) = stream.next().await {
        match ui::group_of(&result) {
            ui::Group::Available => available_count += 1,
            ui::Group::Taken => taken_count += 1,
            ui::Group::Unclear => unclear_count += 1,
            ui::Group::Invalid => invalid_count += 1,
        }
        error_stats.add_result(&result);

        completed += 1;

        // Show result immediately
        let counter = if total > 1 {
            Some((completed, total))
        } else {
            None
        };
        if pretty {
            ui::print_result(&result, args.debug, counter);
        } else {
            ui::print_result_default(&result, args.debug, counter);
        }
    }

    let duration = start_time.elapsed();

    // Show final summary for multiple domains
    if total > 1 {
        println!();
        ui::print_summary(
            total,
            available_count,
            taken_count,
            unclear_count,
            invalid_count,
            duration,
        );
        if error_stats.has_errors() {
            println!();
            ui::print_error_summary(&error_stats);
        }
    }

    Ok(())
}

/// Run domain check in batch mode (collect all results first)
async fn run_batch_check(
    checker: &DomainChecker,
    domains: &[String],
    args: &Args,
    json: bool,
    pretty: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    // Show header (pretty only, default mode lets the spinner + summary speak)
    if pretty && !json && domains.len() > 1 {
        ui::print_header(domains.len(), checker.config().concurrency, args);
    } else if domains.len() > 1 && args.verbose {
        println!("🔍 Checking {} domains...", domains.len());
    }

    // Start spinner for batch mode with multiple domains (all text modes).
    // Spinner::start returns None if stderr isn't a TTY.
    let spinner = if !json && domains.len() > 1 {
        ui::Spinner::start(format!("Checking {} domains...", domains.len()))
    } else {
        None
    };

    let start_time = std::time::Instant::now();

    // Check all domains (concurrent under the hood)
    let results = checker.check_domains(domains).await?;

    let duration = start_time.elapsed();

    // Stop spinner before printing results
    if let Some(s) = spinner {
        s.stop().await;
    }

    // Display results based on format
    display_results(&results, args, json, pretty, duration)?;

    Ok(())
}

fn display_results(
    results: &[DomainCheckResult],
    args: &Args,
    json: bool,
    pretty: bool,
    duration: std::time::Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(results)?);
        return Ok(());
    }

    if pretty {
        // Pretty mode: grouped layout with section headers
        ui::print_grouped_results(results, args.debug);
    } else {
        // Default mode: colored flat list
        for result in results {
            ui::print_result_default(result, args.debug, None);
        }
    }

    // Shared summary for both text modes
    if results.len() > 1 {
        let available = results
            .iter()
            .filter(|r| ui::group_of(r) == ui::Group::Available)
            .count();
        let taken = results
            .iter()
            .filter(|r| ui::group_of(r) == ui::Group::Taken)
            .count();
        let unclear = results
            .iter()
            .filter(|r| ui::group_of(r) == ui::Group::Unclear)
            .count();
        let invalid = results
            .iter()
            .filter(|r| ui::group_of(r) == ui::Group::Invalid)
            .count();

        println!();
        ui::print_summary(results.len(), available, taken, unclear, invalid, duration);

        let mut error_stats = ErrorStats::default();
        for result in results {
            error_stats.add_result(result);
        }
        if error_stats.has_errors() {
            println!();
            ui::print_error_summary(&error_stats);
        }
    }

    Ok(())
}

// domain-verdict/src/main.rs tests module
