//! Configuration file parsing and management.
//!
//! This module handles loading configuration from TOML files and environment
//! variables, and merging configurations with proper precedence rules.
//! Resolution order, lowest to highest: config file, DV_* environment
//! variables, command-line flags.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::DomainCheckError;

/// Configuration loaded from TOML files.
///
/// This represents the structure of configuration files that users can create
/// to set default values for checks and output.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Default values for check options
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,

    /// Output formatting preferences
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputConfig>,

    /// WHOIS classifier tuning
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whois: Option<WhoisConfig>,
}

/// Default configuration values that map to CLI options.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DefaultsConfig {
    /// Default concurrency level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,

    /// Default WHOIS probe timeout (as string, e.g., "5s", "30s")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whois_timeout: Option<String>,

    /// Default DNS probe timeout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_timeout: Option<String>,

    /// Default per-domain check timeout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_timeout: Option<String>,

    /// Fixed WHOIS server replacing per-TLD routing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whois_server: Option<String>,

    /// Custom DNS nameserver (IP or IP:port)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nameserver: Option<String>,
}

/// Output formatting configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputConfig {
    /// Emit JSON by default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,

    /// Pretty-print JSON by default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pretty: Option<bool>,

    /// Stream results as they complete by default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streaming: Option<bool>,
}

/// WHOIS classifier tuning.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WhoisConfig {
    /// Extra availability phrases checked after the built-in table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_patterns: Option<Vec<String>>,
}

/// Configuration discovery and loading functionality.
pub struct ConfigManager {
    /// Whether to emit warnings for config issues
    pub verbose: bool,
}

impl ConfigManager {
    /// Create a new configuration manager.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Load configuration from a specific file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// The parsed configuration or an error if parsing fails.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig, DomainCheckError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(DomainCheckError::file_error(
                path.to_string_lossy(),
                "Configuration file not found",
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            DomainCheckError::file_error(
                path.to_string_lossy(),
                format!("Failed to read configuration file: {}", e),
            )
        })?;

        let config: FileConfig =
            toml::from_str(&content).map_err(|e| DomainCheckError::ConfigError {
                message: format!("Failed to parse TOML configuration: {}", e),
            })?;

        // Validate the loaded configuration
        self.validate_config(&config)?;

        Ok(config)
    }

    /// Discover and load configuration files in precedence order.
    ///
    /// Looks for configuration files in standard locations and merges them,
    /// later discoveries overriding earlier ones.
    ///
    /// # Returns
    ///
    /// Merged configuration from all discovered files.
    pub fn discover_and_load(&self) -> Result<FileConfig, DomainCheckError> {
        let mut merged_config = FileConfig::default();
        let mut loaded_files = Vec::new();

        // 1. Load XDG config (lowest precedence)
        if let Some(xdg_path) = self.get_xdg_config_path() {
            if let Ok(config) = self.load_file(&xdg_path) {
                merged_config = self.merge_configs(merged_config, config);
                loaded_files.push(xdg_path);
            }
        }

        // 2. Load home-directory config
        if let Some(global_path) = self.get_global_config_path() {
            if let Ok(config) = self.load_file(&global_path) {
                merged_config = self.merge_configs(merged_config, config);
                loaded_files.push(global_path);
            }
        }

        // 3. Load local config (highest precedence)
        if let Some(local_path) = self.get_local_config_path() {
            if let Ok(config) = self.load_file(&local_path) {
                merged_config = self.merge_configs(merged_config, config);
                loaded_files.push(local_path);
            }
        }

        if self.verbose && loaded_files.len() > 1 {
            eprintln!("⚠️  Multiple config files found. Using precedence:");
            for (i, path) in loaded_files.iter().enumerate() {
                let status = if i == loaded_files.len() - 1 {
                    "highest"
                } else {
                    "overridden"
                };
                eprintln!("   {} ({})", path.display(), status);
            }
        }

        Ok(merged_config)
    }

    /// Get the local configuration file path.
    ///
    /// Looks for configuration files in the current directory.
    fn get_local_config_path(&self) -> Option<PathBuf> {
        let candidates = ["./domain-verdict.toml", "./.domain-verdict.toml"];

        for candidate in &candidates {
            let path = Path::new(candidate);
            if path.exists() {
                return Some(path.to_path_buf());
            }
        }

        None
    }

    /// Get the home-directory configuration file path.
    fn get_global_config_path(&self) -> Option<PathBuf> {
        if let Some(home) = env::var_os("HOME") {
            let candidates = [".domain-verdict.toml", "domain-verdict.toml"];

            for candidate in &candidates {
                let path = Path::new(&home).join(candidate);
                if path.exists() {
                    return Some(path);
                }
            }
        }

        None
    }

    /// Get the XDG configuration file path.
    ///
    /// Follows the XDG Base Directory Specification.
    fn get_xdg_config_path(&self) -> Option<PathBuf> {
        let config_dir = env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| Path::new(&home).join(".config")))?;

        let path = config_dir.join("domain-verdict").join("config.toml");
        if path.exists() {
            Some(path)
        } else {
            None
        }
    }

    /// Merge two configurations with proper precedence.
    ///
    /// Values from `higher` take precedence over values from `lower`.
    fn merge_configs(&self, lower: FileConfig, higher: FileConfig) -> FileConfig {
        FileConfig {
            defaults: match (lower.defaults, higher.defaults) {
                (Some(mut lower_defaults), Some(higher_defaults)) => {
                    if higher_defaults.concurrency.is_some() {
                        lower_defaults.concurrency = higher_defaults.concurrency;
                    }
                    if higher_defaults.whois_timeout.is_some() {
                        lower_defaults.whois_timeout = higher_defaults.whois_timeout;
                    }
                    if higher_defaults.dns_timeout.is_some() {
                        lower_defaults.dns_timeout = higher_defaults.dns_timeout;
                    }
                    if higher_defaults.check_timeout.is_some() {
                        lower_defaults.check_timeout = higher_defaults.check_timeout;
                    }
                    if higher_defaults.whois_server.is_some() {
                        lower_defaults.whois_server = higher_defaults.whois_server;
                    }
                    if higher_defaults.nameserver.is_some() {
                        lower_defaults.nameserver = higher_defaults.nameserver;
                    }
                    Some(lower_defaults)
                }
                (None, Some(higher_defaults)) => Some(higher_defaults),
                (Some(lower_defaults), None) => Some(lower_defaults),
                (None, None) => None,
            },
            output: match (lower.output, higher.output) {
                (Some(mut lower_output), Some(higher_output)) => {
                    if higher_output.json.is_some() {
                        lower_output.json = higher_output.json;
                    }
                    if higher_output.pretty.is_some() {
                        lower_output.pretty = higher_output.pretty;
                    }
                    if higher_output.streaming.is_some() {
                        lower_output.streaming = higher_output.streaming;
                    }
                    Some(lower_output)
                }
                (None, Some(higher_output)) => Some(higher_output),
                (Some(lower_output), None) => Some(lower_output),
                (None, None) => None,
            },
            whois: higher.whois.or(lower.whois),
        }
    }

    /// Validate a configuration for common issues.
    fn validate_config(&self, config: &FileConfig) -> Result<(), DomainCheckError> {
        if let Some(defaults) = &config.defaults {
            if let Some(concurrency) = defaults.concurrency {
                if concurrency == 0 || concurrency > 100 {
                    return Err(DomainCheckError::ConfigError {
                        message: "Concurrency must be between 1 and 100".to_string(),
                    });
                }
            }

            let timeouts = [
                ("whois_timeout", &defaults.whois_timeout),
                ("dns_timeout", &defaults.dns_timeout),
                ("check_timeout", &defaults.check_timeout),
            ];
            for (name, value) in timeouts {
                if let Some(timeout_str) = value {
                    if parse_timeout_string(timeout_str).is_none() {
                        return Err(DomainCheckError::ConfigError {
                            message: format!(
                                "Invalid {} '{}'. Use format like '5s', '30s', '2m'",
                                name, timeout_str
                            ),
                        });
                    }
                }
            }
        }

        if let Some(whois) = &config.whois {
            if let Some(patterns) = &whois.available_patterns {
                if patterns.iter().any(|p| p.trim().is_empty()) {
                    return Err(DomainCheckError::ConfigError {
                        message: "WHOIS availability patterns cannot be empty".to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}

/// Environment variable configuration that mirrors CLI options.
///
/// This represents configuration values that can be set via DV_* environment
/// variables.
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    pub concurrency: Option<usize>,
    pub whois_timeout: Option<String>,
    pub dns_timeout: Option<String>,
    pub check_timeout: Option<String>,
    pub whois_server: Option<String>,
    pub nameserver: Option<String>,
    pub json: Option<bool>,
    pub pretty: Option<bool>,
    pub streaming: Option<bool>,
    pub file: Option<String>,
    pub config: Option<String>,
}

/// Load configuration from environment variables.
///
/// Parses all DV_* environment variables and returns a structured
/// configuration. Invalid values are logged as warnings and ignored.
///
/// # Arguments
///
/// * `verbose` - Whether to log environment variable usage
///
/// # Returns
///
/// Parsed environment configuration with validated values.
pub fn load_env_config(verbose: bool) -> EnvConfig {
    let mut env_config = EnvConfig::default();

    // DV_CONCURRENCY - concurrent domain checks
    if let Ok(val) = env::var("DV_CONCURRENCY") {
        match val.parse::<usize>() {
            Ok(concurrency) if concurrency > 0 && concurrency <= 100 => {
                env_config.concurrency = Some(concurrency);
                if verbose {
                    println!("🔧 Using DV_CONCURRENCY={}", concurrency);
                }
            }
            _ => {
                if verbose {
                    eprintln!("⚠️ Invalid DV_CONCURRENCY='{}', must be 1-100", val);
                }
            }
        }
    }

    env_config.whois_timeout = env_timeout("DV_WHOIS_TIMEOUT", verbose);
    env_config.dns_timeout = env_timeout("DV_DNS_TIMEOUT", verbose);
    env_config.check_timeout = env_timeout("DV_CHECK_TIMEOUT", verbose);

    // DV_WHOIS_SERVER - fixed WHOIS server
    if let Ok(server) = env::var("DV_WHOIS_SERVER") {
        if !server.trim().is_empty() {
            env_config.whois_server = Some(server.clone());
            if verbose {
                println!("🔧 Using DV_WHOIS_SERVER={}", server);
            }
        }
    }

    // DV_NAMESERVER - custom DNS nameserver
    if let Ok(nameserver) = env::var("DV_NAMESERVER") {
        if !nameserver.trim().is_empty() {
            env_config.nameserver = Some(nameserver.clone());
            if verbose {
                println!("🔧 Using DV_NAMESERVER={}", nameserver);
            }
        }
    }

    env_config.json = env_bool("DV_JSON", verbose);
    env_config.pretty = env_bool("DV_PRETTY", verbose);
    env_config.streaming = env_bool("DV_STREAMING", verbose);

    // DV_FILE - default domains file
    if let Ok(file_path) = env::var("DV_FILE") {
        if !file_path.trim().is_empty() {
            env_config.file = Some(file_path.clone());
            if verbose {
                println!("🔧 Using DV_FILE={}", file_path);
            }
        }
    }

    // DV_CONFIG - default config file
    if let Ok(config_path) = env::var("DV_CONFIG") {
        if !config_path.trim().is_empty() {
            env_config.config = Some(config_path.clone());
            if verbose {
                println!("🔧 Using DV_CONFIG={}", config_path);
            }
        }
    }

    env_config
}

/// Read a boolean DV_* variable, accepting the usual spellings.
fn env_bool(name: &str, verbose: bool) -> Option<bool> {
    let val = env::var(name).ok()?;
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => {
            if verbose {
                println!("🔧 Using {}=true", name);
            }
            Some(true)
        }
        "false" | "0" | "no" | "off" => {
            if verbose {
                println!("🔧 Using {}=false", name);
            }
            Some(false)
        }
        _ => {
            if verbose {
                eprintln!("⚠️ Invalid {}='{}', use true/false", name, val);
            }
            None
        }
    }
}

/// Read a timeout DV_* variable, keeping only well-formed values.
fn env_timeout(name: &str, verbose: bool) -> Option<String> {
    let val = env::var(name).ok()?;
    if parse_timeout_string(&val).is_some() {
        if verbose {
            println!("🔧 Using {}={}", name, val);
        }
        Some(val)
    } else {
        if verbose {
            eprintln!("⚠️ Invalid {}='{}', use format like '5s', '30s', '2m'", name, val);
        }
        None
    }
}

/// Parse a timeout string like "5s", "30s", "2m" into seconds.
///
/// # Arguments
///
/// * `timeout_str` - String representation of timeout
///
/// # Returns
///
/// Number of seconds, or None if parsing fails.
pub fn parse_timeout_string(timeout_str: &str) -> Option<u64> {
    let timeout_str = timeout_str.trim().to_lowercase();

    if timeout_str.ends_with('s') {
        timeout_str
            .strip_suffix('s')
            .and_then(|s| s.parse::<u64>().ok())
    } else if timeout_str.ends_with('m') {
        timeout_str
            .strip_suffix('m')
            .and_then(|s| s.parse::<u64>().ok())
            .map(|m| m * 60)
    } else {
        // Assume seconds if no unit
        timeout_str.parse::<u64>().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_timeout_string() {
        assert_eq!(parse_timeout_string("5s"), Some(5));
        assert_eq!(parse_timeout_string("30s"), Some(30));
        assert_eq!(parse_timeout_string("2m"), Some(120));
        assert_eq!(parse_timeout_string("5"), Some(5));
        assert_eq!(parse_timeout_string("invalid"), None);
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[defaults]
concurrency = 25
whois_timeout = "8s"
nameserver = "9.9.9.9"

[output]
json = true
streaming = true

[whois]
available_patterns = ["no such domain"]
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(config_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let manager = ConfigManager::new(false);
        let config = manager.load_file(temp_file.path()).unwrap();

        let defaults = config.defaults.unwrap();
        assert_eq!(defaults.concurrency, Some(25));
        assert_eq!(defaults.whois_timeout, Some("8s".to_string()));
        assert_eq!(defaults.nameserver, Some("9.9.9.9".to_string()));

        let output = config.output.unwrap();
        assert_eq!(output.json, Some(true));
        assert_eq!(output.streaming, Some(true));

        let whois = config.whois.unwrap();
        assert_eq!(
            whois.available_patterns,
            Some(vec!["no such domain".to_string()])
        );
    }

    #[test]
    fn test_invalid_concurrency() {
        let config_content = r#"
[defaults]
concurrency = 0
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(config_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let manager = ConfigManager::new(false);
        let result = manager.load_file(temp_file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_timeout_format() {
        let config_content = r#"
[defaults]
dns_timeout = "fast"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(config_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let manager = ConfigManager::new(false);
        let result = manager.load_file(temp_file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_merge_configs() {
        let manager = ConfigManager::new(false);

        let lower = FileConfig {
            defaults: Some(DefaultsConfig {
                concurrency: Some(10),
                whois_timeout: Some("5s".to_string()),
                nameserver: Some("8.8.8.8".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let higher = FileConfig {
            defaults: Some(DefaultsConfig {
                concurrency: Some(25),
                whois_timeout: Some("10s".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let merged = manager.merge_configs(lower, higher);
        let defaults = merged.defaults.unwrap();

        assert_eq!(defaults.concurrency, Some(25)); // Higher wins
        assert_eq!(defaults.whois_timeout, Some("10s".to_string())); // Higher wins
        assert_eq!(defaults.nameserver, Some("8.8.8.8".to_string())); // Lower preserved
    }

    #[test]
    fn test_merge_output_configs() {
        let manager = ConfigManager::new(false);

        let lower = FileConfig {
            output: Some(OutputConfig {
                json: Some(true),
                pretty: Some(false),
                streaming: None,
            }),
            ..Default::default()
        };

        let higher = FileConfig {
            output: Some(OutputConfig {
                json: None,
                pretty: Some(true),
                streaming: Some(true),
            }),
            ..Default::default()
        };

        let merged = manager.merge_configs(lower, higher);
        let output = merged.output.unwrap();

        assert_eq!(output.json, Some(true)); // Lower preserved
        assert_eq!(output.pretty, Some(true)); // Higher wins
        assert_eq!(output.streaming, Some(true)); // Higher wins
    }

    #[test]
    fn test_empty_pattern_rejected() {
        let config_content = r#"
[whois]
available_patterns = ["no such domain", "  "]
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(config_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let manager = ConfigManager::new(false);
        let result = manager.load_file(temp_file.path());
        assert!(result.is_err());
    }
}
