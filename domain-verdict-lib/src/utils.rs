//! Utility functions for domain normalization and validation.
//!
//! This module contains helper functions for domain name validation,
//! input-list parsing, and other common operations used throughout the library.

use crate::error::DomainCheckError;

/// Normalize and validate a domain name.
///
/// Input is trimmed and lowercased, then checked against hostname syntax:
/// non-empty, no whitespace, at least one dot, total length 4-253, labels of
/// 1-63 ASCII alphanumerics/hyphens with no leading or trailing hyphen.
/// Internationalized names must already be punycode-encoded.
///
/// # Arguments
///
/// * `input` - The domain name as supplied by the caller
///
/// # Returns
///
/// The normalized domain on success, `DomainCheckError::InvalidDomain` otherwise.
pub fn normalize_domain(input: &str) -> Result<String, DomainCheckError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(DomainCheckError::invalid_domain(
            trimmed,
            "domain name cannot be empty",
        ));
    }

    if trimmed.chars().any(|c| c.is_whitespace()) {
        return Err(DomainCheckError::invalid_domain(
            trimmed,
            "domain name cannot contain whitespace",
        ));
    }

    let domain = trimmed.to_lowercase();

    if !domain.contains('.') {
        return Err(DomainCheckError::invalid_domain(
            trimmed,
            "domain name must contain at least one dot",
        ));
    }

    if domain.len() < 4 {
        return Err(DomainCheckError::invalid_domain(
            trimmed,
            "domain name too short",
        ));
    }

    if domain.len() > 253 {
        return Err(DomainCheckError::invalid_domain(
            trimmed,
            "domain name exceeds 253 characters",
        ));
    }

    for label in domain.split('.') {
        if label.is_empty() {
            return Err(DomainCheckError::invalid_domain(
                trimmed,
                "domain name contains an empty label",
            ));
        }

        if label.len() > 63 {
            return Err(DomainCheckError::invalid_domain(
                trimmed,
                "domain label exceeds 63 characters",
            ));
        }

        if label.starts_with('-') || label.ends_with('-') {
            return Err(DomainCheckError::invalid_domain(
                trimmed,
                "domain label cannot start or end with a hyphen",
            ));
        }

        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(DomainCheckError::invalid_domain(
                trimmed,
                "domain name contains invalid characters",
            ));
        }
    }

    Ok(domain)
}

/// Parse a newline-separated domain list.
///
/// Blank lines and `#` comment lines are skipped; surrounding whitespace is
/// trimmed. No validation happens here: bad entries flow through so the
/// checker can report them individually.
pub fn parse_domain_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
