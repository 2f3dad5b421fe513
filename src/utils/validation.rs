use crate::api::types::{DomainMode, TunnelProtocol};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static PORT_RANGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,5})-(\d{1,5})$").expect("valid port range pattern"));

static DOMAIN_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\*\.)?([A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z]{2,63}$")
        .expect("valid domain pattern")
});

// Client-side input errors, rejected before any network call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please fill in all fields")]
    MissingFields,

    #[error("{0} port must be 1-65535")]
    PortOutOfRange(PortField),

    #[error("Invalid port range: {0}")]
    InvalidRange(String),

    #[error("Protocol must be TCP or UDP")]
    InvalidProtocol,

    #[error("Mode must be auto, http or https")]
    InvalidMode,

    #[error("Invalid domain: {0}")]
    InvalidDomain(String),

    #[error("Rate limit must be a positive number")]
    InvalidRateLimit,

    #[error("Password is required")]
    EmptyPassword,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortField {
    Public,
    Local,
    Target,
}

impl fmt::Display for PortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PortField::Public => "Public",
            PortField::Local => "Local",
            PortField::Target => "Target",
        };
        f.write_str(label)
    }
}

/// A port field as typed by the operator: one port or an inclusive range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortSpec {
    Single(u16),
    Range { start: u16, end: u16 },
}

impl PortSpec {
    pub fn port_count(&self) -> usize {
        match self {
            PortSpec::Single(_) => 1,
            PortSpec::Range { start, end } => usize::from(end - start) + 1,
        }
    }

    pub fn is_range(&self) -> bool {
        matches!(self, PortSpec::Range { .. })
    }
}

impl fmt::Display for PortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortSpec::Single(port) => write!(f, "{}", port),
            PortSpec::Range { start, end } => write!(f, "{}-{}", start, end),
        }
    }
}

// Every field must hold something other than whitespace
pub fn require_fields(fields: &[&str]) -> Result<(), ValidationError> {
    if fields.iter().any(|field| field.trim().is_empty()) {
        return Err(ValidationError::MissingFields);
    }
    Ok(())
}

pub fn parse_port(field: PortField, raw: &str) -> Result<u16, ValidationError> {
    match raw.trim().parse::<u32>() {
        Ok(port) if (1..=65535).contains(&port) => Ok(port as u16),
        _ => Err(ValidationError::PortOutOfRange(field)),
    }
}

// Accepts "8080" or "8000-8010"
pub fn parse_port_spec(field: PortField, raw: &str) -> Result<PortSpec, ValidationError> {
    let raw = raw.trim();
    if !raw.contains('-') {
        return parse_port(field, raw).map(PortSpec::Single);
    }

    let invalid = || ValidationError::InvalidRange(raw.to_string());
    let captures = PORT_RANGE.captures(raw).ok_or_else(invalid)?;
    let start = parse_port(field, &captures[1])?;
    let end = parse_port(field, &captures[2])?;
    if start > end {
        return Err(invalid());
    }

    Ok(PortSpec::Range { start, end })
}

pub fn parse_protocol(raw: &str) -> Result<TunnelProtocol, ValidationError> {
    if raw.trim().is_empty() {
        return Ok(TunnelProtocol::Tcp);
    }
    TunnelProtocol::parse(raw).ok_or(ValidationError::InvalidProtocol)
}

pub fn parse_mode(raw: &str) -> Result<DomainMode, ValidationError> {
    if raw.trim().is_empty() {
        return Ok(DomainMode::Auto);
    }
    DomainMode::parse(raw).ok_or(ValidationError::InvalidMode)
}

pub fn validate_domain_name(raw: &str) -> Result<String, ValidationError> {
    let domain = raw.trim().to_lowercase();
    if domain.len() > 253 || !DOMAIN_NAME.is_match(&domain) {
        return Err(ValidationError::InvalidDomain(raw.trim().to_string()));
    }
    Ok(domain)
}

pub fn parse_rate_limit(raw: Option<&str>) -> Result<Option<u32>, ValidationError> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        None => Ok(None),
        Some(value) => match value.parse::<u32>() {
            Ok(limit) if limit > 0 => Ok(Some(limit)),
            _ => Err(ValidationError::InvalidRateLimit),
        },
    }
}
