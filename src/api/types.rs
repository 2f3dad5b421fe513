use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// Request/Response types for the tunnel service API

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub password: String,
}

/// Transport protocol of a port-forwarding tunnel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TunnelProtocol {
    #[default]
    Tcp,
    Udp,
}

impl TunnelProtocol {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "tcp" => Some(Self::Tcp),
            "udp" => Some(Self::Udp),
            _ => None,
        }
    }
}

impl fmt::Display for TunnelProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp => write!(f, "TCP"),
            Self::Udp => write!(f, "UDP"),
        }
    }
}

// Ports travel as strings so a range like "8000-8010" can be requested
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateTunnelRequest {
    pub public_port: String,
    pub local_port: String,
    pub protocol: TunnelProtocol,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditTunnelRequest {
    pub public_port: u16,
    pub local_port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DeleteTunnelRequest {
    Single { public_port: u16 },
    Batch { public_ports: Vec<u16> },
}

impl DeleteTunnelRequest {
    pub fn len(&self) -> usize {
        match self {
            Self::Single { .. } => 1,
            Self::Batch { public_ports } => public_ports.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// TLS handling for a domain mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainMode {
    #[default]
    Auto,
    Http,
    Https,
}

impl DomainMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "http" => Some(Self::Http),
            "https" => Some(Self::Https),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Auto => "AUTO",
            Self::Http => "HTTP",
            Self::Https => "HTTPS",
        }
    }
}

/// A hostname mapped onto a tunnel's public port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WireDomainBinding")]
pub struct DomainBinding {
    pub public_port: u16,
    pub mode: DomainMode,
}

// Older services report a bare port number, newer ones a record
#[derive(Deserialize)]
#[serde(untagged)]
enum WireDomainBinding {
    Port(u16),
    Entry {
        public_port: u16,
        #[serde(default)]
        mode: Option<String>,
    },
}

impl From<WireDomainBinding> for DomainBinding {
    fn from(wire: WireDomainBinding) -> Self {
        match wire {
            WireDomainBinding::Port(public_port) => Self {
                public_port,
                mode: DomainMode::Auto,
            },
            WireDomainBinding::Entry { public_port, mode } => Self {
                public_port,
                mode: mode
                    .as_deref()
                    .and_then(DomainMode::parse)
                    .unwrap_or_default(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateDomainRequest {
    pub domain: String,
    pub public_port: u16,
    pub mode: DomainMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_pass: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<u32>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub smart_shield: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteDomainRequest {
    pub domain: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsPayload {
    #[serde(default)]
    pub bytes_up: u64,
    #[serde(default)]
    pub bytes_down: u64,
    #[serde(default)]
    pub latency_ms: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StatusPayload {
    #[serde(default)]
    pub connected: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tunnels: BTreeMap<u16, u16>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub domains: BTreeMap<String, DomainBinding>,
    #[serde(default)]
    pub uptime: f64,
    #[serde(default)]
    pub server_addr: String,
    #[serde(default)]
    pub stats: Option<StatsPayload>,
}

/// One captured request/response pair from the traffic inspector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectLogEntry {
    pub id: String,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub status: u16,
    #[serde(default)]
    pub duration_ms: i64,
    #[serde(default)]
    pub client_ip: String,
    #[serde(default)]
    pub public_port: u16,
    #[serde(default, deserialize_with = "null_as_default")]
    pub req_headers: BTreeMap<String, String>,
    #[serde(default)]
    pub req_body: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub res_headers: BTreeMap<String, String>,
    #[serde(default)]
    pub res_body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayRequest {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReplayResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub status_code: u16,
    #[serde(default)]
    pub replayed_to: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
