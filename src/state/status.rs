use crate::api::types::{DomainBinding, StatsPayload, StatusPayload};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Aggregate view of the remote service. Replaced wholesale on every
/// successful poll, never patched field by field.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Status {
    pub connected: bool,
    /// public port -> local port
    pub tunnels: BTreeMap<u16, u16>,
    pub domains: BTreeMap<String, DomainBinding>,
    pub uptime_seconds: f64,
    pub server_address: String,
    pub stats: TrafficStats,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TrafficStats {
    pub bytes_up: u64,
    pub bytes_down: u64,
    pub latency_ms: i64,
}

impl From<StatsPayload> for TrafficStats {
    fn from(stats: StatsPayload) -> Self {
        Self {
            bytes_up: stats.bytes_up,
            bytes_down: stats.bytes_down,
            latency_ms: stats.latency_ms,
        }
    }
}

impl From<StatusPayload> for Status {
    fn from(payload: StatusPayload) -> Self {
        Self {
            connected: payload.connected,
            tunnels: payload.tunnels,
            domains: payload.domains,
            uptime_seconds: payload.uptime,
            server_address: payload.server_addr,
            stats: payload.stats.map(TrafficStats::from).unwrap_or_default(),
        }
    }
}

impl Status {
    /// Same snapshot, flagged as no longer backed by a live session.
    pub fn disconnected(&self) -> Self {
        Self {
            connected: false,
            ..self.clone()
        }
    }

    pub fn tunnel_ids(&self) -> BTreeSet<u16> {
        self.tunnels.keys().copied().collect()
    }

    pub fn has_tunnel(&self, public_port: u16) -> bool {
        self.tunnels.contains_key(&public_port)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SessionState {
    #[default]
    Unauthenticated,
    Authenticated,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ActiveView {
    #[default]
    Tunnels,
    Domains,
    Inspector,
}

impl ActiveView {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "tunnels" => Some(Self::Tunnels),
            "domains" => Some(Self::Domains),
            "inspector" | "inspect" => Some(Self::Inspector),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disconnected_keeps_tunnels_and_domains() {
        let status = Status {
            connected: true,
            tunnels: [(8080, 3000)].into_iter().collect(),
            domains: [(
                "a.example.com".to_string(),
                DomainBinding {
                    public_port: 8080,
                    mode: Default::default(),
                },
            )]
            .into_iter()
            .collect(),
            ..Default::default()
        };

        let stale = status.disconnected();
        assert!(!stale.connected);
        assert_eq!(stale.tunnels, status.tunnels);
        assert_eq!(stale.domains, status.domains);
    }

    #[test]
    fn test_missing_stats_become_zero() {
        let status = Status::from(StatusPayload {
            connected: true,
            ..Default::default()
        });
        assert_eq!(status.stats, TrafficStats::default());
    }
}
