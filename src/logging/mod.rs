// Logger setup and the audit trail for confirmed destructive actions

use serde::Serialize;

pub const DEFAULT_FILTER: &str = "tunnelcow_dashboard=info";
pub const AUDIT_TARGET: &str = "tunnelcow_dashboard::audit";

/// Install the env_logger sink. `RUST_LOG` overrides the default filter.
/// Calling this twice is harmless.
pub fn init() {
    let result = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(DEFAULT_FILTER),
    )
    .format_timestamp_millis()
    .try_init();

    if result.is_ok() {
        log::info!(
            "tunnelcow-dashboard v{} starting (RUST_LOG={})",
            env!("CARGO_PKG_VERSION"),
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("<default: {}>", DEFAULT_FILTER)),
        );
    }
}

/// One confirmed destructive action and how it ended
#[derive(Debug, Serialize)]
pub struct AuditEvent {
    pub action: &'static str,
    pub target: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuditEvent {
    pub fn new(action: &'static str, target: impl Into<String>) -> Self {
        Self {
            action,
            target: target.into(),
            success: true,
            error: None,
        }
    }

    pub fn failed(mut self, error: impl ToString) -> Self {
        self.success = false;
        self.error = Some(error.to_string());
        self
    }

    pub fn to_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{:?}", self))
    }
}

/// Write the event as one JSON line under the audit target.
pub fn audit(event: &AuditEvent) {
    if event.success {
        log::info!(target: AUDIT_TARGET, "{}", event.to_line());
    } else {
        log::error!(target: AUDIT_TARGET, "{}", event.to_line());
    }
}
