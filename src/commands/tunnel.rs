// Tunnel management commands

use crate::api::types::{CreateTunnelRequest, DeleteTunnelRequest, EditTunnelRequest};
use crate::api::TunnelApi;
use crate::dashboard::{Dashboard, DashboardError, DashboardResult, DestructiveAction, ToastKind};
use crate::utils::validation::{
    parse_port, parse_port_spec, parse_protocol, require_fields, PortField, ValidationError,
};

/// New tunnel as typed by the operator. Ports may be ranges (`8000-8010`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TunnelForm {
    pub public_port: String,
    pub local_port: String,
    pub protocol: String,
}

impl TunnelForm {
    pub fn new(public_port: impl Into<String>, local_port: impl Into<String>) -> Self {
        Self {
            public_port: public_port.into(),
            local_port: local_port.into(),
            protocol: String::new(),
        }
    }

    pub fn validate(&self) -> Result<CreateTunnelRequest, ValidationError> {
        require_fields(&[&self.public_port, &self.local_port])?;
        let public_port = parse_port_spec(PortField::Public, &self.public_port)?;
        let local_port = parse_port_spec(PortField::Local, &self.local_port)?;
        let protocol = parse_protocol(&self.protocol)?;

        if public_port.is_range()
            && local_port.is_range()
            && public_port.port_count() != local_port.port_count()
        {
            return Err(ValidationError::InvalidRange(format!(
                "{} -> {}",
                public_port, local_port
            )));
        }

        Ok(CreateTunnelRequest {
            public_port: public_port.to_string(),
            local_port: local_port.to_string(),
            protocol,
        })
    }
}

impl<A: TunnelApi> Dashboard<A> {
    pub async fn add_tunnel(&self, form: TunnelForm) -> DashboardResult<()> {
        let result = self.try_add_tunnel(form).await;
        self.settle(result, "Failed to create tunnel").await
    }

    async fn try_add_tunnel(&self, form: TunnelForm) -> DashboardResult<()> {
        let request = form.validate()?;
        log::info!(
            "Command: add tunnel :{} -> {} ({})",
            request.public_port,
            request.local_port,
            request.protocol
        );

        self.api().create_tunnel(&request).await?;
        self.refresh_status().await;
        self.notify("Tunnel initialized successfully", ToastKind::Success)
            .await;
        Ok(())
    }

    /// Point an existing tunnel at a different local port.
    pub async fn edit_tunnel(&self, public_port: u16, local_port: &str) -> DashboardResult<()> {
        let result = self.try_edit_tunnel(public_port, local_port).await;
        self.settle(result, "Failed to update tunnel").await
    }

    async fn try_edit_tunnel(&self, public_port: u16, local_port: &str) -> DashboardResult<()> {
        require_fields(&[local_port])?;
        let local_port = parse_port(PortField::Local, local_port)?;

        let known = self.read(|state| state.status().has_tunnel(public_port)).await;
        if !known {
            return Err(DashboardError::Validation(format!(
                "No tunnel on port :{}",
                public_port
            )));
        }

        log::info!("Command: edit tunnel :{} -> {}", public_port, local_port);
        let request = EditTunnelRequest {
            public_port,
            local_port,
        };
        self.api().edit_tunnel(&request).await?;
        self.refresh_status().await;
        self.notify(
            format!("Tunnel :{} now forwards to {}", public_port, local_port),
            ToastKind::Success,
        )
        .await;
        Ok(())
    }

    pub async fn request_stop_tunnel(&self, public_port: u16) {
        self.mutate(|state| {
            state.request_confirmation(
                "Stop Tunnel?",
                format!(
                    "This will close the tunnel on port :{}. Are you sure?",
                    public_port
                ),
                DestructiveAction::StopTunnel(public_port),
            )
        })
        .await;
    }

    /// Runs after confirmation: one DELETE for one tunnel.
    pub(crate) async fn stop_tunnel(&self, public_port: u16) -> DashboardResult<()> {
        let result = self.try_stop_tunnel(public_port).await;
        self.settle(result, "Failed to close tunnel").await
    }

    async fn try_stop_tunnel(&self, public_port: u16) -> DashboardResult<()> {
        log::info!("Command: stop tunnel :{}", public_port);

        self.api()
            .delete_tunnels(&DeleteTunnelRequest::Single { public_port })
            .await?;
        self.mutate(|state| state.deselect(public_port)).await;
        self.refresh_status().await;
        self.notify(format!("Tunnel :{} closed", public_port), ToastKind::Success)
            .await;
        Ok(())
    }

    pub async fn toggle_select(&self, public_port: u16) -> bool {
        self.mutate(|state| state.toggle_selection(public_port))
            .await
    }

    pub async fn select_all(&self) {
        self.mutate(|state| state.select_all()).await;
    }

    /// Ask to stop every selected tunnel. Nothing is asked when the
    /// selection is empty or a bulk stop is still running.
    pub async fn request_stop_selected(&self) -> DashboardResult<()> {
        let result = self
            .mutate(|state| {
                if state.bulk_progress().is_some() {
                    return Err(DashboardError::BulkAlreadyRunning);
                }

                let ids = state.selection().ids();
                if ids.is_empty() {
                    return Err(DashboardError::Validation("No tunnels selected".to_string()));
                }

                let total = ids.len();
                state.request_confirmation(
                    "Stop Selected Tunnels?",
                    format!(
                        "You are about to stop {} tunnels. This action cannot be undone.",
                        total
                    ),
                    DestructiveAction::StopTunnels(ids),
                );
                Ok(())
            })
            .await;
        self.settle(result, "FAILED TO STOP SOME TUNNELS").await
    }
}
