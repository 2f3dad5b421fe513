// Operator actions. Each one validates its input, talks to the service
// and turns failures into toasts; the returned result is for callers that
// want to inspect the outcome.

pub mod auth;
pub mod domain;
pub mod inspector;
pub mod tunnel;

pub use domain::DomainForm;
pub use tunnel::TunnelForm;

use crate::api::TunnelApi;
use crate::dashboard::{BulkOutcome, Dashboard, DashboardError, DashboardResult, DestructiveAction};
use crate::logging::{audit, AuditEvent};
use crate::state::ActiveView;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Login { password: String },
    Logout,
    Refresh,
    AddTunnel(TunnelForm),
    EditTunnel { public_port: u16, local_port: String },
    RequestStopTunnel(u16),
    ToggleSelect(u16),
    SelectAll,
    RequestStopSelected,
    AddDomain(DomainForm),
    RequestUnmapDomain(String),
    Confirm,
    Cancel,
    SwitchView(ActiveView),
    SelectLog(String),
    Replay(String),
    DismissToast(i64),
    Quit,
}

impl<A: TunnelApi> Dashboard<A> {
    /// Run one operator command. State-only commands complete before this
    /// returns; anything that waits on the network is spawned so the event
    /// loop keeps ticking.
    pub async fn dispatch(&self, command: Command) {
        log::debug!("Dispatching {:?}", command);

        match command {
            Command::ToggleSelect(port) => {
                self.toggle_select(port).await;
            }
            Command::SelectAll => self.select_all().await,
            Command::RequestStopTunnel(port) => self.request_stop_tunnel(port).await,
            Command::RequestStopSelected => {
                let _ = self.request_stop_selected().await;
            }
            Command::RequestUnmapDomain(domain) => self.request_unmap_domain(domain).await,
            Command::Cancel => {
                self.cancel().await;
            }
            Command::SelectLog(id) => self.select_log(id).await,
            Command::DismissToast(id) => {
                self.dismiss_toast(id).await;
            }
            Command::Confirm => {
                // Taken now so a later request cannot swap the action
                // while this one is still running.
                if let Some(action) = self.take_confirmation().await {
                    let this = self.clone();
                    tokio::spawn(async move {
                        let _ = this.execute(action).await;
                    });
                }
            }
            Command::SwitchView(view) => {
                if self.switch_view(view).await {
                    let this = self.clone();
                    tokio::spawn(async move { this.refresh_inspector().await });
                }
            }
            Command::Quit => {}
            command => {
                let this = self.clone();
                tokio::spawn(async move { this.run_network_command(command).await });
            }
        }
    }

    async fn run_network_command(&self, command: Command) {
        let _ = match command {
            Command::Login { password } => self.login(&password).await,
            Command::Logout => {
                self.logout().await;
                Ok(())
            }
            Command::Refresh => {
                self.refresh_status().await;
                Ok(())
            }
            Command::AddTunnel(form) => self.add_tunnel(form).await,
            Command::EditTunnel {
                public_port,
                local_port,
            } => self.edit_tunnel(public_port, &local_port).await,
            Command::AddDomain(form) => self.add_domain(form).await,
            Command::Replay(id) => self.replay(&id).await,
            other => {
                log::warn!("Command {:?} is not a network command", other);
                Ok(())
            }
        };
    }

    pub(crate) async fn take_confirmation(&self) -> Option<DestructiveAction> {
        self.mutate(|state| state.take_confirmation()).await
    }

    /// Run the pending action, if any, exactly once.
    pub async fn confirm(&self) -> Option<DashboardResult<()>> {
        let action = self.take_confirmation().await?;
        Some(self.execute(action).await)
    }

    pub async fn cancel(&self) -> bool {
        self.mutate(|state| state.cancel_confirmation()).await
    }

    pub async fn execute(&self, action: DestructiveAction) -> DashboardResult<()> {
        log::info!("Executing confirmed {:?}", action);
        let (event, result) = match action {
            DestructiveAction::StopTunnel(port) => (
                AuditEvent::new("stop_tunnel", format!(":{}", port)),
                self.stop_tunnel(port).await,
            ),
            DestructiveAction::StopTunnels(ids) => {
                let event = AuditEvent::new("stop_tunnels", format!("{} tunnels", ids.len()));
                let result = match self.stop_tunnels(ids).await {
                    Ok(BulkOutcome::Completed { .. }) => Ok(()),
                    Ok(BulkOutcome::Failed { completed, total }) => {
                        Err(DashboardError::PartialFailure { completed, total })
                    }
                    Err(e) => {
                        self.report(&e, "FAILED TO STOP SOME TUNNELS").await;
                        Err(e)
                    }
                };
                (event, result)
            }
            DestructiveAction::UnmapDomain(domain) => {
                let event = AuditEvent::new("unmap_domain", domain.as_str());
                (event, self.unmap_domain(&domain).await)
            }
        };

        match &result {
            Ok(()) => audit(&event),
            Err(e) => audit(&event.failed(e)),
        }
        result
    }

    pub async fn dismiss_toast(&self, id: i64) -> bool {
        let now = self.now();
        self.mutate(|state| state.dismiss_toast(id, now)).await
    }
}
