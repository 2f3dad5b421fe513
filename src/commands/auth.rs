use crate::api::{ApiError, TunnelApi};
use crate::dashboard::{Dashboard, DashboardError, DashboardResult, ToastKind};
use crate::utils::validation::{require_fields, ValidationError};

impl<A: TunnelApi> Dashboard<A> {
    pub async fn login(&self, password: &str) -> DashboardResult<()> {
        log::info!("Command: login");

        if require_fields(&[password]).is_err() {
            let error = DashboardError::from(ValidationError::EmptyPassword);
            self.report(&error, "Login Failed").await;
            return Err(error);
        }

        match self.api().login(password).await {
            Ok(()) => {
                self.mutate(|state| state.authenticate()).await;
                self.refresh_status().await;
                Ok(())
            }
            Err(e @ (ApiError::Unauthorized | ApiError::Server { .. })) => {
                log::warn!("Login rejected: {}", e);
                self.notify("Invalid Password", ToastKind::Error).await;
                Err(e.into())
            }
            Err(e) => {
                log::error!("Login failed: {}", e);
                self.notify("Login Failed", ToastKind::Error).await;
                Err(e.into())
            }
        }
    }

    /// End the session. Service errors are ignored; the local state is
    /// cleared either way.
    pub async fn logout(&self) {
        log::info!("Command: logout");

        if let Err(e) = self.api().logout().await {
            log::debug!("Logout request failed: {}", e);
        }
        self.mutate(|state| state.reset_after_logout()).await;
    }
}

#[cfg(test)]
mod tests {
    use crate::api::fake::{ApiCall, FakeApi};
    use crate::api::ApiError;
    use crate::dashboard::test_support::*;
    use crate::dashboard::DashboardError;
    use crate::state::SessionState;

    #[tokio::test]
    async fn test_login_authenticates_and_fetches_status() {
        let dashboard = dashboard(FakeApi::with_tunnels(&[8080]));

        dashboard.login("hunter2").await.unwrap();

        let snapshot = dashboard.snapshot().await;
        assert_eq!(snapshot.session, SessionState::Authenticated);
        assert_eq!(snapshot.status.tunnels.len(), 1);
        assert!(snapshot.toasts.is_empty());
    }

    #[tokio::test]
    async fn test_wrong_password_shows_invalid_password() {
        let dashboard = dashboard(FakeApi::new());

        let result = dashboard.login("letmein").await;
        assert_eq!(result, Err(DashboardError::Api(ApiError::Unauthorized)));

        let snapshot = dashboard.snapshot().await;
        assert_eq!(snapshot.session, SessionState::Unauthenticated);
        assert_eq!(snapshot.toasts[0].message, "Invalid Password");
    }

    #[tokio::test]
    async fn test_empty_password_never_reaches_service() {
        let dashboard = dashboard(FakeApi::new());

        assert!(dashboard.login("   ").await.is_err());
        assert!(dashboard.api().calls().is_empty());
        assert_eq!(dashboard.snapshot().await.toasts[0].message, "Password is required");
    }

    #[tokio::test]
    async fn test_logout_clears_snapshot_and_selection() {
        let dashboard = synced_dashboard(FakeApi::with_tunnels(&[8080, 9090])).await;
        dashboard.mutate(|state| state.select_all()).await;

        dashboard.logout().await;

        let snapshot = dashboard.snapshot().await;
        assert_eq!(dashboard.api().count(&ApiCall::Logout), 1);
        assert_eq!(snapshot.session, SessionState::Unauthenticated);
        assert!(snapshot.status.tunnels.is_empty());
        assert!(!snapshot.status.connected);
        assert!(snapshot.selection.is_empty());
    }

    #[tokio::test]
    async fn test_poll_completing_after_logout_is_discarded() {
        let dashboard = synced_dashboard(FakeApi::with_tunnels(&[8080])).await;
        dashboard.logout().await;

        dashboard.poll_status().await;
        assert!(dashboard.snapshot().await.status.tunnels.is_empty());
    }
}
