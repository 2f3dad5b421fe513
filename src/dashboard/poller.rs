use crate::api::{ApiError, TunnelApi};
use crate::dashboard::Dashboard;
use crate::state::{ActiveView, Status};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PollOrigin {
    /// Periodic tick; applied only if the session is still authenticated
    /// when the response settles.
    Tick,
    /// Startup check for an existing session; success logs the user in.
    Probe,
}

impl<A: TunnelApi> Dashboard<A> {
    /// One status request from the periodic timer.
    pub async fn poll_status(&self) {
        self.fetch_status(PollOrigin::Tick).await;
    }

    /// Out-of-band refresh after a mutation; same rules as a tick.
    pub async fn refresh_status(&self) {
        self.fetch_status(PollOrigin::Tick).await;
    }

    /// Ask the service whether the current cookie session is still valid.
    pub async fn check_session(&self) {
        self.fetch_status(PollOrigin::Probe).await;
    }

    async fn fetch_status(&self, origin: PollOrigin) {
        let sequence = self.next_poll_sequence();

        let payload = match self.api.status().await {
            Ok(payload) => payload,
            Err(ApiError::Unauthorized) => {
                self.mutate(|state| state.mark_unauthenticated()).await;
                return;
            }
            Err(e) => {
                // Next tick retries
                log::debug!("Status poll #{} failed: {}", sequence, e);
                return;
            }
        };

        let now = self.now();
        let guard_stale = self.config.discard_stale_polls;
        let status = Status::from(payload);

        let inspecting = self
            .mutate(|state| {
                if origin == PollOrigin::Probe {
                    state.authenticate();
                } else if !state.session().is_authenticated() {
                    log::debug!("Discarding status poll #{} after logout", sequence);
                    return false;
                }

                if guard_stale && !state.accept_poll(sequence) {
                    log::debug!("Discarding stale status poll #{}", sequence);
                    return false;
                }

                state.apply_status(status, now);
                state.view() == ActiveView::Inspector
            })
            .await;

        if inspecting {
            self.refresh_inspector().await;
        }
    }

    pub async fn refresh_inspector(&self) {
        match self.api.inspect().await {
            Ok(entries) => {
                self.mutate(|state| {
                    if state.session().is_authenticated() {
                        state.replace_logs(entries);
                    }
                })
                .await;
            }
            Err(ApiError::Unauthorized) => {
                self.mutate(|state| state.mark_unauthenticated()).await;
            }
            Err(e) => log::debug!("Inspector fetch failed: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::api::fake::{log_entry, status_with_tunnels, ApiCall, FakeApi};
    use crate::api::types::StatsPayload;
    use crate::api::ApiError;
    use crate::config::DashboardConfig;
    use crate::dashboard::test_support::*;
    use crate::dashboard::Dashboard;
    use crate::state::{ActiveView, SessionState};

    #[tokio::test]
    async fn test_session_check_authenticates_and_applies_status() {
        let dashboard = dashboard(FakeApi::with_tunnels(&[8080, 9090]));
        dashboard.check_session().await;

        let snapshot = dashboard.snapshot().await;
        assert_eq!(snapshot.session, SessionState::Authenticated);
        assert!(snapshot.status.connected);
        assert_eq!(snapshot.status.tunnels.len(), 2);
        assert_eq!(snapshot.status.server_address, "203.0.113.7:64290");
    }

    #[tokio::test]
    async fn test_tick_while_logged_out_is_discarded() {
        let dashboard = dashboard(FakeApi::with_tunnels(&[8080]));
        dashboard.poll_status().await;

        let snapshot = dashboard.snapshot().await;
        assert_eq!(snapshot.session, SessionState::Unauthenticated);
        assert!(snapshot.status.tunnels.is_empty());
    }

    #[tokio::test]
    async fn test_unauthorized_poll_keeps_stale_data_flagged_disconnected() {
        let api = FakeApi::with_tunnels(&[8080]);
        let dashboard = synced_dashboard(api).await;
        let domains_before = dashboard.snapshot().await.status.domains;

        dashboard.api().set_status(Err(ApiError::Unauthorized));
        dashboard.poll_status().await;

        let snapshot = dashboard.snapshot().await;
        assert_eq!(snapshot.session, SessionState::Unauthenticated);
        assert!(!snapshot.status.connected);
        assert_eq!(snapshot.status.tunnels.keys().copied().collect::<Vec<_>>(), vec![8080]);
        assert_eq!(snapshot.status.domains, domains_before);

        // The next successful fetch overwrites the stale snapshot
        dashboard.api().set_status(Ok(status_with_tunnels(&[7070])));
        dashboard.check_session().await;
        let snapshot = dashboard.snapshot().await;
        assert!(snapshot.status.connected);
        assert_eq!(snapshot.status.tunnels.keys().copied().collect::<Vec<_>>(), vec![7070]);
    }

    #[tokio::test]
    async fn test_network_failure_is_silent() {
        let dashboard = synced_dashboard(FakeApi::with_tunnels(&[8080])).await;
        let before = dashboard.snapshot().await;

        dashboard
            .api()
            .set_status(Err(ApiError::Network("connection refused".to_string())));
        dashboard.poll_status().await;

        let after = dashboard.snapshot().await;
        assert_eq!(after.status, before.status);
        assert!(after.toasts.is_empty());
        assert_eq!(after.session, SessionState::Authenticated);
    }

    #[tokio::test]
    async fn test_counters_feed_throughput_series() {
        let api = FakeApi::new();
        let mut payload = status_with_tunnels(&[8080]);
        payload.stats = Some(StatsPayload {
            bytes_up: 1_000,
            bytes_down: 2_000,
            latency_ms: 5,
        });
        api.set_status(Ok(payload.clone()));
        let dashboard = synced_dashboard(api).await;

        // stepping clock: one second between readings
        payload.stats = Some(StatsPayload {
            bytes_up: 4_000,
            bytes_down: 2_500,
            latency_ms: 5,
        });
        dashboard.api().set_status(Ok(payload.clone()));
        dashboard.poll_status().await;

        // Remote restart: counters drop
        payload.stats = Some(StatsPayload {
            bytes_up: 10,
            bytes_down: 10,
            latency_ms: 5,
        });
        dashboard.api().set_status(Ok(payload));
        dashboard.poll_status().await;

        let throughput = dashboard.snapshot().await.throughput;
        assert_eq!(throughput.len(), 2);
        assert_eq!(throughput[0].up_bytes_per_sec, 3_000.0);
        assert_eq!(throughput[0].down_bytes_per_sec, 500.0);
        assert_eq!(throughput[1].up_bytes_per_sec, 0.0);
        assert_eq!(throughput[1].down_bytes_per_sec, 0.0);
    }

    #[tokio::test]
    async fn test_inspector_fetch_only_in_inspector_view() {
        let api = FakeApi::with_tunnels(&[8080]);
        api.set_inspect(Ok(vec![log_entry("old", 1), log_entry("new", 2)]));
        let dashboard = synced_dashboard(api).await;

        dashboard.poll_status().await;
        assert_eq!(dashboard.api().count(&ApiCall::Inspect), 0);

        dashboard.mutate(|state| state.set_view(ActiveView::Inspector)).await;
        dashboard.poll_status().await;
        assert_eq!(dashboard.api().count(&ApiCall::Inspect), 1);

        let logs = dashboard.snapshot().await.logs;
        assert_eq!(logs[0].id, "new");
        assert_eq!(logs[1].id, "old");
    }

    #[tokio::test]
    async fn test_stale_guard_discards_older_completion() {
        let mut config = DashboardConfig::default();
        config.discard_stale_polls = true;
        let dashboard = Dashboard::new(FakeApi::with_tunnels(&[1]), config, stepping_clock());
        dashboard.check_session().await;

        // Poll #5 already applied; a late #3 must not overwrite it
        dashboard.mutate(|state| state.accept_poll(5)).await;
        dashboard.api().set_status(Ok(status_with_tunnels(&[2])));
        dashboard.poll_status().await; // sequence 2 < 5
        assert_eq!(
            dashboard.snapshot().await.status.tunnels.keys().copied().collect::<Vec<_>>(),
            vec![1]
        );
    }

    #[tokio::test]
    async fn test_without_guard_last_settled_wins() {
        let dashboard = synced_dashboard(FakeApi::with_tunnels(&[1])).await;
        dashboard.mutate(|state| state.accept_poll(99)).await;

        dashboard.api().set_status(Ok(status_with_tunnels(&[2])));
        dashboard.poll_status().await;
        assert_eq!(
            dashboard.snapshot().await.status.tunnels.keys().copied().collect::<Vec<_>>(),
            vec![2]
        );
    }
}
