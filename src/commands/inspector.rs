use crate::api::TunnelApi;
use crate::dashboard::{Dashboard, DashboardError, DashboardResult, ToastKind};
use crate::state::ActiveView;

impl<A: TunnelApi> Dashboard<A> {
    /// Change the active view. Returns true when the caller should fetch
    /// the inspector log right away.
    pub async fn switch_view(&self, view: ActiveView) -> bool {
        self.mutate(|state| {
            let entering_inspector = view == ActiveView::Inspector && state.view() != view;
            state.set_view(view);
            entering_inspector && state.session().is_authenticated()
        })
        .await
    }

    pub async fn select_log(&self, id: String) {
        self.mutate(|state| state.select_log(id)).await;
    }

    /// Re-send a captured request to the local service.
    pub async fn replay(&self, id: &str) -> DashboardResult<()> {
        let result = self.try_replay(id).await;
        self.settle(result, "Replay failed").await
    }

    async fn try_replay(&self, id: &str) -> DashboardResult<()> {
        let known = self.read(|state| state.inspector().get(id).is_some()).await;
        if !known {
            return Err(DashboardError::Validation(format!("Unknown request {}", id)));
        }

        log::info!("Command: replay {}", id);
        let response = self.api().replay(id).await?;

        let kind = if response.status_code < 400 {
            ToastKind::Success
        } else {
            ToastKind::Error
        };
        self.notify(
            format!("Replayed to {}: {}", response.replayed_to, response.status),
            kind,
        )
        .await;
        Ok(())
    }
}
