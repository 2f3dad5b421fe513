use crate::api::types::DeleteTunnelRequest;
use crate::api::{ApiError, TunnelApi};
use crate::dashboard::{Dashboard, DashboardError, DashboardResult, ToastKind};
use serde::Serialize;

/// Progress of the running bulk operation. Exists only while one is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BulkProgress {
    pub completed: usize,
    pub total: usize,
}

impl BulkProgress {
    pub fn new(total: usize) -> Self {
        Self {
            completed: 0,
            total,
        }
    }

    pub fn advance(&mut self, processed: usize) {
        self.completed = (self.completed + processed).min(self.total);
    }

    pub fn percentage(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        ((self.completed * 100) / self.total) as u8
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkOutcome {
    Completed { total: usize },
    /// A chunk failed; chunks before it stay applied.
    Failed { completed: usize, total: usize },
}

/// Split ids into ordered chunks of at most `size` elements.
pub fn plan_chunks(ids: &[u16], size: usize) -> Vec<Vec<u16>> {
    ids.chunks(size.max(1)).map(<[u16]>::to_vec).collect()
}

impl<A: TunnelApi> Dashboard<A> {
    /// Delete `ids` as a sequence of bounded batches. The caller must have
    /// gone through the confirmation gate already.
    pub async fn stop_tunnels(&self, ids: Vec<u16>) -> DashboardResult<BulkOutcome> {
        if ids.is_empty() {
            return Err(DashboardError::Validation("No tunnels selected".to_string()));
        }

        let total = ids.len();
        if !self.mutate(|state| state.begin_bulk(total)).await {
            log::warn!("Refusing to start a second bulk stop of {} tunnels", total);
            return Err(DashboardError::BulkAlreadyRunning);
        }

        let bulk = &self.config.bulk;
        let chunks = plan_chunks(&ids, bulk.chunk_size);
        log::info!("Stopping {} tunnels in {} chunks", total, chunks.len());

        let mut completed = 0;
        let mut failure: Option<ApiError> = None;

        for (index, chunk) in chunks.into_iter().enumerate() {
            let size = chunk.len();
            let request = DeleteTunnelRequest::Batch {
                public_ports: chunk,
            };

            if let Err(e) = self.api.delete_tunnels(&request).await {
                log::error!(
                    "Bulk stop chunk {} failed after {}/{} tunnels: {}",
                    index + 1,
                    completed,
                    total,
                    e
                );
                failure = Some(e);
                break;
            }

            completed += size;
            self.mutate(|state| state.advance_bulk(size)).await;
            tokio::time::sleep(bulk.pacing()).await;
        }

        let outcome = match failure {
            None => BulkOutcome::Completed { total },
            Some(_) => BulkOutcome::Failed { completed, total },
        };
        let unauthorized = matches!(failure, Some(ApiError::Unauthorized));

        let now = self.now();
        self.mutate(|state| {
            state.clear_selection();
            match outcome {
                BulkOutcome::Completed { total } => {
                    state.push_toast(format!("STOPPED {} TUNNELS", total), ToastKind::Success, now);
                }
                // Auth failures go back to login instead of toasting
                BulkOutcome::Failed { .. } if unauthorized => state.mark_unauthenticated(),
                BulkOutcome::Failed { .. } => {
                    state.push_toast("FAILED TO STOP SOME TUNNELS", ToastKind::Error, now);
                }
            }
        })
        .await;

        // A refresh would only answer 401 again
        if !unauthorized {
            self.refresh_status().await;
        }

        tokio::time::sleep(bulk.teardown()).await;
        self.mutate(|state| state.finish_bulk()).await;

        log::info!("Bulk stop finished: {:?}", outcome);
        Ok(outcome)
    }
}
