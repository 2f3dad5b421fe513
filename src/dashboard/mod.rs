// Client-side synchronization and orchestration core.
// One `Dashboard` owns the application state; every component below is a
// plain data structure it mutates from a single event loop.

pub mod bulk;
pub mod confirm;
pub mod inspector;
pub mod poller;
pub mod rate;
pub mod selection;
pub mod toasts;

pub use bulk::{BulkOutcome, BulkProgress};
pub use confirm::{ConfirmationGate, DestructiveAction};
pub use inspector::InspectorLogStore;
pub use rate::{RateSample, RateSampler};
pub use selection::SelectionModel;
pub use toasts::{NotificationQueue, Toast, ToastKind};

use crate::api::{ApiError, TunnelApi};
use crate::commands::Command;
use crate::config::DashboardConfig;
use crate::state::{AppState, Clock, DashboardSnapshot};
use crate::utils::validation::ValidationError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::time::{interval, MissedTickBehavior};

// Error types for dashboard operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DashboardError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("{0}")]
    Validation(String),

    #[error("A bulk operation is already running")]
    BulkAlreadyRunning,

    #[error("Stopped {completed} of {total} tunnels")]
    PartialFailure { completed: usize, total: usize },
}

impl From<ValidationError> for DashboardError {
    fn from(error: ValidationError) -> Self {
        DashboardError::Validation(error.to_string())
    }
}

// Result type for dashboard operations
pub type DashboardResult<T> = Result<T, DashboardError>;

pub struct Dashboard<A> {
    api: Arc<A>,
    state: Arc<Mutex<AppState>>,
    config: Arc<DashboardConfig>,
    clock: Arc<dyn Clock>,
    snapshots: Arc<watch::Sender<DashboardSnapshot>>,
    poll_sequence: Arc<AtomicU64>,
}

impl<A> Clone for Dashboard<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            state: Arc::clone(&self.state),
            config: Arc::clone(&self.config),
            clock: Arc::clone(&self.clock),
            snapshots: Arc::clone(&self.snapshots),
            poll_sequence: Arc::clone(&self.poll_sequence),
        }
    }
}

impl<A: TunnelApi> Dashboard<A> {
    pub fn new(api: A, config: DashboardConfig, clock: Arc<dyn Clock>) -> Self {
        let state = AppState::new(&config);
        let (snapshots, _) = watch::channel(state.snapshot());

        Self {
            api: Arc::new(api),
            state: Arc::new(Mutex::new(state)),
            config: Arc::new(config),
            clock,
            snapshots: Arc::new(snapshots),
            poll_sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Receive a fresh snapshot after every state change.
    pub fn subscribe(&self) -> watch::Receiver<DashboardSnapshot> {
        self.snapshots.subscribe()
    }

    pub async fn snapshot(&self) -> DashboardSnapshot {
        self.state.lock().await.snapshot()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.lock().await.session().is_authenticated()
    }

    pub(crate) fn now(&self) -> i64 {
        self.clock.now_millis()
    }

    pub(crate) fn next_poll_sequence(&self) -> u64 {
        self.poll_sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Apply one change to the state and publish the result. The lock is
    /// never held across a network call.
    pub(crate) async fn mutate<R>(&self, change: impl FnOnce(&mut AppState) -> R) -> R {
        let mut state = self.state.lock().await;
        let result = change(&mut *state);
        self.snapshots.send_replace(state.snapshot());
        result
    }

    pub(crate) async fn read<R>(&self, query: impl FnOnce(&AppState) -> R) -> R {
        let state = self.state.lock().await;
        query(&*state)
    }

    pub(crate) async fn notify(&self, message: impl Into<String>, kind: ToastKind) -> i64 {
        let now = self.now();
        self.mutate(|state| state.push_toast(message, kind, now)).await
    }

    /// Turn a failed action into what the operator sees. Auth failures send
    /// the session back to login instead of raising a toast.
    pub(crate) async fn report(&self, error: &DashboardError, fallback: &str) {
        match error {
            DashboardError::Api(ApiError::Unauthorized) => {
                self.mutate(|state| state.mark_unauthenticated()).await;
            }
            DashboardError::Api(ApiError::Server { message, .. }) if !message.trim().is_empty() => {
                self.notify(message.clone(), ToastKind::Error).await;
            }
            DashboardError::Api(_) => {
                log::error!("{}: {}", fallback, error);
                self.notify(fallback, ToastKind::Error).await;
            }
            DashboardError::Validation(_) | DashboardError::BulkAlreadyRunning => {
                self.notify(error.to_string(), ToastKind::Error).await;
            }
            // The orchestrator already raised its single aggregate toast
            DashboardError::PartialFailure { .. } => {}
        }
    }

    /// Report the error, if any, and hand the result back to the caller.
    pub(crate) async fn settle<T>(&self, result: DashboardResult<T>, fallback: &str) -> DashboardResult<T> {
        if let Err(e) = &result {
            self.report(e, fallback).await;
        }
        result
    }

    /// Expire toasts against the clock. `run` calls this once per sweep
    /// interval, so a toast can outlive its exit animation by up to one
    /// interval.
    pub async fn sweep_toasts(&self) {
        let now = self.now();
        let mut state = self.state.lock().await;
        if state.sweep_toasts(now) {
            self.snapshots.send_replace(state.snapshot());
        }
    }

    /// Drive the dashboard until the command channel closes or `Quit`
    /// arrives. Polls are spawned so a slow response never delays the next
    /// tick; outstanding requests are left to finish on their own.
    pub async fn run(self, mut commands: mpsc::UnboundedReceiver<Command>) {
        let mut poll_timer = interval(self.config.poll_interval());
        poll_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut sweep_timer = interval(self.config.sweep_interval());
        sweep_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        log::info!(
            "Dashboard loop started (poll every {}ms)",
            self.config.poll_interval_ms
        );

        loop {
            tokio::select! {
                _ = poll_timer.tick() => {
                    if self.is_authenticated().await {
                        let this = self.clone();
                        tokio::spawn(async move { this.poll_status().await });
                    }
                }
                _ = sweep_timer.tick() => {
                    self.sweep_toasts().await;
                }
                command = commands.recv() => match command {
                    None | Some(Command::Quit) => break,
                    Some(command) => self.dispatch(command).await,
                },
            }
        }

        log::info!("Dashboard loop stopped");
    }
}
