use crate::api::types::InspectLogEntry;
use crate::config::DashboardConfig;
use crate::dashboard::bulk::BulkProgress;
use crate::dashboard::confirm::{ConfirmationGate, ConfirmationPrompt, DestructiveAction};
use crate::dashboard::inspector::{InspectorLogStore, LogDetail};
use crate::dashboard::rate::{RateSample, RateSampler};
use crate::dashboard::selection::SelectionModel;
use crate::dashboard::toasts::{NotificationQueue, Toast, ToastKind};
use crate::state::status::{ActiveView, SessionState, Status};
use serde::Serialize;

// Application state owned by the dashboard event loop.
// The methods below are the only way to change it.
pub struct AppState {
    session: SessionState,
    view: ActiveView,
    status: Status,
    traffic: RateSampler,
    toasts: NotificationQueue,
    selection: SelectionModel,
    confirmation: ConfirmationGate<DestructiveAction>,
    bulk: Option<BulkProgress>,
    inspector: InspectorLogStore,
    last_applied_poll: u64,
    body_preview_chars: usize,
}

/// Immutable copy of everything a renderer draws.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub session: SessionState,
    pub view: ActiveView,
    pub status: Status,
    pub throughput: Vec<RateSample>,
    pub toasts: Vec<Toast>,
    pub selection: Vec<u16>,
    pub confirmation: Option<ConfirmationPrompt>,
    pub bulk: Option<BulkProgress>,
    pub logs: Vec<InspectLogEntry>,
    pub selected_log: Option<LogDetail>,
}

impl AppState {
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            session: SessionState::Unauthenticated,
            view: ActiveView::Tunnels,
            status: Status::default(),
            traffic: RateSampler::new(config.sample_capacity),
            toasts: NotificationQueue::new(config.toast_timings()),
            selection: SelectionModel::new(),
            confirmation: ConfirmationGate::new(),
            bulk: None,
            inspector: InspectorLogStore::new(),
            last_applied_poll: 0,
            body_preview_chars: config.inspector.body_preview_chars,
        }
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    pub fn view(&self) -> ActiveView {
        self.view
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn toasts(&self) -> &NotificationQueue {
        &self.toasts
    }

    pub fn selection(&self) -> &SelectionModel {
        &self.selection
    }

    pub fn bulk_progress(&self) -> Option<BulkProgress> {
        self.bulk
    }

    pub fn inspector(&self) -> &InspectorLogStore {
        &self.inspector
    }

    // Session

    pub fn authenticate(&mut self) {
        if !self.session.is_authenticated() {
            log::info!("[session] authenticated");
        }
        self.session = SessionState::Authenticated;
    }

    /// A 401 keeps the last snapshot on screen, flagged disconnected.
    pub fn mark_unauthenticated(&mut self) {
        if self.session.is_authenticated() {
            log::warn!("[session] service answered 401, returning to login");
        }
        self.session = SessionState::Unauthenticated;
        self.status = self.status.disconnected();
    }

    /// Explicit logout drops the snapshot entirely.
    pub fn reset_after_logout(&mut self) {
        self.session = SessionState::Unauthenticated;
        self.status = Status::default();
        self.selection.clear();
        self.confirmation.cancel();
    }

    // Status

    pub fn apply_status(&mut self, status: Status, now: i64) {
        self.traffic
            .observe(status.stats.bytes_up, status.stats.bytes_down, now);
        self.selection.retain_known(&status.tunnel_ids());
        self.status = status;
    }

    /// Sequence guard for overlapping polls: only strictly newer polls apply.
    pub fn accept_poll(&mut self, sequence: u64) -> bool {
        if sequence <= self.last_applied_poll {
            return false;
        }
        self.last_applied_poll = sequence;
        true
    }

    pub fn set_view(&mut self, view: ActiveView) {
        self.view = view;
    }

    // Notifications

    pub fn push_toast(&mut self, message: impl Into<String>, kind: ToastKind, now: i64) -> i64 {
        self.toasts.push(message, kind, now)
    }

    pub fn dismiss_toast(&mut self, id: i64, now: i64) -> bool {
        self.toasts.dismiss(id, now)
    }

    pub fn sweep_toasts(&mut self, now: i64) -> bool {
        self.toasts.tick(now)
    }

    // Selection

    pub fn toggle_selection(&mut self, id: u16) -> bool {
        if !self.status.has_tunnel(id) && !self.selection.contains(id) {
            return false;
        }
        self.selection.toggle(id)
    }

    pub fn select_all(&mut self) {
        let known = self.status.tunnel_ids();
        self.selection.select_all(&known);
    }

    pub fn deselect(&mut self, id: u16) -> bool {
        self.selection.remove(id)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // Confirmation

    pub fn request_confirmation(
        &mut self,
        title: impl Into<String>,
        message: impl Into<String>,
        action: DestructiveAction,
    ) -> Option<DestructiveAction> {
        let discarded = self.confirmation.request(title, message, action);
        if let Some(previous) = &discarded {
            log::debug!("[confirm] discarded pending {:?}", previous);
        }
        discarded
    }

    pub fn take_confirmation(&mut self) -> Option<DestructiveAction> {
        self.confirmation.confirm()
    }

    pub fn cancel_confirmation(&mut self) -> bool {
        self.confirmation.cancel()
    }

    // Bulk progress

    pub fn begin_bulk(&mut self, total: usize) -> bool {
        if self.bulk.is_some() {
            return false;
        }
        self.bulk = Some(BulkProgress::new(total));
        true
    }

    pub fn advance_bulk(&mut self, processed: usize) {
        if let Some(progress) = self.bulk.as_mut() {
            progress.advance(processed);
        }
    }

    pub fn finish_bulk(&mut self) {
        self.bulk = None;
    }

    // Inspector

    pub fn replace_logs(&mut self, entries: Vec<InspectLogEntry>) {
        self.inspector.replace_oldest_first(entries);
    }

    pub fn select_log(&mut self, id: impl Into<String>) {
        self.inspector.select(id);
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            session: self.session,
            view: self.view,
            status: self.status.clone(),
            throughput: self.traffic.samples().copied().collect(),
            toasts: self.toasts.toasts().to_vec(),
            selection: self.selection.ids(),
            confirmation: self.confirmation.prompt(),
            bulk: self.bulk,
            logs: self.inspector.entries().to_vec(),
            selected_log: self.inspector.selected_detail(self.body_preview_chars),
        }
    }
}
