use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Error,
    Success,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "lowercase")]
pub enum ToastPhase {
    /// Created but not yet mounted; cannot be dismissed.
    Entering,
    Visible,
    /// Hidden and waiting out the exit transition before removal.
    Exiting { since: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub id: i64,
    pub message: String,
    pub kind: ToastKind,
    pub created_at: i64,
    pub phase: ToastPhase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToastTimings {
    pub enter_ms: i64,
    pub lifetime_ms: i64,
    pub exit_ms: i64,
}

impl Default for ToastTimings {
    fn default() -> Self {
        Self {
            enter_ms: 10,
            lifetime_ms: 5_000,
            exit_ms: 400,
        }
    }
}

/// Ordered, self-expiring user notifications. Time only moves when the
/// owner calls `tick`, so every transition is driven by the event loop.
#[derive(Debug, Clone, Default)]
pub struct NotificationQueue {
    toasts: Vec<Toast>,
    timings: ToastTimings,
    last_id: i64,
}

impl NotificationQueue {
    pub fn new(timings: ToastTimings) -> Self {
        Self {
            toasts: Vec::new(),
            timings,
            last_id: 0,
        }
    }

    /// Append a toast created at `now`. Its id is the creation time, bumped
    /// forward when two toasts land in the same millisecond.
    pub fn push(&mut self, message: impl Into<String>, kind: ToastKind, now: i64) -> i64 {
        let id = now.max(self.last_id + 1);
        self.last_id = id;

        let message = message.into();
        match kind {
            ToastKind::Error => log::warn!("[toast] {}", message),
            ToastKind::Success => log::info!("[toast] {}", message),
        }

        self.toasts.push(Toast {
            id,
            message,
            kind,
            created_at: now,
            phase: ToastPhase::Entering,
        });
        id
    }

    /// Start the exit transition early. Ignored for toasts that have not
    /// finished mounting or are already leaving.
    pub fn dismiss(&mut self, id: i64, now: i64) -> bool {
        self.advance(now);

        let Some(toast) = self.toasts.iter_mut().find(|toast| toast.id == id) else {
            return false;
        };

        match toast.phase {
            ToastPhase::Visible => {
                toast.phase = ToastPhase::Exiting { since: now };
                true
            }
            ToastPhase::Entering | ToastPhase::Exiting { .. } => false,
        }
    }

    /// Apply every transition due at `now`. Returns whether anything changed.
    pub fn tick(&mut self, now: i64) -> bool {
        let before = self.toasts.clone();
        self.advance(now);
        before != self.toasts
    }

    fn advance(&mut self, now: i64) {
        let timings = self.timings;

        for toast in self.toasts.iter_mut() {
            if toast.phase == ToastPhase::Entering && now >= toast.created_at.saturating_add(timings.enter_ms) {
                toast.phase = ToastPhase::Visible;
            }

            let expires_at = toast.created_at.saturating_add(timings.lifetime_ms);
            if toast.phase == ToastPhase::Visible && now >= expires_at {
                toast.phase = ToastPhase::Exiting { since: expires_at };
            }
        }

        self.toasts.retain(|toast| match toast.phase {
            ToastPhase::Exiting { since } => now < since.saturating_add(timings.exit_ms),
            _ => true,
        });
    }

    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    pub fn get(&self, id: i64) -> Option<&Toast> {
        self.toasts.iter().find(|toast| toast.id == id)
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}
