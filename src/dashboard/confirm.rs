use serde::Serialize;

/// Destructive operations that must be acknowledged before they run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestructiveAction {
    StopTunnel(u16),
    StopTunnels(Vec<u16>),
    UnmapDomain(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingConfirmation<A> {
    pub title: String,
    pub message: String,
    action: A,
}

impl<A> PendingConfirmation<A> {
    pub fn action(&self) -> &A {
        &self.action
    }
}

/// What a renderer needs to draw the confirmation prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmationPrompt {
    pub title: String,
    pub message: String,
}

/// Single pending confirmation slot. A new request replaces whatever is
/// pending; there is no queue.
#[derive(Debug, Clone)]
pub struct ConfirmationGate<A> {
    pending: Option<PendingConfirmation<A>>,
}

impl<A> Default for ConfirmationGate<A> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<A> ConfirmationGate<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the action that was pending and got discarded, if any.
    pub fn request(
        &mut self,
        title: impl Into<String>,
        message: impl Into<String>,
        action: A,
    ) -> Option<A> {
        self.pending
            .replace(PendingConfirmation {
                title: title.into(),
                message: message.into(),
                action,
            })
            .map(|previous| previous.action)
    }

    /// Hand out the pending action exactly once and empty the slot.
    pub fn confirm(&mut self) -> Option<A> {
        self.pending.take().map(|pending| pending.action)
    }

    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn pending(&self) -> Option<&PendingConfirmation<A>> {
        self.pending.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn prompt(&self) -> Option<ConfirmationPrompt> {
        self.pending.as_ref().map(|pending| ConfirmationPrompt {
            title: pending.title.clone(),
            message: pending.message.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirm_hands_out_action_once() {
        let mut gate = ConfirmationGate::new();
        gate.request("Stop Tunnel?", "close :8080", DestructiveAction::StopTunnel(8080));

        assert_eq!(gate.confirm(), Some(DestructiveAction::StopTunnel(8080)));
        assert_eq!(gate.confirm(), None);
        assert!(!gate.is_pending());
    }

    #[test]
    fn test_second_request_overwrites_first() {
        let mut gate = ConfirmationGate::new();
        assert!(gate
            .request("A", "first", DestructiveAction::StopTunnel(1))
            .is_none());

        let discarded = gate.request("B", "second", DestructiveAction::UnmapDomain("b.example.com".into()));
        assert_eq!(discarded, Some(DestructiveAction::StopTunnel(1)));
        assert_eq!(gate.pending().unwrap().title, "B");

        assert_eq!(
            gate.confirm(),
            Some(DestructiveAction::UnmapDomain("b.example.com".into()))
        );
        assert_eq!(gate.confirm(), None);
    }

    #[test]
    fn test_cancel_clears_without_returning_action() {
        let mut gate = ConfirmationGate::new();
        gate.request("A", "a", DestructiveAction::StopTunnels(vec![1, 2]));

        assert!(gate.cancel());
        assert!(!gate.cancel());
        assert!(gate.confirm().is_none());
    }
}
