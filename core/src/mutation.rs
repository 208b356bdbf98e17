//! Per-kind mutation state machine: `Idle → InFlight → {Success, Error}`.
//!
//! The state is published on a `watch` channel so a UI can disable its
//! submit control and show a pending indicator while a call is in flight.

use tokio::sync::watch;

use crate::error::ApiError;
use crate::notify::Notification;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

impl MutationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MutationKind::Create => "create",
            MutationKind::Update => "update",
            MutationKind::Delete => "delete",
        }
    }

    /// The notification emitted when a call of this kind succeeds.
    pub fn success_notice(self) -> Notification {
        match self {
            MutationKind::Create => Notification::info("Success", "Post scheduled successfully"),
            MutationKind::Update => Notification::info("Updated", "Post updated successfully"),
            MutationKind::Delete => Notification::info("Deleted", "Post removed from schedule"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MutationState {
    #[default]
    Idle,
    InFlight,
    Success,
    Error(String),
}

impl MutationState {
    pub fn is_pending(&self) -> bool {
        matches!(self, MutationState::InFlight)
    }
}

#[derive(Debug)]
pub struct MutationTracker {
    kind: MutationKind,
    state: watch::Sender<MutationState>,
}

impl MutationTracker {
    pub fn new(kind: MutationKind) -> Self {
        let (state, _) = watch::channel(MutationState::Idle);
        Self { kind, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<MutationState> {
        self.state.subscribe()
    }

    pub fn current(&self) -> MutationState {
        self.state.borrow().clone()
    }

    /// Enter `InFlight`, refusing while another call of this kind is pending.
    ///
    /// Dropping the returned guard without settling it (the call was
    /// cancelled) puts the tracker back to `Idle`.
    pub fn begin(&self) -> Result<InFlight<'_>, ApiError> {
        let started = self.state.send_if_modified(|state| {
            if state.is_pending() {
                return false;
            }
            *state = MutationState::InFlight;
            true
        });
        if started {
            Ok(InFlight {
                tracker: self,
                settled: false,
            })
        } else {
            Err(ApiError::MutationInFlight(self.kind.as_str()))
        }
    }
}

/// A pending mutation call.
#[derive(Debug)]
pub struct InFlight<'a> {
    tracker: &'a MutationTracker,
    settled: bool,
}

impl InFlight<'_> {
    pub fn succeed(mut self) {
        self.settled = true;
        self.tracker.state.send_replace(MutationState::Success);
    }

    pub fn fail(mut self, error: &ApiError) {
        self.settled = true;
        self.tracker
            .state
            .send_replace(MutationState::Error(error.to_string()));
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.tracker.state.send_replace(MutationState::Idle);
        }
    }
}
