//! Invitation listener
//!
//! Bridges an externally-driven invitation stream to
//! [`SessionCoordinator::join_existing`]. Rejected invitations are logged and
//! the listener keeps running.

use crate::coordinator::SessionCoordinator;
use futures::StreamExt;
use orrery_core::InvitationEffects;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Background task joining sessions as invitations arrive
#[derive(Debug)]
pub struct InvitationListener {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl InvitationListener {
    /// Subscribe to `detector` and start joining invited sessions
    pub fn spawn<D>(coordinator: SessionCoordinator, detector: &D) -> Self
    where
        D: InvitationEffects + ?Sized,
    {
        let mut invitations = detector.invitations();
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let task = tokio::spawn(async move {
            loop {
                let handle = tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    next = invitations.next() => match next {
                        Some(handle) => handle,
                        None => break,
                    },
                };

                match coordinator.join_existing(handle.clone()).await {
                    Ok(_) => info!(session_id = %handle.session_id, "joined session from invitation"),
                    Err(err) => warn!(
                        session_id = %handle.session_id,
                        error = %err,
                        "invitation rejected"
                    ),
                }
            }
            debug!("invitation listener stopped");
        });

        Self { cancel, task }
    }

    /// Returns `true` once the invitation stream ended or the listener stopped
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop listening and wait for the task to exit
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Err(err) = (&mut self.task).await {
            if err.is_panic() {
                warn!(error = %err, "invitation listener panicked");
            }
        }
    }
}

impl Drop for InvitationListener {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
