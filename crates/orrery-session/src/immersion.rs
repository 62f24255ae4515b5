//! Local immersive space tracking
//!
//! The presentation layer opens and dismisses the immersive space
//! asynchronously, so the tracker models the in-between phase explicitly and
//! only reports an announcement when a transition settles.

use crate::protocol::Action;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase of the local immersive space
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImmersiveSpaceState {
    /// No immersive space is shown
    #[default]
    Closed,
    /// Opening or dismissal is in progress
    InTransition,
    /// The immersive space is shown
    Open,
}

impl fmt::Display for ImmersiveSpaceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Closed => "closed",
            Self::InTransition => "in_transition",
            Self::Open => "open",
        };
        f.write_str(name)
    }
}

/// A transition that skips the in-between phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Invalid immersive space transition from {from} to {to}")]
pub struct InvalidImmersionTransition {
    /// State before the attempted transition
    pub from: ImmersiveSpaceState,
    /// Requested state
    pub to: ImmersiveSpaceState,
}

/// Tracks the local immersive space and derives the actions to announce
#[derive(Debug, Clone, Default)]
pub struct ImmersionTracker {
    state: ImmersiveSpaceState,
    open_style: Option<String>,
}

impl ImmersionTracker {
    /// Create a tracker in the closed state
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase
    pub fn state(&self) -> ImmersiveSpaceState {
        self.state
    }

    /// Move to `next`, returning the action to broadcast if the move settles
    /// a change other participants should see.
    ///
    /// Requesting the current state is accepted and announces nothing.
    pub fn transition(
        &mut self,
        next: ImmersiveSpaceState,
        style: &str,
    ) -> Result<Option<Action>, InvalidImmersionTransition> {
        use ImmersiveSpaceState::*;

        let announcement = match (self.state, next) {
            (from, to) if from == to => None,
            (Closed, InTransition) | (Open, InTransition) => None,
            (InTransition, Open) => {
                self.open_style = Some(style.to_string());
                Some(Action::EnterImmersiveSpace(style.to_string()))
            }
            (InTransition, Closed) => {
                let was_open = self.open_style.take().is_some();
                was_open.then_some(Action::ExitImmersiveSpace)
            }
            (from, to) => return Err(InvalidImmersionTransition { from, to }),
        };
        self.state = next;
        Ok(announcement)
    }

    /// Style of the announced open space, until it closes again
    pub fn open_style(&self) -> Option<&str> {
        self.open_style.as_deref()
    }
}
