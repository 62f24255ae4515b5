//! Shared state store
//!
//! Folds actions into the reconciled snapshot with last-writer-wins
//! semantics. `apply` is total: every action is accepted and every branch
//! stamps `last_updated`. Incremental actions use the caller-supplied
//! application time; `SynchronizeState` adopts the snapshot wholesale,
//! timestamp included, so the receiver ends up equal to the sender.

use crate::protocol::{Action, Planet, SharedState, Vector3};
use crate::roster::ParticipantRoster;
use orrery_core::{ParticipantId, PhysicalTime};

/// Whether an apply changed anything besides `last_updated`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Replicated fields changed
    Changed,
    /// The action was a no-op (duplicate join, unknown participant, same value)
    Unchanged,
}

impl ApplyOutcome {
    fn from_changed(changed: bool) -> Self {
        if changed {
            Self::Changed
        } else {
            Self::Unchanged
        }
    }

    /// Returns `true` for [`ApplyOutcome::Changed`]
    pub fn is_changed(self) -> bool {
        matches!(self, Self::Changed)
    }
}

/// Holds the reconciled state for one coordinator
#[derive(Debug, Clone, Default)]
pub struct SharedStateStore {
    globe_rotation: Vector3,
    selected_planet: Option<Planet>,
    roster: ParticipantRoster,
    last_updated: PhysicalTime,
}

impl SharedStateStore {
    /// Create a store holding the default state
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `action` sent by `origin` at local time `now`.
    ///
    /// `origin` is only consulted by the immersive-space actions, which
    /// update the sender's own roster entry.
    pub fn apply(
        &mut self,
        origin: &ParticipantId,
        action: Action,
        now: PhysicalTime,
    ) -> ApplyOutcome {
        let mut stamp = now;
        let changed = match action {
            Action::RotateGlobe(rotation) => {
                let changed = self.globe_rotation != rotation;
                self.globe_rotation = rotation;
                changed
            }
            Action::SelectPlanet(planet) => {
                let changed = self.selected_planet != Some(planet);
                self.selected_planet = Some(planet);
                changed
            }
            Action::ParticipantJoined(participant) => self.roster.add(participant),
            Action::ParticipantLeft(id) => self.roster.remove(&id),
            Action::EnterImmersiveSpace(style) => {
                let unchanged = self.roster.get(origin).is_some_and(|p| {
                    p.is_immersive && p.immersion_style.as_deref() == Some(style.as_str())
                });
                self.roster.set_immersion(origin, Some(style)) && !unchanged
            }
            Action::ExitImmersiveSpace => {
                let unchanged = self
                    .roster
                    .get(origin)
                    .is_some_and(|p| !p.is_immersive && p.immersion_style.is_none());
                self.roster.set_immersion(origin, None) && !unchanged
            }
            Action::SynchronizeState(snapshot) => {
                let changed = !self.current_snapshot().same_content(&snapshot);
                self.globe_rotation = snapshot.globe_rotation;
                self.selected_planet = snapshot.selected_planet;
                self.roster = ParticipantRoster::from_participants(snapshot.participants);
                stamp = snapshot.last_updated;
                changed
            }
        };
        self.last_updated = stamp;
        ApplyOutcome::from_changed(changed)
    }

    /// Copy of the present state
    pub fn current_snapshot(&self) -> SharedState {
        SharedState {
            globe_rotation: self.globe_rotation,
            selected_planet: self.selected_planet,
            participants: self.roster.snapshot(),
            last_updated: self.last_updated,
        }
    }

    /// Read access to the roster
    pub fn roster(&self) -> &ParticipantRoster {
        &self.roster
    }

    /// Current globe rotation
    pub fn globe_rotation(&self) -> Vector3 {
        self.globe_rotation
    }

    /// Timestamp of the most recent apply
    pub fn last_updated(&self) -> PhysicalTime {
        self.last_updated
    }

    /// Return to the default state, clearing the roster
    pub fn reset(&mut self) {
        *self = Self::default();
    }

}
