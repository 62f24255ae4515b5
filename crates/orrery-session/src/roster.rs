//! Participant roster
//!
//! Ordered by join order and unique by participant id. The roster performs no
//! I/O and no locking; it is only reached through the shared-state store,
//! which in turn is only reached through the coordinator.

use crate::protocol::Participant;
use indexmap::IndexMap;
use orrery_core::ParticipantId;

/// Participants currently known to be present
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticipantRoster {
    members: IndexMap<ParticipantId, Participant>,
}

impl ParticipantRoster {
    /// Create an empty roster
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a roster from participants, keeping the first entry per id
    pub fn from_participants(participants: impl IntoIterator<Item = Participant>) -> Self {
        let mut roster = Self::new();
        for participant in participants {
            roster.add(participant);
        }
        roster
    }

    /// Insert `participant` unless its id is already present.
    ///
    /// Returns `true` if the participant was inserted.
    pub fn add(&mut self, participant: Participant) -> bool {
        if self.members.contains_key(&participant.id) {
            return false;
        }
        self.members.insert(participant.id.clone(), participant);
        true
    }

    /// Remove the participant with `id` if present.
    ///
    /// Returns `true` if a participant was removed. Remaining members keep
    /// their relative order.
    pub fn remove(&mut self, id: &ParticipantId) -> bool {
        self.members.shift_remove(id).is_some()
    }

    /// Number of participants
    pub fn count(&self) -> usize {
        self.members.len()
    }

    /// Returns `true` if a participant with `id` is present
    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.members.contains_key(id)
    }

    /// Look up a participant
    pub fn get(&self, id: &ParticipantId) -> Option<&Participant> {
        self.members.get(id)
    }

    /// Update a participant's immersion fields in place.
    ///
    /// Unknown ids are ignored; returns `true` if a participant was updated.
    pub fn set_immersion(&mut self, id: &ParticipantId, style: Option<String>) -> bool {
        match self.members.get_mut(id) {
            Some(participant) => {
                participant.is_immersive = style.is_some();
                participant.immersion_style = style;
                true
            }
            None => false,
        }
    }

    /// Ordered copy of the roster for external readers
    pub fn snapshot(&self) -> Vec<Participant> {
        self.members.values().cloned().collect()
    }

    /// Participant ids in join order
    pub fn ids(&self) -> impl Iterator<Item = &ParticipantId> {
        self.members.keys()
    }
}
