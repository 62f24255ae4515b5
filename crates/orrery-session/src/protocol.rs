//! Action protocol and shared-state snapshot shape
//!
//! [`Action`] is a closed set: adding a variant forces every `match` in the
//! store to be revisited, which keeps `apply` exhaustive at compile time.
//! Actions travel inside a versioned frame (see [`encode_action`]).

use orrery_core::serialization::{self, SerializationError};
use orrery_core::{ParticipantId, PhysicalTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;
use std::str::FromStr;

/// Wire version of the action frame
pub const WIRE_VERSION: u16 = 1;

/// Three-component rotation vector (radians per axis)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    /// Rotation about the x axis
    pub x: f32,
    /// Rotation about the y axis
    pub y: f32,
    /// Rotation about the z axis
    pub z: f32,
}

impl Vector3 {
    /// The zero rotation
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Create a vector from its components
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl Add for Vector3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl From<[f32; 3]> for Vector3 {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self::new(x, y, z)
    }
}

/// The fixed planet catalog every participant knows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Planet {
    /// Mercury
    Mercury,
    /// Venus
    Venus,
    /// Earth
    Earth,
    /// Mars
    Mars,
    /// Jupiter
    Jupiter,
    /// Saturn
    Saturn,
    /// Uranus
    Uranus,
    /// Neptune
    Neptune,
}

impl Planet {
    /// Every planet in catalog order
    pub const ALL: [Planet; 8] = [
        Planet::Mercury,
        Planet::Venus,
        Planet::Earth,
        Planet::Mars,
        Planet::Jupiter,
        Planet::Saturn,
        Planet::Uranus,
        Planet::Neptune,
    ];

    /// Display name, also the canonical string identifier
    pub const fn name(self) -> &'static str {
        match self {
            Planet::Mercury => "Mercury",
            Planet::Venus => "Venus",
            Planet::Earth => "Earth",
            Planet::Mars => "Mars",
            Planet::Jupiter => "Jupiter",
            Planet::Saturn => "Saturn",
            Planet::Uranus => "Uranus",
            Planet::Neptune => "Neptune",
        }
    }
}

impl fmt::Display for Planet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A planet name outside the catalog
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown planet '{0}'")]
pub struct UnknownPlanet(pub String);

impl FromStr for Planet {
    type Err = UnknownPlanet;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Planet::ALL
            .into_iter()
            .find(|planet| planet.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownPlanet(s.to_string()))
    }
}

/// A participant known to the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Session-scoped identifier
    pub id: ParticipantId,
    /// Human-readable label
    pub display_name: String,
    /// Whether the participant is in the immersive variant of the experience
    pub is_immersive: bool,
    /// Immersion style tag reported with the last immersive transition
    pub immersion_style: Option<String>,
}

impl Participant {
    /// Create a non-immersive participant
    pub fn new(id: impl Into<ParticipantId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            is_immersive: false,
            immersion_style: None,
        }
    }
}

/// The reconciled snapshot replicated across all participants
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SharedState {
    /// Accumulated globe rotation
    pub globe_rotation: Vector3,
    /// Currently selected planet, if any
    pub selected_planet: Option<Planet>,
    /// Participants in join order, unique by id
    pub participants: Vec<Participant>,
    /// Time at which the most recent action was applied; a full sync carries
    /// the sender's value over
    pub last_updated: PhysicalTime,
}

impl SharedState {
    /// Look up a participant by id
    pub fn participant(&self, id: &ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| &p.id == id)
    }

    /// Number of known participants
    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    /// Compare the replicated fields, ignoring `last_updated`.
    ///
    /// Participants stamp applies with their own clocks, so two views that
    /// agree on content may still differ in `last_updated`.
    pub fn same_content(&self, other: &SharedState) -> bool {
        self.globe_rotation == other.globe_rotation
            && self.selected_planet == other.selected_planet
            && self.participants == other.participants
    }
}

/// Synchronizable operations exchanged between participants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Action {
    /// Replace the globe rotation with an already-accumulated vector
    RotateGlobe(Vector3),
    /// Replace the selected planet
    SelectPlanet(Planet),
    /// A participant joined the session
    ParticipantJoined(Participant),
    /// A participant left the session
    ParticipantLeft(ParticipantId),
    /// The sender entered the immersive space with the given style
    EnterImmersiveSpace(String),
    /// The sender exited the immersive space
    ExitImmersiveSpace,
    /// Replace the whole shared state with the given snapshot
    SynchronizeState(SharedState),
}

impl Action {
    /// Short stable name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Action::RotateGlobe(_) => "rotate_globe",
            Action::SelectPlanet(_) => "select_planet",
            Action::ParticipantJoined(_) => "participant_joined",
            Action::ParticipantLeft(_) => "participant_left",
            Action::EnterImmersiveSpace(_) => "enter_immersive_space",
            Action::ExitImmersiveSpace => "exit_immersive_space",
            Action::SynchronizeState(_) => "synchronize_state",
        }
    }
}

/// Encode an action into a versioned wire frame
pub fn encode_action(action: &Action) -> Result<Vec<u8>, SerializationError> {
    serialization::encode_framed(WIRE_VERSION, action)
}

/// Decode an action from a versioned wire frame
pub fn decode_action(bytes: &[u8]) -> Result<Action, SerializationError> {
    serialization::decode_framed(WIRE_VERSION, bytes)
}
