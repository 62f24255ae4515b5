//! Activity metadata and spatial arrangement preferences
//!
//! Both types are handed to the external transport unchanged; the core never
//! interprets them beyond validation.

use serde::{Deserialize, Serialize};

/// Identifier of the shared exploration activity
pub const DEFAULT_ACTIVITY_IDENTIFIER: &str = "group-exploration";

/// Category reported to the transport's invitation UI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    /// General purpose shared activity
    #[default]
    Generic,
    /// Watching media together
    WatchTogether,
    /// Listening to media together
    ListenTogether,
}

/// Metadata describing the activity offered when starting a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityDescriptor {
    /// Stable identifier used to route invitations back to this activity
    pub identifier: String,
    /// Title shown in the invitation sheet
    pub title: String,
    /// Additional context shown under the title
    pub subtitle: String,
    /// Activity category
    #[serde(default)]
    pub kind: ActivityKind,
    /// Deep link used when the activity cannot be launched directly
    #[serde(default)]
    pub fallback_url: Option<String>,
}

impl Default for ActivityDescriptor {
    fn default() -> Self {
        Self {
            identifier: DEFAULT_ACTIVITY_IDENTIFIER.to_string(),
            title: "Group Exploration".to_string(),
            subtitle: "Explore immersive spaces together".to_string(),
            kind: ActivityKind::Generic,
            fallback_url: Some("groupexploration://shared".to_string()),
        }
    }
}

/// Preferred arrangement of participants around the shared content
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpatialTemplate {
    /// Participants face the shared content side by side
    #[default]
    SideBySide,
    /// Participants gather around the shared content
    Surround,
    /// Participants face each other across the shared content
    Conversational,
}

/// Transport-level spatial configuration applied once per connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialConfiguration {
    /// Preferred participant arrangement
    pub template: SpatialTemplate,
    /// Distance from the centre of the template to its edge
    pub content_extent: f32,
    /// Whether all participants may share one immersive space
    pub supports_group_immersive_space: bool,
}

impl Default for SpatialConfiguration {
    fn default() -> Self {
        Self {
            template: SpatialTemplate::SideBySide,
            content_extent: 200.0,
            supports_group_immersive_space: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_activity() {
        let activity = ActivityDescriptor::default();
        assert_eq!(activity.identifier, DEFAULT_ACTIVITY_IDENTIFIER);
        assert_eq!(activity.kind, ActivityKind::Generic);
        assert!(activity.fallback_url.is_some());
    }

    #[test]
    fn test_default_spatial_configuration() {
        let spatial = SpatialConfiguration::default();
        assert_eq!(spatial.template, SpatialTemplate::SideBySide);
        assert_eq!(spatial.content_extent, 200.0);
        assert!(spatial.supports_group_immersive_space);
    }
}
