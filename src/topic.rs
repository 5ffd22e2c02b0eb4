//! MQTT topic classification
//!
//! ACL topics are audited as written. Wildcards are detected by substring only:
//! `+` (single level) and `#` (multi level) count wherever they appear, and
//! their placement is never validated.

use serde::{Deserialize, Serialize};

/// Single-level wildcard token
pub const SINGLE_LEVEL_WILDCARD: char = '+';

/// Multi-level wildcard token
pub const MULTI_LEVEL_WILDCARD: char = '#';

/// Topic level separator
pub const LEVEL_SEPARATOR: char = '/';

/// Whether a topic is a wildcard filter or an exact topic name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicKind {
    Wildcard,
    Exact,
}

impl TopicKind {
    /// Classify a topic string
    ///
    /// # Examples
    /// ```
    /// use mosquitto_acl_visualizer::topic::TopicKind;
    ///
    /// assert_eq!(TopicKind::of("sensors/+/data"), TopicKind::Wildcard);
    /// assert_eq!(TopicKind::of("devices/#"), TopicKind::Wildcard);
    /// assert_eq!(TopicKind::of("sensors/room1/data"), TopicKind::Exact);
    /// ```
    pub fn of(topic: &str) -> Self {
        if is_wildcard(topic) {
            Self::Wildcard
        } else {
            Self::Exact
        }
    }
}

/// Check if a topic contains a `+` or `#` anywhere
pub fn is_wildcard(topic: &str) -> bool {
    topic.contains(SINGLE_LEVEL_WILDCARD) || topic.contains(MULTI_LEVEL_WILDCARD)
}

/// Check if a topic contains the single-level wildcard anywhere
pub fn has_single_level_wildcard(topic: &str) -> bool {
    topic.contains(SINGLE_LEVEL_WILDCARD)
}

/// Check if a topic is the bare multi-level wildcard, i.e. every topic
pub fn is_match_all(topic: &str) -> bool {
    topic.len() == 1 && topic.starts_with(MULTI_LEVEL_WILDCARD)
}

/// Split a topic into its levels
///
/// Empty levels are kept, so `a//b` yields `["a", "", "b"]`.
pub fn levels(topic: &str) -> impl Iterator<Item = &str> {
    topic.split(LEVEL_SEPARATOR)
}
