//! Clicker Events
//!
//! Notifications for the toast sink and engine events for presentation
//! subscribers.

use serde::{Serialize, Deserialize};

use crate::game::particles::ParticleId;

/// Default toast duration (ms).
pub const DEFAULT_TOAST_MS: u64 = 4000;

/// Duration of the milestone toast (ms).
pub const MILESTONE_TOAST_MS: u64 = 2000;

/// Toast style.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Congratulation or confirmation
    Success,
    /// Neutral information
    Info,
}

/// A transient toast.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Text to display
    pub message: String,
    /// Style
    pub kind: NotificationKind,
    /// How long to display it (ms)
    pub duration_ms: u64,
}

impl Notification {
    /// Create a notification.
    pub fn new(message: impl Into<String>, kind: NotificationKind, duration_ms: u64) -> Self {
        Self {
            message: message.into(),
            kind,
            duration_ms,
        }
    }

    /// Congratulation for reaching a click milestone.
    pub fn milestone(clicks: u64, duration_ms: u64) -> Self {
        Self::new(
            format!("Отличная работа! {} кликов!", clicks),
            NotificationKind::Success,
            duration_ms,
        )
    }

    /// Confirmation of a click-power upgrade.
    pub fn power_increased(new_power: u64, duration_ms: u64) -> Self {
        Self::new(
            format!("Сила клика увеличена до {}!", new_power),
            NotificationKind::Success,
            duration_ms,
        )
    }

    /// Confirmation of a counter reset.
    pub fn counter_reset(duration_ms: u64) -> Self {
        Self::new("Счётчик сброшен!", NotificationKind::Info, duration_ms)
    }
}

/// Something that happened in the engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    /// A click was applied
    Clicked {
        /// Amount added
        added: u64,
        /// Counter after the click
        clicks: u64,
        /// Lifetime total after the click
        total_clicks: u64,
    },

    /// A particle appeared
    ParticleSpawned {
        /// Particle id
        id: ParticleId,
        /// Offset from the surface's left edge
        x: f64,
        /// Offset from the surface's top edge
        y: f64,
        /// Label power
        power: u64,
    },

    /// A particle was removed (expired or evicted)
    ParticleRemoved {
        /// Particle id
        id: ParticleId,
    },

    /// A click milestone was reached
    Milestone {
        /// Counter value
        clicks: u64,
    },

    /// Click power went up
    PowerIncreased {
        /// New power
        click_power: u64,
    },

    /// The counter was reset
    Reset {
        /// Lifetime total (unchanged)
        total_clicks: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_texts() {
        let n = Notification::milestone(50, MILESTONE_TOAST_MS);
        assert_eq!(n.message, "Отличная работа! 50 кликов!");
        assert_eq!(n.kind, NotificationKind::Success);
        assert_eq!(n.duration_ms, 2000);

        let n = Notification::power_increased(3, DEFAULT_TOAST_MS);
        assert_eq!(n.message, "Сила клика увеличена до 3!");

        let n = Notification::counter_reset(DEFAULT_TOAST_MS);
        assert_eq!(n.message, "Счётчик сброшен!");
        assert_eq!(n.kind, NotificationKind::Info);
    }

    #[test]
    fn test_engine_event_json_tag() {
        let json = serde_json::to_string(&EngineEvent::Milestone { clicks: 100 }).unwrap();
        assert_eq!(json, r#"{"event":"milestone","clicks":100}"#);
    }
}
