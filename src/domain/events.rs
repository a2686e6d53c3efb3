//! Domain events for the application.
//!
//! Events are sent over the broadcast bus to notify connected clients of
//! state changes via SSE.

use serde::Serialize;

/// Events sent to connected clients via SSE (Server-Sent Events).
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum NotificationEvent {
    LeaderboardUpdated {
        mode: String,
        user_name: String,
        score: i32,
    },

    AchievementUnlocked {
        user_name: String,
        achievement: String,
    },

    AccountRemoved {
        user_name: String,
    },

    Error {
        message: String,
    },
    Info {
        message: String,
    },
}
