//! Platform-reach tracking: whether an identity has logged in from web,
//! mobile, or both. Reaching `Both` unlocks a one-time achievement.

use serde::Serialize;

/// Stored as an integer on the identity row; `Both` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlatformReach {
    Undefined,
    Web,
    Mobile,
    Both,
}

impl PlatformReach {
    #[must_use]
    pub const fn from_i32(value: i32) -> Self {
        match value {
            1 => Self::Web,
            2 => Self::Mobile,
            3 => Self::Both,
            _ => Self::Undefined,
        }
    }

    #[must_use]
    pub const fn as_i32(self) -> i32 {
        match self {
            Self::Undefined => 0,
            Self::Web => 1,
            Self::Mobile => 2,
            Self::Both => 3,
        }
    }
}

/// What a login did to the platform-reach state.
///
/// On `Updated` or `AchievementUnlocked` the caller must persist the
/// identity; on `NoChange` nothing observable happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginSignal {
    NoChange,
    Updated,
    AchievementUnlocked,
}

/// Pure transition function for a login event.
///
/// `Both` is grant-once: repeat logins from any platform signal `NoChange`
/// and never re-raise the achievement.
#[must_use]
pub const fn record_login(current: PlatformReach, is_web: bool) -> (PlatformReach, LoginSignal) {
    use LoginSignal::{AchievementUnlocked, NoChange, Updated};
    use PlatformReach::{Both, Mobile, Undefined, Web};

    match (current, is_web) {
        (Undefined, true) => (Web, Updated),
        (Undefined, false) => (Mobile, Updated),
        (Web, false) | (Mobile, true) => (Both, AchievementUnlocked),
        (Web, true) => (Web, NoChange),
        (Mobile, false) => (Mobile, NoChange),
        (Both, _) => (Both, NoChange),
    }
}
