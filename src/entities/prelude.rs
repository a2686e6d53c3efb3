pub use super::identities::Entity as Identities;
pub use super::leaderboard_entries::Entity as LeaderboardEntries;
pub use super::session_tokens::Entity as SessionTokens;
