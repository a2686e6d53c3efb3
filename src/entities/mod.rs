pub mod prelude;

pub mod identities;
pub mod leaderboard_entries;
pub mod session_tokens;
