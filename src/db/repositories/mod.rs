pub mod identity;
pub mod leaderboard;
pub mod token;
