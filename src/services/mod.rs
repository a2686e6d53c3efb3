pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, IdentityInfo, SessionResult};
pub use auth_service_impl::SeaOrmAuthService;

pub mod score_service;
pub mod score_service_impl;
pub use score_service::{ScoreError, ScorePayload, ScoreService, ScoreSubmission};
pub use score_service_impl::SeaOrmScoreService;

pub mod leaderboard_service;
pub mod leaderboard_service_impl;
pub use leaderboard_service::{LeaderboardError, LeaderboardService, RankedEntry};
pub use leaderboard_service_impl::SeaOrmLeaderboardService;
