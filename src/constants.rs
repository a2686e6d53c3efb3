pub mod tokens {

    /// Default lifetime of an access token.
    pub const ACCESS_TTL_SECS: i64 = 1800;

    /// Default lifetime of a refresh token (60x the access lifetime).
    pub const REFRESH_TTL_SECS: i64 = ACCESS_TTL_SECS * 60;

    /// Short-lived pair handed out by external-provider callbacks, just long
    /// enough for the client to exchange it for a real session.
    pub const EXCHANGE_ACCESS_TTL_SECS: i64 = 30;

    pub const EXCHANGE_REFRESH_TTL_SECS: i64 = 60;

    /// Pair embedded in the account-deletion email link.
    pub const REMOVAL_ACCESS_TTL_SECS: i64 = 1800;

    pub const REMOVAL_REFRESH_TTL_SECS: i64 = 18000;
}

pub mod leaderboard {

    /// Per-window result cap when the caller does not specify one.
    pub const DEFAULT_TOP_N: u64 = 10;

    /// Upper bound on caller-supplied top_n.
    pub const MAX_TOP_N: u64 = 100;

    /// Window cutoffs in days, widest first. The all-time window has no cutoff.
    pub const WINDOW_DAYS: [i64; 4] = [365, 31, 7, 1];
}

pub mod credentials {

    /// Bytes of entropy in a per-identity salt (hex-encoded on storage).
    pub const SALT_LEN_BYTES: usize = 8;
}
