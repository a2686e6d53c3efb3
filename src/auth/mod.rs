//! Identity & session core: password credentials, signed token pairs, and
//! the platform-reach state machine. Everything here is pure or local —
//! persistence lives behind the [`crate::db::Store`] collaborator.

pub mod credentials;
pub mod platform;
pub mod tokens;

pub use credentials::{CredentialError, ORIGIN_LOCAL, hash_password, verify_password};
pub use platform::{LoginSignal, PlatformReach, record_login};
pub use tokens::{AccessClaims, RefreshClaims, TokenError, TokenIssuer, TokenPair, TokenVerifier};
