//! Session tokens, request admission and password hashing

pub mod gate;
pub mod password;
pub mod token;

pub use gate::{AuthError, AuthGate, BearerToken};
pub use password::Argon2Hasher;
pub use token::{TokenConfig, TokenData, TokenError, TokenService};
