// Authentication errors

use thiserror::Error;

use crate::store::StoreError;

/// Authentication failure
///
/// The first four variants are reported to the client
/// as a single "not authenticated" outcome
#[derive(Error, Debug)]
pub enum AuthError {
    /// Malformed token, bad signature or missing claims
    #[error("Invalid credential")]
    InvalidCredential,

    #[error("Expired credential")]
    ExpiredCredential,

    /// A newer login (or a logout) replaced the session marker
    #[error("Session superseded by a newer login")]
    SessionSuperseded,

    #[error("Unknown user: {0}")]
    UnknownUser(String),

    /// Wrong email or password at login
    #[error("Invalid email or password")]
    InvalidLogin,

    #[error("Could not issue credential: {0}")]
    Issue(String),

    #[error("Could not hash password: {0}")]
    PasswordHash(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
