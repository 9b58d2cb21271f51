// Sequence generation errors

use thiserror::Error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum SequenceError {
    /// The city is not in the city table
    #[error("Unknown city: {0}")]
    UnknownCity(String),

    /// An existing report number does not end in a number
    #[error("Malformed report identifier: {0}")]
    MalformedIdentifier(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
