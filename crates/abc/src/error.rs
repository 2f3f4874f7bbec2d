//! Errors for callers that hand us something structurally wrong.
//!
//! Reading tunes never fails; these only come out of the strict `FromStr`
//! conversions.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbcError {
    #[error("'{0}' is not a pitched ABC note")]
    InvalidPitch(String),

    #[error("no whistle in '{0}' (expected one of D, C, G, A, Bb, F, Eb)")]
    UnknownWhistleKey(String),

    #[error("unknown instrument '{0}' (expected whistle, whistle:<key> or fiddle)")]
    UnknownInstrument(String),
}
