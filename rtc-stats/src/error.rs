use crate::report::RTCStatsType;
use crate::stream::RTCMediaKind;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, PartialEq)]
#[non_exhaustive]
pub enum Error {
    #[error("stats: invalid media kind {0:?}")]
    ErrInvalidMediaKind(String),
    #[error("stats: media kind changed from {expected} to {actual:?}")]
    ErrMediaKindMismatch {
        expected: RTCMediaKind,
        actual: String,
    },
    #[error("stats: timestamp {current} of {id} is not after {previous}")]
    ErrStatsOutOfOrder {
        id: String,
        previous: f64,
        current: f64,
    },
    #[error("stats: {id} is referenced as {expected} but has type {actual}")]
    ErrRemoteStatsTypeMismatch {
        id: String,
        expected: RTCStatsType,
        actual: String,
    },
    #[error("stats: closed")]
    ErrClosed,

    #[error("serde: {0}")]
    Serde(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serde(e.to_string())
    }
}
