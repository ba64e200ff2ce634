use crate::{Day, Field, PlayerId};
use serde_json::Error as JsonError;
use std::io::Error as IoError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    #[error("JSON error: {0}")]
    Json(#[from] JsonError),

    #[error("No player with id {0}")]
    UnknownPlayer(PlayerId),

    #[error("Unknown player field {0:?}, expected one of: {}", Field::NAMES.join(", "))]
    UnknownField(String),

    #[error("Invalid value {value:?} for field {field}")]
    InvalidField { field: Field, value: String },

    #[error("Unrecognized date {0:?}, expected YYYY-MM-DD, an RFC 3339 timestamp, or \"today\"")]
    InvalidDate(String),

    #[error("Day {0} is outside the representable calendar")]
    DayOutOfRange(Day),
}
