//! Payload decoders.
//!
//! Turns fully buffered response bodies into structured values: delimited
//! tables (CSV rows) or JSON trees. Decoders are pure; retry decisions based
//! on their errors live in [`crate::retry`].

mod json;
mod table;

pub use json::decode_json;
pub use table::{decode_csv, decode_csv_with, Separator};

/// Why a payload could not be turned into the requested shape.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The caller-supplied separator is not exactly one character.
    #[error("incorrect length of csv separator: {0:?}")]
    InvalidSeparator(String),
    /// The payload never mentions the separator, so it is not this kind of table.
    #[error("cannot find separator {0:?} in payload")]
    SeparatorNotFound(char),
    /// Malformed table (bad quoting, non-UTF-8, ragged rows).
    #[error("csv: {0}")]
    Csv(#[from] ::csv::Error),
    /// Malformed JSON document.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}
