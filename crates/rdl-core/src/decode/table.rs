//! Delimited table decoding (CSV with a caller-chosen separator).

use super::DecodeError;

/// Single-byte field separator, validated before it is handed to the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Separator(u8);

impl Separator {
    /// Accepts exactly one ASCII character (`,`, `;`, `|`, `\t`, ...).
    /// Quote and line-break characters cannot delimit fields.
    pub fn parse(sep: &str) -> Result<Self, DecodeError> {
        match sep.as_bytes() {
            [b'"' | b'\n' | b'\r'] => Err(DecodeError::InvalidSeparator(sep.to_string())),
            [b] if b.is_ascii() => Ok(Separator(*b)),
            _ => Err(DecodeError::InvalidSeparator(sep.to_string())),
        }
    }

    pub fn as_byte(self) -> u8 {
        self.0
    }

    pub fn as_char(self) -> char {
        self.0 as char
    }
}

/// Decodes `bytes` as a table separated by `sep`.
///
/// Convenience wrapper that validates `sep` first; see [`decode_csv_with`].
pub fn decode_csv(bytes: &[u8], sep: &str) -> Result<Vec<Vec<String>>, DecodeError> {
    decode_csv_with(bytes, Separator::parse(sep)?)
}

/// Decodes `bytes` as a table of string fields.
///
/// There is no header row. The field count of the first record applies to
/// every record; a single ragged row fails the whole payload.
pub fn decode_csv_with(bytes: &[u8], sep: Separator) -> Result<Vec<Vec<String>>, DecodeError> {
    if !bytes.contains(&sep.as_byte()) {
        return Err(DecodeError::SeparatorNotFound(sep.as_char()));
    }

    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(false)
        .delimiter(sep.as_byte())
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}
