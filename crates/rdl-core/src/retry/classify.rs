//! Classify decode errors into retry policy error kinds.

use crate::decode::DecodeError;
use crate::retry::policy::ErrorKind;

/// Classify a decode error into an ErrorKind.
///
/// Separator problems mean the caller asked for the wrong table shape; no
/// amount of refetching changes that. Everything else points at a damaged or
/// stale copy of the resource.
pub fn classify(e: &DecodeError) -> ErrorKind {
    match e {
        DecodeError::InvalidSeparator(_) | DecodeError::SeparatorNotFound(_) => {
            ErrorKind::ContentMismatch
        }
        DecodeError::Csv(_) | DecodeError::Json(_) => ErrorKind::Corrupt,
    }
}
