//! Decoding of response bodies that may carry several concatenated JSON
//! values.
//!
//! The upstream services may stream incremental or whole-object frames.
//! Only the last fully decoded value is kept.

use serde::de::DeserializeOwned;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("body contained no json value")]
    Empty,
}

/// Decode every JSON value in `bytes` and return the last one.
///
/// Any malformed value fails the whole body.
pub fn decode_last<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, DecodeError> {
    let mut last = None;
    for value in serde_json::Deserializer::from_slice(bytes).into_iter::<T>() {
        last = Some(value?);
    }
    last.ok_or(DecodeError::Empty)
}

/// Like [`decode_last`], but a body without any JSON value yields
/// `T::default()`.
pub fn decode_last_or_default<T: DeserializeOwned + Default>(
    bytes: &[u8],
) -> Result<T, DecodeError> {
    match decode_last(bytes) {
        Err(DecodeError::Empty) => Ok(T::default()),
        other => other,
    }
}
