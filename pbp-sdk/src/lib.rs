//! Play-by-play relay SDK.
//!
//! Shared wire types for the fetch, filter and publish services, the
//! last-value-wins JSON stream decoder, and (behind the `client` feature)
//! a typed HTTP client for those services.

pub mod decode;
pub mod objects;

#[cfg(feature = "client")]
pub mod client;

pub use objects::{
    FormattedPlay, GameCode, GameSnapshot, Period, PlayByPlayBundle, PlayEvent, Team,
};
