pub mod game;
pub mod play;

pub use game::{GameSnapshot, Period, Team};
pub use play::{FormattedPlay, PlayByPlayBundle, PlayEvent};

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Short key identifying a single game instance.
///
/// Used as the registry key and as the path parameter of the fetch service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameCode(CompactString);

impl GameCode {
    pub fn new(code: impl Into<CompactString>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for GameCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for GameCode {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for GameCode {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl AsRef<str> for GameCode {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Borrow<str> for GameCode {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}
