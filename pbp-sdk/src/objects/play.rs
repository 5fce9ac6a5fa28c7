//! Play-by-play events and the bundle exchanged between the fetch, filter
//! and publish services.

use serde::{Deserialize, Serialize};

use super::game::GameSnapshot;

/// One unit of play-by-play content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayEvent {
    pub clock: String,
    pub description: String,
    #[serde(rename = "personId")]
    pub person_id: String,
    #[serde(rename = "teamId")]
    pub team_id: String,
    #[serde(rename = "vTeamScore")]
    pub visiting_team_score: String,
    #[serde(rename = "hTeamScore")]
    pub home_team_score: String,
    #[serde(rename = "isScoreChange")]
    pub is_score_change: bool,
    pub formatted: FormattedPlay,
}

/// Display-ready rendering of a play.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormattedPlay {
    pub description: String,
}

/// A game snapshot paired with its plays in chronological order.
///
/// Filtered and unfiltered bundles share this shape; the snapshot fields sit
/// at the top level of the JSON object next to the `Plays` array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayByPlayBundle {
    #[serde(flatten)]
    pub game: GameSnapshot,
    #[serde(rename = "Plays", alias = "plays", default)]
    pub plays: Vec<PlayEvent>,
}

impl PlayByPlayBundle {
    pub fn is_active(&self) -> bool {
        self.game.active
    }
}
