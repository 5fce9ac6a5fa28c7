//! Game snapshot types.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// State of a game at one poll.
///
/// Every fetch yields a fresh snapshot; snapshots are never updated in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSnapshot {
    #[serde(rename = "gameId")]
    pub id: String,
    #[serde(rename = "startTimeUTC", with = "time::serde::rfc3339::option")]
    pub start_time: Option<OffsetDateTime>,
    #[serde(rename = "vTeam")]
    pub visiting_team: Team,
    #[serde(rename = "hTeam")]
    pub home_team: Team,
    pub period: Period,
    /// Whether play is still ongoing.
    #[serde(rename = "isGameActivated")]
    pub active: bool,
}

impl GameSnapshot {
    /// Path segment the filter service is keyed by: visiting short code
    /// followed by home short code.
    pub fn matchup_code(&self) -> String {
        format!("{}{}", self.visiting_team.tri_code, self.home_team.tri_code)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Team {
    #[serde(rename = "teamId")]
    pub id: String,
    #[serde(rename = "triCode")]
    pub tri_code: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Period {
    #[serde(rename = "Current", alias = "current")]
    pub current: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(tri_code: &str) -> Team {
        Team {
            id: String::new(),
            tri_code: tri_code.to_string(),
        }
    }

    #[test]
    fn test_matchup_code_puts_visitors_first() {
        let snapshot = GameSnapshot {
            visiting_team: team("BOS"),
            home_team: team("LAL"),
            ..Default::default()
        };
        assert_eq!(snapshot.matchup_code(), "BOSLAL");
    }

    #[test]
    fn test_snapshot_parsing() {
        let json = r#"{
            "gameId": "0012300001",
            "startTimeUTC": "2023-10-24T23:30:00Z",
            "vTeam": {"teamId": "1610612738", "triCode": "BOS"},
            "hTeam": {"teamId": "1610612747", "triCode": "LAL"},
            "period": {"current": 3},
            "isGameActivated": true
        }"#;
        let snapshot: GameSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.id, "0012300001");
        assert_eq!(snapshot.period.current, 3);
        assert!(snapshot.active);
        assert_eq!(
            snapshot.start_time,
            Some(time::macros::datetime!(2023-10-24 23:30:00 UTC))
        );
    }

    #[test]
    fn test_missing_fields_default() {
        let snapshot: GameSnapshot = serde_json::from_str(r#"{"gameId": "42"}"#).unwrap();
        assert_eq!(snapshot.id, "42");
        assert!(!snapshot.active);
        assert!(snapshot.start_time.is_none());
        assert_eq!(snapshot.matchup_code(), "");
    }
}
