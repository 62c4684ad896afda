//! Canonical record shapes sent to the remote store.
//!
//! Every optional field is an `Option` that is skipped during serialization, so an
//! absent value never reaches the wire as `null` or `""`. The remote side patches
//! only the keys it receives, which keeps previously stored values intact.

use serde::Serialize;

/// Placeholder rank for players without a numeric world ranking.
pub const UNRANKED: u32 = 999;

/// Throwing-hand classification accepted by the player schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Swing {
    Right,
    Left,
}

impl Swing {
    /// Exact literal match only; anything else is treated as absent.
    pub fn from_literal(raw: &str) -> Option<Self> {
        match raw {
            "Right" => Some(Swing::Right),
            "Left" => Some(Swing::Left),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TournamentRecord {
    pub tournament_id: String,
    pub name: String,
    pub year: i64,
    pub status: String,
    pub scraped_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dates_raw: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub espn_tournament_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub espn_leaderboard_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prize_money: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner_espn_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner_profile_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winning_score: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_winner_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_winner_espn_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_winner_profile_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerBioRecord {
    pub espn_id: String,
    pub player_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_place: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub college: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turned_pro: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swing: Option<Swing>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerPhotoRecord {
    pub player_name: String,
    pub espn_id: String,
    pub photo_url: String,
    pub world_rank: u32,
}

/// One normalized entity, ready for upsert.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CanonicalRecord {
    Tournament(TournamentRecord),
    PlayerBio(PlayerBioRecord),
    PlayerPhoto(PlayerPhotoRecord),
}

impl CanonicalRecord {
    /// Key the remote store uses to choose between insert and update.
    pub fn natural_key(&self) -> &str {
        match self {
            CanonicalRecord::Tournament(t) => &t.tournament_id,
            CanonicalRecord::PlayerBio(p) => &p.espn_id,
            CanonicalRecord::PlayerPhoto(p) => &p.espn_id,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            CanonicalRecord::Tournament(t) => &t.name,
            CanonicalRecord::PlayerBio(p) => &p.player_name,
            CanonicalRecord::PlayerPhoto(p) => &p.player_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bio() -> PlayerBioRecord {
        PlayerBioRecord {
            espn_id: "9478".into(),
            player_name: "Scottie Scheffler".into(),
            country: None,
            birth_date: Some("6/21/1996".into()),
            birth_place: None,
            college: None,
            height: None,
            weight: None,
            turned_pro: Some(2018),
            swing: Some(Swing::Right),
        }
    }

    #[test]
    fn absent_fields_are_omitted_not_null() {
        let value = serde_json::to_value(CanonicalRecord::PlayerBio(bio())).unwrap();
        assert_eq!(
            value,
            json!({
                "espnId": "9478",
                "playerName": "Scottie Scheffler",
                "birthDate": "6/21/1996",
                "turnedPro": 2018,
                "swing": "Right"
            })
        );
    }

    #[test]
    fn photo_uses_camel_case_wire_names() {
        let rec = CanonicalRecord::PlayerPhoto(PlayerPhotoRecord {
            player_name: "Rory McIlroy".into(),
            espn_id: "3470".into(),
            photo_url: "https://a.espncdn.com/3470.png".into(),
            world_rank: UNRANKED,
        });
        let value = serde_json::to_value(&rec).unwrap();
        assert_eq!(value["worldRank"], json!(999));
        assert_eq!(rec.natural_key(), "3470");
        assert_eq!(rec.display_name(), "Rory McIlroy");
    }

    #[test]
    fn swing_requires_exact_literal() {
        assert_eq!(Swing::from_literal("Left"), Some(Swing::Left));
        assert_eq!(Swing::from_literal("left"), None);
        assert_eq!(Swing::from_literal("Switch"), None);
        assert_eq!(Swing::from_literal(""), None);
    }
}
