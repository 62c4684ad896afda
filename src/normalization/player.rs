use super::{fields, Normalized, Normalizer, RawRow};
use crate::records::{CanonicalRecord, PlayerBioRecord, PlayerPhotoRecord};

/// Maps `player_bios_*.csv` rows onto the player biography patch.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayerBioNormalizer;

impl Normalizer for PlayerBioNormalizer {
    fn normalize(&self, row: &RawRow) -> Normalized {
        let Some(espn_id) = row.text("player_id") else {
            return Normalized::Rejected("missing player_id".into());
        };
        let Some(player_name) = row.text("player_name") else {
            return Normalized::Rejected(format!("missing player_name (player_id {espn_id})"));
        };
        let raw = |field: &str| row.text(field).unwrap_or_default();

        Normalized::Record(CanonicalRecord::PlayerBio(PlayerBioRecord {
            espn_id,
            player_name,
            country: row.text("country"),
            birth_date: fields::birth_date(&raw("birthdate")),
            birth_place: row.text("birthplace"),
            college: row.text("college"),
            height: row.text("height"),
            weight: row.text("weight"),
            turned_pro: fields::turned_pro(&raw("turned_pro")),
            swing: fields::swing(&raw("swing")),
        }))
    }
}

/// Maps `player_photos_*.csv` rows; rows whose `photo_exists` flag is not true are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayerPhotoNormalizer;

impl Normalizer for PlayerPhotoNormalizer {
    fn normalize(&self, row: &RawRow) -> Normalized {
        if !fields::flag_is_true(&row.text("photo_exists").unwrap_or_default()) {
            return Normalized::Excluded;
        }
        let Some(espn_id) = row.text("player_id") else {
            return Normalized::Rejected("missing player_id".into());
        };
        let Some(player_name) = row.text("player_name") else {
            return Normalized::Rejected(format!("missing player_name (player_id {espn_id})"));
        };
        let Some(photo_url) = row.text("photo_url") else {
            return Normalized::Rejected(format!("missing photo_url for {player_name}"));
        };

        Normalized::Record(CanonicalRecord::PlayerPhoto(PlayerPhotoRecord {
            player_name,
            espn_id,
            photo_url,
            world_rank: fields::world_rank(&row.text("world_rank").unwrap_or_default()),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalization::normalize_all;
    use crate::records::{Swing, UNRANKED};

    fn bio(row: RawRow) -> PlayerBioRecord {
        match PlayerBioNormalizer.normalize(&row) {
            Normalized::Record(CanonicalRecord::PlayerBio(b)) => b,
            other => panic!("expected bio record, got {other:?}"),
        }
    }

    #[test]
    fn bio_row_is_cleaned() {
        let b = bio(RawRow::from([
            ("player_id", " 9478 "),
            ("player_name", "Scottie Scheffler"),
            ("country", "USA"),
            ("birthdate", "6/21/1996 (29)"),
            ("birthplace", "Ridgewood, NJ"),
            ("college", ""),
            ("height", "6' 3\""),
            ("weight", "200 lbs"),
            ("turned_pro", "2018"),
            ("swing", "Right"),
        ]));
        assert_eq!(b.espn_id, "9478");
        assert_eq!(b.birth_date.as_deref(), Some("6/21/1996"));
        assert_eq!(b.birth_place.as_deref(), Some("Ridgewood, NJ"));
        assert_eq!(b.college, None);
        assert_eq!(b.turned_pro, Some(2018));
        assert_eq!(b.swing, Some(Swing::Right));
    }

    #[test]
    fn bio_out_of_range_and_unknown_values_become_absent() {
        let b = bio(RawRow::from([
            ("player_id", "1"),
            ("player_name", "Old Tom"),
            ("turned_pro", "1899"),
            ("swing", "Switch"),
        ]));
        assert_eq!(b.turned_pro, None);
        assert_eq!(b.swing, None);

        let b = bio(RawRow::from([
            ("player_id", "2"),
            ("player_name", "New Tom"),
            ("turned_pro", "2010"),
        ]));
        assert_eq!(b.turned_pro, Some(2010));
    }

    #[test]
    fn bio_without_mandatory_fields_is_rejected() {
        let missing_id = RawRow::from([("player_id", ""), ("player_name", "Nobody")]);
        assert!(matches!(
            PlayerBioNormalizer.normalize(&missing_id),
            Normalized::Rejected(_)
        ));
        let missing_name = RawRow::from([("player_id", "77")]);
        assert!(matches!(
            PlayerBioNormalizer.normalize(&missing_name),
            Normalized::Rejected(r) if r.contains("77")
        ));
    }

    #[test]
    fn twenty_rows_with_three_rejects_forward_seventeen() {
        let mut rows = Vec::new();
        for i in 0..20 {
            let id = if i % 7 == 3 { String::new() } else { i.to_string() };
            rows.push(RawRow::from([
                ("player_id", id.as_str()),
                ("player_name", "Someone"),
            ]));
        }
        let set = normalize_all(&PlayerBioNormalizer, &rows);
        assert_eq!(set.records.len(), 17);
        assert_eq!(set.rejections.len(), 3);
        assert_eq!(set.rejections[0].row, 4);
    }

    #[test]
    fn photo_rows_are_gated_on_flag() {
        let row = RawRow::from([
            ("player_id", "3470"),
            ("player_name", "Rory McIlroy"),
            ("photo_url", "https://a.espncdn.com/3470.png"),
            ("photo_exists", "False"),
            ("world_rank", "2"),
        ]);
        assert_eq!(PlayerPhotoNormalizer.normalize(&row), Normalized::Excluded);
    }

    #[test]
    fn photo_rank_falls_back_to_sentinel() {
        let row = RawRow::from([
            ("player_id", "3470"),
            ("player_name", " Rory McIlroy "),
            ("photo_url", "https://a.espncdn.com/3470.png"),
            ("photo_exists", "TRUE"),
            ("world_rank", "n/a"),
        ]);
        match PlayerPhotoNormalizer.normalize(&row) {
            Normalized::Record(CanonicalRecord::PlayerPhoto(p)) => {
                assert_eq!(p.player_name, "Rory McIlroy");
                assert_eq!(p.world_rank, UNRANKED);
            }
            other => panic!("expected photo record, got {other:?}"),
        }
    }

    #[test]
    fn photo_requires_url() {
        let row = RawRow::from([
            ("player_id", "1"),
            ("player_name", "A"),
            ("photo_exists", "true"),
        ]);
        assert!(matches!(
            PlayerPhotoNormalizer.normalize(&row),
            Normalized::Rejected(_)
        ));
    }
}
