use std::collections::BTreeSet;

use super::{Normalized, Normalizer, RawRow};
use crate::records::{CanonicalRecord, TournamentRecord};

pub const STATUS_COMPLETED: &str = "completed";
pub const STATUS_SCHEDULED: &str = "scheduled";

/// Maps schedule-scraper tournament objects onto the tournament schema.
///
/// Winner fields survive only on completed events and previous-winner fields only on
/// scheduled ones; the scraper fills both kinds regardless of status.
#[derive(Debug, Clone, Default)]
pub struct TournamentNormalizer {
    years: Option<BTreeSet<i64>>,
}

impl TournamentNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only tournaments whose season is in `years`. An empty set keeps everything.
    pub fn with_years(years: impl IntoIterator<Item = i64>) -> Self {
        let years: BTreeSet<i64> = years.into_iter().collect();
        Self {
            years: (!years.is_empty()).then_some(years),
        }
    }
}

impl Normalizer for TournamentNormalizer {
    fn normalize(&self, row: &RawRow) -> Normalized {
        let Some(tournament_id) = row.text("tournament_id") else {
            return Normalized::Rejected("missing tournament_id".into());
        };
        let Some(name) = row.text("name") else {
            return Normalized::Rejected(format!("missing name (tournament_id {tournament_id})"));
        };
        let Some(year) = row.integer("year") else {
            return Normalized::Rejected(format!("missing or non-integer year for {name}"));
        };
        if let Some(years) = &self.years {
            if !years.contains(&year) {
                return Normalized::Excluded;
            }
        }
        let Some(status) = row.text("status") else {
            return Normalized::Rejected(format!("missing status for {name} ({year})"));
        };
        let Some(scraped_at) = row.text("scraped_at") else {
            return Normalized::Rejected(format!("missing scraped_at for {name} ({year})"));
        };

        let completed = status == STATUS_COMPLETED;
        let scheduled = status == STATUS_SCHEDULED;
        let when = |keep: bool, v: Option<String>| v.filter(|_| keep);

        Normalized::Record(CanonicalRecord::Tournament(TournamentRecord {
            dates_raw: row.text("dates_raw"),
            start_date: row.text("start_date"),
            end_date: row.text("end_date"),
            espn_tournament_id: row.text("espn_tournament_id"),
            espn_leaderboard_url: row.text("espn_leaderboard_url"),
            prize_money: row.number("prize_money").filter(|m| *m > 0.0),
            winner_name: when(completed, row.text("winner_name")),
            winner_espn_id: row.integer("winner_espn_id").filter(|_| completed),
            winner_profile_url: when(completed, row.text("winner_profile_url")),
            winning_score: when(completed, row.text("winning_score")),
            previous_winner_name: when(scheduled, row.text("previous_winner_name")),
            previous_winner_espn_id: row.integer("previous_winner_espn_id").filter(|_| scheduled),
            previous_winner_profile_url: when(scheduled, row.text("previous_winner_profile_url")),
            tournament_id,
            name,
            year,
            status,
            scraped_at,
        }))
    }
}
