//! Read-only reporting around an import: remote completeness snapshots and a local
//! status breakdown. Nothing here influences what gets written.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::json;

use super::wire::count;
use crate::convex::RemoteStore;
use crate::normalization::tournament::{STATUS_COMPLETED, STATUS_SCHEDULED};
use crate::records::CanonicalRecord;

const YEAR_SUMMARIES: &str = "tournaments:getYearSummaries";
const RECENT_TOURNAMENTS: &str = "tournaments:getRecentTournaments";
const BIO_COMPLETENESS: &str = "playerBios:checkBioCompleteness";
const PHOTO_STATUS: &str = "playerPhotos:getPhotoUpdateStatus";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct YearSummary {
    #[serde(deserialize_with = "count")]
    pub year: u64,
    #[serde(default, deserialize_with = "count")]
    pub total_tournaments: u64,
    #[serde(default, deserialize_with = "count")]
    pub completed_tournaments: u64,
    #[serde(default)]
    pub total_prize_money: f64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RecentTournament {
    #[serde(deserialize_with = "count")]
    pub year: u64,
    pub name: String,
    #[serde(default)]
    pub winner_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BioCompleteness {
    #[serde(default, deserialize_with = "count")]
    pub total: u64,
    #[serde(default, deserialize_with = "count")]
    pub with_birth_date: u64,
    #[serde(default, deserialize_with = "count")]
    pub with_birth_place: u64,
    #[serde(default, deserialize_with = "count")]
    pub with_college: u64,
    #[serde(default, deserialize_with = "count")]
    pub with_height: u64,
    #[serde(default, deserialize_with = "count")]
    pub with_weight: u64,
    #[serde(default, deserialize_with = "count")]
    pub with_turned_pro: u64,
    #[serde(default, deserialize_with = "count")]
    pub with_swing: u64,
    #[serde(default, deserialize_with = "count")]
    pub complete: u64,
    #[serde(default)]
    pub incomplete: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PhotoStatus {
    #[serde(default, deserialize_with = "count")]
    pub total_players: u64,
    #[serde(default, deserialize_with = "count")]
    pub players_with_photos: u64,
    #[serde(default, deserialize_with = "count")]
    pub players_with_espn_id: u64,
    #[serde(default, deserialize_with = "count")]
    pub players_with_world_ranking: u64,
    #[serde(default, deserialize_with = "count")]
    pub missing_photos: u64,
}

pub async fn year_summaries(store: &dyn RemoteStore) -> Result<Vec<YearSummary>> {
    let value = store.query(YEAR_SUMMARIES, json!({})).await?;
    serde_json::from_value(value).with_context(|| format!("{YEAR_SUMMARIES}: unexpected shape"))
}

pub async fn recent_tournaments(store: &dyn RemoteStore) -> Result<Vec<RecentTournament>> {
    let value = store.query(RECENT_TOURNAMENTS, json!({})).await?;
    serde_json::from_value(value)
        .with_context(|| format!("{RECENT_TOURNAMENTS}: unexpected shape"))
}

/// The completeness check is exposed as a mutation on the remote side.
pub async fn bio_completeness(store: &dyn RemoteStore) -> Result<BioCompleteness> {
    let value = store.mutation(BIO_COMPLETENESS, json!({})).await?;
    serde_json::from_value(value).with_context(|| format!("{BIO_COMPLETENESS}: unexpected shape"))
}

pub async fn photo_status(store: &dyn RemoteStore) -> Result<PhotoStatus> {
    let value = store.query(PHOTO_STATUS, json!({})).await?;
    serde_json::from_value(value).with_context(|| format!("{PHOTO_STATUS}: unexpected shape"))
}

pub fn render_year_summaries(summaries: &[YearSummary], limit: usize) -> String {
    let mut out = String::from("Tournaments by Year:\n");
    for s in summaries.iter().take(limit) {
        let _ = writeln!(
            out,
            "  {}: {} tournaments, {} completed, ${:.1}M prize money",
            s.year,
            s.total_tournaments,
            s.completed_tournaments,
            s.total_prize_money / 1_000_000.0
        );
    }
    out
}

pub fn render_recent_tournaments(recent: &[RecentTournament], limit: usize) -> String {
    let mut out = String::from("Most recent completed tournaments:\n");
    for t in recent.iter().take(limit) {
        let winner = t.winner_name.as_deref().filter(|w| !w.is_empty()).unwrap_or("TBD");
        let _ = writeln!(out, "  {} {}: Winner - {}", t.year, t.name, winner);
    }
    out
}

pub fn render_bio_completeness(c: &BioCompleteness, limit: usize) -> String {
    let mut out = String::from("Bio Completeness Report:\n");
    let _ = writeln!(out, "  Total players: {}", c.total);
    let _ = writeln!(out, "  With birth date: {}", c.with_birth_date);
    let _ = writeln!(out, "  With birth place: {}", c.with_birth_place);
    let _ = writeln!(out, "  With college: {}", c.with_college);
    let _ = writeln!(out, "  With height: {}", c.with_height);
    let _ = writeln!(out, "  With weight: {}", c.with_weight);
    let _ = writeln!(out, "  With turned pro: {}", c.with_turned_pro);
    let _ = writeln!(out, "  With swing: {}", c.with_swing);
    let _ = writeln!(out, "  Complete profiles: {}", c.complete);
    if !c.incomplete.is_empty() {
        let _ = writeln!(out, "\nPlayers with incomplete bios (first {limit}):");
        for name in c.incomplete.iter().take(limit) {
            let _ = writeln!(out, "    - {name}");
        }
    }
    out
}

pub fn render_photo_status(s: &PhotoStatus) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total Players: {}", s.total_players);
    let _ = writeln!(out, "Players with Photos: {}", s.players_with_photos);
    let _ = writeln!(out, "Players with ESPN ID: {}", s.players_with_espn_id);
    let _ = writeln!(out, "Players with World Ranking: {}", s.players_with_world_ranking);
    let _ = writeln!(out, "Missing Photos: {}", s.missing_photos);
    out
}

/// Before/after difference; counts that went down show as negative.
pub fn render_photo_diff(before: &PhotoStatus, after: &PhotoStatus) -> String {
    let delta = |a: u64, b: u64| b as i64 - a as i64;
    let mut out = String::from("Changes:\n");
    let _ = writeln!(
        out,
        "  Photos added: {}",
        delta(before.players_with_photos, after.players_with_photos)
    );
    let _ = writeln!(
        out,
        "  ESPN IDs added: {}",
        delta(before.players_with_espn_id, after.players_with_espn_id)
    );
    let _ = writeln!(
        out,
        "  Rankings added: {}",
        delta(before.players_with_world_ranking, after.players_with_world_ranking)
    );
    out
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub completed: usize,
    pub scheduled: usize,
}

/// Completed/scheduled split per season among the tournaments that were sent.
pub fn status_breakdown(records: &[CanonicalRecord]) -> BTreeMap<i64, StatusCounts> {
    let mut out: BTreeMap<i64, StatusCounts> = BTreeMap::new();
    for rec in records {
        if let CanonicalRecord::Tournament(t) = rec {
            let entry = out.entry(t.year).or_default();
            match t.status.as_str() {
                STATUS_COMPLETED => entry.completed += 1,
                STATUS_SCHEDULED => entry.scheduled += 1,
                _ => {}
            }
        }
    }
    out
}

pub fn render_status_breakdown(breakdown: &BTreeMap<i64, StatusCounts>) -> String {
    let mut out = String::from("Status breakdown:\n");
    for (year, c) in breakdown {
        let _ = writeln!(out, "  {year}: {} completed, {} scheduled", c.completed, c.scheduled);
    }
    out
}
