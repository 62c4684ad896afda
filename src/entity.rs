use std::fmt;
use std::time::Duration;

/// What to do when a whole-batch call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Report the batch as failed and move on.
    BatchOnly,
    /// Retry each record of the failed batch against the single-record endpoint.
    PerRecord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Tournament,
    PlayerBio,
    PlayerPhoto,
}

/// Fixed remote wiring and pacing for one entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityProfile {
    pub kind: EntityKind,
    /// Plural noun used in progress lines.
    pub noun: &'static str,
    pub batch_size: usize,
    pub batch_mutation: &'static str,
    /// Argument key the batch mutation expects the record array under.
    pub batch_arg: &'static str,
    pub single_mutation: Option<&'static str>,
    pub clear_mutation: Option<&'static str>,
    pub post_process_mutation: Option<&'static str>,
    pub fallback: FallbackPolicy,
    pub inter_batch_pause: Option<Duration>,
    /// Whether the hardcoded endpoint may be used when nothing is configured.
    pub allow_fallback_url: bool,
    pub default_input: &'static str,
}

pub const TOURNAMENTS: EntityProfile = EntityProfile {
    kind: EntityKind::Tournament,
    noun: "tournaments",
    batch_size: 50,
    batch_mutation: "tournaments:importTournamentsBatch",
    batch_arg: "tournaments",
    single_mutation: None,
    clear_mutation: Some("tournaments:clearTournaments"),
    post_process_mutation: Some("tournaments:fix2026TournamentData"),
    fallback: FallbackPolicy::BatchOnly,
    inter_batch_pause: None,
    allow_fallback_url: true,
    default_input: "pga_tour_schedules_playwright_2015_2026.json",
};

pub const PLAYER_BIOS: EntityProfile = EntityProfile {
    kind: EntityKind::PlayerBio,
    noun: "players",
    batch_size: 20,
    batch_mutation: "playerBios:updatePlayerBiosBatch",
    batch_arg: "players",
    single_mutation: None,
    clear_mutation: None,
    post_process_mutation: None,
    fallback: FallbackPolicy::BatchOnly,
    inter_batch_pause: None,
    allow_fallback_url: true,
    default_input: "player_bios_all_200.csv",
};

pub const PLAYER_PHOTOS: EntityProfile = EntityProfile {
    kind: EntityKind::PlayerPhoto,
    noun: "players",
    batch_size: 25,
    batch_mutation: "playerPhotos:updatePlayerPhotosBatch",
    batch_arg: "players",
    single_mutation: Some("playerPhotos:updatePlayerPhoto"),
    clear_mutation: None,
    post_process_mutation: None,
    fallback: FallbackPolicy::PerRecord,
    inter_batch_pause: Some(Duration::from_millis(500)),
    allow_fallback_url: false,
    default_input: "player_photos_all_200.csv",
};

impl EntityKind {
    pub fn profile(self) -> EntityProfile {
        match self {
            EntityKind::Tournament => TOURNAMENTS,
            EntityKind::PlayerBio => PLAYER_BIOS,
            EntityKind::PlayerPhoto => PLAYER_PHOTOS,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::Tournament => "tournament",
            EntityKind::PlayerBio => "player-bio",
            EntityKind::PlayerPhoto => "player-photo",
        })
    }
}
