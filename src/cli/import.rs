use std::io::{stdin, stdout, IsTerminal, Write};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::convex::{ConvexClient, RemoteStore};
use crate::entity::{EntityKind, EntityProfile};
use crate::input::InputFormat;
use crate::normalization::{
    Normalizer, PlayerBioNormalizer, PlayerPhotoNormalizer, TournamentNormalizer,
};
use crate::orchestrator::{self, SyncOptions, SyncPlan, SyncReport};
use crate::sync::{stats, ERROR_DISPLAY_CAP};
use crate::util::env as env_util;

const REPORT_ROWS: usize = 5;

/// How the destructive clear is decided.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClearMode {
    /// Clear without asking.
    Always,
    Never,
    /// Ask on an interactive terminal; otherwise don't clear.
    #[default]
    Ask,
}

#[derive(Debug, Clone)]
pub struct ImportConfig {
    pub kind: EntityKind,
    /// Falls back to the profile's default file name in the working directory.
    pub input: Option<PathBuf>,
    /// Tournament seasons to import; empty means all.
    pub years: Vec<i64>,
    pub clear: ClearMode,
    pub fix_up: bool,
    pub batch_size: Option<NonZeroUsize>,
    /// Optional override for the remote endpoint.
    pub convex_url: Option<String>,
    pub no_stats: bool,
    pub stop: Option<Arc<AtomicBool>>,
}

impl ImportConfig {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            input: None,
            years: Vec::new(),
            clear: ClearMode::Never,
            fix_up: false,
            batch_size: None,
            convex_url: None,
            no_stats: false,
            stop: None,
        }
    }
}

/// Resolve the endpoint, run the import, and print the report to stdout.
pub async fn run(cfg: ImportConfig) -> Result<SyncReport> {
    env_util::init_env();
    let profile = cfg.kind.profile();

    let resolved = env_util::convex_url(cfg.convex_url.as_deref(), profile.allow_fallback_url)?;
    info!(
        entity = %cfg.kind,
        url = %resolved.url,
        source = ?resolved.source,
        "using remote endpoint"
    );
    let store = ConvexClient::new(
        resolved.url,
        env_util::convex_deploy_key(),
        env_util::convex_timeout(),
    )
    .context("failed to build HTTP client")?;

    let input = cfg
        .input
        .clone()
        .unwrap_or_else(|| PathBuf::from(profile.default_input));
    let (normalizer, format): (Box<dyn Normalizer>, InputFormat) = match cfg.kind {
        EntityKind::Tournament => (
            Box::new(TournamentNormalizer::with_years(cfg.years.iter().copied())),
            InputFormat::TournamentJson,
        ),
        EntityKind::PlayerBio => (Box::new(PlayerBioNormalizer), InputFormat::Csv),
        EntityKind::PlayerPhoto => (Box::new(PlayerPhotoNormalizer), InputFormat::Csv),
    };
    let plan = SyncPlan {
        profile,
        input,
        format,
        normalizer: normalizer.as_ref(),
    };
    // input problems stop the run before the prompt and before any remote call
    let prepared = orchestrator::prepare(&plan)?;

    let opts = SyncOptions {
        clear_confirmed: profile.clear_mutation.is_some() && confirm_clear(cfg.clear, &profile)?,
        post_process: cfg.fix_up && profile.post_process_mutation.is_some(),
        batch_size: cfg.batch_size,
        stop: cfg.stop.clone(),
    };

    let before = if cfg.kind == EntityKind::PlayerPhoto && !cfg.no_stats {
        report_step("photo status", stats::photo_status(&store).await)
    } else {
        None
    };
    if let Some(status) = &before {
        println!("\nCurrent status:\n{}", stats::render_photo_status(status));
    }

    let report = orchestrator::sync(&store, profile, prepared, &opts).await;
    print_report(&report);

    if !cfg.no_stats && !report.interrupted() {
        print_remote_stats(&store, cfg.kind, &report, before).await;
    }
    Ok(report)
}

fn print_report(report: &SyncReport) {
    println!("\n{}", report.summary.render(ERROR_DISPLAY_CAP));
    if report.excluded > 0 {
        println!("Rows without a usable photo: {}", report.excluded);
    }
    if let Some(cleared) = report.cleared {
        println!("Cleared before import: {}", cleared.deleted);
    }
    if let Some(err) = &report.clear_error {
        println!("Clear failed (import ran without it): {err}");
    }
    if let Some(fix) = &report.post_process {
        println!("Post-process updated: {}", fix.updated);
        for err in fix.errors.iter().take(ERROR_DISPLAY_CAP) {
            println!("  - {err}");
        }
    }
    if report.interrupted() {
        println!(
            "Interrupted: {} of {} batches left unsent",
            report.batches_remaining(),
            report.batches_total
        );
    }
    println!("Elapsed: {:.1}s", report.elapsed_ms as f64 / 1000.0);
}

async fn print_remote_stats(
    store: &dyn RemoteStore,
    kind: EntityKind,
    report: &SyncReport,
    before: Option<stats::PhotoStatus>,
) {
    match kind {
        EntityKind::Tournament => {
            let breakdown = stats::status_breakdown(&report.records);
            println!("{}", stats::render_status_breakdown(&breakdown));
            if let Some(years) = report_step("year summaries", stats::year_summaries(store).await) {
                println!("{}", stats::render_year_summaries(&years, REPORT_ROWS));
            }
            let recent = stats::recent_tournaments(store).await;
            if let Some(recent) = report_step("recent tournaments", recent) {
                println!("{}", stats::render_recent_tournaments(&recent, REPORT_ROWS));
            }
        }
        EntityKind::PlayerBio => {
            if let Some(c) = report_step("bio completeness", stats::bio_completeness(store).await) {
                println!("{}", stats::render_bio_completeness(&c, ERROR_DISPLAY_CAP));
            }
        }
        EntityKind::PlayerPhoto => {
            if let Some(after) = report_step("photo status", stats::photo_status(store).await) {
                println!("Final status:\n{}", stats::render_photo_status(&after));
                if let Some(before) = before {
                    println!("{}", stats::render_photo_diff(&before, &after));
                }
            }
        }
    }
}

/// Reporting never affects the outcome of a run.
fn report_step<T>(what: &str, res: Result<T>) -> Option<T> {
    match res {
        Ok(v) => Some(v),
        Err(err) => {
            warn!(report = what, error = %format!("{err:#}"), "reporting query failed");
            None
        }
    }
}

fn confirm_clear(mode: ClearMode, profile: &EntityProfile) -> Result<bool> {
    match mode {
        ClearMode::Always => Ok(true),
        ClearMode::Never => Ok(false),
        ClearMode::Ask if !stdin().is_terminal() => {
            info!(entity = %profile.kind, "stdin is not a terminal; keeping existing records");
            Ok(false)
        }
        ClearMode::Ask => {
            print!("Clear existing {} before import? (y/n): ", profile.noun);
            stdout().flush().context("failed to flush stdout")?;
            let mut answer = String::new();
            stdin()
                .read_line(&mut answer)
                .context("failed to read confirmation")?;
            Ok(is_yes(&answer))
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
