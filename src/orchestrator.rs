//! Per-entity import pipeline:
//! load → normalize → (clear) → batch → send/fold → (post-process).
//!
//! Rendering and read-only statistics are left to the caller so the pipeline itself
//! can be driven from tests without a terminal.

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{error, info, warn};

use crate::convex::RemoteStore;
use crate::entity::EntityProfile;
use crate::input::{self, InputFormat};
use crate::normalization::{normalize_all, Normalizer, Rejection};
use crate::records::CanonicalRecord;
use crate::sync::{batches, BatchResult, ClearOutcome, PostProcessOutcome, RunSummary, SyncClient};

/// How many names of a batch are echoed in its progress line.
const PREVIEW_NAMES: usize = 5;

pub struct SyncPlan<'a> {
    pub profile: EntityProfile,
    pub input: PathBuf,
    pub format: InputFormat,
    pub normalizer: &'a dyn Normalizer,
}

#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Operator has explicitly confirmed the destructive clear.
    pub clear_confirmed: bool,
    pub post_process: bool,
    /// Operator override of the profile's batch size.
    pub batch_size: Option<NonZeroUsize>,
    /// Checked between batches; once set no further batch is sent.
    pub stop: Option<Arc<AtomicBool>>,
}

#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub summary: RunSummary,
    /// Records that passed normalization, in input order.
    pub records: Vec<CanonicalRecord>,
    pub rejections: Vec<Rejection>,
    pub excluded: usize,
    pub cleared: Option<ClearOutcome>,
    pub clear_error: Option<String>,
    pub post_process: Option<PostProcessOutcome>,
    pub batches_total: usize,
    pub batches_sent: usize,
    pub elapsed_ms: i64,
}

impl SyncReport {
    pub fn interrupted(&self) -> bool {
        self.batches_sent < self.batches_total
    }

    pub fn batches_remaining(&self) -> usize {
        self.batches_total - self.batches_sent
    }
}

/// Input that has been loaded and normalized, ready to sync. Building one never
/// touches the remote store.
#[derive(Debug, Clone, Default)]
pub struct Prepared {
    pub records: Vec<CanonicalRecord>,
    pub rejections: Vec<Rejection>,
    pub excluded: usize,
}

/// Load and normalize the plan's input. Any failure here is fatal.
pub fn prepare(plan: &SyncPlan<'_>) -> Result<Prepared> {
    let profile = plan.profile;
    let loaded = input::load(&plan.input, plan.format)
        .with_context(|| format!("cannot import {}", profile.kind))?;
    let mut set = normalize_all(plan.normalizer, &loaded.rows);
    set.rejections.extend(loaded.unreadable);
    set.rejections.sort_by_key(|r| r.row);
    for r in &set.rejections {
        info!(entity = %profile.kind, row = r.row, reason = %r.reason, "skipping row");
    }
    info!(
        entity = %profile.kind,
        forwarded = set.records.len(),
        rejected = set.rejections.len(),
        excluded = set.excluded,
        "normalized input"
    );
    Ok(Prepared {
        records: set.records,
        rejections: set.rejections,
        excluded: set.excluded,
    })
}

/// Run one full import. Only input problems are returned as errors; every remote
/// failure is folded into the report.
pub async fn run(
    store: &dyn RemoteStore,
    plan: &SyncPlan<'_>,
    opts: &SyncOptions,
) -> Result<SyncReport> {
    let prepared = prepare(plan)?;
    Ok(sync(store, plan.profile, prepared, opts).await)
}

/// Send prepared records: (clear) → batch → send/fold → (post-process).
pub async fn sync(
    store: &dyn RemoteStore,
    profile: EntityProfile,
    prepared: Prepared,
    opts: &SyncOptions,
) -> SyncReport {
    let started = Utc::now();
    let Prepared {
        records,
        rejections,
        excluded,
    } = prepared;

    let mut report = SyncReport {
        summary: RunSummary::new().fold(BatchResult::rejected(&rejections)),
        rejections,
        excluded,
        ..SyncReport::default()
    };
    let client = SyncClient::new(store, profile);

    if opts.clear_confirmed && stop_requested(opts) {
        warn!(entity = %profile.kind, "stop requested; skipping clear");
    } else if opts.clear_confirmed {
        match client.clear().await {
            Ok(outcome) => {
                info!(entity = %profile.kind, deleted = outcome.deleted, "cleared existing records");
                report.cleared = Some(outcome);
            }
            Err(err) => {
                error!(
                    entity = %profile.kind,
                    error = %format!("{err:#}"),
                    "clear failed; importing without it"
                );
                report.clear_error = Some(format!("{err:#}"));
            }
        }
    }

    let size = opts
        .batch_size
        .or_else(|| NonZeroUsize::new(profile.batch_size))
        .unwrap_or(NonZeroUsize::MIN);
    let planned = batches(&records, size);
    report.batches_total = planned.len();

    for batch in &planned {
        if stop_requested(opts) {
            warn!(
                entity = %profile.kind,
                remaining = planned.len() - report.batches_sent,
                "stop requested; remaining batches not sent"
            );
            break;
        }
        let mut names: Vec<&str> = batch
            .records
            .iter()
            .take(PREVIEW_NAMES)
            .map(CanonicalRecord::display_name)
            .collect();
        let more = batch.len().saturating_sub(PREVIEW_NAMES);
        let more_label = format!("... and {more} more");
        if more > 0 {
            names.push(&more_label);
        }
        info!(
            "Processing batch {}/{} ({} {}): {}",
            batch.number,
            batch.total,
            batch.len(),
            profile.noun,
            names.join(", ")
        );

        let result = client.send(batch.records).await;
        info!(
            batch = batch.number,
            created = result.created,
            updated = result.updated,
            skipped = result.skipped,
            errors = result.errors.len(),
            "batch done"
        );
        for err in result.errors.iter().take(PREVIEW_NAMES) {
            warn!(batch = batch.number, "{err}");
        }
        report.summary.absorb(result);
        report.batches_sent += 1;

        if let Some(pause) = profile.inter_batch_pause {
            if !batch.is_last() {
                tokio::time::sleep(pause).await;
            }
        }
    }

    if opts.post_process && !report.interrupted() {
        let outcome = client.post_process().await;
        info!(
            entity = %profile.kind,
            updated = outcome.updated,
            errors = outcome.errors.len(),
            "post-process finished"
        );
        report.post_process = Some(outcome);
    }

    report.records = records;
    report.elapsed_ms = (Utc::now() - started).num_milliseconds();
    report
}

fn stop_requested(opts: &SyncOptions) -> bool {
    opts.stop
        .as_ref()
        .is_some_and(|flag| flag.load(Ordering::SeqCst))
}
