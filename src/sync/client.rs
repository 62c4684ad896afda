use anyhow::{bail, Context, Result};
use serde_json::{json, Value};
use tracing::{info, warn};

use super::summary::BatchResult;
use super::wire::{BatchResponse, ClearResponse, FixupResponse, UpsertResponse};
use crate::convex::RemoteStore;
use crate::entity::{EntityProfile, FallbackPolicy};
use crate::records::CanonicalRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearOutcome {
    pub deleted: u64,
}

/// Result of the remote fix-up pass; failures land in `errors`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostProcessOutcome {
    pub updated: u64,
    pub errors: Vec<String>,
}

/// Sends batches of one entity type to the remote store and turns every outcome,
/// including transport failures, into a [`BatchResult`].
pub struct SyncClient<'a> {
    store: &'a dyn RemoteStore,
    profile: EntityProfile,
}

impl<'a> SyncClient<'a> {
    pub fn new(store: &'a dyn RemoteStore, profile: EntityProfile) -> Self {
        Self { store, profile }
    }

    /// Upsert one batch. Never fails: problems are reported inside the result.
    pub async fn send(&self, batch: &[CanonicalRecord]) -> BatchResult {
        match self.send_batch(batch).await {
            Ok(result) => result,
            Err(err) => {
                let reason = format!("{err:#}");
                match (self.profile.fallback, self.profile.single_mutation) {
                    (FallbackPolicy::PerRecord, Some(single)) => {
                        warn!(
                            entity = %self.profile.kind,
                            records = batch.len(),
                            error = %reason,
                            "batch call failed; retrying records individually"
                        );
                        self.send_each(single, batch).await
                    }
                    _ => {
                        warn!(
                            entity = %self.profile.kind,
                            records = batch.len(),
                            error = %reason,
                            "batch call failed"
                        );
                        BatchResult::failed(
                            batch.len(),
                            format!("batch of {} failed: {reason}", batch.len()),
                        )
                    }
                }
            }
        }
    }

    async fn send_batch(&self, batch: &[CanonicalRecord]) -> Result<BatchResult> {
        let records = serde_json::to_value(batch).context("failed to encode batch")?;
        let mut args = serde_json::Map::new();
        args.insert(self.profile.batch_arg.to_string(), records);

        let value = self
            .store
            .mutation(self.profile.batch_mutation, Value::Object(args))
            .await?;
        let resp: BatchResponse = serde_json::from_value(value)
            .with_context(|| format!("{}: unexpected response shape", self.profile.batch_mutation))?;

        // skipped and errors may describe the same records, so each is bounded separately
        let succeeded = resp.created.saturating_add(resp.updated);
        let accounted = succeeded
            .saturating_add(resp.skipped)
            .max(succeeded.saturating_add(resp.error_count()));
        if accounted > batch.len() as u64 {
            bail!(
                "{}: remote reported {accounted} outcomes for {} records",
                self.profile.batch_mutation,
                batch.len()
            );
        }
        Ok(BatchResult {
            attempted: batch.len() as u64,
            created: resp.created,
            updated: resp.updated,
            skipped: resp.skipped,
            errors: resp.error_descriptions(batch.len()),
        })
    }

    /// Degraded path: one call per record so a single bad record cannot sink its batch-mates.
    async fn send_each(&self, single: &str, batch: &[CanonicalRecord]) -> BatchResult {
        let mut result = BatchResult {
            attempted: batch.len() as u64,
            ..BatchResult::default()
        };
        for record in batch {
            match self.upsert_one(single, record).await {
                Ok(action) if action == "updated" => result.updated += 1,
                Ok(_) => result.created += 1,
                Err(err) => result
                    .errors
                    .push(format!("{}: {err:#}", record.display_name())),
            }
        }
        info!(
            entity = %self.profile.kind,
            succeeded = result.succeeded(),
            failed = result.errors.len(),
            "per-record fallback finished"
        );
        result
    }

    async fn upsert_one(&self, single: &str, record: &CanonicalRecord) -> Result<String> {
        let args = serde_json::to_value(record).context("failed to encode record")?;
        let value = self.store.mutation(single, args).await?;
        let resp: UpsertResponse = serde_json::from_value(value)
            .with_context(|| format!("{single}: unexpected response shape"))?;
        Ok(resp.action)
    }

    /// Delete every stored record of this entity type. Destructive and unconditional.
    pub async fn clear(&self) -> Result<ClearOutcome> {
        let Some(path) = self.profile.clear_mutation else {
            bail!("{} records cannot be cleared", self.profile.kind);
        };
        let value = self.store.mutation(path, json!({})).await?;
        let resp: ClearResponse =
            serde_json::from_value(value).with_context(|| format!("{path}: unexpected response shape"))?;
        Ok(ClearOutcome {
            deleted: resp.deleted,
        })
    }

    /// Run the remote corrective pass. Failures are reported, never propagated.
    pub async fn post_process(&self) -> PostProcessOutcome {
        let Some(path) = self.profile.post_process_mutation else {
            return PostProcessOutcome {
                updated: 0,
                errors: vec![format!("{} has no post-process step", self.profile.kind)],
            };
        };
        let decoded = match self.store.mutation(path, json!({})).await {
            Ok(value) => serde_json::from_value::<FixupResponse>(value)
                .with_context(|| format!("{path}: unexpected response shape")),
            Err(err) => Err(err),
        };
        match decoded {
            Ok(resp) => PostProcessOutcome {
                updated: resp.updated,
                errors: resp.errors.iter().map(|e| e.describe()).collect(),
            },
            Err(err) => PostProcessOutcome {
                updated: 0,
                errors: vec![format!("{path} failed: {err:#}")],
            },
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory stand-in for the remote store.

    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    use anyhow::{anyhow, Result};
    use serde_json::{json, Value};

    use crate::convex::RemoteStore;

    /// Upserts by natural key (`tournament_id` / `espnId`) and returns the same
    /// response shapes the real endpoints do. Failures are scripted per path or per key.
    #[derive(Default)]
    pub struct FakeStore {
        pub rows: Mutex<HashMap<String, Value>>,
        pub calls: Mutex<Vec<String>>,
        pub fail_paths: HashSet<String>,
        pub poison_keys: HashSet<String>,
    }

    impl FakeStore {
        pub fn failing(paths: &[&str]) -> Self {
            Self {
                fail_paths: paths.iter().map(|p| p.to_string()).collect(),
                ..Self::default()
            }
        }

        pub fn poison(mut self, keys: &[&str]) -> Self {
            self.poison_keys = keys.iter().map(|k| k.to_string()).collect();
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn key_of(record: &Value) -> String {
            record
                .get("tournament_id")
                .or_else(|| record.get("espnId"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        }

        fn upsert(&self, record: &Value) -> Result<&'static str> {
            let key = Self::key_of(record);
            if self.poison_keys.contains(&key) {
                return Err(anyhow!("validation failed for {key}"));
            }
            let mut rows = self.rows.lock().unwrap();
            let action = if rows.contains_key(&key) { "updated" } else { "created" };
            rows.insert(key, record.clone());
            Ok(action)
        }
    }

    #[async_trait::async_trait]
    impl RemoteStore for FakeStore {
        async fn mutation(&self, path: &str, args: Value) -> Result<Value> {
            self.calls.lock().unwrap().push(path.to_string());
            if self.fail_paths.contains(path) {
                return Err(anyhow!("{path} failed: HTTP 504 Gateway Timeout"));
            }
            match path {
                "tournaments:importTournamentsBatch" => {
                    let (mut imported, mut updated) = (0, 0);
                    let mut errors = Vec::new();
                    let batch = args["tournaments"].as_array().cloned().unwrap_or_default();
                    for rec in &batch {
                        match self.upsert(rec) {
                            Ok("created") => imported += 1,
                            Ok(_) => updated += 1,
                            Err(e) => errors.push(e.to_string()),
                        }
                    }
                    Ok(json!({
                        "imported": imported,
                        "updated": updated,
                        "total": batch.len(),
                        "errors": errors
                    }))
                }
                "playerPhotos:updatePlayerPhotosBatch" => {
                    let (mut created, mut updated) = (0, 0);
                    let mut details = Vec::new();
                    for rec in args["players"].as_array().cloned().unwrap_or_default() {
                        match self.upsert(&rec) {
                            Ok("created") => created += 1,
                            Ok(_) => updated += 1,
                            Err(e) => details.push(json!({
                                "playerName": rec["playerName"],
                                "error": e.to_string()
                            })),
                        }
                    }
                    Ok(json!({
                        "processed": created + updated,
                        "created": created,
                        "updated": updated,
                        "errors": details.len(),
                        "errorDetails": details
                    }))
                }
                "playerBios:updatePlayerBiosBatch" => {
                    let mut updated = 0;
                    let mut errors = Vec::new();
                    for rec in args["players"].as_array().cloned().unwrap_or_default() {
                        match self.upsert(&rec) {
                            Ok(_) => updated += 1,
                            Err(e) => errors.push(e.to_string()),
                        }
                    }
                    let skipped = errors.len();
                    Ok(json!({"updated": updated, "skipped": skipped, "errors": errors}))
                }
                "playerPhotos:updatePlayerPhoto" => {
                    let action = self.upsert(&args)?;
                    Ok(json!({"success": true, "action": action}))
                }
                "tournaments:clearTournaments" => {
                    let mut rows = self.rows.lock().unwrap();
                    let deleted = rows.len();
                    rows.clear();
                    Ok(json!({"deleted": deleted}))
                }
                "tournaments:fix2026TournamentData" => {
                    let rows = self.rows.lock().unwrap();
                    let updated = rows.values().filter(|r| r["year"] == 2026).count();
                    Ok(json!({"totalTournaments": updated, "updated": updated, "errors": []}))
                }
                other => Err(anyhow!("unknown function {other}")),
            }
        }

        async fn query(&self, path: &str, _args: Value) -> Result<Value> {
            self.calls.lock().unwrap().push(path.to_string());
            Err(anyhow!("no query fixture for {path}"))
        }
    }
}
