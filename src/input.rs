//! Input loading. Any failure here is fatal and happens before the first remote call.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::Value;
use tracing::{info, warn};

use crate::normalization::{RawRow, Rejection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Header-driven CSV, one entity per row.
    Csv,
    /// `{"tournaments": [...]}` (a bare array is accepted too).
    TournamentJson,
}

/// Rows in file order; rows that could not be read at all are reported as rejections
/// so they are counted as skipped.
#[derive(Debug, Clone, Default)]
pub struct LoadedInput {
    pub rows: Vec<RawRow>,
    pub unreadable: Vec<Rejection>,
}

pub fn load(path: &Path, format: InputFormat) -> Result<LoadedInput> {
    if !path.exists() {
        bail!("input file not found at {}", path.display());
    }
    let loaded = match format {
        InputFormat::Csv => load_csv(path)?,
        InputFormat::TournamentJson => load_tournament_json(path)?,
    };
    info!(
        path = %path.display(),
        rows = loaded.rows.len(),
        unreadable = loaded.unreadable.len(),
        "input loaded"
    );
    Ok(loaded)
}

fn load_csv(path: &Path) -> Result<LoadedInput> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::None)
        .from_path(path)
        .with_context(|| format!("failed to open CSV {}", path.display()))?;
    let headers = rdr
        .headers()
        .with_context(|| format!("failed to read CSV header from {}", path.display()))?
        .clone();

    let mut out = LoadedInput::default();
    for (idx, rec) in rdr.records().enumerate() {
        match rec {
            Ok(rec) => {
                // short rows simply lack the trailing columns
                let fields: HashMap<String, String> = headers
                    .iter()
                    .zip(rec.iter())
                    .map(|(h, v)| (h.trim().to_string(), v.to_string()))
                    .collect();
                out.rows.push(RawRow::from_strings(fields).at(idx + 1));
            }
            Err(err) => {
                warn!(row = idx + 1, error = %err, "skip unreadable CSV row");
                out.unreadable.push(Rejection {
                    row: idx + 1,
                    reason: format!("unreadable row: {err}"),
                });
            }
        }
    }
    Ok(out)
}

fn load_tournament_json(path: &Path) -> Result<LoadedInput> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let v: Value = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse JSON from {}", path.display()))?;

    let items = match v {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("tournaments") {
            Some(Value::Array(items)) => items,
            _ => bail!(
                "{}: expected a \"tournaments\" array at the top level",
                path.display()
            ),
        },
        _ => bail!("{}: expected a JSON object or array", path.display()),
    };

    let mut out = LoadedInput::default();
    for (idx, item) in items.into_iter().enumerate() {
        match item {
            Value::Object(fields) => out.rows.push(RawRow::new(fields).at(idx + 1)),
            other => out.unreadable.push(Rejection {
                row: idx + 1,
                reason: format!("expected an object, found {other}"),
            }),
        }
    }
    Ok(out)
}
