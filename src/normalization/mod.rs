//! Pure row → canonical record transformations, one normalizer per entity type.

pub mod fields;
pub mod player;
pub mod tournament;

use std::collections::HashMap;
use std::fmt;

use serde_json::{Map, Value};

use crate::records::CanonicalRecord;

pub use player::{PlayerBioNormalizer, PlayerPhotoNormalizer};
pub use tournament::TournamentNormalizer;

/// One input row as read from CSV or JSON, before any validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    fields: Map<String, Value>,
    /// 1-based position in the input file, counting unreadable rows too.
    position: Option<usize>,
}

impl RawRow {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self {
            fields,
            position: None,
        }
    }

    /// Wrap a CSV row; every cell becomes a JSON string.
    pub fn from_strings(fields: HashMap<String, String>) -> Self {
        Self::new(
            fields
                .into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect(),
        )
    }

    pub fn at(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }

    pub fn position(&self) -> Option<usize> {
        self.position
    }

    /// Trimmed text value; `None` for missing, null, or blank cells.
    /// Numbers and booleans are rendered in their JSON form.
    pub fn text(&self, field: &str) -> Option<String> {
        let s = match self.fields.get(field)? {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => return None,
        };
        (!s.is_empty()).then_some(s)
    }

    /// Integer value from either a JSON integer, an integral float, or a numeric string.
    pub fn integer(&self, field: &str) -> Option<i64> {
        match self.fields.get(field)? {
            Value::Number(n) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                    .map(|f| f as i64)
            }),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn number(&self, field: &str) -> Option<f64> {
        match self.fields.get(field)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
            _ => None,
        }
    }
}

impl<const N: usize> From<[(&str, &str); N]> for RawRow {
    fn from(pairs: [(&str, &str); N]) -> Self {
        Self::new(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
                .collect(),
        )
    }
}

/// Why a row was refused before reaching the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// 1-based position in the input.
    pub row: usize,
    pub reason: String,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: {}", self.row, self.reason)
    }
}

/// Outcome of normalizing a single row.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    Record(CanonicalRecord),
    /// Mandatory data missing; counted as skipped.
    Rejected(String),
    /// Filtered out by a gate (flag column, year filter); not counted anywhere.
    Excluded,
}

pub trait Normalizer {
    fn normalize(&self, row: &RawRow) -> Normalized;
}

/// Result of running a normalizer over a full input set, in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedSet {
    pub records: Vec<CanonicalRecord>,
    pub rejections: Vec<Rejection>,
    pub excluded: usize,
}

/// Rejections carry the row's input position, or its index here when it has none.
pub fn normalize_all(normalizer: &dyn Normalizer, rows: &[RawRow]) -> NormalizedSet {
    let mut out = NormalizedSet::default();
    for (idx, row) in rows.iter().enumerate() {
        match normalizer.normalize(row) {
            Normalized::Record(rec) => out.records.push(rec),
            Normalized::Rejected(reason) => out.rejections.push(Rejection {
                row: row.position().unwrap_or(idx + 1),
                reason,
            }),
            Normalized::Excluded => out.excluded += 1,
        }
    }
    out
}
