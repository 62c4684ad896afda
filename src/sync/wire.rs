//! Tolerant decoding of remote batch/upsert responses.

use serde::{Deserialize, Deserializer};

/// Counts arrive as JSON numbers that may be floats (`3.0`); negatives and NaN clamp to 0.
pub(crate) fn count<'de, D>(d: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<f64>::deserialize(d)?;
    Ok(v.filter(|f| f.is_finite() && *f > 0.0)
        .map(|f| f.round() as u64)
        .unwrap_or(0))
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub(crate) enum ErrorEntry {
    Text(String),
    Detail {
        #[serde(rename = "playerName", alias = "name")]
        player_name: String,
        error: String,
    },
    Other(serde_json::Value),
}

impl ErrorEntry {
    pub(crate) fn describe(&self) -> String {
        match self {
            ErrorEntry::Text(s) => s.clone(),
            ErrorEntry::Detail { player_name, error } => format!("{player_name}: {error}"),
            ErrorEntry::Other(v) => v.to_string(),
        }
    }
}

/// `errors` is a list on most endpoints but a bare count next to `errorDetails` on others.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub(crate) enum ErrorsField {
    List(Vec<ErrorEntry>),
    Count(#[serde(deserialize_with = "count")] u64),
}

impl Default for ErrorsField {
    fn default() -> Self {
        ErrorsField::List(Vec::new())
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BatchResponse {
    #[serde(default, alias = "imported", deserialize_with = "count")]
    pub created: u64,
    #[serde(default, deserialize_with = "count")]
    pub updated: u64,
    #[serde(default, deserialize_with = "count")]
    pub skipped: u64,
    #[serde(default)]
    pub errors: ErrorsField,
    #[serde(default)]
    pub error_details: Vec<ErrorEntry>,
}

impl BatchResponse {
    /// Failed records as reported: the larger of the bare count and the listed entries.
    pub(crate) fn error_count(&self) -> u64 {
        let listed = match &self.errors {
            ErrorsField::List(list) => list.len(),
            ErrorsField::Count(_) => 0,
        } + self.error_details.len();
        match self.errors {
            ErrorsField::Count(n) => n.max(listed as u64),
            ErrorsField::List(_) => listed as u64,
        }
    }

    /// Error descriptions in response order; details win over a bare count.
    /// A bare count is padded with placeholders, never beyond `cap` entries.
    pub(crate) fn error_descriptions(&self, cap: usize) -> Vec<String> {
        let mut out: Vec<String> = match &self.errors {
            ErrorsField::List(list) => list.iter().map(ErrorEntry::describe).collect(),
            ErrorsField::Count(_) => Vec::new(),
        };
        out.extend(self.error_details.iter().map(ErrorEntry::describe));
        if let ErrorsField::Count(n) = self.errors {
            let wanted = usize::try_from(n).unwrap_or(usize::MAX).min(cap);
            if out.len() < wanted {
                let missing = wanted - out.len();
                out.extend((0..missing).map(|_| "unspecified record error".to_string()));
            }
        }
        out
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub(crate) struct UpsertResponse {
    pub action: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub(crate) struct ClearResponse {
    #[serde(default, deserialize_with = "count")]
    pub deleted: u64,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub(crate) struct FixupResponse {
    #[serde(default, deserialize_with = "count")]
    pub updated: u64,
    #[serde(default)]
    pub errors: Vec<ErrorEntry>,
}
