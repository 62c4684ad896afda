use std::fmt::{self, Write as _};

use crate::normalization::Rejection;

/// How many error lines a rendered summary prints.
pub const ERROR_DISPLAY_CAP: usize = 10;

/// Outcome of one remote batch call (or of one local rejection pass).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    pub attempted: u64,
    pub created: u64,
    pub updated: u64,
    pub skipped: u64,
    pub errors: Vec<String>,
}

impl BatchResult {
    /// The whole call failed: nothing succeeded, one synthetic error describes why.
    pub fn failed(attempted: usize, error: impl Into<String>) -> Self {
        Self {
            attempted: attempted as u64,
            errors: vec![error.into()],
            ..Self::default()
        }
    }

    /// Rows refused by the normalizer count as attempted and skipped.
    pub fn rejected(rejections: &[Rejection]) -> Self {
        let n = rejections.len() as u64;
        Self {
            attempted: n,
            skipped: n,
            ..Self::default()
        }
    }

    pub fn succeeded(&self) -> u64 {
        self.created + self.updated
    }
}

/// Run-level fold of every [`BatchResult`], in batch order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub attempted: u64,
    pub created: u64,
    pub updated: u64,
    pub skipped: u64,
    pub errors: Vec<String>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fold(mut self, result: BatchResult) -> Self {
        self.absorb(result);
        self
    }

    pub fn absorb(&mut self, result: BatchResult) {
        self.attempted += result.attempted;
        self.created += result.created;
        self.updated += result.updated;
        self.skipped += result.skipped;
        self.errors.extend(result.errors);
    }

    /// Counts plus at most `cap` verbatim error lines.
    pub fn render(&self, cap: usize) -> String {
        let rule = "=".repeat(50);
        let mut out = String::new();
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "IMPORT SUMMARY");
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "Records attempted: {}", self.attempted);
        let _ = writeln!(out, "Created: {}", self.created);
        let _ = writeln!(out, "Updated: {}", self.updated);
        let _ = writeln!(out, "Skipped: {}", self.skipped);
        let _ = writeln!(out, "Errors encountered: {}", self.errors.len());

        if !self.errors.is_empty() && cap > 0 {
            let shown = self.errors.len().min(cap);
            let _ = writeln!(out, "\nFirst {shown} errors:");
            for err in self.errors.iter().take(cap) {
                let _ = writeln!(out, "  - {err}");
            }
            if self.errors.len() > cap {
                let _ = writeln!(out, "  ... and {} more errors", self.errors.len() - cap);
            }
        }
        out
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(ERROR_DISPLAY_CAP))
    }
}
