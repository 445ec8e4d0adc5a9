//! Per-batch decision counts.
//!
//! [`BatchSummary`] is what the CLI prints after a run: how many features
//! were analyzed, how they split across the three decisions and how many
//! input rows were skipped.

use std::fmt;

use crate::verdict::{Decision, FinalVerdict};

// ---------------------------------------------------------------------------
// BatchSummary
// ---------------------------------------------------------------------------

/// Decision tally for one batch.
///
/// `total` counts analyzed features only; skipped rows are tracked
/// separately and never reach the analyzer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub yes: usize,
    pub no: usize,
    pub needs_review: usize,
    pub skipped: usize,
}

impl BatchSummary {
    /// Count one analyzed feature.
    pub fn record(&mut self, decision: Decision) {
        self.total += 1;
        match decision {
            Decision::Yes => self.yes += 1,
            Decision::No => self.no += 1,
            Decision::NeedsReview => self.needs_review += 1,
        }
    }

    /// Count one rejected input row.
    pub fn record_skipped(&mut self) {
        self.skipped += 1;
    }

    /// Tally a slice of verdicts.
    ///
    /// ```
    /// use geo_compliance::pipeline::BatchSummary;
    ///
    /// let summary = BatchSummary::from_verdicts(&[]);
    /// assert_eq!(summary.total, 0);
    /// ```
    pub fn from_verdicts(verdicts: &[FinalVerdict]) -> Self {
        let mut summary = Self::default();
        for verdict in verdicts {
            summary.record(verdict.decision);
        }
        summary
    }

    /// Count for a single decision.
    pub fn count(&self, decision: Decision) -> usize {
        match decision {
            Decision::Yes => self.yes,
            Decision::No => self.no,
            Decision::NeedsReview => self.needs_review,
        }
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total features analyzed: {}", self.total)?;
        writeln!(f, "Features needing compliance: {}", self.yes)?;
        writeln!(f, "Features not needing compliance: {}", self.no)?;
        write!(f, "Features needing review: {}", self.needs_review)?;
        if self.skipped > 0 {
            write!(f, "\nRows skipped: {}", self.skipped)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
