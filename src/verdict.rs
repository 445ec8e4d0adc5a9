//! Records that flow through the compliance pipeline.
//!
//! A [`FeatureRecord`] goes in, a [`FinalVerdict`] comes out.  In between the
//! LLM judge produces an [`LlmVerdict`] and the keyword matcher produces
//! [`KeywordMatch`](crate::rules::KeywordMatch) entries.  Everything here is
//! created fresh per analysis and never mutated once built.

use std::collections::BTreeSet;
use std::fmt;

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

/// Whether a feature needs geo-specific compliance logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    Yes,
    No,
    /// Automated signals were insufficient or inconsistent; a human must look.
    NeedsReview,
}

impl Decision {
    /// Label used in output tables (`Yes`, `No`, `Needs Review`).
    pub fn label(&self) -> &'static str {
        match self {
            Decision::Yes => "Yes",
            Decision::No => "No",
            Decision::NeedsReview => "Needs Review",
        }
    }

    /// Normalise free text from a model answer into a decision.
    ///
    /// `review` wins over everything else, then `yes`, then a standalone
    /// `no`.  Anything unrecognised maps to [`Decision::NeedsReview`].
    ///
    /// `no` deliberately needs to be its own word; a plain substring test
    /// would turn "unknown" into a No.
    ///
    /// ```
    /// use geo_compliance::verdict::Decision;
    ///
    /// assert_eq!(Decision::from_text("Yes, clearly"), Decision::Yes);
    /// assert_eq!(Decision::from_text("no"), Decision::No);
    /// assert_eq!(Decision::from_text("Needs Review"), Decision::NeedsReview);
    /// assert_eq!(Decision::from_text("unknown"), Decision::NeedsReview);
    /// ```
    pub fn from_text(text: &str) -> Self {
        let lower = text.to_lowercase();
        if lower.contains("review") {
            return Decision::NeedsReview;
        }
        if lower.contains("yes") {
            return Decision::Yes;
        }
        // Whole-word match, not substring: "unknown" or "not sure" must stay
        // NeedsReview instead of reading as a plain No.
        let says_no = lower
            .split(|c: char| !c.is_alphanumeric())
            .any(|word| word == "no");
        if says_no {
            Decision::No
        } else {
            Decision::NeedsReview
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Confidence
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn label(&self) -> &'static str {
        match self {
            Confidence::High => "High",
            Confidence::Medium => "Medium",
            Confidence::Low => "Low",
        }
    }

    /// Normalise free text into a confidence level, defaulting to `Medium`.
    pub fn from_text(text: &str) -> Self {
        let lower = text.to_lowercase();
        if lower.contains("high") {
            Confidence::High
        } else if lower.contains("low") {
            Confidence::Low
        } else {
            Confidence::Medium
        }
    }
}

impl Default for Confidence {
    fn default() -> Self {
        Confidence::Medium
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// FeatureRecord
// ---------------------------------------------------------------------------

/// Input to one analysis.  `document_text` is already extracted and may be
/// empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureRecord {
    pub title: String,
    pub description: String,
    pub document_text: String,
}

impl FeatureRecord {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        document_text: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            document_text: document_text.into(),
        }
    }

    /// Lower-cased `title description document_text`, the text the keyword
    /// matcher scans.
    pub fn combined_text(&self) -> String {
        format!("{} {} {}", self.title, self.description, self.document_text).to_lowercase()
    }
}

// ---------------------------------------------------------------------------
// LlmVerdict
// ---------------------------------------------------------------------------

/// What the LLM judge concluded.  Always present, even when the model call
/// failed (see [`LlmVerdict::fallback`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmVerdict {
    pub decision: Decision,
    pub reasoning: String,
    pub regulations: BTreeSet<String>,
    pub confidence: Confidence,
}

impl LlmVerdict {
    /// Verdict used whenever the judge could not get a usable answer.
    ///
    /// ```
    /// use geo_compliance::verdict::{Confidence, Decision, LlmVerdict};
    ///
    /// let v = LlmVerdict::fallback("LLM request timed out");
    /// assert_eq!(v.decision, Decision::NeedsReview);
    /// assert_eq!(v.confidence, Confidence::Low);
    /// assert!(v.regulations.is_empty());
    /// assert!(v.reasoning.contains("timed out"));
    /// ```
    pub fn fallback(cause: impl fmt::Display) -> Self {
        Self {
            decision: Decision::NeedsReview,
            reasoning: format!("LLM analysis unavailable: {cause}"),
            regulations: BTreeSet::new(),
            confidence: Confidence::Low,
        }
    }
}

// ---------------------------------------------------------------------------
// FinalVerdict
// ---------------------------------------------------------------------------

/// Merged outcome for one feature; one output row per verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalVerdict {
    pub title: String,
    pub decision: Decision,
    pub reasoning: String,
    pub regulations: BTreeSet<String>,
    pub matched_keywords: Vec<String>,
    pub confidence: Confidence,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_labels() {
        assert_eq!(Decision::Yes.to_string(), "Yes");
        assert_eq!(Decision::No.to_string(), "No");
        assert_eq!(Decision::NeedsReview.to_string(), "Needs Review");
    }

    #[test]
    fn decision_from_text_normalises() {
        assert_eq!(Decision::from_text("YES"), Decision::Yes);
        assert_eq!(Decision::from_text("Yes - age gating required"), Decision::Yes);
        assert_eq!(Decision::from_text("No."), Decision::No);
        assert_eq!(Decision::from_text(" no "), Decision::No);
        assert_eq!(Decision::from_text("Needs Review"), Decision::NeedsReview);
        assert_eq!(Decision::from_text("not known"), Decision::NeedsReview);
        assert_eq!(Decision::from_text("unknown"), Decision::NeedsReview);
        assert_eq!(Decision::from_text("Not sure"), Decision::NeedsReview);
        assert_eq!(Decision::from_text(""), Decision::NeedsReview);
    }

    #[test]
    fn confidence_defaults_to_medium() {
        assert_eq!(Confidence::from_text("High"), Confidence::High);
        assert_eq!(Confidence::from_text("low confidence"), Confidence::Low);
        assert_eq!(Confidence::from_text("medium"), Confidence::Medium);
        assert_eq!(Confidence::from_text("somewhat sure"), Confidence::Medium);
        assert_eq!(Confidence::default(), Confidence::Medium);
    }

    #[test]
    fn combined_text_is_lowercased_and_joined() {
        let record = FeatureRecord::new("Age Gate", "For MINORS", "");
        assert_eq!(record.combined_text(), "age gate for minors ");
    }
}
