//! Per-feature analysis: extract → keyword match → judge → merge.

use crate::config::LlmConfig;
use crate::extract::extract;
use crate::llm::{ApiClient, CompletionClient, LlmJudge};
use crate::merge::merge;
use crate::rules::KeywordMatcher;
use crate::verdict::{FeatureRecord, FinalVerdict};

/// Runs the full decision pipeline for one feature at a time.
///
/// Holds no per-feature state, so one analyzer can be reused for a whole
/// batch and each verdict is independent of processing order.
pub struct ComplianceAnalyzer<C: CompletionClient> {
    matcher: KeywordMatcher,
    judge: LlmJudge<C>,
}

impl ComplianceAnalyzer<ApiClient> {
    /// Analyzer backed by the OpenAI-compatible HTTP judge.
    pub fn from_config(config: &LlmConfig) -> Self {
        Self::new(LlmJudge::from_config(config))
    }
}

impl<C: CompletionClient> ComplianceAnalyzer<C> {
    pub fn new(judge: LlmJudge<C>) -> Self {
        Self {
            matcher: KeywordMatcher::new(),
            judge,
        }
    }

    /// Analyze a raw feature.  `documents` is a document path or inline
    /// text; extraction problems only cost the document text.
    pub async fn analyze_feature(
        &self,
        title: &str,
        description: &str,
        documents: &str,
    ) -> FinalVerdict {
        let extraction = extract(documents);
        let record = FeatureRecord::new(title, description, extraction.text);
        self.analyze(&record).await
    }

    /// Analyze a record whose document text is already extracted.
    pub async fn analyze(&self, record: &FeatureRecord) -> FinalVerdict {
        let matches = self.matcher.find(&record.combined_text());
        if !matches.is_empty() {
            let high_priority = matches.iter().filter(|m| m.is_high_priority()).count();
            log::debug!(
                "analyzer: {:?} matched categories {:?} ({high_priority} high priority)",
                record.title,
                matches.iter().map(|m| m.category.as_str()).collect::<Vec<_>>()
            );
        }
        let llm = self.judge.judge(record).await;
        merge(&record.title, &matches, &llm)
    }
}
