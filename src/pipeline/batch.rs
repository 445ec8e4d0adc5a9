//! CSV batch runner.
//!
//! ```text
//! input.csv (Title, Description[, Documents])
//!   └─▶ for each row, in file order
//!         ├─ trim fields, skip rows missing Title or Description
//!         └─▶ ComplianceAnalyzer::analyze_feature → FinalVerdict
//!   └─▶ output.csv (one row per verdict) + BatchReport
//! ```
//!
//! Rows are analyzed one at a time.  Only a missing input file, missing
//! required columns or an I/O failure abort the batch; everything that goes
//! wrong for a single feature is folded into its verdict.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::llm::{ApiClient, CompletionClient};
use crate::pipeline::analyzer::ComplianceAnalyzer;
use crate::pipeline::summary::BatchSummary;
use crate::verdict::FinalVerdict;

pub const TITLE_COLUMN: &str = "Title";
pub const DESCRIPTION_COLUMN: &str = "Description";
pub const DOCUMENTS_COLUMN: &str = "Documents";

/// Header row of every results file, in column order.
pub const OUTPUT_HEADERS: [&str; 6] = [
    "Title",
    "Needs Geo-Compliance Logic?",
    "Reasoning",
    "Related Regulations",
    "Rule-Based Keywords",
    "Confidence",
];

// ---------------------------------------------------------------------------
// BatchError
// ---------------------------------------------------------------------------

/// Fatal batch errors.  Per-row problems never show up here.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("input file not found: {0}")]
    InputNotFound(PathBuf),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV is missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

/// An input row that was not analyzed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// 1-based line number in the input file.
    pub line: u64,
    pub reason: String,
}

/// One line of the results CSV.
#[derive(Debug, Serialize)]
struct OutputRow<'a> {
    title: &'a str,
    decision: &'static str,
    reasoning: &'a str,
    regulations: String,
    keywords: String,
    confidence: &'static str,
}

impl<'a> From<&'a FinalVerdict> for OutputRow<'a> {
    fn from(v: &'a FinalVerdict) -> Self {
        Self {
            title: &v.title,
            decision: v.decision.label(),
            reasoning: &v.reasoning,
            regulations: v
                .regulations
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", "),
            keywords: v.matched_keywords.join(", "),
            confidence: v.confidence.label(),
        }
    }
}

/// Positions of the known columns in the input header.
struct Columns {
    title: usize,
    description: usize,
    documents: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, BatchError> {
        let position = |name: &str| headers.iter().position(|h| h == name);

        let title = position(TITLE_COLUMN);
        let description = position(DESCRIPTION_COLUMN);
        match (title, description) {
            (Some(title), Some(description)) => Ok(Self {
                title,
                description,
                documents: position(DOCUMENTS_COLUMN),
            }),
            _ => {
                let missing = [(TITLE_COLUMN, title), (DESCRIPTION_COLUMN, description)]
                    .iter()
                    .filter(|(_, idx)| idx.is_none())
                    .map(|(name, _)| name.to_string())
                    .collect();
                Err(BatchError::MissingColumns(missing))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// BatchReport
// ---------------------------------------------------------------------------

/// Everything a batch produced, in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub rows: Vec<FinalVerdict>,
    pub skipped: Vec<SkippedRow>,
    pub summary: BatchSummary,
}

impl BatchReport {
    fn skip(&mut self, line: u64, reason: String) {
        log::warn!("batch: skipping line {line}: {reason}");
        self.skipped.push(SkippedRow { line, reason });
        self.summary.record_skipped();
    }
}

// ---------------------------------------------------------------------------
// BatchRunner
// ---------------------------------------------------------------------------

/// Drives a [`ComplianceAnalyzer`] over a CSV of features.
pub struct BatchRunner<C: CompletionClient> {
    analyzer: ComplianceAnalyzer<C>,
}

impl BatchRunner<ApiClient> {
    pub fn from_config(config: &crate::config::LlmConfig) -> Self {
        Self::new(ComplianceAnalyzer::from_config(config))
    }
}

impl<C: CompletionClient> BatchRunner<C> {
    pub fn new(analyzer: ComplianceAnalyzer<C>) -> Self {
        Self { analyzer }
    }

    /// Analyze `input` and, when `output` is given, write the results CSV.
    pub async fn run_file(
        &self,
        input: &Path,
        output: Option<&Path>,
    ) -> Result<BatchReport, BatchError> {
        if !input.exists() {
            return Err(BatchError::InputNotFound(input.to_path_buf()));
        }
        let file = File::open(input).map_err(|source| BatchError::Io {
            path: input.to_path_buf(),
            source,
        })?;

        log::info!("batch: analyzing features from {}", input.display());
        let report = self.run_reader(file).await?;

        if let Some(path) = output {
            let out = File::create(path).map_err(|source| BatchError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            write_results(out, &report.rows)?;
            log::info!("batch: results saved to {}", path.display());
        }
        Ok(report)
    }

    /// Analyze every valid row of a CSV stream.
    ///
    /// The header is validated before any row is read.
    pub async fn run_reader<R: Read>(&self, reader: R) -> Result<BatchReport, BatchError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let columns = Columns::from_headers(csv_reader.headers()?)?;

        // Undecodable rows are skipped below; a failing reader is fatal.
        let mut records = Vec::new();
        for record in csv_reader.records() {
            match record {
                Err(e) if e.is_io_error() => return Err(e.into()),
                other => records.push(other),
            }
        }

        let mut report = BatchReport::default();
        let total = records.len();

        for (idx, record) in records.iter().enumerate() {
            let fallback_line = idx as u64 + 2;
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    let line = e.position().map_or(fallback_line, |p| p.line());
                    report.skip(line, format!("unreadable row: {e}"));
                    continue;
                }
            };
            let line = record.position().map_or(fallback_line, |p| p.line());
            let field = |i: usize| record.get(i).unwrap_or("").trim();

            let title = field(columns.title);
            let description = field(columns.description);
            let documents = columns.documents.map(field).unwrap_or("");

            if title.is_empty() {
                report.skip(line, "missing Title".to_string());
                continue;
            }
            if description.is_empty() {
                report.skip(line, "missing Description".to_string());
                continue;
            }

            log::info!("batch: analyzing feature {}/{total}: {title}", idx + 1);
            let verdict = self
                .analyzer
                .analyze_feature(title, description, documents)
                .await;
            report.summary.record(verdict.decision);
            report.rows.push(verdict);
        }

        Ok(report)
    }
}

// ---------------------------------------------------------------------------
// CSV writers
// ---------------------------------------------------------------------------

/// Write verdicts as the results CSV.  The header is written even when there
/// are no rows.
pub fn write_results<W: Write>(writer: W, verdicts: &[FinalVerdict]) -> Result<(), BatchError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(OUTPUT_HEADERS)?;
    for verdict in verdicts {
        csv_writer.serialize(OutputRow::from(verdict))?;
    }
    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Example features written by `create-sample`: (title, description, documents).
pub const SAMPLE_FEATURES: [(&str, &str, &str); 10] = [
    (
        "Age Verification System",
        "Implement age gates for users under 18 to comply with COPPA and state regulations",
        "age_verification_specs.pdf",
    ),
    (
        "Location-Based Content Filtering",
        "Block content based on user location to meet regional compliance requirements",
        "geo_blocking_requirements.txt",
    ),
    (
        "User Profile Management",
        "Basic user profile creation and management functionality",
        "",
    ),
    (
        "Live Streaming Feature",
        "Allow users to stream live video content to their followers",
        "live_streaming_policy.pdf",
    ),
    (
        "E-commerce Integration",
        "Enable users to purchase products directly through the platform",
        "ecommerce_compliance.pdf",
    ),
    (
        "Content Recommendation Algorithm",
        "AI-powered content recommendation system that personalizes user experience",
        "algorithm_transparency_report.pdf",
    ),
    (
        "User-Generated Content Platform",
        "Platform for users to upload and share their own content",
        "ugc_guidelines.pdf",
    ),
    (
        "Advertising System",
        "Targeted advertising system with user data analysis",
        "advertising_policy.pdf",
    ),
    (
        "Data Analytics Dashboard",
        "Analytics dashboard for tracking user behavior and platform metrics",
        "analytics_privacy_policy.pdf",
    ),
    (
        "Social Media Sharing",
        "Social media integration allowing users to share content across platforms",
        "social_sharing_terms.pdf",
    ),
];

/// Write [`SAMPLE_FEATURES`] as an input CSV.  Returns the number of rows.
pub fn write_sample_csv(path: &Path) -> Result<usize, BatchError> {
    let file = File::create(path).map_err(|source| BatchError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut csv_writer = csv::Writer::from_writer(file);

    csv_writer.write_record([TITLE_COLUMN, DESCRIPTION_COLUMN, DOCUMENTS_COLUMN])?;
    for (title, description, documents) in SAMPLE_FEATURES {
        csv_writer.write_record([title, description, documents])?;
    }
    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(SAMPLE_FEATURES.len())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmJudge, MockClient, PromptBuilder};
    use crate::verdict::Decision;
    use tempfile::tempdir;

    fn runner(client: MockClient) -> BatchRunner<MockClient> {
        BatchRunner::new(ComplianceAnalyzer::new(LlmJudge::new(
            client,
            PromptBuilder::new(8_000),
        )))
    }

    fn read_output(path: &Path) -> Vec<Vec<String>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(path)
            .unwrap();
        reader
            .records()
            .map(|r| r.unwrap().iter().map(String::from).collect())
            .collect()
    }

    #[tokio::test]
    async fn analyzes_rows_in_order() {
        let input = "Title,Description,Documents\n\
                     Age Verification System,Implement age gates for users under 18,\n\
                     Dark Mode,Theme toggle for the settings page,\n";
        let report = runner(MockClient::ok("Decision: No\nConfidence: High"))
            .run_reader(input.as_bytes())
            .await
            .unwrap();

        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[0].title, "Age Verification System");
        assert_eq!(report.rows[0].decision, Decision::Yes);
        assert_eq!(report.rows[1].title, "Dark Mode");
        assert_eq!(report.rows[1].decision, Decision::No);
        assert_eq!(report.summary.total, 2);
        assert_eq!(report.summary.yes, 1);
        assert_eq!(report.summary.no, 1);
    }

    #[tokio::test]
    async fn documents_column_is_optional() {
        let input = "Title,Description\nDark Mode,Theme toggle\n";
        let report = runner(MockClient::ok("Decision: No"))
            .run_reader(input.as_bytes())
            .await
            .unwrap();
        assert_eq!(report.rows.len(), 1);
    }

    #[tokio::test]
    async fn skips_rows_missing_title_or_description() {
        let input = "Title,Description,Documents\n\
                     ,Has no title,\n\
                     No Description,   ,\n\
                     \"  Dark Mode  \",Theme toggle,\n";
        let report = runner(MockClient::ok("Decision: No"))
            .run_reader(input.as_bytes())
            .await
            .unwrap();

        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].title, "Dark Mode");
        assert_eq!(report.skipped.len(), 2);
        assert_eq!(report.skipped[0].line, 2);
        assert_eq!(report.skipped[0].reason, "missing Title");
        assert_eq!(report.skipped[1].reason, "missing Description");
        assert_eq!(report.summary.skipped, 2);
        assert_eq!(report.summary.total, 1);
    }

    #[tokio::test]
    async fn undecodable_row_is_skipped_not_fatal() {
        let mut input = b"Title,Description\nDark Mode,Theme toggle\n".to_vec();
        input.extend_from_slice(b"Caf\xE9 Menu,Ordering for minors\n");
        input.extend_from_slice(b"Search,Search bar\n");

        let report = runner(MockClient::ok("Decision: No"))
            .run_reader(input.as_slice())
            .await
            .unwrap();

        let titles: Vec<&str> = report.rows.iter().map(|v| v.title.as_str()).collect();
        assert_eq!(titles, vec!["Dark Mode", "Search"]);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].line, 3);
        assert!(report.skipped[0].reason.starts_with("unreadable row"));
        assert_eq!(report.summary.total, 2);
        assert_eq!(report.summary.skipped, 1);
    }

    #[tokio::test]
    async fn missing_columns_is_fatal() {
        let input = "Name,Summary\nDark Mode,Theme toggle\n";
        let err = runner(MockClient::ok("Decision: No"))
            .run_reader(input.as_bytes())
            .await
            .unwrap_err();

        match err {
            BatchError::MissingColumns(cols) => {
                assert_eq!(cols, vec!["Title".to_string(), "Description".to_string()])
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn header_only_file_yields_empty_report() {
        let report = runner(MockClient::ok("Decision: No"))
            .run_reader("Title,Description\n".as_bytes())
            .await
            .unwrap();
        assert!(report.rows.is_empty());
        assert_eq!(report.summary, BatchSummary::default());
    }

    #[tokio::test]
    async fn missing_input_file_is_fatal() {
        let dir = tempdir().unwrap();
        let err = runner(MockClient::ok("Decision: No"))
            .run_file(&dir.path().join("nope.csv"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, BatchError::InputNotFound(_)));
    }

    #[tokio::test]
    async fn writes_results_csv() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("features.csv");
        let output = dir.path().join("results.csv");
        std::fs::write(
            &input,
            "Title,Description\nAge Verification System,Implement age gates for users under 18\n",
        )
        .unwrap();

        let report = runner(MockClient::ok(
            "Decision: Yes\nReasoning: Minors.\nRegulations: GDPR\nConfidence: High",
        ))
        .run_file(&input, Some(&output))
        .await
        .unwrap();
        assert_eq!(report.rows.len(), 1);

        let rows = read_output(&output);
        assert_eq!(rows[0], OUTPUT_HEADERS.map(String::from).to_vec());
        assert_eq!(rows[1][0], "Age Verification System");
        assert_eq!(rows[1][1], "Yes");
        assert_eq!(rows[1][2], "Minors.");
        assert_eq!(
            rows[1][3],
            "COPPA, California Protecting Our Kids Act, GDPR, Utah Social Media Regulation Act"
        );
        assert_eq!(rows[1][4], "age gate, age verification, under 18");
        assert_eq!(rows[1][5], "High");
    }

    #[test]
    fn empty_results_still_have_header() {
        let mut buf = Vec::new();
        write_results(&mut buf, &[]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text.trim_end(),
            "Title,Needs Geo-Compliance Logic?,Reasoning,Related Regulations,Rule-Based Keywords,Confidence"
        );
    }

    #[tokio::test]
    async fn sample_csv_round_trips_through_runner() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sample_features.csv");
        assert_eq!(write_sample_csv(&path).unwrap(), 10);

        let report = runner(MockClient::failing())
            .run_file(&path, None)
            .await
            .unwrap();

        assert_eq!(report.rows.len(), 10);
        assert!(report.skipped.is_empty());
        assert_eq!(report.rows[0].title, "Age Verification System");
        assert_eq!(report.rows[0].decision, Decision::Yes);
        assert_eq!(report.rows[2].title, "User Profile Management");
        assert_eq!(report.rows[2].decision, Decision::NeedsReview);
    }
}
