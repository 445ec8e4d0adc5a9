//! Analysis pipeline: single features and CSV batches.
//!
//! # Architecture
//!
//! ```text
//! Documents cell ──extract()──▶ document text
//!        │
//!        ▼
//! FeatureRecord ──▶ ComplianceAnalyzer::analyze()
//!                     ├─ KeywordMatcher::find(combined text)   → KeywordMatch*
//!                     ├─ LlmJudge::judge(record)               → LlmVerdict
//!                     └─ merge(title, matches, llm)             → FinalVerdict
//!
//! BatchRunner::run_file() ── one analyze_feature() per CSV row ──▶ BatchReport
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use geo_compliance::config::AppConfig;
//! use geo_compliance::pipeline::BatchRunner;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::load()?;
//!     let runner = BatchRunner::from_config(&config.llm);
//!
//!     let report = runner
//!         .run_file(Path::new("features.csv"), Some(Path::new("results.csv")))
//!         .await?;
//!     println!("{}", report.summary);
//!     Ok(())
//! }
//! ```

pub mod analyzer;
pub mod batch;
pub mod summary;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use analyzer::ComplianceAnalyzer;
pub use batch::{
    write_results, write_sample_csv, BatchError, BatchReport, BatchRunner, SkippedRow,
    OUTPUT_HEADERS, SAMPLE_FEATURES,
};
pub use summary::BatchSummary;
