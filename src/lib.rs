//! geo-compliance: flags product features that need geo-specific
//! compliance logic.
//!
//! Each feature is checked twice: a keyword scan against curated regulatory
//! categories ([`rules`]) and an LLM classification ([`llm`]).  [`merge`]
//! combines both into a [`verdict::FinalVerdict`]; [`pipeline`] runs that
//! for single features and CSV batches.

pub mod config;
pub mod extract;
pub mod llm;
pub mod merge;
pub mod pipeline;
pub mod rules;
pub mod verdict;
