//! Rule-based analysis: keyword tables and the regulation map.
//!
//! * [`KeywordMatcher`]: substring matching against curated category tables.
//! * [`map_to_regulations`]: category names → regulation short names.
//! * [`canonical_regulation`]: free-text regulation mention → short name.
//!
//! The tables are immutable `static` data; nothing here holds state.

pub mod keywords;
pub mod regulations;

pub use keywords::{CategoryConfig, KeywordMatch, KeywordMatcher, CATEGORIES};
pub use regulations::{canonical_regulation, map_to_regulations, Regulation, REGULATIONS};
