//! Reads a structured verdict back out of free-text model output.
//!
//! The prompt asks for four labeled lines:
//!
//! ```text
//! Decision: Yes
//! Reasoning: Age gating differs between US states.
//! Regulations: COPPA, Utah Social Media Regulation Act
//! Confidence: High
//! ```
//!
//! Labels are matched as case-insensitive line prefixes, tolerating list or
//! bold markers in front of them.  Models sometimes ignore the format and
//! answer with a JSON object instead; that is accepted as a second chance.

use std::collections::BTreeSet;

use crate::llm::client::LlmError;
use crate::rules::canonical_regulation;
use crate::verdict::{Confidence, Decision, LlmVerdict};

const NO_REASONING: &str = "No reasoning provided";

#[derive(Clone, Copy, PartialEq)]
enum Label {
    Decision,
    Reasoning,
    Regulations,
    Confidence,
}

const LABELS: &[(&str, Label)] = &[
    ("decision:", Label::Decision),
    ("reasoning:", Label::Reasoning),
    ("regulations:", Label::Regulations),
    ("confidence:", Label::Confidence),
];

/// Parse a completion into an [`LlmVerdict`].
///
/// Fails with [`LlmError::NoDecision`] when neither the labeled-line format
/// nor an embedded JSON object yields a decision.
pub fn parse_verdict(text: &str) -> Result<LlmVerdict, LlmError> {
    if let Some(verdict) = parse_labeled(text) {
        return Ok(verdict);
    }
    if let Some(verdict) = parse_json(text) {
        return Ok(verdict);
    }
    Err(LlmError::NoDecision(text.chars().take(120).collect()))
}

// ---------------------------------------------------------------------------
// Labeled lines
// ---------------------------------------------------------------------------

fn split_label(line: &str) -> Option<(Label, &str)> {
    let line = line.trim_start_matches(|c: char| c.is_whitespace() || matches!(c, '*' | '-' | '#'));
    LABELS.iter().find_map(|(prefix, label)| {
        let head = line.get(..prefix.len())?;
        if head.eq_ignore_ascii_case(prefix) {
            let value = line[prefix.len()..].trim_matches(|c: char| c.is_whitespace() || c == '*');
            Some((*label, value))
        } else {
            None
        }
    })
}

fn parse_labeled(text: &str) -> Option<LlmVerdict> {
    let mut decision = None;
    let mut reasoning: Vec<&str> = Vec::new();
    let mut regulations = None;
    let mut confidence = None;
    let mut current = None;

    for line in text.lines() {
        match split_label(line) {
            Some((label, value)) => {
                current = Some(label);
                match label {
                    Label::Decision => decision = decision.or(Some(Decision::from_text(value))),
                    Label::Reasoning => {
                        if !value.is_empty() {
                            reasoning.push(value);
                        }
                    }
                    Label::Regulations => regulations = Some(value),
                    Label::Confidence => confidence = Some(Confidence::from_text(value)),
                }
            }
            // Continuation of a multi-line reasoning block.
            None if current == Some(Label::Reasoning) => {
                let line = line.trim();
                if !line.is_empty() {
                    reasoning.push(line);
                }
            }
            None => {}
        }
    }

    let decision = decision?;
    let reasoning = if reasoning.is_empty() {
        NO_REASONING.to_string()
    } else {
        reasoning.join(" ")
    };

    Some(LlmVerdict {
        decision,
        reasoning,
        regulations: regulations
            .map(|list| normalize_regulations(list.split([',', ';'])))
            .unwrap_or_default(),
        confidence: confidence.unwrap_or_default(),
    })
}

// ---------------------------------------------------------------------------
// JSON fallback
// ---------------------------------------------------------------------------

fn parse_json(text: &str) -> Option<LlmVerdict> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    let value: serde_json::Value = serde_json::from_str(&text[start..=end]).ok()?;

    let decision = value
        .get("needs_compliance")
        .or_else(|| value.get("decision"))?
        .as_str()
        .map(Decision::from_text)?;

    let reasoning = value
        .get("reasoning")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or(NO_REASONING)
        .to_string();

    let regulations = match value
        .get("related_regulations")
        .or_else(|| value.get("regulations"))
    {
        Some(serde_json::Value::Array(items)) => {
            normalize_regulations(items.iter().filter_map(|v| v.as_str()))
        }
        Some(serde_json::Value::String(list)) => normalize_regulations(list.split([',', ';'])),
        _ => BTreeSet::new(),
    };

    let confidence = value
        .get("confidence")
        .and_then(|v| v.as_str())
        .map(Confidence::from_text)
        .unwrap_or_default();

    Some(LlmVerdict {
        decision,
        reasoning,
        regulations,
        confidence,
    })
}

// ---------------------------------------------------------------------------
// Regulations
// ---------------------------------------------------------------------------

/// Canonicalise regulation tokens; unknown names are kept as written.
fn normalize_regulations<'a>(tokens: impl Iterator<Item = &'a str>) -> BTreeSet<String> {
    tokens
        .map(|t| t.trim_matches(|c: char| c.is_whitespace() || matches!(c, '"' | '\'' | '[' | ']' | '.')))
        .filter(|t| !t.is_empty())
        .filter(|t| {
            !matches!(
                t.to_lowercase().as_str(),
                "none" | "n/a" | "na" | "not applicable"
            )
        })
        .flat_map(canonicalize_token)
        .collect()
}

/// One token may still list several regulations joined by "and"; split it
/// only when every part is a known regulation.
fn canonicalize_token(token: &str) -> Vec<String> {
    if let Some(reg) = canonical_regulation(token) {
        return vec![reg.to_string()];
    }
    let parts: Option<Vec<String>> = token
        .split(" and ")
        .map(|part| canonical_regulation(part).map(str::to_string))
        .collect();
    match parts {
        Some(parts) if parts.len() > 1 => parts,
        _ => vec![token.to_string()],
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
