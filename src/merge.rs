//! Merges rule-based matches with the LLM verdict.
//!
//! Precedence, first match wins:
//!
//! | Keyword matches | LLM decision        | Final decision | Confidence     |
//! |-----------------|---------------------|----------------|----------------|
//! | non-empty       | Yes                 | Yes            | High           |
//! | non-empty       | No / Needs Review   | Yes            | Medium         |
//! | empty           | any                 | LLM decision   | LLM confidence |
//!
//! Keyword hits override a non-affirmative model answer.  This is a product
//! policy that has to be confirmed with compliance owners before it is
//! relaxed.

use crate::rules::{map_to_regulations, KeywordMatch};
use crate::verdict::{Confidence, Decision, FinalVerdict, LlmVerdict};

/// Combine keyword matches and an LLM verdict into the final label.
///
/// Pure and total: the same inputs always produce the same verdict.
pub fn merge(title: &str, matches: &[KeywordMatch], llm: &LlmVerdict) -> FinalVerdict {
    let matched_keywords: Vec<String> = matches
        .iter()
        .flat_map(|m| m.keywords.iter().cloned())
        .collect();

    let mut regulations = map_to_regulations(matches.iter().map(|m| m.category.as_str()));
    regulations.extend(llm.regulations.iter().cloned());

    let (decision, confidence, reasoning) = if matches.is_empty() {
        (llm.decision, llm.confidence, llm.reasoning.clone())
    } else if llm.decision == Decision::Yes {
        (Decision::Yes, Confidence::High, llm.reasoning.clone())
    } else {
        let reasoning = format!(
            "{} (Escalated to Yes by rule-based analysis: LLM said {}, but matched keywords {})",
            llm.reasoning,
            llm.decision,
            matched_keywords.join(", ")
        );
        (Decision::Yes, Confidence::Medium, reasoning)
    };

    FinalVerdict {
        title: title.to_string(),
        decision,
        reasoning,
        regulations,
        matched_keywords,
        confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn llm(decision: Decision, confidence: Confidence, regs: &[&str]) -> LlmVerdict {
        LlmVerdict {
            decision,
            reasoning: "model reasoning".into(),
            regulations: regs.iter().map(|r| r.to_string()).collect(),
            confidence,
        }
    }

    fn age_match() -> Vec<KeywordMatch> {
        vec![KeywordMatch {
            category: "age verification".into(),
            keywords: vec!["age gate".into(), "under 18".into()],
        }]
    }

    #[test]
    fn keywords_and_llm_yes_give_high_confidence() {
        let v = merge("t", &age_match(), &llm(Decision::Yes, Confidence::Low, &[]));
        assert_eq!(v.decision, Decision::Yes);
        assert_eq!(v.confidence, Confidence::High);
        assert_eq!(v.reasoning, "model reasoning");
    }

    #[test]
    fn keywords_override_llm_no() {
        let v = merge("t", &age_match(), &llm(Decision::No, Confidence::High, &[]));
        assert_eq!(v.decision, Decision::Yes);
        assert_eq!(v.confidence, Confidence::Medium);
        assert!(v.reasoning.starts_with("model reasoning"));
        assert!(v.reasoning.contains("age gate, under 18"));
    }

    #[test]
    fn keywords_override_needs_review() {
        let v = merge(
            "t",
            &age_match(),
            &LlmVerdict::fallback("no API key configured"),
        );
        assert_eq!(v.decision, Decision::Yes);
        assert_eq!(v.confidence, Confidence::Medium);
        assert!(v.reasoning.contains("Escalated"));
    }

    #[test]
    fn no_keywords_defers_to_llm() {
        for (decision, confidence) in [
            (Decision::Yes, Confidence::High),
            (Decision::No, Confidence::Medium),
            (Decision::NeedsReview, Confidence::Low),
        ] {
            let v = merge("t", &[], &llm(decision, confidence, &["GDPR"]));
            assert_eq!(v.decision, decision);
            assert_eq!(v.confidence, confidence);
            assert_eq!(v.reasoning, "model reasoning");
            assert!(v.matched_keywords.is_empty());
        }
    }

    #[test]
    fn regulations_are_union_of_rules_and_llm() {
        let v = merge(
            "t",
            &age_match(),
            &llm(Decision::Yes, Confidence::High, &["GDPR", "COPPA"]),
        );
        let expected: BTreeSet<String> = [
            "COPPA",
            "California Protecting Our Kids Act",
            "GDPR",
            "Utah Social Media Regulation Act",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        assert_eq!(v.regulations, expected);
    }

    #[test]
    fn matched_keywords_flatten_in_order() {
        let matches = vec![
            KeywordMatch {
                category: "privacy".into(),
                keywords: vec!["user data".into()],
            },
            KeywordMatch {
                category: "e-commerce".into(),
                keywords: vec!["shopping".into(), "payments".into()],
            },
        ];
        let v = merge("t", &matches, &llm(Decision::Yes, Confidence::High, &[]));
        assert_eq!(v.matched_keywords, vec!["user data", "shopping", "payments"]);
    }

    #[test]
    fn merge_is_idempotent() {
        let verdict = llm(Decision::No, Confidence::Medium, &["DSA"]);
        let a = merge("Feature", &age_match(), &verdict);
        let b = merge("Feature", &age_match(), &verdict);
        assert_eq!(a, b);
        assert_eq!(a.title, "Feature");
    }
}
