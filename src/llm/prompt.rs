//! Prompt builder for geo-compliance classification.
//!
//! [`PromptBuilder`] produces a `(system_msg, user_msg)` pair for any
//! OpenAI-compatible chat endpoint.  The user message embeds the feature and
//! asks for an answer in four labeled lines, which
//! [`parse_verdict`](crate::llm::parse_verdict) reads back.

use crate::rules::REGULATIONS;
use crate::verdict::FeatureRecord;

// ---------------------------------------------------------------------------
// System instruction
// ---------------------------------------------------------------------------

const SYSTEM_INSTRUCTION: &str = "\
You are an expert in digital compliance and platform regulation.
Task: decide whether a product feature requires geo-specific compliance logic,
meaning its behaviour must differ by user jurisdiction to satisfy a law.

Rules:
1. Base the decision only on the feature text you are given.
2. Answer \"Yes\" when a named regulation applies in some jurisdictions only.
3. Answer \"No\" when the feature is jurisdiction-neutral.
4. Answer \"Needs Review\" when the text is too vague to decide.
5. Reply in the exact labeled-line format requested, with no extra prose.";

const TYPICAL_FEATURES: &[&str] = &[
    "Age verification or age-gating features",
    "Location-based content blocking or restrictions",
    "Data localization requirements",
    "Content moderation systems",
    "User-generated content platforms",
    "Advertising or monetization features",
    "Social media features",
    "Live streaming capabilities",
    "E-commerce or payment features",
];

const RESPONSE_FORMAT: &str = "\
Respond with exactly these four lines:
Decision: <Yes | No | Needs Review>
Reasoning: <one or two sentences explaining the decision>
Regulations: <comma-separated regulation names, or None>
Confidence: <High | Medium | Low>
";

// ---------------------------------------------------------------------------
// PromptBuilder
// ---------------------------------------------------------------------------

/// Builds classification prompts.
///
/// # Example
/// ```rust
/// use geo_compliance::llm::PromptBuilder;
/// use geo_compliance::verdict::FeatureRecord;
///
/// let builder = PromptBuilder::new(8_000);
/// let record = FeatureRecord::new("Age Verification System", "Age gates", "");
/// let (system, user) = builder.build_chat(&record);
/// assert!(system.contains("geo-specific compliance"));
/// assert!(user.contains("Title: Age Verification System"));
/// ```
pub struct PromptBuilder {
    max_document_chars: usize,
}

impl PromptBuilder {
    /// `max_document_chars` caps how much document text is embedded.
    pub fn new(max_document_chars: usize) -> Self {
        Self { max_document_chars }
    }

    /// Build a **(system_msg, user_msg)** pair.
    ///
    /// The output depends only on the record, so identical records produce
    /// identical prompts.
    pub fn build_chat(&self, record: &FeatureRecord) -> (String, String) {
        let system_msg = SYSTEM_INSTRUCTION.to_string();

        let documents = record.document_text.trim();
        let documents = if documents.is_empty() {
            "None provided".to_string()
        } else {
            truncate_chars(documents, self.max_document_chars)
        };

        let mut user_msg = String::with_capacity(2048 + documents.len());
        user_msg.push_str(
            "Analyze the following feature to determine if it requires geo-specific compliance logic:\n\n",
        );
        user_msg.push_str(&format!("Title: {}\n", record.title.trim()));
        user_msg.push_str(&format!("Description: {}\n", record.description.trim()));
        user_msg.push_str(&format!("Additional Documents: {documents}\n\n"));

        user_msg.push_str("Consider the following regulations:\n");
        for reg in REGULATIONS {
            user_msg.push_str(&format!("- {} ({})\n", reg.short_name, reg.full_name));
        }

        user_msg.push_str("\nFeatures that typically need geo-compliance logic include:\n");
        for feature in TYPICAL_FEATURES {
            user_msg.push_str(&format!("- {feature}\n"));
        }

        user_msg.push('\n');
        user_msg.push_str(RESPONSE_FORMAT);

        (system_msg, user_msg)
    }
}

/// Cut `text` to at most `max` characters, on a char boundary.
fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}\n[document truncated]", &text[..idx]),
        None => text.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn record(doc: &str) -> FeatureRecord {
        FeatureRecord::new(
            "Live Streaming Feature",
            "Allow users to stream live video content to their followers",
            doc,
        )
    }

    #[test]
    fn user_msg_embeds_feature_fields() {
        let (_, user) = PromptBuilder::new(100).build_chat(&record("stream policy v2"));

        assert!(user.contains("Title: Live Streaming Feature"));
        assert!(user.contains("Description: Allow users to stream live video"));
        assert!(user.contains("Additional Documents: stream policy v2"));
    }

    #[test]
    fn empty_documents_say_none_provided() {
        let (_, user) = PromptBuilder::new(100).build_chat(&record("   "));
        assert!(user.contains("Additional Documents: None provided"));
    }

    #[test]
    fn lists_every_known_regulation() {
        let (_, user) = PromptBuilder::new(100).build_chat(&record(""));
        for reg in REGULATIONS {
            assert!(user.contains(reg.short_name), "missing {}", reg.short_name);
        }
    }

    #[test]
    fn asks_for_labeled_lines() {
        let (system, user) = PromptBuilder::new(100).build_chat(&record(""));
        assert!(system.contains("labeled-line format"));
        for label in ["Decision:", "Reasoning:", "Regulations:", "Confidence:"] {
            assert!(user.contains(label), "missing {label}");
        }
    }

    #[test]
    fn prompt_is_deterministic() {
        let builder = PromptBuilder::new(100);
        assert_eq!(builder.build_chat(&record("x")), builder.build_chat(&record("x")));
    }

    #[test]
    fn long_documents_are_truncated_on_char_boundary() {
        let doc = "é".repeat(50);
        let (_, user) = PromptBuilder::new(10).build_chat(&record(&doc));
        assert!(user.contains(&format!("{}\n[document truncated]", "é".repeat(10))));
        assert!(!user.contains(&"é".repeat(11)));
    }

    #[test]
    fn truncate_leaves_short_text_alone() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("exactly10!", 10), "exactly10!");
    }
}
