//! LLM judge: asks a [`CompletionClient`] for a verdict and never fails.
//!
//! Whatever goes wrong (no API key, transport error, timeout, HTTP error,
//! unparsable answer) the judge returns [`LlmVerdict::fallback`] with the
//! cause in its reasoning.  The batch keeps running and the row is labeled
//! `Needs Review` / `Low` for a human to pick up.

use crate::config::LlmConfig;
use crate::llm::client::{ApiClient, CompletionClient, LlmError};
use crate::llm::parse::parse_verdict;
use crate::llm::prompt::PromptBuilder;
use crate::verdict::{FeatureRecord, LlmVerdict};

// ---------------------------------------------------------------------------
// LlmJudge
// ---------------------------------------------------------------------------

/// Classifies a feature through a completion backend.
///
/// # Example
/// ```rust,no_run
/// use geo_compliance::config::LlmConfig;
/// use geo_compliance::llm::LlmJudge;
/// use geo_compliance::verdict::FeatureRecord;
///
/// # async fn example() {
/// let judge = LlmJudge::from_config(&LlmConfig::default());
/// let record = FeatureRecord::new("Age Verification System", "Age gates", "");
/// // Without an API key this is the fallback verdict, never an error.
/// let verdict = judge.judge(&record).await;
/// println!("{} ({})", verdict.decision, verdict.reasoning);
/// # }
/// ```
pub struct LlmJudge<C: CompletionClient> {
    client: C,
    prompts: PromptBuilder,
}

impl LlmJudge<ApiClient> {
    /// Judge backed by the OpenAI-compatible HTTP client.
    pub fn from_config(config: &LlmConfig) -> Self {
        Self::new(
            ApiClient::from_config(config),
            PromptBuilder::new(config.max_document_chars),
        )
    }
}

impl<C: CompletionClient> LlmJudge<C> {
    pub fn new(client: C, prompts: PromptBuilder) -> Self {
        Self { client, prompts }
    }

    /// Return a reference to the wrapped client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Classify `record`.  Total: failures become the fallback verdict.
    pub async fn judge(&self, record: &FeatureRecord) -> LlmVerdict {
        match self.try_judge(record).await {
            Ok(verdict) => {
                log::debug!(
                    "judge: {:?} → {} ({})",
                    record.title,
                    verdict.decision,
                    verdict.confidence
                );
                verdict
            }
            Err(LlmError::MissingApiKey) => {
                log::debug!("judge: no API key, skipping LLM for {:?}", record.title);
                LlmVerdict::fallback(LlmError::MissingApiKey)
            }
            Err(err) => {
                log::warn!(
                    "judge: LLM analysis failed for {:?} (model {}): {err}",
                    record.title,
                    self.client.model()
                );
                LlmVerdict::fallback(err)
            }
        }
    }

    async fn try_judge(&self, record: &FeatureRecord) -> Result<LlmVerdict, LlmError> {
        let (system, user) = self.prompts.build_chat(record);
        let completion = self.client.complete(&system, &user).await?;
        parse_verdict(&completion)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::verdict::{Confidence, Decision};

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    /// Always answers with a fixed completion and records the prompt.
    struct AlwaysOk {
        answer: String,
        last_user_msg: Mutex<Option<String>>,
    }

    impl AlwaysOk {
        fn new(answer: &str) -> Self {
            Self {
                answer: answer.into(),
                last_user_msg: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl CompletionClient for AlwaysOk {
        async fn complete(&self, _system: &str, user: &str) -> Result<String, LlmError> {
            *self.last_user_msg.lock().unwrap() = Some(user.to_string());
            Ok(self.answer.clone())
        }

        fn model(&self) -> &str {
            "test-model"
        }
    }

    /// Always returns the given error.
    struct AlwaysFails(ErrorKind);

    enum ErrorKind {
        MissingKey,
        Request,
        Timeout,
        Auth,
        Empty,
    }

    #[async_trait]
    impl CompletionClient for AlwaysFails {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String, LlmError> {
            let err = match self.0 {
                ErrorKind::MissingKey => LlmError::MissingApiKey,
                ErrorKind::Request => LlmError::Request("connection refused".into()),
                ErrorKind::Timeout => LlmError::Timeout,
                ErrorKind::Auth => LlmError::Auth(401),
                ErrorKind::Empty => LlmError::EmptyResponse,
            };
            Err(err)
        }

        fn model(&self) -> &str {
            "test-model"
        }
    }

    fn judge_with<C: CompletionClient>(client: C) -> LlmJudge<C> {
        LlmJudge::new(client, PromptBuilder::new(8_000))
    }

    fn record() -> FeatureRecord {
        FeatureRecord::new("Test Feature", "Test description", "")
    }

    fn assert_fallback(verdict: &LlmVerdict, needle: &str) {
        assert_eq!(verdict.decision, Decision::NeedsReview);
        assert_eq!(verdict.confidence, Confidence::Low);
        assert!(verdict.regulations.is_empty());
        assert!(
            verdict.reasoning.contains(needle),
            "reasoning {:?} should mention {needle:?}",
            verdict.reasoning
        );
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn passes_through_parsed_verdict() {
        let judge = judge_with(AlwaysOk::new(
            "Decision: Yes\nReasoning: Test reasoning\nRegulations: DSA, GDPR\nConfidence: High",
        ));
        let v = judge.judge(&record()).await;

        assert_eq!(v.decision, Decision::Yes);
        assert_eq!(v.reasoning, "Test reasoning");
        assert_eq!(v.confidence, Confidence::High);
        assert!(v.regulations.contains("DSA"));
        assert!(v.regulations.contains("GDPR"));
    }

    #[tokio::test]
    async fn sends_feature_in_prompt() {
        let judge = judge_with(AlwaysOk::new("Decision: No"));
        judge
            .judge(&FeatureRecord::new("Dark Mode", "Theme toggle", "design doc"))
            .await;

        let sent = judge.client().last_user_msg.lock().unwrap().clone().unwrap();
        assert!(sent.contains("Title: Dark Mode"));
        assert!(sent.contains("Description: Theme toggle"));
        assert!(sent.contains("Additional Documents: design doc"));
    }

    #[tokio::test]
    async fn missing_key_falls_back() {
        let v = judge_with(AlwaysFails(ErrorKind::MissingKey)).judge(&record()).await;
        assert_fallback(&v, "no API key");
    }

    #[tokio::test]
    async fn transport_error_falls_back() {
        let v = judge_with(AlwaysFails(ErrorKind::Request)).judge(&record()).await;
        assert_fallback(&v, "connection refused");
    }

    #[tokio::test]
    async fn timeout_falls_back() {
        let v = judge_with(AlwaysFails(ErrorKind::Timeout)).judge(&record()).await;
        assert_fallback(&v, "timed out");
    }

    #[tokio::test]
    async fn auth_error_falls_back() {
        let v = judge_with(AlwaysFails(ErrorKind::Auth)).judge(&record()).await;
        assert_fallback(&v, "authentication");
    }

    #[tokio::test]
    async fn empty_response_falls_back() {
        let v = judge_with(AlwaysFails(ErrorKind::Empty)).judge(&record()).await;
        assert_fallback(&v, "empty response");
    }

    #[tokio::test]
    async fn unparsable_answer_falls_back() {
        let v = judge_with(AlwaysOk::new("I think it's probably fine."))
            .judge(&record())
            .await;
        assert_fallback(&v, "could not find a decision");
    }

    #[tokio::test]
    async fn default_config_without_key_never_touches_network() {
        let mut config = LlmConfig::default();
        config.base_url = "http://127.0.0.1:9".into();
        let v = LlmJudge::from_config(&config).judge(&record()).await;
        assert_fallback(&v, "no API key");
    }
}
