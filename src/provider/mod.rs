//! Analysis providers.
//!
//! An [`AnalysisProvider`] performs the linguistic work behind each check.
//! The dispatcher only sees this trait; [`OllamaProvider`] is the
//! production implementation backed by a hosted model.

pub mod ollama;
pub mod prompts;
pub mod schema;

pub use ollama::{OllamaConfig, OllamaProvider};

use crate::models::{
    CheckKind, CheckPayload, IdiomResult, ScanRequest, SpellCheckResult, Tone, TranslationResult,
    VocabularyResult,
};
use async_trait::async_trait;

/// Failure of a single provider call.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("cannot connect to Ollama at {0}. Is Ollama running?")]
    Connect(String),

    #[error("Ollama API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("model reply is not valid JSON: {0}")]
    MalformedResponse(String),

    #[error("{check} reply does not match its schema: {reason}")]
    Schema { check: CheckKind, reason: String },

    /// The provider answered with an explicit `{"error": ...}` payload.
    #[error("provider reported an error: {0}")]
    Reported(String),

    #[error("Could not determine the language of the provided text. Please provide either Tamil or English text.")]
    LanguageUndetermined,

    #[error("analysis panicked: {0}")]
    Panicked(String),
}

impl AnalysisError {
    pub fn schema(check: CheckKind, reason: impl Into<String>) -> Self {
        AnalysisError::Schema {
            check,
            reason: reason.into(),
        }
    }
}

/// A text-analysis backend, one operation per check kind.
///
/// Every call is made at most once per scan; implementations must not retry
/// on behalf of the dispatcher.
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    /// Name of the backing model, for reports and logs.
    fn name(&self) -> &str;

    async fn check_spelling(&self, text: &str) -> Result<SpellCheckResult, AnalysisError>;

    async fn translate(&self, text: &str) -> Result<TranslationResult, AnalysisError>;

    async fn enhance_vocabulary(
        &self,
        text: &str,
        tone: Tone,
    ) -> Result<VocabularyResult, AnalysisError>;

    async fn suggest_idioms(&self, text: &str) -> Result<IdiomResult, AnalysisError>;

    /// Run the operation for `kind` against the request's text.
    async fn analyze(
        &self,
        kind: CheckKind,
        request: &ScanRequest,
    ) -> Result<CheckPayload, AnalysisError> {
        let text = request.text();
        let payload = match kind {
            CheckKind::Spelling => CheckPayload::Spelling(self.check_spelling(text).await?),
            CheckKind::Translation => CheckPayload::Translation(self.translate(text).await?),
            CheckKind::Vocabulary => CheckPayload::Vocabulary(
                self.enhance_vocabulary(text, request.tone()).await?,
            ),
            CheckKind::Idioms => CheckPayload::Idioms(self.suggest_idioms(text).await?),
        };
        Ok(payload)
    }
}
