//! Data models for the writing assistant.
//!
//! This module contains the core data structures shared by the dispatcher,
//! the aggregator and the report renderers: the check kinds, the scan
//! request, the typed payloads returned by the analysis provider and the
//! per-scan report.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One of the supported text analyses.
///
/// The derived ordering is the canonical dispatch order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum CheckKind {
    /// Spelling errors with suggested corrections and a correctness score
    Spelling,
    /// Tamil <-> English translation
    Translation,
    /// Richer vocabulary, tone adjustment and loanword removal
    Vocabulary,
    /// Tamil idioms and proverbs that fit the text
    Idioms,
}

impl CheckKind {
    /// All check kinds in canonical order.
    pub const ALL: [CheckKind; 4] = [
        CheckKind::Spelling,
        CheckKind::Translation,
        CheckKind::Vocabulary,
        CheckKind::Idioms,
    ];

    /// Stable lowercase identifier, as used in config files and JSON.
    pub fn id(&self) -> &'static str {
        match self {
            CheckKind::Spelling => "spelling",
            CheckKind::Translation => "translation",
            CheckKind::Vocabulary => "vocabulary",
            CheckKind::Idioms => "idioms",
        }
    }

    /// Name of the check in user-facing notifications.
    pub fn feature_name(&self) -> &'static str {
        match self {
            CheckKind::Spelling => "spell-check",
            CheckKind::Translation => "translation",
            CheckKind::Vocabulary => "vocabulary",
            CheckKind::Idioms => "idioms",
        }
    }

    /// Generic user-facing message shown when this check fails.
    pub fn failure_message(&self) -> &'static str {
        match self {
            CheckKind::Spelling => "Failed to run spell check.",
            CheckKind::Translation => "Failed to translate text.",
            CheckKind::Vocabulary => "Failed to suggest synonyms.",
            CheckKind::Idioms => "Failed to suggest idioms.",
        }
    }

    /// Returns an emoji representation of the check.
    pub fn emoji(&self) -> &'static str {
        match self {
            CheckKind::Spelling => "📝",
            CheckKind::Translation => "🌐",
            CheckKind::Vocabulary => "📚",
            CheckKind::Idioms => "💬",
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckKind::Spelling => write!(f, "Spelling"),
            CheckKind::Translation => write!(f, "Translation"),
            CheckKind::Vocabulary => write!(f, "Vocabulary"),
            CheckKind::Idioms => write!(f, "Idioms"),
        }
    }
}

/// Desired tone for the vocabulary check.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Formal,
    Informal,
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tone::Formal => write!(f, "formal"),
            Tone::Informal => write!(f, "informal"),
        }
    }
}

/// Toggle state of a single check.
///
/// `Indeterminate` counts as enabled: any state other than `Off` runs the check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "RawCheckState")]
pub enum CheckState {
    On,
    #[default]
    Off,
    Indeterminate,
}

impl CheckState {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, CheckState::Off)
    }
}

impl From<bool> for CheckState {
    fn from(enabled: bool) -> Self {
        if enabled {
            CheckState::On
        } else {
            CheckState::Off
        }
    }
}

/// Accepts either a boolean or a named state when deserializing.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawCheckState {
    Flag(bool),
    Named(NamedCheckState),
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum NamedCheckState {
    On,
    Off,
    Indeterminate,
}

impl From<RawCheckState> for CheckState {
    fn from(raw: RawCheckState) -> Self {
        match raw {
            RawCheckState::Flag(flag) => CheckState::from(flag),
            RawCheckState::Named(NamedCheckState::On) => CheckState::On,
            RawCheckState::Named(NamedCheckState::Off) => CheckState::Off,
            RawCheckState::Named(NamedCheckState::Indeterminate) => CheckState::Indeterminate,
        }
    }
}

/// Which checks to run, plus the parameters some checks need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckSelection {
    states: BTreeMap<CheckKind, CheckState>,
    tone: Tone,
}

impl Default for CheckSelection {
    /// Spelling on, everything else off, formal tone.
    fn default() -> Self {
        Self::none().with(CheckKind::Spelling, CheckState::On)
    }
}

impl CheckSelection {
    /// A selection with every check switched off.
    pub fn none() -> Self {
        Self {
            states: CheckKind::ALL
                .iter()
                .map(|kind| (*kind, CheckState::Off))
                .collect(),
            tone: Tone::default(),
        }
    }

    /// A selection with exactly the given checks switched on.
    #[allow(dead_code)] // Builder utility
    pub fn from_kinds<I: IntoIterator<Item = CheckKind>>(kinds: I) -> Self {
        kinds
            .into_iter()
            .fold(Self::none(), |selection, kind| selection.with(kind, CheckState::On))
    }

    pub fn with(mut self, kind: CheckKind, state: CheckState) -> Self {
        self.states.insert(kind, state);
        self
    }

    pub fn with_tone(mut self, tone: Tone) -> Self {
        self.tone = tone;
        self
    }

    pub fn tone(&self) -> Tone {
        self.tone
    }

    /// Enabled checks in canonical order.
    pub fn enabled(&self) -> Vec<CheckKind> {
        self.states
            .iter()
            .filter(|(_, state)| state.is_enabled())
            .map(|(kind, _)| *kind)
            .collect()
    }
}

/// Immutable input of one scan: the text plus the selection read at dispatch time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    text: String,
    selection: CheckSelection,
}

impl ScanRequest {
    pub fn new(text: impl Into<String>, selection: CheckSelection) -> Self {
        Self {
            text: text.into(),
            selection,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn selection(&self) -> &CheckSelection {
        &self.selection
    }

    pub fn tone(&self) -> Tone {
        self.selection.tone()
    }
}

/// A misspelled word and the corrections suggested for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellingCorrection {
    pub original_word: String,
    pub suggested_corrections: Vec<String>,
}

/// Result of the spelling check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellCheckResult {
    /// The text with every spelling error corrected.
    pub corrected_text: String,
    /// One entry per misspelled word.
    pub corrections: Vec<SpellingCorrection>,
    /// Correctness of the original text, 0 (wrong) to 100 (perfect).
    pub correctness_score: f64,
}

/// Language detected in the input of the translation check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceLanguage {
    Tamil,
    English,
}

impl fmt::Display for SourceLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceLanguage::Tamil => write!(f, "Tamil"),
            SourceLanguage::English => write!(f, "English"),
        }
    }
}

/// Result of the translation check.
///
/// Tamil input carries `english_translation`; English input carries
/// `tamil_translation` and `thanglish_transcription`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationResult {
    pub source_language: SourceLanguage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub english_translation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tamil_translation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thanglish_transcription: Option<String>,
}

impl TranslationResult {
    pub fn from_tamil(english_translation: String) -> Self {
        Self {
            source_language: SourceLanguage::Tamil,
            english_translation: Some(english_translation),
            tamil_translation: None,
            thanglish_transcription: None,
        }
    }

    pub fn from_english(tamil_translation: String, thanglish_transcription: String) -> Self {
        Self {
            source_language: SourceLanguage::English,
            english_translation: None,
            tamil_translation: Some(tamil_translation),
            thanglish_transcription: Some(thanglish_transcription),
        }
    }
}

/// A single word replacement applied by the vocabulary check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordChange {
    pub original_word: String,
    pub replacement_word: String,
}

/// Result of the vocabulary check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyResult {
    pub enhanced_text: String,
    /// English loanwords that were removed or replaced.
    pub removed_loanwords: Vec<String>,
    pub applied_changes: Vec<WordChange>,
}

/// Result of the idiom check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdiomResult {
    pub suggestions: Vec<String>,
}

/// Successful payload of any check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckPayload {
    Spelling(SpellCheckResult),
    Translation(TranslationResult),
    Vocabulary(VocabularyResult),
    Idioms(IdiomResult),
}

impl CheckPayload {
    /// The check kind that produced this payload.
    pub fn kind(&self) -> CheckKind {
        match self {
            CheckPayload::Spelling(_) => CheckKind::Spelling,
            CheckPayload::Translation(_) => CheckKind::Translation,
            CheckPayload::Vocabulary(_) => CheckKind::Vocabulary,
            CheckPayload::Idioms(_) => CheckKind::Idioms,
        }
    }
}

/// Why a check failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckFailure {
    /// Generic user-facing message.
    pub message: String,
    /// Underlying cause, for logs and the detailed report.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

impl CheckFailure {
    pub fn new(kind: CheckKind, cause: impl Into<String>) -> Self {
        Self {
            message: kind.failure_message().to_string(),
            cause: Some(cause.into()),
        }
    }
}

impl fmt::Display for CheckFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{} ({})", self.message, cause),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Outcome of one check in one scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "lowercase")]
pub enum CheckOutcome {
    Success(CheckPayload),
    Failure(CheckFailure),
    Skipped,
}

impl CheckOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CheckOutcome::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, CheckOutcome::Failure(_))
    }

    pub fn payload(&self) -> Option<&CheckPayload> {
        match self {
            CheckOutcome::Success(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&CheckFailure> {
        match self {
            CheckOutcome::Failure(failure) => Some(failure),
            _ => None,
        }
    }
}

/// A user-facing notification raised by a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.description)
    }
}

/// The outcomes of one scan, keyed by check kind.
///
/// A report is only built by the aggregator and never changes afterwards;
/// the next scan produces a new one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    generation: u64,
    outcomes: BTreeMap<CheckKind, CheckOutcome>,
}

static SKIPPED: CheckOutcome = CheckOutcome::Skipped;

impl Report {
    pub(crate) fn new(outcomes: BTreeMap<CheckKind, CheckOutcome>) -> Self {
        Self {
            generation: 0,
            outcomes,
        }
    }

    pub(crate) fn with_generation(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }

    /// Scan generation this report belongs to.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Checks covered by this report, in canonical order.
    #[allow(dead_code)] // Utility for callers inspecting coverage
    pub fn checks(&self) -> Vec<CheckKind> {
        self.outcomes.keys().copied().collect()
    }

    /// Outcome of a check; checks that were not run are `Skipped`.
    pub fn outcome(&self, kind: CheckKind) -> &CheckOutcome {
        self.outcomes.get(&kind).unwrap_or(&SKIPPED)
    }

    pub fn outcomes(&self) -> impl Iterator<Item = (CheckKind, &CheckOutcome)> {
        self.outcomes.iter().map(|(kind, outcome)| (*kind, outcome))
    }

    pub fn has_failures(&self) -> bool {
        self.outcomes.values().any(CheckOutcome::is_failure)
    }

    pub fn spelling(&self) -> Option<&SpellCheckResult> {
        match self.outcome(CheckKind::Spelling).payload() {
            Some(CheckPayload::Spelling(result)) => Some(result),
            _ => None,
        }
    }

    #[allow(dead_code)] // Typed accessor, rendering matches on payloads directly
    pub fn translation(&self) -> Option<&TranslationResult> {
        match self.outcome(CheckKind::Translation).payload() {
            Some(CheckPayload::Translation(result)) => Some(result),
            _ => None,
        }
    }

    pub fn vocabulary(&self) -> Option<&VocabularyResult> {
        match self.outcome(CheckKind::Vocabulary).payload() {
            Some(CheckPayload::Vocabulary(result)) => Some(result),
            _ => None,
        }
    }

    #[allow(dead_code)] // Typed accessor, rendering matches on payloads directly
    pub fn idioms(&self) -> Option<&IdiomResult> {
        match self.outcome(CheckKind::Idioms).payload() {
            Some(CheckPayload::Idioms(result)) => Some(result),
            _ => None,
        }
    }

    /// One notification per failed check, naming the check.
    pub fn notifications(&self) -> Vec<Notification> {
        self.outcomes()
            .filter_map(|(kind, outcome)| {
                outcome.failure().map(|failure| Notification {
                    title: format!("Error in {}", kind.feature_name()),
                    description: failure.message.clone(),
                })
            })
            .collect()
    }
}

/// Summary counts for a report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub checks_run: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl ReportSummary {
    pub fn from_report(report: &Report) -> Self {
        let mut summary = Self::default();

        for (_, outcome) in report.outcomes() {
            match outcome {
                CheckOutcome::Success(_) => summary.succeeded += 1,
                CheckOutcome::Failure(_) => summary.failed += 1,
                CheckOutcome::Skipped => continue,
            }
            summary.checks_run += 1;
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idioms(suggestions: &[&str]) -> CheckOutcome {
        CheckOutcome::Success(CheckPayload::Idioms(IdiomResult {
            suggestions: suggestions.iter().map(|s| s.to_string()).collect(),
        }))
    }

    #[test]
    fn test_check_kind_canonical_order() {
        let mut kinds = vec![
            CheckKind::Idioms,
            CheckKind::Spelling,
            CheckKind::Vocabulary,
            CheckKind::Translation,
        ];
        kinds.sort();
        assert_eq!(kinds, CheckKind::ALL.to_vec());
    }

    #[test]
    fn test_default_selection_enables_spelling_only() {
        let selection = CheckSelection::default();
        assert_eq!(selection.enabled(), vec![CheckKind::Spelling]);
        assert_eq!(selection.tone(), Tone::Formal);
    }

    #[test]
    fn test_indeterminate_counts_as_enabled() {
        let selection = CheckSelection::none()
            .with(CheckKind::Idioms, CheckState::Indeterminate)
            .with(CheckKind::Translation, CheckState::On);
        assert_eq!(
            selection.enabled(),
            vec![CheckKind::Translation, CheckKind::Idioms]
        );
    }

    #[test]
    fn test_check_state_accepts_bool_or_name() {
        #[derive(Deserialize)]
        struct Holder {
            a: CheckState,
            b: CheckState,
            c: CheckState,
        }

        let holder: Holder =
            toml::from_str("a = true\nb = \"indeterminate\"\nc = \"off\"").unwrap();
        assert_eq!(holder.a, CheckState::On);
        assert_eq!(holder.b, CheckState::Indeterminate);
        assert_eq!(holder.c, CheckState::Off);
    }

    #[test]
    fn test_spell_check_result_uses_camel_case() {
        let json = r#"{
            "correctedText": "நான் உணவு",
            "corrections": [{"originalWord": "சாப்பாடு", "suggestedCorrections": ["உணவு"]}],
            "correctnessScore": 80
        }"#;
        let result: SpellCheckResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.corrections[0].original_word, "சாப்பாடு");
        assert_eq!(result.correctness_score, 80.0);
    }

    #[test]
    fn test_report_outcome_defaults_to_skipped() {
        let mut outcomes = BTreeMap::new();
        outcomes.insert(CheckKind::Idioms, idioms(&["ஆறுவது சினம்"]));
        let report = Report::new(outcomes);

        assert_eq!(report.outcome(CheckKind::Spelling), &CheckOutcome::Skipped);
        assert!(report.outcome(CheckKind::Idioms).is_success());
        assert_eq!(report.checks(), vec![CheckKind::Idioms]);
        assert!(report.idioms().is_some());
        assert!(report.spelling().is_none());
    }

    #[test]
    fn test_notifications_name_failed_checks() {
        let mut outcomes = BTreeMap::new();
        outcomes.insert(
            CheckKind::Translation,
            CheckOutcome::Failure(CheckFailure::new(CheckKind::Translation, "timeout")),
        );
        outcomes.insert(CheckKind::Idioms, idioms(&[]));
        let report = Report::new(outcomes);

        let notifications = report.notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].title, "Error in translation");
        assert_eq!(notifications[0].description, "Failed to translate text.");
        assert!(report.has_failures());
    }

    #[test]
    fn test_spelling_notification_uses_feature_name() {
        let mut outcomes = BTreeMap::new();
        outcomes.insert(
            CheckKind::Spelling,
            CheckOutcome::Failure(CheckFailure::new(CheckKind::Spelling, "bad json")),
        );

        let notifications = Report::new(outcomes).notifications();
        assert_eq!(notifications[0].title, "Error in spell-check");
        assert_eq!(notifications[0].description, "Failed to run spell check.");
    }

    #[test]
    fn test_report_summary() {
        let mut outcomes = BTreeMap::new();
        outcomes.insert(CheckKind::Idioms, idioms(&[]));
        outcomes.insert(
            CheckKind::Spelling,
            CheckOutcome::Failure(CheckFailure::new(CheckKind::Spelling, "bad json")),
        );
        let summary = ReportSummary::from_report(&Report::new(outcomes));

        assert_eq!(summary.checks_run, 2);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
    }

    #[test]
    fn test_outcome_serialization_is_tagged() {
        let outcome = CheckOutcome::Failure(CheckFailure::new(CheckKind::Idioms, "boom"));
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "failure");
        assert_eq!(json["detail"]["message"], "Failed to suggest idioms.");
    }
}
