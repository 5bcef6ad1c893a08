//! Markdown and JSON report generation.
//!
//! This module renders a finished scan: one section per enabled check in
//! canonical order, failure blocks for checks that did not complete, and
//! the corrected text when corrections were applied.

use crate::analysis::failed_checks;
use crate::models::{
    CheckKind, CheckOutcome, CheckPayload, IdiomResult, Notification, Report, ReportSummary,
    SourceLanguage, SpellCheckResult, TranslationResult, VocabularyResult,
};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Metadata about one scan run.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// Date and time of the scan.
    pub analysis_date: DateTime<Utc>,
    /// Name of the LLM model used.
    pub model_used: String,
    /// Scan generation id.
    pub generation: u64,
    /// Wall-clock duration of the scan in seconds.
    pub duration_seconds: f64,
    /// Characters in the scanned text.
    pub input_chars: usize,
}

/// Everything a rendered report shows.
#[derive(Debug, Clone, Serialize)]
pub struct ScanDocument<'a> {
    pub metadata: ReportMetadata,
    pub summary: ReportSummary,
    pub report: &'a Report,
    pub notifications: Vec<Notification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corrected_text: Option<String>,
}

impl<'a> ScanDocument<'a> {
    pub fn new(metadata: ReportMetadata, report: &'a Report) -> Self {
        Self {
            metadata,
            summary: ReportSummary::from_report(report),
            report,
            notifications: report.notifications(),
            corrected_text: None,
        }
    }

    pub fn with_corrected_text(mut self, text: String) -> Self {
        self.corrected_text = Some(text);
        self
    }
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(document: &ScanDocument<'_>) -> String {
    let mut output = String::new();

    output.push_str("# TamilScribe Report\n\n");
    output.push_str(&generate_metadata_section(
        &document.metadata,
        &document.summary,
    ));

    for (kind, outcome) in document.report.outcomes() {
        output.push_str(&generate_check_section(kind, outcome));
    }

    output.push_str(&generate_failures_section(document.report));

    if let Some(ref corrected) = document.corrected_text {
        output.push_str(&generate_corrected_text_section(corrected));
    }

    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata, summary: &ReportSummary) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!(
        "- **Scan Date:** {}\n",
        metadata.analysis_date.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Model Used:** `{}`\n", metadata.model_used));
    section.push_str(&format!("- **Scan:** #{}\n", metadata.generation));
    section.push_str(&format!("- **Characters:** {}\n", metadata.input_chars));
    section.push_str(&format!("- **Checks Run:** {}\n", summary.checks_run));
    section.push_str(&format!("- **Succeeded:** {}\n", summary.succeeded));
    if summary.failed > 0 {
        section.push_str(&format!("- **Failed:** {}\n", summary.failed));
    }
    section.push_str(&format!(
        "- **Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the section for one check.
fn generate_check_section(kind: CheckKind, outcome: &CheckOutcome) -> String {
    let mut section = format!("## {} {}\n\n", kind.emoji(), kind);

    match outcome {
        CheckOutcome::Success(payload) => {
            let body = match payload {
                CheckPayload::Spelling(result) => generate_spelling_body(result),
                CheckPayload::Translation(result) => generate_translation_body(result),
                CheckPayload::Vocabulary(result) => generate_vocabulary_body(result),
                CheckPayload::Idioms(result) => generate_idioms_body(result),
            };
            section.push_str(&body);
        }
        CheckOutcome::Failure(failure) => {
            section.push_str(&format!("> ❌ {}\n\n", failure.message));
        }
        CheckOutcome::Skipped => {
            section.push_str("*Not run.*\n\n");
        }
    }

    section
}

fn generate_spelling_body(result: &SpellCheckResult) -> String {
    let mut body = String::new();

    body.push_str(&format!(
        "**Correctness Score:** {:.0}/100\n\n",
        result.correctness_score
    ));

    if result.corrections.is_empty() {
        body.push_str("No spelling errors found. 🎉\n\n");
        return body;
    }

    body.push_str("| Original | Suggestions |\n");
    body.push_str("|:---|:---|\n");
    for correction in &result.corrections {
        body.push_str(&format!(
            "| {} | {} |\n",
            escape_cell(&correction.original_word),
            escape_cell(&correction.suggested_corrections.join(", "))
        ));
    }
    body.push('\n');

    body.push_str("**Corrected Text:**\n\n");
    body.push_str(&quote(&result.corrected_text));

    body
}

fn generate_translation_body(result: &TranslationResult) -> String {
    let mut body = format!("**Detected Language:** {}\n\n", result.source_language);

    match result.source_language {
        SourceLanguage::Tamil => {
            if let Some(ref english) = result.english_translation {
                body.push_str("**English:**\n\n");
                body.push_str(&quote(english));
            }
        }
        SourceLanguage::English => {
            if let Some(ref tamil) = result.tamil_translation {
                body.push_str("**Tamil:**\n\n");
                body.push_str(&quote(tamil));
            }
            if let Some(ref thanglish) = result.thanglish_transcription {
                body.push_str("**Thanglish:**\n\n");
                body.push_str(&quote(thanglish));
            }
        }
    }

    body
}

fn generate_vocabulary_body(result: &VocabularyResult) -> String {
    let mut body = String::new();

    body.push_str("**Enhanced Text:**\n\n");
    body.push_str(&quote(&result.enhanced_text));

    if !result.applied_changes.is_empty() {
        body.push_str("| Original | Replacement |\n");
        body.push_str("|:---|:---|\n");
        for change in &result.applied_changes {
            body.push_str(&format!(
                "| {} | {} |\n",
                escape_cell(&change.original_word),
                escape_cell(&change.replacement_word)
            ));
        }
        body.push('\n');
    }

    if !result.removed_loanwords.is_empty() {
        body.push_str(&format!(
            "**Removed Loanwords:** {}\n\n",
            result.removed_loanwords.join(", ")
        ));
    }

    body
}

fn generate_idioms_body(result: &IdiomResult) -> String {
    if result.suggestions.is_empty() {
        return "No idioms suggested.\n\n".to_string();
    }

    let mut body = String::new();
    for suggestion in &result.suggestions {
        body.push_str(&format!("- {}\n", suggestion));
    }
    body.push('\n');
    body
}

/// Generate the failure details section.
fn generate_failures_section(report: &Report) -> String {
    let failures = failed_checks(report);
    if failures.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## Failures\n\n");

    for (kind, failure) in failures {
        section.push_str(&format!("- **{}:** {}", kind, failure.message));
        if let Some(ref cause) = failure.cause {
            section.push_str(&format!(" `{}`", cause));
        }
        section.push('\n');
    }
    section.push('\n');

    section
}

fn generate_corrected_text_section(text: &str) -> String {
    let mut section = String::new();
    section.push_str("## Corrected Text\n\n");
    section.push_str(&quote(text));
    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str("*Report generated by TamilScribe*\n");

    footer
}

/// Render text as a Markdown block quote.
fn quote(text: &str) -> String {
    let mut block: String = text.lines().map(|line| format!("> {}\n", line)).collect();
    if block.is_empty() {
        block.push_str(">\n");
    }
    block.push('\n');
    block
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

/// Generate a JSON report.
pub fn generate_json_report(document: &ScanDocument<'_>) -> Result<String> {
    serde_json::to_string_pretty(document).map_err(Into::into)
}
