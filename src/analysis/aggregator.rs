//! Outcome aggregation and report statistics.
//!
//! This module folds the dispatcher's per-check outcomes into a [`Report`]
//! and provides small utilities over finished reports.

use crate::models::{CheckFailure, CheckKind, CheckOutcome, Report, ReportSummary};
use std::collections::BTreeMap;

/// The outcome sequence does not line up with the enabled checks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AggregateError {
    #[error("expected {expected} outcomes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("outcome {index} belongs to {actual}, expected {expected}")]
    KindMismatch {
        index: usize,
        expected: CheckKind,
        actual: CheckKind,
    },

    #[error("{check} outcome carries a {payload} payload")]
    PayloadMismatch {
        check: CheckKind,
        payload: CheckKind,
    },
}

/// Build a report from outcomes listed in dispatch order.
///
/// `outcomes[i]` must belong to `enabled[i]`. Outcomes are stored verbatim;
/// checks outside `enabled` are absent from the report.
pub fn aggregate(
    enabled: &[CheckKind],
    outcomes: Vec<(CheckKind, CheckOutcome)>,
) -> Result<Report, AggregateError> {
    if enabled.len() != outcomes.len() {
        return Err(AggregateError::LengthMismatch {
            expected: enabled.len(),
            actual: outcomes.len(),
        });
    }

    let mut merged = BTreeMap::new();

    for (index, (expected, (actual, outcome))) in enabled.iter().zip(outcomes).enumerate() {
        if *expected != actual {
            return Err(AggregateError::KindMismatch {
                index,
                expected: *expected,
                actual,
            });
        }

        if let Some(payload) = outcome.payload() {
            if payload.kind() != actual {
                return Err(AggregateError::PayloadMismatch {
                    check: actual,
                    payload: payload.kind(),
                });
            }
        }

        merged.insert(actual, outcome);
    }

    Ok(Report::new(merged))
}

/// Failed checks with their failures, in canonical order.
pub fn failed_checks(report: &Report) -> Vec<(CheckKind, &CheckFailure)> {
    report
        .outcomes()
        .filter_map(|(kind, outcome)| outcome.failure().map(|failure| (kind, failure)))
        .collect()
}

/// Checks that produced a payload, in canonical order.
pub fn succeeded_checks(report: &Report) -> Vec<CheckKind> {
    report
        .outcomes()
        .filter(|(_, outcome)| outcome.is_success())
        .map(|(kind, _)| kind)
        .collect()
}

/// Generate a text summary of a scan.
pub fn generate_summary_text(report: &Report) -> String {
    let summary = ReportSummary::from_report(report);
    let mut lines = Vec::new();

    lines.push(format!("Checks run: {}", summary.checks_run));
    let succeeded: Vec<String> = succeeded_checks(report)
        .iter()
        .map(ToString::to_string)
        .collect();
    if succeeded.is_empty() {
        lines.push(format!("- ✅ Succeeded: {}", summary.succeeded));
    } else {
        lines.push(format!(
            "- ✅ Succeeded: {} ({})",
            summary.succeeded,
            succeeded.join(", ")
        ));
    }
    lines.push(format!("- ❌ Failed: {}", summary.failed));

    for (kind, failure) in failed_checks(report) {
        lines.push(format!("  - {} {}: {}", kind.emoji(), kind, failure));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CheckPayload, IdiomResult, SpellCheckResult};

    fn spelling_ok() -> CheckOutcome {
        CheckOutcome::Success(CheckPayload::Spelling(SpellCheckResult {
            corrected_text: "நான் உணவு".to_string(),
            corrections: vec![],
            correctness_score: 95.0,
        }))
    }

    fn idioms_ok() -> CheckOutcome {
        CheckOutcome::Success(CheckPayload::Idioms(IdiomResult {
            suggestions: vec!["அகத்தின் அழகு முகத்தில் தெரியும்".to_string()],
        }))
    }

    fn failed(kind: CheckKind) -> CheckOutcome {
        CheckOutcome::Failure(CheckFailure::new(kind, "connection refused"))
    }

    #[test]
    fn test_aggregate_keys_match_enabled() {
        let enabled = vec![CheckKind::Spelling, CheckKind::Translation, CheckKind::Idioms];
        let outcomes = vec![
            (CheckKind::Spelling, spelling_ok()),
            (CheckKind::Translation, failed(CheckKind::Translation)),
            (CheckKind::Idioms, idioms_ok()),
        ];

        let report = aggregate(&enabled, outcomes).unwrap();

        assert_eq!(report.checks(), enabled);
        assert!(report.outcome(CheckKind::Spelling).is_success());
        assert!(report.outcome(CheckKind::Translation).is_failure());
        assert!(report.outcome(CheckKind::Idioms).is_success());
        assert_eq!(report.outcome(CheckKind::Vocabulary), &CheckOutcome::Skipped);
    }

    #[test]
    fn test_aggregate_rejects_length_mismatch() {
        let enabled = vec![CheckKind::Spelling, CheckKind::Idioms];
        let err = aggregate(&enabled, vec![(CheckKind::Spelling, spelling_ok())]).unwrap_err();
        assert_eq!(
            err,
            AggregateError::LengthMismatch {
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_aggregate_rejects_misaligned_order() {
        let enabled = vec![CheckKind::Spelling, CheckKind::Idioms];
        let outcomes = vec![
            (CheckKind::Idioms, idioms_ok()),
            (CheckKind::Spelling, spelling_ok()),
        ];

        let err = aggregate(&enabled, outcomes).unwrap_err();
        assert!(matches!(err, AggregateError::KindMismatch { index: 0, .. }));
    }

    #[test]
    fn test_aggregate_rejects_foreign_payload() {
        let enabled = vec![CheckKind::Spelling];
        let err = aggregate(&enabled, vec![(CheckKind::Spelling, idioms_ok())]).unwrap_err();
        assert_eq!(
            err,
            AggregateError::PayloadMismatch {
                check: CheckKind::Spelling,
                payload: CheckKind::Idioms
            }
        );
    }

    #[test]
    fn test_failed_and_succeeded_checks() {
        let enabled = vec![CheckKind::Spelling, CheckKind::Vocabulary];
        let outcomes = vec![
            (CheckKind::Spelling, spelling_ok()),
            (CheckKind::Vocabulary, failed(CheckKind::Vocabulary)),
        ];
        let report = aggregate(&enabled, outcomes).unwrap();

        assert_eq!(succeeded_checks(&report), vec![CheckKind::Spelling]);
        let failures = failed_checks(&report);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, CheckKind::Vocabulary);
        assert_eq!(failures[0].1.message, "Failed to suggest synonyms.");
    }

    #[test]
    fn test_generate_summary_text() {
        let enabled = vec![CheckKind::Translation, CheckKind::Idioms];
        let outcomes = vec![
            (CheckKind::Translation, failed(CheckKind::Translation)),
            (CheckKind::Idioms, idioms_ok()),
        ];
        let text = generate_summary_text(&aggregate(&enabled, outcomes).unwrap());

        assert!(text.contains("Checks run: 2"));
        assert!(text.contains("Succeeded: 1 (Idioms)"));
        assert!(text.contains("Translation: Failed to translate text."));
    }
}
