//! Concurrent check dispatch.
//!
//! A scan runs every enabled check against the provider at the same time on
//! the calling task and waits for all of them to settle. A failing check
//! never aborts or delays the others; its error becomes a `Failure` outcome.

use super::aggregator::{aggregate, AggregateError};
use crate::models::{CheckFailure, CheckKind, CheckOutcome, Report, ScanRequest};
use crate::provider::schema::validate_payload;
use crate::provider::{AnalysisError, AnalysisProvider};
use futures::future::join_all;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

/// Input rejected before any provider call is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter some text before scanning.")]
    EmptyText,

    #[error("Please select at least one validation to run.")]
    NoChecksEnabled,
}

impl ValidationError {
    /// Short title for the user-facing notification.
    pub fn title(&self) -> &'static str {
        match self {
            ValidationError::EmptyText => "Input Required",
            ValidationError::NoChecksEnabled => "No Validations Selected",
        }
    }
}

/// Why a scan produced no report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed to assemble report: {0}")]
    Aggregate(#[from] AggregateError),
}

/// Validate a request and return the checks to run, in canonical order.
pub fn validate_request(request: &ScanRequest) -> Result<Vec<CheckKind>, ValidationError> {
    if request.text().trim().is_empty() {
        return Err(ValidationError::EmptyText);
    }

    let enabled = request.selection().enabled();
    if enabled.is_empty() {
        return Err(ValidationError::NoChecksEnabled);
    }

    Ok(enabled)
}

/// Runs scans against an analysis provider.
pub struct Dispatcher<P> {
    provider: P,
    generation: AtomicU64,
}

impl<P: AnalysisProvider> Dispatcher<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            generation: AtomicU64::new(0),
        }
    }

    #[allow(dead_code)] // Accessor for callers holding only the dispatcher
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Generation of the most recently started scan (0 before the first).
    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Whether `report` belongs to the most recently started scan.
    ///
    /// In-flight scans are never cancelled; callers that keep one dispatcher
    /// across overlapping scans drop stale reports instead.
    #[allow(dead_code)] // The CLI dispatches once per dispatcher
    pub fn is_current(&self, report: &Report) -> bool {
        report.generation() == self.current_generation()
    }

    /// Run one scan.
    ///
    /// Validation errors are returned before any provider call. Otherwise
    /// the report holds exactly one outcome per enabled check.
    pub async fn dispatch(&self, request: &ScanRequest) -> Result<Report, ScanError> {
        let enabled = validate_request(request)?;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        info!(
            "Scan {} started: {} check(s) with {}",
            generation,
            enabled.len(),
            self.provider.name()
        );

        let calls = enabled.iter().map(|kind| self.run_check(*kind, request));
        let outcomes = join_all(calls).await;

        let report = aggregate(&enabled, outcomes)?.with_generation(generation);

        info!(
            "Scan {} settled: {} failed",
            generation,
            report.notifications().len()
        );

        Ok(report)
    }

    /// Run a single check and fold every way it can fail into one outcome.
    async fn run_check(&self, kind: CheckKind, request: &ScanRequest) -> (CheckKind, CheckOutcome) {
        debug!("Dispatching {} check", kind);

        let result = match AssertUnwindSafe(self.provider.analyze(kind, request))
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(panic) => Err(AnalysisError::Panicked(panic_message(panic.as_ref()))),
        };

        let checked = result.and_then(|payload| {
            validate_payload(&payload)?;
            if payload.kind() != kind {
                return Err(AnalysisError::schema(
                    kind,
                    format!("provider returned a {} payload", payload.kind()),
                ));
            }
            Ok(payload)
        });

        let outcome = match checked {
            Ok(payload) => {
                debug!("{} check succeeded", kind);
                CheckOutcome::Success(payload)
            }
            Err(e) => {
                warn!("{} check failed: {}", kind, e);
                CheckOutcome::Failure(CheckFailure::new(kind, e.to_string()))
            }
        };

        (kind, outcome)
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
