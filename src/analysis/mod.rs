//! Scan orchestration.
//!
//! The dispatcher fans a scan out to the provider; the aggregator folds the
//! settled outcomes into a report.

pub mod aggregator;
pub mod dispatcher;

pub use aggregator::*;
pub use dispatcher::{Dispatcher, ScanError};
