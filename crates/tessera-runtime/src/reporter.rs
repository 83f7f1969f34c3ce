//! Exception reporting.
//!
//! Configuration and validation failures are reported before the
//! `Exception` page is rendered. [`TracingReporter`] is the default;
//! [`MemoryReporter`] keeps reports for inspection in tests.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::error::Error as _;
use tessera_types::{CycleId, ErrorCode};
use tracing::error;

use crate::{EngineError, ErrorKind};

/// What is known about one failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionReport {
    pub cycle_id: String,
    pub code: String,
    pub message: String,
    /// Messages of the error's sources, outermost first.
    pub chain: Vec<String>,
    /// Page active when the failure occurred.
    pub page: Option<String>,
}

impl ExceptionReport {
    #[must_use]
    pub fn new(cycle_id: CycleId, page: Option<&str>, err: &EngineError) -> Self {
        let mut chain = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            chain.push(cause.to_string());
            source = cause.source();
        }
        Self {
            cycle_id: cycle_id.to_string(),
            code: err.code().to_string(),
            message: err.to_string(),
            chain,
            page: page.map(str::to_string),
        }
    }
}

/// Receives reports of failed requests.
pub trait ExceptionReporter: Send + Sync {
    fn report(&self, kind: ErrorKind, report: &ExceptionReport);
}

/// Logs reports at `error`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ExceptionReporter for TracingReporter {
    fn report(&self, kind: ErrorKind, report: &ExceptionReport) {
        error!(
            cycle = %report.cycle_id,
            code = %report.code,
            kind = ?kind,
            page = report.page.as_deref().unwrap_or("-"),
            chain = ?report.chain,
            "{}",
            report.message
        );
    }
}

/// Keeps reports in memory.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    reports: Mutex<Vec<(ErrorKind, ExceptionReport)>>,
}

impl MemoryReporter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn reports(&self) -> Vec<(ErrorKind, ExceptionReport)> {
        self.reports.lock().clone()
    }

    #[must_use]
    pub fn codes(&self) -> Vec<String> {
        self.reports
            .lock()
            .iter()
            .map(|(_, report)| report.code.clone())
            .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reports.lock().is_empty()
    }
}

impl ExceptionReporter for MemoryReporter {
    fn report(&self, kind: ErrorKind, report: &ExceptionReport) {
        self.reports.lock().push((kind, report.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_component::ComponentError;
    use tessera_event::EventError;

    #[test]
    fn report_collects_chain() {
        let err = EngineError::Component(ComponentError::Event(EventError::NoTargets {
            method: "onSave".into(),
        }));
        let report = ExceptionReport::new(CycleId::new(), Some("Home"), &err);

        assert_eq!(report.code, "ENGINE_COMPONENT");
        assert!(report.message.contains("No targets found"));
        assert_eq!(report.page.as_deref(), Some("Home"));
    }

    #[test]
    fn memory_reporter_keeps_reports() {
        let reporter = MemoryReporter::new();
        assert!(reporter.is_empty());

        let err = EngineError::UnknownService("nope".into());
        reporter.report(err.kind(), &ExceptionReport::new(CycleId::new(), None, &err));

        assert_eq!(reporter.codes(), vec!["ENGINE_UNKNOWN_SERVICE"]);
        assert_eq!(reporter.reports()[0].0, ErrorKind::Configuration);
    }
}
