//! Failure reports
//!
//! The terminal result of a failed unit of work, with detail escalating by
//! verbosity.

use crate::diagnostics::trace::StackTrace;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How much detail a failure report carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    /// Message only
    #[default]
    Terse,
    /// Message and structured detail
    Detailed,
    /// Message, detail and raw stack trace
    Debug,
}

impl Verbosity {
    /// Map a `-v` count onto a verbosity level
    pub fn from_level(level: u8) -> Self {
        match level {
            0 => Verbosity::Terse,
            1 => Verbosity::Detailed,
            _ => Verbosity::Debug,
        }
    }

    pub fn includes_details(&self) -> bool {
        *self >= Verbosity::Detailed
    }

    pub fn includes_traceback(&self) -> bool {
        *self >= Verbosity::Debug
    }
}

/// Context resolved once at the unit-of-work boundary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportContext {
    pub verbosity: Verbosity,
}

impl ReportContext {
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }
}

/// Result of a unit of work that failed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureReport {
    /// Always `true`; mirrors the automation framework's result shape
    pub failed: bool,
    pub msg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traceback: Option<String>,
}

impl FailureReport {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            failed: true,
            msg: msg.into(),
            details: None,
            traceback: None,
        }
    }

    /// Build a report, attaching detail and trace as the verbosity allows
    pub fn compose(
        msg: impl Into<String>,
        details: Option<Value>,
        trace: Option<&StackTrace>,
        context: &ReportContext,
    ) -> Self {
        let mut report = Self::new(msg);
        if context.verbosity.includes_details() {
            report.details = details;
        }
        if context.verbosity.includes_traceback() {
            report.traceback = trace
                .filter(|trace| !trace.raw().is_empty())
                .map(|trace| trace.raw().to_string());
        }
        report
    }
}

impl std::fmt::Display for FailureReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn trace() -> StackTrace {
        StackTrace::from_symbols(["storage_ops::api::volumes_api::get_volume"])
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(Verbosity::from_level(0), Verbosity::Terse);
        assert_eq!(Verbosity::from_level(1), Verbosity::Detailed);
        assert_eq!(Verbosity::from_level(2), Verbosity::Debug);
        assert_eq!(Verbosity::from_level(7), Verbosity::Debug);
    }

    #[test]
    fn test_compose_escalates_detail() {
        let details = Some(json!({"request_id": "r1"}));

        let compose = |verbosity: Verbosity| {
            FailureReport::compose(
                "boom",
                details.clone(),
                Some(&trace()),
                &ReportContext::new(verbosity),
            )
        };

        let terse = compose(Verbosity::Terse);
        assert_eq!(terse.details, None);
        assert_eq!(terse.traceback, None);

        let detailed = compose(Verbosity::Detailed);
        assert_eq!(detailed.details, details);
        assert_eq!(detailed.traceback, None);

        let debug = compose(Verbosity::Debug);
        assert_eq!(debug.details, details);
        assert!(debug.traceback.unwrap().contains("get_volume"));
    }

    #[test]
    fn test_report_serialization_skips_absent_fields() {
        let report = FailureReport::new("request failed");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json, json!({"failed": true, "msg": "request failed"}));
    }
}
