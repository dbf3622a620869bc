//! Failure handlers
//!
//! Each handler recognizes one failure kind and renders it through the
//! matching diagnostic formatter.

use crate::diagnostics::{
    format_api_exception, format_failed_operation, format_transport_exception, FailureReport,
    ReportContext,
};
use crate::error::Error;
use serde_json::Value;

/// A link in the error boundary's handler chain
pub trait FailureHandler: Send + Sync {
    /// Render the error, or `None` when this handler does not recognize it
    fn handle(&self, error: &Error, context: &ReportContext) -> Option<FailureReport>;

    /// Name used in logs
    fn name(&self) -> &str;
}

/// Structured REST error responses
pub struct ApiFailureHandler;

impl FailureHandler for ApiFailureHandler {
    fn handle(&self, error: &Error, context: &ReportContext) -> Option<FailureReport> {
        let Error::Api(exc) = error else {
            return None;
        };
        let (msg, body) = format_api_exception(exc, &exc.trace);
        Some(FailureReport::compose(
            msg,
            body.map(Value::Object),
            Some(&exc.trace),
            context,
        ))
    }

    fn name(&self) -> &str {
        "api"
    }
}

/// Operations that reached the `Failed` status
pub struct OperationFailureHandler;

impl FailureHandler for OperationFailureHandler {
    fn handle(&self, error: &Error, context: &ReportContext) -> Option<FailureReport> {
        let Error::OperationFailed { operation, trace } = error else {
            return None;
        };
        let msg = match format_failed_operation(operation) {
            Ok(msg) => msg,
            Err(bug) => bug.to_string(),
        };
        let details = serde_json::to_value(&**operation).ok();
        Some(FailureReport::compose(msg, details, Some(trace), context))
    }

    fn name(&self) -> &str {
        "operation"
    }
}

/// Network / HTTP layer failures
pub struct TransportFailureHandler;

impl FailureHandler for TransportFailureHandler {
    fn handle(&self, error: &Error, context: &ReportContext) -> Option<FailureReport> {
        let Error::Transport(exc) = error else {
            return None;
        };
        let msg = format_transport_exception(exc, &exc.trace);
        Some(FailureReport::compose(msg, None, Some(&exc.trace), context))
    }

    fn name(&self) -> &str {
        "transport"
    }
}

/// Renders any error through its `Display`; the default "previous" handler
pub struct PassThroughHandler;

impl FailureHandler for PassThroughHandler {
    fn handle(&self, error: &Error, _context: &ReportContext) -> Option<FailureReport> {
        Some(FailureReport::new(error.to_string()))
    }

    fn name(&self) -> &str {
        "pass-through"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::errors::{ApiError, TransportError, TransportErrorKind};
    use crate::diagnostics::{StackTrace, Verbosity};
    use crate::domain::{Operation, OperationError, OperationStatus};

    fn context(verbosity: Verbosity) -> ReportContext {
        ReportContext::new(verbosity)
    }

    #[test]
    fn test_handlers_ignore_other_kinds() {
        let err = Error::UserInput("bad".into());
        let ctx = context(Verbosity::Terse);

        assert!(ApiFailureHandler.handle(&err, &ctx).is_none());
        assert!(OperationFailureHandler.handle(&err, &ctx).is_none());
        assert!(TransportFailureHandler.handle(&err, &ctx).is_none());
        assert_eq!(
            PassThroughHandler.handle(&err, &ctx).unwrap().msg,
            "Invalid input: bad"
        );
    }

    #[test]
    fn test_api_handler_attaches_body() {
        let trace = StackTrace::from_symbols(["storage_ops::api::volumes_api::get_volume"]);
        let err = Error::Api(
            ApiError::new(
                Some(400),
                r#"{"error":{"message":"bad","pure_code":"X1"},"request_id":"r1"}"#,
            )
            .with_trace(trace),
        );

        let report = ApiFailureHandler
            .handle(&err, &context(Verbosity::Detailed))
            .unwrap();
        assert_eq!(report.msg, "'Get volume' failed, bad (code: 'X1', request id: 'r1')");
        assert_eq!(report.details.unwrap()["request_id"], "r1");
        assert!(report.traceback.is_none());
    }

    #[test]
    fn test_operation_handler_attaches_record() {
        let op = Operation::new("op1", OperationStatus::Failed, "CreateVolume").with_error(
            OperationError {
                message: Some("disk full".into()),
                pure_code: Some("E2".into()),
                http_code: None,
            },
        );
        let err = Error::operation_failed(op);

        let report = OperationFailureHandler
            .handle(&err, &context(Verbosity::Debug))
            .unwrap();
        assert_eq!(
            report.msg,
            "Create volume: operation failed, disk full (code: 'E2', operation id: 'op1')"
        );
        assert_eq!(report.details.unwrap()["id"], "op1");
        assert!(report.traceback.is_some());
    }

    #[test]
    fn test_operation_handler_reports_bug_for_non_failed_record() {
        let op = Operation::new("op1", OperationStatus::Succeeded, "CreateVolume");
        let err = Error::operation_failed(op);

        let report = OperationFailureHandler
            .handle(&err, &context(Verbosity::Terse))
            .unwrap();
        assert!(report.msg.starts_with("BUG: "));
    }

    #[test]
    fn test_transport_handler() {
        let err = Error::Transport(
            TransportError::new(TransportErrorKind::Timeout, "timed out")
                .with_trace(StackTrace::default()),
        );

        let report = TransportFailureHandler
            .handle(&err, &context(Verbosity::Terse))
            .unwrap();
        assert_eq!(report.msg, "HTTP request failed via 'TimeoutError' - timed out");
    }
}
