//! Error classification and message formatting
//!
//! Turns API errors, failed operations and transport errors into single-line
//! diagnostics. Every optional field is read through accessors that return
//! `None` instead of failing, so formatting never raises on its own.

use crate::api::errors::{ApiError, TransportError};
use crate::diagnostics::trace::StackTrace;
use crate::domain::{Operation, OperationStatus};
use crate::error::{Error, Result};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

// =============================================================================
// Classified Error
// =============================================================================

/// Fields extracted from an API failure
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifiedError {
    pub message: Option<String>,
    pub call_site: Option<String>,
    pub resource_name: Option<String>,
    pub code: Option<String>,
    pub request_id: Option<String>,
    pub raw_body: Option<Map<String, Value>>,
}

impl ClassifiedError {
    /// Extract every available field from an API error
    pub fn from_api_error(exc: &ApiError, trace: &StackTrace) -> Self {
        let body: Option<Map<String, Value>> = match serde_json::from_str::<Value>(&exc.body) {
            Ok(Value::Object(map)) => Some(map),
            _ => None,
        };
        let doc = body.as_ref();

        let code = lookup_str(doc, &["error", "pure_code"])
            .or_else(|| exc.status.map(|status| status.to_string()))
            .or_else(|| lookup_str(doc, &["error", "http_code"]));

        Self {
            message: lookup_str(doc, &["error", "message"]),
            call_site: extract_call_site(trace),
            resource_name: lookup_str(doc, &["error", "details", "name"]),
            code,
            request_id: lookup_str(doc, &["request_id"]),
            raw_body: body,
        }
    }

    /// Render the single-line diagnostic
    pub fn message(&self) -> String {
        let mut msg = match &self.call_site {
            Some(call_site) => format!("'{}' failed", call_site),
            None => "request failed".to_string(),
        };

        if let Some(message) = &self.message {
            msg.push_str(", ");
            msg.push_str(&normalize_quotes(message));
        }

        let mut details = Vec::new();
        if let Some(name) = &self.resource_name {
            details.push(format!("resource: '{}'", name));
        }
        if let Some(code) = &self.code {
            details.push(format!("code: '{}'", code));
        }
        if let Some(request_id) = &self.request_id {
            details.push(format!("request id: '{}'", request_id));
        }
        push_details(&mut msg, &details);

        msg
    }
}

// =============================================================================
// Field Access
// =============================================================================

/// Walk a path of object keys, stopping at the first missing one
fn lookup<'a>(doc: Option<&'a Map<String, Value>>, path: &[&str]) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    rest.iter().try_fold(doc?.get(*first)?, |node, key| node.get(key))
}

/// String or number at `path`, rendered as text
fn lookup_str(doc: Option<&Map<String, Value>>, path: &[&str]) -> Option<String> {
    match lookup(doc, path)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn normalize_quotes(text: &str) -> String {
    text.replace('"', "'")
}

fn push_details(msg: &mut String, details: &[String]) {
    if !details.is_empty() {
        msg.push_str(&format!(" ({})", details.join(", ")));
    }
}

/// `snake_case` to a capitalized phrase
fn humanize(name: &str) -> String {
    capitalize(&name.replace('_', " "))
}

/// Upper-case the first character, lower-case the rest
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

// =============================================================================
// Call Site
// =============================================================================

fn api_module_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bapi::[A-Za-z0-9_]+_api\b").expect("api module regex is valid"))
}

/// Name of the innermost API function on the stack, e.g. `"Get volume"`
///
/// A frame qualifies when its module path contains an `api` module followed
/// by a `*_api` submodule and its function name is a plain identifier.
pub fn extract_call_site(trace: &StackTrace) -> Option<String> {
    trace
        .frames()
        .iter()
        .filter(|frame| api_module_regex().is_match(frame.module_path()))
        .map(|frame| frame.function())
        .find(|function| is_identifier(function))
        .map(humanize)
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

// =============================================================================
// Formatters
// =============================================================================

/// Format a structured API error
///
/// Returns the diagnostic line and the parsed body when it was a JSON object.
pub fn format_api_exception(
    exc: &ApiError,
    trace: &StackTrace,
) -> (String, Option<Map<String, Value>>) {
    let classified = ClassifiedError::from_api_error(exc, trace);
    (classified.message(), classified.raw_body)
}

fn pascal_first_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(.)([A-Z][a-z]+)").expect("pascal case regex is valid"))
}

fn pascal_second_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([a-z0-9])([A-Z])").expect("pascal case regex is valid"))
}

/// `CreateVolume` to `Create volume`
fn operation_name(request_type: &str) -> String {
    if request_type.is_empty() {
        return "Operation".to_string();
    }
    let spaced = pascal_first_regex().replace_all(request_type, "${1} ${2}");
    let spaced = pascal_second_regex().replace_all(&spaced, "${1} ${2}");
    capitalize(&spaced)
}

/// Format a failed operation
///
/// Formatting an operation that has not failed is a caller bug.
pub fn format_failed_operation(op: &Operation) -> Result<String> {
    if op.status != OperationStatus::Failed {
        return Err(Error::Bug(format!(
            "operation {} is {}, only failed operations can be formatted as failures",
            op.id, op.status
        )));
    }

    let mut msg = format!("{}: operation failed", operation_name(&op.request_type));

    let error = op.error.as_ref();
    if let Some(message) = error.and_then(|e| e.message.as_deref()) {
        msg.push_str(", ");
        msg.push_str(&normalize_quotes(message));
    }

    let code = error.and_then(|e| {
        e.pure_code
            .clone()
            .or_else(|| e.http_code.map(|code| code.to_string()))
    });

    let mut details = Vec::new();
    if let Some(code) = code {
        details.push(format!("code: '{}'", code));
    }
    if !op.id.is_empty() {
        details.push(format!("operation id: '{}'", op.id));
    }
    push_details(&mut msg, &details);

    Ok(msg)
}

/// Format a transport-layer failure, naming the innermost cause
pub fn format_transport_exception(exc: &TransportError, trace: &StackTrace) -> String {
    let mut msg = String::new();
    if let Some(call_site) = extract_call_site(trace) {
        msg.push_str(&format!("'{}': ", call_site));
    }

    let outer = exc.kind.name();
    let inner = exc.innermost().kind.name();
    msg.push_str("HTTP request failed via ");
    if inner != outer {
        msg.push_str(&format!("'{}'/'{}'", inner, outer));
    } else {
        msg.push_str(&format!("'{}'", outer));
    }

    msg.push_str(" - ");
    msg.push_str(&normalize_quotes(&exc.to_string()));
    msg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::errors::TransportErrorKind;
    use crate::domain::OperationError;
    use assert_matches::assert_matches;

    fn volume_trace() -> StackTrace {
        StackTrace::from_symbols([
            "std::backtrace::Backtrace::force_capture",
            "storage_ops::diagnostics::trace::StackTrace::capture",
            "storage_ops::api::volumes_api::VolumesApi::get_volume::{{closure}}",
            "storage_ops::reconcile::volume::apply",
        ])
    }

    #[test]
    fn test_extract_call_site() {
        assert_eq!(extract_call_site(&volume_trace()).as_deref(), Some("Get volume"));

        let trace = StackTrace::from_symbols([
            "storage_ops::api::placement_groups_api::update_placement_group::h0011223344556677",
        ]);
        assert_eq!(
            extract_call_site(&trace).as_deref(),
            Some("Update placement group")
        );
    }

    #[test]
    fn test_extract_call_site_from_v0_symbols() {
        let trace = StackTrace::from_symbols([
            "<storage_ops::api::errors::ApiError>::new",
            "<storage_ops::api::operations_api::RestOperationsClient>::get_operation::{closure#0}",
            "storage_ops::operations::awaiter::poll_until_terminal::<storage_ops::api::operations_api::RestOperationsClient>::{closure#0}",
        ]);
        assert_eq!(extract_call_site(&trace).as_deref(), Some("Get operation"));
    }

    #[test]
    fn test_extract_call_site_ignores_shims_and_impl_blocks() {
        let trace = StackTrace::from_symbols([
            "storage_ops::api::volumes_api::{shim:vtable#0}::<dyn core::any::Any>",
            "storage_ops::api::volumes_api::<impl storage_ops::api::volumes_api::Client>",
        ]);
        assert_eq!(extract_call_site(&trace), None);
    }

    #[test]
    fn test_extract_call_site_requires_api_submodule() {
        let trace = StackTrace::from_symbols([
            "storage_ops::api::errors::ApiError::new",
            "storage_ops::snapi::volumes_api::get_volume",
            "storage_ops::reconcile::volume::apply",
        ]);
        assert_eq!(extract_call_site(&trace), None);
        assert_eq!(extract_call_site(&StackTrace::default()), None);
    }

    #[test]
    fn test_format_api_exception() {
        let exc = ApiError::new(
            Some(400),
            r#"{"error":{"message":"bad","pure_code":"X1"},"request_id":"r1"}"#,
        );
        let (msg, body) = format_api_exception(&exc, &volume_trace());

        assert_eq!(msg, "'Get volume' failed, bad (code: 'X1', request id: 'r1')");
        assert_eq!(body.unwrap()["request_id"], "r1");
    }

    #[test]
    fn test_format_api_exception_full_details() {
        let exc = ApiError::new(
            Some(409),
            r#"{"error":{"message":"volume \"v1\" exists","details":{"name":"v1"}}}"#,
        );
        let (msg, _) = format_api_exception(&exc, &StackTrace::default());

        assert_eq!(
            msg,
            "request failed, volume 'v1' exists (resource: 'v1', code: '409')"
        );
    }

    #[test]
    fn test_format_api_exception_code_precedence() {
        let exc = ApiError::new(None, r#"{"error":{"http_code":503}}"#);
        let (msg, _) = format_api_exception(&exc, &StackTrace::default());
        assert_eq!(msg, "request failed (code: '503')");
    }

    #[test]
    fn test_format_api_exception_unparsable_body() {
        let exc = ApiError::new(Some(502), "<html>Bad Gateway</html>");
        let (msg, body) = format_api_exception(&exc, &StackTrace::default());

        assert_eq!(msg, "request failed (code: '502')");
        assert!(body.is_none());

        let exc = ApiError::new(None, r#"{"error":"flat string"}"#);
        let (msg, body) = format_api_exception(&exc, &StackTrace::default());
        assert_eq!(msg, "request failed");
        assert!(body.is_some());
    }

    #[test]
    fn test_operation_name() {
        assert_eq!(operation_name("CreateVolume"), "Create volume");
        assert_eq!(operation_name("UpdateVolumeSnapshot"), "Update volume snapshot");
        assert_eq!(operation_name("DeleteHostAccessPolicy"), "Delete host access policy");
        assert_eq!(operation_name("CreateS3Bucket"), "Create s3 bucket");
        assert_eq!(operation_name(""), "Operation");
    }

    #[test]
    fn test_format_failed_operation() {
        let op = Operation::new("op1", OperationStatus::Failed, "CreateVolume").with_error(
            OperationError {
                message: Some("disk full".into()),
                pure_code: Some("E2".into()),
                http_code: Some(507),
            },
        );

        assert_eq!(
            format_failed_operation(&op).unwrap(),
            "Create volume: operation failed, disk full (code: 'E2', operation id: 'op1')"
        );
    }

    #[test]
    fn test_format_failed_operation_falls_back_to_http_code() {
        let op = Operation::new("op2", OperationStatus::Failed, "DeletePlacementGroup").with_error(
            OperationError {
                message: None,
                pure_code: None,
                http_code: Some(404),
            },
        );

        assert_eq!(
            format_failed_operation(&op).unwrap(),
            "Delete placement group: operation failed (code: '404', operation id: 'op2')"
        );
    }

    #[test]
    fn test_format_non_failed_operation_is_a_bug() {
        let op = Operation::new("op3", OperationStatus::Succeeded, "CreateVolume");
        assert_matches!(format_failed_operation(&op), Err(Error::Bug(_)));

        let op = Operation::new("op4", OperationStatus::Pending, "CreateVolume");
        assert_matches!(format_failed_operation(&op), Err(Error::Bug(_)));
    }

    #[test]
    fn test_format_transport_exception() {
        let exc = TransportError::new(
            TransportErrorKind::Request,
            "error sending request for url (\"https://api/operations/op1\")",
        )
        .caused_by(TransportError::new(TransportErrorKind::Connect, "connection refused"));

        let trace = StackTrace::from_symbols([
            "storage_ops::api::operations_api::RestOperationsClient::get_operation",
        ]);

        assert_eq!(
            format_transport_exception(&exc, &trace),
            "'Get operation': HTTP request failed via 'ConnectError'/'RequestError' - error sending request for url ('https://api/operations/op1')"
        );
    }

    #[test]
    fn test_format_transport_exception_single_layer() {
        let exc = TransportError::new(TransportErrorKind::Timeout, "operation timed out");
        assert_eq!(
            format_transport_exception(&exc, &StackTrace::default()),
            "HTTP request failed via 'TimeoutError' - operation timed out"
        );
    }
}
