//! Error Boundary
//!
//! Explicit last-resort failure handling for a unit of work. Known failure
//! kinds (API, operation, transport) are rendered by a chain of handlers;
//! anything the chain does not recognize is delegated to the handler that
//! was in place before the boundary was installed.
//!
//! ```text
//! unit of work ──Err──▶ [custom handlers] ▶ api ▶ operation ▶ transport ──▶ previous
//! ```

pub mod handlers;

pub use handlers::*;

use crate::diagnostics::{FailureReport, ReportContext};
use crate::error::{Error, Result};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Handler chain wrapped around units of work
pub struct ErrorBoundary {
    context: ReportContext,
    handlers: Vec<Arc<dyn FailureHandler>>,
    previous: Arc<dyn FailureHandler>,
}

/// Install the classifying boundary over the default pass-through handler
pub fn install_exception_hook(context: ReportContext) -> ErrorBoundary {
    ErrorBoundary::wrapping(Arc::new(PassThroughHandler), context)
}

impl ErrorBoundary {
    /// Install the classifying chain in front of an existing handler
    pub fn wrapping(previous: Arc<dyn FailureHandler>, context: ReportContext) -> Self {
        Self {
            context,
            handlers: vec![
                Arc::new(ApiFailureHandler),
                Arc::new(OperationFailureHandler),
                Arc::new(TransportFailureHandler),
            ],
            previous,
        }
    }

    pub fn context(&self) -> &ReportContext {
        &self.context
    }

    /// Put a handler in front of the chain
    pub fn push_handler(&mut self, handler: Arc<dyn FailureHandler>) {
        self.handlers.insert(0, handler);
    }

    /// Render a failure that escaped the unit of work
    pub fn handle(&self, err: Error) -> FailureReport {
        for handler in &self.handlers {
            if let Some(report) = handler.handle(&err, &self.context) {
                debug!("Failure rendered by {} handler", handler.name());
                error!("{}", report.msg);
                return report;
            }
        }

        debug!(
            "Unrecognized failure ({:?}), delegating to {} handler",
            err.kind(),
            self.previous.name()
        );
        let report = self
            .previous
            .handle(&err, &self.context)
            .unwrap_or_else(|| FailureReport::new(err.to_string()));
        if err.is_user_input() {
            warn!("{}", report.msg);
        } else {
            error!("{}", report.msg);
        }
        report
    }

    /// Run a unit of work, rendering any escaping failure
    pub async fn run<T, F>(&self, work: F) -> std::result::Result<T, FailureReport>
    where
        F: Future<Output = Result<T>>,
    {
        work.await.map_err(|err| self.handle(err))
    }

    /// Blocking counterpart of [`ErrorBoundary::run`]
    pub fn run_sync<T, F>(&self, work: F) -> std::result::Result<T, FailureReport>
    where
        F: FnOnce() -> Result<T>,
    {
        work().map_err(|err| self.handle(err))
    }

    /// Remove the boundary, handing back the handler it replaced
    pub fn restore(self) -> Arc<dyn FailureHandler> {
        self.previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::errors::ApiError;
    use crate::diagnostics::{StackTrace, Verbosity};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingHandler {
        calls: AtomicUsize,
    }

    impl FailureHandler for CountingHandler {
        fn handle(&self, error: &Error, _context: &ReportContext) -> Option<FailureReport> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Some(FailureReport::new(format!("previous: {}", error)))
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    /// Claims every user input error before the built-in chain sees it
    struct UserInputHandler;

    impl FailureHandler for UserInputHandler {
        fn handle(&self, error: &Error, _context: &ReportContext) -> Option<FailureReport> {
            match error {
                Error::UserInput(msg) => {
                    Some(FailureReport::new(format!("check your input: {}", msg)))
                }
                _ => None,
            }
        }

        fn name(&self) -> &str {
            "user-input"
        }
    }

    #[tokio::test]
    async fn test_run_passes_success_through() {
        let boundary = install_exception_hook(ReportContext::default());
        let value = boundary.run(async { Ok::<_, Error>(42) }).await.unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn test_run_renders_known_failures() {
        let boundary = install_exception_hook(ReportContext::default());
        let report = boundary
            .run(async {
                Err::<(), _>(Error::Api(
                    ApiError::new(Some(500), r#"{"error":{"message":"boom"}}"#)
                        .with_trace(StackTrace::default()),
                ))
            })
            .await
            .unwrap_err();

        assert!(report.failed);
        assert_eq!(report.msg, "request failed, boom (code: '500')");
    }

    #[test]
    fn test_unrecognized_failures_reach_previous_handler() {
        let previous = Arc::new(CountingHandler {
            calls: AtomicUsize::new(0),
        });
        let boundary =
            ErrorBoundary::wrapping(previous.clone(), ReportContext::new(Verbosity::Debug));

        let report = boundary
            .run_sync(|| Err::<(), _>(Error::Bug("formatting a pending operation".into())))
            .unwrap_err();
        assert_eq!(report.msg, "previous: BUG: formatting a pending operation");
        assert_eq!(previous.calls.load(Ordering::SeqCst), 1);

        let api = Error::Api(ApiError::new(Some(404), "{}").with_trace(StackTrace::default()));
        boundary.handle(api);
        assert_eq!(previous.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_restore_returns_previous_handler() {
        let boundary = install_exception_hook(ReportContext::default());
        let previous = boundary.restore();
        assert_eq!(previous.name(), "pass-through");
    }

    #[test]
    fn test_pushed_handler_runs_first() {
        let mut boundary = install_exception_hook(ReportContext::default());
        boundary.push_handler(Arc::new(UserInputHandler));

        let report = boundary.handle(Error::UserInput("size 'X'".into()));
        assert_eq!(report.msg, "check your input: size 'X'");

        let report = boundary.handle(Error::Configuration("missing host".into()));
        assert_eq!(report.msg, "Configuration error: missing host");
    }
}
