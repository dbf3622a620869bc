//! Domain Ports - trait boundaries towards the remote orchestration API
//!
//! Adapters implement these traits; the awaiter and reconciliation callers
//! only depend on the traits.

use crate::domain::operation::Operation;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// The "Operations" API group of the remote service
#[async_trait]
pub trait OperationsApi: Send + Sync {
    /// Fetch the current state of an operation
    async fn get_operation(&self, operation_id: &str) -> Result<Operation>;
}

#[async_trait]
impl<T: OperationsApi + ?Sized> OperationsApi for Arc<T> {
    async fn get_operation(&self, operation_id: &str) -> Result<Operation> {
        (**self).get_operation(operation_id).await
    }
}
