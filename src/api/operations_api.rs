//! Operations API client
//!
//! REST implementation of [`OperationsApi`] over `reqwest`.

use crate::api::errors::{ApiError, TransportError};
use crate::config::ClientConfig;
use crate::domain::{Operation, OperationsApi};
use crate::error::{Error, Result};
use async_trait::async_trait;
use tracing::debug;

/// Client for the `/operations` endpoints
#[derive(Debug, Clone)]
pub struct RestOperationsClient {
    config: ClientConfig,
    http: reqwest::Client,
}

impl RestOperationsClient {
    /// Create a client from a validated configuration
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { config, http })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn operation_url(&self, operation_id: &str) -> String {
        format!(
            "{}/operations/{}",
            self.config.base_url(),
            urlencoding::encode(operation_id)
        )
    }

    /// `GET /operations/{id}`
    pub async fn get_operation(&self, operation_id: &str) -> Result<Operation> {
        let url = self.operation_url(operation_id);
        debug!("GET {}", url);

        let mut request = self.http.get(&url);
        if let Some(token) = &self.config.access_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(&e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::from_reqwest(&e))?;

        if !status.is_success() {
            return Err(ApiError::new(Some(status.as_u16()), body).into());
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl OperationsApi for RestOperationsClient {
    async fn get_operation(&self, operation_id: &str) -> Result<Operation> {
        RestOperationsClient::get_operation(self, operation_id).await
    }
}
