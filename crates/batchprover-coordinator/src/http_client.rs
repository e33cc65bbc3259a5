//! HTTP client infrastructure for the coordinator.
//!
//! One `reqwest::Client` per run with a connect timeout and an optional
//! whole-request timeout. There is no retry policy: every call is a single
//! attempt and any response, whatever its status, is handed back.

use reqwest::{Client, RequestBuilder};
use std::time::Duration;
use tracing::debug;

use batchprover_utils::redaction::redact_error_message;

use crate::error::CoordinatorError;
use crate::types::CoordinatorResponse;

#[derive(Debug, Clone)]
pub(crate) struct HttpClient {
    client: Client,
    connect_timeout: Duration,
    request_timeout: Option<Duration>,
}

impl HttpClient {
    /// # Errors
    ///
    /// Returns `CoordinatorError::Misconfiguration` if the client cannot be constructed
    pub(crate) fn new(
        connect_timeout: Duration,
        request_timeout: Option<Duration>,
    ) -> Result<Self, CoordinatorError> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| {
                CoordinatorError::Misconfiguration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            connect_timeout,
            request_timeout,
        })
    }

    pub(crate) fn client(&self) -> &Client {
        &self.client
    }

    /// Send one request and read the full response body.
    ///
    /// # Errors
    ///
    /// - `CoordinatorError::Timeout` when a configured timeout elapses
    /// - `CoordinatorError::Transport` for any other failure before the body is read
    pub(crate) async fn execute(
        &self,
        request_builder: RequestBuilder,
        operation: &str,
    ) -> Result<CoordinatorResponse, CoordinatorError> {
        let request_builder = match self.request_timeout {
            Some(timeout) => request_builder.timeout(timeout),
            None => request_builder,
        };

        let response = request_builder
            .send()
            .await
            .map_err(|e| self.map_transport_error(&e, operation))?;

        let status = response.status().as_u16();
        debug!(operation, status, "Coordinator responded");

        let body = response
            .bytes()
            .await
            .map_err(|e| self.map_transport_error(&e, operation))?;

        Ok(CoordinatorResponse::new(status, body.to_vec()))
    }

    fn map_transport_error(&self, error: &reqwest::Error, operation: &str) -> CoordinatorError {
        if error.is_timeout() {
            return CoordinatorError::Timeout {
                duration: self.expired_timeout(error.is_connect()),
            };
        }

        CoordinatorError::Transport(format!(
            "{operation} request failed: {}",
            redact_error_message(&error_chain(error))
        ))
    }
}

impl HttpClient {
    /// The timeout that fired: the connect timeout while connecting, else the
    /// request timeout if one is set.
    fn expired_timeout(&self, during_connect: bool) -> Duration {
        match (during_connect, self.request_timeout) {
            (false, Some(request_timeout)) => request_timeout,
            _ => self.connect_timeout,
        }
    }
}

/// Error text including sources, e.g. the underlying "connection refused".
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
