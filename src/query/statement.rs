//! Statement lifecycle operations over the HTTP API.
//!
//! [`StatementClient`] is the concrete wire client. It signs every request
//! with a bearer token from the token issuer, speaks the statements
//! endpoints, and decodes responses into typed payloads. The
//! [`StatementApi`] trait is the seam the executor drives, so execution
//! logic can be tested against a mock without a network.

use crate::connection::{ClientConfig, TokenIssuer};
use crate::error::{DecodeError, QueryError, SnowflakeError};
use crate::transport::{
    decode_response, HttpTransport, StatementRequest, StatementResponse, CODE_ASYNC_IN_PROGRESS,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// Base path of the statements collection.
const STATEMENTS_PATH: &str = "/api/v2/statements";

/// Query string requesting asynchronous execution with explicit nulls.
const SUBMIT_QUERY: &str = "?async=true&nullable=true";

/// Statement lifecycle operations: submit, fetch, cancel.
#[async_trait]
pub trait StatementApi: Send + Sync {
    /// Submit a statement for asynchronous execution and return its handle.
    async fn submit(&self, sql: &str) -> Result<String, SnowflakeError>;

    /// Fetch one partition of a statement's result. `partition` is 1-based;
    /// partition 1 doubles as the status poll while the statement runs.
    async fn fetch_partition(
        &self,
        handle: &str,
        partition: usize,
    ) -> Result<StatementResponse, SnowflakeError>;

    /// Request cancellation of a running statement.
    async fn cancel(&self, handle: &str) -> Result<(), SnowflakeError>;
}

/// Wire client for the statements endpoints.
pub struct StatementClient {
    config: Arc<ClientConfig>,
    issuer: Arc<TokenIssuer>,
    transport: HttpTransport,
}

impl StatementClient {
    /// Create a client bound to the configured account endpoint.
    ///
    /// # Errors
    /// Returns a transport error when the underlying HTTP client cannot be
    /// constructed.
    pub fn new(
        config: Arc<ClientConfig>,
        issuer: Arc<TokenIssuer>,
    ) -> Result<Self, SnowflakeError> {
        let transport = HttpTransport::new(&config.base_url)?;
        Ok(Self {
            config,
            issuer,
            transport,
        })
    }

    /// Build the submission body, applying the configured session context.
    fn build_request(&self, sql: &str) -> StatementRequest {
        let mut request = StatementRequest::new(sql);
        if let Some(warehouse) = &self.config.warehouse {
            request = request.with_warehouse(warehouse);
        }
        if let Some(database) = &self.config.database {
            request = request.with_database(database);
        }
        if let Some(schema) = &self.config.schema {
            request = request.with_schema(schema);
        }
        request
    }
}

impl std::fmt::Debug for StatementClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatementClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl StatementApi for StatementClient {
    async fn submit(&self, sql: &str) -> Result<String, SnowflakeError> {
        let token = self.issuer.bearer_token().await?;
        let request = self.build_request(sql);

        let path = format!("{STATEMENTS_PATH}{SUBMIT_QUERY}");
        let raw = self.transport.post_json(&path, &token, &request).await?;
        let payload = decode_response(&raw.body, raw.content_encoding.as_deref(), raw.status)?;
        let response = StatementResponse::from_payload(payload).map_err(DecodeError::from)?;

        let handle = handle_from_response(&response)?;
        info!(handle = %handle, "statement submitted");
        Ok(handle)
    }

    async fn fetch_partition(
        &self,
        handle: &str,
        partition: usize,
    ) -> Result<StatementResponse, SnowflakeError> {
        let token = self.issuer.bearer_token().await?;
        let raw = self
            .transport
            .get(&partition_path(handle, partition), &token)
            .await?;
        let payload = decode_response(&raw.body, raw.content_encoding.as_deref(), raw.status)?;
        let response = StatementResponse::from_payload(payload).map_err(DecodeError::from)?;
        debug!(handle = %handle, partition, code = %response.code(), "partition response");
        Ok(response)
    }

    async fn cancel(&self, handle: &str) -> Result<(), SnowflakeError> {
        let token = self.issuer.bearer_token().await?;
        let raw = self.transport.post_empty(&cancel_path(handle), &token).await?;

        // Any 2xx acknowledges the cancellation, even with an empty or
        // unparsable body.
        if raw.is_success() {
            info!(handle = %handle, "statement cancelled");
            return Ok(());
        }

        match decode_response(&raw.body, raw.content_encoding.as_deref(), raw.status) {
            Ok(_) => Err(DecodeError::Remote {
                status: raw.status,
                message: "cancellation rejected".to_string(),
            }
            .into()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Validate a submission response and extract the statement handle.
fn handle_from_response(response: &StatementResponse) -> Result<String, QueryError> {
    if response.code() != CODE_ASYNC_IN_PROGRESS {
        return Err(QueryError::Submission {
            code: response.code().to_string(),
            message: response.message().to_string(),
        });
    }
    match response.statement_handle.as_deref() {
        Some(handle) if !handle.is_empty() => Ok(handle.to_string()),
        _ => Err(QueryError::MissingHandle),
    }
}

/// Path for one result partition. The caller numbers partitions from one;
/// the service numbers them from zero.
fn partition_path(handle: &str, partition: usize) -> String {
    format!(
        "{STATEMENTS_PATH}/{handle}?partition={}",
        partition.saturating_sub(1)
    )
}

fn cancel_path(handle: &str) -> String {
    format!("{STATEMENTS_PATH}/{handle}/cancel")
}
