//! Asynchronous execution coordination.
//!
//! [`QueryExecutor`] drives the full lifecycle of one statement: submit,
//! poll until the service reports completion, then fan out over the
//! remaining partitions with bounded concurrency. A client-side timeout
//! turns into a single cancellation request and an empty result rather
//! than an error.

use crate::error::{QueryError, SnowflakeError};
use crate::query::results::{ExecutionState, RawRows, ResultMetadata, ResultSet};
use crate::query::statement::StatementApi;
use crate::transport::{StatementResponse, CODE_ASYNC_IN_PROGRESS, CODE_SUCCESS};
use futures_util::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

/// Interval between status polls.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Upper bound on partition fetches in flight at once.
const MAX_CONCURRENT_FETCHES: usize = 8;

/// Outcome of a single status poll.
#[derive(Debug)]
pub enum PollState {
    /// The statement is still executing
    Pending,
    /// The statement completed; the response carries the result metadata
    /// and the first partition of rows
    Ready(StatementResponse),
}

/// Drives a statement from submission to a materializable result.
pub struct QueryExecutor {
    api: Arc<dyn StatementApi>,
    timeout: Duration,
}

impl QueryExecutor {
    /// Create an executor with a default per-statement timeout.
    pub fn new(api: Arc<dyn StatementApi>, timeout: Duration) -> Self {
        Self { api, timeout }
    }

    /// Execute a statement with the executor's default timeout.
    ///
    /// # Errors
    /// See [`QueryExecutor::execute_with_timeout`].
    pub async fn execute(&self, sql: &str) -> Result<ResultSet, SnowflakeError> {
        self.execute_with_timeout(sql, self.timeout).await
    }

    /// Execute a statement, waiting at most `timeout` for completion.
    ///
    /// When the timeout elapses the statement is cancelled with a single
    /// request, regardless of outcome, and an empty result is returned
    /// whose state records whether the cancellation was acknowledged.
    ///
    /// # Errors
    /// Returns an error when submission is rejected, the service reports a
    /// terminal failure, a response violates the protocol, or the wire
    /// fails.
    pub async fn execute_with_timeout(
        &self,
        sql: &str,
        timeout: Duration,
    ) -> Result<ResultSet, SnowflakeError> {
        let handle = self.api.submit(sql).await?;
        let started = Instant::now();

        let completed = loop {
            match self.poll_once(&handle).await? {
                PollState::Ready(response) => break response,
                PollState::Pending => {
                    if started.elapsed() >= timeout {
                        warn!(handle = %handle, ?timeout, "execution timed out, cancelling");
                        return Ok(self.cancel_after_timeout(&handle).await);
                    }
                    sleep(POLL_INTERVAL).await;
                }
            }
        };

        self.assemble(&handle, completed).await
    }

    /// Issue one status poll against the first partition.
    ///
    /// # Errors
    /// Returns [`QueryError::Failed`] when the service reports a terminal
    /// application code that is neither success nor in-progress.
    pub async fn poll_once(&self, handle: &str) -> Result<PollState, SnowflakeError> {
        let response = self.api.fetch_partition(handle, 1).await?;
        match response.code() {
            CODE_SUCCESS => Ok(PollState::Ready(response)),
            CODE_ASYNC_IN_PROGRESS => Ok(PollState::Pending),
            code => Err(QueryError::Failed {
                code: code.to_string(),
                message: response.message().to_string(),
            }
            .into()),
        }
    }

    async fn cancel_after_timeout(&self, handle: &str) -> ResultSet {
        match self.api.cancel(handle).await {
            Ok(()) => ResultSet::empty(ExecutionState::Cancelled),
            Err(err) => {
                warn!(handle = %handle, error = %err, "cancellation after timeout failed");
                ResultSet::empty(ExecutionState::TimedOut)
            }
        }
    }

    /// Validate a completed response and collect every partition.
    async fn assemble(
        &self,
        handle: &str,
        completed: StatementResponse,
    ) -> Result<ResultSet, SnowflakeError> {
        let meta = completed
            .result_set_meta_data
            .as_ref()
            .ok_or_else(|| QueryError::Protocol {
                field: "resultSetMetaData".to_string(),
            })?;
        let metadata = ResultMetadata::from_wire(meta)?;
        let first_rows = completed.data.ok_or_else(|| QueryError::Protocol {
            field: "data".to_string(),
        })?;

        info!(
            handle = %handle,
            rows = metadata.row_count,
            partitions = metadata.partition_count,
            "statement completed"
        );

        let partition_count = metadata.partition_count;
        let mut results = ResultSet::new(metadata);
        results.store_partition(1, first_rows);

        if partition_count > 1 {
            self.fetch_remaining(handle, partition_count, &mut results)
                .await?;
        }

        results.set_state(ExecutionState::Succeeded);
        Ok(results)
    }

    /// Fetch partitions 2..=N concurrently, storing each as it arrives.
    async fn fetch_remaining(
        &self,
        handle: &str,
        partition_count: usize,
        results: &mut ResultSet,
    ) -> Result<(), SnowflakeError> {
        let mut fetches = futures_util::stream::iter((2..=partition_count).map(|index| {
            let api = Arc::clone(&self.api);
            let handle = handle.to_string();
            async move {
                let response = api.fetch_partition(&handle, index).await?;
                let rows = response.data.ok_or_else(|| QueryError::Protocol {
                    field: "data".to_string(),
                })?;
                Ok::<(usize, RawRows), SnowflakeError>((index, rows))
            }
        }))
        .buffer_unordered(MAX_CONCURRENT_FETCHES);

        while let Some(fetched) = fetches.next().await {
            let (index, rows) = fetched?;
            debug!(handle = %handle, partition = index, rows = rows.len(), "partition fetched");
            results.store_partition(index, rows);
        }
        Ok(())
    }
}

impl std::fmt::Debug for QueryExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryExecutor")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
