//! REST message types for the Snowflake SQL API.
//!
//! This module defines the JSON structures exchanged with the
//! `/api/v2/statements` endpoints, plus the application-level status codes
//! carried inside response bodies.

use serde::{Deserialize, Serialize};

/// Application code for a statement accepted for asynchronous execution.
///
/// The same code is returned by the status endpoint while execution is still
/// in progress.
pub const CODE_ASYNC_IN_PROGRESS: &str = "333334";

/// Application code for a completed statement with an available result set.
pub const CODE_SUCCESS: &str = "090001";

/// Statement submission request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementRequest {
    /// SQL text to execute
    pub statement: String,
    /// Warehouse to run on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warehouse: Option<String>,
    /// Database context
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    /// Schema context
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    /// Requested result serialization format
    pub result_set_meta_data: ResultSetFormat,
    /// Session parameters pinning textual output formats
    pub parameters: SessionParameters,
}

impl StatementRequest {
    /// Create a submission request with pinned session parameters.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            statement: sql.into(),
            warehouse: None,
            database: None,
            schema: None,
            result_set_meta_data: ResultSetFormat::default(),
            parameters: SessionParameters::default(),
        }
    }

    /// Set the warehouse context.
    pub fn with_warehouse(mut self, warehouse: impl Into<String>) -> Self {
        self.warehouse = Some(warehouse.into());
        self
    }

    /// Set the database context.
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Set the schema context.
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }
}

/// Requested result serialization format.
#[derive(Debug, Clone, Serialize)]
pub struct ResultSetFormat {
    /// Format name
    pub format: String,
}

impl Default for ResultSetFormat {
    fn default() -> Self {
        Self {
            format: "jsonv2".to_string(),
        }
    }
}

/// Session parameters fixing DATE/TIME/TIMESTAMP output formats.
///
/// These pin every date/time column to a stable textual pattern so result
/// parsing is deterministic rather than account- or locale-dependent. The
/// chrono counterparts live in `types::coerce`.
#[derive(Debug, Clone, Serialize)]
pub struct SessionParameters {
    #[serde(rename = "DATE_OUTPUT_FORMAT")]
    pub date_output_format: String,
    #[serde(rename = "TIME_OUTPUT_FORMAT")]
    pub time_output_format: String,
    #[serde(rename = "TIMESTAMP_OUTPUT_FORMAT")]
    pub timestamp_output_format: String,
    #[serde(rename = "TIMESTAMP_NTZ_OUTPUT_FORMAT")]
    pub timestamp_ntz_output_format: String,
    #[serde(rename = "TIMESTAMP_LTZ_OUTPUT_FORMAT")]
    pub timestamp_ltz_output_format: String,
    #[serde(rename = "TIMESTAMP_TZ_OUTPUT_FORMAT")]
    pub timestamp_tz_output_format: String,
}

impl Default for SessionParameters {
    fn default() -> Self {
        Self {
            date_output_format: "YYYY-MM-DD".to_string(),
            time_output_format: "HH24:MI:SS.FF6".to_string(),
            timestamp_output_format: "YYYY-MM-DD HH24:MI:SS.FF6 TZH:TZM".to_string(),
            timestamp_ntz_output_format: "YYYY-MM-DD HH24:MI:SS.FF6".to_string(),
            timestamp_ltz_output_format: "YYYY-MM-DD HH24:MI:SS.FF6 TZH:TZM".to_string(),
            timestamp_tz_output_format: "YYYY-MM-DD HH24:MI:SS.FF6 TZH:TZM".to_string(),
        }
    }
}

/// Statement response envelope.
///
/// The same shape is returned by submission, status polling and partition
/// retrieval; which fields are populated depends on the execution state, so
/// everything beyond the handle is optional and validated by the caller.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementResponse {
    /// Result metadata, present once execution has completed
    pub result_set_meta_data: Option<ResultSetMetaData>,
    /// Row data for the requested partition
    pub data: Option<Vec<Vec<serde_json::Value>>>,
    /// Application-level status code
    pub code: Option<String>,
    /// URL to poll for statement status
    pub statement_status_url: Option<String>,
    /// Request identifier assigned by the service
    pub request_id: Option<String>,
    /// ANSI SQLSTATE
    pub sql_state: Option<String>,
    /// Handle identifying the statement
    pub statement_handle: Option<String>,
    /// Human-readable status message
    pub message: Option<String>,
    /// Submission timestamp (epoch milliseconds)
    pub created_on: Option<i64>,
}

impl StatementResponse {
    /// Deserialize a response from an already-decoded JSON object.
    pub fn from_payload(
        payload: serde_json::Map<String, serde_json::Value>,
    ) -> Result<Self, serde_json::Error> {
        serde_json::from_value(serde_json::Value::Object(payload))
    }

    /// The application code, or an empty string when absent.
    pub fn code(&self) -> &str {
        self.code.as_deref().unwrap_or("")
    }

    /// The status message, or an empty string when absent.
    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or("")
    }
}

/// Result set metadata returned on completion.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSetMetaData {
    /// Total number of rows across all partitions
    pub num_rows: Option<u64>,
    /// Serialization format of the row data
    pub format: Option<String>,
    /// One entry per result partition
    pub partition_info: Option<Vec<PartitionInfo>>,
    /// Column descriptors in declared order
    pub row_type: Option<Vec<RowType>>,
}

/// Size information for one result partition.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionInfo {
    /// Rows in this partition
    pub row_count: Option<u64>,
    /// Uncompressed payload size in bytes
    pub uncompressed_size: Option<u64>,
    /// Compressed payload size in bytes, when served compressed
    pub compressed_size: Option<u64>,
}

/// Column descriptor from result metadata.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowType {
    /// Column name
    pub name: String,
    /// Declared type name
    #[serde(rename = "type")]
    pub column_type: String,
    /// Originating database
    #[serde(default)]
    pub database: Option<String>,
    /// Originating schema
    #[serde(default)]
    pub schema: Option<String>,
    /// Originating table
    #[serde(default)]
    pub table: Option<String>,
    /// Whether the column admits NULL
    #[serde(default)]
    pub nullable: Option<bool>,
    /// Declared length (string types)
    #[serde(default)]
    pub length: Option<i64>,
    /// Numeric scale
    #[serde(default)]
    pub scale: Option<i64>,
    /// Numeric precision
    #[serde(default)]
    pub precision: Option<i64>,
    /// Maximum byte length
    #[serde(default)]
    pub byte_length: Option<i64>,
    /// Collation, when set
    #[serde(default)]
    pub collation: Option<String>,
}
