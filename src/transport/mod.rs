//! Transport layer for the Snowflake SQL REST API.
//!
//! This module provides the shared HTTP client, the wire message types and
//! the response decoding pipeline that every statement operation goes
//! through.
//!
//! # Architecture
//!
//! The transport layer is organized into:
//! - `http` - Pooled HTTP client returning raw status/encoding/bytes
//! - `messages` - Request and response JSON structures
//! - `decode` - Body decoding pipeline (decompression, JSON, error
//!   classification)
//!
//! # Example
//!
//! ```no_run
//! use snowrest_rs::transport::{decode_response, HttpTransport, StatementRequest};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = HttpTransport::new("https://acct.snowflakecomputing.com")?;
//!
//! let request = StatementRequest::new("SELECT 1").with_warehouse("COMPUTE_WH");
//! let raw = transport
//!     .post_json("/api/v2/statements?async=true&nullable=true", "token", &request)
//!     .await?;
//!
//! let payload = decode_response(&raw.body, raw.content_encoding.as_deref(), raw.status)?;
//! println!("code: {:?}", payload.get("code"));
//! # Ok(())
//! # }
//! ```

pub mod decode;
pub mod http;
pub mod messages;

// Re-export commonly used types
pub use decode::decode_response;
pub use http::{HttpTransport, RawResponse};
pub use messages::{
    PartitionInfo, ResultSetMetaData, RowType, SessionParameters, StatementRequest,
    StatementResponse, CODE_ASYNC_IN_PROGRESS, CODE_SUCCESS,
};
