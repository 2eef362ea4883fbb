//! Query execution and result handling.
//!
//! This module drives the asynchronous statement lifecycle against the SQL
//! API and turns partitioned wire payloads into typed rows.
//!
//! # Overview
//!
//! The query module is organized into:
//! - `statement` - Wire operations: submit, fetch partitions, cancel
//! - `executor` - Submit/poll/cancel state machine and partition fan-out
//! - `results` - Result set storage and typed-row materialization
//!
//! # Example
//!
//! ```no_run
//! use snowrest_rs::connection::{ClientConfig, MemoryTokenCache, TokenIssuer};
//! use snowrest_rs::query::{QueryExecutor, StatementClient};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Arc::new(
//!     ClientConfig::builder()
//!         .account("myorg-myaccount")
//!         .user("ANALYST")
//!         .public_key_fingerprint("Jc8QkS2krPGHrLuy0Mb2k5o=")
//!         .private_key_pem(&std::fs::read_to_string("rsa_key.p8")?)
//!         .warehouse("COMPUTE_WH")
//!         .build()?,
//! );
//! let issuer = Arc::new(TokenIssuer::new(
//!     Arc::clone(&config),
//!     Arc::new(MemoryTokenCache::new()),
//!     None,
//! )?);
//! let client = StatementClient::new(Arc::clone(&config), issuer)?;
//!
//! // Execute and materialize typed rows
//! let executor = QueryExecutor::new(Arc::new(client), Duration::from_secs(60));
//! let results = executor.execute("SELECT CURRENT_TIMESTAMP() AS NOW").await?;
//! for row in results.materialize() {
//!     println!("{:?}", row.get("NOW"));
//! }
//! # Ok(())
//! # }
//! ```

pub mod executor;
pub mod results;
pub mod statement;

// Re-export commonly used types
pub use executor::{PollState, QueryExecutor};
pub use results::{ColumnDescriptor, ExecutionState, ResultMetadata, ResultSet, TypedRow};
pub use statement::{StatementApi, StatementClient};
