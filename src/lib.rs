//! # snowrest-rs
//!
//! Asynchronous SQL execution client for the Snowflake SQL REST API.
//!
//! This library submits statements over HTTP with key-pair JWT
//! authentication, polls them to completion, fetches result partitions
//! concurrently, and coerces the loosely typed JSON payloads into native
//! Rust values.
//!
//! ## Example
//!
//! ```no_run
//! # use snowrest_rs::*;
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Configure the account and key pair
//! let config = ClientConfig::builder()
//!     .account("myorg-myaccount")
//!     .user("ANALYST")
//!     .public_key_fingerprint("Jc8QkS2krPGHrLuy0Mb2k5o=")
//!     .private_key_pem(&std::fs::read_to_string("rsa_key.p8")?)
//!     .warehouse("COMPUTE_WH")
//!     .build()?;
//!
//! let client = Client::new(config)?;
//!
//! // Execute a statement
//! let results = client.execute("SELECT ID, CREATED_AT FROM ORDERS").await?;
//! println!("rows: {}", results.row_count());
//!
//! // Materialize typed rows
//! for row in results.materialize() {
//!     println!("{:?} {:?}", row.get("ID"), row.get("CREATED_AT"));
//! }
//! # Ok(())
//! # }
//! ```

// Module declarations
pub mod client;
pub mod connection;
pub mod error;
pub mod query;
pub mod transport;
pub mod types;

// Re-export public API
pub use client::Client;
pub use connection::{ClientConfig, ClientConfigBuilder, MemoryTokenCache, TokenCache};
pub use error::{AuthError, ConfigError, DecodeError, QueryError, SnowflakeError, TransportError};
pub use query::{ExecutionState, ResultSet, TypedRow};
pub use types::{TypeCoercer, Value};
