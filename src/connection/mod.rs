//! Client identity: configuration and authentication tokens.
//!
//! This module provides the validated client configuration and the key-pair
//! JWT issuance machinery, including the pluggable token cache tiers.
//!
//! # Example
//!
//! ```no_run
//! # use snowrest_rs::connection::ClientConfig;
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::builder()
//!     .account("myorg-myaccount")
//!     .user("SVC_REPORTING")
//!     .public_key_fingerprint("2mo9loVLFB6Mb6eMTt597root8B0fSOBXg2H2q2khZE=")
//!     .private_key_pem(&std::fs::read_to_string("rsa_key.p8")?)
//!     .warehouse("COMPUTE_WH")
//!     .build()?;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod token;

pub use cache::{MemoryTokenCache, TokenCache};
pub use config::{ClientConfig, ClientConfigBuilder};
pub use token::TokenIssuer;
