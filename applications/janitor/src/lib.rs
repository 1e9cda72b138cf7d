//! Port User Janitor
//!
//! Startup configuration for the `port-user-janitor` binary. The cleanup
//! itself lives in the `user-cleanup` library.

pub mod config;
pub mod error;

pub use config::{CredentialSource, JanitorConfig};
pub use error::{JanitorError, Result};
