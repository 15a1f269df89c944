//! Credstore keeps user credentials for an authentication framework.
//!
//! The framework talks to a store through the traits of [`storer`]; each
//! backend of [`database`] implements all of them over one concrete
//! [`user::User`] record.
//!
//! ```no_run
//! use credstore::config::Configuration;
//! use credstore::database::{MemStorer, TimeoutStorer};
//! use credstore::storer::ServerStorer;
//!
//! # async fn run() -> credstore::error::Result<()> {
//! let config = Configuration::default().read();
//! let store = TimeoutStorer::new(MemStorer::from_config(&config)?, config.timeout());
//! let user = store.load("rick@councilofricks.com").await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod database;
pub mod error;
pub mod storer;
pub mod telemetry;
pub mod user;

pub use error::{Result, StoreError};
