//! Shared plumbing for the grvlfinder crates
//!
//! [`config`] reads and writes `grvlfinder.toml`, including the rider profile.
//! [`error`] defines the coded [`Error`] and the exit codes of the command line tool.
//! [`retry`] and [`rate_limit`] keep the HTTP client polite towards the public map
//! services, and [`cache`] keeps their answers on disk between runs.
//!
//! ```rust,no_run
//! use grvlfinder_core::config::Config;
//!
//! let config = Config::load(None)?;
//! println!("Riding a {}", config.schema.profile.bike_type);
//! # Ok::<(), grvlfinder_core::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod config;
pub mod error;
pub mod rate_limit;
pub mod retry;

pub use error::{Error, ErrorCategory, ErrorCode, Result, ResultExt};
