//! Core types and configuration for the futbar resampling system.
//!
//! This crate provides shared types used by the resampling crate:
//! - Market data types (minute bars, aggregated bars, timeframes)
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use types::*;
