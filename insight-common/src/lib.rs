//! # Insight Common Library
//!
//! Shared code for the insight dashboard services including:
//! - The analytics `Record` model
//! - Rounding and averaging helpers used by every aggregation
//! - Clock abstraction for time-dependent caches
//! - API request/response types
//! - Configuration loading

pub mod api;
pub mod config;
pub mod error;
pub mod record;
pub mod stats;
pub mod time;

pub use error::{Error, Result};
pub use record::Record;
pub use time::{Clock, ManualClock, SystemClock};
