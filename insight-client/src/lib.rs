//! insight-client - dashboard data loading and derived analytics
//!
//! Loads the full record set from insight-server once, filters it locally
//! and derives the KPI summary plus every chart breakdown from the
//! filtered working set.

pub mod api;
pub mod error;
pub mod filters;
pub mod loader;
pub mod metrics;
pub mod state;
pub mod swot;

pub use crate::api::DashboardApi;
pub use crate::error::{ClientError, ClientResult};
pub use crate::filters::{FilterKey, FilterOptions, Filters};
pub use crate::metrics::DashboardMetrics;
pub use crate::state::{FilterState, LoadTicket};
pub use crate::swot::{derive_swot, SwotLabel};
