//! Filter State Manager
//!
//! Owns the unfiltered record set, the current filter selection and the
//! filtered working set derived from them. Loads are tagged with tickets so
//! that only the newest load may replace the record set.

use insight_common::Record;
use tracing::{debug, warn};

use crate::filters::{FilterOptions, Filters};
use crate::metrics::DashboardMetrics;

/// Identifies one record-set load; newer tickets compare greater
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadTicket(u64);

#[derive(Debug, Clone, PartialEq)]
pub enum LoadStatus {
    Idle,
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug)]
pub struct FilterState {
    all_records: Vec<Record>,
    filters: Filters,
    filtered: Vec<Record>,
    options: FilterOptions,
    latest_ticket: u64,
    status: LoadStatus,
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterState {
    pub fn new() -> Self {
        Self {
            all_records: Vec::new(),
            filters: Filters::default(),
            filtered: Vec::new(),
            options: FilterOptions::derive(&[]),
            latest_ticket: 0,
            status: LoadStatus::Idle,
        }
    }

    /// State over an already loaded record set
    pub fn with_records(records: Vec<Record>) -> Self {
        let mut state = Self::new();
        state.install(records);
        state.status = LoadStatus::Ready;
        state
    }

    // ========================================
    // Filters
    // ========================================

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    /// Replace the whole selection and recompute the working set
    pub fn set_filters(&mut self, filters: Filters) {
        self.filters = filters;
        self.refilter();
    }

    /// Clear every key back to "no constraint"
    pub fn reset(&mut self) {
        self.set_filters(Filters::default());
    }

    pub fn active_filter_count(&self) -> usize {
        self.filters.active_count()
    }

    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    /// Unfiltered record set
    pub fn all_records(&self) -> &[Record] {
        &self.all_records
    }

    /// Current working set
    pub fn records(&self) -> &[Record] {
        &self.filtered
    }

    /// Derived views of the current working set
    pub fn metrics(&self) -> DashboardMetrics {
        DashboardMetrics::compute(&self.filtered)
    }

    fn refilter(&mut self) {
        self.filtered = self.filters.apply(&self.all_records);
        debug!(
            "Working set: {} of {} records ({} active filters)",
            self.filtered.len(),
            self.all_records.len(),
            self.active_filter_count()
        );
    }

    fn install(&mut self, records: Vec<Record>) {
        self.all_records = records;
        self.options = FilterOptions::derive(&self.all_records);
        self.refilter();
    }

    // ========================================
    // Loads
    // ========================================

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    /// Start a load; any load begun earlier becomes stale
    pub fn begin_load(&mut self) -> LoadTicket {
        self.latest_ticket += 1;
        self.status = LoadStatus::Loading;
        LoadTicket(self.latest_ticket)
    }

    fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.0 == self.latest_ticket
    }

    /// Install the result of a load. Returns false (and changes nothing)
    /// when a newer load has been started since `ticket` was issued.
    pub fn finish_load(&mut self, ticket: LoadTicket, records: Vec<Record>) -> bool {
        if !self.is_current(ticket) {
            debug!("Discarding stale load {:?} ({} records)", ticket, records.len());
            return false;
        }
        self.install(records);
        self.status = LoadStatus::Ready;
        true
    }

    /// Record a failed load; the previous record set stays in place
    pub fn fail_load(&mut self, ticket: LoadTicket, message: impl Into<String>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        let message = message.into();
        warn!("Record load failed: {}", message);
        self.status = LoadStatus::Failed(message);
        true
    }
}
