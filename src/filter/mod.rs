//! List filtering and pagination state.
//!
//! [`FilterController`] holds two copies of the filter: the raw one the user
//! is editing and the committed one outgoing queries are built from. Whenever
//! the committed filter changes value the page goes back to 1, so narrowing
//! the results never leaves the view on a page that no longer exists.

pub mod empty;
pub mod sort;

pub use empty::{is_empty_value, is_filtered};
pub use sort::{SortDirection, SortState};

use crate::constants;
use crate::error::Error;
use crate::request::Query;
use serde::Serialize;
use serde_json::Value;
use std::time::{Duration, Instant};

/// When raw edits reach the committed filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommitMode {
    /// Every edit commits at once
    #[default]
    Immediate,
    /// Edits commit once the raw filter has been quiet for the interval.
    /// The owner drives this through [`FilterController::commit_if_due`].
    Debounced(Duration),
}

#[derive(Debug, Clone)]
pub struct FilterController<F> {
    initial: F,
    raw_filter: F,
    filter: F,
    page: u64,
    page_size: u64,
    sort_state: Option<SortState>,
    commit_mode: CommitMode,
    last_edit: Option<Instant>,
}

impl<F> FilterController<F>
where
    F: Clone + PartialEq + Serialize,
{
    /// Starts on page 1 with `initial` as both raw and committed filter.
    /// A zero page size is raised to 1.
    pub fn new(initial: F, page_size: u64) -> Self {
        Self {
            raw_filter: initial.clone(),
            filter: initial.clone(),
            initial,
            page: 1,
            page_size: page_size.max(1),
            sort_state: None,
            commit_mode: CommitMode::Immediate,
            last_edit: None,
        }
    }

    #[must_use]
    pub const fn with_commit_mode(mut self, mode: CommitMode) -> Self {
        self.commit_mode = mode;
        self
    }

    #[must_use]
    pub fn with_sort(mut self, sort: SortState) -> Self {
        self.sort_state = Some(sort);
        self
    }

    /// Sets one field of the raw filter.
    ///
    /// `field` selects the field, so only existing fields can be set and the
    /// value type always matches:
    ///
    /// ```
    /// # use godesk_cli::filter::FilterController;
    /// #[derive(Clone, PartialEq, Default, serde::Serialize)]
    /// struct AppealFilter { region: Vec<u32> }
    ///
    /// let mut controller = FilterController::new(AppealFilter::default(), 10);
    /// controller.set_filter_field(vec![5], |f| &mut f.region);
    /// assert_eq!(controller.filter().region, vec![5]);
    /// ```
    pub fn set_filter_field<V>(&mut self, value: V, field: impl FnOnce(&mut F) -> &mut V) {
        *field(&mut self.raw_filter) = value;
        match self.commit_mode {
            CommitMode::Immediate => {
                self.commit();
            }
            CommitMode::Debounced(_) => self.last_edit = Some(Instant::now()),
        }
    }

    /// Replaces raw and committed filter together and returns to page 1.
    pub fn set_filter(&mut self, filter: F) {
        self.raw_filter = filter.clone();
        self.filter = filter;
        self.page = 1;
        self.last_edit = None;
    }

    /// Restores the filter the controller was created with.
    pub fn reset_filter(&mut self) {
        self.set_filter(self.initial.clone());
    }

    /// Copies the raw filter into the committed one.
    ///
    /// Returns `true` if the committed filter changed, in which case the page
    /// is back at 1.
    pub fn commit(&mut self) -> bool {
        self.last_edit = None;
        if self.raw_filter == self.filter {
            return false;
        }
        self.filter = self.raw_filter.clone();
        self.page = 1;
        true
    }

    /// Commits pending edits if the debounce interval has passed by `now`.
    pub fn commit_if_due(&mut self, now: Instant) -> bool {
        let CommitMode::Debounced(interval) = self.commit_mode else {
            return false;
        };
        match self.last_edit {
            Some(edited) if now.saturating_duration_since(edited) >= interval => self.commit(),
            _ => false,
        }
    }

    /// Whether raw edits are waiting to be committed
    #[must_use]
    pub fn has_pending_edits(&self) -> bool {
        self.raw_filter != self.filter
    }

    /// Pages below 1 are raised to 1. Pages past the last one whose offset
    /// fits in a `u64` are lowered to it.
    pub fn set_page(&mut self, page: u64) {
        self.page = page.clamp(1, self.max_page());
    }

    pub fn set_page_size(&mut self, page_size: u64) {
        self.page_size = page_size.max(1);
        self.page = 1;
    }

    const fn max_page(&self) -> u64 {
        (u64::MAX / self.page_size).saturating_add(1)
    }

    pub fn set_sort_state(&mut self, column: impl Into<String>, direction: SortDirection) {
        self.sort_state = Some(SortState::new(column, direction));
    }

    pub fn clear_sort(&mut self) {
        self.sort_state = None;
    }

    pub const fn raw_filter(&self) -> &F {
        &self.raw_filter
    }

    pub const fn filter(&self) -> &F {
        &self.filter
    }

    /// True if the committed filter has at least one non-empty field
    pub fn filtered(&self) -> bool {
        is_filtered(&self.filter)
    }

    pub const fn page(&self) -> u64 {
        self.page
    }

    pub const fn page_size(&self) -> u64 {
        self.page_size
    }

    pub const fn limit(&self) -> u64 {
        self.page_size
    }

    pub const fn offset(&self) -> u64 {
        (self.page - 1) * self.page_size
    }

    pub const fn sort_state(&self) -> Option<&SortState> {
        self.sort_state.as_ref()
    }

    pub fn ordering(&self) -> Option<String> {
        self.sort_state.as_ref().map(SortState::ordering)
    }

    /// Query parameters for the current state: the non-empty committed filter
    /// fields followed by `limit`, `offset` and, if sorted, `ordering`.
    ///
    /// # Errors
    ///
    /// Returns an error if the filter does not serialize to a JSON object.
    pub fn query(&self) -> Result<Query, Error> {
        let mut query = Query::new();
        match serde_json::to_value(&self.filter)? {
            Value::Object(fields) => {
                query.extend(fields.into_iter().filter(|(_, v)| !is_empty_value(v)));
            }
            Value::Null => {}
            other => {
                return Err(Error::config(format!(
                    "filter must serialize to an object, got {other}"
                )));
            }
        }
        query.insert(constants::QUERY_LIMIT.to_string(), self.limit().into());
        query.insert(constants::QUERY_OFFSET.to_string(), self.offset().into());
        if let Some(ordering) = self.ordering() {
            query.insert(constants::QUERY_ORDERING.to_string(), ordering.into());
        }
        Ok(query)
    }
}
