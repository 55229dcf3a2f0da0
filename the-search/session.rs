use std::fmt;

use crate::result::{
  SearchResult,
  normalize_batch,
};

/// Queries shorter than this (after trimming) never reach the lookup.
pub const MIN_QUERY_CHARS: usize = 3;

/// Rows kept from a single batch.
pub const DEFAULT_MAX_RESULTS: usize = 50;

pub fn is_search_eligible(query: &str) -> bool {
  eligible(query, MIN_QUERY_CHARS)
}

fn eligible(query: &str, min_chars: usize) -> bool {
  query.trim().chars().count() >= min_chars
}

/// What the results panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
  Closed,
  OpenLoading,
  OpenResults,
  OpenEmpty,
}

impl PanelState {
  pub fn is_open(self) -> bool {
    !matches!(self, Self::Closed)
  }
}

/// The single text line above the result rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusLine {
  Searching,
  Results { count: usize, query: String },
  NoResults { query: String },
  Prompt { min_chars: usize },
}

impl fmt::Display for StatusLine {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Searching => f.write_str("Searching..."),
      Self::Results { count: 1, query } => write!(f, "1 result for \"{query}\""),
      Self::Results { count, query } => write!(f, "{count} results for \"{query}\""),
      Self::NoResults { query } => write!(f, "No results for \"{query}\""),
      Self::Prompt { min_chars } => write!(f, "Type at least {min_chars} characters to search"),
    }
  }
}

/// Transient state of one search interaction. Owned by exactly one
/// [`SearchBox`](crate::SearchBox); nothing here outlives it.
#[derive(Debug, Clone)]
pub struct SearchSession {
  raw_input:          String,
  debounced_query:    String,
  is_loading:         bool,
  is_open:            bool,
  open_on_response:   bool,
  results:            Vec<SearchResult>,
  selected:           Option<usize>,
  last_lookup_failed: bool,
  min_chars:          usize,
  max_results:        usize,
}

impl SearchSession {
  pub fn new(min_chars: usize, max_results: usize) -> Self {
    Self {
      raw_input: String::new(),
      debounced_query: String::new(),
      is_loading: false,
      is_open: false,
      open_on_response: false,
      results: Vec::new(),
      selected: None,
      last_lookup_failed: false,
      min_chars: min_chars.max(1),
      max_results: max_results.max(1),
    }
  }

  pub fn raw_input(&self) -> &str {
    &self.raw_input
  }

  pub fn debounced_query(&self) -> &str {
    &self.debounced_query
  }

  pub fn is_loading(&self) -> bool {
    self.is_loading
  }

  pub fn is_open(&self) -> bool {
    self.is_open
  }

  pub fn results(&self) -> &[SearchResult] {
    &self.results
  }

  pub fn min_chars(&self) -> usize {
    self.min_chars
  }

  pub fn is_eligible(&self, query: &str) -> bool {
    eligible(query, self.min_chars)
  }

  pub fn panel_state(&self) -> PanelState {
    match (self.is_open, self.is_loading) {
      (false, _) => PanelState::Closed,
      (true, true) => PanelState::OpenLoading,
      (true, false) if self.results.is_empty() => PanelState::OpenEmpty,
      (true, false) => PanelState::OpenResults,
    }
  }

  /// Counts are labelled with the query the batch answered, not with
  /// whatever has been typed since.
  pub fn status_line(&self) -> StatusLine {
    let answered = if self.is_eligible(&self.debounced_query) {
      &self.debounced_query
    } else {
      &self.raw_input
    };
    if self.is_loading {
      StatusLine::Searching
    } else if !self.results.is_empty() {
      StatusLine::Results {
        count: self.results.len(),
        query: answered.clone(),
      }
    } else if self.is_eligible(&self.raw_input) {
      StatusLine::NoResults {
        query: answered.clone(),
      }
    } else {
      StatusLine::Prompt {
        min_chars: self.min_chars,
      }
    }
  }

  pub fn selected(&self) -> Option<usize> {
    self.selected
  }

  pub fn selected_result(&self) -> Option<&SearchResult> {
    self.selected.and_then(|idx| self.results.get(idx))
  }

  /// Move the highlighted row, clamped to the batch.
  pub fn move_selection(&mut self, delta: isize) {
    if self.results.is_empty() {
      self.selected = None;
      return;
    }
    let last = self.results.len() - 1;
    let current = self.selected.unwrap_or(0);
    let next = current.saturating_add_signed(delta).min(last);
    self.selected = Some(next);
  }

  pub(crate) fn set_raw_input(&mut self, value: String) {
    self.raw_input = value;
  }

  pub(crate) fn begin_lookup(&mut self, query: &str) {
    self.debounced_query = query.to_string();
    self.is_loading = true;
    self.is_open = true;
    self.open_on_response = true;
    self.last_lookup_failed = false;
  }

  pub(crate) fn skip_lookup(&mut self, query: &str) {
    self.debounced_query = query.to_string();
    self.is_loading = false;
    self.is_open = false;
    self.results.clear();
    self.selected = None;
  }

  /// A batch replaces the previous one wholesale. It only opens the panel
  /// if the panel wasn't dismissed while the lookup was in flight.
  pub(crate) fn apply_results(&mut self, results: Vec<SearchResult>) {
    self.results = normalize_batch(results, self.max_results);
    self.selected = (!self.results.is_empty()).then_some(0);
    self.is_loading = false;
    self.is_open = self.open_on_response;
  }

  pub(crate) fn apply_failure(&mut self) {
    self.results.clear();
    self.selected = None;
    self.is_loading = false;
    self.is_open = false;
    self.last_lookup_failed = true;
  }

  /// Close the panel, keeping the last batch for a later re-open. A lookup
  /// still in flight lands in the closed panel.
  pub(crate) fn dismiss(&mut self) {
    self.is_open = false;
    self.open_on_response = false;
  }

  pub(crate) fn clear(&mut self) {
    self.raw_input.clear();
    self.debounced_query.clear();
    self.results.clear();
    self.selected = None;
    self.is_loading = false;
    self.is_open = false;
    self.open_on_response = false;
    self.last_lookup_failed = false;
  }

  /// Re-open with the last known batch when the input still qualifies.
  /// A failed last lookup keeps the panel closed.
  pub(crate) fn reopen(&mut self) -> bool {
    if self.is_open || self.last_lookup_failed || !self.is_eligible(&self.raw_input) {
      return false;
    }
    self.is_open = true;
    self.open_on_response = true;
    true
  }
}

impl Default for SearchSession {
  fn default() -> Self {
    Self::new(MIN_QUERY_CHARS, DEFAULT_MAX_RESULTS)
  }
}
