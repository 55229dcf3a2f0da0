use std::{
  sync::Arc,
  time::Duration,
};

use tokio::sync::mpsc::{
  self,
  UnboundedReceiver,
  UnboundedSender,
};

use crate::{
  backend::{
    Navigator,
    SearchBackend,
  },
  coordinator::QueryCoordinator,
  debounce::{
    DEFAULT_DEBOUNCE,
    InputDebouncer,
  },
  overlay::{
    DismissReason,
    DismissibleOverlay,
    EventListeners,
    Key,
    RootElement,
  },
  session::{
    DEFAULT_MAX_RESULTS,
    MIN_QUERY_CHARS,
    PanelState,
    SearchSession,
    StatusLine,
  },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchBoxConfig {
  pub debounce:        Duration,
  pub min_query_chars: usize,
  pub max_results:     usize,
}

impl Default for SearchBoxConfig {
  fn default() -> Self {
    Self {
      debounce:        DEFAULT_DEBOUNCE,
      min_query_chars: MIN_QUERY_CHARS,
      max_results:     DEFAULT_MAX_RESULTS,
    }
  }
}

/// The incremental search component.
///
/// Everything is driven from one thread: keystrokes go in through
/// [`set_input`](Self::set_input) / [`handle_key`](Self::handle_key), the host
/// loop calls [`poll`](Self::poll) on every tick to pick up committed queries,
/// lookup responses and dismissals. The debounce timer and lookups run on the
/// ambient tokio runtime.
///
/// Dropping the component stops the debounce hook (a pending query never
/// commits), cancels the in-flight lookup, closes the channel late responses
/// would arrive on, and deregisters the overlay listeners.
pub struct SearchBox {
  session:     SearchSession,
  debouncer:   InputDebouncer,
  coordinator: QueryCoordinator,
  listeners:   EventListeners,
  root:        RootElement,
  overlay:     Option<DismissibleOverlay>,
  dismiss_tx:  UnboundedSender<DismissReason>,
  dismiss_rx:  UnboundedReceiver<DismissReason>,
  focused:     bool,
}

impl SearchBox {
  pub fn new(
    backend: Arc<dyn SearchBackend>,
    listeners: EventListeners,
    config: SearchBoxConfig,
  ) -> Self {
    let (dismiss_tx, dismiss_rx) = mpsc::unbounded_channel();
    Self {
      session: SearchSession::new(config.min_query_chars, config.max_results),
      debouncer: InputDebouncer::new(config.debounce),
      coordinator: QueryCoordinator::new(backend),
      listeners,
      root: RootElement::default(),
      overlay: None,
      dismiss_tx,
      dismiss_rx,
      focused: false,
    }
  }

  pub fn session(&self) -> &SearchSession {
    &self.session
  }

  pub fn panel_state(&self) -> PanelState {
    self.session.panel_state()
  }

  pub fn status_line(&self) -> StatusLine {
    self.session.status_line()
  }

  pub fn coordinator(&self) -> &QueryCoordinator {
    &self.coordinator
  }

  /// Region used for outside-pointer detection; the renderer keeps it in
  /// sync with where the input and panel are drawn.
  pub fn root(&self) -> &RootElement {
    &self.root
  }

  pub fn is_focused(&self) -> bool {
    self.focused
  }

  /// Whether the dismissal listeners are currently registered.
  pub fn has_overlay(&self) -> bool {
    self.overlay.is_some()
  }

  /// A new raw input value (one keystroke).
  pub fn set_input(&mut self, value: impl Into<String>) {
    let value = value.into();
    self.focused = true;
    if value == self.session.raw_input() {
      return;
    }
    self.session.set_raw_input(value.clone());
    self.debouncer.push(value);
  }

  /// Keys delivered while the input has focus. Escape is not handled here,
  /// it reaches the panel through the overlay listener. Returns true when
  /// the key was consumed.
  pub fn handle_key(&mut self, key: Key, navigator: &mut dyn Navigator) -> bool {
    match key {
      Key::Char(ch) => {
        let mut value = self.session.raw_input().to_string();
        value.push(ch);
        self.set_input(value);
        true
      },
      Key::Backspace => {
        let mut value = self.session.raw_input().to_string();
        if value.pop().is_none() {
          return false;
        }
        self.set_input(value);
        true
      },
      Key::Up if self.session.is_open() => {
        self.session.move_selection(-1);
        true
      },
      Key::Down if self.session.is_open() => {
        self.session.move_selection(1);
        true
      },
      Key::Down => self.focus(),
      Key::Enter => {
        let Some(index) = self.session.selected().filter(|_| self.session.is_open()) else {
          return false;
        };
        self.select(index, navigator)
      },
      Key::Up | Key::Escape | Key::Other => false,
    }
  }

  /// Focus the input. Re-opens the panel with the last batch when the
  /// input still qualifies; never starts a lookup by itself.
  pub fn focus(&mut self) -> bool {
    self.focused = true;
    let reopened = self.session.reopen();
    self.sync_overlay();
    reopened
  }

  pub fn blur(&mut self) {
    self.focused = false;
  }

  /// Explicit clear: empty input, no results, panel closed, nothing pending.
  pub fn clear(&mut self) {
    self.debouncer.cancel();
    self.coordinator.invalidate();
    self.session.clear();
    self.sync_overlay();
  }

  /// Choose the result at `index`: navigate to it and reset the input.
  pub fn select(&mut self, index: usize, navigator: &mut dyn Navigator) -> bool {
    let Some(result) = self.session.results().get(index) else {
      return false;
    };
    let url = result.url.clone();
    log::info!("selected {} {:?} -> {url}", result.kind, result.name);
    self.clear();
    navigator.navigate(&url);
    true
  }

  pub fn dismiss(&mut self, reason: DismissReason) {
    match reason {
      DismissReason::OutsidePointer | DismissReason::CancelKey => self.session.dismiss(),
      DismissReason::Cleared | DismissReason::Selected => self.clear(),
    }
    self.sync_overlay();
  }

  /// Drain dismissals, committed queries and lookup responses. Returns true
  /// when anything visible changed.
  pub fn poll(&mut self) -> bool {
    let mut changed = false;

    while let Ok(reason) = self.dismiss_rx.try_recv() {
      log::debug!("search panel dismissed: {reason:?}");
      self.dismiss(reason);
      changed = true;
    }

    // The hook commits from a worker thread, so a value can still arrive
    // after a clear or select drained the channel. Only the current input
    // may start a lookup.
    if let Some(query) = self.debouncer.take_committed() {
      if query == self.session.raw_input() {
        self
          .coordinator
          .on_debounced_query_change(&mut self.session, &query);
        changed = true;
      } else {
        log::debug!(
          "dropping committed query {query:?}, input is now {:?}",
          self.session.raw_input()
        );
      }
    }

    changed |= self.coordinator.poll(&mut self.session);
    self.sync_overlay();
    changed
  }

  /// Listeners live exactly as long as the panel is open.
  fn sync_overlay(&mut self) {
    match (self.session.is_open(), self.overlay.is_some()) {
      (true, false) => {
        let dismiss_tx = self.dismiss_tx.clone();
        self.overlay = Some(DismissibleOverlay::register(
          &self.listeners,
          self.root.clone(),
          move |reason| {
            let _ = dismiss_tx.send(reason);
          },
        ));
      },
      (false, true) => self.overlay = None,
      _ => {},
    }
  }
}
