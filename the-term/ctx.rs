//! Application context for the terminal client.

use std::sync::Arc;

use the_directory_event::Signal;
use the_directory_loader::config::Config;
use the_directory_search::{
  EventListeners,
  OverlayRect,
  SearchBackend,
  SearchBox,
  SearchBoxConfig,
};

use crate::{
  login::{
    LoginModal,
    LoginRequest,
  },
  router::Router,
};

/// Screen regions from the last frame, used to route pointer clicks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HitAreas {
  pub input:     OverlayRect,
  /// Rows of the results list, empty while the panel is closed.
  pub rows:      OverlayRect,
  /// Result index drawn on the first visible row.
  pub first_row: usize,
}

impl HitAreas {
  pub fn row_at(&self, column: u16, row: u16) -> Option<usize> {
    self
      .rows
      .contains(column, row)
      .then(|| self.first_row + usize::from(row - self.rows.y))
  }
}

pub struct Ctx {
  pub search:         SearchBox,
  pub listeners:      EventListeners,
  pub router:         Router,
  pub login:          LoginModal,
  pub login_requests: Signal<LoginRequest>,
  pub hit:            HitAreas,
  pub should_quit:    bool,
  pub needs_render:   bool,
}

impl Ctx {
  pub fn new(backend: Arc<dyn SearchBackend>, config: &Config) -> Self {
    let listeners = EventListeners::new();
    let search_config = SearchBoxConfig {
      debounce:        config.search.debounce(),
      min_query_chars: config.search.min_query_chars,
      max_results:     config.search.max_results,
    };
    let login_requests = Signal::new();
    let mut search = SearchBox::new(backend, listeners.clone(), search_config);
    search.focus();

    Self {
      search,
      login: LoginModal::new(&login_requests, listeners.clone()),
      listeners,
      router: Router::default(),
      login_requests,
      hit: HitAreas::default(),
      should_quit: false,
      needs_render: true,
    }
  }

  /// One pass of the host loop: let the search box and the login modal
  /// catch up with everything that happened since the last tick.
  pub fn tick(&mut self) {
    if self.search.poll() {
      self.needs_render = true;
    }
    if self.login.poll() {
      self.needs_render = true;
    }
  }

  /// Ask for a login prompt. The search panel gets out of the way first so
  /// only the modal reacts to Escape.
  pub fn request_login(&mut self) {
    self.search.blur();
    self.search.dismiss(the_directory_search::DismissReason::CancelKey);
    let receivers = self.login_requests.emit(LoginRequest {
      return_to: self.router.location().to_string(),
    });
    if receivers == 0 {
      log::warn!("login requested but nothing is listening");
    }
    self.needs_render = true;
  }
}
