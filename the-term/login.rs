//! Login prompt opened through the login-request signal.
//!
//! Anything holding a [`Signal<LoginRequest>`] can ask for a login; the
//! modal is the only subscriber. It reuses [`DismissibleOverlay`] for
//! outside-click and Escape dismissal.

use the_directory_event::{
  Signal,
  SignalReceiver,
};
use the_directory_search::{
  DismissReason,
  DismissibleOverlay,
  EventListeners,
  Key,
  RootElement,
};
use tokio::sync::mpsc::{
  self,
  UnboundedReceiver,
  UnboundedSender,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRequest {
  /// Location to come back to once signed in.
  pub return_to: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
  Confirmed,
  Dismissed(DismissReason),
}

pub struct LoginModal {
  requests:   SignalReceiver<LoginRequest>,
  listeners:  EventListeners,
  root:       RootElement,
  active:     Option<LoginRequest>,
  overlay:    Option<DismissibleOverlay>,
  dismiss_tx: UnboundedSender<DismissReason>,
  dismiss_rx: UnboundedReceiver<DismissReason>,
  last:       Option<LoginOutcome>,
}

impl LoginModal {
  pub fn new(signal: &Signal<LoginRequest>, listeners: EventListeners) -> Self {
    let (dismiss_tx, dismiss_rx) = mpsc::unbounded_channel();
    Self {
      requests: signal.subscribe(),
      listeners,
      root: RootElement::default(),
      active: None,
      overlay: None,
      dismiss_tx,
      dismiss_rx,
      last: None,
    }
  }

  pub fn is_open(&self) -> bool {
    self.active.is_some()
  }

  pub fn request(&self) -> Option<&LoginRequest> {
    self.active.as_ref()
  }

  pub fn last_outcome(&self) -> Option<LoginOutcome> {
    self.last
  }

  pub fn root(&self) -> &RootElement {
    &self.root
  }

  /// Apply dismissals and pick up the newest request. Returns true when the
  /// modal opened or closed.
  pub fn poll(&mut self) -> bool {
    let mut changed = false;
    while let Ok(reason) = self.dismiss_rx.try_recv() {
      changed |= self.close(LoginOutcome::Dismissed(reason));
    }
    if let Some(request) = self.requests.latest() {
      self.open(request);
      changed = true;
    }
    changed
  }

  /// Keys while the modal is open. Escape arrives through the overlay.
  pub fn handle_key(&mut self, key: Key) -> bool {
    match key {
      Key::Enter if self.is_open() => self.close(LoginOutcome::Confirmed),
      _ => false,
    }
  }

  fn open(&mut self, request: LoginRequest) {
    log::info!("login requested, returning to {}", request.return_to);
    self.active = Some(request);
    if self.overlay.is_none() {
      let dismiss_tx = self.dismiss_tx.clone();
      self.overlay = Some(DismissibleOverlay::register(
        &self.listeners,
        self.root.clone(),
        move |reason| {
          let _ = dismiss_tx.send(reason);
        },
      ));
    }
  }

  fn close(&mut self, outcome: LoginOutcome) -> bool {
    let Some(request) = self.active.take() else {
      return false;
    };
    log::info!("login prompt closed ({outcome:?}) for {}", request.return_to);
    self.overlay = None;
    self.last = Some(outcome);
    true
  }
}
