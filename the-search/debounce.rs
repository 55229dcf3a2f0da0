use std::time::Duration;

use the_directory_event::{
  AsyncHook,
  send_blocking,
};
use tokio::{
  sync::mpsc::{
    self,
    UnboundedReceiver,
    UnboundedSender,
    error::TryRecvError,
  },
  time::Instant,
};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug)]
enum InputEvent {
  Changed(String),
  Cancel,
}

/// Holds the latest raw input until it has been stable for `delay`.
struct QueryDebounceHook {
  delay:     Duration,
  pending:   Option<String>,
  committed: UnboundedSender<String>,
}

impl AsyncHook for QueryDebounceHook {
  type Event = InputEvent;

  fn handle_event(&mut self, event: Self::Event, _timeout: Option<Instant>) -> Option<Instant> {
    match event {
      InputEvent::Changed(value) => {
        self.pending = Some(value);
        Some(Instant::now() + self.delay)
      },
      InputEvent::Cancel => {
        self.pending = None;
        None
      },
    }
  }

  fn finish_debounce(&mut self) {
    let Some(query) = self.pending.take() else {
      return;
    };
    log::trace!("committed query {query:?}");
    let _ = self.committed.send(query);
  }
}

/// Raw keystroke values in, committed queries out.
///
/// Every [`push`](Self::push) restarts the delay, so a burst of typing yields
/// a single committed value. Dropping the debouncer stops the background hook
/// and discards anything still pending.
pub struct InputDebouncer {
  tx:        mpsc::Sender<InputEvent>,
  committed: UnboundedReceiver<String>,
}

impl InputDebouncer {
  pub fn new(delay: Duration) -> Self {
    let (committed_tx, committed) = mpsc::unbounded_channel();
    let tx = QueryDebounceHook {
      delay,
      pending: None,
      committed: committed_tx,
    }
    .spawn();
    Self { tx, committed }
  }

  pub fn push(&self, value: impl Into<String>) {
    send_blocking(&self.tx, InputEvent::Changed(value.into()));
  }

  /// Drop the pending value and anything committed but not yet taken.
  pub fn cancel(&mut self) {
    send_blocking(&self.tx, InputEvent::Cancel);
    while self.committed.try_recv().is_ok() {}
  }

  /// Newest committed query since the last call, if any.
  pub fn take_committed(&mut self) -> Option<String> {
    let mut latest = None;
    loop {
      match self.committed.try_recv() {
        Ok(query) => latest = Some(query),
        Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
      }
    }
    latest
  }
}

impl Default for InputDebouncer {
  fn default() -> Self {
    Self::new(DEFAULT_DEBOUNCE)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test(start_paused = true)]
  async fn typing_burst_commits_last_value() {
    let mut debouncer = InputDebouncer::default();
    for value in ["a", "ab", "abc"] {
      debouncer.push(value);
      tokio::time::sleep(Duration::from_millis(100)).await;
      assert_eq!(debouncer.take_committed(), None);
    }
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(debouncer.take_committed().as_deref(), Some("abc"));
    assert_eq!(debouncer.take_committed(), None);
  }

  #[tokio::test(start_paused = true)]
  async fn cancel_discards_pending() {
    let mut debouncer = InputDebouncer::default();
    debouncer.push("squad");
    tokio::time::sleep(Duration::from_millis(100)).await;
    debouncer.cancel();
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(debouncer.take_committed(), None);
  }

  #[tokio::test(start_paused = true)]
  async fn each_pause_commits_once() {
    let mut debouncer = InputDebouncer::default();
    debouncer.push("abc");
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(debouncer.take_committed().as_deref(), Some("abc"));
    debouncer.push("abcd");
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(debouncer.take_committed().as_deref(), Some("abcd"));
  }
}
