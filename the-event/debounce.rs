//! Debounced async hooks.

use std::time::Duration;

use futures_executor::block_on;
use tokio::{
  sync::mpsc::{
    self,
    Sender,
    error::TrySendError,
  },
  time::{
    Instant,
    sleep_until,
  },
};

/// Upper bound for blocking the UI thread on a full channel.
const SEND_TIMEOUT_MS: u64 = 2;

/// Buffered events per hook. Keystrokes are drained as soon as they arrive,
/// the headroom only matters for bursts (pasting, key repeat).
const HOOK_CHANNEL_CAPACITY: usize = 256;

/// A background task that receives events over a channel and decides, for
/// each one, whether to act now or to (re)arm a debounce deadline.
///
/// The hook runs until every sender returned by [`AsyncHook::spawn`] is
/// dropped. A deadline that is still armed at that point never fires, so
/// dropping the sender is how owners cancel a pending emission on teardown.
pub trait AsyncHook: Sync + Send + 'static + Sized {
  type Event: Sync + Send + 'static;

  /// Called immediately for every received event. Returning `Some` arms (or
  /// re-arms) the debounce deadline, returning `None` disarms it.
  fn handle_event(&mut self, event: Self::Event, timeout: Option<Instant>) -> Option<Instant>;

  /// Called when the armed deadline is reached without a newer event.
  fn finish_debounce(&mut self);

  fn spawn(self) -> mpsc::Sender<Self::Event> {
    let (tx, rx) = mpsc::channel(HOOK_CHANNEL_CAPACITY);
    // only spawn the worker inside a runtime so plain unit tests of the
    // owning types don't need one
    if tokio::runtime::Handle::try_current().is_ok() {
      tokio::spawn(run(self, rx));
    } else {
      log::debug!("no tokio runtime, async hook is inert");
    }
    tx
  }
}

/// Worker loop. An incoming event always wins over a deadline that expires
/// in the same instant, so a re-armed deadline is never fired early.
async fn run<Hook: AsyncHook>(mut hook: Hook, mut rx: mpsc::Receiver<Hook::Event>) {
  let mut deadline: Option<Instant> = None;
  loop {
    let armed = deadline.unwrap_or_else(Instant::now);
    tokio::select! {
      biased;
      event = rx.recv() => {
        let Some(event) = event else {
          // all senders gone, a pending deadline is abandoned
          return;
        };
        deadline = hook.handle_event(event, deadline);
      },
      () = sleep_until(armed), if deadline.is_some() => {
        deadline = None;
        hook.finish_debounce();
      },
    }
  }
}

/// Send an event from synchronous code. A full channel blocks the caller
/// for at most `SEND_TIMEOUT_MS` before the event is dropped.
pub fn send_blocking<T>(tx: &Sender<T>, data: T) {
  let data = match tx.try_send(data) {
    Ok(()) => return,
    Err(TrySendError::Full(data)) => data,
    Err(TrySendError::Closed(_)) => {
      log::debug!("hook channel closed, event dropped");
      return;
    },
  };
  let timeout = Duration::from_millis(SEND_TIMEOUT_MS);
  if block_on(tx.send_timeout(data, timeout)).is_err() {
    log::warn!("hook channel still full after {SEND_TIMEOUT_MS}ms, event dropped");
  }
}

/// Send without blocking. Returns false if the channel was full or closed.
pub fn try_send<T>(tx: &Sender<T>, data: T) -> bool {
  match tx.try_send(data) {
    Ok(()) => true,
    Err(TrySendError::Full(_)) => {
      log::trace!("hook channel full, event dropped");
      false
    },
    Err(TrySendError::Closed(_)) => false,
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use parking_lot::Mutex;

  use super::*;

  struct Collect {
    delay:   Duration,
    pending: Option<u32>,
    fired:   Arc<Mutex<Vec<u32>>>,
  }

  impl AsyncHook for Collect {
    type Event = u32;

    fn handle_event(&mut self, event: u32, _timeout: Option<Instant>) -> Option<Instant> {
      self.pending = Some(event);
      Some(Instant::now() + self.delay)
    }

    fn finish_debounce(&mut self) {
      if let Some(value) = self.pending.take() {
        self.fired.lock().push(value);
      }
    }
  }

  fn collect(delay_ms: u64) -> (Sender<u32>, Arc<Mutex<Vec<u32>>>) {
    let fired = Arc::new(Mutex::new(Vec::new()));
    let tx = Collect {
      delay:   Duration::from_millis(delay_ms),
      pending: None,
      fired:   fired.clone(),
    }
    .spawn();
    (tx, fired)
  }

  #[tokio::test(start_paused = true)]
  async fn burst_fires_once_with_last_value() {
    let (tx, fired) = collect(300);
    for value in 1..=3 {
      send_blocking(&tx, value);
      tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert!(fired.lock().is_empty());

    tokio::time::sleep(Duration::from_millis(250)).await;
    assert_eq!(*fired.lock(), vec![3]);
  }

  #[tokio::test(start_paused = true)]
  async fn separate_pauses_fire_separately() {
    let (tx, fired) = collect(300);
    send_blocking(&tx, 1);
    tokio::time::sleep(Duration::from_millis(400)).await;
    send_blocking(&tx, 2);
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(*fired.lock(), vec![1, 2]);
  }

  #[tokio::test(start_paused = true)]
  async fn dropping_sender_cancels_pending_deadline() {
    let (tx, fired) = collect(300);
    send_blocking(&tx, 7);
    drop(tx);
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(fired.lock().is_empty());
  }

  #[test]
  fn spawn_without_runtime_is_inert() {
    let (tx, fired) = collect(10);
    assert!(!try_send(&tx, 1));
    assert!(fired.lock().is_empty());
  }
}
