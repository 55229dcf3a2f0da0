use tokio::sync::broadcast::{
  self,
  error::TryRecvError,
};

const SIGNAL_CAPACITY: usize = 16;

/// A cloneable broadcast capability. Every clone emits into the same signal
/// and every [`SignalReceiver`] observes each value emitted after it
/// subscribed.
#[derive(Debug, Clone)]
pub struct Signal<T: Clone> {
  tx: broadcast::Sender<T>,
}

impl<T: Clone> Signal<T> {
  pub fn new() -> Self {
    let (tx, _) = broadcast::channel(SIGNAL_CAPACITY);
    Self { tx }
  }

  /// Returns the number of receivers that will observe the value.
  pub fn emit(&self, value: T) -> usize {
    self.tx.send(value).unwrap_or(0)
  }

  pub fn subscribe(&self) -> SignalReceiver<T> {
    SignalReceiver {
      rx: self.tx.subscribe(),
    }
  }

  pub fn receiver_count(&self) -> usize {
    self.tx.receiver_count()
  }
}

impl<T: Clone> Default for Signal<T> {
  fn default() -> Self {
    Self::new()
  }
}

#[derive(Debug)]
pub struct SignalReceiver<T: Clone> {
  rx: broadcast::Receiver<T>,
}

impl<T: Clone> SignalReceiver<T> {
  /// Next pending value, without blocking. Values lost to lag are skipped.
  pub fn try_recv(&mut self) -> Option<T> {
    loop {
      match self.rx.try_recv() {
        Ok(value) => return Some(value),
        Err(TryRecvError::Lagged(skipped)) => {
          log::debug!("signal receiver lagged by {skipped} values");
        },
        Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
      }
    }
  }

  /// Drain everything pending and return the newest value.
  pub fn latest(&mut self) -> Option<T> {
    let mut latest = None;
    while let Some(value) = self.try_recv() {
      latest = Some(value);
    }
    latest
  }

  pub async fn recv(&mut self) -> Option<T> {
    loop {
      match self.rx.recv().await {
        Ok(value) => return Some(value),
        Err(broadcast::error::RecvError::Lagged(_)) => continue,
        Err(broadcast::error::RecvError::Closed) => return None,
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn emit_reaches_every_subscriber() {
    let signal = Signal::new();
    let mut a = signal.subscribe();
    let mut b = signal.clone().subscribe();
    assert_eq!(signal.emit(1u8), 2);
    assert_eq!(a.try_recv(), Some(1));
    assert_eq!(b.try_recv(), Some(1));
    assert_eq!(a.try_recv(), None);
  }

  #[test]
  fn emit_without_subscribers_is_harmless() {
    let signal = Signal::new();
    assert_eq!(signal.emit("x"), 0);
  }

  #[test]
  fn lagging_receiver_keeps_newest() {
    let signal = Signal::new();
    let mut rx = signal.subscribe();
    for value in 0..(SIGNAL_CAPACITY as u32 + 4) {
      signal.emit(value);
    }
    assert_eq!(rx.latest(), Some(SIGNAL_CAPACITY as u32 + 3));
  }
}
