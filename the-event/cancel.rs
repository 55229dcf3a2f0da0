use std::{
  future::Future,
  sync::{
    Arc,
    atomic::{
      AtomicBool,
      Ordering,
    },
  },
};

use tokio::sync::Notify;

#[derive(Debug, Default)]
struct CancelState {
  canceled: AtomicBool,
  notify:   Notify,
}

impl CancelState {
  fn cancel(&self) {
    self.canceled.store(true, Ordering::Release);
    self.notify.notify_waiters();
  }
}

/// Owns the "current" background task. Starting a new task through
/// [`TaskController::restart`] cancels the previous one.
///
/// Dropping the controller cancels whatever is still running.
#[derive(Debug, Default)]
pub struct TaskController {
  current: Option<Arc<CancelState>>,
}

impl TaskController {
  pub fn new() -> Self {
    Self::default()
  }

  /// Cancels the running task (if any) and returns a handle for a new one.
  pub fn restart(&mut self) -> TaskHandle {
    self.cancel();
    let state = Arc::new(CancelState::default());
    self.current = Some(state.clone());
    TaskHandle { state }
  }

  pub fn cancel(&mut self) {
    if let Some(state) = self.current.take() {
      state.cancel();
    }
  }

  /// True while the handle of the current task is still alive.
  pub fn is_running(&self) -> bool {
    self
      .current
      .as_ref()
      .is_some_and(|state| Arc::strong_count(state) > 1)
  }
}

impl Drop for TaskController {
  fn drop(&mut self) {
    self.cancel();
  }
}

/// Cancellation token held by a background task.
#[derive(Debug, Clone)]
pub struct TaskHandle {
  state: Arc<CancelState>,
}

impl TaskHandle {
  pub fn is_canceled(&self) -> bool {
    self.state.canceled.load(Ordering::Acquire)
  }

  /// Resolves once the owning controller cancels this task.
  pub async fn canceled(&self) {
    loop {
      let notified = self.state.notify.notified();
      tokio::pin!(notified);
      notified.as_mut().enable();
      if self.is_canceled() {
        return;
      }
      notified.await;
    }
  }
}

/// Drive `future` to completion unless `handle` is canceled first.
pub async fn cancelable_future<T>(future: impl Future<Output = T>, handle: TaskHandle) -> Option<T> {
  tokio::select! {
    biased;
    _ = handle.canceled() => None,
    res = future => Some(res),
  }
}
