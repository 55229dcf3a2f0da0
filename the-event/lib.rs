//! Event plumbing shared by the directory crates.
//!
//! - [`AsyncHook`] runs a debounced event handler as a background task.
//! - [`TaskController`] hands out [`TaskHandle`]s that are cancelled as soon
//!   as a newer task is started.
//! - [`Signal`] is a cloneable broadcast capability used to connect distant
//!   components without global state.

mod cancel;
mod debounce;
mod signal;

pub use cancel::{
  TaskController,
  TaskHandle,
  cancelable_future,
};
pub use debounce::{
  AsyncHook,
  send_blocking,
  try_send,
};
pub use signal::{
  Signal,
  SignalReceiver,
};
