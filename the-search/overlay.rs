//! Dismissible overlays and the platform listener registry they hook into.
//!
//! The platform (terminal loop, browser shim, test) owns one
//! [`EventListeners`] registry and feeds every pointer-down and key-down
//! through [`EventListeners::dispatch`]. A [`DismissibleOverlay`] registers
//! its two listeners when created and removes them when dropped, so whoever
//! holds the overlay value decides exactly how long the listeners live.

use std::sync::{
  Arc,
  atomic::{
    AtomicU64,
    Ordering,
  },
};

use parking_lot::{
  Mutex,
  RwLock,
};

use crate::layout::OverlayRect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
  Escape,
  Enter,
  Up,
  Down,
  Backspace,
  Char(char),
  Other,
}

/// Events the platform forwards to registered listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformEvent {
  PointerDown { column: u16, row: u16 },
  KeyDown(Key),
}

impl PlatformEvent {
  pub fn kind(&self) -> ListenerKind {
    match self {
      Self::PointerDown { .. } => ListenerKind::PointerDown,
      Self::KeyDown(_) => ListenerKind::KeyDown,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
  PointerDown,
  KeyDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissReason {
  OutsidePointer,
  CancelKey,
  Cleared,
  Selected,
}

type Listener = Box<dyn FnMut(&PlatformEvent) + Send>;

struct Entry {
  id:       ListenerId,
  kind:     ListenerKind,
  listener: Listener,
}

/// Registry of platform-level listeners. Cloning shares the registry.
///
/// Listeners run with the registry locked and must not add or remove
/// listeners themselves; they are expected to record what happened (usually
/// by sending on a channel) and return.
#[derive(Clone, Default)]
pub struct EventListeners {
  entries: Arc<Mutex<Vec<Entry>>>,
  next_id: Arc<AtomicU64>,
}

impl EventListeners {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn add(
    &self,
    kind: ListenerKind,
    listener: impl FnMut(&PlatformEvent) + Send + 'static,
  ) -> ListenerId {
    let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
    self.entries.lock().push(Entry {
      id,
      kind,
      listener: Box::new(listener),
    });
    id
  }

  pub fn remove(&self, id: ListenerId) -> bool {
    let mut entries = self.entries.lock();
    let before = entries.len();
    entries.retain(|entry| entry.id != id);
    entries.len() != before
  }

  pub fn len(&self) -> usize {
    self.entries.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn count(&self, kind: ListenerKind) -> usize {
    self
      .entries
      .lock()
      .iter()
      .filter(|entry| entry.kind == kind)
      .count()
  }

  /// Run every listener registered for the event's kind, oldest first.
  pub fn dispatch(&self, event: &PlatformEvent) {
    let kind = event.kind();
    for entry in self.entries.lock().iter_mut() {
      if entry.kind == kind {
        (entry.listener)(event);
      }
    }
  }
}

impl std::fmt::Debug for EventListeners {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("EventListeners")
      .field("len", &self.len())
      .finish()
  }
}

/// Screen region occupied by a component. Updated by the renderer, read by
/// outside-pointer detection.
#[derive(Debug, Clone, Default)]
pub struct RootElement {
  rect: Arc<RwLock<OverlayRect>>,
}

impl RootElement {
  pub fn new(rect: OverlayRect) -> Self {
    Self {
      rect: Arc::new(RwLock::new(rect)),
    }
  }

  pub fn set(&self, rect: OverlayRect) {
    *self.rect.write() = rect;
  }

  pub fn get(&self) -> OverlayRect {
    *self.rect.read()
  }

  pub fn contains(&self, column: u16, row: u16) -> bool {
    self.rect.read().contains(column, row)
  }
}

/// Outside-pointer and cancel-key dismissal for one open surface.
///
/// Holding the value keeps both listeners registered; dropping it removes
/// them, whichever way the owner goes away.
pub struct DismissibleOverlay {
  listeners: EventListeners,
  pointer:   ListenerId,
  key:       ListenerId,
}

impl DismissibleOverlay {
  pub fn register<F>(listeners: &EventListeners, root: RootElement, on_dismiss: F) -> Self
  where
    F: Fn(DismissReason) + Send + Sync + 'static,
  {
    let on_dismiss = Arc::new(on_dismiss);

    let on_pointer = on_dismiss.clone();
    let pointer = listeners.add(ListenerKind::PointerDown, move |event| {
      if let PlatformEvent::PointerDown { column, row } = *event
        && !root.contains(column, row)
      {
        on_pointer(DismissReason::OutsidePointer);
      }
    });

    let key = listeners.add(ListenerKind::KeyDown, move |event| {
      if matches!(event, PlatformEvent::KeyDown(Key::Escape)) {
        on_dismiss(DismissReason::CancelKey);
      }
    });

    Self {
      listeners: listeners.clone(),
      pointer,
      key,
    }
  }
}

impl Drop for DismissibleOverlay {
  fn drop(&mut self) {
    self.listeners.remove(self.pointer);
    self.listeners.remove(self.key);
  }
}
