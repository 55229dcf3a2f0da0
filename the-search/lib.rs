//! Incremental search for the directory: a text input that queries a lookup
//! service while the user types.
//!
//! The pieces, from keystroke to navigation:
//!
//! 1. [`InputDebouncer`] turns raw input into committed queries.
//! 2. [`QueryCoordinator`] checks eligibility, issues lookups tagged with a
//!    generation, and applies only the response of the latest one.
//! 3. [`SearchSession`] holds the visible state; [`PanelState`] and
//!    [`StatusLine`] are derived from it.
//! 4. [`DismissibleOverlay`] closes the panel on outside pointer-down or the
//!    cancel key while it is open.
//!
//! [`SearchBox`] wires them together and is what a front-end embeds.

mod backend;
mod component;
mod coordinator;
mod debounce;
mod error;
pub mod icons;
pub mod layout;
mod overlay;
mod result;
mod session;

pub use backend::{
  Navigator,
  SearchBackend,
};
pub use component::{
  SearchBox,
  SearchBoxConfig,
};
pub use coordinator::{
  LookupResponse,
  QueryCoordinator,
  QueryDecision,
};
pub use debounce::{
  DEFAULT_DEBOUNCE,
  InputDebouncer,
};
pub use error::SearchError;
pub use icons::{
  EntityIcon,
  icon_for_kind,
};
pub use layout::OverlayRect;
pub use overlay::{
  DismissReason,
  DismissibleOverlay,
  EventListeners,
  Key,
  ListenerId,
  ListenerKind,
  PlatformEvent,
  RootElement,
};
pub use result::{
  EntityKind,
  SearchResponse,
  SearchResult,
};
pub use session::{
  DEFAULT_MAX_RESULTS,
  MIN_QUERY_CHARS,
  PanelState,
  SearchSession,
  StatusLine,
  is_search_eligible,
};
