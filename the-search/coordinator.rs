use std::sync::Arc;

use the_directory_event::{
  TaskController,
  cancelable_future,
};
use tokio::sync::mpsc::{
  self,
  UnboundedReceiver,
  UnboundedSender,
  error::TryRecvError,
};

use crate::{
  backend::SearchBackend,
  error::SearchError,
  result::SearchResult,
  session::SearchSession,
};

/// Completion of one lookup, tagged with the generation it was issued under.
#[derive(Debug)]
pub struct LookupResponse {
  pub generation: u64,
  pub query:      String,
  pub outcome:    Result<Vec<SearchResult>, SearchError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryDecision {
  BelowThreshold,
  Issued { generation: u64 },
}

/// Decides which committed queries reach the backend and which responses
/// reach the session.
///
/// Every lookup is tagged with a monotonically increasing generation. Only a
/// response carrying the generation of the most recent lookup is applied;
/// anything older is dropped without touching the session. Starting a lookup
/// also cancels the previous in-flight one, but the generation check is what
/// guarantees ordering since a superseded response may already be queued.
pub struct QueryCoordinator {
  backend:            Arc<dyn SearchBackend>,
  generation:         u64,
  pending_generation: Option<u64>,
  task_controller:    TaskController,
  response_tx:        UnboundedSender<LookupResponse>,
  response_rx:        UnboundedReceiver<LookupResponse>,
}

impl QueryCoordinator {
  pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
    let (response_tx, response_rx) = mpsc::unbounded_channel();
    Self {
      backend,
      generation: 0,
      pending_generation: None,
      task_controller: TaskController::new(),
      response_tx,
      response_rx,
    }
  }

  pub fn generation(&self) -> u64 {
    self.generation
  }

  /// True while the latest lookup hasn't been answered.
  pub fn is_pending(&self) -> bool {
    self.pending_generation.is_some()
  }

  pub fn on_debounced_query_change(
    &mut self,
    session: &mut SearchSession,
    query: &str,
  ) -> QueryDecision {
    if !session.is_eligible(query) {
      self.invalidate();
      session.skip_lookup(query);
      return QueryDecision::BelowThreshold;
    }

    let generation = self.next_generation();
    self.pending_generation = Some(generation);
    session.begin_lookup(query);
    self.spawn_lookup(generation, query.to_string());
    QueryDecision::Issued { generation }
  }

  /// Forget every outstanding lookup; their responses will be discarded.
  pub fn invalidate(&mut self) {
    self.next_generation();
    self.pending_generation = None;
    self.task_controller.cancel();
  }

  /// Apply whatever responses arrived since the last poll. Returns true when
  /// the session changed.
  pub fn poll(&mut self, session: &mut SearchSession) -> bool {
    let mut changed = false;
    loop {
      match self.response_rx.try_recv() {
        Ok(response) => changed |= self.accept(session, response),
        Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
      }
    }
    changed
  }

  pub(crate) fn accept(&mut self, session: &mut SearchSession, response: LookupResponse) -> bool {
    if self.pending_generation != Some(response.generation) {
      log::debug!(
        "discarding stale response for {:?} (generation {}, latest {})",
        response.query,
        response.generation,
        self.generation
      );
      return false;
    }

    self.pending_generation = None;
    match response.outcome {
      Ok(results) => {
        log::debug!("{} results for {:?}", results.len(), response.query);
        session.apply_results(results);
      },
      Err(err) => {
        log::error!("search for {:?} failed: {err}", response.query);
        session.apply_failure();
      },
    }
    true
  }

  fn next_generation(&mut self) -> u64 {
    self.generation = self.generation.wrapping_add(1);
    self.generation
  }

  fn spawn_lookup(&mut self, generation: u64, query: String) {
    let handle = self.task_controller.restart();
    let response_tx = self.response_tx.clone();

    if tokio::runtime::Handle::try_current().is_err() {
      let _ = response_tx.send(LookupResponse {
        generation,
        query,
        outcome: Err(SearchError::Unavailable("no async runtime".into())),
      });
      return;
    }

    let backend = self.backend.clone();
    tokio::spawn(async move {
      let outcome = cancelable_future(backend.search(&query), handle).await;
      match outcome {
        // the receiver is gone once the owning component is torn down
        Some(outcome) => {
          let _ = response_tx.send(LookupResponse {
            generation,
            query,
            outcome,
          });
        },
        None => log::trace!("lookup for {query:?} canceled"),
      }
    });
  }
}
