use std::fmt::Display;

use tokio::sync::watch;
use tracing::debug;

/// What a presentation layer renders: the last applied data, whether a fetch
/// is outstanding, and the last failure (if the latest fetch failed).
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState<T> {
    pub data: T,
    pub loading: bool,
    pub error: Option<String>,
    /// Generation of the most recently issued request.
    pub generation: u64,
}

/// Proof that a request was issued, carrying its generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

impl Ticket {
    pub fn generation(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome<T> {
    /// The response was current and is now displayed.
    Applied(T),
    /// A newer request was issued meanwhile; the response was discarded.
    Stale,
    /// No request was needed (e.g. no next page).
    Unchanged,
}

impl<T> FetchOutcome<T> {
    pub fn applied(self) -> Option<T> {
        match self {
            Self::Applied(data) => Some(data),
            _ => None,
        }
    }
}

/// Single-writer view state guarded by a generation counter.
///
/// `begin` issues a ticket and marks the view loading; `settle` applies a
/// result only if its ticket is still the latest. Responses that lose the race
/// are dropped without touching the state, and failures keep the previous
/// data in place. Both steps run under the watch channel's lock, so settles
/// are serialized against each other and against `begin`.
pub struct ViewModel<T> {
    tx: watch::Sender<ViewState<T>>,
}

impl<T: Clone> ViewModel<T> {
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(ViewState {
            data: initial,
            loading: false,
            error: None,
            generation: 0,
        });
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState<T>> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> ViewState<T> {
        self.tx.borrow().clone()
    }

    pub fn begin(&self) -> Ticket {
        let mut generation = 0;
        self.tx.send_modify(|state| {
            state.generation += 1;
            state.loading = true;
            generation = state.generation;
        });
        Ticket(generation)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.tx.borrow().generation == ticket.0
    }

    pub fn settle<E: Display>(
        &self,
        ticket: Ticket,
        result: Result<T, E>,
    ) -> Result<FetchOutcome<T>, E> {
        let mut outcome = None;

        self.tx.send_if_modified(|state| {
            if state.generation != ticket.0 {
                return false;
            }
            state.loading = false;
            match result {
                Ok(data) => {
                    state.data = data.clone();
                    state.error = None;
                    outcome = Some(Ok(data));
                }
                Err(e) => {
                    state.error = Some(e.to_string());
                    outcome = Some(Err(e));
                }
            }
            true
        });

        match outcome {
            Some(Ok(data)) => Ok(FetchOutcome::Applied(data)),
            Some(Err(e)) => Err(e),
            None => {
                debug!("Discarding stale response for request {}", ticket.0);
                Ok(FetchOutcome::Stale)
            }
        }
    }
}
