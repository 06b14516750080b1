//! Per-screen operation state: `idle -> loading -> success | error`, plus a
//! notification channel the presentation layer can listen on.

use parking_lot::Mutex;
use std::collections::HashSet;
use std::future::Future;
use tokio::sync::broadcast;

use crate::errors::FlowError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationState<T> {
    Idle,
    Loading,
    Success(T),
    Error(String),
}

impl<T> OperationState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, OperationState::Loading)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Snippet,
    FullProject,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Failure(String),
    Copied(String),
}

/// Handed out by `begin`; a result finished with a stale ticket is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

struct Inner<T> {
    state: OperationState<T>,
    mode: Mode,
    generation: u64,
    copied: HashSet<String>,
}

pub struct Session<T> {
    inner: Mutex<Inner<T>>,
    events: broadcast::Sender<Notice>,
}

impl<T: Clone> Default for Session<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Session<T> {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(32);
        Self {
            inner: Mutex::new(Inner {
                state: OperationState::Idle,
                mode: Mode::Snippet,
                generation: 0,
                copied: HashSet::new(),
            }),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.events.subscribe()
    }

    pub fn state(&self) -> OperationState<T> {
        self.inner.lock().state.clone()
    }

    pub fn mode(&self) -> Mode {
        self.inner.lock().mode
    }

    /// Enters `Loading`, discarding any previous result. A second submission
    /// while one is in flight is refused rather than queued.
    pub fn begin(&self) -> Result<Ticket, FlowError> {
        let mut g = self.inner.lock();
        if g.state.is_loading() {
            return Err(FlowError::Busy);
        }
        g.generation += 1;
        g.state = OperationState::Loading;
        g.copied.clear();
        Ok(Ticket(g.generation))
    }

    pub fn finish(&self, ticket: Ticket, result: Result<T, FlowError>, label: &str) {
        let notice = {
            let mut g = self.inner.lock();
            if ticket.0 != g.generation || !g.state.is_loading() {
                tracing::debug!(label, "dropping stale result");
                return;
            }
            match result {
                Ok(v) => {
                    g.state = OperationState::Success(v);
                    Notice::Success(format!("{label} complete"))
                }
                Err(e) => {
                    let msg = e.user_message();
                    g.state = OperationState::Error(msg.clone());
                    Notice::Failure(msg)
                }
            }
        };
        let _ = self.events.send(notice);
    }

    /// `begin`, await `op`, `finish`. Returns the state the session ended in.
    pub async fn run<F, Fut>(&self, label: &str, op: F) -> Result<OperationState<T>, FlowError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, FlowError>>,
    {
        let ticket = self.begin()?;
        let result = op().await;
        self.finish(ticket, result, label);
        Ok(self.state())
    }

    /// Switching mode resets to `Idle` and discards any result, including
    /// one still in flight.
    pub fn set_mode(&self, mode: Mode) {
        let mut g = self.inner.lock();
        if g.mode == mode {
            return;
        }
        g.mode = mode;
        g.generation += 1;
        g.state = OperationState::Idle;
        g.copied.clear();
    }

    pub fn mark_copied(&self, id: &str) {
        self.inner.lock().copied.insert(id.to_string());
        let _ = self.events.send(Notice::Copied(id.to_string()));
    }

    pub fn is_copied(&self, id: &str) -> bool {
        self.inner.lock().copied.contains(id)
    }

    /// Failures outside an operation (e.g. clipboard) only notify.
    pub fn notify_failure(&self, msg: impl Into<String>) {
        let _ = self.events.send(Notice::Failure(msg.into()));
    }
}
