//! Pending query results

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

/// Outcome of a deferred vault query.
///
/// Always completes, with `Some(value)` or `None` for "not found". Resolver
/// failures are never surfaced here. Await it, peek with [`Self::try_now`],
/// or block on [`Self::wait`].
#[must_use = "a resolution does nothing useful unless it is awaited or inspected"]
#[derive(Debug)]
pub struct Resolution<T> {
    state: State<T>,
}

#[derive(Debug)]
enum State<T> {
    /// `None` once the value has been handed out by `poll`.
    Ready(Option<Option<T>>),
    Pending(oneshot::Receiver<Option<T>>),
}

impl<T> Resolution<T> {
    pub fn ready(value: Option<T>) -> Self {
        Self {
            state: State::Ready(Some(value)),
        }
    }

    pub fn not_found() -> Self {
        Self::ready(None)
    }

    pub(crate) fn pending(receiver: oneshot::Receiver<Option<T>>) -> Self {
        Self {
            state: State::Pending(receiver),
        }
    }

    /// Whether the result was known when the query returned.
    pub fn completed_immediately(&self) -> bool {
        matches!(self.state, State::Ready(_))
    }

    /// Block the current thread until the query completes.
    ///
    /// Must not be called from inside an async runtime worker.
    pub fn wait(self) -> Option<T> {
        match self.state {
            State::Ready(value) => value.flatten(),
            State::Pending(receiver) => receiver.blocking_recv().ok().flatten(),
        }
    }
}

impl<T: Clone> Resolution<T> {
    /// Non-blocking peek. `None` while the query is still running.
    pub fn try_now(&mut self) -> Option<Option<T>> {
        match &mut self.state {
            State::Ready(value) => Some(value.clone().flatten()),
            State::Pending(receiver) => {
                let outcome = match receiver.try_recv() {
                    Ok(value) => value,
                    Err(oneshot::error::TryRecvError::Empty) => return None,
                    Err(oneshot::error::TryRecvError::Closed) => None,
                };
                self.state = State::Ready(Some(outcome.clone()));
                Some(outcome)
            }
        }
    }
}

// The value is never pinned; only the receiver is polled.
impl<T> Unpin for Resolution<T> {}

impl<T> Future for Resolution<T> {
    type Output = Option<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match &mut this.state {
            State::Ready(value) => Poll::Ready(value.take().flatten()),
            // A dropped sender means the task never finished: not found.
            State::Pending(receiver) => Pin::new(receiver).poll(cx).map(|r| r.ok().flatten()),
        }
    }
}
