// vim: tw=80
//! Request-scoped cancellation for discovery calls.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering}
    },
    time::{Duration, Instant}
};

use tracing::trace;

use crate::DiscoverError;

#[derive(Default)]
struct Inner {
    cancelled: AtomicBool,
    deadline: Option<Instant>,
    parent: Option<Arc<Inner>>,
}

impl Inner {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire) ||
            self.parent.as_ref().is_some_and(|p| p.is_cancelled())
    }

    /// The earliest deadline of this context and all of its ancestors
    fn deadline(&self) -> Option<Instant> {
        let inherited = self.parent.as_ref().and_then(|p| p.deadline());
        match (self.deadline, inherited) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b)
        }
    }
}

/// Carries cancellation and a deadline across a discovery request.
///
/// Clones share state: cancelling any clone cancels them all.  A child made
/// with [`child`](Context::child), [`with_deadline`](Context::with_deadline) or
/// [`with_timeout`](Context::with_timeout) is cancelled along with its parent,
/// but cancelling the child leaves the parent untouched.
///
/// Two `Context`s compare equal only if they are clones of the same context.
#[derive(Clone, Default)]
pub struct Context {
    inner: Arc<Inner>,
}

impl Context {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    fn derive(&self, deadline: Option<Instant>) -> Self {
        let inner = Inner {
            cancelled: AtomicBool::new(false),
            deadline,
            parent: Some(self.inner.clone()),
        };
        Context{inner: Arc::new(inner)}
    }

    pub fn child(&self) -> Self {
        self.derive(None)
    }

    /// A child context that expires at `deadline`, or at the parent's deadline
    /// if that is earlier.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        self.derive(Some(deadline))
    }

    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::AcqRel) {
            trace!("context cancelled");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.is_cancelled()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline()
    }

    pub fn is_expired(&self) -> bool {
        self.deadline().is_some_and(|d| Instant::now() >= d)
    }

    /// Why this context is done, or `None` if it isn't.  Cancellation wins
    /// over an expired deadline.
    pub fn err(&self) -> Option<DiscoverError> {
        if self.is_cancelled() {
            Some(DiscoverError::Cancelled)
        } else if self.is_expired() {
            Some(DiscoverError::DeadlineExceeded)
        } else {
            None
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Context")
            .field("cancelled", &self.is_cancelled())
            .field("deadline", &self.deadline())
            .finish()
    }
}

impl PartialEq for Context {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Context {}
