// vim: tw=80
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering}
};

use crate::MockError;

/// An expectation's place in a [`Sequence`]
pub(crate) struct SeqHandle {
    inner: Arc<SeqInner>,
    seq: usize
}

impl SeqHandle {
    /// Tell the Sequence that this expectation has been fully satisfied
    pub(crate) fn satisfy(&self, index: usize) -> Result<(), MockError> {
        self.inner.satisfy(self.seq, index)
    }

    /// Verify that this handle was called in the correct order
    pub(crate) fn verify(&self, index: usize) -> Result<(), MockError> {
        self.inner.verify(self.seq, index)
    }
}

#[derive(Default)]
struct SeqInner {
    satisfaction_level: AtomicUsize,
}

impl SeqInner {
    fn satisfy(&self, seq: usize, index: usize) -> Result<(), MockError> {
        let level = self.satisfaction_level.fetch_add(1, Ordering::Relaxed);
        if level == seq {
            Ok(())
        } else {
            Err(MockError::SequenceViolation{index})
        }
    }

    fn verify(&self, seq: usize, index: usize) -> Result<(), MockError> {
        if seq == self.satisfaction_level.load(Ordering::Relaxed) {
            Ok(())
        } else {
            Err(MockError::SequenceViolation{index})
        }
    }
}

/// Requires expectations to be satisfied in the order they were added.
///
/// Every expectation in a sequence must expect an exact number of calls.  Once
/// it has received them, the next expectation in the sequence becomes callable.
/// A `Sequence` may span several mocks, for example two discoverers that must
/// be queried in a fixed order.
///
/// # Examples
/// ```
/// # use discoverer::{Context, Discoverer, Graph};
/// # use discoverer_mock::{MockDiscoverer, Sequence};
/// let mut seq = Sequence::new();
/// let mut first = MockDiscoverer::default();
/// first.expect_discover()
///     .once()
///     .in_sequence(&mut seq)
///     .return_const(Graph::new());
/// let mut second = MockDiscoverer::default();
/// second.expect_discover()
///     .once()
///     .in_sequence(&mut seq)
///     .return_const(Graph::new());
///
/// let ctx = Context::background();
/// first.discover(&ctx).unwrap();
/// second.discover(&ctx).unwrap();
/// ```
#[derive(Default)]
pub struct Sequence {
    inner: Arc<SeqInner>,
    next_seq: usize,
}

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn next_handle(&mut self) -> SeqHandle {
        let handle = SeqHandle{inner: self.inner.clone(), seq: self.next_seq};
        self.next_seq += 1;
        handle
    }
}
