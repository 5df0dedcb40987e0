// vim: tw=80
use std::{
    fmt,
    ops::{Deref, DerefMut},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    thread
};

use discoverer::{Context, DiscoverError, Discoverer, Graph};
use predicates::prelude::Predicate;
use tracing::{debug, trace, warn};

use crate::{
    MockError,
    expectation::{Expectation, Output},
    testing::TestingT
};

/// Name of the mocked method, as recorded in the ledger
pub const DISCOVER: &str = "discover";

/// One recorded invocation of the mock
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Call {
    /// Always [`DISCOVER`]
    pub method: &'static str,
    /// The context the call was made with
    pub ctx: Context,
    /// Index of the expectation that produced the call's result, or `None` if
    /// the call failed
    pub expectation: Option<usize>,
}

/// Where a mock is in its life
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    /// Expectations are being registered; no calls yet
    #[default]
    Configured,
    /// At least one call has been made
    InUse,
    /// Expectations have been verified.  The mock accepts no more calls.
    Verified,
}

#[derive(Default)]
struct State {
    phase: Phase,
    expectations: Vec<Expectation>,
    calls: Vec<Call>,
}

impl State {
    /// Pick the expectation for a call: the first matching one that isn't
    /// exhausted, or else the last matching one so the overrun gets reported.
    fn select(&self, ctx: &Context) -> Option<usize> {
        let mut exhausted = None;
        for (i, e) in self.expectations.iter().enumerate() {
            if e.matches(ctx) {
                if !e.is_done() {
                    return Some(i);
                }
                exhausted = Some(i);
            }
        }
        exhausted
    }

    /// Record the call, then hand it to the selected expectation.  The record
    /// only names the expectation once that expectation produced a result.
    fn call(&mut self, ctx: &Context) -> Result<Output, MockError> {
        let record = self.calls.len();
        self.calls.push(Call {
            method: DISCOVER,
            ctx: ctx.clone(),
            expectation: None
        });
        if self.phase == Phase::Verified {
            trace!(calls = self.calls.len(), "recorded call to verified mock");
            return Err(MockError::Verified);
        }
        self.phase = Phase::InUse;
        let Some(index) = self.select(ctx) else {
            trace!(calls = self.calls.len(), "recorded unexpected call");
            let mut detail = String::new();
            for (i, e) in self.expectations.iter().enumerate() {
                e.describe_mismatch(i, ctx, &mut detail);
            }
            return Err(MockError::UnexpectedCall{detail});
        };
        debug!(index, "expectation matched");
        let output = self.expectations[index].call(index, ctx)?;
        self.calls[record].expectation = Some(index);
        trace!(calls = self.calls.len(), index, "recorded call");
        Ok(output)
    }

    fn unsatisfied(&self) -> Vec<MockError> {
        self.expectations.iter()
            .enumerate()
            .filter(|(_, e)| !e.times_ref().is_satisfied())
            .map(|(index, e)| MockError::Unsatisfied {
                index,
                calls: e.times_ref().count(),
                min: e.times_ref().min()
            }).collect()
    }

    /// Check every expectation and move to [`Phase::Verified`].  A mock is only
    /// verified once; later calls return nothing.
    fn verify(&mut self) -> Vec<MockError> {
        if self.phase == Phase::Verified {
            return Vec::new();
        }
        debug!(expectations = self.expectations.len(), calls = self.calls.len(),
               "verifying expectations");
        self.phase = Phase::Verified;
        self.unsatisfied()
    }
}

fn lock(state: &Mutex<State>) -> MutexGuard<'_, State> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mock implementation of [`Discoverer`].
///
/// Bind it to a test with [`new`](Self::new), or use
/// [`default`](Self::default) for a mock that verifies itself when dropped.
/// Every call to [`discover`](Discoverer::discover) is recorded, whether or
/// not it matched an expectation.
pub struct MockDiscoverer {
    state: Arc<Mutex<State>>,
    t: Option<Arc<dyn TestingT>>,
}

impl MockDiscoverer {
    /// Create a mock bound to the test `t`.
    ///
    /// The mock reports its failures to `t`, and registers a cleanup on `t`
    /// that asserts every expectation was met.
    pub fn new<T>(t: &T) -> Self
        where T: TestingT + Clone + 'static
    {
        let state = Arc::new(Mutex::new(State::default()));
        let verify_state = state.clone();
        t.cleanup(Box::new(move |t: &dyn TestingT| {
            let failures = lock(&verify_state).verify();
            for f in failures {
                warn!(%f, "unmet expectation");
                t.report_failure(&f);
            }
        }));
        let t: Arc<dyn TestingT> = Arc::new(t.clone());
        MockDiscoverer{state, t: Some(t)}
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        lock(&self.state)
    }

    fn report(&self, err: &MockError) {
        warn!(%err, "mock failure");
        match &self.t {
            Some(t) => t.report_failure(err),
            None => panic!("{err}")
        }
    }

    fn fail_now(&self, err: &MockError) -> ! {
        warn!(%err, "mock failure");
        match &self.t {
            Some(t) => t.fail_now(err),
            None => panic!("{err}")
        }
    }

    /// Register a new expectation for `discover`.
    ///
    /// Expectations are tried in the order they were registered.
    ///
    /// # Panics
    ///
    /// If the mock has already been verified.
    pub fn expect_discover(&mut self) -> ExpectationGuard<'_> {
        let mut guard = self.lock();
        assert!(guard.phase != Phase::Verified,
            "MockDiscoverer: cannot add expectations to a verified mock");
        guard.expectations.push(Expectation::new());
        let i = guard.expectations.len() - 1;
        trace!(index = i, "registered expectation");
        ExpectationGuard{guard, i}
    }

    /// Call the mock, returning its own failures instead of aborting on them.
    ///
    /// The outer `Result` is the mock's verdict on the call; the inner one is
    /// what the expectation produced.
    pub fn try_discover(&self, ctx: &Context)
        -> Result<Result<Graph, DiscoverError>, MockError>
    {
        self.lock().call(ctx)
    }

    /// Assert that every expectation was called as often as it requires.
    ///
    /// Each unmet expectation is reported as a separate failure.  Afterwards
    /// the mock is verified and accepts no more calls.  This runs
    /// automatically when the bound test finishes.
    pub fn assert_expectations(&self) -> bool {
        let failures = self.lock().verify();
        for f in &failures {
            self.report(f);
        }
        failures.is_empty()
    }

    /// Verify and clear the current expectations, then keep using the mock.
    ///
    /// Unlike [`assert_expectations`](Self::assert_expectations), any unmet
    /// expectation stops the test.  Failures are reported in registration
    /// order; the last one is fatal.
    pub fn checkpoint(&mut self) {
        let failures = {
            let mut guard = self.lock();
            let failures = guard.unsatisfied();
            guard.expectations.clear();
            failures
        };
        if let Some((last, rest)) = failures.split_last() {
            for f in rest {
                self.report(f);
            }
            self.fail_now(last);
        }
    }

    /// Every call made so far, in order
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// Where the mock is in its life
    pub fn phase(&self) -> Phase {
        self.lock().phase
    }

    fn num_calls(&self) -> usize {
        self.lock().calls.len()
    }

    /// Assert that `discover` was called at least once.
    pub fn assert_called(&self) -> bool {
        if self.num_calls() == 0 {
            self.report(&MockError::AssertCalled);
            false
        } else {
            true
        }
    }

    /// Assert that `discover` was called with a context satisfying `p`.
    pub fn assert_called_with<P>(&self, p: P) -> bool
        where P: Predicate<Context>
    {
        let called = self.lock().calls.iter()
            .any(|c| p.eval(&c.ctx));
        if !called {
            self.report(&MockError::AssertCalled);
        }
        called
    }

    /// Assert that `discover` was never called.
    pub fn assert_not_called(&self) -> bool {
        let calls = self.num_calls();
        if calls > 0 {
            self.report(&MockError::AssertNotCalled{calls});
            false
        } else {
            true
        }
    }

    /// Assert that `discover` was called exactly `expected` times, counting
    /// calls that failed.
    pub fn assert_number_of_calls(&self, expected: usize) -> bool {
        let actual = self.num_calls();
        if actual != expected {
            self.report(&MockError::AssertNumberOfCalls{expected, actual});
            false
        } else {
            true
        }
    }
}

impl Default for MockDiscoverer {
    /// A mock not bound to any test.  Failures panic, and unmet expectations
    /// panic when the mock is dropped.
    fn default() -> Self {
        MockDiscoverer{state: Arc::default(), t: None}
    }
}

impl Drop for MockDiscoverer {
    fn drop(&mut self) {
        // A bound mock is verified by its test's cleanup
        if self.t.is_some() || thread::panicking() {
            return;
        }
        let failures = self.lock().verify();
        if let Some(f) = failures.first() {
            panic!("{f}");
        }
    }
}

impl fmt::Debug for MockDiscoverer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let guard = self.lock();
        f.debug_struct("MockDiscoverer")
            .field("phase", &guard.phase)
            .field("expectations", &guard.expectations.len())
            .field("calls", &guard.calls.len())
            .finish()
    }
}

impl Discoverer for MockDiscoverer {
    fn discover(&self, ctx: &Context) -> Result<Graph, DiscoverError> {
        // The lock must be released before failing
        let result = self.try_discover(ctx);
        match result {
            Ok(r) => r,
            Err(e) => self.fail_now(&e)
        }
    }
}

// We must return the MutexGuard to the caller so it can configure the
// expectation.  The guard and the &mut Expectation can't live in the same
// struct, so record the expectation's position instead and deref to it.
pub struct ExpectationGuard<'guard> {
    guard: MutexGuard<'guard, State>,
    i: usize
}

impl<'guard> Deref for ExpectationGuard<'guard> {
    type Target = Expectation;

    fn deref(&self) -> &Expectation {
        &self.guard.expectations[self.i]
    }
}

impl<'guard> DerefMut for ExpectationGuard<'guard> {
    fn deref_mut(&mut self) -> &mut Expectation {
        &mut self.guard.expectations[self.i]
    }
}
