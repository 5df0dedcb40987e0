// vim: tw=80
//! The test lifecycle a mock is bound to.

use std::{
    mem,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    thread
};

use tracing::debug;

use crate::MockError;

/// A teardown action.  It receives the handle it was registered on so it can
/// report failures.
pub type Cleanup = Box<dyn FnOnce(&dyn TestingT) + Send>;

/// The capabilities a mock needs from the test it runs in.
///
/// Any test harness that can record failures and run teardown actions can
/// drive a mock.  [`TestHarness`] implements it for the standard `#[test]`
/// runner.
pub trait TestingT: Send + Sync {
    /// Record a failure and let the test keep running.
    fn report_failure(&self, err: &MockError);

    /// Register an action to run when the test finishes.  Actions run in the
    /// reverse order of registration.
    fn cleanup(&self, f: Cleanup);

    /// Record a failure and stop the test.
    fn fail_now(&self, err: &MockError) -> ! {
        self.report_failure(err);
        panic!("{err}");
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
struct HarnessInner {
    failures: Mutex<Vec<MockError>>,
    cleanups: Mutex<Vec<Cleanup>>,
}

impl HarnessInner {
    fn run_cleanups(&self) {
        // Take them out first; a cleanup may register another one
        loop {
            let cleanups = mem::take(&mut *lock(&self.cleanups));
            if cleanups.is_empty() {
                break;
            }
            debug!(n = cleanups.len(), "running test cleanups");
            for f in cleanups.into_iter().rev() {
                f(self);
            }
        }
    }
}

impl TestingT for HarnessInner {
    fn report_failure(&self, err: &MockError) {
        lock(&self.failures).push(err.clone());
    }

    fn cleanup(&self, f: Cleanup) {
        lock(&self.cleanups).push(f);
    }
}

impl Drop for HarnessInner {
    fn drop(&mut self) {
        self.run_cleanups();
        let failures = mem::take(&mut *lock(&self.failures));
        if failures.is_empty() || thread::panicking() {
            return;
        }
        let msgs = failures.iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");
        panic!("{} mock failure(s):\n{}", failures.len(), msgs);
    }
}

/// [`TestingT`] for the standard `#[test]` runner.
///
/// Clones share one test.  When the last clone is dropped the cleanups run,
/// and if any failure was recorded the test panics with all of them.  Create
/// it before the mocks that use it so that it is dropped after them.
///
/// # Examples
/// ```should_panic
/// # use discoverer::Graph;
/// # use discoverer_mock::{MockDiscoverer, TestHarness};
/// let t = TestHarness::new();
/// let mut mock = MockDiscoverer::new(&t);
/// mock.expect_discover()
///     .once()
///     .return_const(Graph::new());
/// // discover is never called, so the test fails at teardown
/// ```
#[derive(Clone, Default)]
pub struct TestHarness(Arc<HarnessInner>);

impl TestHarness {
    pub fn new() -> Self {
        Self::default()
    }

    /// Failures recorded so far
    pub fn failures(&self) -> Vec<MockError> {
        lock(&self.0.failures).clone()
    }

    /// Has any failure been recorded?
    pub fn failed(&self) -> bool {
        !lock(&self.0.failures).is_empty()
    }

    /// Run the cleanups now and take every recorded failure, instead of
    /// panicking with them on drop.  Lets a test assert on teardown failures.
    pub fn finish(self) -> Vec<MockError> {
        self.0.run_cleanups();
        // The guard must be released before self is dropped
        #[allow(clippy::let_and_return)]
        let failures = mem::take(&mut *lock(&self.0.failures));
        failures
    }
}

impl TestingT for TestHarness {
    fn report_failure(&self, err: &MockError) {
        self.0.report_failure(err);
    }

    fn cleanup(&self, f: Cleanup) {
        self.0.cleanup(f);
    }
}

#[cfg(test)]
mod t {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn cleanups_run_in_reverse() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let t = TestHarness::new();
        for i in 0..3 {
            let order = order.clone();
            t.cleanup(Box::new(move |_: &dyn TestingT| {
                order.lock().unwrap().push(i)
            }));
        }
        assert!(t.finish().is_empty());
        assert_eq!(vec![2, 1, 0], *order.lock().unwrap());
    }

    #[test]
    fn cleanup_reports_through_handle() {
        let t = TestHarness::new();
        t.cleanup(Box::new(|t: &dyn TestingT| {
            t.report_failure(&MockError::AssertCalled)
        }));
        assert!(!t.failed());
        assert_eq!(vec![MockError::AssertCalled], t.finish());
    }

    #[test]
    fn cleanups_run_once() {
        let runs = Arc::new(AtomicUsize::new(0));
        let t = TestHarness::new();
        let r = runs.clone();
        t.cleanup(Box::new(move |_: &dyn TestingT| {
            r.fetch_add(1, Ordering::Relaxed);
        }));
        let t2 = t.clone();
        assert!(t.finish().is_empty());
        drop(t2);
        assert_eq!(1, runs.load(Ordering::Relaxed));
    }

    #[test]
    #[should_panic(expected = "1 mock failure(s)")]
    fn drop_panics_with_failures() {
        let t = TestHarness::new();
        t.report_failure(&MockError::AssertNotCalled{calls: 2});
    }

    #[test]
    #[should_panic(expected = "no return value specified for Discover")]
    fn fail_now_records_and_panics() {
        let t = TestHarness::new();
        t.fail_now(&MockError::NoReturnValue);
    }
}
