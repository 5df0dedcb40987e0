// vim: tw=80
//! A mock may be shared with code that calls it from other threads
#![deny(warnings)]

use std::{sync::Arc, thread};

use discoverer::{Context, Discoverer, Graph};
use discoverer_mock::*;
use pretty_assertions::assert_eq;
use static_assertions::assert_impl_all;

assert_impl_all!(MockDiscoverer: Send, Sync, Discoverer);
assert_impl_all!(TestHarness: Send, Sync, Clone, TestingT);
assert_impl_all!(MockError: Send, Sync, std::error::Error);
assert_impl_all!(Call: Send, Sync);

/// Code under test usually holds its discoverer as a trait object
struct Rebalancer {
    discoverer: Arc<dyn Discoverer>,
}

impl Rebalancer {
    fn networks(&self, ctx: &Context) -> usize {
        self.discoverer.discover(ctx).map(|g| g.len()).unwrap_or(0)
    }
}

#[test]
fn as_trait_object() {
    let t = TestHarness::new();
    let mut mock = MockDiscoverer::new(&t);
    mock.expect_discover()
        .once()
        .return_const([(1, 2), (2, 3)].into_iter().collect());
    let r = Rebalancer{discoverer: Arc::new(mock)};
    assert_eq!(3, r.networks(&Context::background()));
}

/// Every call from every thread is recorded
#[test]
fn concurrent_calls() {
    const THREADS: usize = 8;
    const CALLS: usize = 25;

    let t = TestHarness::new();
    let mut mock = MockDiscoverer::new(&t);
    mock.expect_discover()
        .times(THREADS * CALLS)
        .return_const(Graph::new());
    let mock = Arc::new(mock);

    let handles = (0..THREADS).map(|_| {
        let mock = mock.clone();
        thread::spawn(move || {
            let ctx = Context::background();
            for _ in 0..CALLS {
                mock.discover(&ctx).unwrap();
            }
        })
    }).collect::<Vec<_>>();
    for h in handles {
        h.join().unwrap();
    }

    assert!(mock.assert_number_of_calls(THREADS * CALLS));
    assert_eq!(THREADS * CALLS, mock.calls().len());
}

#[test]
fn unmet_in_subthread() {
    let t = TestHarness::new();
    let mut mock = MockDiscoverer::new(&t);
    mock.expect_discover()
        .times(2)
        .return_const(Graph::new());
    let mock = Arc::new(mock);
    let m = mock.clone();
    thread::spawn(move || {
        m.discover(&Context::background()).unwrap();
    }).join().unwrap();
    drop(mock);
    assert_eq!(vec![MockError::Unsatisfied{index: 0, calls: 1, min: 2}],
               t.finish());
}

/// A panic inside a response function must not wedge the mock for later
/// assertions.
#[test]
fn survives_poisoning() {
    let t = TestHarness::new();
    let mut mock = MockDiscoverer::new(&t);
    mock.expect_discover()
        .once()
        .returning(|_| panic!("response failed"));
    let r = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        mock.discover(&Context::background())
    }));
    assert!(r.is_err());
    let calls = mock.calls();
    assert_eq!(1, calls.len());
    assert_eq!(None, calls[0].expectation);
    // A panicking response produced nothing, so the call doesn't count
    drop(mock);
    assert_eq!(vec![MockError::Unsatisfied{index: 0, calls: 0, min: 1}],
               t.finish());
}
