// vim: tw=80
//! The mock's log output can be routed to the test runner
#![deny(warnings)]

use discoverer::{Context, Discoverer, Graph};
use discoverer_mock::*;

#[test]
fn init_is_idempotent() {
    init_test_logging();
    init_test_logging();

    let t = TestHarness::new();
    let mut mock = MockDiscoverer::new(&t);
    mock.expect_discover()
        .once()
        .return_const(Graph::new());
    mock.discover(&Context::background()).unwrap();
}
