// vim: tw=80
//! Selecting an expectation by its context
#![deny(warnings)]

use discoverer::{Context, DiscoverError, Discoverer, Graph};
use discoverer_mock::*;
use pretty_assertions::assert_eq;

fn single(n: u64) -> Graph {
    let mut g = Graph::new();
    g.add_network(n);
    g
}

#[test]
fn with_eq() {
    let ctx = Context::background();
    let other = Context::background();
    let mut mock = MockDiscoverer::default();
    mock.expect_discover()
        .with(predicate::eq(ctx.clone()))
        .return_const(single(1));
    mock.expect_discover()
        .return_const(single(2));
    assert_eq!(Ok(single(1)), mock.discover(&ctx));
    assert_eq!(Ok(single(2)), mock.discover(&other));
}

#[test]
fn withf() {
    let mut mock = MockDiscoverer::default();
    mock.expect_discover()
        .withf(|ctx| ctx.is_cancelled())
        .return_error(DiscoverError::Cancelled);
    mock.expect_discover()
        .withf(|ctx| !ctx.is_cancelled())
        .return_const(single(1));
    let ctx = Context::background();
    assert_eq!(Ok(single(1)), mock.discover(&ctx));
    ctx.cancel();
    assert_eq!(Err(DiscoverError::Cancelled), mock.discover(&ctx));
}

/// Expectations are tried in the order they were registered
#[test]
fn fifo() {
    let mut mock = MockDiscoverer::default();
    mock.expect_discover()
        .times_any()
        .return_const(single(1));
    mock.expect_discover()
        .times_any()
        .return_const(single(2));
    let ctx = Context::background();
    for _ in 0..3 {
        assert_eq!(Ok(single(1)), mock.discover(&ctx));
    }
}

/// Once an expectation has all its calls, the next one takes over
#[test]
fn exhausted_gives_way() {
    let mut mock = MockDiscoverer::default();
    mock.expect_discover()
        .once()
        .return_const(single(1));
    mock.expect_discover()
        .twice()
        .return_const(single(2));
    let ctx = Context::background();
    assert_eq!(Ok(single(1)), mock.discover(&ctx));
    assert_eq!(Ok(single(2)), mock.discover(&ctx));
    assert_eq!(Ok(single(2)), mock.discover(&ctx));
    assert_eq!(vec![Some(0), Some(1), Some(1)],
               mock.calls().iter().map(|c| c.expectation).collect::<Vec<_>>());
}

#[test]
fn child_context_does_not_match_parent() {
    let parent = Context::background();
    let mut mock = MockDiscoverer::default();
    mock.expect_discover()
        .with(predicate::eq(parent.clone()))
        .times_any()
        .return_const(single(1));
    assert!(matches!(mock.try_discover(&parent.child()),
                     Err(MockError::UnexpectedCall{..})));
}
