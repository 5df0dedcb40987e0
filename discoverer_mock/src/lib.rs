// vim: tw=80
//! A mock [`Discoverer`](discoverer::Discoverer) for unit tests.
//!
//! [`MockDiscoverer`] stands in for a real liquidity graph discoverer.  Tests
//! program it with expectations, hand it to the code under test, and have it
//! verified when the test ends.
//!
//! # Getting Started
//! ```
//! use discoverer::{Context, Discoverer, Graph};
//! use discoverer_mock::{MockDiscoverer, TestHarness};
//!
//! let t = TestHarness::new();
//! let mut mock = MockDiscoverer::new(&t);
//! let graph: Graph = [(1, 2), (2, 1)].into_iter().collect();
//! mock.expect_discover()
//!     .once()
//!     .return_const(graph.clone());
//!
//! assert_eq!(Ok(graph), mock.discover(&Context::background()));
//! ```
//!
//! ## Return values
//!
//! Every expectation needs a return value.  Calling one without it stops the
//! test with [`MockError::NoReturnValue`].  There are three ways to set one:
//!
//! * [`return_const`] and [`return_error`] set a fixed graph and a fixed error.
//!   Either may be left out: the graph defaults to the empty graph, the error
//!   to none.  When an error is set, it is what `discover` returns.
//! * [`returning_graph`] and [`returning_error`] compute the graph or the error
//!   from the call's [`Context`](discoverer::Context), independently of each
//!   other.
//! * [`returning`] and [`return_once`] compute the whole `Result`.
//!
//! ```
//! # use discoverer::{Context, DiscoverError, Discoverer, Graph};
//! # use discoverer_mock::MockDiscoverer;
//! let mut mock = MockDiscoverer::default();
//! mock.expect_discover()
//!     .returning(|ctx| match ctx.err() {
//!         Some(e) => Err(e),
//!         None => Ok(Graph::new())
//!     });
//!
//! let ctx = Context::background();
//! assert_eq!(Ok(Graph::new()), mock.discover(&ctx));
//! ctx.cancel();
//! assert_eq!(Err(DiscoverError::Cancelled), mock.discover(&ctx));
//! ```
//!
//! ## Matching arguments
//!
//! By default an expectation matches any context.  [`with`] and [`withf`]
//! restrict it.  Expectations are tried in registration order, and one that
//! has received all its calls gives way to the next.  A call that matches no
//! expectation stops the test with [`MockError::UnexpectedCall`].
//!
//! ## Call counts
//!
//! An expectation must be called at least once unless configured otherwise
//! with [`once`], [`times`], [`times_range`], [`times_any`] or [`never`].
//! Calling it too often stops the test immediately; calling it too few times
//! is reported when the test finishes.
//!
//! ## Verification
//!
//! A mock made with [`MockDiscoverer::new`] registers a cleanup on its test
//! that calls [`assert_expectations`].  A mock made with
//! [`MockDiscoverer::default`] verifies itself when dropped.  The ledger of
//! calls is available from [`calls`], along with assertions such as
//! [`assert_number_of_calls`].
//!
//! [`return_const`]: Expectation::return_const
//! [`return_error`]: Expectation::return_error
//! [`returning_graph`]: Expectation::returning_graph
//! [`returning_error`]: Expectation::returning_error
//! [`returning`]: Expectation::returning
//! [`return_once`]: Expectation::return_once
//! [`with`]: Expectation::with
//! [`withf`]: Expectation::withf
//! [`once`]: Expectation::once
//! [`times`]: Expectation::times
//! [`times_range`]: Expectation::times_range
//! [`times_any`]: Expectation::times_any
//! [`never`]: Expectation::never
//! [`assert_expectations`]: MockDiscoverer::assert_expectations
//! [`calls`]: MockDiscoverer::calls
//! [`assert_number_of_calls`]: MockDiscoverer::assert_number_of_calls

mod error;
mod expectation;
mod logging;
mod mock;
mod sequence;
mod testing;

pub use error::MockError;
pub use expectation::Expectation;
pub use logging::init_test_logging;
pub use mock::{Call, DISCOVER, ExpectationGuard, MockDiscoverer, Phase};
pub use predicates::prelude::{Predicate, predicate};
pub use sequence::Sequence;
pub use testing::{Cleanup, TestHarness, TestingT};
