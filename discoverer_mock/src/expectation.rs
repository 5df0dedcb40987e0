// vim: tw=80
//! Expectations registered on a [`MockDiscoverer`](crate::MockDiscoverer).

use std::{fmt::Write, mem, ops::Range};

use discoverer::{Context, DiscoverError, Graph};
use fragile::Fragile;
use predicates::prelude::{Predicate, predicate};
use predicates_tree::CaseTreeExt;

use crate::{
    MockError,
    sequence::{SeqHandle, Sequence}
};

/// What `discover` returns
pub(crate) type Output = Result<Graph, DiscoverError>;

/// How many times an expectation may be called.  `range` is half-open.
#[derive(Debug)]
pub(crate) struct Times {
    count: usize,
    range: Range<usize>
}

impl Times {
    /// Fail if one more call would exceed the allowed range.
    fn check(&self, index: usize) -> Result<(), MockError> {
        if self.count + 1 >= self.range.end {
            let max = self.range.end.saturating_sub(1);
            Err(MockError::TooManyCalls{index, max})
        } else {
            Ok(())
        }
    }

    fn record(&mut self) {
        self.count += 1;
    }

    fn any(&mut self) {
        self.range = 0..usize::MAX;
    }

    pub(crate) fn count(&self) -> usize {
        self.count
    }

    /// Has this expectation already been called the maximum allowed number of
    /// times?
    fn is_done(&self) -> bool {
        self.count >= self.range.end.saturating_sub(1)
    }

    fn is_exact(&self) -> bool {
        self.range.len() == 1
    }

    /// Has this expectation already been called the minimum required number of
    /// times?
    pub(crate) fn is_satisfied(&self) -> bool {
        self.count >= self.range.start
    }

    pub(crate) fn min(&self) -> usize {
        self.range.start
    }

    #[allow(clippy::range_plus_one)]
    fn n(&mut self, n: usize) {
        self.range = n..(n + 1);
    }

    fn range(&mut self, range: Range<usize>) {
        self.range = range;
    }
}

impl Default for Times {
    fn default() -> Self {
        // Any number of calls, but at least one
        Times{count: 0, range: 1..usize::MAX}
    }
}

struct Matcher(Box<dyn Predicate<Context> + Send>);

impl Matcher {
    fn matches(&self, ctx: &Context) -> bool {
        self.0.eval(ctx)
    }

    fn new<P: Predicate<Context> + Send + 'static>(p: P) -> Self {
        Matcher(Box::new(p))
    }

    /// Explain why `ctx` doesn't match, if it doesn't
    fn mismatch(&self, ctx: &Context) -> Option<String> {
        self.0.find_case(false, ctx)
            .map(|case| case.tree().to_string())
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Matcher::new(predicates::constant::always())
    }
}

enum GraphResponse {
    /// Nothing configured: the empty graph
    Zero,
    Const(Graph),
    Func(Box<dyn FnMut(&Context) -> Graph + Send>),
}

impl GraphResponse {
    fn resolve(&mut self, ctx: &Context) -> Graph {
        match self {
            GraphResponse::Zero => Graph::default(),
            GraphResponse::Const(g) => g.clone(),
            GraphResponse::Func(f) => f(ctx),
        }
    }
}

enum ErrorResponse {
    Nil,
    Const(DiscoverError),
    Func(Box<dyn FnMut(&Context) -> Option<DiscoverError> + Send>),
}

impl ErrorResponse {
    fn resolve(&mut self, ctx: &Context) -> Option<DiscoverError> {
        match self {
            ErrorResponse::Nil => None,
            ErrorResponse::Const(e) => Some(e.clone()),
            ErrorResponse::Func(f) => f(ctx),
        }
    }
}

/// Return strategies for an expectation
enum Response {
    Unset,
    /// Computes the whole result from the context
    Pair(Box<dyn FnMut(&Context) -> Output + Send>),
    Once(Box<dyn FnOnce(&Context) -> Output + Send>),
    // Indicates that a `return_once` expectation has already returned
    Expired,
    /// Graph and error are configured independently
    Parts {
        graph: GraphResponse,
        error: ErrorResponse,
    },
}

impl Response {
    fn call_mut(&mut self, index: usize, ctx: &Context)
        -> Result<Output, MockError>
    {
        match self {
            Response::Unset => Err(MockError::NoReturnValue),
            Response::Expired => Err(MockError::Expired{index}),
            Response::Pair(f) => Ok(f(ctx)),
            Response::Once(_) => {
                match mem::replace(self, Response::Expired) {
                    Response::Once(f) => Ok(f(ctx)),
                    _ => unreachable!()
                }
            },
            Response::Parts{graph, error} => {
                let graph = graph.resolve(ctx);
                Ok(match error.resolve(ctx) {
                    Some(e) => Err(e),
                    None => Ok(graph)
                })
            }
        }
    }

    /// Switch to the `Parts` strategy, keeping any parts already configured.
    fn parts_mut(&mut self) -> (&mut GraphResponse, &mut ErrorResponse) {
        if !matches!(self, Response::Parts{..}) {
            *self = Response::Parts {
                graph: GraphResponse::Zero,
                error: ErrorResponse::Nil
            };
        }
        match self {
            Response::Parts{graph, error} => (graph, error),
            _ => unreachable!()
        }
    }
}

/// A single expected call to `discover`.
///
/// Created by [`MockDiscoverer::expect_discover`].  Every setter returns
/// `&mut Self` so they can be chained.  Unless told otherwise an expectation
/// must be called at least once.
///
/// [`MockDiscoverer::expect_discover`]: crate::MockDiscoverer::expect_discover
pub struct Expectation {
    matcher: Matcher,
    times: Times,
    seq_handle: Option<SeqHandle>,
    response: Response,
}

impl Expectation {
    pub(crate) fn new() -> Self {
        Expectation {
            matcher: Matcher::default(),
            times: Times::default(),
            seq_handle: None,
            response: Response::Unset,
        }
    }

    /// Simulate calling the real method for this expectation.
    ///
    /// Only a call that produces a result counts toward `times`; a rejected
    /// call leaves the expectation as it was.
    pub(crate) fn call(&mut self, index: usize, ctx: &Context)
        -> Result<Output, MockError>
    {
        self.times.check(index)?;
        if let Some(handle) = &self.seq_handle {
            handle.verify(index)?;
        }
        let output = self.response.call_mut(index, ctx)?;
        self.times.record();
        if self.times.is_satisfied() {
            if let Some(handle) = &self.seq_handle {
                handle.satisfy(index)?;
            }
        }
        Ok(output)
    }

    pub(crate) fn is_done(&self) -> bool {
        self.times.is_done()
    }

    pub(crate) fn matches(&self, ctx: &Context) -> bool {
        self.matcher.matches(ctx)
    }

    /// Append the reason this expectation rejected `ctx` to `out`
    pub(crate) fn describe_mismatch(&self, index: usize, ctx: &Context,
                                    out: &mut String)
    {
        if let Some(tree) = self.matcher.mismatch(ctx) {
            let _ = write!(out, "\nExpectation #{index} didn't match:\n{tree}");
        }
    }

    pub(crate) fn times_ref(&self) -> &Times {
        &self.times
    }

    /// Add this expectation to a [`Sequence`].
    ///
    /// # Panics
    ///
    /// If the expectation does not require an exact number of calls.  Set
    /// that first with [`once`](Self::once) or [`times`](Self::times).
    pub fn in_sequence(&mut self, seq: &mut Sequence) -> &mut Self {
        assert!(self.times.is_exact(),
            "Only Expectations with an exact call count have sequences");
        self.seq_handle = Some(seq.next_handle());
        self
    }

    /// Forbid this expectation from ever being called
    pub fn never(&mut self) -> &mut Self {
        self.times.n(0);
        self
    }

    /// Expect this expectation to be called exactly once.  Shortcut for
    /// [`times(1)`](Self::times).
    pub fn once(&mut self) -> &mut Self {
        self.times(1)
    }

    /// Expect exactly two calls
    pub fn twice(&mut self) -> &mut Self {
        self.times(2)
    }

    /// Require this expectation to be called exactly `n` times.
    pub fn times(&mut self, n: usize) -> &mut Self {
        self.times.n(n);
        self
    }

    /// Allow this expectation to be called any number of times, including
    /// zero.
    pub fn times_any(&mut self) -> &mut Self {
        self.times.any();
        self
    }

    /// Allow this expectation to be called any number of times within a
    /// given half-open range
    pub fn times_range(&mut self, range: Range<usize>) -> &mut Self {
        self.times.range(range);
        self
    }

    /// Only match calls whose context satisfies `p`.
    ///
    /// Without a matcher every call matches.
    pub fn with<P>(&mut self, p: P) -> &mut Self
        where P: Predicate<Context> + Send + 'static
    {
        self.matcher = Matcher::new(p);
        self
    }

    /// Like [`with`](Self::with), but with a plain function.
    pub fn withf<F>(&mut self, f: F) -> &mut Self
        where F: Fn(&Context) -> bool + Send + 'static
    {
        self.matcher = Matcher::new(predicate::function(f));
        self
    }

    /// Return a clone of `graph`.  Any error set with
    /// [`return_error`](Self::return_error) or
    /// [`returning_error`](Self::returning_error) is kept, and while one is
    /// produced the call returns that error and the graph is not observable.
    pub fn return_const(&mut self, graph: Graph) -> &mut Self {
        *self.response.parts_mut().0 = GraphResponse::Const(graph);
        self
    }

    /// Fail with a clone of `err`.  The graph side is still resolved, so a
    /// graph function set with [`returning_graph`](Self::returning_graph)
    /// keeps being called.
    pub fn return_error(&mut self, err: DiscoverError) -> &mut Self {
        *self.response.parts_mut().1 = ErrorResponse::Const(err);
        self
    }

    /// Compute the graph from the context.  The error side is configured
    /// separately and defaults to none.
    pub fn returning_graph<F>(&mut self, f: F) -> &mut Self
        where F: FnMut(&Context) -> Graph + Send + 'static
    {
        *self.response.parts_mut().0 = GraphResponse::Func(Box::new(f));
        self
    }

    /// Compute the error from the context.  `None` means success.
    pub fn returning_error<F>(&mut self, f: F) -> &mut Self
        where F: FnMut(&Context) -> Option<DiscoverError> + Send + 'static
    {
        *self.response.parts_mut().1 = ErrorResponse::Func(Box::new(f));
        self
    }

    /// Compute the whole result from the context.  Replaces any graph or error
    /// configured before.
    pub fn returning<F>(&mut self, f: F) -> &mut Self
        where F: FnMut(&Context) -> Result<Graph, DiscoverError>
                 + Send + 'static
    {
        self.response = Response::Pair(Box::new(f));
        self
    }

    /// Like [`returning`](Self::returning) but for an `FnOnce`.  Calling the
    /// expectation a second time is an error.
    pub fn return_once<F>(&mut self, f: F) -> &mut Self
        where F: FnOnce(&Context) -> Result<Graph, DiscoverError>
                 + Send + 'static
    {
        self.response = Response::Once(Box::new(f));
        self
    }

    /// Single-threaded version of [`returning`](Self::returning), for closures
    /// that aren't `Send`.
    ///
    /// It is a runtime error to call the mock from a different thread than the
    /// one that registered the closure.
    pub fn returning_st<F>(&mut self, f: F) -> &mut Self
        where F: FnMut(&Context) -> Result<Graph, DiscoverError> + 'static
    {
        let mut fragile = Fragile::new(f);
        let fmut = move |ctx: &Context| (fragile.get_mut())(ctx);
        self.response = Response::Pair(Box::new(fmut));
        self
    }
}

#[cfg(test)]
mod t {
    use super::*;
    use pretty_assertions::assert_eq;

    mod times {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn default_requires_one_call() {
            let mut times = Times::default();
            assert!(!times.is_satisfied());
            assert!(!times.is_done());
            times.check(0).unwrap();
            times.record();
            times.record();
            assert!(times.is_satisfied());
            assert!(!times.is_done());
            assert_eq!(2, times.count());
        }

        #[test]
        fn exact() {
            let mut times = Times::default();
            times.n(2);
            assert!(times.is_exact());
            times.check(3).unwrap();
            times.record();
            assert!(!times.is_satisfied());
            times.check(3).unwrap();
            times.record();
            assert!(times.is_satisfied());
            assert!(times.is_done());
            assert_eq!(Err(MockError::TooManyCalls{index: 3, max: 2}),
                       times.check(3));
            assert_eq!(2, times.count());
        }

        #[test]
        fn never() {
            let mut times = Times::default();
            times.n(0);
            assert!(times.is_satisfied());
            assert!(times.is_done());
            assert_eq!(Err(MockError::TooManyCalls{index: 0, max: 0}),
                       times.check(0));
        }

        #[test]
        fn any() {
            let mut times = Times::default();
            times.any();
            assert!(times.is_satisfied());
            assert!(!times.is_exact());
        }

        #[test]
        fn empty_range() {
            let mut times = Times::default();
            times.range(0..0);
            assert!(times.is_done());
            assert!(!times.is_exact());
            assert!(times.check(0).is_err());
        }
    }

    mod response {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn unset() {
            let mut r = Response::Unset;
            let ctx = Context::background();
            assert_eq!(Err(MockError::NoReturnValue), r.call_mut(0, &ctx));
        }

        #[test]
        fn parts_keep_each_other() {
            let mut g = Graph::new();
            g.add_network(1);
            let mut r = Response::Unset;
            *r.parts_mut().0 = GraphResponse::Const(g.clone());
            let ctx = Context::background();
            assert_eq!(Ok(Ok(g)), r.call_mut(0, &ctx));
            *r.parts_mut().1 = ErrorResponse::Const(DiscoverError::Cancelled);
            assert_eq!(Ok(Err(DiscoverError::Cancelled)), r.call_mut(0, &ctx));
        }

        #[test]
        fn once_expires() {
            let f = |_: &Context| -> Output { Ok(Graph::new()) };
            let mut r = Response::Once(Box::new(f));
            let ctx = Context::background();
            assert_eq!(Ok(Ok(Graph::new())), r.call_mut(4, &ctx));
            assert_eq!(Err(MockError::Expired{index: 4}), r.call_mut(4, &ctx));
        }
    }

    #[test]
    fn default_matcher_matches_anything() {
        let m = Matcher::default();
        let ctx = Context::background();
        assert!(m.matches(&ctx));
        assert_eq!(None, m.mismatch(&ctx));
    }

    #[test]
    fn matcher_explains_mismatch() {
        let p = predicate::function(|c: &Context| c.is_cancelled());
        let m = Matcher::new(p);
        let ctx = Context::background();
        assert!(!m.matches(&ctx));
        assert!(m.mismatch(&ctx).is_some());
    }
}
