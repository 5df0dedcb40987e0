// vim: tw=80
use thiserror::Error;

/// Failures of the mock itself, as opposed to the
/// [`DiscoverError`](discoverer::DiscoverError) a test configures it to
/// return.
///
/// Expectations are identified by the order they were registered in, starting
/// from 0.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MockError {
    #[error("MockDiscoverer::discover: no return value specified for Discover")]
    NoReturnValue,

    #[error("MockDiscoverer::discover: No matching expectation found{detail}")]
    UnexpectedCall {
        /// Why the registered matchers rejected the call, if there were any
        detail: String
    },

    #[error("MockDiscoverer::discover: Expectation #{index} called more than {max} time(s)")]
    TooManyCalls { index: usize, max: usize },

    #[error("MockDiscoverer::discover: Expectation #{index} called twice, but it was expected only once")]
    Expired { index: usize },

    #[error("MockDiscoverer::discover: Method sequence violation by Expectation #{index}")]
    SequenceViolation { index: usize },

    #[error("MockDiscoverer::discover: called after the mock was verified")]
    Verified,

    #[error("MockDiscoverer::discover: Expectation #{index} called {calls} time(s) which is fewer than expected {min}")]
    Unsatisfied { index: usize, calls: usize, min: usize },

    #[error("MockDiscoverer::discover: expected to be called, but no matching call was made")]
    AssertCalled,

    #[error("MockDiscoverer::discover: expected no calls, but it was called {calls} time(s)")]
    AssertNotCalled { calls: usize },

    #[error("MockDiscoverer::discover: expected {expected} call(s), but it was called {actual} time(s)")]
    AssertNumberOfCalls { expected: usize, actual: usize },
}

impl MockError {
    /// Fatal errors abort the test immediately.  The rest are reported and the
    /// test keeps running until teardown.
    pub fn is_fatal(&self) -> bool {
        !matches!(self,
            MockError::Unsatisfied{..} |
            MockError::AssertCalled |
            MockError::AssertNotCalled{..} |
            MockError::AssertNumberOfCalls{..})
    }
}
