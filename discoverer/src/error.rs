// vim: tw=80
use thiserror::Error;

/// Errors a [`Discoverer`](crate::Discoverer) may return from discovery.
///
/// The first two variants mirror the ways a [`Context`](crate::Context) can
/// end.  Everything else a discoverer can fail with is carried as a message.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DiscoverError {
    #[error("context cancelled")]
    Cancelled,

    #[error("context deadline exceeded")]
    DeadlineExceeded,

    #[error("{0}")]
    Other(String),
}

impl DiscoverError {
    pub fn other(msg: impl Into<String>) -> Self {
        DiscoverError::Other(msg.into())
    }
}
