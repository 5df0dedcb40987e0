// vim: tw=80
//! The graph discovery interface of the liquidity manager.
//!
//! A [`Discoverer`] inspects the networks a liquidity manager operates on and
//! returns their topology as a [`Graph`].  Each call is scoped by a
//! [`Context`], which the discoverer should honour for cancellation and
//! deadlines.
//!
//! Test doubles for this interface live in the `discoverer_mock` crate.

mod context;
mod error;
mod graph;

pub use context::Context;
pub use error::DiscoverError;
pub use graph::{Graph, NetworkSelector};

/// Discovers the liquidity graph.
pub trait Discoverer: Send + Sync {
    /// Build the current liquidity graph.
    ///
    /// Implementations should stop early and return the context's
    /// [`err`](Context::err) once `ctx` is cancelled or expired.
    fn discover(&self, ctx: &Context) -> Result<Graph, DiscoverError>;
}

impl<D: Discoverer + ?Sized> Discoverer for Box<D> {
    fn discover(&self, ctx: &Context) -> Result<Graph, DiscoverError> {
        (**self).discover(ctx)
    }
}

impl<D: Discoverer + ?Sized> Discoverer for std::sync::Arc<D> {
    fn discover(&self, ctx: &Context) -> Result<Graph, DiscoverError> {
        (**self).discover(ctx)
    }
}
