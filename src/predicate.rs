//! Predicate inputs and the single sync-or-async boundary every combinator goes through.
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::context::Context;
use crate::errors::Result;
use crate::service::Service;

pub type BoxFuture<'a, T> = futures_util::future::BoxFuture<'a, T>;

/// A value that is either already known or still being computed.
///
/// Hooks and predicates return this so that synchronous work costs no
/// allocation, while callers can always `resolve().await` it uniformly.
pub enum Resolution<'a, T> {
    Ready(Result<T>),
    Pending(BoxFuture<'a, Result<T>>),
}

impl<'a, T: Send + 'a> Resolution<'a, T> {
    pub fn ready(value: T) -> Self {
        Resolution::Ready(Ok(value))
    }

    pub fn pending<F>(fut: F) -> Self
    where
        F: Future<Output = Result<T>> + Send + 'a,
    {
        Resolution::Pending(Box::pin(fut))
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Resolution::Ready(_))
    }

    pub async fn resolve(self) -> Result<T> {
        match self {
            Resolution::Ready(r) => r,
            Resolution::Pending(fut) => fut.await,
        }
    }

    /// Transform the eventual value, staying synchronous if `self` already is.
    pub fn map<U, F>(self, f: F) -> Resolution<'a, U>
    where
        U: Send + 'a,
        F: FnOnce(T) -> U + Send + 'a,
    {
        match self {
            Resolution::Ready(r) => Resolution::Ready(r.map(f)),
            Resolution::Pending(fut) => Resolution::pending(async move { fut.await.map(f) }),
        }
    }

    pub fn into_future(self) -> BoxFuture<'a, Result<T>> {
        match self {
            Resolution::Ready(r) => Box::pin(futures_util::future::ready(r)),
            Resolution::Pending(fut) => fut,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Resolution<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Ready(r) => f.debug_tuple("Ready").field(r).finish(),
            Resolution::Pending(_) => f.write_str("Pending"),
        }
    }
}

/// A test over a context, evaluated against the receiver the chain runs as.
pub trait Predicate: Send + Sync {
    fn test<'a>(&'a self, ctx: &'a Context, service: &'a dyn Service) -> Resolution<'a, bool>;
}

struct FnPredicate<F>(F);

impl<F> Predicate for FnPredicate<F>
where
    F: Fn(&Context, &dyn Service) -> Result<bool> + Send + Sync,
{
    fn test<'a>(&'a self, ctx: &'a Context, service: &'a dyn Service) -> Resolution<'a, bool> {
        Resolution::Ready((self.0)(ctx, service))
    }
}

struct AsyncPredicate<F>(F);

impl<F> Predicate for AsyncPredicate<F>
where
    F: for<'a> Fn(&'a Context, &'a dyn Service) -> BoxFuture<'a, Result<bool>> + Send + Sync,
{
    fn test<'a>(&'a self, ctx: &'a Context, service: &'a dyn Service) -> Resolution<'a, bool> {
        Resolution::Pending((self.0)(ctx, service))
    }
}

/// What a conditional branches on: a fixed value or a predicate.
#[derive(Clone)]
pub enum Condition {
    Literal(bool),
    Test(Arc<dyn Predicate>),
}

impl Condition {
    pub fn from_predicate<P: Predicate + 'static>(predicate: P) -> Self {
        Condition::Test(Arc::new(predicate))
    }

    pub fn evaluate<'a>(&'a self, ctx: &'a Context, service: &'a dyn Service) -> Resolution<'a, bool> {
        match self {
            Condition::Literal(value) => Resolution::ready(*value),
            Condition::Test(predicate) => predicate.test(ctx, service),
        }
    }
}

impl From<bool> for Condition {
    fn from(value: bool) -> Self {
        Condition::Literal(value)
    }
}

impl From<Arc<dyn Predicate>> for Condition {
    fn from(predicate: Arc<dyn Predicate>) -> Self {
        Condition::Test(predicate)
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Condition::Test(_) => f.write_str("Test(..)"),
        }
    }
}

/// Synchronous predicate from a closure.
pub fn predicate_fn<F>(f: F) -> Condition
where
    F: Fn(&Context, &dyn Service) -> Result<bool> + Send + Sync + 'static,
{
    Condition::from_predicate(FnPredicate(f))
}

/// Asynchronous predicate from a closure returning a boxed future.
pub fn predicate_async<F>(f: F) -> Condition
where
    F: for<'a> Fn(&'a Context, &'a dyn Service) -> BoxFuture<'a, Result<bool>> + Send + Sync + 'static,
{
    Condition::from_predicate(AsyncPredicate(f))
}
