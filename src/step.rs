//! Steps and the recursive interpreter that runs them.
use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::conditional::Conditional;
use crate::context::Context;
use crate::errors::Result;
use crate::predicate::{BoxFuture, Resolution};
use crate::service::Service;

/// A leaf unit of work: takes the context, hands back the (possibly changed) context.
pub trait Hook: Send + Sync {
    fn call<'a>(&'a self, ctx: Context, service: &'a dyn Service) -> Resolution<'a, Context>;
}

struct FnHook<F>(F);

impl<F> Hook for FnHook<F>
where
    F: Fn(Context, &dyn Service) -> Result<Context> + Send + Sync,
{
    fn call<'a>(&'a self, ctx: Context, service: &'a dyn Service) -> Resolution<'a, Context> {
        Resolution::Ready((self.0)(ctx, service))
    }
}

struct AsyncHook<F>(F);

impl<F> Hook for AsyncHook<F>
where
    F: for<'a> Fn(Context, &'a dyn Service) -> BoxFuture<'a, Result<Context>> + Send + Sync,
{
    fn call<'a>(&'a self, ctx: Context, service: &'a dyn Service) -> Resolution<'a, Context> {
        Resolution::Pending((self.0)(ctx, service))
    }
}

/// A node in a hook tree. Cloning is cheap; the tree itself is immutable.
#[derive(Clone)]
pub enum Step {
    Leaf(Arc<dyn Hook>),
    Sequence(Arc<[Step]>),
    Conditional(Arc<Conditional>),
}

impl Step {
    /// Run this step on `ctx` as `service`, yielding the context for the next step.
    pub fn run<'a>(&'a self, ctx: Context, service: &'a dyn Service) -> BoxFuture<'a, Result<Context>> {
        match self {
            Step::Leaf(hook) => hook.call(ctx, service).into_future(),
            Step::Sequence(steps) => run_sequence(steps, ctx, service),
            Step::Conditional(conditional) => conditional.run(ctx, service),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Step::Leaf(_) => "leaf",
            Step::Sequence(_) => "sequence",
            Step::Conditional(_) => "conditional",
        }
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Leaf(_) => f.write_str("Leaf(..)"),
            Step::Sequence(steps) => f.debug_tuple("Sequence").field(&steps.len()).finish(),
            Step::Conditional(c) => f.debug_tuple("Conditional").field(c).finish(),
        }
    }
}

/// Run `steps` strictly one after another. The first failure aborts the rest.
pub(crate) fn run_sequence<'a>(
    steps: &'a [Step],
    ctx: Context,
    service: &'a dyn Service,
) -> BoxFuture<'a, Result<Context>> {
    Box::pin(async move {
        let mut ctx = ctx;
        for (position, step) in steps.iter().enumerate() {
            trace!(position, kind = step.kind(), method = %ctx.method, "running step");
            ctx = match step.run(ctx, service).await {
                Ok(next) => next,
                Err(err) => {
                    debug!(position, kind = step.kind(), error = %err, "step failed, chain aborted");
                    return Err(err);
                }
            };
        }
        Ok(ctx)
    })
}

/// Anything that can stand in for an ordered list of steps.
pub trait IntoSteps {
    fn into_steps(self) -> Vec<Step>;
}

impl IntoSteps for Step {
    fn into_steps(self) -> Vec<Step> {
        vec![self]
    }
}

impl IntoSteps for Vec<Step> {
    fn into_steps(self) -> Vec<Step> {
        self
    }
}

impl<const N: usize> IntoSteps for [Step; N] {
    fn into_steps(self) -> Vec<Step> {
        Vec::from(self)
    }
}

impl<T: IntoSteps> IntoSteps for Option<T> {
    fn into_steps(self) -> Vec<Step> {
        self.map(IntoSteps::into_steps).unwrap_or_default()
    }
}

impl IntoSteps for () {
    fn into_steps(self) -> Vec<Step> {
        Vec::new()
    }
}

/// Build a `Vec<Step>` from anything convertible into a [`Step`].
#[macro_export]
macro_rules! steps {
    ($($step:expr),* $(,)?) => {
        ::std::vec![$($crate::Step::from($step)),*]
    };
}

pub fn hook<H: Hook + 'static>(hook: H) -> Step {
    Step::Leaf(Arc::new(hook))
}

/// Leaf step from a synchronous closure.
pub fn hook_fn<F>(f: F) -> Step
where
    F: Fn(Context, &dyn Service) -> Result<Context> + Send + Sync + 'static,
{
    hook(FnHook(f))
}

/// Leaf step from a closure returning a boxed future.
pub fn hook_async<F>(f: F) -> Step
where
    F: for<'a> Fn(Context, &'a dyn Service) -> BoxFuture<'a, Result<Context>> + Send + Sync + 'static,
{
    hook(AsyncHook(f))
}

/// Run several steps as one, in order. An empty list leaves the context untouched.
pub fn combine(steps: impl IntoSteps) -> Step {
    Step::Sequence(steps.into_steps().into())
}
