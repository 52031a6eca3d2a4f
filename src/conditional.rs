//! `iff` / `iff_else` / `when` / `unless`: branching over the same context.
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::context::Context;
use crate::errors::Result;
use crate::logic::negate;
use crate::predicate::{BoxFuture, Condition};
use crate::service::Service;
use crate::step::{run_sequence, IntoSteps, Step};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Branch {
    True,
    False,
}

/// A predicate with the step lists to run when it holds and when it does not.
pub struct Conditional {
    condition: Condition,
    on_true: Vec<Step>,
    on_false: Vec<Step>,
}

impl Conditional {
    pub(crate) fn run<'a>(&'a self, ctx: Context, service: &'a dyn Service) -> BoxFuture<'a, Result<Context>> {
        Box::pin(async move {
            let branch = match self.condition.evaluate(&ctx, service).resolve().await {
                Ok(true) => Branch::True,
                Ok(false) => Branch::False,
                Err(err) => {
                    debug!(method = %ctx.method, error = %err, "predicate failed, no branch taken");
                    return Err(err);
                }
            };
            debug!(method = %ctx.method, ?branch, "branch selected");
            let steps = match branch {
                Branch::True => &self.on_true,
                Branch::False => &self.on_false,
            };
            run_sequence(steps, ctx, service).await
        })
    }
}

impl fmt::Debug for Conditional {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Conditional")
            .field("condition", &self.condition)
            .field("on_true", &self.on_true.len())
            .field("on_false", &self.on_false.len())
            .finish()
    }
}

/// A conditional whose else branch has not been attached yet.
///
/// Converting it into a [`Step`] (or calling [`Iff::otherwise`]) fixes the
/// tree; the else branch can only be set once, before the step exists.
#[derive(Debug)]
pub struct Iff {
    condition: Condition,
    on_true: Vec<Step>,
}

impl Iff {
    /// Fix the tree with an empty else branch.
    pub fn into_step(self) -> Step {
        self.otherwise(())
    }

    /// Run the conditional as is, without an else branch.
    pub async fn run(self, ctx: Context, service: &dyn Service) -> Result<Context> {
        self.into_step().run(ctx, service).await
    }

    pub fn otherwise(self, steps: impl IntoSteps) -> Step {
        Step::Conditional(Arc::new(Conditional {
            condition: self.condition,
            on_true: self.on_true,
            on_false: steps.into_steps(),
        }))
    }
}

impl From<Iff> for Step {
    fn from(iff: Iff) -> Self {
        iff.into_step()
    }
}

impl IntoSteps for Iff {
    fn into_steps(self) -> Vec<Step> {
        vec![self.into()]
    }
}

/// Run `on_true` when the condition holds, `on_false` otherwise.
pub fn iff_else(condition: impl Into<Condition>, on_true: impl IntoSteps, on_false: impl IntoSteps) -> Step {
    iff(condition, on_true).otherwise(on_false)
}

/// Run `steps` when the condition holds. Chain `.otherwise(..)` for an else branch.
pub fn iff(condition: impl Into<Condition>, steps: impl IntoSteps) -> Iff {
    Iff { condition: condition.into(), on_true: steps.into_steps() }
}

/// Alias for [`iff`].
pub fn when(condition: impl Into<Condition>, steps: impl IntoSteps) -> Iff {
    iff(condition, steps)
}

/// Run `steps` when the condition does not hold. Literals are flipped directly.
pub fn unless(condition: impl Into<Condition>, steps: impl IntoSteps) -> Iff {
    let negated = match condition.into() {
        Condition::Literal(value) => Condition::Literal(!value),
        Condition::Test(inner) => negate(inner),
    };
    iff(negated, steps)
}
