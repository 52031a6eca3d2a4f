//! Predicate combinators: negation and the `some`/`every` aggregates.
use std::sync::Arc;

use futures_util::future::try_join_all;

use crate::context::Context;
use crate::errors::{HookError, Result};
use crate::predicate::{Condition, Predicate, Resolution};
use crate::service::Service;

pub(crate) struct Not(pub(crate) Arc<dyn Predicate>);

impl Predicate for Not {
    fn test<'a>(&'a self, ctx: &'a Context, service: &'a dyn Service) -> Resolution<'a, bool> {
        self.0.test(ctx, service).map(|value| !value)
    }
}

pub(crate) fn negate(inner: Arc<dyn Predicate>) -> Condition {
    Condition::from_predicate(Not(inner))
}

/// Invert a predicate. A literal is a usage error: negate the boolean instead.
pub fn is_not(condition: impl Into<Condition>) -> Result<Condition> {
    match condition.into() {
        Condition::Literal(_) => Err(HookError::usage("expected a predicate function (is_not)")),
        Condition::Test(inner) => Ok(negate(inner)),
    }
}

#[derive(Debug, Clone, Copy)]
enum Mode {
    Some,
    Every,
}

impl Mode {
    fn reduce(self, values: &[bool]) -> bool {
        match self {
            Mode::Some => values.iter().any(|v| *v),
            Mode::Every => values.iter().all(|v| *v),
        }
    }
}

struct Aggregate {
    mode: Mode,
    conditions: Vec<Condition>,
}

impl Predicate for Aggregate {
    fn test<'a>(&'a self, ctx: &'a Context, service: &'a dyn Service) -> Resolution<'a, bool> {
        let mut settled = Vec::with_capacity(self.conditions.len());
        let mut pending = Vec::new();
        for condition in &self.conditions {
            match condition.evaluate(ctx, service) {
                Resolution::Ready(Ok(value)) => settled.push(value),
                Resolution::Ready(Err(err)) => return Resolution::Ready(Err(err)),
                Resolution::Pending(fut) => pending.push(fut),
            }
        }
        let mode = self.mode;
        if pending.is_empty() {
            return Resolution::ready(mode.reduce(&settled));
        }
        // try_join_all polls every evaluation together; the first error drops the rest.
        Resolution::pending(async move {
            settled.extend(try_join_all(pending).await?);
            Ok(mode.reduce(&settled))
        })
    }
}

/// True when at least one condition holds. `some([])` is false.
pub fn some(conditions: impl IntoIterator<Item = Condition>) -> Condition {
    Condition::from_predicate(Aggregate { mode: Mode::Some, conditions: conditions.into_iter().collect() })
}

/// True when every condition holds. `every([])` is true.
pub fn every(conditions: impl IntoIterator<Item = Condition>) -> Condition {
    Condition::from_predicate(Aggregate { mode: Mode::Every, conditions: conditions.into_iter().collect() })
}
