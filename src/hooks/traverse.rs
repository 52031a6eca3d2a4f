//! Visit every node of a JSON tree and rewrite values in place.
use std::sync::Arc;

use serde_json::Value;

use crate::context::Context;
use crate::items::items_mut;
use crate::predicate::Resolution;
use crate::service::Service;
use crate::step::{hook, Hook, Step};

type Converter = Arc<dyn Fn(&mut Value) + Send + Sync>;
type Selector = Arc<dyn for<'c> Fn(&'c mut Context) -> Option<&'c mut Value> + Send + Sync>;

/// Which part of the context to walk.
#[derive(Clone)]
pub enum Target {
    /// `data` or `result`, see [`crate::items::get_items`].
    Items,
    /// Every value of `params.query`.
    Query,
    Select(Selector),
}

impl Target {
    pub fn select<F>(f: F) -> Self
    where
        F: for<'c> Fn(&'c mut Context) -> Option<&'c mut Value> + Send + Sync + 'static,
    {
        Target::Select(Arc::new(f))
    }
}

struct Traverse {
    converter: Converter,
    target: Target,
}

/// Pre-order walk; children of a replaced node are the replacement's children.
fn walk(node: &mut Value, converter: &dyn Fn(&mut Value)) {
    converter(node);
    match node {
        Value::Array(list) => list.iter_mut().for_each(|child| walk(child, converter)),
        Value::Object(map) => map.values_mut().for_each(|child| walk(child, converter)),
        _ => {}
    }
}

impl Hook for Traverse {
    fn call<'a>(&'a self, mut ctx: Context, _service: &'a dyn Service) -> Resolution<'a, Context> {
        let converter = &*self.converter;
        match &self.target {
            Target::Items => items_mut(&mut ctx).into_iter().for_each(|item| walk(item, converter)),
            Target::Query => ctx.params.query.values_mut().for_each(|v| walk(v, converter)),
            Target::Select(select) => match select(&mut ctx) {
                Some(Value::Array(list)) => list.iter_mut().for_each(|item| walk(item, converter)),
                Some(root) => walk(root, converter),
                None => {}
            },
        }
        Resolution::ready(ctx)
    }
}

/// Walk the context's items with `converter`.
pub fn traverse<F>(converter: F) -> Step
where
    F: Fn(&mut Value) + Send + Sync + 'static,
{
    traverse_with(converter, Target::Items)
}

pub fn traverse_with<F>(converter: F, target: Target) -> Step
where
    F: Fn(&mut Value) + Send + Sync + 'static,
{
    hook(Traverse { converter: Arc::new(converter), target })
}
