//! Locating the records a hook operates on inside a [`Context`].
use crate::context::{Context, Method, Stage};
use crate::errors::{HookError, Result};
use serde_json::Value;

/// Before hooks (and anything without a result yet) see `data`; after hooks see `result`.
/// A paginated `find` result `{"data": [...]}` yields the inner list.
pub fn get_items(ctx: &Context) -> Option<&Value> {
    if reads_data(ctx) {
        return ctx.data.as_ref();
    }
    let result = ctx.result.as_ref()?;
    match (ctx.method, result) {
        (Method::Find, Value::Object(page)) if page.get("data").is_some_and(Value::is_array) => page.get("data"),
        _ => Some(result),
    }
}

pub fn get_items_mut(ctx: &mut Context) -> Option<&mut Value> {
    if reads_data(ctx) {
        return ctx.data.as_mut();
    }
    let method = ctx.method;
    let result = ctx.result.as_mut()?;
    if method == Method::Find && is_page(result) {
        return result.get_mut("data");
    }
    Some(result)
}

/// The items as a flat list of records, whether the context holds one or many.
pub fn items_mut(ctx: &mut Context) -> Vec<&mut Value> {
    match get_items_mut(ctx) {
        Some(Value::Array(list)) => list.iter_mut().collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(single) => vec![single],
    }
}

/// Put `items` back where [`get_items`] found them.
pub fn replace_items(ctx: &mut Context, items: Value) {
    if reads_data(ctx) {
        ctx.data = Some(items);
        return;
    }
    if ctx.method == Method::Find {
        if let Some(Value::Object(page)) = ctx.result.as_mut() {
            if page.get("data").is_some_and(Value::is_array) {
                page.insert("data".into(), items);
                return;
            }
        }
    }
    ctx.result = Some(items);
}

/// Reject a hook registered on the wrong stage or method.
/// An empty `methods` slice allows every method.
pub fn check_context(ctx: &Context, stage: Option<Stage>, methods: &[Method], label: &str) -> Result<()> {
    if let Some(stage) = stage {
        if ctx.stage != stage {
            return Err(HookError::usage(format!(
                "the '{label}' hook can only be used as a '{}' hook",
                stage_name(stage)
            )));
        }
    }
    if !methods.is_empty() && !methods.contains(&ctx.method) {
        return Err(HookError::usage(format!(
            "the '{label}' hook can only be used on the {} service methods",
            methods.iter().map(Method::as_str).collect::<Vec<_>>().join(", ")
        )));
    }
    Ok(())
}

fn reads_data(ctx: &Context) -> bool {
    ctx.stage == Stage::Before || ctx.result.is_none()
}

fn is_page(v: &Value) -> bool {
    v.get("data").is_some_and(Value::is_array)
}

fn stage_name(stage: Stage) -> &'static str {
    match stage {
        Stage::Before => "before",
        Stage::After => "after",
    }
}
