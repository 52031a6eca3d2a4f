//! Field projection over a context's items: `only`, `exclude`, `computed`, nested schemas.
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use itertools::Itertools;
use serde_json::{Map, Value};
use tracing::debug;

use crate::context::Context;
use crate::dot::{delete_by_dot, get_by_dot, get_by_dot_mut, set_by_dot};
use crate::errors::{HookError, Result};
use crate::items::{get_items, replace_items};
use crate::predicate::Resolution;
use crate::service::Service;
use crate::step::{hook, Hook, Step};

type Computed = Arc<dyn Fn(&Value, &Context) -> Value + Send + Sync>;
type SchemaFn = Arc<dyn Fn(&Context) -> Schema + Send + Sync>;

/// Keys every `only` projection keeps.
const ALWAYS_KEPT: [&str; 2] = ["_include", "_elapsed"];

#[derive(Clone, Default)]
pub struct Schema {
    only: Option<Vec<String>>,
    exclude: Vec<String>,
    computed: Vec<(String, Computed)>,
    nested: BTreeMap<String, Schema>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn only<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.only = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    pub fn exclude<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Add a field computed from the original item.
    pub fn computed<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Value, &Context) -> Value + Send + Sync + 'static,
    {
        self.computed.push((name.into(), Arc::new(f)));
        self
    }

    /// Schema applied to the object or list under `key` (dotted paths allowed).
    pub fn nested(mut self, key: impl Into<String>, schema: Schema) -> Self {
        self.nested.insert(key.into(), schema);
        self
    }

    /// Parse the JSON form, e.g. `{"only": ["a", "b.c"], "exclude": "x", "children": {"only": "id"}}`.
    pub fn from_value(value: &Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(HookError::usage("serialize schema must be an object"));
        };
        let mut schema = Schema::new();
        for (key, v) in map {
            match key.as_str() {
                "only" => schema.only = Some(key_list(key, v)?),
                "exclude" => schema.exclude = key_list(key, v)?,
                "computed" => return Err(HookError::usage("computed fields cannot be declared in JSON")),
                _ => {
                    schema.nested.insert(key.clone(), Schema::from_value(v)?);
                }
            }
        }
        Ok(schema)
    }

    /// Serialize one item or each item of a list.
    pub fn apply(&self, items: Value, ctx: &Context) -> Value {
        match items {
            Value::Array(list) => Value::Array(list.into_iter().map(|item| self.apply_item(item, ctx)).collect()),
            item => self.apply_item(item, ctx),
        }
    }

    fn apply_item(&self, item: Value, ctx: &Context) -> Value {
        let computed: Vec<(String, Value)> =
            self.computed.iter().map(|(name, f)| (name.clone(), f(&item, ctx))).collect();

        let mut item = match &self.only {
            Some(only) => project(&item, only),
            None => item,
        };

        for key in &self.exclude {
            delete_by_dot(&mut item, key);
        }

        if let (Value::Object(map), false) = (&mut item, computed.is_empty()) {
            let names: Vec<Value> = computed.iter().map(|(name, _)| Value::String(name.clone())).collect();
            map.extend(computed);
            map.insert("_computed".into(), Value::Array(names));
        }

        for (key, schema) in &self.nested {
            if let Some(child) = get_by_dot_mut(&mut item, key).filter(|c| c.is_object() || c.is_array()) {
                *child = schema.apply(child.take(), ctx);
            }
        }
        item
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("only", &self.only)
            .field("exclude", &self.exclude)
            .field("computed", &self.computed.iter().map(|(name, _)| name).collect::<Vec<_>>())
            .field("nested", &self.nested)
            .finish()
    }
}

fn key_list(directive: &str, v: &Value) -> Result<Vec<String>> {
    match v {
        Value::String(s) => Ok(vec![s.clone()]),
        Value::Array(list) => list
            .iter()
            .map(|k| {
                k.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| HookError::usage(format!("'{directive}' entries must be strings")))
            })
            .collect(),
        _ => Err(HookError::usage(format!("'{directive}' must be a string or a list of strings"))),
    }
}

/// Paths the item asks to keep through its own `_include` field.
fn own_includes(item: &Value) -> Vec<String> {
    match item.get("_include") {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(list)) => list.iter().filter_map(Value::as_str).map(str::to_string).collect(),
        _ => Vec::new(),
    }
}

fn project(item: &Value, only: &[String]) -> Value {
    let includes = own_includes(item);
    let mut projected = Value::Object(Map::new());
    let keys = only
        .iter()
        .map(String::as_str)
        .chain(ALWAYS_KEPT)
        .chain(includes.iter().map(String::as_str))
        .unique();
    for key in keys {
        let Some(v) = get_by_dot(item, key) else { continue };
        if let Err(err) = set_by_dot(&mut projected, key, v.clone()) {
            debug!(key, error = %err, "projection skipped a key");
        }
    }
    projected
}

#[derive(Clone)]
enum Source {
    Fixed(Schema),
    Dynamic(SchemaFn),
}

struct Serialize {
    source: Source,
}

impl Hook for Serialize {
    fn call<'a>(&'a self, mut ctx: Context, _service: &'a dyn Service) -> Resolution<'a, Context> {
        let Some(items) = get_items(&ctx).cloned() else {
            return Resolution::ready(ctx);
        };
        let dynamic;
        let schema = match &self.source {
            Source::Fixed(schema) => schema,
            Source::Dynamic(f) => {
                dynamic = f(&ctx);
                &dynamic
            }
        };
        let serialized = schema.apply(items, &ctx);
        replace_items(&mut ctx, serialized);
        Resolution::ready(ctx)
    }
}

pub fn serialize(schema: Schema) -> Step {
    hook(Serialize { source: Source::Fixed(schema) })
}

/// Serialize with a schema chosen per context.
pub fn serialize_with<F>(f: F) -> Step
where
    F: Fn(&Context) -> Schema + Send + Sync + 'static,
{
    hook(Serialize { source: Source::Dynamic(Arc::new(f)) })
}
