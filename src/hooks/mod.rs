use std::collections::HashMap;
use std::sync::Arc;

use itertools::Itertools;

use crate::errors::{HookError, Result};
use crate::step::{combine, Step};

pub mod serialize;
pub mod soft_delete;
pub mod traverse;

pub use serialize::{serialize, serialize_with, Schema};
pub use soft_delete::{soft_delete, SoftDelete};
pub use traverse::{traverse, traverse_with, Target};

/// Thread-safe registry of named steps.
#[derive(Clone, Default)]
pub struct Registry {
    inner: Arc<HashMap<&'static str, Step>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("trim", builtins::trim_strings());
        registry.register("nullify_query", builtins::nullify_query());
        registry.register("soft_delete", soft_delete());
        registry
    }

    pub fn register(&mut self, name: &'static str, step: Step) {
        Arc::make_mut(&mut self.inner).insert(name, step);
    }

    pub fn get(&self, name: &str) -> Option<Step> {
        self.inner.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.inner.keys().copied().sorted().collect()
    }

    /// Combine the named steps in the given order.
    pub fn pipeline<'n>(&self, names: impl IntoIterator<Item = &'n str>) -> Result<Step> {
        let steps = names
            .into_iter()
            .map(|name| {
                self.get(name).ok_or_else(|| {
                    HookError::usage(format!("unknown hook '{name}' (known: {})", self.names().join(", ")))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(combine(steps))
    }
}

pub mod builtins {
    use serde_json::Value;

    use super::traverse::{traverse, traverse_with, Target};
    use crate::step::Step;

    /// Trim surrounding whitespace from every string in the items.
    pub fn trim_strings() -> Step {
        traverse(|node: &mut Value| {
            if let Value::String(s) = node {
                let trimmed = s.trim();
                if trimmed.len() != s.len() {
                    *s = trimmed.to_string();
                }
            }
        })
    }

    /// REST query strings carry `"null"` for null; turn those back into JSON null.
    pub fn nullify_query() -> Step {
        traverse_with(
            |node: &mut Value| {
                if *node == "null" {
                    *node = Value::Null;
                }
            },
            Target::Query,
        )
    }
}
