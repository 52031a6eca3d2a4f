#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use conditional_hooks::errors::Result;
use conditional_hooks::{hook_fn, HookError, Params, Service, Step};
use serde_json::{json, Value};

fn key(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Service keeping records in memory and logging which methods were called.
#[derive(Default)]
pub struct MemoryService {
    records: Mutex<BTreeMap<String, Value>>,
    calls: Mutex<Vec<(String, Params)>>,
}

impl MemoryService {
    pub fn with_records(records: impl IntoIterator<Item = (Value, Value)>) -> Self {
        let service = Self::default();
        {
            let mut map = service.records.lock().unwrap();
            for (id, record) in records {
                map.insert(key(&id), record);
            }
        }
        service
    }

    pub fn record(&self, id: &Value) -> Option<Value> {
        self.records.lock().unwrap().get(&key(id)).cloned()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(m, _)| m.clone()).collect()
    }

    pub fn last_params(&self) -> Option<Params> {
        self.calls.lock().unwrap().last().map(|(_, p)| p.clone())
    }

    fn log(&self, method: &str, params: &Params) {
        self.calls.lock().unwrap().push((method.to_string(), params.clone()));
    }
}

#[async_trait]
impl Service for MemoryService {
    async fn find(&self, params: Params) -> Result<Value> {
        self.log("find", &params);
        Ok(Value::Array(self.records.lock().unwrap().values().cloned().collect()))
    }

    async fn get(&self, id: &Value, params: Params) -> Result<Value> {
        self.log("get", &params);
        self.record(id).ok_or_else(|| HookError::not_found(format!("no record {id}")))
    }

    async fn create(&self, data: Value, params: Params) -> Result<Value> {
        self.log("create", &params);
        let id = data.get("id").cloned().unwrap_or(Value::Null);
        self.records.lock().unwrap().insert(key(&id), data.clone());
        Ok(data)
    }

    async fn update(&self, id: Option<&Value>, data: Value, params: Params) -> Result<Value> {
        self.log("update", &params);
        let id = id.ok_or_else(|| HookError::Service("multi update unsupported".into()))?;
        self.records.lock().unwrap().insert(key(id), data.clone());
        Ok(data)
    }

    async fn patch(&self, id: Option<&Value>, data: Value, params: Params) -> Result<Value> {
        self.log("patch", &params);
        let id = id.ok_or_else(|| HookError::Service("multi patch unsupported".into()))?;
        let mut records = self.records.lock().unwrap();
        let record = records.get_mut(&key(id)).ok_or_else(|| HookError::not_found(format!("no record {id}")))?;
        if let (Value::Object(target), Value::Object(changes)) = (record, data) {
            target.extend(changes);
        }
        Ok(records.get(&key(id)).cloned().unwrap_or(Value::Null))
    }

    async fn remove(&self, id: Option<&Value>, params: Params) -> Result<Value> {
        self.log("remove", &params);
        let id = id.ok_or_else(|| HookError::Service("multi remove unsupported".into()))?;
        self.records.lock().unwrap().remove(&key(id)).ok_or_else(|| HookError::not_found(format!("no record {id}")))
    }
}

/// Leaf step incrementing `data.count`.
pub fn bump() -> Step {
    hook_fn(|mut ctx, _| {
        let data = ctx.data.get_or_insert_with(|| json!({}));
        let next = data.get("count").and_then(Value::as_i64).unwrap_or(0) + 1;
        data["count"] = json!(next);
        Ok(ctx)
    })
}

/// Leaf step recording `tag` into `data.trail`.
pub fn mark(tag: &'static str) -> Step {
    hook_fn(move |mut ctx, _| {
        let data = ctx.data.get_or_insert_with(|| json!({}));
        match data.get_mut("trail").and_then(Value::as_array_mut) {
            Some(trail) => trail.push(json!(tag)),
            None => data["trail"] = json!([tag]),
        }
        Ok(ctx)
    })
}

pub fn count(ctx: &conditional_hooks::Context) -> i64 {
    ctx.data.as_ref().and_then(|d| d.get("count")).and_then(Value::as_i64).unwrap_or(0)
}

pub fn trail(ctx: &conditional_hooks::Context) -> Value {
    ctx.data.as_ref().and_then(|d| d.get("trail")).cloned().unwrap_or_else(|| json!([]))
}
