use async_trait::async_trait;
use serde_json::Value;

use crate::context::Params;
use crate::errors::{HookError, Result};

/// The service a hook chain is attached to.
///
/// Combinators never call it; they only forward it so leaf hooks can issue
/// further operations against the same service.
#[async_trait]
pub trait Service: Send + Sync {
    async fn find(&self, params: Params) -> Result<Value>;
    async fn get(&self, id: &Value, params: Params) -> Result<Value>;
    async fn create(&self, data: Value, params: Params) -> Result<Value>;
    async fn update(&self, id: Option<&Value>, data: Value, params: Params) -> Result<Value>;
    async fn patch(&self, id: Option<&Value>, data: Value, params: Params) -> Result<Value>;
    async fn remove(&self, id: Option<&Value>, params: Params) -> Result<Value>;
}

/// Receiver for chains that are run outside of any service. Every call is rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unbound;

fn unbound(method: &str) -> HookError {
    HookError::Service(format!("no service bound, cannot call '{method}'"))
}

#[async_trait]
impl Service for Unbound {
    async fn find(&self, _params: Params) -> Result<Value> {
        Err(unbound("find"))
    }

    async fn get(&self, _id: &Value, _params: Params) -> Result<Value> {
        Err(unbound("get"))
    }

    async fn create(&self, _data: Value, _params: Params) -> Result<Value> {
        Err(unbound("create"))
    }

    async fn update(&self, _id: Option<&Value>, _data: Value, _params: Params) -> Result<Value> {
        Err(unbound("update"))
    }

    async fn patch(&self, _id: Option<&Value>, _data: Value, _params: Params) -> Result<Value> {
        Err(unbound("patch"))
    }

    async fn remove(&self, _id: Option<&Value>, _params: Params) -> Result<Value> {
        Err(unbound("remove"))
    }
}
