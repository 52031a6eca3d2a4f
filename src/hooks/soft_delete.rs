//! Mark records as deleted instead of removing them.
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::context::{is_truthy, Context, Method, Params, Stage};
use crate::dot::{get_by_dot, set_by_dot};
use crate::errors::{HookError, Result};
use crate::items::check_context;
use crate::predicate::Resolution;
use crate::service::Service;
use crate::step::{hook, Hook, Step};

/// Query flag that lets a call see (and patch) soft-deleted records.
pub const DISABLE_SOFT_DELETE: &str = "$disableSoftDelete";

/// Before hook that turns `remove` into a patch of `field` and hides flagged records
/// from `find`, `get`, `update` and `patch`.
#[derive(Debug, Clone)]
pub struct SoftDelete {
    field: String,
}

impl Default for SoftDelete {
    fn default() -> Self {
        Self { field: "deleted".into() }
    }
}

impl SoftDelete {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flag field, dotted paths allowed. Defaults to `deleted`.
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }

    pub fn into_step(self) -> Step {
        hook(self)
    }

    fn exclude_deleted(&self, ctx: &mut Context) {
        ctx.params.query.insert(self.field.clone(), json!({ "$ne": true }));
    }

    /// Fails with `NotFound` when the record is missing, unreadable or flagged.
    /// A flagged record reports "Item has been soft deleted." so callers can tell it
    /// apart from "Item not found."; both stay `HookError::NotFound`.
    async fn ensure_live(&self, service: &dyn Service, id: Option<&Value>) -> Result<()> {
        let Some(id) = id else {
            return Err(HookError::not_found("Item not found."));
        };
        let params = Params::with_query(Map::from_iter([(DISABLE_SOFT_DELETE.to_string(), Value::Bool(true))]));
        let item = match service.get(id, params).await {
            Ok(item) => item,
            Err(err) => {
                debug!(%id, error = %err, "soft delete lookup failed");
                return Err(HookError::not_found("Item not found."));
            }
        };
        if get_by_dot(&item, &self.field).is_some_and(is_truthy) {
            return Err(HookError::not_found("Item has been soft deleted."));
        }
        Ok(())
    }
}

impl Hook for SoftDelete {
    fn call<'a>(&'a self, mut ctx: Context, service: &'a dyn Service) -> Resolution<'a, Context> {
        if ctx.data.is_none() {
            ctx.data = Some(json!({}));
        }
        if let Err(err) = check_context(&ctx, Some(Stage::Before), &[], "softDelete") {
            return Resolution::Ready(Err(err));
        }

        if ctx.params.query.get(DISABLE_SOFT_DELETE).is_some_and(is_truthy) {
            ctx.params.query.remove(DISABLE_SOFT_DELETE);
            debug!(method = %ctx.method, "soft delete disabled for this call");
            return Resolution::ready(ctx);
        }

        match ctx.method {
            Method::Create => Resolution::ready(ctx),
            Method::Find => {
                self.exclude_deleted(&mut ctx);
                Resolution::ready(ctx)
            }
            Method::Update | Method::Patch if ctx.id.is_none() => {
                self.exclude_deleted(&mut ctx);
                Resolution::ready(ctx)
            }
            Method::Get | Method::Update | Method::Patch => Resolution::pending(async move {
                self.ensure_live(service, ctx.id.as_ref()).await?;
                Ok(ctx)
            }),
            Method::Remove => Resolution::pending(async move {
                if ctx.id.is_some() {
                    self.ensure_live(service, ctx.id.as_ref()).await?;
                }
                let data = ctx.data.get_or_insert_with(|| json!({}));
                set_by_dot(data, &self.field, Value::Bool(true))?;
                self.exclude_deleted(&mut ctx);
                ctx.params.query.insert(DISABLE_SOFT_DELETE.into(), Value::Bool(true));

                debug!(id = ?ctx.id, field = %self.field, "soft deleting");
                let data = ctx.data.clone().unwrap_or_default();
                let patched = service.patch(ctx.id.as_ref(), data, ctx.params.clone()).await?;
                ctx.result = Some(patched);
                Ok(ctx)
            }),
        }
    }
}

/// Soft delete on the default `deleted` field.
pub fn soft_delete() -> Step {
    SoftDelete::new().into_step()
}
