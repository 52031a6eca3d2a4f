//! Conditional composition of service hooks.
//!
//! A hook tree is built once from [`combine`], [`iff`], [`unless`] and friends,
//! then run for every call with the call's [`Context`] and the [`Service`] it
//! belongs to:
//!
//! ```ignore
//! let step: Step = iff(is_provider(["external"])?, steps![soft_delete(), serialize(schema)])
//!     .otherwise(traverse(trim));
//! let ctx = step.run(ctx, &my_service).await?;
//! ```
pub mod errors;
pub mod context;
pub mod dot;
pub mod items;
pub mod service;
pub mod predicate;
pub mod logic;
pub mod provider;
pub mod step;
pub mod conditional;
pub mod hooks;
pub mod logging;

use errors::Result;

pub use conditional::{iff, iff_else, unless, when, Conditional, Iff};
pub use context::{Context, Method, Params, Stage};
pub use errors::HookError;
pub use hooks::{serialize, serialize_with, soft_delete, traverse, traverse_with, Registry, Schema, SoftDelete};
pub use logic::{every, is_not, some};
pub use predicate::{predicate_async, predicate_fn, BoxFuture, Condition, Predicate, Resolution};
pub use provider::is_provider;
pub use service::{Service, Unbound};
pub use step::{combine, hook, hook_async, hook_fn, Hook, IntoSteps, Step};

/// Run `step` on a context that has no service behind it.
pub async fn run_unbound(step: &Step, ctx: Context) -> Result<Context> {
    step.run(ctx, &Unbound).await
}
