//! `is_provider`: which transport triggered the call.
use crate::context::Context;
use crate::errors::{HookError, Result};
use crate::predicate::{Condition, Predicate, Resolution};
use crate::service::Service;

/// Matches calls made from inside the process (no provider tag).
pub const SERVER: &str = "server";
/// Matches any call that came in through a transport.
pub const EXTERNAL: &str = "external";

struct ProviderMatch {
    providers: Vec<String>,
}

impl ProviderMatch {
    fn matches(&self, provider: Option<&str>) -> bool {
        self.providers.iter().any(|name| match (name.as_str(), provider) {
            (SERVER, p) => p.is_none(),
            (EXTERNAL, p) => p.is_some(),
            (name, Some(p)) => name == p,
            (_, None) => false,
        })
    }
}

impl Predicate for ProviderMatch {
    fn test<'a>(&'a self, ctx: &'a Context, _service: &'a dyn Service) -> Resolution<'a, bool> {
        Resolution::ready(self.matches(ctx.provider()))
    }
}

/// True when the call's provider is one of `providers`. `"server"` and
/// `"external"` match the absence and presence of any provider tag.
pub fn is_provider<I, S>(providers: I) -> Result<Condition>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let providers: Vec<String> = providers.into_iter().map(Into::into).collect();
    if providers.is_empty() {
        return Err(HookError::usage("is_provider needs at least one provider name"));
    }
    Ok(Condition::from_predicate(ProviderMatch { providers }))
}
