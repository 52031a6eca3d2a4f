use clap::Parser;
use conditional_hooks::{combine, iff, is_provider, logging, serialize, Context, Registry, Schema, Step, Unbound};
use serde_json::Value;

/// Simple runner: pass a hook context as JSON and the hooks to run on it.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Context JSON, e.g. '{"type":"after","method":"get","result":{...}}'
    context: String,
    /// Registered hook to run, in order (repeatable): trim, nullify_query, soft_delete
    #[arg(long = "hook")]
    hooks: Vec<String>,
    /// Serialize schema JSON applied after the hooks
    #[arg(long)]
    schema: Option<String>,
    /// Only run when the call came from one of these providers (repeatable)
    #[arg(long = "provider")]
    providers: Vec<String>,
}

fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("{msg}");
    std::process::exit(1);
}

fn build(args: &Args) -> conditional_hooks::errors::Result<Step> {
    let registry = Registry::with_builtins();
    let mut steps = vec![registry.pipeline(args.hooks.iter().map(String::as_str))?];
    if let Some(schema) = args.schema.as_deref() {
        let schema: Value = serde_json::from_str(schema)?;
        steps.push(serialize(Schema::from_value(&schema)?));
    }
    let chain = combine(steps);
    if args.providers.is_empty() {
        return Ok(chain);
    }
    Ok(iff(is_provider(args.providers.iter().cloned())?, chain).into())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    logging::init();

    // Parse CLI arguments.
    let args = Args::parse();

    // Parse input context.
    let ctx: Context = match serde_json::from_str(&args.context) {
        Ok(ctx) => ctx,
        Err(e) => fail(format!("Invalid context: {e}")),
    };

    let step = build(&args).unwrap_or_else(|e| fail(e));

    // Run without a service behind the context.
    let out = step.run(ctx, &Unbound).await.unwrap_or_else(|e| fail(e));

    match serde_json::to_string_pretty(&out) {
        Ok(json) => println!("{json}"),
        Err(e) => fail(e),
    }
}
