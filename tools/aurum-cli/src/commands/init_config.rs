//! Default configuration file.

use anyhow::{bail, Context, Result};
use aurum_commerce::config::StorefrontConfig;

use super::InitConfigArgs;
use crate::context::Context as CliContext;

/// Run the init-config command.
pub async fn run(args: InitConfigArgs, ctx: &CliContext) -> Result<()> {
    let path = ctx.resolve_path(&args.path);
    if path.exists() && !args.force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    StorefrontConfig::default()
        .save(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({ "written": path }));
    } else {
        ctx.output.success(&format!("Wrote {}", path.display()));
    }
    Ok(())
}
