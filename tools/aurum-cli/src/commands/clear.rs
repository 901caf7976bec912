//! Empty the stored cart.

use anyhow::{Context as _, Result};

use crate::context::Context;

/// Run the clear command.
pub async fn run(ctx: &Context) -> Result<()> {
    let mut shop = ctx.storefront().await?;
    let lines = shop.cart().items().len();
    ctx.output.debug(&format!("Clearing {} line(s)", lines));

    shop.clear_cart().await.context("Failed to clear cart")?;

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({ "cleared": lines }));
    } else {
        ctx.output.success(&format!("Cleared {} line(s)", lines));
    }
    Ok(())
}
