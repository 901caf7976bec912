//! Print the stored cart.

use anyhow::Result;

use crate::context::Context;

/// Run the show command.
pub async fn run(ctx: &Context) -> Result<()> {
    let shop = ctx.storefront().await?;
    let cart = shop.cart();

    if ctx.output.is_json() {
        ctx.output.json(cart);
        return Ok(());
    }

    ctx.output.cart_totals(cart);
    if cart.is_empty() {
        ctx.output.info("Cart is empty");
        return Ok(());
    }

    for item in cart.items() {
        let selected = cart.selected_item_id() == Some(&item.id);
        ctx.output.cart_line(item, selected);
    }
    Ok(())
}
