//! Terminal rendering for carts and ring builds.
//!
//! Every printer is silent in JSON mode except [`Output::json`] and
//! [`Output::error`], so a command can call both renderers unconditionally.

use aurum_commerce::cart::{Cart, CartItem};
use console::style;

/// Output handler for CLI messages.
#[derive(Clone)]
pub struct Output {
    verbose: bool,
    json: bool,
}

impl Output {
    pub fn new(verbose: bool, json: bool) -> Self {
        Self { verbose, json }
    }

    pub fn info(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("ℹ").blue(), msg);
    }

    pub fn success(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("✓").green(), msg);
    }

    pub fn warn(&self, msg: &str) {
        if self.json {
            return;
        }
        eprintln!("{} {}", style("⚠").yellow(), msg);
    }

    /// Errors are reported in JSON mode too, as `{"error": ...}` on stderr.
    pub fn error(&self, msg: &str) {
        if self.json {
            eprintln!("{}", serde_json::json!({ "error": msg }));
            return;
        }
        eprintln!("{} {}", style("✗").red(), style(msg).red());
    }

    /// Only in verbose mode.
    pub fn debug(&self, msg: &str) {
        if !self.verbose || self.json {
            return;
        }
        eprintln!("{} {}", style("→").dim(), style(msg).dim());
    }

    pub fn header(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("\n{}", style(msg).bold().underlined());
    }

    pub fn json<T: serde::Serialize>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{}", json),
            Err(e) => self.error(&format!("Failed to encode output: {}", e)),
        }
    }

    pub fn kv(&self, key: &str, value: &str) {
        if self.json {
            return;
        }
        println!("  {}: {}", style(key).dim(), value);
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    /// Cart id, unit count and total.
    pub fn cart_totals(&self, cart: &Cart) {
        self.header("Cart");
        self.kv("id", cart.id.as_str());
        self.kv("items", &cart.item_count().to_string());
        self.kv("total", &cart.total().display());
    }

    /// One cart line followed by its ring build, if it has one.
    pub fn cart_line(&self, item: &CartItem, selected: bool) {
        if self.json {
            return;
        }
        println!("\n{}", line_heading(item, selected));
        self.kv("line", item.id.as_str());
        self.kv("product", item.product.id.as_str());

        let Some(build) = &item.configuration else {
            println!("  {}", style("not configured").dim().italic());
            return;
        };
        let width = build.summary().iter().map(|(label, _)| label.len()).max();
        for (label, value) in build.summary() {
            println!(
                "  {:<width$}  {}",
                style(label).dim(),
                value,
                width = width.unwrap_or(0)
            );
        }
    }
}

/// `Name  x2  $20.00` with an `editing` badge on the selected line.
fn line_heading(item: &CartItem, selected: bool) -> String {
    let total = item
        .line_total()
        .map(|m| m.display())
        .unwrap_or_else(|_| "overflow".to_string());
    let mut heading = format!(
        "{}  x{}  {}",
        style(&item.product.name).bold(),
        item.quantity,
        style(total).green()
    );
    if selected {
        heading.push_str(&format!("  {}", style("editing").cyan().reverse()));
    }
    heading
}

#[cfg(test)]
mod tests {
    use super::*;
    use aurum_commerce::catalog::Product;
    use aurum_commerce::money::{Currency, Money};

    fn line(quantity: i64) -> CartItem {
        let band = Product::new("band", "Wedding band", Money::new(1000, Currency::USD), 5);
        CartItem::new(band, quantity)
    }

    #[test]
    fn test_line_heading_shows_quantity_and_total() {
        console::set_colors_enabled(false);
        assert_eq!(line_heading(&line(2), false), "Wedding band  x2  $20.00");
        assert_eq!(
            line_heading(&line(2), true),
            "Wedding band  x2  $20.00  editing"
        );
    }

    #[test]
    fn test_line_heading_survives_overflow() {
        console::set_colors_enabled(false);
        assert!(line_heading(&line(i64::MAX), false).ends_with("overflow"));
    }
}
