//! Check stored ring builds against the step rules.

use anyhow::{bail, Result};
use aurum_commerce::cart::Cart;
use aurum_commerce::configurator::{validate_step, ConfiguratorStep, StepValidationError};
use aurum_commerce::ids::LineItemId;
use serde::Serialize;

use crate::context::Context;

/// Validation outcome for one configured line.
#[derive(Debug, Serialize)]
struct LineReport {
    line_id: LineItemId,
    product: String,
    failures: Vec<Failure>,
}

#[derive(Debug, Serialize)]
struct Failure {
    step: ConfiguratorStep,
    reason: String,
}

impl From<StepValidationError> for Failure {
    fn from(err: StepValidationError) -> Self {
        Self {
            step: err.step,
            reason: err.reason.message_key().to_string(),
        }
    }
}

/// Run every step validator over every configured line.
fn check(cart: &Cart) -> Vec<LineReport> {
    cart.items()
        .iter()
        .filter_map(|item| {
            let build = item.configuration.as_ref()?;
            let failures = ConfiguratorStep::ALL
                .iter()
                .filter_map(|step| validate_step(*step, build).err())
                .map(Failure::from)
                .collect();
            Some(LineReport {
                line_id: item.id.clone(),
                product: item.product.name.clone(),
                failures,
            })
        })
        .collect()
}

/// Run the validate command.
pub async fn run(ctx: &Context) -> Result<()> {
    let shop = ctx.storefront().await?;
    let reports = check(shop.cart());
    let failed = reports.iter().filter(|r| !r.failures.is_empty()).count();

    if ctx.output.is_json() {
        ctx.output.json(&reports);
    } else {
        ctx.output.header("Ring builds");
        if reports.is_empty() {
            ctx.output.info("No configured lines");
        }
        for report in &reports {
            if report.failures.is_empty() {
                ctx.output.success(&format!("{} ({})", report.product, report.line_id));
                continue;
            }
            ctx.output.warn(&format!("{} ({})", report.product, report.line_id));
            for failure in &report.failures {
                ctx.output.kv(failure.step.display_name(), &failure.reason);
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} configured line(s) are incomplete", failed, reports.len());
    }
    Ok(())
}
