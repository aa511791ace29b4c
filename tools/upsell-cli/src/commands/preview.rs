//! Offline widget preview.
//!
//! Runs a real session driver against fixture files and an in-process cart,
//! then prints every render output the session published.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use serde::Serialize;
use tokio::sync::watch;
use upsell_commerce::{CartChange, CartLine, Product};
use upsell_data::{CatalogQuery, StaticCatalog};
use upsell_widget::{InMemoryCart, RenderOutput, SessionDriver, SessionHandle, SymbolFormatter, WidgetView};

use super::PreviewArgs;
use crate::context::Context;
use crate::output::state_badge;

/// What a preview run produced.
#[derive(Debug, Serialize)]
struct PreviewReport {
    session_id: String,
    fetch_state: &'static str,
    mutation_state: &'static str,
    frames: Vec<RenderOutput>,
    applied_changes: Vec<CartChange>,
    cart_lines: Vec<CartLine>,
}

/// Run the preview command.
pub async fn run(args: PreviewArgs, ctx: &Context) -> Result<()> {
    let config = ctx.config.upsell.clone();
    let step_timeout = Duration::from_millis(args.step_timeout_ms);

    let catalog = load_catalog(&ctx.resolve_path(&args.catalog), &config.catalog_query())?;
    let lines = match &args.cart {
        Some(path) => load_cart(&ctx.resolve_path(path))?,
        None => Vec::new(),
    };
    ctx.output.debug(&format!(
        "{} catalog products, {} cart lines",
        catalog.products().len(),
        lines.len()
    ));

    let mut cart = InMemoryCart::new(lines);
    if let Some(message) = &args.fail_add {
        cart = cart.failing(message.clone());
    }

    let (driver, mut handle) = SessionDriver::new(
        config.clone(),
        Arc::new(catalog),
        Arc::new(cart.clone()),
        Arc::new(SymbolFormatter),
        cart.subscribe(),
    );
    let recorder = tokio::spawn(record(handle.render()));
    let session_task = tokio::spawn(driver.run());

    if step(&mut handle, step_timeout, |o| o.view != WidgetView::Skeleton)
        .await
        .is_none()
    {
        ctx.output.warn("Catalog did not load in time");
    }

    if let Some(variant) = &args.choose {
        ctx.output.debug(&format!("choosing {}", variant));
        handle.choose_variant(variant.as_str())?;
        let wanted = variant.clone();
        let chosen = step(&mut handle, step_timeout, move |o| {
            o.offer().is_some_and(|card| card.variant_id.as_str() == wanted)
        })
        .await;
        if chosen.is_none() {
            ctx.output.warn(&format!("Variant {} is not selectable on the current offer", variant));
        }
    }

    if args.add {
        ctx.output.debug("pressing add");
        let lines_before = cart.lines().len();
        let watched = cart.clone();
        handle.add_to_cart()?;

        let settled = step(&mut handle, step_timeout, move |o| {
            o.banner_visible() || watched.lines().len() > lines_before
        })
        .await;

        match settled {
            Some(output) if output.banner_visible() && args.wait_banner => {
                let wait = config.feedback_timeout() + step_timeout;
                if step(&mut handle, wait, |o| !o.banner_visible()).await.is_none() {
                    ctx.output.warn("Error banner did not clear in time");
                }
            }
            Some(_) => {}
            None => ctx.output.warn("Add to cart had no visible effect"),
        }
    }

    handle.shutdown()?;
    let session = session_task.await.context("Session task failed")?;
    let frames = recorder.await.context("Render recorder failed")?;

    let report = PreviewReport {
        session_id: session.id().to_string(),
        fetch_state: session.fetch_state().as_str(),
        mutation_state: session.mutation_state().as_str(),
        frames,
        applied_changes: cart.applied_changes(),
        cart_lines: cart.lines(),
    };

    if ctx.output.is_json() {
        ctx.output.json(&report);
        return Ok(());
    }

    print_report(&report, ctx);
    Ok(())
}

fn print_report(report: &PreviewReport, ctx: &Context) {
    ctx.output.header(&format!("Preview {}", report.session_id));
    for (index, frame) in report.frames.iter().enumerate() {
        ctx.output.frame(index, frame);
    }

    ctx.output.header("Session");
    ctx.output.kv("catalog", &state_badge(report.fetch_state));
    ctx.output.kv("add to cart", &state_badge(report.mutation_state));
    ctx.output.kv("cart lines", &report.cart_lines.len().to_string());
    for change in &report.applied_changes {
        if let CartChange::AddCartLine {
            merchandise_id,
            quantity,
        } = change
        {
            ctx.output.list_item(&format!("addCartLine {} x{}", merchandise_id, quantity));
        }
    }
}

/// Wait for a render output matching `predicate`, or give up after `timeout`.
async fn step(
    handle: &mut SessionHandle,
    timeout: Duration,
    predicate: impl FnMut(&RenderOutput) -> bool,
) -> Option<RenderOutput> {
    tokio::time::timeout(timeout, handle.wait_for(predicate))
        .await
        .ok()
        .and_then(Result::ok)
}

/// Collect published outputs until the session ends.
///
/// Outputs published faster than they are read are coalesced.
async fn record(mut render: watch::Receiver<RenderOutput>) -> Vec<RenderOutput> {
    let mut frames = vec![render.borrow_and_update().clone()];
    while render.changed().await.is_ok() {
        frames.push(render.borrow_and_update().clone());
    }
    frames
}

/// Load a catalog fixture: either a JSON array of products or a recorded
/// storefront GraphQL response.
fn load_catalog(path: &Path, query: &CatalogQuery) -> Result<StaticCatalog> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog: {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse catalog JSON: {}", path.display()))?;

    if value.is_array() {
        let products: Vec<Product> = serde_json::from_value(value)
            .with_context(|| format!("Failed to parse product list: {}", path.display()))?;
        Ok(StaticCatalog::new(products))
    } else {
        StaticCatalog::from_storefront_json(&content, query)
            .with_context(|| format!("Failed to decode storefront response: {}", path.display()))
    }
}

fn load_cart(path: &Path) -> Result<Vec<CartLine>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read cart: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse cart lines: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_product_list_fixture_shape() {
        let products: Vec<Product> = serde_json::from_value(json!([{
            "id": "gid://shopify/Product/1",
            "title": "Gift Wrap",
            "variants": [{
                "id": "gid://shopify/ProductVariant/1",
                "label": "Default",
                "price": {"amount_cents": 500, "currency": "USD"}
            }]
        }]))
        .unwrap();

        assert_eq!(products.len(), 1);
        assert_eq!(products[0].variants[0].price.to_string(), "$5.00");
    }

    #[test]
    fn test_cart_fixture_shape() {
        let lines: Vec<CartLine> = serde_json::from_value(json!([
            {"merchandise": {"id": "gid://shopify/ProductVariant/1"}}
        ]))
        .unwrap();
        assert_eq!(lines[0].merchandise_id().as_str(), "gid://shopify/ProductVariant/1");
    }
}
