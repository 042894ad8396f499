//! Storefront binary
//!
//! Loads the catalog and walks one shopping session headlessly: preview an
//! item, add it, open the basket and check out.

use anyhow::Context;
use std::time::Duration;
use storefront::{Config, Storefront};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let app = Storefront::from_config(&config)?;
    let result = session(&app).await;
    app.shutdown(Duration::from_secs(5)).await?;
    result
}

async fn session(app: &Storefront) -> anyhow::Result<()> {
    app.load_catalog().await?;
    let cards = app.page().catalog();
    tracing::info!(items = cards.len(), "Gallery rendered");

    let Some(card) = cards
        .into_iter()
        .find(|card| card.attribute("data-priceless").is_none())
    else {
        tracing::warn!("Nothing to buy");
        return Ok(());
    };

    // Preview and add
    card.click();
    app.settle().await?;
    let preview = app.modal().content().context("preview not shown")?;
    tracing::info!(title = %preview.ensure("card__title")?.text_content(), "Previewing");

    preview.ensure("card__button")?.click();
    app.settle().await?;
    app.document().press_key("Escape");
    app.settle().await?;
    tracing::info!(
        basket = %app.document().ensure("header__basket-counter")?.text_content(),
        "Added to basket"
    );

    // Basket
    app.document().ensure("header__basket")?.click();
    app.settle().await?;
    let basket = app.basket().container();
    tracing::info!(total = %basket.ensure("basket__price")?.text_content(), "Basket open");
    basket.ensure("basket__button")?.click();
    app.settle().await?;

    // Address step
    let order = app.address_form().form().container();
    order.ensure("online")?.click();
    order.ensure("form__input")?.input("221B Baker Street");
    app.settle().await?;
    order.ensure("order__button")?.click();
    app.settle().await?;

    // Contact step
    let contacts = app.contacts_form().form().container();
    for input in contacts.query_all("form__input") {
        match input.attribute("name").as_deref() {
            Some("email") => input.input("shopper@example.com"),
            Some("phone") => input.input("+1 555 0100"),
            _ => {},
        }
    }
    app.settle().await?;
    contacts.ensure("button")?.click();
    app.settle().await?;

    match app.modal().content() {
        Some(content) if content.query("order__success-description").is_some() => {
            let text = content.ensure("order__success-description")?.text_content();
            tracing::info!(%text, "Order placed");
        },
        _ => {
            let errors = contacts.ensure("form__errors")?.text_content();
            tracing::error!(%errors, "Checkout did not complete");
        },
    }
    Ok(())
}
