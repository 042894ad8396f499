//! End-to-end tests: user input on the page, through the store, back to the
//! page.
//!
//! Every test drives a [`Storefront`] over the in-memory gateway by clicking
//! and typing into the headless document, then settles the action queue.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;
use storefront::gateway::StubGateway;
use storefront::types::{CheckoutPhase, ItemId, PaymentMethod, Product, StoreAction};
use storefront::validation::EmailPolicy;
use storefront::view::Element;
use storefront::Storefront;
use storefront_testing::{init_test_tracing, EventRecorder};

async fn shop(stub: &StubGateway) -> Storefront {
    init_test_tracing();
    let app = Storefront::new(Arc::new(stub.clone()), EmailPolicy::Presence).unwrap();
    app.load_catalog().await.unwrap();
    app
}

fn card(app: &Storefront, id: &str) -> Element {
    app.page()
        .catalog()
        .into_iter()
        .find(|card| card.attribute("data-id").as_deref() == Some(id))
        .unwrap()
}

fn named_input(form: &Element, name: &str) -> Element {
    form.query_all("form__input")
        .into_iter()
        .find(|input| input.attribute("name").as_deref() == Some(name))
        .unwrap()
}

fn text(root: &Element, class: &str) -> String {
    root.query(class).unwrap().text_content()
}

/// Opens the preview of `id` and clicks its basket button
async fn add_from_preview(app: &Storefront, id: &str) {
    card(app, id).click();
    app.settle().await.unwrap();
    app.modal().content().unwrap().query("card__button").unwrap().click();
    app.settle().await.unwrap();
}

/// Walks the basket and both forms, stopping before the final submit
async fn fill_checkout(app: &Storefront) {
    app.document().query("header__basket").unwrap().click();
    app.settle().await.unwrap();
    app.basket().container().query("basket__button").unwrap().click();
    app.settle().await.unwrap();

    let order = app.address_form().form().container().clone();
    assert!(app.modal().content().unwrap().ptr_eq(&order));
    order.query("online").unwrap().click();
    named_input(&order, "address").input("221B Baker Street");
    app.settle().await.unwrap();
    order.query("order__button").unwrap().click();
    app.settle().await.unwrap();

    let contacts = app.contacts_form().form().container().clone();
    assert!(app.modal().content().unwrap().ptr_eq(&contacts));
    named_input(&contacts, "email").input("shopper@example.com");
    named_input(&contacts, "phone").input("+1 555 0100");
    app.settle().await.unwrap();
}

async fn submit_contacts(app: &Storefront) {
    app.contacts_form().form().container().query("button").unwrap().click();
    app.settle().await.unwrap();
}

#[tokio::test]
async fn full_checkout_through_the_page() {
    let stub = StubGateway::with_sample_catalog();
    let app = shop(&stub).await;

    add_from_preview(&app, "854cef69").await;
    let preview = app.modal().content().unwrap();
    assert_eq!(text(&preview, "card__button"), "Remove");
    app.document().press_key("Escape");
    app.settle().await.unwrap();
    assert_eq!(text(app.document(), "header__basket-counter"), "1");

    fill_checkout(&app).await;
    submit_contacts(&app).await;

    let success = app.modal().content().unwrap();
    assert_eq!(text(&success, "order__success-description"), "Charged 750 synapses");
    assert_eq!(text(app.document(), "header__basket-counter"), "0");

    let orders = stub.placed_orders();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].items, vec![ItemId::new("854cef69")]);
    assert_eq!(orders[0].total, 750);
    assert_eq!(orders[0].payment, Some(PaymentMethod::Card));
    assert_eq!(orders[0].address, "221B Baker Street");

    success.query("order__success-close").unwrap().click();
    app.settle().await.unwrap();
    assert!(!app.modal().is_open());
    assert!(!app.page().is_locked());
    assert_eq!(app.state(|s| s.phase().clone()).await, CheckoutPhase::Closed);
}

#[tokio::test]
async fn priceless_items_count_as_zero() {
    let product = |id: &str, price: Option<u64>| Product {
        id: ItemId::new(id),
        title: id.to_uppercase(),
        description: String::new(),
        image: format!("/{id}.svg"),
        category: "other".into(),
        price,
    };
    let stub = StubGateway::new(vec![product("a", Some(100)), product("b", None)]);
    let app = shop(&stub).await;

    card(&app, "b").click();
    app.settle().await.unwrap();
    assert!(app.modal().content().unwrap().query("card__button").unwrap().is_disabled());

    app.dispatch(StoreAction::AddToBasket(ItemId::new("a")));
    app.dispatch(StoreAction::AddToBasket(ItemId::new("b")));
    app.settle().await.unwrap();
    assert_eq!(text(app.basket().container(), "basket__price"), "100 synapses");
    assert_eq!(text(app.document(), "header__basket-counter"), "2");

    fill_checkout(&app).await;
    submit_contacts(&app).await;

    let success = app.modal().content().unwrap();
    assert_eq!(text(&success, "order__success-description"), "Charged 100 synapses");
    assert_eq!(stub.placed_orders()[0].total, 100);
    assert!(app.state(|s| s.active_items().is_empty()).await);
}

#[tokio::test]
async fn stale_preview_never_replaces_newer_one() {
    let stub = StubGateway::with_sample_catalog();
    stub.delay_details("854cef69", Duration::from_millis(100));
    let app = shop(&stub).await;
    let previews = EventRecorder::attach(&app.bus(), "preview:shown");

    let mut slow = app.send(StoreAction::OpenPreview(ItemId::new("854cef69"))).await.unwrap();
    let mut fast = app.send(StoreAction::OpenPreview(ItemId::new("c101ab44"))).await.unwrap();
    fast.wait().await;
    slow.wait().await;

    assert_eq!(previews.events().len(), 1);
    let preview = app.modal().content().unwrap();
    assert_eq!(text(&preview, "card__title"), "HEX lollipop");
    assert_eq!(preview.query_all("card__text").len(), 2);
    assert_eq!(
        app.state(|s| s.preview().cloned()).await,
        Some(ItemId::new("c101ab44"))
    );
}

#[tokio::test]
async fn failed_order_can_be_resubmitted() {
    let stub = StubGateway::with_sample_catalog();
    stub.fail_orders(Some("Payment declined"));
    let app = shop(&stub).await;

    add_from_preview(&app, "c101ab44").await;
    fill_checkout(&app).await;
    submit_contacts(&app).await;

    let contacts = app.contacts_form().form().container().clone();
    assert!(app.modal().content().unwrap().ptr_eq(&contacts));
    assert!(text(&contacts, "form__errors").contains("Payment declined"));
    assert!(app.contacts_form().form().is_valid());
    assert!(matches!(
        app.state(|s| s.phase().clone()).await,
        CheckoutPhase::Failed { .. }
    ));
    assert_eq!(text(app.document(), "header__basket-counter"), "1");

    stub.fail_orders(None);
    submit_contacts(&app).await;

    let success = app.modal().content().unwrap();
    assert_eq!(text(&success, "order__success-description"), "Charged 1450 synapses");
    assert_eq!(stub.placed_orders().len(), 1);
}

#[tokio::test]
async fn modal_closes_on_backdrop_and_escape_only() {
    let stub = StubGateway::with_sample_catalog();
    let app = shop(&stub).await;

    card(&app, "412bcf81").click();
    app.settle().await.unwrap();
    assert!(app.modal().is_open());
    assert!(app.page().is_locked());

    app.modal().content().unwrap().query("card__title").unwrap().click();
    app.settle().await.unwrap();
    assert!(app.modal().is_open());

    app.modal().container().click();
    app.settle().await.unwrap();
    assert!(!app.modal().is_open());
    assert!(!app.page().is_locked());
    assert_eq!(app.state(|s| s.preview().cloned()).await, None);

    card(&app, "412bcf81").click();
    app.settle().await.unwrap();
    app.document().press_key("Escape");
    app.settle().await.unwrap();
    assert!(!app.modal().is_open());
}

#[tokio::test]
async fn empty_basket_cannot_check_out() {
    let stub = StubGateway::with_sample_catalog();
    let app = shop(&stub).await;

    app.document().query("header__basket").unwrap().click();
    app.settle().await.unwrap();
    let basket = app.basket().container().clone();
    assert_eq!(text(&basket, "basket__list"), "Basket is empty");
    assert!(basket.query("basket__button").unwrap().is_disabled());

    app.dispatch(StoreAction::BeginCheckout);
    app.settle().await.unwrap();
    assert!(app.modal().content().unwrap().ptr_eq(&basket));
    assert_eq!(app.state(|s| s.phase().clone()).await, CheckoutPhase::Closed);
}

#[tokio::test]
async fn basket_rows_remove_items() {
    let stub = StubGateway::with_sample_catalog();
    let app = shop(&stub).await;

    app.dispatch(StoreAction::AddToBasket(ItemId::new("854cef69")));
    app.dispatch(StoreAction::AddToBasket(ItemId::new("1c521d84")));
    app.settle().await.unwrap();

    app.document().query("header__basket").unwrap().click();
    app.settle().await.unwrap();
    let basket = app.basket().container().clone();
    let rows = basket.query_all("basket__item");
    assert_eq!(rows.len(), 2);
    assert_eq!(text(&rows[1], "basket__item-index"), "2");
    assert_eq!(text(&basket, "basket__price"), "3250 synapses");

    rows[0].query("basket__item-delete").unwrap().click();
    app.settle().await.unwrap();
    let rows = basket.query_all("basket__item");
    assert_eq!(rows.len(), 1);
    assert_eq!(text(&rows[0], "card__title"), "Button of all buttons");
    assert_eq!(text(&basket, "basket__price"), "2500 synapses");
    assert_eq!(text(app.document(), "header__basket-counter"), "1");
}

#[tokio::test]
async fn failed_catalog_leaves_gallery_empty() {
    let stub = StubGateway::with_sample_catalog();
    stub.fail_catalog(Some("maintenance"));
    let app = shop(&stub).await;

    assert!(app.page().catalog().is_empty());
    assert!(app.state(|s| s.catalog().is_empty()).await);
}
