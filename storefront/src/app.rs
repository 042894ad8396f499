//! Storefront context: store, event bus and views wired together.
//!
//! Views never touch the store. Their callbacks enqueue actions through a
//! [`Dispatcher`]; [`Storefront::settle`] feeds the queue to the store in
//! FIFO order until nothing is left, including actions queued by bus
//! subscribers and by effect feedback along the way.

use crate::config::Config;
use crate::gateway::{Gateway, HttpGateway, StubGateway};
use crate::reducer::{StorefrontEnvironment, StorefrontReducer};
use crate::state::AppState;
use crate::types::{BasketSnapshot, CheckoutStep, OrderField, PaymentMethod, StoreAction, StoreEvent};
use crate::validation::EmailPolicy;
use crate::view::{
    templates, AddressForm, Basket, BasketCard, Callback, CatalogCard, ContactsForm, Element, Modal,
    Page, Success, Templates, ViewError,
};
use std::sync::Arc;
use std::time::Duration;
use storefront_core::event_bus::{EventBus, HandlerError, SubscriptionId};
use storefront_runtime::{dispatch, Dispatcher, EffectHandle, Inbox, Store, StoreError};
use tokio::sync::Mutex;

/// The store type behind a [`Storefront`]
pub type StorefrontStore =
    Store<AppState, StoreAction, StoreEvent, StorefrontEnvironment, StorefrontReducer>;

/// Views shared by the bus subscribers
#[derive(Clone, Debug)]
struct Views {
    page: Page,
    modal: Modal,
    basket: Basket,
    address: AddressForm,
    contacts: ContactsForm,
}

/// A running storefront over a headless document
pub struct Storefront {
    store: StorefrontStore,
    inbox: Mutex<Inbox<StoreAction>>,
    dispatcher: Dispatcher<StoreAction>,
    document: Element,
    views: Views,
    subscriptions: Vec<SubscriptionId>,
}

impl Storefront {
    /// Builds the page, its views and the store, and wires them to the bus
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::MissingElement`] if the page or a template lacks
    /// a required element.
    pub fn new(gateway: Arc<dyn Gateway>, email_policy: EmailPolicy) -> Result<Self, ViewError> {
        let templates = Arc::new(Templates::standard());
        let document = templates::page();
        let bus = Arc::new(EventBus::new());
        let (dispatcher, inbox) = dispatch::channel();

        let store = Store::with_bus(
            AppState::new(email_policy),
            StorefrontReducer::new(),
            StorefrontEnvironment::new(gateway),
            Arc::clone(&bus),
        );

        let views = Views {
            page: Page::new(&document, dispatcher.clone())?,
            modal: Modal::new(
                document.ensure("modal")?,
                &document,
                Arc::clone(&bus),
                dispatcher.clone(),
            )?,
            basket: Basket::new(templates.basket.instantiate(), dispatcher.clone())?,
            address: AddressForm::new(templates.order.instantiate(), dispatcher.clone())?,
            contacts: ContactsForm::new(templates.contacts.instantiate(), dispatcher.clone())?,
        };

        let subscriptions = wire(&bus, &views, &templates, &dispatcher);
        tracing::info!(subscriptions = subscriptions.len(), "Storefront ready");

        Ok(Self {
            store,
            inbox: Mutex::new(inbox),
            dispatcher,
            document,
            views,
            subscriptions,
        })
    }

    /// Builds a storefront against the gateway `config` selects
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::MissingElement`] if the page or a template lacks
    /// a required element.
    pub fn from_config(config: &Config) -> Result<Self, ViewError> {
        let gateway: Arc<dyn Gateway> = if config.offline {
            tracing::info!("Using the bundled sample catalog");
            Arc::new(StubGateway::with_sample_catalog())
        } else {
            tracing::info!(api = %config.api_url, cdn = %config.cdn_url, "Using the remote API");
            Arc::new(HttpGateway::new(&config.api_url, &config.cdn_url))
        };
        Self::new(gateway, config.email_policy)
    }

    /// Queues an action
    pub fn dispatch(&self, action: StoreAction) {
        self.dispatcher.dispatch(action);
    }

    /// A handle for queueing actions
    #[must_use]
    pub fn dispatcher(&self) -> Dispatcher<StoreAction> {
        self.dispatcher.clone()
    }

    /// Sends an action straight to the store, bypassing the queue
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`Self::shutdown`].
    pub async fn send(&self, action: StoreAction) -> Result<EffectHandle, StoreError> {
        self.store.send(action).await
    }

    /// Processes queued actions until the queue stays empty
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`Self::shutdown`].
    pub async fn settle(&self) -> Result<usize, StoreError> {
        let mut inbox = self.inbox.lock().await;
        self.store.drain(&mut inbox).await
    }

    /// Loads the catalog and renders the gallery
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`Self::shutdown`].
    pub async fn load_catalog(&self) -> Result<(), StoreError> {
        self.dispatch(StoreAction::LoadCatalog);
        self.settle().await.map(|_| ())
    }

    /// Root of the document
    #[must_use]
    pub const fn document(&self) -> &Element {
        &self.document
    }

    /// Page shell
    #[must_use]
    pub const fn page(&self) -> &Page {
        &self.views.page
    }

    /// Modal window
    #[must_use]
    pub const fn modal(&self) -> &Modal {
        &self.views.modal
    }

    /// Basket panel
    #[must_use]
    pub const fn basket(&self) -> &Basket {
        &self.views.basket
    }

    /// Payment and address form
    #[must_use]
    pub const fn address_form(&self) -> &AddressForm {
        &self.views.address
    }

    /// Email and phone form
    #[must_use]
    pub const fn contacts_form(&self) -> &ContactsForm {
        &self.views.contacts
    }

    /// Reads the application state
    pub async fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&AppState) -> T,
    {
        self.store.state(f).await
    }

    /// The event bus views are wired to
    #[must_use]
    pub fn bus(&self) -> Arc<EventBus<StoreEvent>> {
        self.store.bus()
    }

    /// Detaches the views and waits for in-flight requests
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`] if requests are still pending
    /// after `timeout`.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
        let bus = self.store.bus();
        for id in &self.subscriptions {
            bus.unsubscribe(*id);
        }
        self.store.shutdown(timeout).await
    }
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("views", &self.views)
            .field("subscriptions", &self.subscriptions.len())
            .finish_non_exhaustive()
    }
}

fn view_failure(error: &ViewError) -> HandlerError {
    HandlerError::new(error.to_string())
}

fn callback(dispatcher: &Dispatcher<StoreAction>, action: StoreAction) -> Callback {
    let dispatcher = dispatcher.clone();
    Arc::new(move || {
        dispatcher.dispatch(action.clone());
    })
}

fn render_basket(
    views: &Views,
    templates: &Templates,
    dispatcher: &Dispatcher<StoreAction>,
    snapshot: &BasketSnapshot,
) -> Result<(), ViewError> {
    let rows = snapshot
        .items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let row = BasketCard::new(
                templates.card_basket.instantiate(),
                Some(callback(dispatcher, StoreAction::RemoveFromBasket(item.id.clone()))),
            )?;
            row.render(item, index + 1);
            Ok::<_, ViewError>(row.card().container().clone())
        })
        .collect::<Result<Vec<_>, ViewError>>()?;
    views.basket.set_items(rows);
    views.basket.set_selected(&snapshot.selected);
    views.basket.set_total(snapshot.total);
    Ok(())
}

/// Subscribes the views to the store's events
#[allow(clippy::too_many_lines)] // One subscription per event
fn wire(
    bus: &EventBus<StoreEvent>,
    views: &Views,
    templates: &Arc<Templates>,
    dispatcher: &Dispatcher<StoreAction>,
) -> Vec<SubscriptionId> {
    let mut subscriptions = Vec::new();

    // ========== Catalog & preview ==========
    let (page, templates_, dispatcher_) = (views.page.clone(), Arc::clone(templates), dispatcher.clone());
    subscriptions.push(bus.subscribe("catalog:updated", move |event| {
        let StoreEvent::CatalogUpdated { items } = event else {
            return Ok(());
        };
        let cards = items
            .iter()
            .map(|item| {
                let card = CatalogCard::new(
                    templates_.card_catalog.instantiate(),
                    Some(callback(&dispatcher_, StoreAction::OpenPreview(item.id.clone()))),
                )?;
                card.render(item, false);
                Ok::<_, ViewError>(card.card().container().clone())
            })
            .collect::<Result<Vec<_>, ViewError>>()
            .map_err(|error| view_failure(&error))?;
        page.set_catalog(cards);
        Ok(())
    }));

    let (modal, templates_, dispatcher_) = (views.modal.clone(), Arc::clone(templates), dispatcher.clone());
    subscriptions.push(bus.subscribe("preview:shown", move |event| {
        let StoreEvent::PreviewShown { item } = event else {
            return Ok(());
        };
        let card = CatalogCard::new(
            templates_.card_preview.instantiate(),
            Some(callback(&dispatcher_, StoreAction::ToggleBasket(item.id.clone()))),
        )
        .map_err(|error| view_failure(&error))?;
        card.render(item, true);
        modal.render(card.card().container().clone());
        Ok(())
    }));

    // ========== Modal ==========
    let page = views.page.clone();
    subscriptions.push(bus.on("modal:open", move |_| page.set_locked(true)));
    let page = views.page.clone();
    subscriptions.push(bus.on("modal:close", move |_| page.set_locked(false)));

    // ========== Basket ==========
    let (views_, templates_, dispatcher_) = (views.clone(), Arc::clone(templates), dispatcher.clone());
    subscriptions.push(bus.subscribe("basket:open", move |event| {
        let StoreEvent::BasketOpened(snapshot) = event else {
            return Ok(());
        };
        render_basket(&views_, &templates_, &dispatcher_, snapshot).map_err(|error| view_failure(&error))?;
        views_.modal.render(views_.basket.container().clone());
        Ok(())
    }));

    let (views_, templates_, dispatcher_) = (views.clone(), Arc::clone(templates), dispatcher.clone());
    subscriptions.push(bus.subscribe("basket:changed", move |event| {
        let StoreEvent::BasketChanged(snapshot) = event else {
            return Ok(());
        };
        render_basket(&views_, &templates_, &dispatcher_, snapshot).map_err(|error| view_failure(&error))?;
        views_.page.set_counter(snapshot.selected.len());
        Ok(())
    }));

    subscriptions.push(bus.on("basket:item-unavailable", |event| {
        if let StoreEvent::ItemUnavailable { id } = event {
            tracing::warn!(%id, "Item is no longer in the catalog");
        }
    }));

    // ========== Checkout ==========
    let views_ = views.clone();
    subscriptions.push(bus.on("checkout:step-entered", move |event| {
        let StoreEvent::StepEntered { step, draft, ready } = event else {
            return;
        };
        let form = match step {
            CheckoutStep::Address => {
                views_.address.render(draft, *ready);
                views_.address.form().container().clone()
            },
            CheckoutStep::Contact => {
                views_.contacts.render(draft, *ready);
                views_.contacts.form().container().clone()
            },
        };
        views_.modal.render(form);
    }));

    let address = views.address.clone();
    subscriptions.push(bus.on("order:address-changed", move |event| {
        if let StoreEvent::AddressChanged {
            field: OrderField::Payment,
            value,
        } = event
        {
            address.set_payment(PaymentMethod::parse(value));
        }
    }));

    let address = views.address.clone();
    subscriptions.push(bus.on("order:address-validated", move |event| {
        if let StoreEvent::AddressValidated(errors) = event {
            address.form().set_valid(errors.is_empty());
            address.form().set_errors(&errors.summary());
        }
    }));

    let contacts = views.contacts.clone();
    subscriptions.push(bus.on("order:contacts-validated", move |event| {
        if let StoreEvent::ContactsValidated(errors) = event {
            contacts.form().set_valid(errors.is_empty());
            contacts.form().set_errors(&errors.summary());
        }
    }));

    let (modal, templates_) = (views.modal.clone(), Arc::clone(templates));
    subscriptions.push(bus.subscribe("order:submitted", move |event| {
        let StoreEvent::OrderSubmitted { receipt, charged } = event else {
            return Ok(());
        };
        tracing::info!(id = %receipt.id, charged, "Showing order confirmation");
        let closer = modal.clone();
        let success = Success::new(templates_.success.instantiate(), Arc::new(move || closer.close()))
            .map_err(|error| view_failure(&error))?;
        success.set_total(*charged);
        modal.render(success.container().clone());
        Ok(())
    }));

    let contacts = views.contacts.clone();
    subscriptions.push(bus.on("order:failed", move |event| {
        if let StoreEvent::OrderFailed { reason, .. } = event {
            contacts.form().set_errors(reason);
            contacts.form().set_valid(true);
        }
    }));

    subscriptions
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn storefront() -> Storefront {
        Storefront::new(Arc::new(StubGateway::with_sample_catalog()), EmailPolicy::Presence).unwrap()
    }

    #[tokio::test]
    async fn catalog_renders_gallery() {
        let app = storefront();
        app.load_catalog().await.unwrap();

        let cards = app.page().catalog();
        assert_eq!(cards.len(), 5);
        assert_eq!(cards[0].attribute("data-id").as_deref(), Some("854cef69"));
        assert_eq!(
            cards[2].query("card__price").unwrap().text_content(),
            "Priceless"
        );
    }

    #[tokio::test]
    async fn header_button_shows_empty_basket() {
        let app = storefront();
        app.load_catalog().await.unwrap();

        app.document().query("header__basket").unwrap().click();
        app.settle().await.unwrap();

        assert!(app.modal().is_open());
        assert!(app.page().is_locked());
        let content = app.modal().content().unwrap();
        assert!(content.ptr_eq(app.basket().container()));
        assert!(content.query("basket__button").unwrap().is_disabled());
    }

    #[tokio::test]
    async fn shutdown_detaches_views() {
        let app = storefront();
        let before = app.bus().subscriber_count();
        assert!(before > 0);

        app.shutdown(Duration::from_secs(1)).await.unwrap();
        assert_eq!(app.bus().subscriber_count(), 0);
        assert_eq!(app.settle().await, Ok(0));

        app.dispatch(StoreAction::OpenBasket);
        assert_eq!(app.settle().await, Err(StoreError::ShutdownInProgress));
    }
}
