//! Basket panel.

use super::card::format_price;
use super::dom::{Element, EventKind, ViewError};
use crate::types::{ItemId, StoreAction};
use storefront_runtime::Dispatcher;

/// Placeholder shown when the basket is empty
pub const EMPTY_BASKET: &str = "Basket is empty";

/// Basket contents, total and checkout button
#[derive(Clone, Debug)]
pub struct Basket {
    container: Element,
    list: Element,
    total: Element,
    button: Element,
}

impl Basket {
    /// Binds the panel; the checkout button dispatches
    /// [`StoreAction::BeginCheckout`]
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::MissingElement`] if the list, total or button
    /// element is missing.
    pub fn new(container: Element, dispatcher: Dispatcher<StoreAction>) -> Result<Self, ViewError> {
        let list = container.ensure("basket__list")?;
        let total = container.ensure("basket__price")?;
        let button = container.ensure("basket__button")?;

        button.on(EventKind::Click, move |_| {
            dispatcher.dispatch(StoreAction::BeginCheckout);
        });

        let basket = Self {
            container,
            list,
            total,
            button,
        };
        basket.set_items(Vec::new());
        basket.set_selected(&[]);
        basket.set_total(0);
        Ok(basket)
    }

    /// Root element of the panel
    #[must_use]
    pub const fn container(&self) -> &Element {
        &self.container
    }

    /// Shows the given rows, or the empty placeholder
    pub fn set_items(&self, items: Vec<Element>) {
        if items.is_empty() {
            self.list.set_text(EMPTY_BASKET);
        } else {
            self.list.set_text("");
            self.list.replace_children(items);
        }
    }

    /// Enables checkout only when something is selected
    pub fn set_selected(&self, selected: &[ItemId]) {
        self.button.set_disabled(selected.is_empty());
    }

    /// Shows the total
    pub fn set_total(&self, total: u64) {
        self.total.set_text(&format_price(Some(total)));
    }
}
