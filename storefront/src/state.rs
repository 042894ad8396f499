//! Application state: catalog, basket, order draft and checkout progress.
//!
//! `AppState` is the only owner of the catalog and the order draft. Its
//! command methods keep two invariants:
//!
//! - every id in the draft's item list is a catalog id, listed once
//! - an item's `in_basket` flag is set exactly when its id is in that list
//!
//! Methods never publish anything; the reducer turns their results into
//! events.

use crate::types::{
    BasketSnapshot, CatalogItem, CheckoutPhase, ItemId, OrderDraft, OrderField, PaymentMethod,
    Product, ValidationErrors,
};
use crate::validation::{validate_address, validate_contacts, EmailPolicy};
use thiserror::Error;

/// Errors from state commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// The id does not refer to a catalog item
    #[error("item {0} is not in the catalog")]
    ItemNotFound(ItemId),

    /// A payment value that is neither card nor cash
    #[error("unknown payment method `{0}`")]
    UnknownPaymentMethod(String),
}

/// The storefront's single mutable state
#[derive(Clone, Debug, Default)]
pub struct AppState {
    catalog: Vec<CatalogItem>,
    order: OrderDraft,
    address_errors: ValidationErrors,
    contact_errors: ValidationErrors,
    preview: Option<ItemId>,
    preview_generation: u64,
    phase: CheckoutPhase,
    email_policy: EmailPolicy,
}

impl AppState {
    /// Creates an empty state validating emails under `email_policy`
    #[must_use]
    pub fn new(email_policy: EmailPolicy) -> Self {
        Self {
            email_policy,
            ..Self::default()
        }
    }

    // ========== Queries ==========

    /// The catalog, in server order
    #[must_use]
    pub fn catalog(&self) -> &[CatalogItem] {
        &self.catalog
    }

    /// Looks up a catalog item
    #[must_use]
    pub fn item(&self, id: &ItemId) -> Option<&CatalogItem> {
        self.catalog.iter().find(|item| &item.id == id)
    }

    /// The order draft
    #[must_use]
    pub const fn order(&self) -> &OrderDraft {
        &self.order
    }

    /// Errors from the last address-step validation
    #[must_use]
    pub const fn address_errors(&self) -> &ValidationErrors {
        &self.address_errors
    }

    /// Errors from the last contact-step validation
    #[must_use]
    pub const fn contact_errors(&self) -> &ValidationErrors {
        &self.contact_errors
    }

    /// Id of the item shown in the detail modal
    #[must_use]
    pub const fn preview(&self) -> Option<&ItemId> {
        self.preview.as_ref()
    }

    /// Counter bumped on every preview change; responses carrying an older
    /// value are stale
    #[must_use]
    pub const fn preview_generation(&self) -> u64 {
        self.preview_generation
    }

    /// Current checkout phase
    #[must_use]
    pub const fn phase(&self) -> &CheckoutPhase {
        &self.phase
    }

    /// Email policy the contact step is validated under
    #[must_use]
    pub const fn email_policy(&self) -> EmailPolicy {
        self.email_policy
    }

    /// Items in the basket, in catalog order
    #[must_use]
    pub fn active_items(&self) -> Vec<CatalogItem> {
        self.catalog
            .iter()
            .filter(|item| item.in_basket)
            .cloned()
            .collect()
    }

    /// Sum of prices of the ordered items; priceless items count as zero and
    /// the sum saturates at `u64::MAX`
    ///
    /// # Errors
    ///
    /// Returns [`StateError::ItemNotFound`] for an ordered id missing from
    /// the catalog.
    pub fn total(&self) -> Result<u64, StateError> {
        self.order.items.iter().try_fold(0u64, |sum, id| {
            let item = self
                .item(id)
                .ok_or_else(|| StateError::ItemNotFound(id.clone()))?;
            Ok(sum.saturating_add(item.price.unwrap_or(0)))
        })
    }

    /// Sum of prices of the ordered items that are still in the catalog
    fn available_total(&self) -> u64 {
        self.order
            .items
            .iter()
            .filter_map(|id| self.item(id))
            .map(|item| item.price.unwrap_or(0))
            .fold(0, u64::saturating_add)
    }

    /// Payload for basket events
    #[must_use]
    pub fn basket_snapshot(&self) -> BasketSnapshot {
        BasketSnapshot {
            items: self.active_items(),
            selected: self.order.items.clone(),
            total: self.available_total(),
        }
    }

    // ========== Catalog ==========

    /// Replaces the catalog wholesale
    ///
    /// Basket membership survives for ids present in the new catalog; other
    /// ids are dropped from the order and returned.
    pub fn set_catalog(&mut self, products: Vec<Product>) -> Vec<ItemId> {
        self.catalog = products.into_iter().map(CatalogItem::from).collect();

        let mut pruned = Vec::new();
        let catalog = &self.catalog;
        self.order.items.retain(|id| {
            let present = catalog.iter().any(|item| &item.id == id);
            if !present {
                pruned.push(id.clone());
            }
            present
        });

        for item in &mut self.catalog {
            item.in_basket = self.order.items.contains(&item.id);
        }

        if self.preview.as_ref().is_some_and(|id| self.item(id).is_none()) {
            self.clear_preview();
        }

        if !pruned.is_empty() {
            tracing::info!(pruned = pruned.len(), "Dropped basket items missing from new catalog");
        }
        pruned
    }

    // ========== Preview ==========

    /// Makes `id` the previewed item and starts a new preview generation
    ///
    /// # Errors
    ///
    /// Returns [`StateError::ItemNotFound`] if `id` is not in the catalog;
    /// the current preview is left untouched.
    pub fn set_preview(&mut self, id: &ItemId) -> Result<&CatalogItem, StateError> {
        let index = self.position(id)?;
        self.preview = Some(id.clone());
        self.preview_generation += 1;
        Ok(&self.catalog[index])
    }

    /// Forgets the previewed item; responses still in flight become stale
    pub fn clear_preview(&mut self) {
        self.preview = None;
        self.preview_generation += 1;
    }

    /// Merges fetched details into the previewed catalog item
    ///
    /// Returns `None` when `generation` is not the current preview generation
    /// or the product is not the previewed item.
    pub fn apply_preview_details(&mut self, generation: u64, product: Product) -> Option<&CatalogItem> {
        if generation != self.preview_generation || self.preview.as_ref() != Some(&product.id) {
            return None;
        }
        let index = self.position(&product.id).ok()?;
        let item = &mut self.catalog[index];
        item.title = product.title;
        item.description = product.description;
        item.image = product.image;
        item.category = product.category;
        item.price = product.price;
        Some(&self.catalog[index])
    }

    // ========== Basket ==========

    /// Adds an item to the order; returns whether anything changed
    ///
    /// # Errors
    ///
    /// Returns [`StateError::ItemNotFound`] if `id` is not in the catalog.
    pub fn add_to_order(&mut self, id: &ItemId) -> Result<bool, StateError> {
        let index = self.position(id)?;
        if self.catalog[index].in_basket {
            return Ok(false);
        }
        self.catalog[index].in_basket = true;
        self.order.items.push(id.clone());
        Ok(true)
    }

    /// Removes an item from the order; returns whether anything changed
    ///
    /// # Errors
    ///
    /// Returns [`StateError::ItemNotFound`] if `id` is not in the catalog.
    pub fn remove_from_order(&mut self, id: &ItemId) -> Result<bool, StateError> {
        let index = self.position(id)?;
        self.catalog[index].in_basket = false;
        let before = self.order.items.len();
        self.order.items.retain(|selected| selected != id);
        Ok(self.order.items.len() != before)
    }

    /// Empties the basket and returns the total it held
    ///
    /// The total is computed from the list being cleared, skipping ids no
    /// longer in the catalog, and stored as the order total.
    pub fn clear_basket(&mut self) -> u64 {
        let total = self.available_total();
        self.order.total = total;
        self.order.items.clear();
        for item in &mut self.catalog {
            item.in_basket = false;
        }
        total
    }

    // ========== Order draft ==========

    /// Updates one draft field from its raw form value
    ///
    /// An empty payment value unsets the method.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::UnknownPaymentMethod`] for a payment value that
    /// is not `card`/`cash` (or `online`/`offline`).
    pub fn set_order_field(&mut self, field: OrderField, value: &str) -> Result<(), StateError> {
        match field {
            OrderField::Payment => {
                self.order.payment = if value.trim().is_empty() {
                    None
                } else {
                    Some(
                        PaymentMethod::parse(value)
                            .ok_or_else(|| StateError::UnknownPaymentMethod(value.to_string()))?,
                    )
                };
            },
            OrderField::Address => value.clone_into(&mut self.order.address),
            OrderField::Email => value.clone_into(&mut self.order.email),
            OrderField::Phone => value.clone_into(&mut self.order.phone),
        }
        Ok(())
    }

    /// Recomputes and stores the address-step errors; returns validity
    pub fn validate_address_step(&mut self) -> bool {
        self.address_errors = validate_address(&self.order);
        self.address_errors.is_empty()
    }

    /// Recomputes and stores the contact-step errors; returns validity
    pub fn validate_contact_step(&mut self) -> bool {
        self.contact_errors = validate_contacts(&self.order, self.email_policy);
        self.contact_errors.is_empty()
    }

    /// Stores the order total and returns the request body to submit
    ///
    /// # Errors
    ///
    /// Returns [`StateError::ItemNotFound`] when an ordered id is missing
    /// from the catalog.
    pub fn prepare_submission(&mut self) -> Result<OrderDraft, StateError> {
        self.order.total = self.total()?;
        Ok(self.order.clone())
    }

    /// Clears the basket and the draft's details after a successful order;
    /// returns the charged total
    pub fn complete_order(&mut self) -> u64 {
        let charged = self.clear_basket();
        self.order.reset_details();
        self.address_errors = ValidationErrors::new();
        self.contact_errors = ValidationErrors::new();
        charged
    }

    pub(crate) fn set_phase(&mut self, phase: CheckoutPhase) {
        tracing::debug!(from = ?self.phase, to = ?phase, "Checkout phase change");
        self.phase = phase;
    }

    fn position(&self, id: &ItemId) -> Result<usize, StateError> {
        self.catalog
            .iter()
            .position(|item| &item.id == id)
            .ok_or_else(|| StateError::ItemNotFound(id.clone()))
    }

    #[cfg(test)]
    pub(crate) fn push_order_id_unchecked(&mut self, id: ItemId) {
        self.order.items.push(id);
    }
}
