//! Domain types for the storefront.
//!
//! Wire DTOs ([`Product`], [`ProductList`], [`OrderReceipt`]), the catalog
//! entity, the order draft, the checkout phase, and the closed sets of
//! actions and events the reducer consumes and publishes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use storefront_core::event_bus::BusEvent;

/// Identifier of a catalog item
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Creates an `ItemId` from any string
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A product as served by the remote API
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product id
    pub id: ItemId,
    /// Display title
    pub title: String,
    /// Long description; may contain several lines
    #[serde(default)]
    pub description: String,
    /// Image URL (already CDN-prefixed once it leaves the gateway)
    pub image: String,
    /// Category label
    pub category: String,
    /// Price in synapses; `None` for priceless items
    pub price: Option<u64>,
}

/// Response of the product list endpoint
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductList {
    /// Number of products the server knows about
    pub total: u64,
    /// The products themselves
    pub items: Vec<Product>,
}

/// A catalog entry held by the application state
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogItem {
    /// Item id
    pub id: ItemId,
    /// Display title
    pub title: String,
    /// Image URL
    pub image: String,
    /// Category label
    pub category: String,
    /// Description text
    pub description: String,
    /// Price; `None` means priceless and unavailable for purchase
    pub price: Option<u64>,
    /// Whether the item is currently in the basket
    pub in_basket: bool,
}

impl CatalogItem {
    /// Whether the item has no price
    #[must_use]
    pub const fn is_priceless(&self) -> bool {
        self.price.is_none()
    }
}

impl From<Product> for CatalogItem {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            title: product.title,
            image: product.image,
            category: product.category,
            description: product.description,
            price: product.price,
            in_basket: false,
        }
    }
}

/// How the customer pays
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Pay online by card
    Card,
    /// Pay in cash on delivery
    Cash,
}

impl PaymentMethod {
    /// Parses a payment value, accepting the form button aliases
    /// `online` and `offline`
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "card" | "online" => Some(Self::Card),
            "cash" | "offline" => Some(Self::Cash),
            _ => None,
        }
    }

    /// Wire name of the method
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::Cash => "cash",
        }
    }
}

/// Editable fields of the order draft
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OrderField {
    /// Payment method
    Payment,
    /// Delivery address
    Address,
    /// Contact email
    Email,
    /// Contact phone
    Phone,
}

impl OrderField {
    /// Form input name of the field
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Payment => "payment",
            Self::Address => "address",
            Self::Email => "email",
            Self::Phone => "phone",
        }
    }

    /// Looks a field up by its form input name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "payment" => Some(Self::Payment),
            "address" => Some(Self::Address),
            "email" => Some(Self::Email),
            "phone" => Some(Self::Phone),
            _ => None,
        }
    }

    /// Checkout step the field belongs to
    #[must_use]
    pub const fn step(self) -> CheckoutStep {
        match self {
            Self::Payment | Self::Address => CheckoutStep::Address,
            Self::Email | Self::Phone => CheckoutStep::Contact,
        }
    }
}

impl std::fmt::Display for OrderField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The order being assembled; serialized as the order request body
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct OrderDraft {
    /// Selected payment method
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentMethod>,
    /// Delivery address
    pub address: String,
    /// Contact email
    pub email: String,
    /// Contact phone
    pub phone: String,
    /// Order total, filled in on submit
    pub total: u64,
    /// Selected item ids, in the order they were added
    pub items: Vec<ItemId>,
}

impl OrderDraft {
    /// Clears payment, address and contact details
    pub fn reset_details(&mut self) {
        self.payment = None;
        self.address.clear();
        self.email.clear();
        self.phone.clear();
    }
}

/// Response of the order endpoint
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReceipt {
    /// Server-side order id
    pub id: String,
    /// Total the server charged
    pub total: u64,
}

/// Field-level validation messages for one checkout step
///
/// Empty means the step is valid.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<OrderField, String>);

impl ValidationErrors {
    /// Creates an empty error map
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Records a message for a field, replacing any previous one
    pub fn insert(&mut self, field: OrderField, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    /// Message for a field, if any
    #[must_use]
    pub fn get(&self, field: OrderField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    /// Whether the step is valid
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of invalid fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Invalid fields, in field order
    pub fn fields(&self) -> impl Iterator<Item = OrderField> + '_ {
        self.0.keys().copied()
    }

    /// All messages joined with `"; "`, for form error text
    #[must_use]
    pub fn summary(&self) -> String {
        self.0.values().map(String::as_str).collect::<Vec<_>>().join("; ")
    }
}

/// The basket as shown to views
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BasketSnapshot {
    /// Items in the basket, in catalog order
    pub items: Vec<CatalogItem>,
    /// Selected ids, in the order they were added
    pub selected: Vec<ItemId>,
    /// Sum of prices; priceless items count as zero
    pub total: u64,
}

/// One of the two form steps of checkout
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckoutStep {
    /// Payment method and delivery address
    Address,
    /// Email and phone
    Contact,
}

/// Where the checkout flow currently is
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CheckoutPhase {
    /// No checkout in progress
    #[default]
    Closed,
    /// Filling in payment and address
    Address,
    /// Filling in contact details
    Contact,
    /// Order request in flight
    Submitting,
    /// Order accepted
    Completed(OrderReceipt),
    /// Submission failed; the user may retry from `retry`
    Failed {
        /// Step to resume from
        retry: CheckoutStep,
        /// Human-readable failure reason
        reason: String,
    },
}

/// Everything the storefront reducer reacts to
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreAction {
    // ========== Catalog ==========
    /// Fetch the product list
    LoadCatalog,
    /// The product list arrived
    CatalogLoaded(Vec<Product>),
    /// The product list request failed
    CatalogFailed(String),

    // ========== Preview ==========
    /// Show an item in the detail modal
    OpenPreview(ItemId),
    /// Item details arrived for preview request `generation`
    PreviewLoaded {
        /// Preview generation the request was made under
        generation: u64,
        /// Product details
        product: Product,
    },
    /// Item details request failed
    PreviewFailed {
        /// Preview generation the request was made under
        generation: u64,
        /// Failure reason
        reason: String,
    },

    // ========== Basket ==========
    /// Put an item in the basket
    AddToBasket(ItemId),
    /// Take an item out of the basket
    RemoveFromBasket(ItemId),
    /// Add the item if absent, remove it if present
    ToggleBasket(ItemId),
    /// Show the basket
    OpenBasket,

    // ========== Checkout ==========
    /// Start checkout from the basket
    BeginCheckout,
    /// A form field changed
    SetOrderField {
        /// Field that changed
        field: OrderField,
        /// New raw value
        value: String,
    },
    /// Submit the address step
    SubmitAddress,
    /// Return from the contact step to the address step
    BackToAddress,
    /// Submit the contact step and place the order
    SubmitContacts,
    /// The order request succeeded
    OrderPlaced(OrderReceipt),
    /// The order request failed
    OrderFailed(String),

    // ========== Modal ==========
    /// The modal was closed by the user
    ModalDismissed,
}

/// Everything published on the storefront event bus
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreEvent {
    /// The catalog was replaced
    CatalogUpdated {
        /// New catalog, in server order
        items: Vec<CatalogItem>,
    },
    /// An item is ready to show in the detail modal
    PreviewShown {
        /// The item, with its current basket flag
        item: CatalogItem,
    },
    /// The modal became visible
    ModalOpened,
    /// The modal was hidden
    ModalClosed,
    /// The basket should be shown
    BasketOpened(BasketSnapshot),
    /// Basket contents changed
    BasketChanged(BasketSnapshot),
    /// An item entered the basket
    ItemAdded {
        /// Item id
        id: ItemId,
    },
    /// An item left the basket
    ItemRemoved {
        /// Item id
        id: ItemId,
    },
    /// An action referred to an item that is not in the catalog
    ItemUnavailable {
        /// Item id
        id: ItemId,
    },
    /// A checkout form step became current
    StepEntered {
        /// Step entered
        step: CheckoutStep,
        /// Draft values to show
        draft: OrderDraft,
        /// Whether the step already passes validation
        ready: bool,
    },
    /// Payment or address changed
    AddressChanged {
        /// Field that changed
        field: OrderField,
        /// New value
        value: String,
    },
    /// Address step was validated
    AddressValidated(ValidationErrors),
    /// Email or phone changed
    ContactsChanged {
        /// Field that changed
        field: OrderField,
        /// New value
        value: String,
    },
    /// Contact step was validated
    ContactsValidated(ValidationErrors),
    /// The order was accepted
    OrderSubmitted {
        /// Server receipt
        receipt: OrderReceipt,
        /// Total computed from the cleared basket
        charged: u64,
    },
    /// Order submission failed
    OrderFailed {
        /// Step to resume from
        retry: CheckoutStep,
        /// Failure reason
        reason: String,
    },
}

impl BusEvent for StoreEvent {
    fn key(&self) -> &'static str {
        match self {
            Self::CatalogUpdated { .. } => "catalog:updated",
            Self::PreviewShown { .. } => "preview:shown",
            Self::ModalOpened => "modal:open",
            Self::ModalClosed => "modal:close",
            Self::BasketOpened(_) => "basket:open",
            Self::BasketChanged(_) => "basket:changed",
            Self::ItemAdded { .. } => "basket:item-added",
            Self::ItemRemoved { .. } => "basket:item-removed",
            Self::ItemUnavailable { .. } => "basket:item-unavailable",
            Self::StepEntered { .. } => "checkout:step-entered",
            Self::AddressChanged { .. } => "order:address-changed",
            Self::AddressValidated(_) => "order:address-validated",
            Self::ContactsChanged { .. } => "order:contacts-changed",
            Self::ContactsValidated(_) => "order:contacts-validated",
            Self::OrderSubmitted { .. } => "order:submitted",
            Self::OrderFailed { .. } => "order:failed",
        }
    }
}
