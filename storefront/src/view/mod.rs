//! Headless view layer.
//!
//! Views own their elements and talk to the store only through a
//! [`Dispatcher`](storefront_runtime::Dispatcher); the application feeds
//! them from bus events.

pub mod basket;
pub mod card;
pub mod dom;
pub mod forms;
pub mod modal;
pub mod page;
pub mod success;
pub mod templates;

pub use basket::Basket;
pub use card::{BasketCard, Callback, Card, CatalogCard, format_price};
pub use dom::{DomEvent, Element, EventKind, Template, ViewError};
pub use forms::{AddressForm, ContactsForm, Form};
pub use modal::Modal;
pub use page::Page;
pub use success::Success;
pub use templates::Templates;
