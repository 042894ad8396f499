//! # Storefront
//!
//! A single-page shop driven by a reducer and an event bus: a catalog
//! gallery, a detail preview, a basket and a two-step checkout, rendered
//! into a headless element tree.
//!
//! ## Architecture
//!
//! - [`state::AppState`] holds the catalog, the basket and the order draft.
//! - [`reducer::StorefrontReducer`] maps every [`types::StoreAction`] onto
//!   state changes and announces them as [`types::StoreEvent`]s.
//! - [`gateway::Gateway`] talks to the product/order API; requests run as
//!   effects and feed their outcome back as actions.
//! - [`view`] components render events and queue user input as actions.
//! - [`app::Storefront`] wires all of the above together.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use storefront::{app::Storefront, gateway::StubGateway, validation::EmailPolicy};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let app = Storefront::new(Arc::new(StubGateway::with_sample_catalog()), EmailPolicy::Presence)?;
//! app.load_catalog().await?;
//!
//! app.document().ensure("header__basket")?.click();
//! app.settle().await?;
//! assert!(app.modal().is_open());
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod config;
pub mod gateway;
pub mod reducer;
pub mod state;
pub mod types;
pub mod validation;
pub mod view;

pub use app::Storefront;
pub use config::Config;
pub use reducer::{StorefrontEnvironment, StorefrontReducer};
pub use state::AppState;
pub use types::{StoreAction, StoreEvent};
