//! Reducer for the storefront.
//!
//! Every [`StoreAction`] is mapped onto [`AppState`] command methods; the
//! resulting changes are announced as [`StoreEvent`]s through
//! `Effect::Publish`, and network calls are described as `Effect::Future`s
//! that feed their outcome back as actions.
//!
//! # Checkout
//!
//! ```text
//! Closed ──BeginCheckout──► Address ──SubmitAddress──► Contact
//!                              ▲                          │
//!                              └──────BackToAddress───────┤
//!                                                         │ SubmitContacts
//!                                                         ▼
//!                   Failed { retry: Contact } ◄──── Submitting ────► Completed
//! ```
//!
//! Closing the modal returns to `Closed` from every phase but `Submitting`,
//! which only the gateway's answer can leave.

use crate::gateway::Gateway;
use crate::state::{AppState, StateError};
use crate::types::{
    CheckoutPhase, CheckoutStep, ItemId, OrderField, StoreAction, StoreEvent,
};
use crate::validation::{validate_address, validate_contacts};
use std::sync::Arc;
use storefront_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};

type Effects = SmallVec<[Effect<StoreAction, StoreEvent>; 4]>;

/// Environment dependencies for the storefront reducer
#[derive(Clone)]
pub struct StorefrontEnvironment {
    /// Remote product/order API
    pub gateway: Arc<dyn Gateway>,
}

impl StorefrontEnvironment {
    /// Creates a new `StorefrontEnvironment`
    #[must_use]
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }
}

/// Reducer for the storefront
#[derive(Clone, Debug, Default)]
pub struct StorefrontReducer;

impl StorefrontReducer {
    /// Creates a new `StorefrontReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn unavailable(id: ItemId) -> Effects {
        tracing::warn!(%id, "Action refers to an item missing from the catalog");
        smallvec![Effect::Publish(StoreEvent::ItemUnavailable { id })]
    }

    /// Events announcing a basket change, plus a preview refresh when the
    /// changed item is on screen
    fn basket_changed(state: &AppState, id: &ItemId, change: StoreEvent) -> Effects {
        let mut effects: Effects = smallvec![
            Effect::Publish(change),
            Effect::Publish(StoreEvent::BasketChanged(state.basket_snapshot())),
        ];
        if state.preview() == Some(id) {
            if let Some(item) = state.item(id) {
                effects.push(Effect::Publish(StoreEvent::PreviewShown { item: item.clone() }));
            }
        }
        effects
    }

    fn add(state: &mut AppState, id: ItemId) -> Effects {
        match state.add_to_order(&id) {
            Ok(true) => {
                tracing::debug!(%id, "Added to basket");
                Self::basket_changed(state, &id, StoreEvent::ItemAdded { id: id.clone() })
            },
            Ok(false) => SmallVec::new(),
            Err(_) => Self::unavailable(id),
        }
    }

    fn remove(state: &mut AppState, id: ItemId) -> Effects {
        match state.remove_from_order(&id) {
            Ok(true) => {
                tracing::debug!(%id, "Removed from basket");
                Self::basket_changed(state, &id, StoreEvent::ItemRemoved { id: id.clone() })
            },
            Ok(false) => SmallVec::new(),
            Err(_) => Self::unavailable(id),
        }
    }

    /// Moves to a form step; a submitted order keeps its phase until the
    /// gateway answers
    fn enter_step(state: &mut AppState, step: CheckoutStep) -> Effects {
        if *state.phase() == CheckoutPhase::Submitting {
            tracing::warn!(?step, "Ignoring step change while the order is submitting");
            return SmallVec::new();
        }
        let (phase, ready) = match step {
            CheckoutStep::Address => (CheckoutPhase::Address, validate_address(state.order()).is_empty()),
            CheckoutStep::Contact => (
                CheckoutPhase::Contact,
                validate_contacts(state.order(), state.email_policy()).is_empty(),
            ),
        };
        state.set_phase(phase);
        smallvec![Effect::Publish(StoreEvent::StepEntered {
            step,
            draft: state.order().clone(),
            ready,
        })]
    }

    fn set_field(state: &mut AppState, field: OrderField, value: String) -> Effects {
        if let Err(error) = state.set_order_field(field, &value) {
            tracing::warn!(%error, "Rejected order field value");
            return SmallVec::new();
        }
        match field.step() {
            CheckoutStep::Address => {
                state.validate_address_step();
                smallvec![
                    Effect::Publish(StoreEvent::AddressChanged { field, value }),
                    Effect::Publish(StoreEvent::AddressValidated(state.address_errors().clone())),
                ]
            },
            CheckoutStep::Contact => {
                state.validate_contact_step();
                smallvec![
                    Effect::Publish(StoreEvent::ContactsChanged { field, value }),
                    Effect::Publish(StoreEvent::ContactsValidated(state.contact_errors().clone())),
                ]
            },
        }
    }

    fn submit_contacts(state: &mut AppState, env: &StorefrontEnvironment) -> Effects {
        let resumable = matches!(
            state.phase(),
            CheckoutPhase::Contact | CheckoutPhase::Failed { retry: CheckoutStep::Contact, .. }
        );
        if !resumable {
            tracing::warn!(phase = ?state.phase(), "Ignoring contact submit outside the contact step");
            return SmallVec::new();
        }

        let valid = state.validate_contact_step();
        let validated = Effect::Publish(StoreEvent::ContactsValidated(state.contact_errors().clone()));
        if !valid {
            return smallvec![validated];
        }

        match state.prepare_submission() {
            Ok(order) => {
                tracing::info!(items = order.items.len(), total = order.total, "Submitting order");
                state.set_phase(CheckoutPhase::Submitting);
                let request = env.gateway.place_order(&order);
                smallvec![
                    validated,
                    Effect::Future(Box::pin(async move {
                        Some(match request.await {
                            Ok(receipt) => StoreAction::OrderPlaced(receipt),
                            Err(error) => StoreAction::OrderFailed(error.to_string()),
                        })
                    })),
                ]
            },
            Err(StateError::ItemNotFound(id)) => {
                let reason = format!("item unavailable: {id}");
                tracing::warn!(%reason, "Order cannot be submitted");
                state.set_phase(CheckoutPhase::Failed {
                    retry: CheckoutStep::Contact,
                    reason: reason.clone(),
                });
                smallvec![
                    validated,
                    Effect::Publish(StoreEvent::ItemUnavailable { id }),
                    Effect::Publish(StoreEvent::OrderFailed {
                        retry: CheckoutStep::Contact,
                        reason,
                    }),
                ]
            },
            Err(error @ StateError::UnknownPaymentMethod(_)) => {
                tracing::error!(%error, "Unexpected error preparing order");
                smallvec![validated]
            },
        }
    }
}

impl Reducer for StorefrontReducer {
    type State = AppState;
    type Action = StoreAction;
    type Event = StoreEvent;
    type Environment = StorefrontEnvironment;

    #[allow(clippy::too_many_lines)] // One arm per action
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> Effects {
        match action {
            // ========== Catalog ==========
            StoreAction::LoadCatalog => {
                let request = env.gateway.list_products();
                smallvec![Effect::Future(Box::pin(async move {
                    Some(match request.await {
                        Ok(products) => StoreAction::CatalogLoaded(products),
                        Err(error) => StoreAction::CatalogFailed(error.to_string()),
                    })
                }))]
            },

            StoreAction::CatalogLoaded(products) => {
                tracing::info!(count = products.len(), "Catalog loaded");
                state.set_catalog(products);
                smallvec![
                    Effect::Publish(StoreEvent::CatalogUpdated {
                        items: state.catalog().to_vec(),
                    }),
                    Effect::Publish(StoreEvent::BasketChanged(state.basket_snapshot())),
                ]
            },

            StoreAction::CatalogFailed(reason) => {
                tracing::error!(%reason, "Failed to load catalog");
                metrics::counter!("storefront.requests.failed", "request" => "catalog").increment(1);
                SmallVec::new()
            },

            // ========== Preview ==========
            StoreAction::OpenPreview(id) => match state.set_preview(&id).map(|_| ()) {
                Ok(_) => {
                    let generation = state.preview_generation();
                    let request = env.gateway.get_product(&id);
                    smallvec![Effect::Future(Box::pin(async move {
                        Some(match request.await {
                            Ok(product) => StoreAction::PreviewLoaded { generation, product },
                            Err(error) => StoreAction::PreviewFailed {
                                generation,
                                reason: error.to_string(),
                            },
                        })
                    }))]
                },
                Err(_) => Self::unavailable(id),
            },

            StoreAction::PreviewLoaded { generation, product } => {
                let id = product.id.clone();
                match state.apply_preview_details(generation, product) {
                    Some(item) => smallvec![Effect::Publish(StoreEvent::PreviewShown { item: item.clone() })],
                    None => {
                        tracing::debug!(%id, generation, "Discarded stale preview response");
                        SmallVec::new()
                    },
                }
            },

            StoreAction::PreviewFailed { generation, reason } => {
                if generation == state.preview_generation() {
                    tracing::error!(%reason, "Failed to load item details");
                    metrics::counter!("storefront.requests.failed", "request" => "product").increment(1);
                }
                SmallVec::new()
            },

            // ========== Basket ==========
            StoreAction::AddToBasket(id) => Self::add(state, id),

            StoreAction::RemoveFromBasket(id) => Self::remove(state, id),

            StoreAction::ToggleBasket(id) => match state.item(&id).map(|item| item.in_basket) {
                Some(true) => Self::remove(state, id),
                Some(false) => Self::add(state, id),
                None => Self::unavailable(id),
            },

            StoreAction::OpenBasket => {
                smallvec![Effect::Publish(StoreEvent::BasketOpened(state.basket_snapshot()))]
            },

            // ========== Checkout ==========
            StoreAction::BeginCheckout => {
                if state.order().items.is_empty() {
                    tracing::warn!("Ignoring checkout with an empty basket");
                    return SmallVec::new();
                }
                Self::enter_step(state, CheckoutStep::Address)
            },

            StoreAction::SetOrderField { field, value } => Self::set_field(state, field, value),

            StoreAction::SubmitAddress => {
                if *state.phase() != CheckoutPhase::Address {
                    tracing::warn!(phase = ?state.phase(), "Ignoring address submit outside the address step");
                    return SmallVec::new();
                }
                if state.validate_address_step() {
                    let mut effects: Effects =
                        smallvec![Effect::Publish(StoreEvent::AddressValidated(state.address_errors().clone()))];
                    effects.extend(Self::enter_step(state, CheckoutStep::Contact));
                    effects
                } else {
                    smallvec![Effect::Publish(StoreEvent::AddressValidated(state.address_errors().clone()))]
                }
            },

            StoreAction::BackToAddress => {
                if matches!(state.phase(), CheckoutPhase::Contact | CheckoutPhase::Failed { .. }) {
                    Self::enter_step(state, CheckoutStep::Address)
                } else {
                    tracing::warn!(phase = ?state.phase(), "Ignoring back navigation");
                    SmallVec::new()
                }
            },

            StoreAction::SubmitContacts => Self::submit_contacts(state, env),

            StoreAction::OrderPlaced(receipt) => {
                if *state.phase() != CheckoutPhase::Submitting {
                    tracing::warn!(id = %receipt.id, "Order receipt arrived outside submission");
                    return SmallVec::new();
                }
                let charged = state.complete_order();
                tracing::info!(id = %receipt.id, charged, "Order placed");
                metrics::counter!("storefront.orders.placed").increment(1);
                state.set_phase(CheckoutPhase::Completed(receipt.clone()));
                smallvec![
                    Effect::Publish(StoreEvent::OrderSubmitted { receipt, charged }),
                    Effect::Publish(StoreEvent::BasketChanged(state.basket_snapshot())),
                ]
            },

            StoreAction::OrderFailed(reason) => {
                if *state.phase() != CheckoutPhase::Submitting {
                    tracing::warn!(%reason, "Order failure arrived outside submission");
                    return SmallVec::new();
                }
                tracing::error!(%reason, "Order submission failed");
                metrics::counter!("storefront.requests.failed", "request" => "order").increment(1);
                state.set_phase(CheckoutPhase::Failed {
                    retry: CheckoutStep::Contact,
                    reason: reason.clone(),
                });
                smallvec![Effect::Publish(StoreEvent::OrderFailed {
                    retry: CheckoutStep::Contact,
                    reason,
                })]
            },

            // ========== Modal ==========
            StoreAction::ModalDismissed => {
                state.clear_preview();
                if *state.phase() == CheckoutPhase::Submitting {
                    tracing::debug!("Modal closed while submitting; checkout continues");
                } else {
                    state.set_phase(CheckoutPhase::Closed);
                }
                SmallVec::new()
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::gateway::StubGateway;
    use crate::types::{OrderReceipt, Product};
    use storefront_testing::{assertions, ReducerTest};

    fn product(id: &str, price: Option<u64>) -> Product {
        Product {
            id: ItemId::new(id),
            title: id.to_uppercase(),
            description: format!("About {id}"),
            image: format!("/{id}.svg"),
            category: "other".into(),
            price,
        }
    }

    fn env() -> StorefrontEnvironment {
        StorefrontEnvironment::new(Arc::new(StubGateway::new(vec![
            product("a", Some(100)),
            product("b", None),
        ])))
    }

    fn catalog_state() -> AppState {
        let mut state = AppState::default();
        state.set_catalog(vec![product("a", Some(100)), product("b", None)]);
        state
    }

    fn field(field: OrderField, value: &str) -> StoreAction {
        StoreAction::SetOrderField {
            field,
            value: value.to_string(),
        }
    }

    #[test]
    fn load_catalog_is_a_future() {
        ReducerTest::new(StorefrontReducer::new())
            .with_env(env())
            .given_state(AppState::default())
            .when_action(StoreAction::LoadCatalog)
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn catalog_loaded_publishes_catalog_and_basket() {
        ReducerTest::new(StorefrontReducer::new())
            .with_env(env())
            .given_state(AppState::default())
            .when_action(StoreAction::CatalogLoaded(vec![product("a", Some(1))]))
            .then_state(|state| assert_eq!(state.catalog().len(), 1))
            .then_effects(|effects| {
                assertions::assert_publishes(effects, &["catalog:updated", "basket:changed"]);
            })
            .run();
    }

    #[test]
    fn add_publishes_once() {
        ReducerTest::new(StorefrontReducer::new())
            .with_env(env())
            .given_state(catalog_state())
            .when_actions([
                StoreAction::AddToBasket("a".into()),
                StoreAction::AddToBasket("a".into()),
            ])
            .then_state(|state| assert_eq!(state.order().items, vec![ItemId::new("a")]))
            .then_effects(|effects| {
                assertions::assert_publishes(effects, &["basket:item-added", "basket:changed"]);
            })
            .run();
    }

    #[test]
    fn toggle_on_previewed_item_refreshes_preview() {
        let mut state = catalog_state();
        state.set_preview(&"a".into()).unwrap();

        ReducerTest::new(StorefrontReducer::new())
            .with_env(env())
            .given_state(state)
            .when_action(StoreAction::ToggleBasket("a".into()))
            .then_effects(|effects| {
                assertions::assert_publishes(
                    effects,
                    &["basket:item-added", "basket:changed", "preview:shown"],
                );
                let shown = assertions::published(effects).into_iter().find_map(|e| match e {
                    StoreEvent::PreviewShown { item } => Some(item.in_basket),
                    _ => None,
                });
                assert_eq!(shown, Some(true));
            })
            .run();
    }

    #[test]
    fn unknown_item_is_reported_not_fatal() {
        ReducerTest::new(StorefrontReducer::new())
            .with_env(env())
            .given_state(catalog_state())
            .when_action(StoreAction::AddToBasket("ghost".into()))
            .then_state(|state| assert!(state.order().items.is_empty()))
            .then_effects(|effects| {
                assertions::assert_publishes(effects, &["basket:item-unavailable"]);
            })
            .run();
    }

    #[test]
    fn stale_preview_response_is_dropped() {
        let mut state = catalog_state();
        state.set_preview(&"a".into()).unwrap();
        let stale = state.preview_generation();
        state.set_preview(&"b".into()).unwrap();

        ReducerTest::new(StorefrontReducer::new())
            .with_env(env())
            .given_state(state)
            .when_action(StoreAction::PreviewLoaded {
                generation: stale,
                product: product("a", Some(100)),
            })
            .then_state(|state| assert_eq!(state.preview(), Some(&ItemId::new("b"))))
            .then_effects(|effects| assertions::assert_no_effects(effects))
            .run();
    }

    #[test]
    fn checkout_needs_items() {
        ReducerTest::new(StorefrontReducer::new())
            .with_env(env())
            .given_state(catalog_state())
            .when_action(StoreAction::BeginCheckout)
            .then_state(|state| assert_eq!(*state.phase(), CheckoutPhase::Closed))
            .then_effects(|effects| assertions::assert_no_effects(effects))
            .run();
    }

    #[test]
    fn empty_address_submit_reports_both_fields() {
        ReducerTest::new(StorefrontReducer::new())
            .with_env(env())
            .given_state(catalog_state())
            .when_actions([
                StoreAction::AddToBasket("a".into()),
                StoreAction::BeginCheckout,
                StoreAction::SubmitAddress,
            ])
            .then_state(|state| {
                assert_eq!(*state.phase(), CheckoutPhase::Address);
                assert_eq!(
                    state.address_errors().fields().collect::<Vec<_>>(),
                    vec![OrderField::Payment, OrderField::Address]
                );
            })
            .run();
    }

    #[test]
    fn address_step_advances_when_valid() {
        ReducerTest::new(StorefrontReducer::new())
            .with_env(env())
            .given_state(catalog_state())
            .when_actions([
                StoreAction::AddToBasket("a".into()),
                StoreAction::BeginCheckout,
                field(OrderField::Payment, "online"),
                field(OrderField::Address, "Baker St 221b"),
                StoreAction::SubmitAddress,
            ])
            .then_state(|state| {
                assert_eq!(*state.phase(), CheckoutPhase::Contact);
                assert!(state.address_errors().is_empty());
            })
            .then_effects(|effects| {
                let keys = assertions::published_keys(effects);
                assert_eq!(keys.last(), Some(&"checkout:step-entered"));
                assert!(keys.contains(&"order:address-changed"));
            })
            .run();
    }

    #[test]
    fn back_to_address_is_reentrant() {
        ReducerTest::new(StorefrontReducer::new())
            .with_env(env())
            .given_state(catalog_state())
            .when_actions([
                StoreAction::AddToBasket("a".into()),
                StoreAction::BeginCheckout,
                field(OrderField::Payment, "cash"),
                field(OrderField::Address, "Home"),
                StoreAction::SubmitAddress,
                StoreAction::BackToAddress,
            ])
            .then_state(|state| {
                assert_eq!(*state.phase(), CheckoutPhase::Address);
                assert_eq!(state.order().address, "Home");
            })
            .run();
    }

    #[test]
    fn valid_contacts_start_submission() {
        ReducerTest::new(StorefrontReducer::new())
            .with_env(env())
            .given_state(catalog_state())
            .when_actions([
                StoreAction::AddToBasket("a".into()),
                StoreAction::AddToBasket("b".into()),
                StoreAction::BeginCheckout,
                field(OrderField::Payment, "card"),
                field(OrderField::Address, "Home"),
                StoreAction::SubmitAddress,
                field(OrderField::Email, "me@home.io"),
                field(OrderField::Phone, "+1 555"),
                StoreAction::SubmitContacts,
            ])
            .then_state(|state| {
                assert_eq!(*state.phase(), CheckoutPhase::Submitting);
                assert_eq!(state.order().total, 100);
            })
            .then_effects(|effects| assertions::assert_has_future_effect(effects))
            .run();
    }

    #[test]
    fn missing_item_fails_submission_with_contact_retry() {
        let mut state = catalog_state();
        state.add_to_order(&"a".into()).unwrap();
        state.push_order_id_unchecked("ghost".into());
        state.set_phase(CheckoutPhase::Contact);
        state.set_order_field(OrderField::Email, "x@y.z").unwrap();
        state.set_order_field(OrderField::Phone, "1").unwrap();

        ReducerTest::new(StorefrontReducer::new())
            .with_env(env())
            .given_state(state)
            .when_action(StoreAction::SubmitContacts)
            .then_state(|state| {
                assert!(matches!(
                    state.phase(),
                    CheckoutPhase::Failed { retry: CheckoutStep::Contact, reason } if reason.contains("item unavailable")
                ));
            })
            .then_effects(|effects| {
                assertions::assert_no_future_effect(effects);
                assertions::assert_publishes(
                    effects,
                    &["order:contacts-validated", "basket:item-unavailable", "order:failed"],
                );
            })
            .run();
    }

    #[test]
    fn order_placed_clears_basket_and_details() {
        let mut state = catalog_state();
        state.add_to_order(&"a".into()).unwrap();
        state.add_to_order(&"b".into()).unwrap();
        state.set_order_field(OrderField::Address, "Home").unwrap();
        state.set_phase(CheckoutPhase::Submitting);
        let receipt = OrderReceipt { id: "o-1".into(), total: 100 };

        ReducerTest::new(StorefrontReducer::new())
            .with_env(env())
            .given_state(state)
            .when_action(StoreAction::OrderPlaced(receipt.clone()))
            .then_state(move |state| {
                assert_eq!(*state.phase(), CheckoutPhase::Completed(receipt));
                assert!(state.active_items().is_empty());
                assert!(state.order().address.is_empty());
                assert_eq!(state.order().total, 100);
            })
            .then_effects(|effects| {
                assertions::assert_publishes(effects, &["order:submitted", "basket:changed"]);
                assert!(matches!(
                    assertions::published(effects)[0],
                    StoreEvent::OrderSubmitted { charged: 100, .. }
                ));
            })
            .run();
    }

    #[test]
    fn order_failure_allows_retry() {
        let mut state = catalog_state();
        state.add_to_order(&"a".into()).unwrap();
        state.set_phase(CheckoutPhase::Submitting);

        ReducerTest::new(StorefrontReducer::new())
            .with_env(env())
            .given_state(state)
            .when_action(StoreAction::OrderFailed("declined".into()))
            .then_state(|state| {
                assert_eq!(
                    *state.phase(),
                    CheckoutPhase::Failed {
                        retry: CheckoutStep::Contact,
                        reason: "declined".into()
                    }
                );
                assert_eq!(state.order().items.len(), 1);
            })
            .then_effects(|effects| assertions::assert_publishes(effects, &["order:failed"]))
            .run();
    }

    #[test]
    fn dismiss_keeps_submission_running() {
        let mut state = catalog_state();
        state.set_phase(CheckoutPhase::Submitting);

        ReducerTest::new(StorefrontReducer::new())
            .with_env(env())
            .given_state(state)
            .when_action(StoreAction::ModalDismissed)
            .then_state(|state| assert_eq!(*state.phase(), CheckoutPhase::Submitting))
            .run();
    }

    #[test]
    fn checkout_cannot_restart_while_submitting() {
        let mut state = catalog_state();
        state.add_to_order(&"a".into()).unwrap();
        state.set_phase(CheckoutPhase::Submitting);
        let receipt = OrderReceipt { id: "srv-1".into(), total: 100 };

        ReducerTest::new(StorefrontReducer::new())
            .with_env(env())
            .given_state(state)
            .when_actions(vec![
                StoreAction::ModalDismissed,
                StoreAction::BeginCheckout,
                StoreAction::BackToAddress,
                StoreAction::OrderPlaced(receipt.clone()),
            ])
            .then_state(move |state| {
                assert_eq!(*state.phase(), CheckoutPhase::Completed(receipt));
                assert!(state.order().items.is_empty());
                assert!(state.active_items().is_empty());
            })
            .then_effects(|effects| {
                assertions::assert_publishes(effects, &["order:submitted", "basket:changed"]);
            })
            .run();
    }

    #[test]
    fn begin_checkout_while_submitting_is_ignored() {
        let mut state = catalog_state();
        state.add_to_order(&"a".into()).unwrap();
        state.set_phase(CheckoutPhase::Submitting);

        ReducerTest::new(StorefrontReducer::new())
            .with_env(env())
            .given_state(state)
            .when_action(StoreAction::BeginCheckout)
            .then_state(|state| assert_eq!(*state.phase(), CheckoutPhase::Submitting))
            .then_effects(|effects| assertions::assert_no_effects(effects))
            .run();
    }

    #[test]
    fn preview_is_announced_only_once_details_arrive() {
        ReducerTest::new(StorefrontReducer::new())
            .with_env(env())
            .given_state(catalog_state())
            .when_actions(vec![
                StoreAction::OpenPreview("a".into()),
                StoreAction::PreviewFailed { generation: 1, reason: "offline".into() },
            ])
            .then_state(|state| assert_eq!(state.preview(), Some(&ItemId::new("a"))))
            .then_effects(|effects| {
                assertions::assert_has_future_effect(effects);
                assert!(assertions::published(effects).is_empty());
            })
            .run();
    }

    #[test]
    fn dismiss_closes_checkout_and_invalidates_preview() {
        let mut state = catalog_state();
        state.set_preview(&"a".into()).unwrap();
        state.set_phase(CheckoutPhase::Contact);
        let before = state.preview_generation();

        ReducerTest::new(StorefrontReducer::new())
            .with_env(env())
            .given_state(state)
            .when_action(StoreAction::ModalDismissed)
            .then_state(move |state| {
                assert_eq!(*state.phase(), CheckoutPhase::Closed);
                assert_eq!(state.preview(), None);
                assert!(state.preview_generation() > before);
            })
            .run();
    }

    #[test]
    fn unknown_payment_value_is_ignored() {
        ReducerTest::new(StorefrontReducer::new())
            .with_env(env())
            .given_state(catalog_state())
            .when_action(field(OrderField::Payment, "barter"))
            .then_state(|state| assert_eq!(state.order().payment, None))
            .then_effects(|effects| assertions::assert_no_effects(effects))
            .run();
    }
}
