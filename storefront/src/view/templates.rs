//! Markup for the storefront page and its templates.

use super::dom::{Element, Template};

/// Every template the storefront instantiates
#[derive(Clone, Debug)]
pub struct Templates {
    /// Gallery card
    pub card_catalog: Template,
    /// Detail card shown in the modal
    pub card_preview: Template,
    /// Basket row
    pub card_basket: Template,
    /// Basket panel
    pub basket: Template,
    /// Payment/address form
    pub order: Template,
    /// Email/phone form
    pub contacts: Template,
    /// Order confirmation
    pub success: Template,
}

impl Templates {
    /// The standard storefront templates
    #[must_use]
    pub fn standard() -> Self {
        Self {
            card_catalog: Template::new("card-catalog", card_catalog()),
            card_preview: Template::new("card-preview", card_preview()),
            card_basket: Template::new("card-basket", card_basket()),
            basket: Template::new("basket", basket()),
            order: Template::new("order", order_form()),
            contacts: Template::new("contacts", contacts_form()),
            success: Template::new("success", success()),
        }
    }
}

fn card_catalog() -> Element {
    Element::new("button")
        .class("gallery__item card")
        .child(Element::new("span").class("card__category"))
        .child(Element::new("h2").class("card__title"))
        .child(Element::new("img").class("card__image"))
        .child(Element::new("span").class("card__price"))
}

fn card_preview() -> Element {
    Element::new("div")
        .class("card card_full")
        .child(Element::new("img").class("card__image"))
        .child(
            Element::new("div")
                .class("card__column")
                .child(Element::new("span").class("card__category"))
                .child(Element::new("h2").class("card__title"))
                .child(Element::new("p").class("card__text"))
                .child(
                    Element::new("div")
                        .class("card__row")
                        .child(Element::new("button").class("button card__button").text("Add to basket"))
                        .child(Element::new("span").class("card__price")),
                ),
        )
}

fn card_basket() -> Element {
    Element::new("li")
        .class("basket__item card card_compact")
        .child(Element::new("span").class("basket__item-index"))
        .child(Element::new("span").class("card__title"))
        .child(Element::new("span").class("card__price"))
        .child(
            Element::new("button")
                .class("basket__item-delete card__button")
                .attr("aria-label", "remove"),
        )
}

fn basket() -> Element {
    Element::new("div")
        .class("basket")
        .child(Element::new("h2").class("modal__title").text("Basket"))
        .child(Element::new("ul").class("basket__list"))
        .child(
            Element::new("div")
                .class("modal__actions")
                .child(Element::new("button").class("button basket__button").text("Checkout"))
                .child(Element::new("span").class("basket__price")),
        )
}

fn order_form() -> Element {
    Element::new("form")
        .class("form")
        .attr("name", "order")
        .child(
            Element::new("div")
                .class("order__field")
                .child(Element::new("h2").class("modal__title").text("Payment method"))
                .child(
                    Element::new("div")
                        .class("order__buttons")
                        .child(Element::new("button").class("button button_alt online").attr("name", "card").text("Online"))
                        .child(Element::new("button").class("button button_alt offline").attr("name", "cash").text("On delivery")),
                ),
        )
        .child(
            Element::new("label")
                .class("order__field")
                .child(Element::new("span").class("form__label").text("Delivery address"))
                .child(Element::new("input").class("form__input").attr("name", "address")),
        )
        .child(
            Element::new("div")
                .class("modal__actions")
                .child(Element::new("button").class("button order__button").attr("type", "submit").text("Next"))
                .child(Element::new("span").class("form__errors")),
        )
}

fn contacts_form() -> Element {
    Element::new("form")
        .class("form")
        .attr("name", "contacts")
        .child(
            Element::new("div")
                .class("order")
                .child(
                    Element::new("label")
                        .class("order__field")
                        .child(Element::new("span").class("form__label").text("Email"))
                        .child(Element::new("input").class("form__input").attr("name", "email")),
                )
                .child(
                    Element::new("label")
                        .class("order__field")
                        .child(Element::new("span").class("form__label").text("Phone"))
                        .child(Element::new("input").class("form__input").attr("name", "phone")),
                ),
        )
        .child(
            Element::new("div")
                .class("modal__actions")
                .child(Element::new("button").class("button").attr("type", "submit").text("Pay"))
                .child(Element::new("span").class("form__errors")),
        )
}

fn success() -> Element {
    Element::new("div")
        .class("order-success")
        .child(Element::new("h2").class("order-success__title").text("Order placed"))
        .child(Element::new("p").class("order-success__description order__success-description"))
        .child(Element::new("button").class("button order-success__close order__success-close").text("Shop more"))
}

/// The page body: header with basket button, gallery and modal container
#[must_use]
pub fn page() -> Element {
    Element::new("body")
        .class("page")
        .child(
            Element::new("div")
                .class("page__wrapper")
                .child(
                    Element::new("header")
                        .class("header")
                        .child(
                            Element::new("button")
                                .class("header__basket")
                                .child(Element::new("span").class("header__basket-counter").text("0")),
                        ),
                )
                .child(Element::new("main").class("gallery")),
        )
        .child(
            Element::new("div")
                .class("modal")
                .attr("id", "modal-container")
                .child(
                    Element::new("div")
                        .class("modal__container")
                        .child(Element::new("button").class("modal__close").attr("aria-label", "close"))
                        .child(Element::new("div").class("modal__content")),
                ),
        )
}
