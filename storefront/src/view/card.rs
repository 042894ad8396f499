//! Item cards: gallery, detail preview and basket row.

use super::dom::{Element, EventKind, ViewError};
use crate::types::{CatalogItem, ItemId};
use std::sync::Arc;

/// Callback fired by a card click
pub type Callback = Arc<dyn Fn() + Send + Sync>;

/// Text shown for a price
#[must_use]
pub fn format_price(price: Option<u64>) -> String {
    price.map_or_else(|| "Priceless".to_string(), |price| format!("{price} synapses"))
}

/// Modifier for the `card__category_*` class of a category label
#[must_use]
pub fn category_modifier(category: &str) -> &'static str {
    match category.trim().to_lowercase().as_str() {
        "other" | "другое" => "other",
        "additional" | "дополнительное" => "additional",
        "button" | "кнопка" => "button",
        "hard skill" | "hard-skill" | "хард-скил" => "hard",
        _ => "soft",
    }
}

const CATEGORY_MODIFIERS: [&str; 5] = ["soft", "hard", "other", "additional", "button"];

/// Base card: title, price and an optional action button
///
/// The click callback is bound to the button when the template has one,
/// otherwise to the whole card.
#[derive(Clone, Debug)]
pub struct Card {
    container: Element,
    title: Element,
    price: Element,
    button: Option<Element>,
}

impl Card {
    /// Binds a card to an instantiated template
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::MissingElement`] if the title or price element
    /// is missing.
    pub fn new(container: Element, on_click: Option<Callback>) -> Result<Self, ViewError> {
        let title = container.ensure("card__title")?;
        let price = container.ensure("card__price")?;
        let button = container.query("card__button");

        if let Some(on_click) = on_click {
            let target = button.as_ref().unwrap_or(&container);
            target.on(EventKind::Click, move |_| on_click());
        }

        Ok(Self {
            container,
            title,
            price,
            button,
        })
    }

    /// Root element of the card
    #[must_use]
    pub const fn container(&self) -> &Element {
        &self.container
    }

    /// The action button, if the template has one
    #[must_use]
    pub const fn button(&self) -> Option<&Element> {
        self.button.as_ref()
    }

    /// Tags the card with an item id
    pub fn set_id(&self, id: &ItemId) {
        self.container.set_attribute("data-id", id.as_str());
    }

    /// Sets the title
    pub fn set_title(&self, title: &str) {
        self.title.set_text(title);
    }

    /// Sets the price text; a priceless card cannot be bought
    pub fn set_price(&self, price: Option<u64>) {
        self.price.set_text(&format_price(price));
        if price.is_some() {
            self.container.remove_attribute("data-priceless");
        } else {
            self.container.set_attribute("data-priceless", "true");
        }
    }

    /// Sets the button caption for the item's basket state
    ///
    /// The button is disabled for priceless items.
    pub fn set_in_basket(&self, in_basket: bool) {
        let Some(button) = &self.button else {
            return;
        };
        button.set_text(if in_basket { "Remove" } else { "Add to basket" });
        button.set_disabled(self.container.attribute("data-priceless").is_some());
    }
}

/// Gallery and preview card: adds category, image and description
#[derive(Clone, Debug)]
pub struct CatalogCard {
    card: Card,
    category: Element,
    image: Element,
    description: Option<Element>,
}

impl CatalogCard {
    /// Binds a catalog or preview card to an instantiated template
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::MissingElement`] if title, price, category or
    /// image is missing.
    pub fn new(container: Element, on_click: Option<Callback>) -> Result<Self, ViewError> {
        let card = Card::new(container, on_click)?;
        let category = card.container().ensure("card__category")?;
        let image = card.container().ensure("card__image")?;
        let description = card.container().query("card__text");
        Ok(Self {
            card,
            category,
            image,
            description,
        })
    }

    /// The underlying base card
    #[must_use]
    pub const fn card(&self) -> &Card {
        &self.card
    }

    /// Sets the category label and its modifier class
    pub fn set_category(&self, category: &str) {
        self.category.set_text(category);
        for modifier in CATEGORY_MODIFIERS {
            self.category.remove_class(&format!("card__category_{modifier}"));
        }
        self.category
            .add_class(&format!("card__category_{}", category_modifier(category)));
    }

    /// Sets image source and alt text
    pub fn set_image(&self, src: &str, alt: &str) {
        self.image.set_attribute("src", src);
        self.image.set_attribute("alt", alt);
    }

    /// Sets the description; each line becomes its own paragraph
    pub fn set_description(&self, description: &str) {
        let Some(paragraph) = &self.description else {
            return;
        };
        let lines: Vec<&str> = description.lines().filter(|l| !l.trim().is_empty()).collect();
        if lines.len() <= 1 {
            paragraph.set_text(lines.first().copied().unwrap_or_default());
            return;
        }
        let paragraphs = lines
            .into_iter()
            .map(|line| {
                let copy = paragraph.deep_clone();
                copy.set_text(line);
                copy
            })
            .collect();
        paragraph.replace_with(paragraphs);
    }

    /// Fills every field from a catalog item
    pub fn render(&self, item: &CatalogItem, with_description: bool) {
        self.card.set_id(&item.id);
        self.card.set_title(&item.title);
        self.card.set_price(item.price);
        self.set_category(&item.category);
        self.set_image(&item.image, &item.title);
        if with_description {
            self.set_description(&item.description);
        }
        self.card.set_in_basket(item.in_basket);
    }
}

/// Basket row: adds a 1-based position
#[derive(Clone, Debug)]
pub struct BasketCard {
    card: Card,
    index: Option<Element>,
}

impl BasketCard {
    /// Binds a basket row to an instantiated template
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::MissingElement`] if title or price is missing.
    pub fn new(container: Element, on_click: Option<Callback>) -> Result<Self, ViewError> {
        let card = Card::new(container, on_click)?;
        let index = card.container().query("basket__item-index");
        Ok(Self { card, index })
    }

    /// The underlying base card
    #[must_use]
    pub const fn card(&self) -> &Card {
        &self.card
    }

    /// Sets the 1-based position
    pub fn set_index(&self, index: usize) {
        if let Some(element) = &self.index {
            element.set_text(&index.to_string());
        }
    }

    /// Fills title, price and position
    pub fn render(&self, item: &CatalogItem, index: usize) {
        self.card.set_id(&item.id);
        self.card.set_title(&item.title);
        self.card.set_price(item.price);
        self.set_index(index);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::view::templates::Templates;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn item(price: Option<u64>, category: &str) -> CatalogItem {
        CatalogItem {
            id: ItemId::new("x"),
            title: "Thing".into(),
            image: "https://cdn/x.svg".into(),
            category: category.into(),
            description: "Line one\nLine two".into(),
            price,
            in_basket: false,
        }
    }

    #[test]
    fn price_text() {
        assert_eq!(format_price(Some(750)), "750 synapses");
        assert_eq!(format_price(None), "Priceless");
    }

    #[test]
    fn category_classes() {
        assert_eq!(category_modifier("hard skill"), "hard");
        assert_eq!(category_modifier("Other"), "other");
        assert_eq!(category_modifier("кнопка"), "button");
        assert_eq!(category_modifier("soft skill"), "soft");
    }

    #[test]
    fn gallery_card_click_goes_to_container() {
        let clicks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&clicks);
        let card = CatalogCard::new(
            Templates::standard().card_catalog.instantiate(),
            Some(Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })),
        )
        .unwrap();
        card.render(&item(Some(5), "other"), false);

        card.card().container().query("card__title").unwrap().click();
        assert_eq!(clicks.load(Ordering::SeqCst), 1);
        let category = card.card().container().query("card__category").unwrap();
        assert!(category.has_class("card__category_other"));
        assert_eq!(category.text_content(), "other");
    }

    #[test]
    fn preview_card_splits_description_and_sets_button() {
        let card = CatalogCard::new(Templates::standard().card_preview.instantiate(), None).unwrap();
        card.render(&item(Some(5), "button"), true);

        let container = card.card().container();
        assert_eq!(container.query_all("card__text").len(), 2);
        let button = card.card().button().unwrap();
        assert_eq!(button.text_content(), "Add to basket");
        assert!(!button.is_disabled());

        card.card().set_in_basket(true);
        assert_eq!(button.text_content(), "Remove");
    }

    #[test]
    fn priceless_card_disables_button() {
        let card = CatalogCard::new(Templates::standard().card_preview.instantiate(), None).unwrap();
        card.render(&item(None, "soft skill"), true);

        let container = card.card().container();
        assert_eq!(container.query("card__price").unwrap().text_content(), "Priceless");
        assert!(card.card().button().unwrap().is_disabled());
    }

    #[test]
    fn recategorising_replaces_modifier() {
        let card = CatalogCard::new(Templates::standard().card_catalog.instantiate(), None).unwrap();
        card.set_category("other");
        card.set_category("additional");
        let category = card.card().container().query("card__category").unwrap();
        assert!(!category.has_class("card__category_other"));
        assert!(category.has_class("card__category_additional"));
    }

    #[test]
    fn basket_card_index_and_missing_elements() {
        let row = BasketCard::new(Templates::standard().card_basket.instantiate(), None).unwrap();
        row.render(&item(Some(10), "other"), 3);
        assert_eq!(
            row.card().container().query("basket__item-index").unwrap().text_content(),
            "3"
        );

        assert_eq!(
            Card::new(Element::new("div"), None).unwrap_err(),
            ViewError::MissingElement {
                class: "card__title".into()
            }
        );
    }
}
