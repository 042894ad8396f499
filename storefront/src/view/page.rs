//! Page shell: header counter, gallery and scroll lock.

use super::dom::{Element, EventKind, ViewError};
use crate::types::StoreAction;
use storefront_runtime::Dispatcher;

const LOCKED: &str = "page__wrapper_locked";

/// The page around the modal
#[derive(Clone, Debug)]
pub struct Page {
    counter: Element,
    gallery: Element,
    wrapper: Element,
}

impl Page {
    /// Binds the page; the header basket button dispatches
    /// [`StoreAction::OpenBasket`]
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::MissingElement`] if the counter, gallery, wrapper
    /// or basket button is missing.
    pub fn new(root: &Element, dispatcher: Dispatcher<StoreAction>) -> Result<Self, ViewError> {
        let counter = root.ensure("header__basket-counter")?;
        let gallery = root.ensure("gallery")?;
        let wrapper = root.ensure("page__wrapper")?;
        let basket = root.ensure("header__basket")?;

        basket.on(EventKind::Click, move |_| {
            dispatcher.dispatch(StoreAction::OpenBasket);
        });

        Ok(Self {
            counter,
            gallery,
            wrapper,
        })
    }

    /// Shows the number of items in the basket
    pub fn set_counter(&self, count: usize) {
        self.counter.set_text(&count.to_string());
    }

    /// Replaces the gallery cards
    pub fn set_catalog(&self, cards: Vec<Element>) {
        self.gallery.replace_children(cards);
    }

    /// Gallery cards currently shown
    #[must_use]
    pub fn catalog(&self) -> Vec<Element> {
        self.gallery.children()
    }

    /// Locks or unlocks page scrolling
    pub fn set_locked(&self, locked: bool) {
        self.wrapper.toggle_class(LOCKED, locked);
    }

    /// Whether scrolling is locked
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.wrapper.has_class(LOCKED)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::view::templates::page;
    use storefront_runtime::dispatch;

    #[test]
    fn basket_button_opens_basket() {
        let root = page();
        let (dispatcher, mut inbox) = dispatch::channel();
        let page = Page::new(&root, dispatcher).unwrap();

        root.query("header__basket-counter").unwrap().click();
        assert_eq!(inbox.try_next(), Some(StoreAction::OpenBasket));

        page.set_counter(3);
        assert_eq!(root.query("header__basket-counter").unwrap().text_content(), "3");
    }

    #[test]
    fn lock_and_gallery() {
        let root = page();
        let (dispatcher, _inbox) = dispatch::channel();
        let page = Page::new(&root, dispatcher).unwrap();

        page.set_locked(true);
        assert!(root.query("page__wrapper").unwrap().has_class(LOCKED));
        page.set_locked(false);
        assert!(!page.is_locked());

        page.set_catalog(vec![Element::new("button"), Element::new("button")]);
        assert_eq!(page.catalog().len(), 2);
    }

    #[test]
    fn missing_gallery_is_fatal() {
        let (dispatcher, _inbox) = dispatch::channel();
        let root = Element::new("body").child(Element::new("span").class("header__basket-counter"));
        assert_eq!(
            Page::new(&root, dispatcher).unwrap_err(),
            ViewError::MissingElement {
                class: "gallery".into()
            }
        );
    }
}
