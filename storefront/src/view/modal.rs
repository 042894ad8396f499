//! Modal window.
//!
//! The Escape key, the close button and a click on the backdrop all close
//! the modal; clicks inside the content area never reach the backdrop.

use super::dom::{Element, EventKind, ViewError};
use crate::types::{StoreAction, StoreEvent};
use std::sync::Arc;
use storefront_core::event_bus::EventBus;
use storefront_runtime::Dispatcher;

const ACTIVE: &str = "modal_active";

/// Modal container with swappable content
#[derive(Clone)]
pub struct Modal {
    container: Element,
    content: Element,
    bus: Arc<EventBus<StoreEvent>>,
    dispatcher: Dispatcher<StoreAction>,
}

impl Modal {
    /// Binds the modal and its close triggers; `document` receives the
    /// Escape key handler
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::MissingElement`] if the close button or content
    /// element is missing.
    pub fn new(
        container: Element,
        document: &Element,
        bus: Arc<EventBus<StoreEvent>>,
        dispatcher: Dispatcher<StoreAction>,
    ) -> Result<Self, ViewError> {
        let close_button = container.ensure("modal__close")?;
        let content = container.ensure("modal__content")?;

        let modal = Self {
            container: container.clone(),
            content: content.clone(),
            bus,
            dispatcher,
        };

        let this = modal.clone();
        close_button.on(EventKind::Click, move |event| {
            event.stop_propagation();
            this.close();
        });

        let this = modal.clone();
        container.on(EventKind::Click, move |_| this.close());

        content.on(EventKind::Click, |event| event.stop_propagation());

        let this = modal.clone();
        document.on(EventKind::KeyDown, move |event| {
            if event.key() == Some("Escape") {
                this.close();
            }
        });

        Ok(modal)
    }

    /// Root element of the modal
    #[must_use]
    pub const fn container(&self) -> &Element {
        &self.container
    }

    /// Whether the modal is visible
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.container.has_class(ACTIVE)
    }

    /// Current content, if any
    #[must_use]
    pub fn content(&self) -> Option<Element> {
        self.content.children().into_iter().next()
    }

    /// Shows the modal and announces `modal:open`
    pub fn open(&self) {
        self.container.add_class(ACTIVE);
        self.bus.publish(&StoreEvent::ModalOpened);
    }

    /// Hides the modal, drops its content, announces `modal:close` and tells
    /// the store; does nothing when already closed
    pub fn close(&self) {
        if !self.is_open() {
            return;
        }
        self.container.remove_class(ACTIVE);
        self.content.replace_children(Vec::new());
        self.bus.publish(&StoreEvent::ModalClosed);
        self.dispatcher.dispatch(StoreAction::ModalDismissed);
    }

    /// Swaps in new content and opens the modal
    pub fn render(&self, content: Element) {
        self.content.replace_children(vec![content]);
        self.open();
    }
}

impl std::fmt::Debug for Modal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Modal")
            .field("open", &self.is_open())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::view::templates::page;
    use storefront_runtime::dispatch;
    use storefront_testing::EventRecorder;

    fn modal() -> (Element, Modal, EventRecorder<StoreEvent>, storefront_runtime::Inbox<StoreAction>) {
        let document = page();
        let bus = Arc::new(EventBus::<StoreEvent>::new());
        let recorder = EventRecorder::attach(&bus, "modal:*");
        let (dispatcher, inbox) = dispatch::channel();
        let modal = Modal::new(document.ensure("modal").unwrap(), &document, bus, dispatcher).unwrap();
        (document, modal, recorder, inbox)
    }

    #[test]
    fn render_opens_with_content() {
        let (_document, modal, recorder, _inbox) = modal();
        modal.render(Element::new("p").text("hello"));

        assert!(modal.is_open());
        assert_eq!(modal.content().unwrap().text_content(), "hello");
        assert_eq!(recorder.keys(), vec!["modal:open"]);
    }

    #[test]
    fn escape_closes_and_notifies_store() {
        let (document, modal, recorder, mut inbox) = modal();
        modal.render(Element::new("p"));

        document.press_key("Enter");
        assert!(modal.is_open());

        document.press_key("Escape");
        assert!(!modal.is_open());
        assert!(modal.content().is_none());
        assert_eq!(recorder.keys(), vec!["modal:open", "modal:close"]);
        assert_eq!(inbox.try_next(), Some(StoreAction::ModalDismissed));
        assert_eq!(inbox.try_next(), None);
    }

    #[test]
    fn content_clicks_do_not_close() {
        let (_document, modal, _recorder, _inbox) = modal();
        let inner = Element::new("button");
        modal.render(inner.clone());

        inner.click();
        assert!(modal.is_open());

        modal.container().click();
        assert!(!modal.is_open());
    }

    #[test]
    fn close_button_closes_once() {
        let (_document, modal, recorder, _inbox) = modal();
        modal.render(Element::new("p"));

        modal.container().query("modal__close").unwrap().click();
        assert!(!modal.is_open());
        assert_eq!(recorder.keys(), vec!["modal:open", "modal:close"]);
    }
}
